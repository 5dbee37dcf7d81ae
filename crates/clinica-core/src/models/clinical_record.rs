//! Clinical record model and its status vocabulary.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raised when a status label does not belong to the closed vocabulary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown clinical status: {0}")]
pub struct ParseClinicalStatusError(pub String);

/// Status of a clinical record.
///
/// Parsed once at the system boundary; unrecognized labels are a hard
/// error, never a silent default.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ClinicalStatus {
    Urgent,
    Pending,
    InProgress,
    Completed,
}

impl ClinicalStatus {
    /// Sort priority: lower values surface first in the timeline.
    pub fn priority(&self) -> u8 {
        match self {
            ClinicalStatus::Urgent => 0,
            ClinicalStatus::Pending => 1,
            ClinicalStatus::InProgress => 2,
            ClinicalStatus::Completed => 3,
        }
    }

    /// Display label, also the stored text form.
    pub fn as_str(&self) -> &'static str {
        match self {
            ClinicalStatus::Urgent => "Urgent",
            ClinicalStatus::Pending => "Pending",
            ClinicalStatus::InProgress => "In progress",
            ClinicalStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for ClinicalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClinicalStatus {
    type Err = ParseClinicalStatusError;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        match label.trim().to_lowercase().as_str() {
            "urgent" => Ok(ClinicalStatus::Urgent),
            "pending" => Ok(ClinicalStatus::Pending),
            "in progress" | "in-progress" | "in_progress" => Ok(ClinicalStatus::InProgress),
            "completed" => Ok(ClinicalStatus::Completed),
            _ => Err(ParseClinicalStatusError(label.to_string())),
        }
    }
}

/// A single titled, dated, status-tagged entry belonging to one patient.
///
/// The category is a foreign reference: deleting a record never touches
/// its category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClinicalRecord {
    /// Stable identifier - empty string means "not yet saved"
    pub id: String,
    /// Referenced category
    pub category_id: String,
    /// Referenced subcategory within the category
    pub sub_category_id: Option<String>,
    /// Title, required
    pub title: String,
    /// Free-text description
    pub description: Option<String>,
    /// Status within the closed vocabulary
    pub status: ClinicalStatus,
    /// Event date; defaults to creation time when absent
    pub date: Option<DateTime<Utc>>,
}

impl ClinicalRecord {
    /// Create a new pending record dated now.
    pub fn new(category_id: String, title: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            category_id,
            sub_category_id: None,
            title,
            description: None,
            status: ClinicalStatus::Pending,
            date: Some(Utc::now()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_defaults() {
        let record = ClinicalRecord::new("treatments".into(), "Checkup".into());
        assert_eq!(record.status, ClinicalStatus::Pending);
        assert!(record.date.is_some());
        assert_eq!(record.id.len(), 36);
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("urgent".parse::<ClinicalStatus>().unwrap(), ClinicalStatus::Urgent);
        assert_eq!("PENDING".parse::<ClinicalStatus>().unwrap(), ClinicalStatus::Pending);
        assert_eq!(
            " In Progress ".parse::<ClinicalStatus>().unwrap(),
            ClinicalStatus::InProgress
        );
        assert_eq!(
            "in-progress".parse::<ClinicalStatus>().unwrap(),
            ClinicalStatus::InProgress
        );
        assert_eq!(
            "Completed".parse::<ClinicalStatus>().unwrap(),
            ClinicalStatus::Completed
        );
    }

    #[test]
    fn test_status_parse_rejects_unknown() {
        let err = "archived".parse::<ClinicalStatus>().unwrap_err();
        assert_eq!(err, ParseClinicalStatusError("archived".into()));
    }

    #[test]
    fn test_priority_ordering() {
        assert!(ClinicalStatus::Urgent.priority() < ClinicalStatus::Pending.priority());
        assert!(ClinicalStatus::Pending.priority() < ClinicalStatus::InProgress.priority());
        assert!(ClinicalStatus::InProgress.priority() < ClinicalStatus::Completed.priority());
    }

    #[test]
    fn test_display_round_trip() {
        for status in [
            ClinicalStatus::Urgent,
            ClinicalStatus::Pending,
            ClinicalStatus::InProgress,
            ClinicalStatus::Completed,
        ] {
            assert_eq!(status.to_string().parse::<ClinicalStatus>().unwrap(), status);
        }
    }
}
