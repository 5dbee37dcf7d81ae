//! Patient model and lifecycle status.

use serde::{Deserialize, Serialize};

use super::ClinicalRecord;

/// Lifecycle status of a patient.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PatientStatus {
    Active,
    Suspended,
    /// Declared in the stored vocabulary; no operation currently produces it.
    Inactive,
}

impl PatientStatus {
    /// Stored text form.
    pub fn as_str(&self) -> &'static str {
        match self {
            PatientStatus::Active => "active",
            PatientStatus::Suspended => "suspended",
            PatientStatus::Inactive => "inactive",
        }
    }

    /// Parse the stored text form.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "active" => Some(PatientStatus::Active),
            "suspended" => Some(PatientStatus::Suspended),
            "inactive" => Some(PatientStatus::Inactive),
            _ => None,
        }
    }
}

/// A patient together with the clinical records it owns.
///
/// Records are a composition: they are persisted and deleted with the
/// patient, never on their own.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    /// Stable identifier - empty string means "not yet saved"
    pub id: String,
    /// First name
    pub name: String,
    /// Last name
    pub last_name: Option<String>,
    /// Email, unique across patients when present
    pub email: Option<String>,
    /// Phone number, required and unique across patients
    pub phone: String,
    /// Gender
    pub gender: Option<String>,
    /// Postal address
    pub address: Option<String>,
    /// Lifecycle status
    pub status: PatientStatus,
    /// Creation timestamp (RFC 3339)
    pub created_at: String,
    /// Last update timestamp (RFC 3339)
    pub updated_at: String,
    /// Owned clinical records
    pub records: Vec<ClinicalRecord>,
}

impl Patient {
    /// Create a new active patient with required fields.
    pub fn new(name: String, phone: String) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            last_name: None,
            email: None,
            phone,
            gender: None,
            address: None,
            status: PatientStatus::Active,
            created_at: now.clone(),
            updated_at: now,
            records: Vec::new(),
        }
    }

    /// Whether this patient owns at least one clinical record.
    pub fn has_records(&self) -> bool {
        !self.records.is_empty()
    }

    /// Touch the updated_at timestamp.
    pub fn touch(&mut self) {
        self.updated_at = chrono::Utc::now().to_rfc3339();
    }
}
