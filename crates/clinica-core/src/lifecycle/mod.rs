//! Patient lifecycle service.
//!
//! Creation with uniqueness guards, the active/suspended state machine,
//! and the clinical-record operations on a patient. There is no implicit
//! "current patient": callers pass the owning patient's phone explicitly
//! and a session layer owns any selection slot.

use thiserror::Error;
use tracing::{info, warn};

use crate::db::{Database, DbError};
use crate::models::{ClinicalRecord, Patient, PatientStatus};

/// Lifecycle errors.
#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error("database error: {0}")]
    Db(#[from] DbError),

    #[error("patient not found: {0}")]
    NotFound(String),

    #[error("email '{0}' is already in use by another patient")]
    DuplicateEmail(String),

    #[error("phone number '{0}' is already in use by another patient")]
    DuplicatePhone(String),

    #[error("clinical record not found: {0}")]
    RecordNotFound(String),
}

pub type LifecycleResult<T> = Result<T, LifecycleError>;

/// Service over patients and their clinical records.
pub struct PatientLifecycle<'a> {
    db: &'a Database,
}

impl<'a> PatientLifecycle<'a> {
    /// Create a new lifecycle service.
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Look up a patient by phone, records loaded.
    pub fn get_by_phone(&self, phone: &str) -> LifecycleResult<Option<Patient>> {
        Ok(self.db.get_patient_by_phone(phone)?)
    }

    /// Whether a patient with this phone number exists.
    pub fn has_patient(&self, phone: &str) -> LifecycleResult<bool> {
        Ok(self.db.patient_exists(phone)?)
    }

    /// Create or update a patient.
    ///
    /// A patient without an id gets a freshly generated one. Phone and
    /// email must not belong to any other patient; on conflict nothing is
    /// written. Returns the stored value with generated fields filled in.
    pub fn save(&self, mut patient: Patient) -> LifecycleResult<Patient> {
        if patient.id.is_empty() {
            patient.id = uuid::Uuid::new_v4().to_string();
            info!(name = %patient.name, "creating new patient");
        } else {
            info!(name = %patient.name, "updating existing patient");
        }

        if let Some(email) = &patient.email {
            if let Some(existing) = self.db.patient_id_by_email(email)? {
                if existing != patient.id {
                    return Err(LifecycleError::DuplicateEmail(email.clone()));
                }
            }
        }
        if let Some(existing) = self.db.patient_id_by_phone(&patient.phone)? {
            if existing != patient.id {
                return Err(LifecycleError::DuplicatePhone(patient.phone.clone()));
            }
        }

        patient.touch();
        self.db.save_patient(&patient)?;
        self.db
            .get_patient(&patient.id)?
            .ok_or_else(|| LifecycleError::NotFound(patient.id.clone()))
    }

    /// Delete a patient, degrading to a suspend when records exist.
    ///
    /// A patient owning clinical records is suspended instead of removed,
    /// so no clinical data is ever lost through this path.
    pub fn delete(&self, patient_id: &str) -> LifecycleResult<()> {
        let patient = self.db.get_patient(patient_id)?.ok_or_else(|| {
            warn!(id = %patient_id, "attempt to delete a patient that does not exist");
            LifecycleError::NotFound(patient_id.to_string())
        })?;

        if patient.has_records() {
            self.db
                .update_patient_status(patient_id, PatientStatus::Suspended)?;
            info!(id = %patient_id, "patient suspended instead of deleted");
        } else {
            self.db.delete_patient(patient_id)?;
            info!(id = %patient_id, "patient deleted");
        }
        Ok(())
    }

    /// Set a patient's status to suspended. Idempotent.
    pub fn suspend(&self, patient_id: &str) -> LifecycleResult<()> {
        self.set_status(patient_id, PatientStatus::Suspended)
    }

    /// Set a patient's status back to active. Idempotent.
    pub fn reactivate(&self, patient_id: &str) -> LifecycleResult<()> {
        self.set_status(patient_id, PatientStatus::Active)
    }

    fn set_status(&self, patient_id: &str, status: PatientStatus) -> LifecycleResult<()> {
        if !self.db.update_patient_status(patient_id, status)? {
            return Err(LifecycleError::NotFound(patient_id.to_string()));
        }
        Ok(())
    }

    /// All patients, records loaded.
    pub fn list_all(&self) -> LifecycleResult<Vec<Patient>> {
        Ok(self.db.list_patients()?)
    }

    /// All active patients, records loaded.
    pub fn list_active(&self) -> LifecycleResult<Vec<Patient>> {
        Ok(self.db.list_patients_by_status(PatientStatus::Active)?)
    }

    /// All suspended patients, records loaded.
    pub fn list_suspended(&self) -> LifecycleResult<Vec<Patient>> {
        Ok(self.db.list_patients_by_status(PatientStatus::Suspended)?)
    }

    /// Case-insensitive substring search over name, phone and email.
    /// A blank query returns all patients.
    pub fn find_by_text(&self, query: &str) -> LifecycleResult<Vec<Patient>> {
        Ok(filter_by_text(self.list_all()?, query))
    }

    /// [`Self::find_by_text`] restricted to active patients.
    pub fn find_active_by_text(&self, query: &str) -> LifecycleResult<Vec<Patient>> {
        Ok(filter_by_text(self.list_active()?, query))
    }

    /// Append a clinical record to the patient with this phone number.
    ///
    /// A missing patient is a named failure, logged as well, so callers
    /// can surface or ignore it. The record gets a generated id and a
    /// date of "now" when either is absent.
    pub fn add_clinical_record(
        &self,
        phone: &str,
        mut record: ClinicalRecord,
    ) -> LifecycleResult<()> {
        let patient_id = self.db.patient_id_by_phone(phone)?.ok_or_else(|| {
            warn!(phone = %phone, "no patient with this phone, record not added");
            LifecycleError::NotFound(phone.to_string())
        })?;

        if record.id.is_empty() {
            record.id = uuid::Uuid::new_v4().to_string();
        }
        if record.date.is_none() {
            record.date = Some(chrono::Utc::now());
        }
        self.db.insert_record(&patient_id, &record)?;
        Ok(())
    }

    /// Replace one of the patient's records in place, matched by record id.
    pub fn update_clinical_record(
        &self,
        phone: &str,
        record: &ClinicalRecord,
    ) -> LifecycleResult<()> {
        let patient_id = self
            .db
            .patient_id_by_phone(phone)?
            .ok_or_else(|| LifecycleError::NotFound(phone.to_string()))?;

        if !self.db.update_record(&patient_id, record)? {
            warn!(id = %record.id, "clinical record to update was not found");
            return Err(LifecycleError::RecordNotFound(record.id.clone()));
        }
        Ok(())
    }

    /// Delete one record by its id.
    pub fn delete_clinical_record(&self, phone: &str, record_id: &str) -> LifecycleResult<()> {
        let patient_id = self
            .db
            .patient_id_by_phone(phone)?
            .ok_or_else(|| LifecycleError::NotFound(phone.to_string()))?;

        if !self.db.delete_record(&patient_id, record_id)? {
            return Err(LifecycleError::RecordNotFound(record_id.to_string()));
        }
        Ok(())
    }

    /// Delete every record matching `(category, title)`.
    ///
    /// Kept for callers of the historical signature; titles are a weaker
    /// key than the record id and may match several records. Returns how
    /// many were removed; zero is reported, not an error.
    pub fn delete_clinical_record_by_title(
        &self,
        phone: &str,
        category_id: &str,
        title: &str,
    ) -> LifecycleResult<usize> {
        let patient_id = self
            .db
            .patient_id_by_phone(phone)?
            .ok_or_else(|| LifecycleError::NotFound(phone.to_string()))?;

        let removed = self
            .db
            .delete_records_by_title(&patient_id, category_id, title)?;
        if removed == 0 {
            warn!(category = %category_id, title = %title, "no clinical record matched for deletion");
        }
        Ok(removed)
    }

    /// All records of a patient; empty when the patient is unknown.
    pub fn clinical_records(&self, phone: &str) -> LifecycleResult<Vec<ClinicalRecord>> {
        Ok(self
            .get_by_phone(phone)?
            .map(|p| p.records)
            .unwrap_or_default())
    }

    /// The subset of a patient's records referencing one category.
    pub fn clinical_records_in_category(
        &self,
        phone: &str,
        category_id: &str,
    ) -> LifecycleResult<Vec<ClinicalRecord>> {
        let mut records = self.clinical_records(phone)?;
        records.retain(|r| r.category_id == category_id);
        Ok(records)
    }
}

fn filter_by_text(patients: Vec<Patient>, query: &str) -> Vec<Patient> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return patients;
    }
    patients
        .into_iter()
        .filter(|p| {
            p.name.to_lowercase().contains(&needle)
                || p.phone.to_lowercase().contains(&needle)
                || p.email
                    .as_deref()
                    .map(|e| e.to_lowercase().contains(&needle))
                    .unwrap_or(false)
        })
        .collect()
}
