//! Patient database operations.

use rusqlite::types::Type;
use rusqlite::{params, OptionalExtension};

use super::{map_constraint, Database, DbResult};
use crate::models::{Patient, PatientStatus};

const PATIENT_COLUMNS: &str =
    "id, name, last_name, email, phone, gender, address, status, created_at, updated_at";

/// Map a patient row (records attached separately).
fn patient_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Patient> {
    let status: String = row.get(7)?;
    let status = PatientStatus::parse(&status).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            7,
            Type::Text,
            format!("unknown patient status: {}", status).into(),
        )
    })?;

    Ok(Patient {
        id: row.get(0)?,
        name: row.get(1)?,
        last_name: row.get(2)?,
        email: row.get(3)?,
        phone: row.get(4)?,
        gender: row.get(5)?,
        address: row.get(6)?,
        status,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
        records: Vec::new(),
    })
}

impl Database {
    /// Save a patient and its full record set in one transaction.
    ///
    /// The record set is replaced wholesale, mirroring the ownership rule:
    /// records exist only as part of their patient.
    pub fn save_patient(&self, patient: &Patient) -> DbResult<()> {
        let tx = self.conn.unchecked_transaction()?;

        self.conn.execute(
            r#"
            INSERT INTO patients (
                id, name, last_name, email, phone, gender, address, status,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                last_name = excluded.last_name,
                email = excluded.email,
                phone = excluded.phone,
                gender = excluded.gender,
                address = excluded.address,
                status = excluded.status,
                updated_at = datetime('now')
            "#,
            params![
                patient.id,
                patient.name,
                patient.last_name,
                patient.email,
                patient.phone,
                patient.gender,
                patient.address,
                patient.status.as_str(),
                patient.created_at,
                patient.updated_at,
            ],
        )
        .map_err(map_constraint)?;

        self.conn.execute(
            "DELETE FROM clinical_records WHERE patient_id = ?",
            [&patient.id],
        )?;
        for record in &patient.records {
            self.insert_record(&patient.id, record)?;
        }

        tx.commit()?;
        Ok(())
    }

    /// Get a patient by id, with records loaded.
    pub fn get_patient(&self, id: &str) -> DbResult<Option<Patient>> {
        let patient = self
            .conn
            .query_row(
                &format!("SELECT {} FROM patients WHERE id = ?", PATIENT_COLUMNS),
                [id],
                patient_from_row,
            )
            .optional()?;
        patient.map(|p| self.attach_records(p)).transpose()
    }

    /// Get a patient by phone number, with records loaded.
    pub fn get_patient_by_phone(&self, phone: &str) -> DbResult<Option<Patient>> {
        let patient = self
            .conn
            .query_row(
                &format!("SELECT {} FROM patients WHERE phone = ?", PATIENT_COLUMNS),
                [phone],
                patient_from_row,
            )
            .optional()?;
        patient.map(|p| self.attach_records(p)).transpose()
    }

    /// Id of the patient holding this phone number, if any.
    pub fn patient_id_by_phone(&self, phone: &str) -> DbResult<Option<String>> {
        self.conn
            .query_row("SELECT id FROM patients WHERE phone = ?", [phone], |row| {
                row.get(0)
            })
            .optional()
            .map_err(Into::into)
    }

    /// Id of the patient holding this email, if any.
    pub fn patient_id_by_email(&self, email: &str) -> DbResult<Option<String>> {
        self.conn
            .query_row("SELECT id FROM patients WHERE email = ?", [email], |row| {
                row.get(0)
            })
            .optional()
            .map_err(Into::into)
    }

    /// Whether a patient with this phone number exists.
    pub fn patient_exists(&self, phone: &str) -> DbResult<bool> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM patients WHERE phone = ?)",
            [phone],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// List all patients, records loaded, ordered by name.
    pub fn list_patients(&self) -> DbResult<Vec<Patient>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM patients ORDER BY name",
            PATIENT_COLUMNS
        ))?;
        let rows = stmt.query_map([], patient_from_row)?;
        let patients = rows.collect::<Result<Vec<_>, _>>()?;
        patients.into_iter().map(|p| self.attach_records(p)).collect()
    }

    /// List patients in a given status, records loaded, ordered by name.
    pub fn list_patients_by_status(&self, status: PatientStatus) -> DbResult<Vec<Patient>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM patients WHERE status = ? ORDER BY name",
            PATIENT_COLUMNS
        ))?;
        let rows = stmt.query_map([status.as_str()], patient_from_row)?;
        let patients = rows.collect::<Result<Vec<_>, _>>()?;
        patients.into_iter().map(|p| self.attach_records(p)).collect()
    }

    /// Set a patient's status.
    pub fn update_patient_status(&self, id: &str, status: PatientStatus) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE patients SET status = ?, updated_at = datetime('now') WHERE id = ?",
            [status.as_str(), id],
        )?;
        Ok(rows_affected > 0)
    }

    /// Delete a patient and its records in one transaction.
    pub fn delete_patient(&self, id: &str) -> DbResult<bool> {
        let tx = self.conn.unchecked_transaction()?;
        self.conn
            .execute("DELETE FROM clinical_records WHERE patient_id = ?", [id])?;
        let rows_affected = self.conn.execute("DELETE FROM patients WHERE id = ?", [id])?;
        tx.commit()?;
        Ok(rows_affected > 0)
    }

    fn attach_records(&self, mut patient: Patient) -> DbResult<Patient> {
        patient.records = self.records_for_patient(&patient.id)?;
        Ok(patient)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ClinicalRecord;

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn test_save_and_get() {
        let db = setup_db();

        let mut patient = Patient::new("Ana".into(), "+34600000001".into());
        patient.last_name = Some("García".into());
        patient.email = Some("ana@example.com".into());
        db.save_patient(&patient).unwrap();

        let retrieved = db.get_patient(&patient.id).unwrap().unwrap();
        assert_eq!(retrieved.name, "Ana");
        assert_eq!(retrieved.last_name, Some("García".into()));
        assert_eq!(retrieved.status, PatientStatus::Active);
    }

    #[test]
    fn test_save_replaces_record_set() {
        let db = setup_db();

        let mut patient = Patient::new("Ana".into(), "+34600000001".into());
        patient
            .records
            .push(ClinicalRecord::new("treatments".into(), "Checkup".into()));
        db.save_patient(&patient).unwrap();

        patient.records = vec![ClinicalRecord::new("payments".into(), "Invoice".into())];
        db.save_patient(&patient).unwrap();

        let retrieved = db.get_patient(&patient.id).unwrap().unwrap();
        assert_eq!(retrieved.records.len(), 1);
        assert_eq!(retrieved.records[0].category_id, "payments");
    }

    #[test]
    fn test_lookup_by_phone_and_email() {
        let db = setup_db();

        let mut patient = Patient::new("Ana".into(), "+34600000001".into());
        patient.email = Some("ana@example.com".into());
        db.save_patient(&patient).unwrap();

        assert_eq!(
            db.patient_id_by_phone("+34600000001").unwrap(),
            Some(patient.id.clone())
        );
        assert_eq!(
            db.patient_id_by_email("ana@example.com").unwrap(),
            Some(patient.id.clone())
        );
        assert_eq!(db.patient_id_by_phone("+34999999999").unwrap(), None);
        assert!(db.patient_exists("+34600000001").unwrap());
        assert!(!db.patient_exists("+34999999999").unwrap());
    }

    #[test]
    fn test_list_by_status() {
        let db = setup_db();

        let active = Patient::new("Ana".into(), "+34600000001".into());
        let mut suspended = Patient::new("Eva".into(), "+34600000002".into());
        suspended.status = PatientStatus::Suspended;
        db.save_patient(&active).unwrap();
        db.save_patient(&suspended).unwrap();

        let listed = db.list_patients_by_status(PatientStatus::Suspended).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Eva");
        assert_eq!(db.list_patients().unwrap().len(), 2);
    }

    #[test]
    fn test_delete_patient_removes_records() {
        let db = setup_db();

        let mut patient = Patient::new("Ana".into(), "+34600000001".into());
        patient
            .records
            .push(ClinicalRecord::new("treatments".into(), "Checkup".into()));
        db.save_patient(&patient).unwrap();

        assert!(db.delete_patient(&patient.id).unwrap());
        assert!(db.get_patient(&patient.id).unwrap().is_none());

        let orphans: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM clinical_records", [], |row| row.get(0))
            .unwrap();
        assert_eq!(orphans, 0);
    }
}
