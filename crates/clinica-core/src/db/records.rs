//! Clinical record database operations.
//!
//! Records live in their own table but are owned by a patient row; every
//! operation here is keyed by the owning patient.

use chrono::{DateTime, Utc};
use rusqlite::params;
use rusqlite::types::Type;

use super::{map_constraint, Database, DbResult};
use crate::models::{ClinicalRecord, ClinicalStatus};

/// Map a `SELECT id, category_id, sub_category_id, title, description,
/// status, date` row to a record. Stored status and date must parse; a
/// failure surfaces as a conversion error, not a default.
pub(crate) fn record_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ClinicalRecord> {
    let status: String = row.get(5)?;
    let status = status
        .parse::<ClinicalStatus>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?;

    let date: Option<String> = row.get(6)?;
    let date = date
        .map(|s| {
            DateTime::parse_from_rfc3339(&s)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(6, Type::Text, Box::new(e)))
        })
        .transpose()?;

    Ok(ClinicalRecord {
        id: row.get(0)?,
        category_id: row.get(1)?,
        sub_category_id: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        status,
        date,
    })
}

impl Database {
    /// Insert a clinical record for a patient.
    pub fn insert_record(&self, patient_id: &str, record: &ClinicalRecord) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO clinical_records (
                id, patient_id, category_id, sub_category_id, title, description, status, date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                record.id,
                patient_id,
                record.category_id,
                record.sub_category_id,
                record.title,
                record.description,
                record.status.as_str(),
                record.date.map(|d| d.to_rfc3339()),
            ],
        )
        .map_err(map_constraint)?;
        Ok(())
    }

    /// Replace an existing record in place, matched by id.
    pub fn update_record(&self, patient_id: &str, record: &ClinicalRecord) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE clinical_records SET
                category_id = ?3,
                sub_category_id = ?4,
                title = ?5,
                description = ?6,
                status = ?7,
                date = ?8
            WHERE id = ?1 AND patient_id = ?2
            "#,
            params![
                record.id,
                patient_id,
                record.category_id,
                record.sub_category_id,
                record.title,
                record.description,
                record.status.as_str(),
                record.date.map(|d| d.to_rfc3339()),
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Delete one record by its id.
    pub fn delete_record(&self, patient_id: &str, record_id: &str) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "DELETE FROM clinical_records WHERE id = ? AND patient_id = ?",
            [record_id, patient_id],
        )?;
        Ok(rows_affected > 0)
    }

    /// Delete every record matching a `(category, title)` pair.
    ///
    /// Returns how many rows went away; titles can collide within a
    /// category, so this may be more than one.
    pub fn delete_records_by_title(
        &self,
        patient_id: &str,
        category_id: &str,
        title: &str,
    ) -> DbResult<usize> {
        let rows_affected = self.conn.execute(
            "DELETE FROM clinical_records WHERE patient_id = ? AND category_id = ? AND title = ?",
            [patient_id, category_id, title],
        )?;
        Ok(rows_affected)
    }

    /// All records of a patient, in insertion order.
    pub fn records_for_patient(&self, patient_id: &str) -> DbResult<Vec<ClinicalRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, category_id, sub_category_id, title, description, status, date
            FROM clinical_records
            WHERE patient_id = ?
            ORDER BY rowid
            "#,
        )?;

        let rows = stmt.query_map([patient_id], record_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Patient;

    fn setup_db_with_patient() -> (Database, String) {
        let db = Database::open_in_memory().unwrap();
        let patient = Patient::new("Ana".into(), "+34600000001".into());
        db.save_patient(&patient).unwrap();
        (db, patient.id)
    }

    #[test]
    fn test_insert_and_load() {
        let (db, patient_id) = setup_db_with_patient();

        let mut record = ClinicalRecord::new("treatments".into(), "Checkup".into());
        record.description = Some("Routine".into());
        db.insert_record(&patient_id, &record).unwrap();

        let records = db.records_for_patient(&patient_id).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Checkup");
        assert_eq!(records[0].status, ClinicalStatus::Pending);
        assert_eq!(records[0].date, record.date);
    }

    #[test]
    fn test_update_record() {
        let (db, patient_id) = setup_db_with_patient();

        let mut record = ClinicalRecord::new("treatments".into(), "Checkup".into());
        db.insert_record(&patient_id, &record).unwrap();

        record.status = ClinicalStatus::Completed;
        record.title = "Checkup done".into();
        assert!(db.update_record(&patient_id, &record).unwrap());

        let records = db.records_for_patient(&patient_id).unwrap();
        assert_eq!(records[0].status, ClinicalStatus::Completed);
        assert_eq!(records[0].title, "Checkup done");
    }

    #[test]
    fn test_update_missing_record() {
        let (db, patient_id) = setup_db_with_patient();
        let record = ClinicalRecord::new("treatments".into(), "Checkup".into());
        assert!(!db.update_record(&patient_id, &record).unwrap());
    }

    #[test]
    fn test_delete_by_title_removes_all_matches() {
        let (db, patient_id) = setup_db_with_patient();

        let first = ClinicalRecord::new("treatments".into(), "Cleaning".into());
        let second = ClinicalRecord::new("treatments".into(), "Cleaning".into());
        let other = ClinicalRecord::new("payments".into(), "Cleaning".into());
        db.insert_record(&patient_id, &first).unwrap();
        db.insert_record(&patient_id, &second).unwrap();
        db.insert_record(&patient_id, &other).unwrap();

        let removed = db
            .delete_records_by_title(&patient_id, "treatments", "Cleaning")
            .unwrap();
        assert_eq!(removed, 2);

        // The same title under another category stays
        let records = db.records_for_patient(&patient_id).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].category_id, "payments");
    }

    #[test]
    fn test_record_without_date() {
        let (db, patient_id) = setup_db_with_patient();

        let mut record = ClinicalRecord::new("treatments".into(), "Backlog".into());
        record.date = None;
        db.insert_record(&patient_id, &record).unwrap();

        let records = db.records_for_patient(&patient_id).unwrap();
        assert!(records[0].date.is_none());
    }
}
