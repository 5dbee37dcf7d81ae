//! Clinica Core Library
//!
//! Business core for a clinical records administration tool: patients,
//! their clinical-data entries, and the two-level category taxonomy used
//! to classify them.
//!
//! # Architecture
//!
//! ```text
//! caller (UI / API layer)
//!     │ selects a patient
//!     ▼
//! PatientLifecycle ── uniqueness guards, active/suspended state machine,
//!     │               record add/update/delete
//!     │ loads records (optionally scoped to one category)
//!     ▼
//! timeline::filter_and_sort ── status + folded-text filter,
//!     │                        priority/date/category ranking
//!     ▼
//! ranked records back to the caller
//!
//! CategoryTaxonomy ── ordered category list, contiguous 1..N display
//!                     orders, move/reorder/delete guards (read by the
//!                     timeline for its category ranking)
//! ```
//!
//! Everything persists through [`db::Database`], a SQLite-backed record
//! store; services borrow it and execute synchronously to completion.
//!
//! # Modules
//!
//! - [`db`]: SQLite record store
//! - [`models`]: domain types (Patient, ClinicalRecord, Category)
//! - [`taxonomy`]: category taxonomy service
//! - [`lifecycle`]: patient lifecycle service
//! - [`timeline`]: pure filter/sort over one patient's records

pub mod db;
pub mod lifecycle;
pub mod models;
pub mod taxonomy;
pub mod timeline;

// Re-export commonly used types
pub use db::{Database, DbError};
pub use lifecycle::{LifecycleError, PatientLifecycle};
pub use models::{
    Category, ClinicalRecord, ClinicalStatus, ParseClinicalStatusError, Patient, PatientStatus,
    SubCategory,
};
pub use taxonomy::{CategoryTaxonomy, MoveDirection, TaxonomyError};
pub use timeline::{category_order_index, filter_and_sort, StatusFilter};
