//! SQLite schema definition.

/// Complete database schema for the clinical records store.
///
/// Ownership is enforced procedurally in the store operations: deleting a
/// patient deletes its clinical records, deleting a category deletes its
/// subcategories. Foreign keys here only guard referential integrity.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Patients
-- ============================================================================

CREATE TABLE IF NOT EXISTS patients (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    last_name TEXT,
    email TEXT UNIQUE,
    phone TEXT NOT NULL UNIQUE,
    gender TEXT,
    address TEXT,
    status TEXT NOT NULL DEFAULT 'active',
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_patients_status ON patients(status);
CREATE INDEX IF NOT EXISTS idx_patients_name ON patients(name);

-- ============================================================================
-- Clinical Records (owned by patients)
-- ============================================================================

CREATE TABLE IF NOT EXISTS clinical_records (
    id TEXT PRIMARY KEY,
    patient_id TEXT NOT NULL REFERENCES patients(id),
    category_id TEXT NOT NULL,
    sub_category_id TEXT,
    title TEXT NOT NULL,
    description TEXT,
    status TEXT NOT NULL DEFAULT 'Pending',
    date TEXT
);

CREATE INDEX IF NOT EXISTS idx_records_patient ON clinical_records(patient_id);
CREATE INDEX IF NOT EXISTS idx_records_category ON clinical_records(category_id);

-- ============================================================================
-- Category Taxonomy
-- ============================================================================

CREATE TABLE IF NOT EXISTS categories (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    icon TEXT NOT NULL,
    active INTEGER NOT NULL DEFAULT 1,
    display_order INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_categories_order ON categories(display_order);

-- Subcategory ids repeat across parents, so the key is scoped to the parent
CREATE TABLE IF NOT EXISTS sub_categories (
    category_id TEXT NOT NULL REFERENCES categories(id),
    id TEXT NOT NULL,
    name TEXT NOT NULL,
    icon TEXT,
    active INTEGER NOT NULL DEFAULT 1,
    required INTEGER NOT NULL DEFAULT 0,
    display_order INTEGER NOT NULL,
    PRIMARY KEY (category_id, id)
);
"#;
