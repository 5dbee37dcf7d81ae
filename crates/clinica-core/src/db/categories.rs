//! Category database operations.
//!
//! Subcategories cascade with their parent: saving a category replaces its
//! subcategory set, deleting it removes them first.

use rusqlite::params;
use rusqlite::OptionalExtension;

use super::{Database, DbResult};
use crate::models::{Category, SubCategory};

fn category_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        icon: row.get(2)?,
        active: row.get(3)?,
        display_order: row.get(4)?,
        sub_categories: Vec::new(),
    })
}

fn sub_category_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SubCategory> {
    Ok(SubCategory {
        id: row.get(0)?,
        name: row.get(1)?,
        icon: row.get(2)?,
        active: row.get(3)?,
        required: row.get(4)?,
        display_order: row.get(5)?,
    })
}

impl Database {
    /// Number of categories in the taxonomy.
    pub fn category_count(&self) -> DbResult<u32> {
        let count: u32 = self
            .conn
            .query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Whether a category with this id exists.
    pub fn category_exists(&self, id: &str) -> DbResult<bool> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE id = ?)",
            [id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Get a category by id, with subcategories loaded in display order.
    pub fn get_category(&self, id: &str) -> DbResult<Option<Category>> {
        let category = self
            .conn
            .query_row(
                "SELECT id, name, icon, active, display_order FROM categories WHERE id = ?",
                [id],
                category_from_row,
            )
            .optional()?;
        category.map(|c| self.attach_sub_categories(c)).transpose()
    }

    /// All categories ascending by display order, subcategories loaded.
    pub fn list_categories(&self) -> DbResult<Vec<Category>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, icon, active, display_order FROM categories ORDER BY display_order",
        )?;
        let rows = stmt.query_map([], category_from_row)?;
        let categories = rows.collect::<Result<Vec<_>, _>>()?;
        categories
            .into_iter()
            .map(|c| self.attach_sub_categories(c))
            .collect()
    }

    /// Save a category and its full subcategory set in one transaction.
    pub fn save_category(&self, category: &Category) -> DbResult<()> {
        let tx = self.conn.unchecked_transaction()?;

        self.conn.execute(
            r#"
            INSERT INTO categories (id, name, icon, active, display_order)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                icon = excluded.icon,
                active = excluded.active,
                display_order = excluded.display_order
            "#,
            params![
                category.id,
                category.name,
                category.icon,
                category.active,
                category.display_order,
            ],
        )?;

        self.conn.execute(
            "DELETE FROM sub_categories WHERE category_id = ?",
            [&category.id],
        )?;
        for sub in &category.sub_categories {
            self.conn.execute(
                r#"
                INSERT INTO sub_categories (
                    category_id, id, name, icon, active, required, display_order
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
                params![
                    category.id,
                    sub.id,
                    sub.name,
                    sub.icon,
                    sub.active,
                    sub.required,
                    sub.display_order,
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    /// Set just the display order of a category.
    pub fn update_category_order(&self, id: &str, display_order: u32) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE categories SET display_order = ? WHERE id = ?",
            params![display_order, id],
        )?;
        Ok(rows_affected > 0)
    }

    /// Delete a category and its subcategories in one transaction.
    pub fn delete_category(&self, id: &str) -> DbResult<bool> {
        let tx = self.conn.unchecked_transaction()?;
        self.conn
            .execute("DELETE FROM sub_categories WHERE category_id = ?", [id])?;
        let rows_affected = self.conn.execute("DELETE FROM categories WHERE id = ?", [id])?;
        tx.commit()?;
        Ok(rows_affected > 0)
    }

    fn attach_sub_categories(&self, mut category: Category) -> DbResult<Category> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, name, icon, active, required, display_order
            FROM sub_categories
            WHERE category_id = ?
            ORDER BY display_order
            "#,
        )?;
        let rows = stmt.query_map([&category.id], sub_category_from_row)?;
        category.sub_categories = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(category)
    }
}
