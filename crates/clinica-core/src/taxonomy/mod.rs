//! Category taxonomy service.
//!
//! Owns the ordered category list and its mutation rules: display orders
//! stay a contiguous 1..N permutation after every successful change.

use thiserror::Error;
use tracing::{info, warn};

use crate::db::{Database, DbError};
use crate::models::{Category, SubCategory};

/// Taxonomy errors.
#[derive(Error, Debug)]
pub enum TaxonomyError {
    #[error("database error: {0}")]
    Db(#[from] DbError),

    #[error("category '{0}' already exists")]
    AlreadyExists(String),

    #[error("category '{0}' not found")]
    NotFound(String),

    #[error("cannot delete the last remaining category")]
    LastCategory,

    #[error("target position {target} is outside 1..={count}")]
    OutOfRange { target: i64, count: u32 },

    #[error("no category holds display order {0}")]
    NoSwapTarget(u32),

    #[error("category '{0}' is the primary category and cannot be deleted")]
    PrimaryCategory(String),

    #[error("category '{0}' is still active and cannot be deleted")]
    StillActive(String),
}

pub type TaxonomyResult<T> = Result<T, TaxonomyError>;

/// Direction for [`CategoryTaxonomy::move_category`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

/// Service over the category taxonomy.
pub struct CategoryTaxonomy<'a> {
    db: &'a Database,
}

impl<'a> CategoryTaxonomy<'a> {
    /// Create a new taxonomy service.
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Seed the default taxonomy if no category exists yet.
    pub fn ensure_defaults(&self) -> TaxonomyResult<()> {
        if self.db.category_count()? > 0 {
            return Ok(());
        }
        for category in default_categories() {
            self.db.save_category(&category)?;
        }
        info!("default categories initialized");
        Ok(())
    }

    /// All categories ascending by display order.
    pub fn list_all(&self) -> TaxonomyResult<Vec<Category>> {
        Ok(self.db.list_categories()?)
    }

    /// Active categories, order preserved.
    pub fn list_active(&self) -> TaxonomyResult<Vec<Category>> {
        let mut categories = self.list_all()?;
        categories.retain(|c| c.active);
        Ok(categories)
    }

    /// Point lookup with subcategories loaded.
    pub fn get_by_id(&self, id: &str) -> TaxonomyResult<Option<Category>> {
        Ok(self.db.get_category(id)?)
    }

    /// Add a new category.
    ///
    /// The caller supplies the display order (append-to-end callers pass
    /// count + 1); no renumbering happens here.
    pub fn add(&self, category: &Category) -> TaxonomyResult<()> {
        if self.db.category_exists(&category.id)? {
            warn!(id = %category.id, "category already exists, use update instead");
            return Err(TaxonomyError::AlreadyExists(category.id.clone()));
        }
        self.db.save_category(category)?;
        info!(name = %category.name, "category added");
        Ok(())
    }

    /// Overwrite an existing category in place (full replace, not a merge).
    pub fn update(&self, category: &Category) -> TaxonomyResult<()> {
        if !self.db.category_exists(&category.id)? {
            warn!(id = %category.id, "attempt to update a category that does not exist");
            return Err(TaxonomyError::NotFound(category.id.clone()));
        }
        self.db.save_category(category)?;
        info!(name = %category.name, "category updated");
        Ok(())
    }

    /// Delete a category, then renumber the remaining ones.
    ///
    /// Only guards existence and the never-empty rule; see [`Self::safe_delete`]
    /// for the primary/active preconditions.
    pub fn delete(&self, id: &str) -> TaxonomyResult<()> {
        if self.db.category_count()? <= 1 {
            warn!("cannot delete the only remaining category");
            return Err(TaxonomyError::LastCategory);
        }
        if !self.db.delete_category(id)? {
            warn!(id = %id, "attempt to delete a category that does not exist");
            return Err(TaxonomyError::NotFound(id.to_string()));
        }
        self.reorder()?;
        info!(id = %id, "category deleted");
        Ok(())
    }

    /// Delete with the caller-facing preconditions enforced: the primary
    /// category (display order 1) and active categories are refused.
    pub fn safe_delete(&self, id: &str) -> TaxonomyResult<()> {
        let category = self
            .get_by_id(id)?
            .ok_or_else(|| TaxonomyError::NotFound(id.to_string()))?;
        if category.display_order == 1 {
            return Err(TaxonomyError::PrimaryCategory(id.to_string()));
        }
        if category.active {
            return Err(TaxonomyError::StillActive(id.to_string()));
        }
        self.delete(id)
    }

    /// Swap a category with its neighbor above or below.
    ///
    /// A two-element transposition of persisted orders, not a shift. With a
    /// contiguous taxonomy this is safe; drifted orders surface as
    /// [`TaxonomyError::NoSwapTarget`].
    pub fn move_category(&self, id: &str, direction: MoveDirection) -> TaxonomyResult<()> {
        let categories = self.list_all()?;
        let count = categories.len() as u32;

        let category = categories
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| TaxonomyError::NotFound(id.to_string()))?;

        let current = category.display_order;
        let target = match direction {
            MoveDirection::Up => current as i64 - 1,
            MoveDirection::Down => current as i64 + 1,
        };
        if target < 1 || target > count as i64 {
            warn!(id = %id, target, "move out of bounds");
            return Err(TaxonomyError::OutOfRange { target, count });
        }
        let target = target as u32;

        let swap_partner = categories
            .iter()
            .find(|c| c.display_order == target)
            .ok_or(TaxonomyError::NoSwapTarget(target))?;

        self.db.update_category_order(&category.id, target)?;
        self.db.update_category_order(&swap_partner.id, current)?;
        info!(name = %category.name, position = target, "category moved");
        info!(name = %swap_partner.name, position = current, "category moved");
        Ok(())
    }

    /// Walk the current order and assign 1..N, persisting every category.
    /// Restores contiguity after deletions.
    pub fn reorder(&self) -> TaxonomyResult<()> {
        for (index, category) in self.list_all()?.iter().enumerate() {
            self.db
                .update_category_order(&category.id, index as u32 + 1)?;
        }
        info!("categories renumbered");
        Ok(())
    }
}

/// The seed taxonomy: 5 categories, 3 subcategories each.
fn default_categories() -> Vec<Category> {
    fn sub(id: &str, name: &str, order: u32) -> SubCategory {
        SubCategory::new(id.into(), name.into(), order)
    }
    fn cat(id: &str, name: &str, icon: &str, order: u32, subs: Vec<SubCategory>) -> Category {
        let mut category = Category::new(id.into(), name.into(), icon.into(), order);
        category.sub_categories = subs;
        category
    }

    vec![
        cat(
            "appointments",
            "Appointments",
            "calendar",
            1,
            vec![
                sub("view", "View / Request", 1),
                sub("modify", "Modify / Cancel", 2),
                sub("reminders", "Reminders", 3),
            ],
        ),
        cat(
            "treatments",
            "Treatments",
            "doctor",
            2,
            vec![
                sub("active", "Active", 1),
                sub("follow", "Follow-up", 2),
                sub("history", "History", 3),
            ],
        ),
        cat(
            "payments",
            "Payments",
            "euro",
            3,
            vec![
                sub("pending", "Pending invoices", 1),
                sub("quotes", "Quotes", 2),
                sub("history", "History", 3),
            ],
        ),
        cat(
            "documents",
            "Documents",
            "file-text",
            4,
            vec![
                sub("upload", "Upload", 1),
                sub("view", "View", 2),
                sub("share", "Share", 3),
            ],
        ),
        cat(
            "communications",
            "Communications",
            "comment",
            5,
            vec![
                sub("messages", "Messages", 1),
                sub("notifications", "Notifications", 2),
                sub("feedback", "Feedback", 3),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_taxonomy(db: &Database) -> CategoryTaxonomy<'_> {
        let taxonomy = CategoryTaxonomy::new(db);
        taxonomy.ensure_defaults().unwrap();
        taxonomy
    }

    #[test]
    fn test_defaults_seeded_once() {
        let db = Database::open_in_memory().unwrap();
        let taxonomy = setup_taxonomy(&db);

        taxonomy.ensure_defaults().unwrap(); // second call is a no-op
        let categories = taxonomy.list_all().unwrap();
        assert_eq!(categories.len(), 5);
    }

    #[test]
    fn test_add_rejects_duplicate_id() {
        let db = Database::open_in_memory().unwrap();
        let taxonomy = setup_taxonomy(&db);

        let duplicate = Category::new("payments".into(), "Payments".into(), "euro".into(), 6);
        let result = taxonomy.add(&duplicate);
        assert!(matches!(result, Err(TaxonomyError::AlreadyExists(_))));
    }

    #[test]
    fn test_update_rejects_unknown_id() {
        let db = Database::open_in_memory().unwrap();
        let taxonomy = setup_taxonomy(&db);

        let unknown = Category::new("labs".into(), "Labs".into(), "flask".into(), 6);
        let result = taxonomy.update(&unknown);
        assert!(matches!(result, Err(TaxonomyError::NotFound(_))));
    }

    #[test]
    fn test_delete_renumbers() {
        let db = Database::open_in_memory().unwrap();
        let taxonomy = setup_taxonomy(&db);

        taxonomy.delete("payments").unwrap();

        let orders: Vec<u32> = taxonomy
            .list_all()
            .unwrap()
            .iter()
            .map(|c| c.display_order)
            .collect();
        assert_eq!(orders, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_delete_guards_last_category() {
        let db = Database::open_in_memory().unwrap();
        let taxonomy = CategoryTaxonomy::new(&db);

        let only = Category::new("general".into(), "General".into(), "folder".into(), 1);
        taxonomy.add(&only).unwrap();

        let result = taxonomy.delete("general");
        assert!(matches!(result, Err(TaxonomyError::LastCategory)));
        assert_eq!(taxonomy.list_all().unwrap().len(), 1);
    }

    #[test]
    fn test_safe_delete_guards() {
        let db = Database::open_in_memory().unwrap();
        let taxonomy = setup_taxonomy(&db);

        // Primary category (order 1)
        let result = taxonomy.safe_delete("appointments");
        assert!(matches!(result, Err(TaxonomyError::PrimaryCategory(_))));

        // Active category
        let result = taxonomy.safe_delete("payments");
        assert!(matches!(result, Err(TaxonomyError::StillActive(_))));

        // Deactivated, non-primary category goes through
        let mut payments = taxonomy.get_by_id("payments").unwrap().unwrap();
        payments.active = false;
        taxonomy.update(&payments).unwrap();
        taxonomy.safe_delete("payments").unwrap();
        assert!(taxonomy.get_by_id("payments").unwrap().is_none());
    }

    #[test]
    fn test_move_swaps_orders() {
        let db = Database::open_in_memory().unwrap();
        let taxonomy = setup_taxonomy(&db);

        taxonomy.move_category("treatments", MoveDirection::Up).unwrap();

        let ids: Vec<String> = taxonomy
            .list_all()
            .unwrap()
            .iter()
            .map(|c| c.id.clone())
            .collect();
        assert_eq!(ids[0], "treatments");
        assert_eq!(ids[1], "appointments");
    }

    #[test]
    fn test_move_bounds() {
        let db = Database::open_in_memory().unwrap();
        let taxonomy = setup_taxonomy(&db);

        let result = taxonomy.move_category("appointments", MoveDirection::Up);
        assert!(matches!(result, Err(TaxonomyError::OutOfRange { .. })));

        let result = taxonomy.move_category("communications", MoveDirection::Down);
        assert!(matches!(result, Err(TaxonomyError::OutOfRange { .. })));
    }

    #[test]
    fn test_move_unknown_category() {
        let db = Database::open_in_memory().unwrap();
        let taxonomy = setup_taxonomy(&db);

        let result = taxonomy.move_category("labs", MoveDirection::Up);
        assert!(matches!(result, Err(TaxonomyError::NotFound(_))));
    }

    #[test]
    fn test_list_active_filters() {
        let db = Database::open_in_memory().unwrap();
        let taxonomy = setup_taxonomy(&db);

        let mut documents = taxonomy.get_by_id("documents").unwrap().unwrap();
        documents.active = false;
        taxonomy.update(&documents).unwrap();

        let active = taxonomy.list_active().unwrap();
        assert_eq!(active.len(), 4);
        assert!(active.iter().all(|c| c.id != "documents"));
    }
}
