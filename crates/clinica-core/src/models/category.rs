//! Category taxonomy models.

use serde::{Deserialize, Serialize};

/// A top-level category used to classify clinical records.
///
/// `display_order` is a persisted rank, contiguous 1..N across all
/// categories after any successful taxonomy mutation. The category at
/// order 1 is the primary one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    /// Stable identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Opaque icon identifier; renderer lookup is a UI concern
    pub icon: String,
    /// Whether the category is currently offered
    pub active: bool,
    /// Persisted rank, 1-based
    pub display_order: u32,
    /// Owned subcategories, created and deleted with the parent
    pub sub_categories: Vec<SubCategory>,
}

/// A subcategory owned by exactly one category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubCategory {
    /// Identifier, unique within the parent category
    pub id: String,
    /// Display name
    pub name: String,
    /// Opaque icon identifier
    pub icon: Option<String>,
    /// Whether the subcategory is currently offered
    pub active: bool,
    /// Whether entries must carry this subcategory
    pub required: bool,
    /// Persisted rank within the parent, 1-based
    pub display_order: u32,
}

impl Category {
    /// Create an active category with no subcategories.
    pub fn new(id: String, name: String, icon: String, display_order: u32) -> Self {
        Self {
            id,
            name,
            icon,
            active: true,
            display_order,
            sub_categories: Vec::new(),
        }
    }
}

impl SubCategory {
    /// Create an active, optional subcategory.
    pub fn new(id: String, name: String, display_order: u32) -> Self {
        Self {
            id,
            name,
            icon: None,
            active: true,
            required: false,
            display_order,
        }
    }
}
