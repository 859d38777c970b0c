//! Category domain model.
//!
//! # Responsibility
//! - Define the category node of the catalog forest and its patch shape.
//!
//! # Invariants
//! - `name` is normalized and non-blank; uniqueness is enforced by services.
//! - `parent_id = None` marks a root. A stored `parent_id` may dangle after
//!   its target is deleted; readers treat such a node as an orphaned root.

use crate::model::validation::{normalize_optional, normalize_required, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable category identifier.
pub type CategoryId = Uuid;

/// One node of the category forest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<CategoryId>,
}

impl Category {
    /// Builds a new category with a generated id and normalized fields.
    pub fn new(
        name: &str,
        link: Option<String>,
        parent_id: Option<CategoryId>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            id: Uuid::new_v4(),
            name: normalize_required("name", name)?,
            link: normalize_optional(link),
            parent_id,
        })
    }

    /// Returns whether this node has no parent pointer at all.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Applies a normalized patch; absent fields stay untouched.
    pub fn apply(&mut self, patch: CategoryPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(link) = patch.link {
            self.link = Some(link);
        }
        if let Some(parent_id) = patch.parent_id {
            self.parent_id = Some(parent_id);
        }
    }
}

/// Partial update for one category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub link: Option<String>,
    pub parent_id: Option<CategoryId>,
}

impl CategoryPatch {
    /// Normalizes fields and rejects patches that change nothing.
    pub fn normalize(self) -> Result<Self, ValidationError> {
        let patch = Self {
            name: self
                .name
                .map(|name| normalize_required("name", &name))
                .transpose()?,
            link: normalize_optional(self.link),
            parent_id: self.parent_id,
        };
        if patch.name.is_none() && patch.link.is_none() && patch.parent_id.is_none() {
            return Err(ValidationError::EmptyPatch("category"));
        }
        Ok(patch)
    }
}

/// Ancestor chain of one category, nearest-first, starting with itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPath {
    pub category_id: CategoryId,
    pub chain: Vec<Category>,
}

impl CategoryPath {
    /// Number of ancestors above the category itself.
    pub fn depth(&self) -> usize {
        self.chain.len().saturating_sub(1)
    }

    /// Returns the top-most resolved node: a root or an orphan.
    pub fn top(&self) -> Option<&Category> {
        self.chain.last()
    }
}

#[cfg(test)]
mod tests {
    use super::{Category, CategoryPatch};
    use crate::model::validation::ValidationError;
    use uuid::Uuid;

    #[test]
    fn patch_without_fields_is_rejected() {
        let err = CategoryPatch {
            link: Some("  ".to_string()),
            ..CategoryPatch::default()
        }
        .normalize()
        .unwrap_err();
        assert_eq!(err, ValidationError::EmptyPatch("category"));
    }

    #[test]
    fn apply_keeps_absent_fields() {
        let parent = Uuid::new_v4();
        let mut category =
            Category::new("Weapons", Some("https://wiki/weapons".to_string()), None).unwrap();
        category.apply(
            CategoryPatch {
                parent_id: Some(parent),
                ..CategoryPatch::default()
            }
            .normalize()
            .unwrap(),
        );
        assert_eq!(category.name, "Weapons");
        assert_eq!(category.link.as_deref(), Some("https://wiki/weapons"));
        assert_eq!(category.parent_id, Some(parent));
    }

    #[test]
    fn serializes_parent_as_camel_case() {
        let parent = Uuid::new_v4();
        let category = Category::new("Swords", None, Some(parent)).unwrap();
        let value = serde_json::to_value(&category).unwrap();
        assert_eq!(value["parentId"], parent.to_string());
        assert!(value.get("link").is_none());
    }
}
