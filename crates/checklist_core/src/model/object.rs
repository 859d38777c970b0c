//! Catalog object domain model.
//!
//! # Invariants
//! - `category_id` pointed at an existing category when the object was
//!   written; it is immutable afterwards.
//! - Object names are not unique.

use crate::model::category::CategoryId;
use crate::model::validation::{normalize_optional, normalize_required, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable object identifier.
pub type ObjectId = Uuid;

/// Leaf entry owned by one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogObject {
    pub id: ObjectId,
    pub category_id: CategoryId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    pub status: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl CatalogObject {
    /// Applies a normalized patch; absent fields stay untouched.
    pub fn apply(&mut self, patch: ObjectPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(link) = patch.link {
            self.link = Some(link);
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(location) = patch.location {
            self.location = Some(location);
        }
        if let Some(details) = patch.details {
            self.details = Some(details);
        }
    }
}

/// Create request for one object.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewObject {
    pub category_id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub status: Option<bool>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
}

impl NewObject {
    /// Convenience constructor with every optional field absent.
    pub fn named(category_id: CategoryId, name: impl Into<String>) -> Self {
        Self {
            category_id,
            name: name.into(),
            link: None,
            status: None,
            location: None,
            details: None,
        }
    }

    /// Validates input and materializes the record with a fresh id.
    pub fn into_object(self) -> Result<CatalogObject, ValidationError> {
        Ok(CatalogObject {
            id: Uuid::new_v4(),
            category_id: self.category_id,
            name: normalize_required("name", &self.name)?,
            link: normalize_optional(self.link),
            status: self.status.unwrap_or(false),
            location: normalize_optional(self.location),
            details: normalize_optional(self.details),
        })
    }
}

/// Partial update for one object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectPatch {
    pub name: Option<String>,
    pub link: Option<String>,
    pub status: Option<bool>,
    pub location: Option<String>,
    pub details: Option<String>,
}

impl ObjectPatch {
    /// Normalizes fields and rejects patches that change nothing.
    pub fn normalize(self) -> Result<Self, ValidationError> {
        let patch = Self {
            name: self
                .name
                .map(|name| normalize_required("name", &name))
                .transpose()?,
            link: normalize_optional(self.link),
            status: self.status,
            location: normalize_optional(self.location),
            details: normalize_optional(self.details),
        };
        if patch.name.is_none()
            && patch.link.is_none()
            && patch.status.is_none()
            && patch.location.is_none()
            && patch.details.is_none()
        {
            return Err(ValidationError::EmptyPatch("object"));
        }
        Ok(patch)
    }
}
