//! Boss domain model. Flat entity with a unique name.

use crate::model::validation::{normalize_optional, normalize_required, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable boss identifier.
pub type BossId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Boss {
    pub id: BossId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    pub status: bool,
    pub location: String,
}

impl Boss {
    /// Applies a normalized patch; absent fields stay untouched.
    pub fn apply(&mut self, patch: BossPatch) {
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
            self.location = location;
        }
    }
}

/// Create request for one boss.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBoss {
    pub name: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub status: Option<bool>,
    pub location: String,
}

impl NewBoss {
    pub fn into_boss(self) -> Result<Boss, ValidationError> {
        Ok(Boss {
            id: Uuid::new_v4(),
            name: normalize_required("name", &self.name)?,
            link: normalize_optional(self.link),
            status: self.status.unwrap_or(false),
            location: normalize_required("location", &self.location)?,
        })
    }
}

/// Partial update for one boss.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BossPatch {
    pub name: Option<String>,
    pub link: Option<String>,
    pub status: Option<bool>,
    pub location: Option<String>,
}

impl BossPatch {
    pub fn normalize(self) -> Result<Self, ValidationError> {
        let patch = Self {
            name: self
                .name
                .map(|name| normalize_required("name", &name))
                .transpose()?,
            link: normalize_optional(self.link),
            status: self.status,
            location: self
                .location
                .map(|location| normalize_required("location", &location))
                .transpose()?,
        };
        if patch.name.is_none()
            && patch.link.is_none()
            && patch.status.is_none()
            && patch.location.is_none()
        {
            return Err(ValidationError::EmptyPatch("boss"));
        }
        Ok(patch)
    }
}
