//! Quest document model with its embedded step arena.
//!
//! # Responsibility
//! - Define the quest document and the ordered steps it owns.
//! - Provide index-based arena edits: find the step position by id, then
//!   push, replace or remove at that position.
//!
//! # Invariants
//! - Step order is insertion order; no operation reorders steps.
//! - A step id appears at most once in the arena. Global uniqueness across
//!   quests is enforced when ids are generated.

use crate::model::validation::{normalize_optional, normalize_required, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable quest identifier.
pub type QuestId = Uuid;
/// Stable step identifier, unique across every quest in the store.
pub type StepId = Uuid;

/// One ordered entry inside a quest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub id: StepId,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default)]
    pub status: bool,
}

impl Step {
    /// Applies a normalized patch; absent fields stay untouched.
    pub fn apply(&mut self, patch: StepPatch) {
        if let Some(text) = patch.text {
            self.text = text;
        }
        if let Some(link) = patch.link {
            self.link = Some(link);
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
    }
}

/// Quest document. Steps are stored and written together with the quest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quest {
    pub id: QuestId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    pub status: bool,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Quest {
    /// Returns the arena index of one step.
    pub fn step_position(&self, step_id: StepId) -> Option<usize> {
        self.steps.iter().position(|step| step.id == step_id)
    }

    /// Appends one step at the tail.
    pub fn push_step(&mut self, step: Step) {
        self.steps.push(step);
    }

    /// Patches the step in place and returns its new state.
    pub fn patch_step(&mut self, step_id: StepId, patch: StepPatch) -> Option<&Step> {
        let index = self.step_position(step_id)?;
        let step = &mut self.steps[index];
        step.apply(patch);
        Some(step)
    }

    /// Removes exactly one step; the order of the remainder is kept.
    pub fn remove_step(&mut self, step_id: StepId) -> Option<Step> {
        let index = self.step_position(step_id)?;
        Some(self.steps.remove(index))
    }

    /// Applies a normalized quest patch. Steps are never touched here.
    pub fn apply(&mut self, patch: QuestPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(link) = patch.link {
            self.link = Some(link);
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
    }
}

/// Create request for one quest. New quests start without steps.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewQuest {
    pub name: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub status: Option<bool>,
}

impl NewQuest {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            link: None,
            status: None,
        }
    }

    pub fn into_quest(self) -> Result<Quest, ValidationError> {
        Ok(Quest {
            id: Uuid::new_v4(),
            name: normalize_required("name", &self.name)?,
            link: normalize_optional(self.link),
            status: self.status.unwrap_or(false),
            steps: Vec::new(),
        })
    }
}

/// Partial update for quest-level fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct QuestPatch {
    pub name: Option<String>,
    pub link: Option<String>,
    pub status: Option<bool>,
}

impl QuestPatch {
    pub fn normalize(self) -> Result<Self, ValidationError> {
        let patch = Self {
            name: self
                .name
                .map(|name| normalize_required("name", &name))
                .transpose()?,
            link: normalize_optional(self.link),
            status: self.status,
        };
        if patch.name.is_none() && patch.link.is_none() && patch.status.is_none() {
            return Err(ValidationError::EmptyPatch("quest"));
        }
        Ok(patch)
    }
}

/// Append request for one step. The id is assigned by the step service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewStep {
    pub text: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub status: Option<bool>,
}

impl NewStep {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            link: None,
            status: None,
        }
    }

    /// Validates input and builds the step under the given id.
    pub fn into_step(self, id: StepId) -> Result<Step, ValidationError> {
        Ok(Step {
            id,
            text: normalize_required("text", &self.text)?,
            link: normalize_optional(self.link),
            status: self.status.unwrap_or(false),
        })
    }
}

/// Partial update for one step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StepPatch {
    pub text: Option<String>,
    pub link: Option<String>,
    pub status: Option<bool>,
}

impl StepPatch {
    pub fn normalize(self) -> Result<Self, ValidationError> {
        let patch = Self {
            text: self
                .text
                .map(|text| normalize_required("text", &text))
                .transpose()?,
            link: normalize_optional(self.link),
            status: self.status,
        };
        if patch.text.is_none() && patch.link.is_none() && patch.status.is_none() {
            return Err(ValidationError::EmptyPatch("step"));
        }
        Ok(patch)
    }
}
