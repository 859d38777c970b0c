//! Embedded step collection use-case service.
//!
//! # Responsibility
//! - Append, patch and remove steps inside one quest document.
//! - Generate step ids that are unique across every quest.
//!
//! # Invariants
//! - Each operation reads the quest, edits the step arena in memory and
//!   writes the whole arena back inside one write scope. Concurrent readers
//!   see either the old or the new arena.
//! - Steps are never reordered; removal keeps the relative order of the rest.
//! - Update and delete resolve the owning quest from the step id alone.

use crate::model::quest::{NewStep, Quest, QuestId, Step, StepId, StepPatch};
use crate::repo::quest_repo::QuestRepository;
use crate::repo::EntityRef;
use crate::service::error::{ServiceError, ServiceResult};
use log::{debug, warn};
use uuid::Uuid;

/// Candidate ids drawn before an append is rejected.
pub const MAX_STEP_ID_ATTEMPTS: usize = 8;

type StepIdSource = Box<dyn Fn() -> StepId + Send + Sync>;

/// Step collection service facade.
pub struct StepService<Q: QuestRepository> {
    quests: Q,
    id_source: StepIdSource,
}

impl<Q: QuestRepository> StepService<Q> {
    /// Creates service drawing random v4 step ids.
    pub fn new(quests: Q) -> Self {
        Self::with_id_source(quests, Uuid::new_v4)
    }

    /// Creates service with a custom step id generator.
    pub fn with_id_source(
        quests: Q,
        id_source: impl Fn() -> StepId + Send + Sync + 'static,
    ) -> Self {
        Self {
            quests,
            id_source: Box::new(id_source),
        }
    }

    /// Lists the ordered steps of one quest.
    pub fn list_steps(&self, quest_id: QuestId) -> ServiceResult<Vec<Step>> {
        Ok(self.require_quest(quest_id)?.steps)
    }

    /// Appends one step at the tail of the quest.
    pub fn append_step(&self, quest_id: QuestId, new_step: NewStep) -> ServiceResult<Step> {
        let draft = new_step.into_step(Uuid::nil())?;
        let step = self.quests.write_scope(move || {
            let mut quest = self.require_quest(quest_id)?;
            let step = Step {
                id: self.fresh_step_id()?,
                ..draft
            };
            quest.push_step(step.clone());
            self.quests.replace_steps(quest.id, &quest.steps)?;
            Ok::<_, ServiceError>(step)
        })?;

        debug!(
            "event=step_append module=step_service status=ok quest_id={} step_id={}",
            quest_id, step.id
        );
        Ok(step)
    }

    /// Patches one step found by id; returns the quest and the new step state.
    pub fn update_step(&self, step_id: StepId, patch: StepPatch) -> ServiceResult<(Quest, Step)> {
        let patch = patch.normalize()?;
        let (quest, step) = self.quests.write_scope(move || {
            let mut quest = self.require_step_owner(step_id)?;
            let step = quest
                .patch_step(step_id, patch)
                .cloned()
                .ok_or(ServiceError::NotFound(EntityRef::Step(step_id)))?;
            self.quests.replace_steps(quest.id, &quest.steps)?;
            Ok::<_, ServiceError>((quest, step))
        })?;

        debug!(
            "event=step_update module=step_service status=ok quest_id={} step_id={}",
            quest.id, step_id
        );
        Ok((quest, step))
    }

    /// Removes one step found by id; returns the quest after removal.
    pub fn delete_step(&self, step_id: StepId) -> ServiceResult<Quest> {
        let quest = self.quests.write_scope(|| {
            let mut quest = self.require_step_owner(step_id)?;
            quest
                .remove_step(step_id)
                .ok_or(ServiceError::NotFound(EntityRef::Step(step_id)))?;
            self.quests.replace_steps(quest.id, &quest.steps)?;
            Ok::<_, ServiceError>(quest)
        })?;

        debug!(
            "event=step_delete module=step_service status=ok quest_id={} step_id={} remaining={}",
            quest.id,
            step_id,
            quest.steps.len()
        );
        Ok(quest)
    }

    fn require_quest(&self, quest_id: QuestId) -> ServiceResult<Quest> {
        self.quests
            .get_quest(quest_id)?
            .ok_or(ServiceError::NotFound(EntityRef::Quest(quest_id)))
    }

    fn require_step_owner(&self, step_id: StepId) -> ServiceResult<Quest> {
        self.quests
            .find_quest_by_step(step_id)?
            .ok_or(ServiceError::NotFound(EntityRef::Step(step_id)))
    }

    fn fresh_step_id(&self) -> ServiceResult<StepId> {
        for attempt in 1..=MAX_STEP_ID_ATTEMPTS {
            let candidate = (self.id_source)();
            if candidate.is_nil() || self.quests.step_id_exists(candidate)? {
                debug!(
                    "event=step_id_collision module=step_service status=retry attempt={}",
                    attempt
                );
                continue;
            }
            return Ok(candidate);
        }

        warn!(
            "event=step_append module=step_service status=error error_code=step_id_exhausted attempts={}",
            MAX_STEP_ID_ATTEMPTS
        );
        Err(ServiceError::StepIdExhausted {
            attempts: MAX_STEP_ID_ATTEMPTS,
        })
    }
}
