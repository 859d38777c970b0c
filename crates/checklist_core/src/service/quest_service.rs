//! Quest document use-case service for quest-level fields.
//!
//! Step edits go through `StepService`; nothing here rewrites the arena.

use crate::model::quest::{NewQuest, Quest, QuestId, QuestPatch};
use crate::repo::quest_repo::QuestRepository;
use crate::repo::EntityRef;
use crate::service::error::{ServiceError, ServiceResult};

/// Quest service facade.
pub struct QuestService<Q: QuestRepository> {
    repo: Q,
}

impl<Q: QuestRepository> QuestService<Q> {
    pub fn new(repo: Q) -> Self {
        Self { repo }
    }

    /// Creates one quest with a unique name and no steps.
    pub fn create_quest(&self, request: NewQuest) -> ServiceResult<Quest> {
        let quest = request.into_quest()?;
        self.repo.write_scope(move || {
            self.ensure_name_available(&quest.name, None)?;
            self.repo.insert_quest(&quest)?;
            Ok::<_, ServiceError>(quest)
        })
    }

    pub fn get_quest(&self, id: QuestId) -> ServiceResult<Quest> {
        self.require_quest(id)
    }

    pub fn list_quests(&self) -> ServiceResult<Vec<Quest>> {
        Ok(self.repo.list_quests()?)
    }

    /// Applies a partial update of name, link or status.
    pub fn update_quest(&self, id: QuestId, patch: QuestPatch) -> ServiceResult<Quest> {
        let patch = patch.normalize()?;
        self.repo.write_scope(move || {
            let mut quest = self.require_quest(id)?;
            if let Some(name) = patch.name.as_deref() {
                self.ensure_name_available(name, Some(id))?;
            }
            quest.apply(patch);
            self.repo.update_quest_fields(&quest)?;
            Ok::<_, ServiceError>(quest)
        })
    }

    /// Deletes the quest document together with its steps.
    pub fn delete_quest(&self, id: QuestId) -> ServiceResult<()> {
        if !self.repo.delete_quest(id)? {
            return Err(ServiceError::NotFound(EntityRef::Quest(id)));
        }
        Ok(())
    }

    fn require_quest(&self, id: QuestId) -> ServiceResult<Quest> {
        self.repo
            .get_quest(id)?
            .ok_or(ServiceError::NotFound(EntityRef::Quest(id)))
    }

    fn ensure_name_available(&self, name: &str, owner: Option<QuestId>) -> ServiceResult<()> {
        match self.repo.find_quest_by_name(name)? {
            Some(existing) if Some(existing.id) != owner => Err(ServiceError::DuplicateName {
                entity: "quest",
                name: name.to_string(),
            }),
            _ => Ok(()),
        }
    }
}
