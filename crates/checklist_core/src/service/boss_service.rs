//! Boss use-case service.

use crate::model::boss::{Boss, BossId, BossPatch, NewBoss};
use crate::repo::boss_repo::BossRepository;
use crate::repo::EntityRef;
use crate::service::error::{ServiceError, ServiceResult};

/// Boss service facade.
pub struct BossService<B: BossRepository> {
    repo: B,
}

impl<B: BossRepository> BossService<B> {
    pub fn new(repo: B) -> Self {
        Self { repo }
    }

    /// Creates one boss with a unique name.
    pub fn create_boss(&self, request: NewBoss) -> ServiceResult<Boss> {
        let boss = request.into_boss()?;
        self.repo.write_scope(move || {
            self.ensure_name_available(&boss.name, None)?;
            self.repo.insert_boss(&boss)?;
            Ok::<_, ServiceError>(boss)
        })
    }

    pub fn get_boss(&self, id: BossId) -> ServiceResult<Boss> {
        self.require_boss(id)
    }

    pub fn list_bosses(&self) -> ServiceResult<Vec<Boss>> {
        Ok(self.repo.list_bosses()?)
    }

    pub fn update_boss(&self, id: BossId, patch: BossPatch) -> ServiceResult<Boss> {
        let patch = patch.normalize()?;
        self.repo.write_scope(move || {
            let mut boss = self.require_boss(id)?;
            if let Some(name) = patch.name.as_deref() {
                self.ensure_name_available(name, Some(id))?;
            }
            boss.apply(patch);
            self.repo.update_boss(&boss)?;
            Ok::<_, ServiceError>(boss)
        })
    }

    pub fn delete_boss(&self, id: BossId) -> ServiceResult<()> {
        if !self.repo.delete_boss(id)? {
            return Err(ServiceError::NotFound(EntityRef::Boss(id)));
        }
        Ok(())
    }

    fn require_boss(&self, id: BossId) -> ServiceResult<Boss> {
        self.repo
            .get_boss(id)?
            .ok_or(ServiceError::NotFound(EntityRef::Boss(id)))
    }

    fn ensure_name_available(&self, name: &str, owner: Option<BossId>) -> ServiceResult<()> {
        match self.repo.find_boss_by_name(name)? {
            Some(existing) if Some(existing.id) != owner => Err(ServiceError::DuplicateName {
                entity: "boss",
                name: name.to_string(),
            }),
            _ => Ok(()),
        }
    }
}
