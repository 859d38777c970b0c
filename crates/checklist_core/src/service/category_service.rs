//! Category graph use-case service.
//!
//! # Responsibility
//! - Validate category forest invariants above the repository layer.
//! - Resolve ancestor chains, roots and children.
//! - Cascade category deletion to the objects it owns.
//!
//! # Invariants
//! - A stored parent must exist at write time and never be a descendant of
//!   the node; existence check, cycle check and write share one write scope.
//! - Deleting a category leaves its child categories untouched; their
//!   dangling parent pointer is read as an orphaned root.
//! - The object cascade runs after the category write commits. Between the
//!   two, objects may still reference the removed id; re-running
//!   `cascade_objects` is always safe.

use crate::model::category::{Category, CategoryId, CategoryPatch, CategoryPath};
use crate::repo::category_repo::CategoryRepository;
use crate::repo::object_repo::ObjectRepository;
use crate::repo::{EntityRef, RepoResult};
use crate::service::ancestry::{resolve_chain, would_create_cycle};
use crate::service::error::{ServiceError, ServiceResult};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::time::Instant;

/// Outcome of one category deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CascadeReport {
    pub category_id: CategoryId,
    /// Objects removed by the cascade step.
    pub objects_deleted: usize,
    /// Direct children left pointing at the removed id.
    pub orphaned_children: usize,
}

/// Category graph service facade.
///
/// Both repositories must be backed by the same connection.
pub struct CategoryService<C: CategoryRepository, O: ObjectRepository> {
    categories: C,
    objects: O,
}

impl<C: CategoryRepository, O: ObjectRepository> CategoryService<C, O> {
    /// Creates service from repository implementations.
    pub fn new(categories: C, objects: O) -> Self {
        Self {
            categories,
            objects,
        }
    }

    /// Creates one category under an optional parent.
    pub fn create_category(
        &self,
        name: &str,
        link: Option<String>,
        parent_id: Option<CategoryId>,
    ) -> ServiceResult<Category> {
        let category = Category::new(name, link, parent_id)?;
        let created = self.categories.write_scope(move || {
            self.ensure_name_available(&category.name, None)?;
            if let Some(parent_id) = category.parent_id {
                self.ensure_valid_parent(category.id, parent_id)?;
            }
            self.categories.insert_category(&category)?;
            Ok::<_, ServiceError>(category)
        })?;

        debug!(
            "event=category_create module=category_service status=ok category_id={} is_root={}",
            created.id,
            created.is_root()
        );
        Ok(created)
    }

    /// Applies a partial update. A supplied parent is re-validated.
    pub fn update_category(
        &self,
        id: CategoryId,
        patch: CategoryPatch,
    ) -> ServiceResult<Category> {
        let patch = patch.normalize()?;
        let updated = self.categories.write_scope(move || {
            let mut category = self.require_category(id)?;
            if let Some(name) = patch.name.as_deref() {
                self.ensure_name_available(name, Some(id))?;
            }
            if let Some(parent_id) = patch.parent_id {
                self.ensure_valid_parent(id, parent_id)?;
            }
            category.apply(patch);
            self.categories.update_category(&category)?;
            Ok::<_, ServiceError>(category)
        })?;

        debug!(
            "event=category_update module=category_service status=ok category_id={}",
            updated.id
        );
        Ok(updated)
    }

    /// Deletes one category, then removes its objects.
    ///
    /// # Errors
    /// - `NotFound` when the category is absent.
    /// - `CascadeIncomplete` when the category is gone but the object step
    ///   failed; the category removal is not rolled back.
    pub fn delete_category(&self, id: CategoryId) -> ServiceResult<CascadeReport> {
        let started_at = Instant::now();
        let orphaned_children = self.categories.write_scope(|| {
            let children = self.categories.list_children(id)?.len();
            if !self.categories.delete_category(id)? {
                return Err(ServiceError::NotFound(EntityRef::Category(id)));
            }
            Ok(children)
        })?;

        let objects_deleted = match self.purge_objects(id) {
            Ok(count) => count,
            Err(source) => {
                warn!(
                    "event=category_delete module=category_service status=error error_code=cascade_incomplete category_id={} duration_ms={}",
                    id,
                    started_at.elapsed().as_millis()
                );
                return Err(ServiceError::CascadeIncomplete {
                    category_id: id,
                    source,
                });
            }
        };

        info!(
            "event=category_delete module=category_service status=ok category_id={} objects_deleted={} orphaned_children={} duration_ms={}",
            id,
            objects_deleted,
            orphaned_children,
            started_at.elapsed().as_millis()
        );
        Ok(CascadeReport {
            category_id: id,
            objects_deleted,
            orphaned_children,
        })
    }

    /// Removes objects still referencing `category_id`.
    ///
    /// Idempotent; the category itself may already be gone.
    pub fn cascade_objects(&self, category_id: CategoryId) -> ServiceResult<usize> {
        Ok(self.purge_objects(category_id)?)
    }

    /// Loads one category.
    pub fn get_category(&self, id: CategoryId) -> ServiceResult<Category> {
        self.require_category(id)
    }

    /// Lists every category.
    pub fn list_categories(&self) -> ServiceResult<Vec<Category>> {
        Ok(self.categories.list_categories()?)
    }

    /// Lists categories without parent pointer.
    pub fn list_roots(&self) -> ServiceResult<Vec<Category>> {
        Ok(self.categories.list_roots()?)
    }

    /// Lists direct children. An unknown parent simply has none.
    pub fn list_children(&self, parent_id: CategoryId) -> ServiceResult<Vec<Category>> {
        Ok(self.categories.list_children(parent_id)?)
    }

    /// Resolves `[category, parent, grandparent, ..]` for one category.
    pub fn ancestor_chain(&self, id: CategoryId) -> ServiceResult<Vec<Category>> {
        let start = self.require_category(id)?;
        resolve_chain(start, |parent_id| Ok(self.categories.get_category(parent_id)?))
            .inspect_err(|err| log_stored_cycle(id, err))
    }

    /// Resolves the ancestor chain of every category from one snapshot.
    pub fn category_tree(&self) -> ServiceResult<Vec<CategoryPath>> {
        let snapshot = self.categories.list_categories()?;
        let by_id: HashMap<CategoryId, Category> = snapshot
            .iter()
            .map(|category| (category.id, category.clone()))
            .collect();

        snapshot
            .into_iter()
            .map(|category| {
                let category_id = category.id;
                let chain =
                    resolve_chain(category, |parent_id| Ok(by_id.get(&parent_id).cloned()))
                        .inspect_err(|err| log_stored_cycle(category_id, err))?;
                Ok::<_, ServiceError>(CategoryPath { category_id, chain })
            })
            .collect()
    }

    fn require_category(&self, id: CategoryId) -> ServiceResult<Category> {
        self.categories
            .get_category(id)?
            .ok_or(ServiceError::NotFound(EntityRef::Category(id)))
    }

    fn ensure_name_available(&self, name: &str, owner: Option<CategoryId>) -> ServiceResult<()> {
        match self.categories.find_category_by_name(name)? {
            Some(existing) if Some(existing.id) != owner => Err(ServiceError::DuplicateName {
                entity: "category",
                name: name.to_string(),
            }),
            _ => Ok(()),
        }
    }

    fn ensure_valid_parent(&self, node_id: CategoryId, parent_id: CategoryId) -> ServiceResult<()> {
        let cycle = ServiceError::Cycle {
            category_id: node_id,
            parent_id,
        };
        if parent_id == node_id {
            return Err(cycle);
        }
        self.require_category(parent_id)?;
        if would_create_cycle(node_id, parent_id, |id| Ok(self.categories.get_category(id)?))? {
            return Err(cycle);
        }
        Ok(())
    }

    fn purge_objects(&self, category_id: CategoryId) -> RepoResult<usize> {
        self.objects
            .write_scope(|| self.objects.delete_objects_in_category(category_id))
    }
}

fn log_stored_cycle(category_id: CategoryId, err: &ServiceError) {
    if let ServiceError::Cycle { parent_id, .. } = err {
        warn!(
            "event=category_chain module=category_service status=error error_code=stored_cycle category_id={} revisited_id={}",
            category_id, parent_id
        );
    }
}
