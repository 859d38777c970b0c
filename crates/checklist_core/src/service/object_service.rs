//! Catalog object use-case service.
//!
//! # Invariants
//! - An object is only written while its category exists; the check and
//!   the insert share one write scope.
//! - `category_id` is never changed by an update.

use crate::model::category::CategoryId;
use crate::model::object::{CatalogObject, NewObject, ObjectId, ObjectPatch};
use crate::repo::category_repo::CategoryRepository;
use crate::repo::object_repo::ObjectRepository;
use crate::repo::EntityRef;
use crate::service::error::{ServiceError, ServiceResult};

/// Object service facade. Both repositories must share one connection.
pub struct ObjectService<O: ObjectRepository, C: CategoryRepository> {
    objects: O,
    categories: C,
}

impl<O: ObjectRepository, C: CategoryRepository> ObjectService<O, C> {
    pub fn new(objects: O, categories: C) -> Self {
        Self {
            objects,
            categories,
        }
    }

    /// Creates one object under an existing category.
    pub fn create_object(&self, request: NewObject) -> ServiceResult<CatalogObject> {
        let object = request.into_object()?;
        self.objects.write_scope(move || {
            if self.categories.get_category(object.category_id)?.is_none() {
                return Err(ServiceError::NotFound(EntityRef::Category(
                    object.category_id,
                )));
            }
            self.objects.insert_object(&object)?;
            Ok::<_, ServiceError>(object)
        })
    }

    pub fn get_object(&self, id: ObjectId) -> ServiceResult<CatalogObject> {
        self.require_object(id)
    }

    pub fn list_objects(&self) -> ServiceResult<Vec<CatalogObject>> {
        Ok(self.objects.list_objects()?)
    }

    /// Lists objects of one category; an unknown category has none.
    pub fn list_objects_in_category(
        &self,
        category_id: CategoryId,
    ) -> ServiceResult<Vec<CatalogObject>> {
        Ok(self.objects.list_objects_in_category(category_id)?)
    }

    /// Applies a partial update.
    pub fn update_object(&self, id: ObjectId, patch: ObjectPatch) -> ServiceResult<CatalogObject> {
        let patch = patch.normalize()?;
        self.objects.write_scope(move || {
            let mut object = self.require_object(id)?;
            object.apply(patch);
            self.objects.update_object(&object)?;
            Ok::<_, ServiceError>(object)
        })
    }

    pub fn delete_object(&self, id: ObjectId) -> ServiceResult<()> {
        if !self.objects.delete_object(id)? {
            return Err(ServiceError::NotFound(EntityRef::Object(id)));
        }
        Ok(())
    }

    fn require_object(&self, id: ObjectId) -> ServiceResult<CatalogObject> {
        self.objects
            .get_object(id)?
            .ok_or(ServiceError::NotFound(EntityRef::Object(id)))
    }
}
