//! Catalog object repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Listings are deterministic: `name ASC, object_uuid ASC`.
//! - Deleting by category id is idempotent: zero matches is not an error.

use crate::db::{self, DbError};
use crate::model::category::CategoryId;
use crate::model::object::{CatalogObject, ObjectId};
use crate::repo::support::{bool_to_int, ensure_connection_ready, parse_bool, parse_uuid};
use crate::repo::{EntityRef, RepoError, RepoResult, WriteScope};
use rusqlite::{params, Connection, Row};

const OBJECT_SELECT_SQL: &str = "SELECT
    object_uuid,
    category_uuid,
    name,
    link,
    status,
    location,
    details
FROM objects";

/// Repository interface for catalog object persistence.
pub trait ObjectRepository: WriteScope {
    fn insert_object(&self, object: &CatalogObject) -> RepoResult<()>;
    fn get_object(&self, id: ObjectId) -> RepoResult<Option<CatalogObject>>;
    fn list_objects(&self) -> RepoResult<Vec<CatalogObject>>;
    fn list_objects_in_category(&self, category_id: CategoryId)
        -> RepoResult<Vec<CatalogObject>>;
    /// Overwrites the mutable fields of an existing object.
    fn update_object(&self, object: &CatalogObject) -> RepoResult<()>;
    /// Returns `false` when nothing matched.
    fn delete_object(&self, id: ObjectId) -> RepoResult<bool>;
    /// Deletes every object of one category and returns the removed count.
    fn delete_objects_in_category(&self, category_id: CategoryId) -> RepoResult<usize>;
}

/// SQLite-backed catalog object repository.
pub struct SqliteObjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteObjectRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            "objects",
            &[
                "object_uuid",
                "category_uuid",
                "name",
                "link",
                "status",
                "location",
                "details",
            ],
        )?;
        Ok(Self { conn })
    }

    fn query_objects(
        &self,
        filter: &str,
        params: impl rusqlite::Params,
    ) -> RepoResult<Vec<CatalogObject>> {
        let mut stmt = self.conn.prepare(&format!(
            "{OBJECT_SELECT_SQL} {filter} ORDER BY name ASC, object_uuid ASC;"
        ))?;
        let mut rows = stmt.query(params)?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_object_row(row)?);
        }
        Ok(items)
    }
}

impl WriteScope for SqliteObjectRepository<'_> {
    fn write_scope<T, E, F>(&self, body: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: From<DbError>,
    {
        db::write_scope(self.conn, body)
    }
}

impl ObjectRepository for SqliteObjectRepository<'_> {
    fn insert_object(&self, object: &CatalogObject) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO objects (
                object_uuid,
                category_uuid,
                name,
                link,
                status,
                location,
                details
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                object.id.to_string(),
                object.category_id.to_string(),
                object.name.as_str(),
                object.link.as_deref(),
                bool_to_int(object.status),
                object.location.as_deref(),
                object.details.as_deref(),
            ],
        )?;
        Ok(())
    }

    fn get_object(&self, id: ObjectId) -> RepoResult<Option<CatalogObject>> {
        let mut items = self.query_objects("WHERE object_uuid = ?1", [id.to_string()])?;
        Ok(items.pop())
    }

    fn list_objects(&self) -> RepoResult<Vec<CatalogObject>> {
        self.query_objects("", [])
    }

    fn list_objects_in_category(
        &self,
        category_id: CategoryId,
    ) -> RepoResult<Vec<CatalogObject>> {
        self.query_objects("WHERE category_uuid = ?1", [category_id.to_string()])
    }

    fn update_object(&self, object: &CatalogObject) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE objects
             SET name = ?2,
                 link = ?3,
                 status = ?4,
                 location = ?5,
                 details = ?6,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE object_uuid = ?1;",
            params![
                object.id.to_string(),
                object.name.as_str(),
                object.link.as_deref(),
                bool_to_int(object.status),
                object.location.as_deref(),
                object.details.as_deref(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(EntityRef::Object(object.id)));
        }
        Ok(())
    }

    fn delete_object(&self, id: ObjectId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM objects WHERE object_uuid = ?1;", [id.to_string()])?;
        Ok(changed > 0)
    }

    fn delete_objects_in_category(&self, category_id: CategoryId) -> RepoResult<usize> {
        let changed = self.conn.execute(
            "DELETE FROM objects WHERE category_uuid = ?1;",
            [category_id.to_string()],
        )?;
        Ok(changed)
    }
}

fn parse_object_row(row: &Row<'_>) -> RepoResult<CatalogObject> {
    let id_text: String = row.get("object_uuid")?;
    let category_text: String = row.get("category_uuid")?;
    Ok(CatalogObject {
        id: parse_uuid(&id_text, "objects.object_uuid")?,
        category_id: parse_uuid(&category_text, "objects.category_uuid")?,
        name: row.get("name")?,
        link: row.get("link")?,
        status: parse_bool(row.get("status")?, "objects.status")?,
        location: row.get("location")?,
        details: row.get("details")?,
    })
}
