//! Category repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist category nodes and answer parent/child lookups.
//!
//! # Invariants
//! - Listings are deterministic: `name ASC, category_uuid ASC`.
//! - The repository stores whatever `parent_uuid` it is given; graph rules
//!   (existence, acyclicity) belong to the category service.

use crate::db::{self, DbError};
use crate::model::category::{Category, CategoryId};
use crate::repo::support::{
    ensure_connection_ready, map_unique_violation, parse_optional_uuid, parse_uuid,
};
use crate::repo::{EntityRef, RepoError, RepoResult, WriteScope};
use rusqlite::{params, Connection, Row};

const CATEGORY_SELECT_SQL: &str = "SELECT
    category_uuid,
    name,
    link,
    parent_uuid
FROM categories";

/// Repository interface for category persistence.
pub trait CategoryRepository: WriteScope {
    /// Inserts one new category row.
    fn insert_category(&self, category: &Category) -> RepoResult<()>;
    /// Loads one category by id.
    fn get_category(&self, id: CategoryId) -> RepoResult<Option<Category>>;
    /// Loads one category by exact normalized name.
    fn find_category_by_name(&self, name: &str) -> RepoResult<Option<Category>>;
    /// Lists every category.
    fn list_categories(&self) -> RepoResult<Vec<Category>>;
    /// Lists categories without parent pointer.
    fn list_roots(&self) -> RepoResult<Vec<Category>>;
    /// Lists categories whose parent pointer equals `parent_id`.
    fn list_children(&self, parent_id: CategoryId) -> RepoResult<Vec<Category>>;
    /// Overwrites name, link and parent of an existing category.
    fn update_category(&self, category: &Category) -> RepoResult<()>;
    /// Deletes one category row. Returns `false` when nothing matched.
    fn delete_category(&self, id: CategoryId) -> RepoResult<bool>;
}

/// SQLite-backed category repository.
pub struct SqliteCategoryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCategoryRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            "categories",
            &["category_uuid", "name", "link", "parent_uuid", "updated_at"],
        )?;
        Ok(Self { conn })
    }

    fn query_categories(
        &self,
        filter: &str,
        params: impl rusqlite::Params,
    ) -> RepoResult<Vec<Category>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CATEGORY_SELECT_SQL} {filter} ORDER BY name ASC, category_uuid ASC;"
        ))?;
        let mut rows = stmt.query(params)?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_category_row(row)?);
        }
        Ok(items)
    }
}

impl WriteScope for SqliteCategoryRepository<'_> {
    fn write_scope<T, E, F>(&self, body: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: From<DbError>,
    {
        db::write_scope(self.conn, body)
    }
}

impl CategoryRepository for SqliteCategoryRepository<'_> {
    fn insert_category(&self, category: &Category) -> RepoResult<()> {
        self.conn
            .execute(
                "INSERT INTO categories (
                    category_uuid,
                    name,
                    link,
                    parent_uuid
                ) VALUES (?1, ?2, ?3, ?4);",
                params![
                    category.id.to_string(),
                    category.name.as_str(),
                    category.link.as_deref(),
                    category.parent_id.map(|value| value.to_string()),
                ],
            )
            .map_err(|err| map_unique_violation(err, "category", &category.name))?;
        Ok(())
    }

    fn get_category(&self, id: CategoryId) -> RepoResult<Option<Category>> {
        let mut items = self.query_categories("WHERE category_uuid = ?1", [id.to_string()])?;
        Ok(items.pop())
    }

    fn find_category_by_name(&self, name: &str) -> RepoResult<Option<Category>> {
        let mut items = self.query_categories("WHERE name = ?1", [name])?;
        Ok(items.pop())
    }

    fn list_categories(&self) -> RepoResult<Vec<Category>> {
        self.query_categories("", [])
    }

    fn list_roots(&self) -> RepoResult<Vec<Category>> {
        self.query_categories("WHERE parent_uuid IS NULL", [])
    }

    fn list_children(&self, parent_id: CategoryId) -> RepoResult<Vec<Category>> {
        self.query_categories("WHERE parent_uuid = ?1", [parent_id.to_string()])
    }

    fn update_category(&self, category: &Category) -> RepoResult<()> {
        let changed = self
            .conn
            .execute(
                "UPDATE categories
                 SET name = ?2,
                     link = ?3,
                     parent_uuid = ?4,
                     updated_at = (strftime('%s', 'now') * 1000)
                 WHERE category_uuid = ?1;",
                params![
                    category.id.to_string(),
                    category.name.as_str(),
                    category.link.as_deref(),
                    category.parent_id.map(|value| value.to_string()),
                ],
            )
            .map_err(|err| map_unique_violation(err, "category", &category.name))?;
        if changed == 0 {
            return Err(RepoError::NotFound(EntityRef::Category(category.id)));
        }
        Ok(())
    }

    fn delete_category(&self, id: CategoryId) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM categories WHERE category_uuid = ?1;",
            [id.to_string()],
        )?;
        Ok(changed > 0)
    }
}

fn parse_category_row(row: &Row<'_>) -> RepoResult<Category> {
    let id_text: String = row.get("category_uuid")?;
    Ok(Category {
        id: parse_uuid(&id_text, "categories.category_uuid")?,
        name: row.get("name")?,
        link: row.get("link")?,
        parent_id: parse_optional_uuid(row.get("parent_uuid")?, "categories.parent_uuid")?,
    })
}
