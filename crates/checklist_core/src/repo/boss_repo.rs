//! Boss repository contracts and SQLite implementation.

use crate::db::{self, DbError};
use crate::model::boss::{Boss, BossId};
use crate::repo::support::{
    bool_to_int, ensure_connection_ready, map_unique_violation, parse_bool, parse_uuid,
};
use crate::repo::{EntityRef, RepoError, RepoResult, WriteScope};
use rusqlite::{params, Connection, Row};

const BOSS_SELECT_SQL: &str = "SELECT
    boss_uuid,
    name,
    link,
    status,
    location
FROM bosses";

/// Repository interface for boss persistence.
pub trait BossRepository: WriteScope {
    fn insert_boss(&self, boss: &Boss) -> RepoResult<()>;
    fn get_boss(&self, id: BossId) -> RepoResult<Option<Boss>>;
    fn find_boss_by_name(&self, name: &str) -> RepoResult<Option<Boss>>;
    fn list_bosses(&self) -> RepoResult<Vec<Boss>>;
    fn update_boss(&self, boss: &Boss) -> RepoResult<()>;
    /// Returns `false` when nothing matched.
    fn delete_boss(&self, id: BossId) -> RepoResult<bool>;
}

/// SQLite-backed boss repository.
pub struct SqliteBossRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBossRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            "bosses",
            &["boss_uuid", "name", "link", "status", "location"],
        )?;
        Ok(Self { conn })
    }

    fn query_bosses(&self, filter: &str, params: impl rusqlite::Params) -> RepoResult<Vec<Boss>> {
        let mut stmt = self.conn.prepare(&format!(
            "{BOSS_SELECT_SQL} {filter} ORDER BY name ASC, boss_uuid ASC;"
        ))?;
        let mut rows = stmt.query(params)?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_boss_row(row)?);
        }
        Ok(items)
    }
}

impl WriteScope for SqliteBossRepository<'_> {
    fn write_scope<T, E, F>(&self, body: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: From<DbError>,
    {
        db::write_scope(self.conn, body)
    }
}

impl BossRepository for SqliteBossRepository<'_> {
    fn insert_boss(&self, boss: &Boss) -> RepoResult<()> {
        self.conn
            .execute(
                "INSERT INTO bosses (boss_uuid, name, link, status, location)
                 VALUES (?1, ?2, ?3, ?4, ?5);",
                params![
                    boss.id.to_string(),
                    boss.name.as_str(),
                    boss.link.as_deref(),
                    bool_to_int(boss.status),
                    boss.location.as_str(),
                ],
            )
            .map_err(|err| map_unique_violation(err, "boss", &boss.name))?;
        Ok(())
    }

    fn get_boss(&self, id: BossId) -> RepoResult<Option<Boss>> {
        let mut items = self.query_bosses("WHERE boss_uuid = ?1", [id.to_string()])?;
        Ok(items.pop())
    }

    fn find_boss_by_name(&self, name: &str) -> RepoResult<Option<Boss>> {
        let mut items = self.query_bosses("WHERE name = ?1", [name])?;
        Ok(items.pop())
    }

    fn list_bosses(&self) -> RepoResult<Vec<Boss>> {
        self.query_bosses("", [])
    }

    fn update_boss(&self, boss: &Boss) -> RepoResult<()> {
        let changed = self
            .conn
            .execute(
                "UPDATE bosses
                 SET name = ?2,
                     link = ?3,
                     status = ?4,
                     location = ?5,
                     updated_at = (strftime('%s', 'now') * 1000)
                 WHERE boss_uuid = ?1;",
                params![
                    boss.id.to_string(),
                    boss.name.as_str(),
                    boss.link.as_deref(),
                    bool_to_int(boss.status),
                    boss.location.as_str(),
                ],
            )
            .map_err(|err| map_unique_violation(err, "boss", &boss.name))?;
        if changed == 0 {
            return Err(RepoError::NotFound(EntityRef::Boss(boss.id)));
        }
        Ok(())
    }

    fn delete_boss(&self, id: BossId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM bosses WHERE boss_uuid = ?1;", [id.to_string()])?;
        Ok(changed > 0)
    }
}

fn parse_boss_row(row: &Row<'_>) -> RepoResult<Boss> {
    let id_text: String = row.get("boss_uuid")?;
    Ok(Boss {
        id: parse_uuid(&id_text, "bosses.boss_uuid")?,
        name: row.get("name")?,
        link: row.get("link")?,
        status: parse_bool(row.get("status")?, "bosses.status")?,
        location: row.get("location")?,
    })
}
