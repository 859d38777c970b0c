//! Quest document repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist quest documents with their embedded step arena.
//! - Resolve step ownership from a step id alone.
//!
//! # Invariants
//! - `quests.steps` is a JSON array written as one value; a reader never
//!   sees a partially edited arena.
//! - A step id found in more than one document is reported, never guessed.

use crate::db::{self, DbError};
use crate::model::quest::{Quest, QuestId, Step, StepId};
use crate::repo::support::{
    bool_to_int, ensure_connection_ready, map_unique_violation, parse_bool, parse_uuid,
};
use crate::repo::{EntityRef, RepoError, RepoResult, WriteScope};
use rusqlite::{params, Connection, Row};

const QUEST_SELECT_SQL: &str = "SELECT
    quest_uuid,
    name,
    link,
    status,
    steps
FROM quests";

const STEP_OWNER_FILTER: &str = "WHERE EXISTS (
    SELECT 1
    FROM json_each(quests.steps) AS step
    WHERE json_extract(step.value, '$.id') = ?1
)";

/// Repository interface for quest documents.
pub trait QuestRepository: WriteScope {
    /// Inserts one quest document including its current steps.
    fn insert_quest(&self, quest: &Quest) -> RepoResult<()>;
    fn get_quest(&self, id: QuestId) -> RepoResult<Option<Quest>>;
    fn find_quest_by_name(&self, name: &str) -> RepoResult<Option<Quest>>;
    fn list_quests(&self) -> RepoResult<Vec<Quest>>;
    /// Overwrites name, link and status. The step arena is left as stored.
    fn update_quest_fields(&self, quest: &Quest) -> RepoResult<()>;
    /// Replaces the whole step arena of one quest.
    fn replace_steps(&self, id: QuestId, steps: &[Step]) -> RepoResult<()>;
    /// Returns `false` when nothing matched.
    fn delete_quest(&self, id: QuestId) -> RepoResult<bool>;
    /// Loads the quest document embedding the step, if any.
    fn find_quest_by_step(&self, step_id: StepId) -> RepoResult<Option<Quest>>;
    /// Returns whether any quest embeds a step with this id.
    fn step_id_exists(&self, step_id: StepId) -> RepoResult<bool>;
}

/// SQLite-backed quest repository.
pub struct SqliteQuestRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteQuestRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            "quests",
            &["quest_uuid", "name", "link", "status", "steps"],
        )?;
        Ok(Self { conn })
    }

    fn query_quests(&self, filter: &str, params: impl rusqlite::Params) -> RepoResult<Vec<Quest>> {
        let mut stmt = self.conn.prepare(&format!(
            "{QUEST_SELECT_SQL} {filter} ORDER BY name ASC, quest_uuid ASC;"
        ))?;
        let mut rows = stmt.query(params)?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_quest_row(row)?);
        }
        Ok(items)
    }
}

impl WriteScope for SqliteQuestRepository<'_> {
    fn write_scope<T, E, F>(&self, body: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: From<DbError>,
    {
        db::write_scope(self.conn, body)
    }
}

impl QuestRepository for SqliteQuestRepository<'_> {
    fn insert_quest(&self, quest: &Quest) -> RepoResult<()> {
        self.conn
            .execute(
                "INSERT INTO quests (quest_uuid, name, link, status, steps)
                 VALUES (?1, ?2, ?3, ?4, ?5);",
                params![
                    quest.id.to_string(),
                    quest.name.as_str(),
                    quest.link.as_deref(),
                    bool_to_int(quest.status),
                    encode_steps(&quest.steps)?,
                ],
            )
            .map_err(|err| map_unique_violation(err, "quest", &quest.name))?;
        Ok(())
    }

    fn get_quest(&self, id: QuestId) -> RepoResult<Option<Quest>> {
        let mut items = self.query_quests("WHERE quest_uuid = ?1", [id.to_string()])?;
        Ok(items.pop())
    }

    fn find_quest_by_name(&self, name: &str) -> RepoResult<Option<Quest>> {
        let mut items = self.query_quests("WHERE name = ?1", [name])?;
        Ok(items.pop())
    }

    fn list_quests(&self) -> RepoResult<Vec<Quest>> {
        self.query_quests("", [])
    }

    fn update_quest_fields(&self, quest: &Quest) -> RepoResult<()> {
        let changed = self
            .conn
            .execute(
                "UPDATE quests
                 SET name = ?2,
                     link = ?3,
                     status = ?4,
                     updated_at = (strftime('%s', 'now') * 1000)
                 WHERE quest_uuid = ?1;",
                params![
                    quest.id.to_string(),
                    quest.name.as_str(),
                    quest.link.as_deref(),
                    bool_to_int(quest.status),
                ],
            )
            .map_err(|err| map_unique_violation(err, "quest", &quest.name))?;
        if changed == 0 {
            return Err(RepoError::NotFound(EntityRef::Quest(quest.id)));
        }
        Ok(())
    }

    fn replace_steps(&self, id: QuestId, steps: &[Step]) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE quests
             SET steps = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE quest_uuid = ?1;",
            params![id.to_string(), encode_steps(steps)?],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(EntityRef::Quest(id)));
        }
        Ok(())
    }

    fn delete_quest(&self, id: QuestId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM quests WHERE quest_uuid = ?1;", [id.to_string()])?;
        Ok(changed > 0)
    }

    fn find_quest_by_step(&self, step_id: StepId) -> RepoResult<Option<Quest>> {
        let mut owners = self.query_quests(STEP_OWNER_FILTER, [step_id.to_string()])?;
        if owners.len() > 1 {
            return Err(RepoError::AmbiguousStepOwner(step_id));
        }
        Ok(owners.pop())
    }

    fn step_id_exists(&self, step_id: StepId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            &format!("SELECT EXISTS(SELECT 1 FROM quests {STEP_OWNER_FILTER});"),
            [step_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}

fn encode_steps(steps: &[Step]) -> RepoResult<String> {
    serde_json::to_string(steps)
        .map_err(|err| RepoError::InvalidData(format!("cannot encode quest steps: {err}")))
}

fn decode_steps(text: &str) -> RepoResult<Vec<Step>> {
    serde_json::from_str(text).map_err(|err| {
        RepoError::InvalidData(format!("invalid steps array in quests.steps: {err}"))
    })
}

fn parse_quest_row(row: &Row<'_>) -> RepoResult<Quest> {
    let id_text: String = row.get("quest_uuid")?;
    let steps_text: String = row.get("steps")?;
    Ok(Quest {
        id: parse_uuid(&id_text, "quests.quest_uuid")?,
        name: row.get("name")?,
        link: row.get("link")?,
        status: parse_bool(row.get("status")?, "quests.status")?,
        steps: decode_steps(&steps_text)?,
    })
}
