//! Core domain logic for the checklist catalog.
//! This crate is the single source of truth for category, quest and step
//! invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CoreConfig};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{
    default_log_level, init_logging, init_logging_from_config, logging_status, LoggingError,
};
pub use model::boss::{Boss, BossId, BossPatch, NewBoss};
pub use model::category::{Category, CategoryId, CategoryPatch, CategoryPath};
pub use model::object::{CatalogObject, NewObject, ObjectId, ObjectPatch};
pub use model::quest::{NewQuest, NewStep, Quest, QuestId, QuestPatch, Step, StepId, StepPatch};
pub use model::validation::ValidationError;
pub use repo::boss_repo::{BossRepository, SqliteBossRepository};
pub use repo::category_repo::{CategoryRepository, SqliteCategoryRepository};
pub use repo::object_repo::{ObjectRepository, SqliteObjectRepository};
pub use repo::quest_repo::{QuestRepository, SqliteQuestRepository};
pub use repo::{EntityRef, RepoError, RepoResult, WriteScope};
pub use service::boss_service::BossService;
pub use service::category_service::{CascadeReport, CategoryService};
pub use service::error::{
    ErrorKind, ServiceError, ServiceResult, SUCCESS_CREATED, SUCCESS_OK,
};
pub use service::object_service::ObjectService;
pub use service::quest_service::QuestService;
pub use service::step_service::{StepService, MAX_STEP_ID_ATTEMPTS};

/// Minimal health-check API.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
