//! Domain model for the checklist catalog.
//!
//! # Responsibility
//! - Define canonical records for categories, objects, bosses and quests.
//! - Keep field normalization rules in one place for every write path.
//!
//! # Invariants
//! - Every record is identified by a stable UUID v4.
//! - Steps only exist embedded in their owning quest.

pub mod boss;
pub mod category;
pub mod object;
pub mod quest;
pub mod validation;
