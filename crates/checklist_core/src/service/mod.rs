//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Own every cross-row invariant: unique names, parent existence,
//!   acyclicity, cascade and step-id uniqueness.
//! - Return one error type whose kind maps to an HTTP status.

pub mod ancestry;
pub mod boss_service;
pub mod category_service;
pub mod error;
pub mod object_service;
pub mod quest_service;
pub mod step_service;
