//! Event type linter - configuration checks for broker event types.
//!
//! This crate inspects event type definitions (JSON Schema plus metadata)
//! and reports configuration issues:
//! - Security: missing authorization, wildcard admins/writers/readers
//! - Schema: empty, malformed, property-less or combined schemas
//! - Misc: category, partitioning, compatibility and naming conventions
//!
//! # Architecture
//!
//! Linting is a pure function of its input. Rules are plain data
//! ([`rules::Rule`]) grouped into ordered [`rules::RuleGroup`]s, and the
//! [`Linter`] evaluates the table without any I/O or shared state.

pub mod error;
pub mod linter;
pub mod report;
pub mod rules;
pub mod types;

pub use error::LintError;
pub use linter::{parse_event_type, validate_event_type, validate_event_types, Linter};
pub use types::{
    Authorization, AuthorizationAttribute, EventType, EventTypeSchema, Issue, IssueGroup,
    IssueType, ValidationResult,
};
