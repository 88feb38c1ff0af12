//! The linting engine.
//!
//! [`Linter`] owns an ordered rule table and evaluates it against event
//! types. It holds no mutable state, so one instance can be shared freely
//! between threads (e.g. behind an `Arc` in request handlers).
//!
//! # Example
//!
//! ```
//! use eventtype_linter::{validate_event_type, IssueType};
//! use serde_json::json;
//!
//! let result = validate_event_type(&json!({
//!     "name": "shop.order-placed",
//!     "authorization": null
//! }))
//! .unwrap();
//!
//! assert_eq!(result.issues[0].id, IssueType::SecurityNotSet);
//! ```

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::{LintError, Result};
use crate::rules::{standard_groups, LintContext, Rule, RuleGroup};
use crate::types::{EventType, ValidationResult};

/// Rule-table driven event type linter.
#[derive(Debug, Clone)]
pub struct Linter {
    groups: Vec<RuleGroup>,
}

impl Default for Linter {
    fn default() -> Self {
        Self::standard()
    }
}

impl Linter {
    /// Creates a linter with the standard security, schema and misc groups.
    pub fn standard() -> Self {
        Self::new(standard_groups())
    }

    /// Creates a linter with a custom rule table.
    pub fn new(groups: Vec<RuleGroup>) -> Self {
        Self { groups }
    }

    /// Appends a group; it runs after all existing groups.
    pub fn push_group(&mut self, group: RuleGroup) {
        self.groups.push(group);
    }

    pub fn groups(&self) -> &[RuleGroup] {
        &self.groups
    }

    /// All rules in evaluation order.
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.groups.iter().flat_map(|group| group.rules.iter())
    }

    /// Lints a typed event type.
    ///
    /// Groups run unconditionally in table order; issues are appended in
    /// emission order and never re-sorted.
    pub fn lint(&self, event_type: &EventType) -> ValidationResult {
        let ctx = LintContext::new(event_type);
        let mut result = ValidationResult::new(event_type.name.clone());

        for group in &self.groups {
            group.evaluate(&ctx, &mut result.issues);
        }

        debug!(
            event_type = %event_type.name,
            issue_count = result.issues.len(),
            max_severity = ?result.max_severity(),
            "Event type linted"
        );

        result
    }

    /// Lints a raw JSON event type.
    ///
    /// # Errors
    ///
    /// Returns [`LintError::InvalidInput`] if `value` is not an object or
    /// cannot be read as an event type (e.g. `name` is missing).
    pub fn lint_value(&self, value: &Value) -> Result<ValidationResult> {
        let event_type = parse_event_type(value)?;
        Ok(self.lint(&event_type))
    }

    /// Lints a JSON array of event types, preserving order.
    ///
    /// # Errors
    ///
    /// Returns [`LintError::InvalidInput`] if `value` is not an array or any
    /// element is not a valid event type.
    pub fn lint_values(&self, value: &Value) -> Result<Vec<ValidationResult>> {
        let items = value.as_array().ok_or_else(|| {
            LintError::invalid_input(format!(
                "expected a JSON array of event types, got {}",
                json_kind(value)
            ))
        })?;

        items.iter().map(|item| self.lint_value(item)).collect()
    }
}

/// Reads an event type out of a JSON value.
///
/// # Errors
///
/// Returns [`LintError::InvalidInput`] for non-objects and objects that do
/// not deserialize as an [`EventType`].
pub fn parse_event_type(value: &Value) -> Result<EventType> {
    if !value.is_object() {
        return Err(LintError::invalid_input(format!(
            "expected a JSON object, got {}",
            json_kind(value)
        )));
    }

    trace!("Parsing event type");
    EventType::deserialize(value).map_err(|e| LintError::invalid_input(e.to_string()))
}

/// Validates one event type with the standard rule table.
///
/// # Errors
///
/// See [`Linter::lint_value`].
pub fn validate_event_type(value: &Value) -> Result<ValidationResult> {
    Linter::standard().lint_value(value)
}

/// Validates a JSON array of event types with the standard rule table.
///
/// # Errors
///
/// See [`Linter::lint_values`].
pub fn validate_event_types(value: &Value) -> Result<Vec<ValidationResult>> {
    Linter::standard().lint_values(value)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
