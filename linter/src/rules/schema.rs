//! JSON Schema quality checks.
//!
//! At most one schema issue is reported per event type: empty, not JSON and
//! no properties are each critical, and "combined" is the last check.

use serde_json::Value;

use super::{LintContext, Rule, RuleGroup, SchemaState};
use crate::types::{is_truthy, EventTypeSchema, IssueGroup, IssueType};

/// Schema bodies that accept any event, compared with whitespace removed.
const EMPTY_SCHEMAS: [&str; 3] = [
    "{}",
    r#"{"additionalProperties":true}"#,
    r#"{"type":"object"}"#,
];

/// Keywords that compose a schema out of other schemas.
const COMBINING_KEYWORDS: [&str; 5] = ["allOf", "anyOf", "oneOf", "not", "$ref"];

pub fn group() -> RuleGroup {
    RuleGroup::new(
        IssueGroup::Schema,
        vec![
            Rule::new(IssueType::SchemaIsEmpty, is_empty).critical(),
            Rule::new(IssueType::SchemaNotAJson, is_malformed).critical(),
            Rule::new(IssueType::SchemaHasNoProperties, has_no_properties).critical(),
            Rule::new(IssueType::SchemaCombined, is_combined_schema),
        ],
    )
}

/// Classifies the schema block, parsing the body at most once.
pub fn classify(schema: Option<&EventTypeSchema>) -> SchemaState {
    let body = schema
        .and_then(|s| s.schema.as_ref())
        .filter(|value| is_truthy(value))
        .and_then(Value::as_str);

    let Some(body) = body else {
        return SchemaState::Empty;
    };

    if EMPTY_SCHEMAS.contains(&remove_whitespace(body).as_str()) {
        return SchemaState::Empty;
    }

    match serde_json::from_str(body) {
        Ok(value) => SchemaState::Parsed(value),
        Err(_) => SchemaState::Malformed,
    }
}

/// Returns `true` if the parsed schema defines a non-empty `properties`
/// object, or is combined and so may describe properties indirectly.
pub fn describes_properties(schema: &Value) -> bool {
    let has_properties = schema
        .get("properties")
        .and_then(Value::as_object)
        .is_some_and(|properties| !properties.is_empty());

    has_properties || is_combined(schema)
}

/// Returns `true` if any combining keyword holds a truthy value.
pub fn is_combined(schema: &Value) -> bool {
    COMBINING_KEYWORDS
        .iter()
        .any(|keyword| schema.get(keyword).is_some_and(is_truthy))
}

fn remove_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

fn is_empty(ctx: &LintContext<'_>) -> bool {
    ctx.schema == SchemaState::Empty
}

fn is_malformed(ctx: &LintContext<'_>) -> bool {
    ctx.schema == SchemaState::Malformed
}

fn has_no_properties(ctx: &LintContext<'_>) -> bool {
    ctx.parsed_schema()
        .is_some_and(|schema| !describes_properties(schema))
}

fn is_combined_schema(ctx: &LintContext<'_>) -> bool {
    ctx.parsed_schema().is_some_and(is_combined)
}
