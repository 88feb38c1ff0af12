//! Rule table for event type linting.
//!
//! A rule is a predicate paired with the issue it emits. Rules live in
//! ordered [`RuleGroup`]s; within a group a `critical` rule that fires
//! suppresses the rest of that group, while the other groups still run.
//!
//! | Group | Rules (in evaluation order) |
//! |-------|-----------------------------|
//! | security | 100 (critical), 101, 102, 104 |
//! | schema | 200 (critical), 201 (critical), 202 (critical), 203 |
//! | misc | 300, 301, 302, 303, 304, 305, 306 |

pub mod misc;
pub mod schema;
pub mod security;

use serde_json::Value;

use crate::types::{EventType, Issue, IssueGroup, IssueType};

/// What the schema block of an event type turned out to be.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaState {
    /// Missing, not a string, or one of the trivial "accept anything" schemas.
    Empty,
    /// A non-empty string that is not valid JSON.
    Malformed,
    /// The parsed schema document.
    Parsed(Value),
}

/// Per-invocation view of an event type shared by all rules.
///
/// The schema body is classified and parsed once, on construction.
#[derive(Debug)]
pub struct LintContext<'a> {
    pub event_type: &'a EventType,
    pub schema: SchemaState,
}

impl<'a> LintContext<'a> {
    pub fn new(event_type: &'a EventType) -> Self {
        Self {
            event_type,
            schema: schema::classify(event_type.schema.as_ref()),
        }
    }

    /// The parsed schema document, if the schema is valid, non-empty JSON.
    pub fn parsed_schema(&self) -> Option<&Value> {
        match &self.schema {
            SchemaState::Parsed(value) => Some(value),
            _ => None,
        }
    }
}

/// Predicate deciding whether a rule fires.
pub type Predicate = fn(&LintContext<'_>) -> bool;

/// Computes an input-dependent severity.
pub type SeverityFn = fn(&LintContext<'_>) -> u8;

/// A single check: predicate plus the issue it constructs.
#[derive(Clone, Copy)]
pub struct Rule {
    pub issue: IssueType,
    pub applies: Predicate,
    pub severity: Option<SeverityFn>,
    pub critical: bool,
}

impl Rule {
    pub const fn new(issue: IssueType, applies: Predicate) -> Self {
        Self {
            issue,
            applies,
            severity: None,
            critical: false,
        }
    }

    /// Marks the rule as stopping its group once it fires.
    pub const fn critical(mut self) -> Self {
        self.critical = true;
        self
    }

    pub const fn with_severity(mut self, severity: SeverityFn) -> Self {
        self.severity = Some(severity);
        self
    }

    /// Returns the issue this rule emits for `ctx`, if it fires.
    pub fn check(&self, ctx: &LintContext<'_>) -> Option<Issue> {
        if !(self.applies)(ctx) {
            return None;
        }
        let severity = match self.severity {
            Some(severity) => severity(ctx),
            None => self.issue.default_severity(),
        };
        Some(Issue::new(self.issue, severity))
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("issue", &self.issue)
            .field("critical", &self.critical)
            .finish_non_exhaustive()
    }
}

/// An ordered list of rules evaluated with short-circuit semantics.
#[derive(Debug, Clone)]
pub struct RuleGroup {
    pub group: IssueGroup,
    pub rules: Vec<Rule>,
}

impl RuleGroup {
    pub fn new(group: IssueGroup, rules: Vec<Rule>) -> Self {
        Self { group, rules }
    }

    /// Appends a rule at the end of the group.
    pub fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    /// Runs the group's rules in order, appending findings to `issues`.
    pub fn evaluate(&self, ctx: &LintContext<'_>, issues: &mut Vec<Issue>) {
        for rule in &self.rules {
            if let Some(issue) = rule.check(ctx) {
                issues.push(issue);
                if rule.critical {
                    return;
                }
            }
        }
    }
}

/// The standard groups: security, then schema, then misc.
pub fn standard_groups() -> Vec<RuleGroup> {
    vec![security::group(), schema::group(), misc::group()]
}
