//! Access-control checks.

use super::{LintContext, Rule, RuleGroup};
use crate::types::{AuthorizationAttribute, IssueGroup, IssueType};

pub fn group() -> RuleGroup {
    RuleGroup::new(
        IssueGroup::Security,
        vec![
            Rule::new(IssueType::SecurityNotSet, authorization_missing).critical(),
            Rule::new(IssueType::SecurityAdminsNotSet, admins_wildcard),
            Rule::new(IssueType::SecurityWritersNotSet, writers_wildcard),
            Rule::new(IssueType::SecurityReadersNotSet, readers_wildcard),
        ],
    )
}

fn has_wildcard(list: &[AuthorizationAttribute]) -> bool {
    list.iter().any(AuthorizationAttribute::is_wildcard)
}

fn authorization_missing(ctx: &LintContext<'_>) -> bool {
    ctx.event_type.authorization.is_none()
}

fn admins_wildcard(ctx: &LintContext<'_>) -> bool {
    ctx.event_type
        .authorization
        .as_ref()
        .is_some_and(|auth| has_wildcard(&auth.admins))
}

fn writers_wildcard(ctx: &LintContext<'_>) -> bool {
    ctx.event_type
        .authorization
        .as_ref()
        .is_some_and(|auth| has_wildcard(&auth.writers))
}

fn readers_wildcard(ctx: &LintContext<'_>) -> bool {
    ctx.event_type
        .authorization
        .as_ref()
        .is_some_and(|auth| has_wildcard(&auth.readers))
}
