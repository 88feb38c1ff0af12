//! Category, compatibility and naming conventions.

use std::sync::LazyLock;

use regex::Regex;

use super::{LintContext, Rule, RuleGroup};
use crate::types::{IssueGroup, IssueType};

/// Matches a version suffix at the end of an event type name.
///
/// A separator (`.`, `_` or `-`), then `v`, `ver` or `version` in any case,
/// an optional second separator, digits, and an optional `.minor` part.
/// `orders.v2`, `orders_ver_3` and `orders-Version1.1` match;
/// `versions.orders` and `orders.v2.created` do not.
pub const VERSION_SUFFIX_PATTERN: &str = r"(?i)[._-](v|ver|version)[._-]?\d+(\.\d+)?$";

static VERSION_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(VERSION_SUFFIX_PATTERN).expect("version suffix pattern is a valid regex")
});

pub fn group() -> RuleGroup {
    RuleGroup::new(
        IssueGroup::Misc,
        vec![
            Rule::new(IssueType::MiscUndefinedCategory, undefined_category),
            Rule::new(IssueType::MiscDataNotHash, data_not_hash),
            Rule::new(IssueType::MiscSchemaNotCompatible, not_compatible)
                .with_severity(compatibility_severity),
            Rule::new(IssueType::MiscNameIsNotLowercase, name_not_lowercase),
            Rule::new(IssueType::MiscNameContainsVersion, name_contains_version),
            Rule::new(IssueType::MiscAudienceNotSet, audience_not_set),
            Rule::new(IssueType::MiscOrderingKeyFieldsNotSet, ordering_key_fields_not_set),
        ],
    )
}

/// Returns `true` if `name` ends with a version suffix such as `_v5`.
pub fn contains_version(name: &str) -> bool {
    VERSION_SUFFIX.is_match(name)
}

fn undefined_category(ctx: &LintContext<'_>) -> bool {
    ctx.event_type.category() == Some("undefined")
}

fn data_not_hash(ctx: &LintContext<'_>) -> bool {
    ctx.event_type.category() == Some("data")
        && ctx.event_type.partition_strategy() != Some("hash")
}

fn not_compatible(ctx: &LintContext<'_>) -> bool {
    ctx.event_type.compatibility_mode() != Some("compatible")
}

fn compatibility_severity(ctx: &LintContext<'_>) -> u8 {
    // "forward" is a lesser offence than "none".
    if ctx.event_type.compatibility_mode() == Some("forward") {
        10
    } else {
        IssueType::MiscSchemaNotCompatible.default_severity()
    }
}

fn name_not_lowercase(ctx: &LintContext<'_>) -> bool {
    let name = &ctx.event_type.name;
    name.to_lowercase() != *name
}

fn name_contains_version(ctx: &LintContext<'_>) -> bool {
    contains_version(&ctx.event_type.name)
}

fn audience_not_set(ctx: &LintContext<'_>) -> bool {
    ctx.event_type
        .audience
        .as_deref()
        .is_none_or(|audience| audience.trim().is_empty())
}

fn ordering_key_fields_not_set(ctx: &LintContext<'_>) -> bool {
    ctx.event_type
        .ordering_key_fields
        .as_ref()
        .is_none_or(Vec::is_empty)
}
