//! Human-readable rendering of lint results.

use crate::types::ValidationResult;

/// Renders results as plain text, one block per event type.
///
/// ```text
/// shop.order_v2: 2 issue(s)
///   [100] security  SECURITY_NOT_SET  No authorization configured
///         https://nakadi.io/manual.html#using_authorization
///   [ 10] misc      MISC_NAME_CONTAINS_VERSION  Avoid Versioning
/// ```
pub fn render_text(results: &[ValidationResult]) -> String {
    let mut lines: Vec<String> = Vec::new();

    for result in results {
        if result.is_clean() {
            lines.push(format!("{}: no issues", result.name));
            continue;
        }

        lines.push(format!("{}: {} issue(s)", result.name, result.issues.len()));
        for issue in &result.issues {
            lines.push(format!(
                "  [{:>3}] {:<9} {}  {}",
                issue.severity,
                issue.group.to_string(),
                issue.id.code_name(),
                issue.title.trim()
            ));
            if let Some(link) = &issue.link {
                lines.push(format!("        {link}"));
            }
        }
    }

    let total: usize = results.iter().map(|r| r.issues.len()).sum();
    lines.push(String::new());
    lines.push(format!(
        "{} issue(s) in {} event type(s)",
        total,
        results.len()
    ));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Returns `true` if any issue reaches `threshold`.
pub fn exceeds(results: &[ValidationResult], threshold: u8) -> bool {
    results
        .iter()
        .filter_map(ValidationResult::max_severity)
        .any(|severity| severity >= threshold)
}
