//! Comment-based suppression directives.
//!
//! Supports directives like:
//! ```text
//! // loglint: allow(no-sensitive-data) reason="token count, not a token"
//! ```
//!
//! A directive applies to the line it is on. A directive on a comment-only
//! line also applies to the line below it.

use std::collections::HashSet;

/// Result of checking for an allow directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowCheck {
    /// Rule is not allowed.
    Denied,
    /// Rule is allowed with optional reason.
    Allowed {
        /// The reason provided (if any).
        reason: Option<String>,
    },
}

impl AllowCheck {
    /// Returns true if allowed.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }

    /// Returns the reason if allowed.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Allowed { reason } => reason.as_deref(),
            Self::Denied => None,
        }
    }
}

/// Parsed allowance directive.
#[derive(Debug, Clone)]
struct AllowDirective {
    rules: HashSet<String>,
    reason: Option<String>,
}

/// Checks whether `rule` is allowed for a string on `line` (1-indexed).
///
/// `rule` may be matched by name, by code, or by `all`.
#[must_use]
pub fn check_allow(content: &str, line: usize, rule: &str, code: &str) -> AllowCheck {
    for check_line in [line.saturating_sub(1), line] {
        if check_line == 0 {
            continue;
        }
        let Some(line_content) = content.lines().nth(check_line - 1) else {
            continue;
        };
        // A trailing directive only covers its own statement.
        if check_line < line && !line_content.trim_start().starts_with("//") {
            continue;
        }

        if let Some(directive) = parse_allow_directive(line_content) {
            if directive.rules.contains(rule)
                || directive.rules.contains(code)
                || directive.rules.contains("all")
            {
                return AllowCheck::Allowed {
                    reason: directive.reason,
                };
            }
        }
    }

    AllowCheck::Denied
}

/// Parses an allowance directive from a line, allowing trailing comments.
fn parse_allow_directive(line: &str) -> Option<AllowDirective> {
    let marker = line.find("loglint:")?;
    if !line[..marker].trim_end().ends_with("//") {
        return None;
    }

    let directive = line[marker + "loglint:".len()..].trim();
    let allow_content = directive.strip_prefix("allow(")?.trim();

    let paren_end = allow_content.find(')')?;
    let rules: HashSet<String> = allow_content[..paren_end]
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if rules.is_empty() {
        return None;
    }

    let rest = allow_content[paren_end + 1..].trim();
    let reason = rest
        .strip_prefix("reason=")
        .map(str::trim)
        .and_then(|r| r.strip_prefix('"'))
        .and_then(|r| r.find('"').map(|end| r[..end].to_string()));

    Some(AllowDirective { rules, reason })
}
