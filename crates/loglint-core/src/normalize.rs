//! Format placeholder stripping.
//!
//! Content checks run on normalized text. Removed placeholders never count
//! toward any check; reported ranges still refer to the original literal.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::borrow::Cow;

use crate::call_site::FormatSyntax;
use crate::tokenizer::compile;

static PRINTF_VERB: Lazy<Regex> = Lazy::new(|| compile(r"%(\[[0-9]+\])?[-+0-9.#]*[a-zA-Z]"));

static BRACE_PLACEHOLDER: Lazy<Regex> = Lazy::new(|| compile(r"\{\{|\}\}|\{[^{}]*\}"));

/// Removes every printf conversion specifier from `s`.
///
/// A specifier is `%`, an optional `[n]` argument index, any run of
/// `-+0-9.#` flags, width and precision, and one terminating letter.
#[must_use]
pub fn strip_format_verbs(s: &str) -> Cow<'_, str> {
    PRINTF_VERB.replace_all(s, "")
}

/// Removes Rust `format!` placeholders and unescapes `{{` / `}}`.
#[must_use]
pub fn strip_placeholders(s: &str) -> Cow<'_, str> {
    BRACE_PLACEHOLDER.replace_all(s, |caps: &Captures<'_>| match &caps[0] {
        "{{" => "{",
        "}}" => "}",
        _ => "",
    })
}

/// Normalizes `s` for content checks according to the call's format syntax.
#[must_use]
pub fn normalize(s: &str, syntax: FormatSyntax) -> Cow<'_, str> {
    match syntax {
        FormatSyntax::Printf => strip_format_verbs(s),
        FormatSyntax::Brace => strip_placeholders(s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_simple_verbs() {
        assert_eq!(strip_format_verbs("Hello %s"), "Hello ");
        assert_eq!(strip_format_verbs("%d items in %v"), " items in ");
    }

    #[test]
    fn strips_flags_width_and_index() {
        assert_eq!(strip_format_verbs("value=%-8.2f!"), "value=!");
        assert_eq!(strip_format_verbs("%[2]d of %[1]d"), " of ");
        assert_eq!(strip_format_verbs("%#x %+d %05d"), "  ");
    }

    #[test]
    fn leaves_bare_percent() {
        assert_eq!(strip_format_verbs("100% done"), "100% done");
        assert_eq!(strip_format_verbs("100%"), "100%");
    }

    #[test]
    fn idempotent_without_percent() {
        for s in ["", "hello world", "key: value", "Привет {}"] {
            let once = strip_format_verbs(s).into_owned();
            let twice = strip_format_verbs(&once).into_owned();
            assert_eq!(once, s);
            assert_eq!(twice, once);
        }
    }

    #[test]
    fn strips_brace_placeholders() {
        assert_eq!(strip_placeholders("user {} logged in"), "user  logged in");
        assert_eq!(strip_placeholders("{name:>8} {0:?} {}"), "  ");
        assert_eq!(strip_placeholders("literal {{braces}}"), "literal {braces}");
    }

    #[test]
    fn normalize_dispatches_on_syntax() {
        assert_eq!(normalize("%s {}", FormatSyntax::Printf), " {}");
        assert_eq!(normalize("%s {}", FormatSyntax::Brace), "%s ");
    }
}
