//! Rendering fixed strings back into source literals.
//!
//! Replacement text must be a valid literal in the host language of the
//! call site, so each [`FormatSyntax`] has its own quoting rules.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::Write;

use crate::call_site::FormatSyntax;
use crate::tokenizer::compile;

// Go's `unicode.IsPrint`: letters, marks, numbers, punctuation, symbols and
// the ASCII space.
static GO_PRINTABLE: Lazy<Regex> = Lazy::new(|| compile(r"^[\p{L}\p{M}\p{N}\p{P}\p{S} ]$"));

/// Renders `s` as a double-quoted literal for the call site's language.
#[must_use]
pub fn quote(s: &str, syntax: FormatSyntax) -> String {
    match syntax {
        FormatSyntax::Printf => quote_go(s),
        FormatSyntax::Brace => format!("{s:?}"),
    }
}

/// Quotes `s` the way Go's `strconv.Quote` does.
#[must_use]
pub fn quote_go(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');

    let mut buf = [0u8; 4];
    for c in s.chars() {
        match c {
            '"' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            _ if GO_PRINTABLE.is_match(c.encode_utf8(&mut buf)) => out.push(c),
            '\u{7}' => out.push_str("\\a"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{b}' => out.push_str("\\v"),
            _ => {
                let code = u32::from(c);
                // Writing to a String cannot fail.
                let _ = if code < 0x20 || code == 0x7f {
                    write!(out, "\\x{code:02x}")
                } else if code < 0x1_0000 {
                    write!(out, "\\u{code:04x}")
                } else {
                    write!(out, "\\U{code:08x}")
                };
            }
        }
    }

    out.push('"');
    out
}
