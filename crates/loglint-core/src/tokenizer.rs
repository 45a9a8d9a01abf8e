//! Word tokenizer shared by keyword lookup and message text.
//!
//! Both sides of the sensitivity check must go through [`tokenize`] so that
//! token boundaries agree.

use once_cell::sync::Lazy;
use regex::Regex;

pub(crate) static LOWER: Lazy<Regex> = Lazy::new(|| compile(r"\p{Ll}"));

static LETTER: Lazy<Regex> = Lazy::new(|| compile(r"\p{L}"));

static SEPARATOR: Lazy<Regex> = Lazy::new(|| compile(r"[\s\p{P}]+"));

// Lowercase followed by uppercase. Upper->upper runs (acronyms) never split.
static CAMEL_BOUNDARY: Lazy<Regex> = Lazy::new(|| compile(r"\p{Ll}\p{Lu}"));

/// Compiles a static pattern.
///
/// Every caller passes a literal covered by unit tests, so failure is a
/// programming error.
#[allow(clippy::expect_used)]
pub(crate) fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static pattern must compile")
}

/// Splits `s` into lowercase word tokens.
///
/// Whitespace and punctuation separate tokens and are discarded. A lowercase
/// letter directly followed by an uppercase letter also starts a new token.
/// Only letters are kept; digits and symbols inside a word are dropped
/// without splitting it.
///
/// ```
/// use loglint_core::tokenize;
///
/// assert_eq!(tokenize("my apiKey_value"), ["my", "api", "key", "value"]);
/// assert_eq!(tokenize("HTTPServer"), ["httpserver"]);
/// ```
#[must_use]
pub fn tokenize(s: &str) -> Vec<String> {
    let mut tokens = Vec::new();

    for chunk in SEPARATOR.split(s) {
        let mut start = 0;
        for boundary in CAMEL_BOUNDARY.find_iter(chunk) {
            let split = boundary.start()
                + boundary
                    .as_str()
                    .chars()
                    .next()
                    .map_or(0, char::len_utf8);
            push_token(&mut tokens, &chunk[start..split]);
            start = split;
        }
        push_token(&mut tokens, &chunk[start..]);
    }

    tokens
}

fn push_token(tokens: &mut Vec<String>, piece: &str) {
    let token: String = LETTER
        .find_iter(piece)
        .flat_map(|m| m.as_str().chars())
        .flat_map(char::to_lowercase)
        .collect();

    if !token.is_empty() {
        tokens.push(token);
    }
}
