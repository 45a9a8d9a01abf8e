//! The four message checks and their catalogue entries.
//!
//! Each check is a pure function over a single string. Character classes
//! follow Unicode general categories (`L`, `Ll`, `Lu`, `Nd`, `P*`), the
//! `White_Space` property and `Script=Latin`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

use crate::tokenizer::{compile, tokenize, LOWER};

static LETTER: Lazy<Regex> = Lazy::new(|| compile(r"\p{L}"));

static NON_LATIN_LETTER: Lazy<Regex> = Lazy::new(|| compile(r"[\p{L}--\p{sc=Latin}]"));

static NON_PLAIN: Lazy<Regex> = Lazy::new(|| compile(r"[^\p{L}\p{Nd}\s]"));

/// Identifies one of the message checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CheckKind {
    /// First letter of the primary string must be lowercase.
    Casing,
    /// Letters must belong to the Latin script.
    Script,
    /// No special characters outside the ignore set.
    Special,
    /// No sensitive keywords.
    Sensitive,
}

impl CheckKind {
    /// All checks in the order they run on a string.
    pub const ALL: [Self; 4] = [Self::Casing, Self::Script, Self::Special, Self::Sensitive];

    /// Rule code (e.g., "LL001").
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Casing => "LL001",
            Self::Script => "LL002",
            Self::Special => "LL003",
            Self::Sensitive => "LL004",
        }
    }

    /// Kebab-case rule name (e.g., "lowercase-first").
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Casing => "lowercase-first",
            Self::Script => "latin-only",
            Self::Special => "no-special-chars",
            Self::Sensitive => "no-sensitive-data",
        }
    }

    /// Brief description for rule listings.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Casing => "Log messages must start with a lowercase letter",
            Self::Script => "Log messages must only contain Latin letters",
            Self::Special => "Log messages must not contain special characters or emoji",
            Self::Sensitive => "Log messages must not mention sensitive keywords",
        }
    }

    /// Diagnostic message reported on violation.
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::Casing => "first letter should be lowercase",
            Self::Script => "logs should contain only Latin letters",
            Self::Special => "logs should not contain special characters",
            Self::Sensitive => "logs should not contain sensitive data",
        }
    }

    /// Looks a check up by rule name or code.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == name || kind.code().eq_ignore_ascii_case(name))
    }
}

impl std::fmt::Display for CheckKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Checks that the first letter of `s` is lowercase.
///
/// Returns `None` when the string passes (including strings without any
/// letter), or `Some(fixed)` where `fixed` is `s` with only that first letter
/// lowercased.
#[must_use]
pub fn check_first_lowercase(s: &str) -> Option<String> {
    let first = LETTER.find(s)?;
    let letter = first.as_str();
    if LOWER.is_match(letter) {
        return None;
    }

    let mut fixed = String::with_capacity(s.len());
    fixed.push_str(&s[..first.start()]);
    // One rune in, one rune out: `İ` becomes `i`, not `i` + combining dot.
    fixed.extend(letter.chars().filter_map(|c| c.to_lowercase().next()));
    fixed.push_str(&s[first.end()..]);
    Some(fixed)
}

/// Returns `true` if every letter in `s` belongs to the Latin script.
#[must_use]
pub fn check_latin(s: &str) -> bool {
    !NON_LATIN_LETTER.is_match(s)
}

/// Returns `true` if `s` contains only letters, digits, whitespace and
/// characters from `ignore`.
#[must_use]
pub fn check_special(s: &str, ignore: &BTreeSet<char>) -> bool {
    NON_PLAIN
        .find_iter(s)
        .flat_map(|m| m.as_str().chars())
        .all(|c| ignore.contains(&c))
}

/// Returns `true` if no token of `s` appears in the `keywords` lookup set.
///
/// The lookup set must already be tokenized, see [`keyword_tokens`].
#[must_use]
pub fn check_sensitive(s: &str, keywords: &HashSet<String>) -> bool {
    if keywords.is_empty() {
        return true;
    }
    !tokenize(s).iter().any(|token| keywords.contains(token))
}

/// Tokenizes every keyword into one lookup set.
#[must_use]
pub fn keyword_tokens<I, S>(keywords: I) -> HashSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    keywords
        .into_iter()
        .flat_map(|k| tokenize(k.as_ref()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ignore(chars: &str) -> BTreeSet<char> {
        chars.chars().collect()
    }

    #[test]
    fn test_first_lowercase() {
        let cases = [
            ("", None),
            ("hello", None),
            ("Hello", Some("hello")),
            ("  Hello", Some("  hello")),
            ("123", None),
            ("\u{1F60A}Hello", Some("\u{1F60A}hello")),
            ("Hello World", Some("hello World")),
            ("İstanbul", Some("istanbul")),
        ];

        for (input, want) in cases {
            assert_eq!(
                check_first_lowercase(input).as_deref(),
                want,
                "check_first_lowercase({input:?})"
            );
        }
    }

    #[test]
    fn test_no_letters_passes_casing() {
        for input in ["", "123", "  -- 42 --", "%%", "\u{1F60A}"] {
            assert!(check_first_lowercase(input).is_none(), "{input:?}");
        }
    }

    #[test]
    fn test_latin() {
        assert!(check_latin("Hello world"));
        assert!(check_latin("Hello123"));
        assert!(!check_latin("Привет"));
        assert!(!check_latin("HelloПривет"));
        assert!(check_latin("é"));
        assert!(check_latin("1 + 2 = 3 \u{1F60A}"));
        assert!(!check_latin("done 完了"));
    }

    #[test]
    fn test_special() {
        let bang = ignore(":!");

        assert!(check_special("Hello 123", &BTreeSet::new()));
        assert!(!check_special("Hello!", &BTreeSet::new()));
        assert!(check_special("Hello!", &bang));
        assert!(check_special("key: value", &bang));
        assert!(!check_special("Hello \u{1F60A}", &bang));
        assert!(check_special("tab\tand\nnewline", &BTreeSet::new()));
    }

    #[test]
    fn test_sensitive() {
        let keys = keyword_tokens(["password", "api_key", "username"]);

        assert!(check_sensitive("password", &HashSet::new()));
        assert!(!check_sensitive("password", &keys));
        assert!(!check_sensitive("PASSWORD", &keys));
        assert!(!check_sensitive("my api_key is 123", &keys));
        assert!(!check_sensitive("my Username", &keys));
        assert!(check_sensitive("hello world", &keys));
        assert!(check_sensitive("mypassword", &keys));
    }

    #[test]
    fn test_keyword_tokens_expand_separators() {
        let keys = keyword_tokens(["api_key", "accessToken"]);
        let mut tokens: Vec<_> = keys.into_iter().collect();
        tokens.sort();
        assert_eq!(tokens, ["access", "api", "key", "token"]);
    }

    #[test]
    fn test_check_kind_lookup() {
        assert_eq!(CheckKind::from_name("latin-only"), Some(CheckKind::Script));
        assert_eq!(CheckKind::from_name("LL004"), Some(CheckKind::Sensitive));
        assert_eq!(CheckKind::from_name("ll001"), Some(CheckKind::Casing));
        assert_eq!(CheckKind::from_name("nope"), None);
    }
}
