//! Host-facing extraction types.
//!
//! A host locates call expressions in its own syntax tree, resolves their
//! identity and hands them to the engine as [`CallSite`]s. The
//! [`CallSiteExtractor`] trait is the extension point for adding a new
//! source language.

use serde::{Deserialize, Serialize};

/// Byte range into the analyzed source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct TextRange {
    /// Inclusive start offset.
    pub start: usize,
    /// Exclusive end offset.
    pub end: usize,
}

impl TextRange {
    /// Creates a new range.
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Length of the range in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns true if the range covers no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A decoded string value and the source range it was taken from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralString {
    /// Decoded text (escapes resolved, quotes removed).
    pub text: String,
    /// Range of the literal or constant reference in the source file.
    pub range: TextRange,
}

impl LiteralString {
    /// Creates a new literal string.
    #[must_use]
    pub fn new(text: impl Into<String>, range: TextRange) -> Self {
        Self {
            text: text.into(),
            range,
        }
    }
}

/// Placeholder convention of the host language's format strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatSyntax {
    /// printf verbs such as `%s`, `%[1]d`, `%-8.2f`.
    #[default]
    Printf,
    /// Rust `format!` placeholders such as `{}`, `{name}`, `{:?}`.
    Brace,
}

/// A tracked call with its literal string arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    /// Resolved module path of the callee (e.g., `"fmt"`, `"tracing"`).
    pub module_path: String,
    /// Callee name (e.g., `"Printf"`, `"info"`).
    pub function: String,
    /// Format placeholder syntax used by the callee's language.
    pub format: FormatSyntax,
    /// Strings per argument, in call order; each argument lists its strings
    /// depth-first, left to right.
    pub args: Vec<Vec<LiteralString>>,
}

impl CallSite {
    /// Creates a call site without arguments.
    #[must_use]
    pub fn new(module_path: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            module_path: module_path.into(),
            function: function.into(),
            format: FormatSyntax::default(),
            args: Vec::new(),
        }
    }

    /// Sets the format syntax.
    #[must_use]
    pub fn with_format(mut self, format: FormatSyntax) -> Self {
        self.format = format;
        self
    }

    /// Appends one argument and the strings extracted from it.
    #[must_use]
    pub fn with_arg(mut self, strings: Vec<LiteralString>) -> Self {
        self.args.push(strings);
        self
    }

    /// Iterates over every string in encounter order.
    pub fn strings(&self) -> impl Iterator<Item = &LiteralString> {
        self.args.iter().flatten()
    }

    /// The primary string: the first string across all arguments.
    #[must_use]
    pub fn primary(&self) -> Option<&LiteralString> {
        self.strings().next()
    }
}

/// Errors raised while extracting call sites from a file.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// The source could not be parsed.
    #[error("{language} parse error: {message}")]
    Parse {
        /// Language identifier of the extractor.
        language: &'static str,
        /// Parser message.
        message: String,
    },
}

/// Language-specific call-site extraction.
///
/// Implement this to teach the analyzer a new language. Extractors report
/// every call whose identity they can resolve; filtering against the logger
/// registry happens in the analyzer.
pub trait CallSiteExtractor: Send + Sync {
    /// Language identifier (e.g., `"rust"`, `"go"`).
    fn language_id(&self) -> &'static str;

    /// File extensions this extractor handles (e.g., `&[".rs"]`).
    fn extensions(&self) -> &'static [&'static str];

    /// Separator between module path and function in reported call labels.
    fn path_separator(&self) -> &'static str {
        "."
    }

    /// Extracts resolved call sites from one source file.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Parse`] if the source cannot be parsed.
    fn extract(&self, source: &str) -> Result<Vec<CallSite>, ExtractError>;
}

/// Type alias for boxed extractor trait objects.
pub type ExtractorBox = Box<dyn CallSiteExtractor>;
