//! # loglint-core
//!
//! Message classification engine for linting the string arguments of
//! logging calls.
//!
//! This crate is language-agnostic. Language hosts implement
//! [`CallSiteExtractor`] to turn source files into resolved [`CallSite`]s;
//! the [`RuleEngine`] then applies four checks to every string:
//!
//! - `lowercase-first` (LL001): the first letter of the message is lowercase
//! - `latin-only` (LL002): every letter is Latin
//! - `no-special-chars` (LL003): no punctuation, symbols or emoji outside an
//!   ignore set
//! - `no-sensitive-data` (LL004): no sensitive keywords such as `password`
//!
//! The [`Analyzer`] walks a project, feeds each file to the matching
//! extractor and reports [`Violation`]s.
//!
//! ## Example
//!
//! ```ignore
//! use loglint_core::Analyzer;
//! use loglint_rust::RustExtractor;
//!
//! let analyzer = Analyzer::builder()
//!     .root("./src")
//!     .extractor(RustExtractor::new())
//!     .build()?;
//!
//! let result = analyzer.analyze()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analyzer;
mod call_site;
mod checks;
mod config;
mod context;
mod engine;
mod normalize;
mod quote;
mod registry;
mod settings;
mod suppress;
mod tokenizer;
mod types;

pub use analyzer::{Analyzer, AnalyzerBuilder, AnalyzerError};
pub use call_site::{
    CallSite, CallSiteExtractor, ExtractError, ExtractorBox, FormatSyntax, LiteralString,
    TextRange,
};
pub use checks::{
    check_first_lowercase, check_latin, check_sensitive, check_special, keyword_tokens, CheckKind,
};
pub use config::{
    parse_ignore_chars, parse_keywords, AnalyzerConfig, ChecksConfig, Config, ConfigError,
    SettingsConfig,
};
pub use context::{FileContext, LineIndex};
pub use engine::{Diagnostic, RuleEngine, SuggestedFix};
pub use normalize::{normalize, strip_format_verbs, strip_placeholders};
pub use quote::{quote, quote_go};
pub use registry::{LoggerRegistry, LoggerSpec, RegistryError};
pub use settings::{
    CheckSwitches, ResolvedSettings, Settings, DEFAULT_IGNORE_SPECIAL, DEFAULT_SENSITIVE_KEYS,
};
pub use suppress::{check_allow, AllowCheck};
pub use tokenizer::tokenize;
pub use types::{LintResult, Location, Replacement, Severity, Suggestion, Violation, ViolationDiagnostic};
