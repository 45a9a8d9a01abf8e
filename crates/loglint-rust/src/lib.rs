//! # loglint-rust
//!
//! Rust host for loglint.
//!
//! [`RustExtractor`] parses `.rs` files with `syn` and reports logging
//! macro invocations (`tracing::info!`, `log::warn!`, `println!`, ...) and
//! plain function calls whose path can be resolved from the file alone.
//! Message strings are checked with brace-style placeholder stripping, so
//! `{}` and `{name:?}` never count as special characters.
//!
//! ## Usage
//!
//! ```ignore
//! use loglint_core::Analyzer;
//! use loglint_rust::RustExtractor;
//!
//! let result = Analyzer::builder()
//!     .root("./src")
//!     .extractor(RustExtractor::new())
//!     .build()?
//!     .analyze()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod extractor;
mod scope;

pub use extractor::RustExtractor;

/// Re-export core types for convenience.
pub use loglint_core::{CallSite, CallSiteExtractor, Severity, Violation};
