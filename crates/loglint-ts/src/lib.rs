//! Tree-sitter based Go host for loglint.
//!
//! [`GoExtractor`] parses `.go` files and reports package-level calls such
//! as `fmt.Printf`, `slog.Info` or `zap.L().Info` together with their
//! string arguments. Strings are checked with printf verb stripping.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod go;
mod strings;

pub use go::GoExtractor;
pub use strings::decode_literal;
