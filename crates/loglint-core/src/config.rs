//! Configuration file types for loglint.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::checks::CheckKind;
use crate::registry::{LoggerRegistry, RegistryError};
use crate::settings::{CheckSwitches, Settings};
use crate::types::Severity;

/// Top-level configuration for loglint (`loglint.toml`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Analyzer configuration.
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    /// Check switches.
    #[serde(default)]
    pub checks: ChecksConfig,

    /// Check inputs: keywords, ignored characters, loggers.
    #[serde(default)]
    pub settings: SettingsConfig,

    /// Severity per rule, keyed by rule name or code.
    #[serde(default)]
    pub severity: BTreeMap<String, Severity>,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Builds the partially-specified check settings described by this file.
    ///
    /// Keys absent from the file stay unset so that defaults can be applied
    /// later by [`Settings::resolve`].
    ///
    /// # Errors
    ///
    /// Returns an error for malformed logger specs or unknown rule names.
    pub fn to_settings(&self) -> Result<Settings, ConfigError> {
        let mut settings = Settings::new().checks(self.checks.switches());

        if let Some(keys) = &self.settings.sensitive_keys {
            settings.sensitive_keys = Some(keys.iter().flat_map(|k| parse_keywords(k)).collect());
        }
        if let Some(chars) = &self.settings.ignore_special_chars {
            settings.ignore_special = Some(parse_ignore_chars(chars));
        }
        if let Some(loggers) = &self.settings.loggers {
            settings.loggers = Some(LoggerRegistry::from_specs(loggers)?);
        }

        for (rule, severity) in &self.severity {
            let kind =
                CheckKind::from_name(rule).ok_or_else(|| ConfigError::UnknownRule(rule.clone()))?;
            settings.severities.insert(kind, *severity);
        }

        Ok(settings)
    }
}

/// Analyzer-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Root directory to analyze (default: current directory).
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Glob patterns to exclude from analysis.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Whether to respect .gitignore files.
    #[serde(default = "default_true")]
    pub respect_gitignore: bool,

    /// Maximum number of parallel file analyses.
    #[serde(default)]
    pub parallelism: Option<usize>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            exclude: Vec::new(),
            respect_gitignore: true,
            parallelism: None,
        }
    }
}

/// `[checks]` section. Every switch defaults to enabled.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[allow(clippy::struct_excessive_bools)]
pub struct ChecksConfig {
    /// Require a lowercase first letter.
    #[serde(default = "default_true")]
    pub lowercase: bool,
    /// Require Latin letters only.
    #[serde(default = "default_true")]
    pub latin_only: bool,
    /// Forbid special characters and emoji.
    #[serde(default = "default_true")]
    pub special_chars: bool,
    /// Forbid sensitive keywords.
    #[serde(default = "default_true")]
    pub sensitive: bool,
}

impl ChecksConfig {
    /// Converts to engine switches.
    #[must_use]
    pub fn switches(&self) -> CheckSwitches {
        CheckSwitches {
            casing: self.lowercase,
            script: self.latin_only,
            special: self.special_chars,
            sensitive: self.sensitive,
        }
    }
}

impl Default for ChecksConfig {
    fn default() -> Self {
        Self {
            lowercase: true,
            latin_only: true,
            special_chars: true,
            sensitive: true,
        }
    }
}

/// `[settings]` section. Absent keys fall back to built-in defaults; an
/// explicitly empty value is kept.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SettingsConfig {
    /// Sensitive keywords.
    #[serde(default)]
    pub sensitive_keys: Option<Vec<String>>,
    /// Characters accepted by the special-character check.
    #[serde(default)]
    pub ignore_special_chars: Option<String>,
    /// Logger specs, `"<module>:<f1>,<f2>,..."`.
    #[serde(default)]
    pub loggers: Option<Vec<String>>,
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_true() -> bool {
    true
}

/// Splits a comma/whitespace-delimited keyword list.
#[must_use]
pub fn parse_keywords(list: &str) -> Vec<String> {
    list.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|k| !k.is_empty())
        .map(String::from)
        .collect()
}

/// Collects the characters of an ignore list, skipping whitespace.
#[must_use]
pub fn parse_ignore_chars(chars: &str) -> std::collections::BTreeSet<char> {
    chars.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },

    /// Malformed logger specification.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Severity configured for a rule that does not exist.
    #[error("Unknown rule in [severity]: {0}")]
    UnknownRule(String),
}
