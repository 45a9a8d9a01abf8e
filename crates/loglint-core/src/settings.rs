//! Check settings and their defaults.
//!
//! [`Settings`] is the partially-specified form assembled from config files
//! and CLI flags. `None` means "unset" and is replaced by the default in
//! [`Settings::resolve`]; `Some` of an empty collection is a deliberate
//! choice and is kept.

use std::collections::{BTreeMap, BTreeSet};

use crate::checks::CheckKind;
use crate::registry::LoggerRegistry;
use crate::types::Severity;

/// Sensitive keywords used when none are configured.
pub const DEFAULT_SENSITIVE_KEYS: &[&str] = &["password", "secret", "token", "key", "credential"];

/// Special characters allowed when no ignore set is configured.
pub const DEFAULT_IGNORE_SPECIAL: &[char] = &[':', ',', '-', '.', '_', '(', ')'];

/// On/off switch per check. Always explicit, never defaulted by
/// [`Settings::resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct CheckSwitches {
    /// First letter of the primary string must be lowercase.
    pub casing: bool,
    /// Letters must be Latin.
    pub script: bool,
    /// No special characters outside the ignore set.
    pub special: bool,
    /// No sensitive keywords.
    pub sensitive: bool,
}

impl CheckSwitches {
    /// Every check enabled.
    #[must_use]
    pub fn all() -> Self {
        Self {
            casing: true,
            script: true,
            special: true,
            sensitive: true,
        }
    }

    /// Every check disabled.
    #[must_use]
    pub fn none() -> Self {
        Self {
            casing: false,
            script: false,
            special: false,
            sensitive: false,
        }
    }

    /// Returns whether `kind` is enabled.
    #[must_use]
    pub fn is_enabled(&self, kind: CheckKind) -> bool {
        match kind {
            CheckKind::Casing => self.casing,
            CheckKind::Script => self.script,
            CheckKind::Special => self.special,
            CheckKind::Sensitive => self.sensitive,
        }
    }

    /// Enables or disables `kind`.
    pub fn set(&mut self, kind: CheckKind, enabled: bool) {
        match kind {
            CheckKind::Casing => self.casing = enabled,
            CheckKind::Script => self.script = enabled,
            CheckKind::Special => self.special = enabled,
            CheckKind::Sensitive => self.sensitive = enabled,
        }
    }
}

impl Default for CheckSwitches {
    fn default() -> Self {
        Self::all()
    }
}

/// Partially-specified check settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    /// Which checks run.
    pub checks: CheckSwitches,
    /// Characters the special-character check accepts.
    pub ignore_special: Option<BTreeSet<char>>,
    /// Sensitive keywords in source form (tokenized by the engine).
    pub sensitive_keys: Option<Vec<String>>,
    /// Tracked logging calls.
    pub loggers: Option<LoggerRegistry>,
    /// Severity overrides per check.
    pub severities: BTreeMap<CheckKind, Severity>,
}

impl Settings {
    /// Creates settings with every check enabled and every optional unset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the check switches.
    #[must_use]
    pub fn checks(mut self, checks: CheckSwitches) -> Self {
        self.checks = checks;
        self
    }

    /// Sets the ignored special characters.
    #[must_use]
    pub fn ignore_special(mut self, chars: impl IntoIterator<Item = char>) -> Self {
        self.ignore_special = Some(chars.into_iter().collect());
        self
    }

    /// Sets the sensitive keywords.
    #[must_use]
    pub fn sensitive_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sensitive_keys = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the logger registry.
    #[must_use]
    pub fn loggers(mut self, registry: LoggerRegistry) -> Self {
        self.loggers = Some(registry);
        self
    }

    /// Overrides the severity reported for `kind`.
    #[must_use]
    pub fn severity(mut self, kind: CheckKind, severity: Severity) -> Self {
        self.severities.insert(kind, severity);
        self
    }

    /// Substitutes defaults for every unset optional.
    ///
    /// Each optional is handled independently; switches pass through as-is.
    #[must_use]
    pub fn resolve(self) -> ResolvedSettings {
        ResolvedSettings {
            checks: self.checks,
            ignore_special: self
                .ignore_special
                .unwrap_or_else(|| DEFAULT_IGNORE_SPECIAL.iter().copied().collect()),
            sensitive_keys: self.sensitive_keys.unwrap_or_else(|| {
                DEFAULT_SENSITIVE_KEYS
                    .iter()
                    .map(|k| (*k).to_string())
                    .collect()
            }),
            loggers: self.loggers.unwrap_or_else(LoggerRegistry::default_loggers),
            severities: self.severities,
        }
    }
}

/// Fully-resolved settings. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSettings {
    /// Which checks run.
    pub checks: CheckSwitches,
    /// Characters the special-character check accepts.
    pub ignore_special: BTreeSet<char>,
    /// Sensitive keywords in source form.
    pub sensitive_keys: Vec<String>,
    /// Tracked logging calls.
    pub loggers: LoggerRegistry,
    /// Severity overrides per check.
    pub severities: BTreeMap<CheckKind, Severity>,
}

impl ResolvedSettings {
    /// Severity reported for `kind` (default: warning).
    #[must_use]
    pub fn severity_for(&self, kind: CheckKind) -> Severity {
        self.severities
            .get(&kind)
            .copied()
            .unwrap_or(Severity::Warning)
    }
}

impl Default for ResolvedSettings {
    fn default() -> Self {
        Settings::default().resolve()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_fields_take_defaults() {
        let resolved = Settings::new().resolve();

        assert_eq!(resolved.sensitive_keys, DEFAULT_SENSITIVE_KEYS);
        assert!(resolved.ignore_special.contains(&':'));
        assert!(resolved.ignore_special.contains(&')'));
        assert_eq!(resolved.loggers, LoggerRegistry::default_loggers());
    }

    #[test]
    fn explicit_empty_is_kept() {
        let resolved = Settings::new()
            .sensitive_keys(Vec::<String>::new())
            .ignore_special([])
            .loggers(LoggerRegistry::new())
            .resolve();

        assert!(resolved.sensitive_keys.is_empty());
        assert!(resolved.ignore_special.is_empty());
        assert!(resolved.loggers.is_empty());
    }

    #[test]
    fn fields_resolve_independently() {
        let resolved = Settings::new().sensitive_keys(["pin"]).resolve();

        assert_eq!(resolved.sensitive_keys, ["pin"]);
        assert_eq!(resolved.ignore_special.len(), DEFAULT_IGNORE_SPECIAL.len());
        assert!(resolved.loggers.is_tracked("fmt", "Printf"));
    }

    #[test]
    fn disabled_switch_survives_resolve() {
        let mut checks = CheckSwitches::all();
        checks.set(CheckKind::Script, false);
        let resolved = Settings::new().checks(checks).resolve();

        assert!(!resolved.checks.is_enabled(CheckKind::Script));
        assert!(resolved.checks.is_enabled(CheckKind::Casing));
    }

    #[test]
    fn severity_defaults_to_warning() {
        let resolved = Settings::new()
            .severity(CheckKind::Sensitive, Severity::Error)
            .resolve();

        assert_eq!(resolved.severity_for(CheckKind::Sensitive), Severity::Error);
        assert_eq!(resolved.severity_for(CheckKind::Casing), Severity::Warning);
    }
}
