//! Rule engine: runs the enabled checks over a call site's strings.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::call_site::{CallSite, FormatSyntax, LiteralString, TextRange};
use crate::checks::{
    check_first_lowercase, check_latin, check_sensitive, check_special, keyword_tokens, CheckKind,
};
use crate::normalize::normalize;
use crate::quote::quote;
use crate::registry::LoggerRegistry;
use crate::settings::{CheckSwitches, ResolvedSettings};
use crate::types::Severity;

/// A machine-applicable replacement for a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedFix {
    /// Human-readable description (e.g., `change to "hello"`).
    pub message: String,
    /// Range to replace; always the literal's full range.
    pub range: TextRange,
    /// Replacement source text, quoted.
    pub replacement: String,
}

/// One violated check on one string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Which check failed.
    pub check: CheckKind,
    /// Severity configured for the check.
    pub severity: Severity,
    /// Diagnostic message.
    pub message: String,
    /// Range of the offending string.
    pub range: TextRange,
    /// Optional fix.
    pub fix: Option<SuggestedFix>,
}

impl Diagnostic {
    fn new(check: CheckKind, severity: Severity, range: TextRange) -> Self {
        Self {
            check,
            severity,
            message: check.message().to_string(),
            range,
            fix: None,
        }
    }
}

/// Classifies logging call sites.
///
/// Built once from [`ResolvedSettings`] and then only read, so a single
/// engine can be shared across threads.
#[derive(Debug, Clone)]
pub struct RuleEngine {
    checks: CheckSwitches,
    ignore_special: BTreeSet<char>,
    keyword_tokens: HashSet<String>,
    loggers: LoggerRegistry,
    severities: [Severity; 4],
}

impl RuleEngine {
    /// Creates an engine, tokenizing the sensitive keywords once.
    #[must_use]
    pub fn new(settings: ResolvedSettings) -> Self {
        // Indexed by discriminant; `CheckKind::ALL` is in declaration order.
        let severities = CheckKind::ALL.map(|kind| settings.severity_for(kind));
        Self {
            checks: settings.checks,
            keyword_tokens: keyword_tokens(&settings.sensitive_keys),
            ignore_special: settings.ignore_special,
            loggers: settings.loggers,
            severities,
        }
    }

    /// Returns true if the call's identity is a tracked logging call.
    #[must_use]
    pub fn is_tracked(&self, call: &CallSite) -> bool {
        self.loggers.is_tracked(&call.module_path, &call.function)
    }

    /// Runs the enabled checks over every string of `call`.
    ///
    /// The casing check only sees the primary string. Diagnostics follow
    /// string encounter order; per string the order is casing, script,
    /// special, sensitive.
    #[must_use]
    pub fn classify(&self, call: &CallSite) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        for (index, literal) in call.strings().enumerate() {
            if index == 0 && self.checks.casing {
                diagnostics.extend(self.check_casing(literal, call.format));
            }

            let text = normalize(&literal.text, call.format);

            if self.checks.script && !check_latin(&text) {
                diagnostics.push(self.diagnostic(CheckKind::Script, literal.range));
            }
            if self.checks.special && !check_special(&text, &self.ignore_special) {
                diagnostics.push(self.diagnostic(CheckKind::Special, literal.range));
            }
            if self.checks.sensitive && !check_sensitive(&text, &self.keyword_tokens) {
                diagnostics.push(self.diagnostic(CheckKind::Sensitive, literal.range));
            }
        }

        diagnostics
    }

    fn check_casing(&self, literal: &LiteralString, syntax: FormatSyntax) -> Option<Diagnostic> {
        let fixed = check_first_lowercase(&literal.text)?;
        let quoted = quote(&fixed, syntax);

        let mut diagnostic = self.diagnostic(CheckKind::Casing, literal.range);
        diagnostic.fix = Some(SuggestedFix {
            message: format!("change to {quoted}"),
            range: literal.range,
            replacement: quoted,
        });
        Some(diagnostic)
    }

    fn diagnostic(&self, kind: CheckKind, range: TextRange) -> Diagnostic {
        Diagnostic::new(kind, self.severity(kind), range)
    }

    fn severity(&self, kind: CheckKind) -> Severity {
        self.severities[kind as usize]
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new(ResolvedSettings::default())
    }
}
