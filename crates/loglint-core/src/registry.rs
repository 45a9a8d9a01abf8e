//! Logger registry: which `(module path, function)` pairs are logging calls.

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

/// Errors raised while building a registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Malformed `"<module>:<f1>,<f2>,..."` specification.
    #[error("invalid logger spec {spec:?}: {reason}")]
    InvalidSpec {
        /// The offending specification text.
        spec: String,
        /// What is wrong with it.
        reason: &'static str,
    },
}

/// A single parsed `"<module>:<f1>,<f2>,..."` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerSpec {
    /// Module path (e.g., `"log/slog"`, `"tracing"`).
    pub module_path: String,
    /// Function names, at least one.
    pub functions: Vec<String>,
}

impl FromStr for LoggerSpec {
    type Err = RegistryError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| RegistryError::InvalidSpec {
            spec: spec.to_string(),
            reason,
        };

        let (module, rest) = spec
            .split_once(':')
            .ok_or_else(|| invalid("expected <module>:<func1>,<func2>,..."))?;

        let module = module.trim();
        if module.is_empty() {
            return Err(invalid("empty module path"));
        }
        if rest.trim().is_empty() {
            return Err(invalid("empty function list"));
        }

        let functions: Vec<String> = rest
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(String::from)
            .collect();
        if functions.is_empty() {
            return Err(invalid("no function names parsed"));
        }

        Ok(Self {
            module_path: module.to_string(),
            functions,
        })
    }
}

/// Set of tracked logging functions keyed by module path.
///
/// Built once during configuration and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoggerRegistry {
    entries: BTreeMap<String, BTreeSet<String>>,
}

impl LoggerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Unions `functions` into the set tracked for `module_path`.
    pub fn register<I, S>(&mut self, module_path: impl Into<String>, functions: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries
            .entry(module_path.into())
            .or_default()
            .extend(functions.into_iter().map(Into::into));
    }

    /// Registers a parsed spec.
    pub fn register_spec(&mut self, spec: LoggerSpec) {
        self.register(spec.module_path, spec.functions);
    }

    /// Parses `"<module>:<f1>,<f2>,..."` and registers it.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidSpec`]; the registry is left unchanged.
    pub fn add_spec(&mut self, spec: &str) -> Result<(), RegistryError> {
        let spec: LoggerSpec = spec.parse()?;
        self.register_spec(spec);
        Ok(())
    }

    /// Builds a registry from several specs, merging repeated module paths.
    ///
    /// # Errors
    ///
    /// Returns the first [`RegistryError::InvalidSpec`] encountered.
    pub fn from_specs<I, S>(specs: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut registry = Self::new();
        for spec in specs {
            registry.add_spec(spec.as_ref())?;
        }
        Ok(registry)
    }

    /// Returns true if `function` in `module_path` is a tracked logging call.
    ///
    /// Exact, case-sensitive match on both parts.
    #[must_use]
    pub fn is_tracked(&self, module_path: &str, function: &str) -> bool {
        self.entries
            .get(module_path)
            .is_some_and(|functions| functions.contains(function))
    }

    /// Iterates entries ordered by module path.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of module paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The registry used when configuration leaves loggers unset.
    #[must_use]
    pub fn default_loggers() -> Self {
        let mut registry = Self::new();
        registry.register("fmt", ["Printf", "Println", "Print"]);
        registry.register(
            "go.uber.org/zap",
            [
                "Debug", "Info", "Warn", "Error", "DPanic", "Panic", "Fatal", "Log", "Debugf",
                "Infof", "Warnf", "Errorf", "DPanicf", "Panicf", "Fatalf", "Debugln", "Infoln",
                "Warnln", "Errorln", "DPanicln", "Panicln", "Fatalln", "Debugw", "Infow", "Warnw",
                "Errorw", "DPanicw", "Panicw", "Fatalw", "Logf", "Logln", "Logw",
            ],
        );
        registry.register(
            "log/slog",
            [
                "Debug",
                "Info",
                "Warn",
                "Error",
                "DebugContext",
                "InfoContext",
                "WarnContext",
                "ErrorContext",
                "Log",
                "LogAttrs",
            ],
        );
        registry.register("std", ["println", "print", "eprintln", "eprint", "panic"]);
        registry.register("log", ["trace", "debug", "info", "warn", "error", "log"]);
        registry.register("tracing", ["trace", "debug", "info", "warn", "error", "event"]);
        registry
    }
}

impl std::fmt::Display for LoggerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, (module, functions)) in self.entries().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            let names: Vec<&str> = functions.iter().map(String::as_str).collect();
            write!(f, "{module}:{}", names.join(","))?;
        }
        Ok(())
    }
}
