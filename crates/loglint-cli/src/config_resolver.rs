//! Locating `loglint.toml`.
//!
//! Priority order:
//!
//! 1. `--config` flag (explicit path, not checked for existence)
//! 2. `loglint.toml` or `.loglint.toml` in the analyzed directory or the
//!    nearest ancestor that has one
//! 3. `~/.loglint/config.toml` (or `$LOGLINT_CONFIG_DIR/config.toml`)
//! 4. Built-in defaults

use std::path::{Path, PathBuf};

/// Where the configuration was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Given with `--config`.
    Explicit(PathBuf),
    /// Found next to the analyzed sources.
    Project(PathBuf),
    /// Loaded from the global config directory.
    Global(PathBuf),
    /// Nothing found.
    Default,
}

impl ConfigSource {
    /// Returns the resolved path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }

    /// Short label for log output.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Explicit(_) => "explicit",
            Self::Project(_) => "project",
            Self::Global(_) => "global",
            Self::Default => "default",
        }
    }
}

const PROJECT_CONFIG_NAMES: &[&str] = &["loglint.toml", ".loglint.toml"];

const GLOBAL_CONFIG_NAME: &str = "config.toml";

/// Resolves the configuration for the sources at `target` (file or
/// directory).
#[must_use]
pub fn resolve(target: &Path, explicit: Option<&Path>) -> ConfigSource {
    resolve_inner(target, explicit, global_config_dir())
}

fn resolve_inner(target: &Path, explicit: Option<&Path>, global_dir: Option<PathBuf>) -> ConfigSource {
    if let Some(p) = explicit {
        return ConfigSource::Explicit(p.to_path_buf());
    }

    let start = if target.is_file() {
        target.parent().unwrap_or(target)
    } else {
        target
    };
    let start = start.canonicalize().unwrap_or_else(|_| start.to_path_buf());

    for dir in start.ancestors() {
        if let Some(found) = project_config_in(dir) {
            tracing::debug!("Found project config: {}", found.display());
            return ConfigSource::Project(found);
        }
    }

    global_dir
        .map(|dir| dir.join(GLOBAL_CONFIG_NAME))
        .filter(|candidate| candidate.is_file())
        .map_or(ConfigSource::Default, |candidate| {
            tracing::debug!("Found global config: {}", candidate.display());
            ConfigSource::Global(candidate)
        })
}

fn project_config_in(dir: &Path) -> Option<PathBuf> {
    PROJECT_CONFIG_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|candidate| candidate.is_file())
}

/// `$LOGLINT_CONFIG_DIR`, else `~/.loglint/`.
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("LOGLINT_CONFIG_DIR") {
        return Some(PathBuf::from(dir));
    }
    home::home_dir().map(|h| h.join(".loglint"))
}
