//! Check command implementation.

use anyhow::{Context, Result};
use clap::Args;
use loglint_core::{
    parse_ignore_chars, parse_keywords, Analyzer, CheckKind, Config, LoggerRegistry, Settings,
};
use loglint_rust::RustExtractor;
use loglint_ts::GoExtractor;
use std::path::{Path, PathBuf};

use crate::config_resolver::ConfigSource;
use crate::OutputFormat;

/// Arguments of `loglint check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path to analyze (default: `[analyzer] root` from the config, else the
    /// current directory)
    pub path: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Exclude patterns (can be specified multiple times)
    #[arg(short, long)]
    pub exclude: Vec<String>,

    /// Number of files analyzed in parallel
    #[arg(short, long)]
    pub jobs: Option<usize>,

    #[command(flatten)]
    pub overrides: SettingsOverrides,
}

/// Command-line overrides layered over the configuration file.
#[derive(Args, Debug, Default)]
pub struct SettingsOverrides {
    /// Only run specific rules (comma-separated names or codes)
    #[arg(long)]
    pub rules: Option<String>,

    /// Check that messages start with a lowercase letter
    #[arg(long, value_name = "BOOL")]
    pub lowercase: Option<bool>,

    /// Check that messages use Latin letters only
    #[arg(long, value_name = "BOOL")]
    pub latin_only: Option<bool>,

    /// Check for special characters and emoji
    #[arg(long, value_name = "BOOL")]
    pub special_chars: Option<bool>,

    /// Check for sensitive keywords
    #[arg(long, value_name = "BOOL")]
    pub sensitive: Option<bool>,

    /// Sensitive keywords (comma or whitespace separated, repeatable)
    #[arg(long, value_name = "LIST")]
    pub sensitive_keys: Vec<String>,

    /// Special characters to accept (e.g. ":,-._()")
    #[arg(long, value_name = "CHARS")]
    pub ignore_special_chars: Option<String>,

    /// Logging call to track, `<module>:<f1>,<f2>` (repeatable)
    #[arg(long = "logger", value_name = "SPEC")]
    pub loggers: Vec<String>,
}

impl SettingsOverrides {
    /// Applies the overrides to settings loaded from configuration.
    fn apply(&self, settings: &mut Settings) -> Result<()> {
        let switches = [
            (CheckKind::Casing, self.lowercase),
            (CheckKind::Script, self.latin_only),
            (CheckKind::Special, self.special_chars),
            (CheckKind::Sensitive, self.sensitive),
        ];
        for (kind, value) in switches {
            if let Some(enabled) = value {
                settings.checks.set(kind, enabled);
            }
        }

        if let Some(filter) = &self.rules {
            let selected = select_rules(filter);
            for kind in CheckKind::ALL {
                if !selected.contains(&kind) {
                    settings.checks.set(kind, false);
                }
            }
        }

        if !self.sensitive_keys.is_empty() {
            settings.sensitive_keys = Some(
                self.sensitive_keys
                    .iter()
                    .flat_map(|list| parse_keywords(list))
                    .collect(),
            );
        }

        if let Some(chars) = &self.ignore_special_chars {
            settings.ignore_special = Some(parse_ignore_chars(chars));
        }

        if !self.loggers.is_empty() {
            settings.loggers =
                Some(LoggerRegistry::from_specs(&self.loggers).context("Invalid --logger")?);
        }

        Ok(())
    }
}

fn select_rules(filter: &str) -> Vec<CheckKind> {
    let mut selected = Vec::new();
    for name in filter.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        match CheckKind::from_name(name) {
            Some(kind) => selected.push(kind),
            None => tracing::warn!("Unknown rule: {}", name),
        }
    }
    selected
}

fn load_config(source: &ConfigSource) -> Result<Config> {
    let Some(path) = source.path() else {
        return Ok(Config::default());
    };
    tracing::info!("Using {} config: {}", source.kind(), path.display());
    let mut config = Config::from_file(path)
        .with_context(|| format!("Failed to load config: {}", path.display()))?;
    anchor_root(&mut config, path);
    Ok(config)
}

/// Makes a relative `[analyzer] root` relative to the config file's directory.
fn anchor_root(config: &mut Config, config_path: &Path) {
    if config.analyzer.root.is_relative() {
        if let Some(dir) = config_path.parent() {
            config.analyzer.root = dir.join(&config.analyzer.root);
        }
    }
}

/// Runs the check command.
pub fn run(args: &CheckArgs, source: &ConfigSource) -> Result<()> {
    let config = load_config(source)?;

    let mut settings = config
        .to_settings()
        .context("Invalid configuration")?;
    args.overrides.apply(&mut settings)?;
    let settings = settings.resolve();
    tracing::debug!("Tracked loggers: {}", settings.loggers);

    let mut builder = Analyzer::builder()
        .config(config)
        .settings(settings)
        .excludes(args.exclude.iter().cloned())
        .extractor(RustExtractor::new())
        .extractor(GoExtractor::new());
    if let Some(path) = &args.path {
        builder = builder.root(path);
    }
    if let Some(jobs) = args.jobs {
        builder = builder.parallelism(jobs);
    }

    let analyzer = builder.build().context("Failed to build analyzer")?;

    tracing::info!(
        "Analyzing {} with {} extractors",
        analyzer.root().display(),
        analyzer.extractor_count()
    );

    let result = analyzer.analyze().context("Analysis failed")?;

    super::output::print(&result, args.format, analyzer.base_dir())?;

    if result.has_errors() {
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn switches_override_config() {
        let mut settings = Config::parse("[checks]\nlowercase = false\n")
            .unwrap()
            .to_settings()
            .unwrap();
        let overrides = SettingsOverrides {
            lowercase: Some(true),
            sensitive: Some(false),
            ..SettingsOverrides::default()
        };

        overrides.apply(&mut settings).unwrap();
        assert!(settings.checks.casing);
        assert!(!settings.checks.sensitive);
        assert!(settings.checks.script);
    }

    #[test]
    fn rules_filter_disables_unselected() {
        let mut settings = Settings::new();
        let overrides = SettingsOverrides {
            rules: Some("LL001, no-sensitive-data, bogus".to_string()),
            ..SettingsOverrides::default()
        };

        overrides.apply(&mut settings).unwrap();
        assert!(settings.checks.casing);
        assert!(!settings.checks.script);
        assert!(!settings.checks.special);
        assert!(settings.checks.sensitive);
    }

    #[test]
    fn lists_and_loggers() {
        let mut settings = Settings::new();
        let overrides = SettingsOverrides {
            sensitive_keys: vec!["password,token".to_string(), "ssn".to_string()],
            ignore_special_chars: Some("#!".to_string()),
            loggers: vec!["fmt:Printf".to_string(), "fmt:Println".to_string()],
            ..SettingsOverrides::default()
        };

        overrides.apply(&mut settings).unwrap();
        assert_eq!(
            settings.sensitive_keys.as_deref(),
            Some(&["password".to_string(), "token".into(), "ssn".into()][..])
        );
        assert_eq!(settings.ignore_special, Some(['#', '!'].into_iter().collect()));
        let loggers = settings.loggers.unwrap();
        assert!(loggers.is_tracked("fmt", "Println"));
        assert!(!loggers.is_tracked("log/slog", "Info"));
    }

    #[test]
    fn empty_keyword_flag_is_explicit() {
        let mut settings = Settings::new();
        let overrides = SettingsOverrides {
            sensitive_keys: vec![String::new()],
            ..SettingsOverrides::default()
        };

        overrides.apply(&mut settings).unwrap();
        assert_eq!(settings.sensitive_keys, Some(Vec::new()));
    }

    #[test]
    fn config_root_is_relative_to_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("loglint.toml");
        std::fs::write(&config_path, "[analyzer]\nroot = \"services\"\n").unwrap();

        let config = load_config(&ConfigSource::Project(config_path)).unwrap();
        assert_eq!(config.analyzer.root, dir.path().join("services"));

        let config = load_config(&ConfigSource::Default).unwrap();
        assert_eq!(config.analyzer.root, PathBuf::from("."));
    }

    #[test]
    fn malformed_logger_is_rejected() {
        let overrides = SettingsOverrides {
            loggers: vec!["fmt:".to_string()],
            ..SettingsOverrides::default()
        };
        assert!(overrides.apply(&mut Settings::new()).is_err());
    }
}
