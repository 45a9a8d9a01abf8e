//! Init command implementation.

use anyhow::{bail, Context, Result};
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# loglint configuration

[analyzer]
# Root directory to analyze (default: current directory)
# root = "./src"

# Glob patterns to exclude, relative to the root
exclude = [
    "**/target/**",
    "**/vendor/**",
    "**/testdata/**",
]

# Respect .gitignore files
respect_gitignore = true

# Files analyzed in parallel (default: one per CPU)
# parallelism = 4

[checks]
lowercase = true
latin-only = true
special-chars = true
sensitive = true

[settings]
# Omitted keys use the built-in defaults (see `loglint list-rules`).
# An empty list disables keyword matching.
# sensitive-keys = ["password", "secret", "token", "key", "credential"]
# ignore-special-chars = ":,-._()"
# loggers = ["fmt:Printf,Println,Print", "log/slog:Info,Warn,Error", "tracing:info,warn,error"]

[severity]
# lowercase-first = "warning"
# no-sensitive-data = "error"
"#;

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    let config_path = Path::new("loglint.toml");

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    println!("Created loglint.toml");
    println!("\nNext steps:");
    println!("  1. Edit loglint.toml to choose checks and tracked loggers");
    println!("  2. Run: loglint check");

    Ok(())
}
