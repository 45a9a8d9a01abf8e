//! List rules command implementation.

use loglint_core::{CheckKind, LoggerRegistry, DEFAULT_IGNORE_SPECIAL, DEFAULT_SENSITIVE_KEYS};

/// Runs the list-rules command.
pub fn run() {
    println!("Available rules:\n");
    println!("{:<10} {:<20} Description", "Code", "Name");
    println!("{}", "-".repeat(80));

    for kind in CheckKind::ALL {
        println!("{:<10} {:<20} {}", kind.code(), kind.name(), kind.description());
    }

    let ignore: String = DEFAULT_IGNORE_SPECIAL.iter().collect();
    println!("\nDefaults:");
    println!("  sensitive-keys        {}", DEFAULT_SENSITIVE_KEYS.join(", "));
    println!("  ignore-special-chars  {ignore}");
    println!("  loggers:");
    for (module, functions) in LoggerRegistry::default_loggers().entries() {
        let names: Vec<&str> = functions.iter().map(String::as_str).collect();
        println!("    {module}: {}", names.join(", "));
    }

    println!("\nUse --rules to run a subset, e.g.:");
    println!("  loglint check --rules lowercase-first,no-sensitive-data");
    println!("  loglint check --rules LL001,LL004");
}
