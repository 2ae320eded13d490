use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset};
use clap::{Parser, Subcommand};
use colored::Colorize;

use cdn_deprecation::{
    Clock, CreateGuard, DeprecationConfig, DeprecationRegistry, FixedClock, GuardError, Resource,
    SystemClock,
};

#[derive(Parser)]
#[command(name = "cdn-deprecation")]
#[command(about = "Deprecation checks for Azure CDN and Front Door resources", long_about = None)]
struct Cli {
    /// Path to a JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Evaluate as of this RFC 3339 timestamp instead of now;
    /// its offset is used as the local timezone
    #[arg(long, global = true, value_parser = parse_at)]
    at: Option<DateTime<FixedOffset>>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show every named deprecation check and whether it has passed
    Status {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Evaluate a single YYYY-MM-DD threshold
    Check {
        date: String,
    },
    /// Run the create guard over a JSON array of planned resources
    Validate {
        /// Path to the resources file
        file: PathBuf,
    },
}

fn parse_at(s: &str) -> Result<DateTime<FixedOffset>, String> {
    DateTime::parse_from_rfc3339(s)
        .map_err(|e| format!("invalid RFC 3339 timestamp '{}': {}", s, e))
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let result = build_registry(cli.config.as_deref(), cli.at).and_then(|registry| {
        match cli.command {
            Commands::Status { json } => run_status(&registry, json),
            Commands::Check { date } => run_check(&registry, &date),
            Commands::Validate { file } => run_validate(registry, &file),
        }
    });

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn build_registry(
    config: Option<&Path>,
    at: Option<DateTime<FixedOffset>>,
) -> Result<DeprecationRegistry<Box<dyn Clock>>, String> {
    let config = DeprecationConfig::load(config).map_err(|e| e.to_string())?;

    let clock: Box<dyn Clock> = match at {
        Some(at) => Box::new(FixedClock::from_local(at)),
        None => Box::new(SystemClock),
    };

    let registry = config.registry_with_clock(clock).map_err(|e| e.to_string())?;

    if let Err(errors) = registry.thresholds().validate() {
        for error in errors {
            eprintln!("{} {} (treated as not passed)", "Warning:".yellow().bold(), error);
        }
    }

    Ok(registry)
}

fn run_status<C: Clock>(registry: &DeprecationRegistry<C>, json: bool) -> Result<(), String> {
    let status = registry.status();

    if json {
        let output = serde_json::to_string_pretty(&status)
            .map_err(|e| format!("Failed to serialize status: {}", e))?;
        println!("{}", output);
        return Ok(());
    }

    println!(
        "Reference timezone: {}\n",
        registry.evaluator().reference().name().bold()
    );
    for entry in &status {
        let state = if entry.passed {
            "passed".red().bold()
        } else {
            "not passed".green()
        };
        println!("  {:<30} {}  {}", entry.check.name(), entry.threshold, state);
    }

    Ok(())
}

/// Malformed dates are reported by the evaluator's `warn!` and print as not passed
fn run_check<C: Clock>(registry: &DeprecationRegistry<C>, date: &str) -> Result<(), String> {
    if registry.is_date_passed(date) {
        println!("{} {}", date, "passed".red().bold());
    } else {
        println!("{} {}", date, "not passed".green());
    }
    Ok(())
}

fn run_validate<C: Clock>(registry: DeprecationRegistry<C>, path: &Path) -> Result<(), String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    let resources: Vec<Resource> = serde_json::from_str(&content)
        .map_err(|e| format!("Failed to parse {}: {}", path.display(), e))?;

    let guard = CreateGuard::new(registry);
    match guard.check_all(&resources) {
        Ok(()) => {
            println!(
                "{} {} resource(s) can be created",
                "✓".green().bold(),
                resources.len()
            );
            Ok(())
        }
        Err(errors) => {
            for error in &errors {
                println!("{} {}", "✗".red().bold(), error);
            }
            Err(blocked_summary(&errors))
        }
    }
}

/// One resource can trip several checks; count each resource once
fn blocked_summary(errors: &[GuardError]) -> String {
    let blocked: HashSet<_> = errors.iter().map(|e| &e.resource_id).collect();
    format!(
        "{} resource(s) blocked by {} deprecation check(s)",
        blocked.len(),
        errors.len()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn at(s: &str) -> Option<DateTime<FixedOffset>> {
        Some(parse_at(s).unwrap())
    }

    fn resources_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_parse_at() {
        assert!(parse_at("2025-10-01T00:00:00-07:00").is_ok());
        assert!(parse_at("2025-10-01").is_err());
    }

    #[test]
    fn test_build_registry_uses_at_offset_as_local() {
        // Los Angeles still reads 2025-09-30, Tokyo reads 2025-10-01
        let registry = build_registry(None, at("2025-10-01T15:59:59+09:00")).unwrap();
        assert!(registry.is_date_passed("2025-10-01"));

        let registry = build_registry(None, at("2025-09-30T23:59:59-07:00")).unwrap();
        assert!(!registry.is_date_passed("2025-10-01"));
    }

    #[test]
    fn test_build_registry_missing_config() {
        let result = build_registry(Some(Path::new("/nonexistent/cdn-deprecation.json")), None);
        assert!(result.unwrap_err().contains("Failed to read config file"));
    }

    #[test]
    fn test_validate_blocks_classic_profile() {
        let file = resources_file(
            r#"[
                {"type": "cdn_profile", "name": "legacy", "attributes": {"sku": "Standard_Microsoft"}},
                {"type": "cdn_frontdoor_profile", "name": "afd", "attributes": {"sku_name": "Standard_AzureFrontDoor"}}
            ]"#,
        );
        let registry = build_registry(None, at("2025-10-02T12:00:00Z")).unwrap();
        let err = run_validate(registry, file.path()).unwrap_err();
        assert!(err.contains("1 resource(s) blocked"));
    }

    #[test]
    fn test_validate_counts_retired_profile_once() {
        let file = resources_file(
            r#"[{"type": "cdn_profile", "name": "legacy", "attributes": {"sku": "Standard_Microsoft"}}]"#,
        );
        let registry = build_registry(None, at("2028-01-01T00:00:00Z")).unwrap();
        let err = run_validate(registry, file.path()).unwrap_err();
        assert_eq!(err, "1 resource(s) blocked by 2 deprecation check(s)");
    }

    #[test]
    fn test_check_malformed_date_is_not_an_error() {
        let registry = build_registry(None, at("2030-01-01T00:00:00Z")).unwrap();
        assert!(run_check(&registry, "2025-13-40").is_ok());
        assert!(!registry.is_date_passed("2025-13-40"));
    }

    #[test]
    fn test_validate_passes_before_threshold() {
        let file = resources_file(
            r#"[{"type": "cdn_profile", "name": "legacy", "attributes": {"sku": "Standard_Microsoft"}}]"#,
        );
        let registry = build_registry(None, at("2024-01-01T00:00:00Z")).unwrap();
        assert!(run_validate(registry, file.path()).is_ok());
    }

    #[test]
    fn test_validate_rejects_malformed_file() {
        let file = resources_file("{}");
        let registry = build_registry(None, None).unwrap();
        assert!(run_validate(registry, file.path()).unwrap_err().contains("Failed to parse"));
    }
}
