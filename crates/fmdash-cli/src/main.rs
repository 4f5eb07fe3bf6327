//! `fmdash` command line front end
//!
//! Manages the persisted card selection of a dashboard and runs refresh cycles
//! against the facility-management analytics backend, printing the published
//! state as JSON.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use fmdash_analytics::{
    AnalyticsOrchestrator, ApiClient, Dashboard, HttpAnalyticsSource, LogNotifier, Metric,
};
use fmdash_core::types::DATE_FORMAT;
use fmdash_core::{AnalyticDescriptor, Config, DashboardVariant, FileStore, KeyValueStore, Module};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Store file used when the configuration names none
const DEFAULT_STORE_FILE: &str = "fmdash-dashboard.json";

/// Command line interface for the dashboard
#[derive(Parser)]
#[command(
    name = "fmdash",
    version = env!("CARGO_PKG_VERSION"),
    about = "Facility-management dashboard analytics",
    long_about = "Select analytics cards, fetch them for a date range and print the published dashboard state."
)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level or filter directive (overrides configuration)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Log format: json or pretty (overrides configuration)
    #[arg(long)]
    log_format: Option<String>,

    /// Dashboard variant (overrides configuration)
    #[arg(long, value_parser = parse_variant)]
    variant: Option<DashboardVariant>,

    /// Dashboard store file (overrides configuration)
    #[arg(long, value_name = "FILE")]
    store: Option<PathBuf>,

    /// Subcommand
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
enum Commands {
    /// List every metric the backend can serve
    Metrics {
        /// Only show metrics of this module
        #[arg(short, long, value_parser = parse_module)]
        module: Option<Module>,
    },

    /// Show the selected cards
    List,

    /// Add a card and refresh the dashboard
    Add {
        /// Module tag, e.g. `amc`
        #[arg(value_parser = parse_module)]
        module: Module,

        /// Endpoint name, e.g. `status_overview`
        endpoint: String,

        /// Card title (defaults to the endpoint name)
        #[arg(short, long)]
        title: Option<String>,

        /// Card id (defaults to `<module>_<endpoint>`)
        #[arg(long)]
        id: Option<String>,
    },

    /// Remove a card and refresh the dashboard
    Remove {
        /// Card id
        id: String,
    },

    /// Run a refresh cycle and print the dashboard state
    Fetch {
        /// First day, YYYY-MM-DD (defaults to one year before --to)
        #[arg(long, value_parser = parse_date)]
        from: Option<NaiveDate>,

        /// Last day, YYYY-MM-DD (defaults to today)
        #[arg(long, value_parser = parse_date)]
        to: Option<NaiveDate>,
    },

    /// Inspect configuration
    Config {
        /// Show resolved configuration
        #[arg(short, long)]
        show: bool,
    },
}

fn parse_module(s: &str) -> Result<Module, String> {
    s.parse().map_err(|e: fmdash_core::Error| e.to_string())
}

fn parse_variant(s: &str) -> Result<DashboardVariant, String> {
    match s {
        "regular" => Ok(DashboardVariant::Regular),
        "executive" => Ok(DashboardVariant::Executive),
        other => Err(format!("unknown dashboard variant '{other}' (regular, executive)")),
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|e| format!("'{s}' is not YYYY-MM-DD: {e}"))
}

/// Main entry point
///
/// # Errors
///
/// Returns error if configuration, logging, the store or the HTTP client
/// cannot be set up
#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (for development convenience)
    if let Err(e) = dotenvy::dotenv() {
        // It's okay if .env doesn't exist
        eprintln!("Note: .env file not loaded: {e}");
    }

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    fmdash_core::init_logging(&config.logging).context("failed to initialize logging")?;
    info!(version = env!("CARGO_PKG_VERSION"), "fmdash starting");

    match cli.command {
        Commands::Metrics { module } => {
            show_metrics(module);
            Ok(())
        }
        Commands::Config { show } => handle_config_command(&config, show),
        Commands::List => {
            let dashboard = open_dashboard(&config)?;
            show_selection(dashboard.selection());
            Ok(())
        }
        Commands::Add {
            module,
            endpoint,
            title,
            id,
        } => {
            let mut dashboard = open_dashboard(&config)?;
            let title = title.unwrap_or_else(|| endpoint.clone());
            let descriptor = match id {
                Some(id) => AnalyticDescriptor::new(id, module, endpoint, title),
                None => AnalyticDescriptor::for_endpoint(module, endpoint, title),
            };
            if Metric::parse(descriptor.module, &descriptor.endpoint).is_none() {
                eprintln!(
                    "Warning: {}/{} is not a known metric; the card will stay empty",
                    descriptor.module, descriptor.endpoint
                );
            }
            let report = dashboard.add(descriptor).await?;
            print_json(&json!({ "selection": dashboard.selection(), "report": report }))
        }
        Commands::Remove { id } => {
            let mut dashboard = open_dashboard(&config)?;
            if !dashboard.selection().iter().any(|a| a.id == id) {
                bail!("no card with id '{id}' is selected");
            }
            let report = dashboard.remove(&id).await?;
            print_json(&json!({ "selection": dashboard.selection(), "report": report }))
        }
        Commands::Fetch { from, to } => {
            let mut dashboard = open_dashboard(&config)?;
            let to = to.unwrap_or_else(|| Local::now().date_naive());
            let from = from.unwrap_or_else(|| fmdash_core::DateRange::last_year(to).from);
            if from > to {
                bail!("--from {from} is after --to {to}");
            }
            let report = dashboard.set_date_range(Some(from), Some(to)).await;
            if report.is_none() {
                eprintln!("Nothing selected; add cards with `fmdash add <module> <endpoint>`");
            }
            print_json(&json!({
                "report": report,
                "state": dashboard.state().snapshot(),
            }))
        }
    }
}

/// Load configuration and apply command line overrides
///
/// # Errors
///
/// Returns error if the configuration cannot be loaded or is invalid
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;

    if let Some(level) = &cli.log_level {
        config.logging.level.clone_from(level);
    }
    if let Some(format) = &cli.log_format {
        config.logging.format.clone_from(format);
    }
    if let Some(variant) = cli.variant {
        config.dashboard.variant = variant;
    }
    if let Some(store) = &cli.store {
        config.dashboard.storage_path = Some(store.clone());
    }

    config.validate().context("invalid configuration")?;
    Ok(config)
}

/// Store file the dashboard persists to
fn store_path(config: &Config) -> &Path {
    config
        .dashboard
        .storage_path
        .as_deref()
        .unwrap_or_else(|| Path::new(DEFAULT_STORE_FILE))
}

/// Build the dashboard from configuration and restore its persisted state
///
/// # Errors
///
/// Returns error if the store cannot be opened or the HTTP client cannot be built
fn open_dashboard(config: &Config) -> Result<Dashboard<HttpAnalyticsSource>> {
    let path = store_path(config);
    let store: Arc<dyn KeyValueStore> = Arc::new(
        FileStore::open(path).with_context(|| format!("failed to open store {}", path.display()))?,
    );
    debug!(path = %path.display(), "opened dashboard store");

    let client = ApiClient::from_config(&config.api)?;
    let source = HttpAnalyticsSource::new(client, Arc::clone(&store), config.api.site_id.clone());
    let orchestrator = AnalyticsOrchestrator::new(source, Arc::new(LogNotifier));

    let mut dashboard = Dashboard::new(
        config.dashboard.variant,
        store,
        orchestrator,
        Local::now().date_naive(),
    );
    dashboard.load();
    Ok(dashboard)
}

/// Print the dispatch table
fn show_metrics(module: Option<Module>) {
    println!("{:<22} {:<38} {:<6} PATH", "MODULE", "ENDPOINT", "DATED");
    for metric in Metric::ALL
        .iter()
        .filter(|m| module.is_none_or(|module| m.module() == module))
    {
        let route = metric.route();
        println!(
            "{:<22} {:<38} {:<6} {}{}",
            metric.module().as_str(),
            metric.endpoint(),
            if route.date_scoped { "yes" } else { "no" },
            route.path,
            route.flag.map(|flag| format!("?{flag}=true")).unwrap_or_default(),
        );
        for alias in metric.endpoints().iter().skip(1) {
            println!("{:<22} {:<38}", "", format!("  alias: {alias}"));
        }
    }
}

/// Print the selected cards
fn show_selection(selection: &[AnalyticDescriptor]) {
    if selection.is_empty() {
        println!("No cards selected");
        return;
    }
    println!("{:<40} {:<22} {:<38} TITLE", "ID", "MODULE", "ENDPOINT");
    for card in selection {
        println!(
            "{:<40} {:<22} {:<38} {}",
            card.id,
            card.module.as_str(),
            card.endpoint,
            card.title
        );
    }
}

/// Handle configuration commands
///
/// # Errors
///
/// Returns error if configuration cannot be serialized
fn handle_config_command(config: &Config, show: bool) -> Result<()> {
    info!(store = %store_path(config).display(), base_url = %config.api.base_url, "configuration is valid");
    if show {
        let mut shown = config.clone();
        if shown.api.access_token.is_some() {
            shown.api.access_token = Some("<redacted>".to_string());
        }
        let config_toml =
            toml::to_string_pretty(&shown).context("failed to serialize configuration")?;
        println!("{config_toml}");
    } else {
        println!("Configuration is valid");
    }
    Ok(())
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_fetch_range() {
        let cli = Cli::try_parse_from([
            "fmdash",
            "--variant",
            "executive",
            "fetch",
            "--from",
            "2024-01-01",
            "--to",
            "2024-01-31",
        ])
        .unwrap();

        assert_eq!(cli.variant, Some(DashboardVariant::Executive));
        match cli.command {
            Commands::Fetch { from, to } => {
                assert_eq!(from, NaiveDate::from_ymd_opt(2024, 1, 1));
                assert_eq!(to, NaiveDate::from_ymd_opt(2024, 1, 31));
            }
            _ => panic!("expected fetch"),
        }
    }

    #[test]
    fn test_rejects_bad_date_and_module() {
        assert!(Cli::try_parse_from(["fmdash", "fetch", "--from", "01/02/2024"]).is_err());
        assert!(Cli::try_parse_from(["fmdash", "add", "spaceships", "status_overview"]).is_err());
    }

    #[test]
    fn test_parse_add() {
        let cli = Cli::try_parse_from(["fmdash", "add", "amc", "status_overview", "-t", "AMC status"])
            .unwrap();
        match cli.command {
            Commands::Add {
                module,
                endpoint,
                title,
                id,
            } => {
                assert_eq!(module, Module::Amc);
                assert_eq!(endpoint, "status_overview");
                assert_eq!(title.as_deref(), Some("AMC status"));
                assert_eq!(id, None);
            }
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn test_store_path_defaults_to_working_directory() {
        let mut config = Config::default();
        assert_eq!(store_path(&config), Path::new(DEFAULT_STORE_FILE));

        config.dashboard.storage_path = Some(PathBuf::from("/var/lib/fmdash/store.json"));
        assert_eq!(store_path(&config), Path::new("/var/lib/fmdash/store.json"));
    }
}
