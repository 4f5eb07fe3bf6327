//! Core types and utilities for the `fmdash` analytics dashboard
//!
//! Holds the data model shared by the orchestrator and its collaborators
//! (modules, descriptors, date ranges, grid layout), the configuration layer,
//! the key-value store abstraction used for dashboard persistence, and the
//! logging bootstrap.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod config;
pub mod error;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};
pub use store::{FileStore, KeyValueStore, KeyValueStoreExt, MemoryStore};
pub use types::{
    AnalyticDescriptor, DashboardVariant, DateRange, DateRangeKey, LayoutItem, Module,
};

/// Initialize the logging system
///
/// `RUST_LOG` takes precedence over the configured level. Calling this more
/// than once returns an error instead of replacing the active subscriber.
///
/// # Errors
///
/// Returns an error if the filter is invalid or a global subscriber is already set.
pub fn init_logging(logging: &config::LoggingConfig) -> Result<()> {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .map_err(|e| Error::Configuration {
            message: format!("invalid log filter '{}': {e}", logging.level),
        })?;

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = if logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init()
    };

    result.map_err(|e| Error::Other(format!("failed to initialize logging: {e}")))
}
