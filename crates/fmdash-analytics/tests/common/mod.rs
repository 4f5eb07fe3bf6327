//! Common test utilities and fixtures for integration tests

#![allow(dead_code, unreachable_pub, clippy::unwrap_used)]

use chrono::NaiveDate;
use fmdash_analytics::mock::MockAnalyticsSource;
use fmdash_analytics::{AnalyticsOrchestrator, RecordingNotifier};
use fmdash_core::{AnalyticDescriptor, DateRange, Module};
use std::sync::{Arc, Once};

static INIT_LOGGER: Once = Once::new();

/// Initialize test logging once per test binary
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .try_init();
    });
}

/// Calendar date shorthand
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// January 2024
pub fn january() -> DateRange {
    DateRange::new(date(2024, 1, 1), date(2024, 1, 31))
}

/// February 2024
pub fn february() -> DateRange {
    DateRange::new(date(2024, 2, 1), date(2024, 2, 29))
}

/// Descriptor with an id derived from module and endpoint
pub fn card(module: Module, endpoint: &str) -> AnalyticDescriptor {
    AnalyticDescriptor::for_endpoint(module, endpoint, format!("{module} {endpoint}"))
}

/// Orchestrator wired to a shared mock source and recording notifier
pub struct TestHarness {
    pub source: Arc<MockAnalyticsSource>,
    pub notifier: Arc<RecordingNotifier>,
    pub orchestrator: AnalyticsOrchestrator<Arc<MockAnalyticsSource>>,
}

impl TestHarness {
    /// Harness around a default mock source
    pub fn new() -> Self {
        Self::with_source(MockAnalyticsSource::new())
    }

    /// Harness around a configured mock source
    pub fn with_source(source: MockAnalyticsSource) -> Self {
        init_test_logging();
        let source = Arc::new(source);
        let notifier = Arc::new(RecordingNotifier::new());
        let orchestrator = AnalyticsOrchestrator::new(Arc::clone(&source), notifier.clone());
        Self {
            source,
            notifier,
            orchestrator,
        }
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
