//! Mock analytics source for testing

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::collections::HashMap;
use tokio::time::{sleep, Duration};

use crate::dispatch::Metric;
use crate::error::{AnalyticsError, AnalyticsResult};
use crate::source::AnalyticsSource;
use fmdash_core::DateRange;

/// Mock analytics source for testing
///
/// Unconfigured metrics answer with a small payload naming the metric and the
/// requested range, so tests can tell which cycle produced a value.
#[derive(Debug, Default)]
pub struct MockAnalyticsSource {
    /// Canned payloads
    responses: Mutex<HashMap<Metric, Value>>,

    /// Metrics that answer with an error status
    failures: Mutex<HashMap<Metric, StatusCode>>,

    /// Mock processing delay
    delay_ms: u64,

    /// Every call made, in order
    calls: Mutex<Vec<(Metric, DateRange)>>,
}

impl MockAnalyticsSource {
    /// Create a new mock source
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `metric` with `payload`
    #[must_use]
    pub fn with_response(self, metric: Metric, payload: Value) -> Self {
        self.set_response(metric, payload);
        self
    }

    /// Configure `metric` to fail with `status`
    #[must_use]
    pub fn with_failure(self, metric: Metric, status: StatusCode) -> Self {
        self.set_failure(metric, status);
        self
    }

    /// Set processing delay for testing
    #[must_use]
    pub const fn with_delay(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Replace the payload for `metric`
    pub fn set_response(&self, metric: Metric, payload: Value) {
        self.responses.lock().insert(metric, payload);
    }

    /// Make `metric` fail with `status` from now on
    pub fn set_failure(&self, metric: Metric, status: StatusCode) {
        self.failures.lock().insert(metric, status);
    }

    /// Let `metric` succeed again
    pub fn clear_failure(&self, metric: Metric) {
        self.failures.lock().remove(&metric);
    }

    /// Total number of calls made
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Number of calls made for `metric`
    pub fn calls_for(&self, metric: Metric) -> usize {
        self.calls.lock().iter().filter(|(m, _)| *m == metric).count()
    }

    /// Every call made, in order
    pub fn calls(&self) -> Vec<(Metric, DateRange)> {
        self.calls.lock().clone()
    }

    /// Forget recorded calls
    pub fn reset_calls(&self) {
        self.calls.lock().clear();
    }
}

#[async_trait]
impl AnalyticsSource for MockAnalyticsSource {
    async fn fetch(&self, metric: Metric, range: &DateRange) -> AnalyticsResult<Value> {
        self.calls.lock().push((metric, *range));

        if self.delay_ms > 0 {
            sleep(Duration::from_millis(self.delay_ms)).await;
        }

        if let Some(status) = self.failures.lock().get(&metric) {
            return Err(AnalyticsError::status(*status));
        }

        let canned = self.responses.lock().get(&metric).cloned();
        Ok(canned.unwrap_or_else(|| {
            json!({
                "metric": metric.endpoint(),
                "from_date": range.from.to_string(),
                "to_date": range.to.to_string(),
            })
        }))
    }

    fn name(&self) -> &str {
        "mock"
    }
}
