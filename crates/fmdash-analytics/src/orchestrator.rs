//! Analytics refresh orchestration
//!
//! A refresh cycle is split into three steps so overlapping cycles can be
//! driven without holding the state across an await point:
//!
//! 1. [`AnalyticsOrchestrator::plan`] decides, per descriptor, whether the
//!    cached value can be reused, a known failure must not be retried, the
//!    backend must be called, or the pair is unknown and resolves to nothing.
//! 2. [`AnalyticsOrchestrator::execute`] runs every network call of the plan
//!    concurrently.
//! 3. [`AnalyticsOrchestrator::apply`] merges the outcome into the published
//!    state, raises notifications and clears loading flags.
//!
//! [`AnalyticsOrchestrator::refresh`] runs all three back to back.

use futures::future::join_all;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::dispatch::Metric;
use crate::notify::Notifier;
use crate::source::AnalyticsSource;
use crate::state::DashboardState;
use fmdash_core::{AnalyticDescriptor, DateRange, DateRangeKey, Module};

/// Message recorded when a planned fetch produced no result
pub const MISSING_RESULT_MESSAGE: &str = "No result returned from API";

/// Notification raised once per cycle that reached the network
pub const SUCCESS_MESSAGE: &str = "Dashboard data updated successfully";

/// What a cycle does with one descriptor
#[derive(Debug, Clone, PartialEq)]
pub enum Disposition {
    /// Data for this range is already published
    CacheHit(Value),
    /// This range already failed; wait for a new range before retrying
    Suppressed,
    /// Call the backend
    Fetch(Metric),
    /// Pair is not in the dispatch table; resolves to null without a call
    Inert,
}

/// One descriptor and its disposition
#[derive(Debug, Clone)]
pub struct PlannedFetch {
    /// Descriptor being resolved
    pub descriptor: AnalyticDescriptor,
    /// What the cycle does with it
    pub disposition: Disposition,
}

/// Result of planning a cycle
#[derive(Debug, Clone)]
pub struct CyclePlan {
    cycle: u64,
    range: DateRange,
    date_key: DateRangeKey,
    groups: IndexMap<Module, Vec<PlannedFetch>>,
}

impl CyclePlan {
    /// Sequence number of the cycle
    pub const fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Range key the cycle resolves
    pub const fn date_key(&self) -> &DateRangeKey {
        &self.date_key
    }

    /// Planned descriptors grouped by module, in first-appearance order
    pub const fn groups(&self) -> &IndexMap<Module, Vec<PlannedFetch>> {
        &self.groups
    }

    /// Planned descriptors in dispatch order
    pub fn entries(&self) -> impl Iterator<Item = &PlannedFetch> {
        self.groups.values().flatten()
    }

    /// Number of network calls the cycle will make
    pub fn fetch_count(&self) -> usize {
        self.calls().len()
    }

    /// One call per `(module, endpoint)`, however many descriptors share it
    fn calls(&self) -> Vec<((Module, String), Metric)> {
        let mut seen = HashSet::new();
        self.entries()
            .filter_map(|planned| match planned.disposition {
                Disposition::Fetch(metric) => Some((
                    (planned.descriptor.module, planned.descriptor.endpoint.clone()),
                    metric,
                )),
                _ => None,
            })
            .filter(|(pair, _)| seen.insert(pair.clone()))
            .collect()
    }

    fn fetching(&self) -> Vec<(Module, String)> {
        self.calls().into_iter().map(|(pair, _)| pair).collect()
    }
}

/// How one descriptor settled
#[derive(Debug, Clone, PartialEq)]
pub enum Settlement {
    /// Fetched successfully
    Fresh(Value),
    /// Reused the published value
    Cached(Value),
    /// Skipped because the range already failed
    Suppressed,
    /// Fetch failed with the given message
    Failed(String),
    /// Unknown pair, resolved to null
    Inert,
}

/// Result of executing a plan, ready to be applied
#[derive(Debug, Clone)]
pub struct CycleOutcome {
    cycle: u64,
    date_key: DateRangeKey,
    settled: Vec<(AnalyticDescriptor, Settlement)>,
    fetched: Vec<(Module, String)>,
}

impl CycleOutcome {
    /// Sequence number of the cycle
    pub const fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Settlements in dispatch order
    pub fn settlements(&self) -> &[(AnalyticDescriptor, Settlement)] {
        &self.settled
    }
}

/// Summary of an applied cycle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleReport {
    /// Sequence number of the cycle
    pub cycle: u64,
    /// Range key the cycle resolved
    pub date_key: String,
    /// Descriptors settled from a successful network call
    pub fetched: usize,
    /// Descriptors served from the published state
    pub cached: usize,
    /// Descriptors skipped because their range already failed
    pub suppressed: usize,
    /// Descriptors settled from a failed network call
    pub failed: usize,
    /// Descriptors not in the dispatch table
    pub inert: usize,
    /// Results dropped because a newer cycle already wrote the endpoint, or
    /// failures dropped because data for the same range is already published
    pub stale: usize,
}

/// Fetch-and-cache orchestrator for dashboard analytics
pub struct AnalyticsOrchestrator<S> {
    source: S,
    notifier: Arc<dyn Notifier>,
    state: DashboardState,
    next_cycle: u64,
}

impl<S> std::fmt::Debug for AnalyticsOrchestrator<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyticsOrchestrator")
            .field("state", &self.state)
            .field("next_cycle", &self.next_cycle)
            .finish_non_exhaustive()
    }
}

impl<S: AnalyticsSource> AnalyticsOrchestrator<S> {
    /// Create an orchestrator with empty state
    pub fn new(source: S, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            source,
            notifier,
            state: DashboardState::new(),
            next_cycle: 0,
        }
    }

    /// Published state
    pub const fn state(&self) -> &DashboardState {
        &self.state
    }

    /// Source used for network calls
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Drop cached entries for an endpoint so it is fetched again
    pub fn forget(&mut self, module: Module, endpoint: &str) {
        debug!(module = %module, endpoint, "forgetting cached analytics");
        self.state.forget(module, endpoint);
    }

    /// Plan a cycle and mark its network calls as loading
    ///
    /// Descriptors sharing an id with an earlier one in `selection` are skipped.
    /// Descriptors sharing a `(module, endpoint)` share one network call.
    pub fn plan(&mut self, selection: &[AnalyticDescriptor], range: &DateRange) -> CyclePlan {
        self.next_cycle += 1;
        let cycle = self.next_cycle;
        let date_key = range.key();

        let mut seen = HashSet::new();
        let mut groups: IndexMap<Module, Vec<PlannedFetch>> = IndexMap::new();
        for descriptor in selection {
            if !seen.insert(descriptor.id.as_str()) {
                warn!(cycle, id = %descriptor.id, "duplicate descriptor id in selection, skipping");
                continue;
            }
            let disposition = self.dispose(descriptor, &date_key);
            groups.entry(descriptor.module).or_default().push(PlannedFetch {
                descriptor: descriptor.clone(),
                disposition,
            });
        }

        let plan = CyclePlan {
            cycle,
            range: *range,
            date_key,
            groups,
        };
        self.state.begin_cycle(&plan.fetching());

        info!(
            cycle,
            date_key = %plan.date_key,
            modules = plan.groups.len(),
            fetches = plan.fetch_count(),
            "planned analytics refresh"
        );
        plan
    }

    fn dispose(&self, descriptor: &AnalyticDescriptor, date_key: &DateRangeKey) -> Disposition {
        let (module, endpoint) = (descriptor.module, descriptor.endpoint.as_str());

        if let Some(value) = self.state.cached(module, endpoint, date_key) {
            return Disposition::CacheHit(value.clone());
        }
        if self.state.is_suppressed(module, endpoint, date_key) {
            return Disposition::Suppressed;
        }
        match Metric::parse(module, endpoint) {
            Some(metric) => Disposition::Fetch(metric),
            None => Disposition::Inert,
        }
    }

    /// Run every network call of `plan` concurrently
    #[instrument(skip_all, fields(cycle = plan.cycle, date_key = %plan.date_key))]
    pub async fn execute(&self, plan: CyclePlan) -> CycleOutcome {
        let range = plan.range;
        let calls = plan.calls();
        let fetched: Vec<(Module, String)> = calls.iter().map(|(pair, _)| pair.clone()).collect();

        let futures = calls.into_iter().map(|(pair, metric)| async move {
            metrics::counter!("fmdash_fetch_total", "module" => metric.module().as_str())
                .increment(1);
            debug!(module = %pair.0, endpoint = %pair.1, source = self.source.name(), "fetching");
            let result = self
                .source
                .fetch(metric, &range)
                .await
                .map_err(|e| e.to_string());
            (pair, result)
        });
        let results: HashMap<(Module, String), Result<Value, String>> =
            join_all(futures).await.into_iter().collect();

        let settled = plan
            .groups
            .into_values()
            .flatten()
            .map(|planned| {
                let settlement = match planned.disposition {
                    Disposition::CacheHit(value) => Settlement::Cached(value),
                    Disposition::Suppressed => Settlement::Suppressed,
                    Disposition::Inert => Settlement::Inert,
                    Disposition::Fetch(_) => {
                        let pair = (planned.descriptor.module, planned.descriptor.endpoint.clone());
                        match results.get(&pair) {
                            Some(Ok(value)) => Settlement::Fresh(value.clone()),
                            Some(Err(message)) => Settlement::Failed(message.clone()),
                            None => Settlement::Failed(MISSING_RESULT_MESSAGE.to_string()),
                        }
                    }
                };
                (planned.descriptor, settlement)
            })
            .collect();

        CycleOutcome {
            cycle: plan.cycle,
            date_key: plan.date_key,
            settled,
            fetched,
        }
    }

    /// Merge an executed cycle into the published state
    ///
    /// Endpoints already written by a newer cycle keep their newer values, and a
    /// failure never replaces data already published for the same range.
    pub fn apply(&mut self, outcome: CycleOutcome) -> CycleReport {
        let CycleOutcome {
            cycle,
            date_key,
            settled,
            fetched,
        } = outcome;

        let mut report = CycleReport {
            cycle,
            date_key: date_key.to_string(),
            ..CycleReport::default()
        };

        for (descriptor, settlement) in settled {
            let (module, endpoint) = (descriptor.module, descriptor.endpoint.as_str());

            if self.state.is_stale(module, endpoint, cycle) {
                debug!(cycle, module = %module, endpoint, "dropping result superseded by a newer cycle");
                report.stale += 1;
                continue;
            }

            match settlement {
                Settlement::Fresh(value) => {
                    self.state.record_success(module, endpoint, &date_key, value, cycle);
                    report.fetched += 1;
                }
                Settlement::Cached(_) => {
                    metrics::counter!("fmdash_cache_hits_total", "module" => module.as_str())
                        .increment(1);
                    debug!(cycle, module = %module, endpoint, date_key = %date_key, "cache hit");
                    report.cached += 1;
                }
                Settlement::Suppressed => {
                    self.state.record_suppressed(module, endpoint, &date_key);
                    debug!(cycle, module = %module, endpoint, date_key = %date_key, "skipping range that already failed");
                    report.suppressed += 1;
                }
                Settlement::Failed(_) if self.state.cached(module, endpoint, &date_key).is_some() => {
                    debug!(cycle, module = %module, endpoint, date_key = %date_key, "keeping data another cycle fetched for this range");
                    report.stale += 1;
                }
                Settlement::Failed(message) => {
                    metrics::counter!("fmdash_fetch_failures_total", "module" => module.as_str())
                        .increment(1);
                    warn!(cycle, module = %module, endpoint, date_key = %date_key, error = %message, "analytics fetch failed");
                    self.state
                        .record_failure(module, endpoint, &date_key, message, cycle);
                    self.notifier
                        .error(format!("Failed to fetch {}", descriptor.title));
                    report.failed += 1;
                }
                Settlement::Inert => {
                    debug!(cycle, module = %module, endpoint, "no route for analytic, publishing null");
                    self.state.record_inert(module, endpoint, cycle);
                    report.inert += 1;
                }
            }
        }

        self.state.end_cycle(&fetched);

        if !fetched.is_empty() {
            self.notifier.success(SUCCESS_MESSAGE.to_string());
        }

        info!(
            cycle,
            date_key = %date_key,
            fetched = report.fetched,
            cached = report.cached,
            failed = report.failed,
            stale = report.stale,
            "applied analytics refresh"
        );
        report
    }

    /// Plan, execute and apply one cycle
    pub async fn refresh(
        &mut self,
        selection: &[AnalyticDescriptor],
        range: &DateRange,
    ) -> CycleReport {
        let plan = self.plan(selection, range);
        let outcome = self.execute(plan).await;
        self.apply(outcome)
    }
}
