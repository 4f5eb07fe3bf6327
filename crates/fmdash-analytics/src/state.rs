//! Published dashboard state
//!
//! Everything here is keyed by module, then by endpoint name. Entries are only
//! ever written for the endpoints a cycle touched, so merging a cycle into the
//! state never disturbs other metrics.

use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

use fmdash_core::{DateRangeKey, Module};

/// Endpoint name to value
pub type EndpointMap<T> = BTreeMap<String, T>;

/// Module to per-endpoint values
pub type ModuleMap<T> = BTreeMap<Module, EndpointMap<T>>;

fn lookup<'a, T>(map: &'a ModuleMap<T>, module: Module, endpoint: &str) -> Option<&'a T> {
    map.get(&module).and_then(|endpoints| endpoints.get(endpoint))
}

fn insert<T>(map: &mut ModuleMap<T>, module: Module, endpoint: &str, value: T) {
    map.entry(module)
        .or_default()
        .insert(endpoint.to_string(), value);
}

fn remove<T>(map: &mut ModuleMap<T>, module: Module, endpoint: &str) -> Option<T> {
    let endpoints = map.get_mut(&module)?;
    let removed = endpoints.remove(endpoint);
    if endpoints.is_empty() {
        map.remove(&module);
    }
    removed
}

/// Data, errors, cache keys and loading flags for every selected metric
#[derive(Debug, Default)]
pub struct DashboardState {
    data: ModuleMap<Value>,
    errors: ModuleMap<Option<String>>,
    last_fetched: ModuleMap<DateRangeKey>,
    last_failed: ModuleMap<DateRangeKey>,
    in_flight: ModuleMap<u32>,
    cycles_in_flight: u32,
    written_by: HashMap<(Module, String), u64>,
}

impl DashboardState {
    /// Create an empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Last published payload; `Some(Value::Null)` after a failure or for inert metrics
    pub fn data(&self, module: Module, endpoint: &str) -> Option<&Value> {
        lookup(&self.data, module, endpoint)
    }

    /// Last error message, if the latest attempt failed
    pub fn error(&self, module: Module, endpoint: &str) -> Option<&str> {
        lookup(&self.errors, module, endpoint).and_then(Option::as_deref)
    }

    /// Range key the published data is valid for
    pub fn last_fetched_key(&self, module: Module, endpoint: &str) -> Option<&DateRangeKey> {
        lookup(&self.last_fetched, module, endpoint)
    }

    /// Range key the recorded failure is valid for
    pub fn last_failed_key(&self, module: Module, endpoint: &str) -> Option<&DateRangeKey> {
        lookup(&self.last_failed, module, endpoint)
    }

    /// Whether a network call for this endpoint is outstanding
    pub fn is_loading(&self, module: Module, endpoint: &str) -> bool {
        lookup(&self.in_flight, module, endpoint).is_some_and(|count| *count > 0)
    }

    /// Whether any cycle with network calls is outstanding
    pub const fn is_any_loading(&self) -> bool {
        self.cycles_in_flight > 0
    }

    /// Cached payload for `key`, if one exists and is not null
    pub fn cached(&self, module: Module, endpoint: &str, key: &DateRangeKey) -> Option<&Value> {
        if self.last_fetched_key(module, endpoint) != Some(key) {
            return None;
        }
        self.data(module, endpoint).filter(|value| !value.is_null())
    }

    /// Whether the endpoint already failed for `key` and must not be retried
    pub fn is_suppressed(&self, module: Module, endpoint: &str, key: &DateRangeKey) -> bool {
        self.last_failed_key(module, endpoint) == Some(key) && self.error(module, endpoint).is_some()
    }

    /// Whether a cycle newer than `cycle` already wrote this endpoint
    pub fn is_stale(&self, module: Module, endpoint: &str, cycle: u64) -> bool {
        self.written_by
            .get(&(module, endpoint.to_string()))
            .is_some_and(|written| *written > cycle)
    }

    pub(crate) fn begin_cycle(&mut self, fetching: &[(Module, String)]) {
        if fetching.is_empty() {
            return;
        }
        self.cycles_in_flight += 1;
        for (module, endpoint) in fetching {
            let count = self
                .in_flight
                .entry(*module)
                .or_default()
                .entry(endpoint.clone())
                .or_default();
            *count += 1;
        }
    }

    pub(crate) fn end_cycle(&mut self, fetched: &[(Module, String)]) {
        if fetched.is_empty() {
            return;
        }
        self.cycles_in_flight = self.cycles_in_flight.saturating_sub(1);
        for (module, endpoint) in fetched {
            if let Some(count) = self
                .in_flight
                .get_mut(module)
                .and_then(|endpoints| endpoints.get_mut(endpoint))
            {
                *count = count.saturating_sub(1);
            }
        }
    }

    pub(crate) fn record_success(
        &mut self,
        module: Module,
        endpoint: &str,
        key: &DateRangeKey,
        value: Value,
        cycle: u64,
    ) {
        insert(&mut self.data, module, endpoint, value);
        insert(&mut self.errors, module, endpoint, None);
        insert(&mut self.last_fetched, module, endpoint, key.clone());
        remove(&mut self.last_failed, module, endpoint);
        self.mark_written(module, endpoint, cycle);
    }

    pub(crate) fn record_failure(
        &mut self,
        module: Module,
        endpoint: &str,
        key: &DateRangeKey,
        message: String,
        cycle: u64,
    ) {
        if self.last_fetched_key(module, endpoint) == Some(key) {
            remove(&mut self.last_fetched, module, endpoint);
        }
        insert(&mut self.data, module, endpoint, Value::Null);
        insert(&mut self.errors, module, endpoint, Some(message));
        insert(&mut self.last_failed, module, endpoint, key.clone());
        self.mark_written(module, endpoint, cycle);
    }

    pub(crate) fn record_suppressed(&mut self, module: Module, endpoint: &str, key: &DateRangeKey) {
        insert(&mut self.last_failed, module, endpoint, key.clone());
    }

    pub(crate) fn record_inert(&mut self, module: Module, endpoint: &str, cycle: u64) {
        insert(&mut self.data, module, endpoint, Value::Null);
        insert(&mut self.errors, module, endpoint, None);
        self.mark_written(module, endpoint, cycle);
    }

    /// Drop everything known about an endpoint so the next cycle fetches it again
    pub fn forget(&mut self, module: Module, endpoint: &str) {
        remove(&mut self.data, module, endpoint);
        remove(&mut self.errors, module, endpoint);
        remove(&mut self.last_fetched, module, endpoint);
        remove(&mut self.last_failed, module, endpoint);
    }

    fn mark_written(&mut self, module: Module, endpoint: &str, cycle: u64) {
        self.written_by.insert((module, endpoint.to_string()), cycle);
    }

    /// Serializable copy of the published maps
    pub fn snapshot(&self) -> DashboardSnapshot {
        let loading_map = self
            .in_flight
            .iter()
            .map(|(module, endpoints)| {
                let flags = endpoints
                    .iter()
                    .map(|(endpoint, count)| (endpoint.clone(), *count > 0))
                    .collect();
                (*module, flags)
            })
            .collect();

        DashboardSnapshot {
            data: self.data.clone(),
            errors: self.errors.clone(),
            last_fetched_key: self.last_fetched.clone(),
            last_failed_key: self.last_failed.clone(),
            loading_map,
            loading: self.is_any_loading(),
        }
    }
}

/// Point-in-time copy of the dashboard state handed to renderers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    /// Payload per module and endpoint
    pub data: ModuleMap<Value>,
    /// Error message per module and endpoint
    pub errors: ModuleMap<Option<String>>,
    /// Range key of the published data
    pub last_fetched_key: ModuleMap<DateRangeKey>,
    /// Range key of the recorded failure
    pub last_failed_key: ModuleMap<DateRangeKey>,
    /// Outstanding network calls
    pub loading_map: ModuleMap<bool>,
    /// Whether any network call is outstanding
    pub loading: bool,
}
