//! Analytics sources
//!
//! [`AnalyticsSource`] is the seam between the orchestrator and the network:
//! one call fetches one metric for one date range.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::client::ApiClient;
use crate::dispatch::Metric;
use crate::error::{AnalyticsError, AnalyticsResult};
use fmdash_core::{DateRange, KeyValueStore};

/// Store key holding the site the dashboard is scoped to
pub const SITE_ID_KEY: &str = "selectedSiteId";

/// Something that can fetch a metric's raw payload
#[async_trait]
pub trait AnalyticsSource: Send + Sync {
    /// Fetch `metric` for `range`
    async fn fetch(&self, metric: Metric, range: &DateRange) -> AnalyticsResult<Value>;

    /// Source name, for logs
    fn name(&self) -> &str;
}

#[async_trait]
impl<S: AnalyticsSource + ?Sized> AnalyticsSource for Arc<S> {
    async fn fetch(&self, metric: Metric, range: &DateRange) -> AnalyticsResult<Value> {
        (**self).fetch(metric, range).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Source backed by the facility-management REST API
#[derive(Debug, Clone)]
pub struct HttpAnalyticsSource {
    client: ApiClient,
    store: Arc<dyn KeyValueStore>,
    default_site_id: Option<String>,
}

impl HttpAnalyticsSource {
    /// Create a source
    ///
    /// The site is read from `store` under [`SITE_ID_KEY`] on every request,
    /// falling back to `default_site_id`.
    pub fn new(
        client: ApiClient,
        store: Arc<dyn KeyValueStore>,
        default_site_id: Option<String>,
    ) -> Self {
        Self {
            client,
            store,
            default_site_id,
        }
    }

    fn site_id(&self) -> Option<String> {
        self.store
            .get(SITE_ID_KEY)
            .filter(|id| !id.is_empty())
            .or_else(|| self.default_site_id.clone())
    }
}

#[async_trait]
impl AnalyticsSource for HttpAnalyticsSource {
    async fn fetch(&self, metric: Metric, range: &DateRange) -> AnalyticsResult<Value> {
        let route = metric.route();

        let mut query = Vec::with_capacity(4);
        match self.site_id() {
            Some(site_id) => query.push(("site_id", site_id)),
            None => warn!(endpoint = metric.endpoint(), "no site selected, requesting without site_id"),
        }
        query.extend(route.query(range));

        let body = self.client.get_json(route.path, &query).await?;

        match route.extract {
            Some(pointer) => {
                debug!(endpoint = metric.endpoint(), pointer, "extracting response section");
                body.pointer(pointer)
                    .cloned()
                    .ok_or_else(|| AnalyticsError::missing_field(pointer))
            }
            None => Ok(body),
        }
    }

    fn name(&self) -> &str {
        "http"
    }
}
