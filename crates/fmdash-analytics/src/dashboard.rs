//! Dashboard controller
//!
//! Owns the user's selection, the date range, the grid layout and the card
//! order, persists them through a [`KeyValueStore`], and triggers a refresh
//! whenever the selection or the range changes.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::AnalyticsResult;
use crate::layout;
use crate::orchestrator::{AnalyticsOrchestrator, CycleReport};
use crate::source::AnalyticsSource;
use crate::state::DashboardState;
use fmdash_core::{
    AnalyticDescriptor, DashboardVariant, DateRange, KeyValueStore, KeyValueStoreExt, LayoutItem,
};

/// One dashboard page
#[derive(Debug)]
pub struct Dashboard<S> {
    variant: DashboardVariant,
    store: Arc<dyn KeyValueStore>,
    orchestrator: AnalyticsOrchestrator<S>,
    selection: Vec<AnalyticDescriptor>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    layouts: Vec<LayoutItem>,
    chart_order: Vec<String>,
}

impl<S: AnalyticsSource> Dashboard<S> {
    /// Create a dashboard showing the year up to `today`
    pub fn new(
        variant: DashboardVariant,
        store: Arc<dyn KeyValueStore>,
        orchestrator: AnalyticsOrchestrator<S>,
        today: NaiveDate,
    ) -> Self {
        let range = DateRange::last_year(today);
        Self {
            variant,
            store,
            orchestrator,
            selection: Vec::new(),
            from: Some(range.from),
            to: Some(range.to),
            layouts: Vec::new(),
            chart_order: Vec::new(),
        }
    }

    /// Restore the persisted layout and selection
    ///
    /// Blobs that do not parse are logged and ignored. No refresh is run.
    pub fn load(&mut self) {
        if let Some(layouts) = self.read_blob::<Vec<LayoutItem>>(&self.variant.layout_key()) {
            self.layouts = layouts;
        }
        if let Some(selection) = self.read_blob::<Vec<AnalyticDescriptor>>(&self.variant.selection_key()) {
            self.selection = selection;
        }
        self.chart_order = self.selection.iter().map(|a| a.id.clone()).collect();

        info!(
            variant = self.variant.storage_prefix(),
            cards = self.selection.len(),
            layouts = self.layouts.len(),
            "dashboard restored"
        );
    }

    fn read_blob<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.store.get_json(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "ignoring unreadable dashboard blob");
                None
            }
        }
    }

    /// Replace the selection
    ///
    /// Cached results of removed cards are dropped, so adding them back fetches
    /// them again. Returns the report of the refresh, if one ran.
    ///
    /// # Errors
    ///
    /// Returns an error if the selection or layout cannot be persisted. The
    /// dashboard and the stored selection are left unchanged in that case.
    pub async fn set_selection(
        &mut self,
        selection: Vec<AnalyticDescriptor>,
    ) -> AnalyticsResult<Option<CycleReport>> {
        let selection_key = self.variant.selection_key();
        self.store.set_json(&selection_key, &selection)?;

        let layouts = layout::arrange(&selection, &self.layouts);
        if let Err(e) = self.store.set_json(&self.variant.layout_key(), &layouts) {
            if let Err(restore) = self.store.set_json(&selection_key, &self.selection) {
                warn!(key = %selection_key, error = %restore, "failed to restore previous selection");
            }
            return Err(e.into());
        }

        let kept: HashSet<&str> = selection.iter().map(|a| a.id.as_str()).collect();
        for removed in self.selection.iter().filter(|a| !kept.contains(a.id.as_str())) {
            let shared = selection
                .iter()
                .any(|a| a.module == removed.module && a.endpoint == removed.endpoint);
            if !shared {
                self.orchestrator.forget(removed.module, &removed.endpoint);
            }
        }

        self.chart_order = selection.iter().map(|a| a.id.clone()).collect();
        self.layouts = layouts;
        self.selection = selection;

        Ok(self.refresh().await)
    }

    /// Append `descriptor` unless a card with the same id is already selected
    ///
    /// # Errors
    ///
    /// Returns an error if the selection cannot be persisted.
    pub async fn add(&mut self, descriptor: AnalyticDescriptor) -> AnalyticsResult<Option<CycleReport>> {
        if self.selection.iter().any(|a| a.id == descriptor.id) {
            debug!(id = %descriptor.id, "card already selected");
            return Ok(None);
        }
        let mut selection = self.selection.clone();
        selection.push(descriptor);
        self.set_selection(selection).await
    }

    /// Remove the card with `id`
    ///
    /// Returns `Ok(None)` without touching the store when no such card exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the selection cannot be persisted.
    pub async fn remove(&mut self, id: &str) -> AnalyticsResult<Option<CycleReport>> {
        if !self.selection.iter().any(|a| a.id == id) {
            debug!(id, "card not selected");
            return Ok(None);
        }
        let selection = self
            .selection
            .iter()
            .filter(|a| a.id != id)
            .cloned()
            .collect();
        self.set_selection(selection).await
    }

    /// Change the date range; either end may be unset
    ///
    /// Returns the report of the refresh, if one ran.
    pub async fn set_date_range(
        &mut self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Option<CycleReport> {
        self.from = from;
        self.to = to;
        self.refresh().await
    }

    /// Run a cycle when the selection is non-empty and both range ends are set
    pub async fn refresh(&mut self) -> Option<CycleReport> {
        let Some(range) = self.date_range() else {
            debug!("date range incomplete, not refreshing");
            return None;
        };
        if self.selection.is_empty() {
            debug!("nothing selected, not refreshing");
            return None;
        }
        Some(self.orchestrator.refresh(&self.selection, &range).await)
    }

    /// Replace and persist the grid layout
    ///
    /// # Errors
    ///
    /// Returns an error if the layout or selection cannot be persisted.
    pub fn update_layout(&mut self, layouts: Vec<LayoutItem>) -> AnalyticsResult<()> {
        self.store.set_json(&self.variant.layout_key(), &layouts)?;
        self.store
            .set_json(&self.variant.selection_key(), &self.selection)?;
        self.layouts = layouts;
        Ok(())
    }

    /// Move card `active` to the position of card `over`
    pub fn move_card(&mut self, active: &str, over: &str) {
        if !layout::move_item(&mut self.chart_order, active, over) {
            debug!(active, over, "ignoring move of unknown card");
        }
    }

    /// Selected range, when both ends are set
    pub fn date_range(&self) -> Option<DateRange> {
        Some(DateRange::new(self.from?, self.to?))
    }

    /// Dashboard variant
    pub const fn variant(&self) -> DashboardVariant {
        self.variant
    }

    /// Selected cards
    pub fn selection(&self) -> &[AnalyticDescriptor] {
        &self.selection
    }

    /// Grid layout
    pub fn layouts(&self) -> &[LayoutItem] {
        &self.layouts
    }

    /// Card ids in display order
    pub fn chart_order(&self) -> &[String] {
        &self.chart_order
    }

    /// Published analytics state
    pub const fn state(&self) -> &DashboardState {
        self.orchestrator.state()
    }

    /// Orchestrator driving refreshes
    pub const fn orchestrator(&self) -> &AnalyticsOrchestrator<S> {
        &self.orchestrator
    }
}
