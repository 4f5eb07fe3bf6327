//! Integration tests for the refresh cycle

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

mod common;

use common::*;
use fmdash_analytics::{Metric, Settlement};
use fmdash_analytics::mock::MockAnalyticsSource;
use fmdash_core::{AnalyticDescriptor, Module};
use pretty_assertions::assert_eq;
use reqwest::StatusCode;
use serde_json::{Value, json};

#[tokio::test]
async fn test_single_metric_is_published_under_module_and_endpoint() {
    let mut h = TestHarness::with_source(
        MockAnalyticsSource::new().with_response(Metric::AmcStatusOverview, json!({"active": 12})),
    );
    let selection = vec![card(Module::Amc, "status_overview")];

    let report = h.orchestrator.refresh(&selection, &january()).await;

    assert_eq!(report.fetched, 1);
    assert_eq!(h.source.call_count(), 1);
    let state = h.orchestrator.state();
    assert_eq!(state.data(Module::Amc, "status_overview"), Some(&json!({"active": 12})));
    assert_eq!(state.error(Module::Amc, "status_overview"), None);
    assert_eq!(
        state.last_fetched_key(Module::Amc, "status_overview").unwrap().as_str(),
        "2024-01-01_2024-01-31"
    );
    assert!(!state.is_any_loading());
    assert_eq!(h.notifier.successes(), vec!["Dashboard data updated successfully"]);
}

#[tokio::test]
async fn test_same_range_twice_makes_no_new_calls() {
    let mut h = TestHarness::new();
    let selection = vec![
        card(Module::Amc, "status_overview"),
        card(Module::Amc, "service_stats"),
        card(Module::Tickets, "ticket_status"),
    ];

    h.orchestrator.refresh(&selection, &january()).await;
    let first = h.orchestrator.state().snapshot();
    assert_eq!(h.source.call_count(), 3);

    let report = h.orchestrator.refresh(&selection, &january()).await;

    assert_eq!(h.source.call_count(), 3);
    assert_eq!(report.cached, 3);
    assert_eq!(report.fetched, 0);
    assert_eq!(h.orchestrator.state().snapshot(), first);
    // Only the cycle that reached the network announces an update.
    assert_eq!(h.notifier.successes().len(), 1);
}

#[tokio::test]
async fn test_new_range_refetches_every_card_once() {
    let mut h = TestHarness::new();
    let selection = vec![
        card(Module::Amc, "status_overview"),
        card(Module::Tickets, "ticket_status"),
    ];

    h.orchestrator.refresh(&selection, &january()).await;
    h.source.reset_calls();

    let report = h.orchestrator.refresh(&selection, &february()).await;

    assert_eq!(report.fetched, 2);
    assert_eq!(h.source.calls_for(Metric::AmcStatusOverview), 1);
    assert_eq!(h.source.calls_for(Metric::TicketStatus), 1);
    assert!(h.source.calls().iter().all(|(_, range)| *range == february()));
    assert_eq!(
        h.orchestrator.state().data(Module::Tickets, "ticket_status").unwrap()["from_date"],
        "2024-02-01"
    );
}

#[tokio::test]
async fn test_failure_is_contained_and_not_retried_for_the_same_range() {
    let mut h = TestHarness::with_source(
        MockAnalyticsSource::new()
            .with_failure(Metric::AmcStatusOverview, StatusCode::INTERNAL_SERVER_ERROR),
    );
    let selection = vec![
        card(Module::Amc, "status_overview"),
        card(Module::Amc, "service_stats"),
    ];

    let report = h.orchestrator.refresh(&selection, &january()).await;

    assert_eq!(report.failed, 1);
    assert_eq!(report.fetched, 1);
    let state = h.orchestrator.state();
    assert_eq!(state.data(Module::Amc, "status_overview"), Some(&Value::Null));
    assert!(state.error(Module::Amc, "status_overview").unwrap().contains("500"));
    assert!(state.data(Module::Amc, "service_stats").unwrap().is_object());
    assert_eq!(state.error(Module::Amc, "service_stats"), None);
    assert_eq!(h.notifier.errors(), vec!["Failed to fetch amc status_overview"]);

    let report = h.orchestrator.refresh(&selection, &january()).await;

    assert_eq!(h.source.call_count(), 2);
    assert_eq!(report.suppressed, 1);
    assert_eq!(report.cached, 1);
    assert!(h.orchestrator.state().error(Module::Amc, "status_overview").is_some());
    assert_eq!(h.notifier.errors().len(), 1);
}

#[tokio::test]
async fn test_failed_card_is_retried_when_the_range_changes() {
    let mut h = TestHarness::with_source(
        MockAnalyticsSource::new().with_failure(Metric::TicketStatus, StatusCode::BAD_GATEWAY),
    );
    let selection = vec![card(Module::Tickets, "ticket_status")];

    h.orchestrator.refresh(&selection, &january()).await;
    h.source.clear_failure(Metric::TicketStatus);

    let report = h.orchestrator.refresh(&selection, &february()).await;

    assert_eq!(report.fetched, 1);
    assert_eq!(h.source.calls_for(Metric::TicketStatus), 2);
    let state = h.orchestrator.state();
    assert_eq!(state.error(Module::Tickets, "ticket_status"), None);
    assert_eq!(state.last_failed_key(Module::Tickets, "ticket_status"), None);
}

#[tokio::test]
async fn test_forgotten_card_is_fetched_again() {
    let mut h = TestHarness::new();
    let selection = vec![card(Module::Amc, "status_overview")];

    h.orchestrator.refresh(&selection, &january()).await;
    h.orchestrator.forget(Module::Amc, "status_overview");
    h.orchestrator.refresh(&selection, &january()).await;

    assert_eq!(h.source.calls_for(Metric::AmcStatusOverview), 2);
}

#[tokio::test]
async fn test_unknown_pair_resolves_to_null_without_a_call() {
    let mut h = TestHarness::new();
    let selection = vec![card(Module::ParkingManagement, "not_a_metric")];

    let report = h.orchestrator.refresh(&selection, &january()).await;

    assert_eq!(report.inert, 1);
    assert_eq!(h.source.call_count(), 0);
    let state = h.orchestrator.state();
    assert_eq!(state.data(Module::ParkingManagement, "not_a_metric"), Some(&Value::Null));
    assert_eq!(state.error(Module::ParkingManagement, "not_a_metric"), None);
    assert!(!state.is_loading(Module::ParkingManagement, "not_a_metric"));
    assert!(h.notifier.notifications().is_empty());
}

#[tokio::test]
async fn test_alias_endpoint_is_stored_under_its_own_name() {
    let mut h = TestHarness::new();
    let selection = vec![card(Module::Tickets, "tickets_response_tat")];

    h.orchestrator.refresh(&selection, &january()).await;

    assert_eq!(h.source.calls_for(Metric::TicketsResponseTat), 1);
    assert!(h.orchestrator.state().data(Module::Tickets, "tickets_response_tat").is_some());
    assert!(h.orchestrator.state().data(Module::Tickets, "response_tat").is_none());
}

#[tokio::test]
async fn test_untouched_endpoints_survive_a_cycle() {
    let mut h = TestHarness::new();

    h.orchestrator
        .refresh(&[card(Module::Amc, "status_overview")], &january())
        .await;
    h.orchestrator
        .refresh(&[card(Module::Tickets, "ticket_status")], &january())
        .await;

    let state = h.orchestrator.state();
    assert!(state.data(Module::Amc, "status_overview").is_some());
    assert!(state.data(Module::Tickets, "ticket_status").is_some());
}

#[tokio::test]
async fn test_stale_cycle_does_not_overwrite_newer_results() {
    let mut h = TestHarness::new();
    let selection = vec![card(Module::Amc, "status_overview")];

    let older = h.orchestrator.plan(&selection, &january());
    let newer = h.orchestrator.plan(&selection, &february());
    assert!(h.orchestrator.state().is_loading(Module::Amc, "status_overview"));

    let (older, newer) =
        tokio::join!(h.orchestrator.execute(older), h.orchestrator.execute(newer));

    let newer_report = h.orchestrator.apply(newer);
    assert!(h.orchestrator.state().is_loading(Module::Amc, "status_overview"));
    let older_report = h.orchestrator.apply(older);

    assert_eq!(newer_report.fetched, 1);
    assert_eq!(older_report.stale, 1);
    let state = h.orchestrator.state();
    assert_eq!(
        state.last_fetched_key(Module::Amc, "status_overview").unwrap().as_str(),
        "2024-02-01_2024-02-29"
    );
    assert_eq!(
        state.data(Module::Amc, "status_overview").unwrap()["from_date"],
        "2024-02-01"
    );
    assert!(!state.is_loading(Module::Amc, "status_overview"));
    assert!(!state.is_any_loading());
}

#[tokio::test]
async fn test_failure_for_same_range_keeps_data_from_overlapping_cycle() {
    let mut h = TestHarness::with_source(
        MockAnalyticsSource::new().with_response(Metric::AmcStatusOverview, json!({"active": 3})),
    );
    let selection = vec![card(Module::Amc, "status_overview")];

    let older = h.orchestrator.plan(&selection, &january());
    let newer = h.orchestrator.plan(&selection, &january());

    let older = h.orchestrator.execute(older).await;
    h.source
        .set_failure(Metric::AmcStatusOverview, StatusCode::INTERNAL_SERVER_ERROR);
    let newer = h.orchestrator.execute(newer).await;

    let older_report = h.orchestrator.apply(older);
    let newer_report = h.orchestrator.apply(newer);

    assert_eq!(older_report.fetched, 1);
    assert_eq!(newer_report.failed, 0);
    assert_eq!(newer_report.stale, 1);
    let state = h.orchestrator.state();
    let key = january().key();
    assert_eq!(
        state.cached(Module::Amc, "status_overview", &key),
        Some(&json!({"active": 3}))
    );
    assert_eq!(state.error(Module::Amc, "status_overview"), None);
    assert_eq!(state.last_failed_key(Module::Amc, "status_overview"), None);
    assert!(h.notifier.errors().is_empty());
    assert!(!state.is_any_loading());
}

#[tokio::test]
async fn test_cards_sharing_an_endpoint_share_one_call() {
    let mut h = TestHarness::with_source(
        MockAnalyticsSource::new().with_response(Metric::AmcStatusOverview, json!({"active": 5})),
    );
    let selection = vec![
        AnalyticDescriptor::new("first", Module::Amc, "status_overview", "First"),
        AnalyticDescriptor::new("second", Module::Amc, "status_overview", "Second"),
    ];

    let report = h.orchestrator.refresh(&selection, &january()).await;

    assert_eq!(h.source.calls_for(Metric::AmcStatusOverview), 1);
    assert_eq!(report.fetched, 2);
    assert_eq!(
        h.orchestrator.state().data(Module::Amc, "status_overview"),
        Some(&json!({"active": 5}))
    );
    assert!(!h.orchestrator.state().is_loading(Module::Amc, "status_overview"));
    assert!(!h.orchestrator.state().is_any_loading());
}

#[tokio::test]
async fn test_cards_sharing_a_failing_endpoint_each_report_the_failure() {
    let mut h = TestHarness::with_source(
        MockAnalyticsSource::new().with_failure(Metric::TicketStatus, StatusCode::BAD_GATEWAY),
    );
    let selection = vec![
        AnalyticDescriptor::new("left", Module::Tickets, "ticket_status", "Left"),
        AnalyticDescriptor::new("right", Module::Tickets, "ticket_status", "Right"),
    ];

    let report = h.orchestrator.refresh(&selection, &january()).await;

    assert_eq!(h.source.call_count(), 1);
    assert_eq!(report.failed, 2);
    assert_eq!(
        h.notifier.errors(),
        vec!["Failed to fetch Left", "Failed to fetch Right"]
    );
}

#[tokio::test]
async fn test_execute_reports_settlements_in_dispatch_order() {
    let mut h = TestHarness::with_source(
        MockAnalyticsSource::new().with_failure(Metric::TicketStatus, StatusCode::NOT_FOUND),
    );
    let selection = vec![
        card(Module::Tickets, "ticket_status"),
        card(Module::Amc, "status_overview"),
        card(Module::Tickets, "made_up"),
    ];

    let plan = h.orchestrator.plan(&selection, &january());
    let outcome = h.orchestrator.execute(plan).await;
    let ids: Vec<&str> = outcome
        .settlements()
        .iter()
        .map(|(descriptor, _)| descriptor.id.as_str())
        .collect();

    assert_eq!(
        ids,
        vec!["tickets_ticket_status", "tickets_made_up", "amc_status_overview"]
    );
    assert!(matches!(outcome.settlements()[0].1, Settlement::Failed(_)));
    assert_eq!(outcome.settlements()[1].1, Settlement::Inert);
    assert!(matches!(outcome.settlements()[2].1, Settlement::Fresh(_)));

    h.orchestrator.apply(outcome);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_fetches_overlap() {
    let mut h = TestHarness::with_source(MockAnalyticsSource::new().with_delay(1_000));
    let selection = vec![
        card(Module::Amc, "status_overview"),
        card(Module::Amc, "service_stats"),
        card(Module::Tickets, "ticket_status"),
        card(Module::Inventory, "low_stock"),
    ];

    let started = tokio::time::Instant::now();
    let report = h.orchestrator.refresh(&selection, &january()).await;

    assert_eq!(report.fetched, 4);
    assert!(started.elapsed() < std::time::Duration::from_millis(2_000));
}
