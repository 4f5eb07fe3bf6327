//! Analytics fetch-and-cache orchestration for the `fmdash` dashboard
//!
//! Turns a selection of `(module, endpoint)` cards and a date range into the
//! smallest set of backend requests, runs them concurrently, and publishes the
//! merged data, errors, cache keys and loading flags. Results are cached per
//! date range; failures are not retried until the range changes.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::too_many_lines,
    clippy::match_same_arms
)]

pub mod client;
pub mod dashboard;
pub mod dispatch;
pub mod error;
pub mod layout;
pub mod mock;
pub mod notify;
pub mod orchestrator;
pub mod source;
pub mod state;

pub use client::ApiClient;
pub use dashboard::Dashboard;
pub use dispatch::{Metric, Route};
pub use error::{AnalyticsError, AnalyticsResult};
pub use notify::{LogNotifier, Notification, NotificationKind, Notifier, RecordingNotifier};
pub use orchestrator::{
    AnalyticsOrchestrator, CycleOutcome, CyclePlan, CycleReport, Disposition, Settlement,
};
pub use source::{AnalyticsSource, HttpAnalyticsSource, SITE_ID_KEY};
pub use state::{DashboardSnapshot, DashboardState};
