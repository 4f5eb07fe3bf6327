//! Core data types for the analytics dashboard

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Date format used by date range keys and backend query parameters
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Top-level metric category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Module {
    /// Helpdesk tickets
    Tickets,
    /// Checklist tasks
    Tasks,
    /// Maintenance schedule
    Schedule,
    /// Inventory items
    Inventory,
    /// Annual maintenance contracts
    Amc,
    /// Asset register
    Assets,
    /// Meeting room bookings
    MeetingRoom,
    /// Community engagement
    Community,
    /// Helpdesk performance
    Helpdesk,
    /// Asset management overview
    AssetManagement,
    /// Inventory management overview
    InventoryManagement,
    /// Parking management
    ParkingManagement,
    /// Visitor management
    VisitorManagement,
    /// Checklist management
    ChecklistManagement,
    /// Surveys
    Surveys,
}

impl Module {
    /// Every module, in declaration order
    pub const ALL: [Self; 15] = [
        Self::Tickets,
        Self::Tasks,
        Self::Schedule,
        Self::Inventory,
        Self::Amc,
        Self::Assets,
        Self::MeetingRoom,
        Self::Community,
        Self::Helpdesk,
        Self::AssetManagement,
        Self::InventoryManagement,
        Self::ParkingManagement,
        Self::VisitorManagement,
        Self::ChecklistManagement,
        Self::Surveys,
    ];

    /// Wire tag of the module
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tickets => "tickets",
            Self::Tasks => "tasks",
            Self::Schedule => "schedule",
            Self::Inventory => "inventory",
            Self::Amc => "amc",
            Self::Assets => "assets",
            Self::MeetingRoom => "meeting_room",
            Self::Community => "community",
            Self::Helpdesk => "helpdesk",
            Self::AssetManagement => "asset_management",
            Self::InventoryManagement => "inventory_management",
            Self::ParkingManagement => "parking_management",
            Self::VisitorManagement => "visitor_management",
            Self::ChecklistManagement => "checklist_management",
            Self::Surveys => "surveys",
        }
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Module {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|module| module.as_str() == s)
            .ok_or_else(|| Error::validation("module", format!("unknown module tag '{s}'")))
    }
}

/// A user's selection of one (module, endpoint) pair shown as a dashboard card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticDescriptor {
    /// Unique identifier, also the grid layout key
    pub id: String,
    /// Module the metric belongs to
    pub module: Module,
    /// Metric name within the module
    pub endpoint: String,
    /// Card title shown to the user
    pub title: String,
}

impl AnalyticDescriptor {
    /// Create a descriptor with an explicit id
    pub fn new(
        id: impl Into<String>,
        module: Module,
        endpoint: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            module,
            endpoint: endpoint.into(),
            title: title.into(),
        }
    }

    /// Create a descriptor whose id is derived from the module and endpoint
    pub fn for_endpoint(module: Module, endpoint: impl Into<String>, title: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        Self {
            id: format!("{module}_{endpoint}"),
            module,
            endpoint,
            title: title.into(),
        }
    }
}

/// Inclusive date range selected on the dashboard
///
/// `from <= to` is expected but not enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    /// First day of the range
    pub from: NaiveDate,
    /// Last day of the range
    pub to: NaiveDate,
}

impl DateRange {
    /// Create a new range
    pub const fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    /// The dashboard's initial range: one year back from `today` up to `today`
    pub fn last_year(today: NaiveDate) -> Self {
        let from = today.checked_sub_months(Months::new(12)).unwrap_or(today);
        Self { from, to: today }
    }

    /// Cache discriminator for this range
    pub fn key(&self) -> DateRangeKey {
        DateRangeKey(format!(
            "{}_{}",
            self.from.format(DATE_FORMAT),
            self.to.format(DATE_FORMAT)
        ))
    }
}

/// Canonical `YYYY-MM-DD_YYYY-MM-DD` form of a [`DateRange`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DateRangeKey(String);

impl DateRangeKey {
    /// String form of the key
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DateRangeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&DateRange> for DateRangeKey {
    fn from(range: &DateRange) -> Self {
        range.key()
    }
}

/// Dashboard flavour; each keeps its own persisted layout and selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardVariant {
    /// The regular dashboard
    #[default]
    Regular,
    /// The executive dashboard
    Executive,
}

impl DashboardVariant {
    /// Prefix applied to every storage key of this variant
    pub const fn storage_prefix(self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Executive => "executive",
        }
    }

    /// Storage key of the persisted grid layout
    pub fn layout_key(self) -> String {
        format!("{}DashboardGridLayout", self.storage_prefix())
    }

    /// Storage key of the persisted selection
    pub fn selection_key(self) -> String {
        format!("{}DashboardSelectedAnalytics", self.storage_prefix())
    }
}

/// Position and size of one card on the dashboard grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutItem {
    /// Descriptor id the item belongs to
    pub i: String,
    /// Column
    pub x: u32,
    /// Row
    pub y: u32,
    /// Width in columns
    pub w: u32,
    /// Height in rows
    pub h: u32,
    /// Minimum width
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_w: Option<u32>,
    /// Minimum height
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_h: Option<u32>,
}

impl LayoutItem {
    /// Row just below this item
    pub const fn bottom(&self) -> u32 {
        self.y.saturating_add(self.h)
    }
}
