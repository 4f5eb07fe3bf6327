//! Module dispatch table
//!
//! Every metric the dashboard can request is a variant of [`Metric`]; the
//! `(module, endpoint)` strings carried by persisted selections are resolved
//! with [`Metric::parse`]. Pairs that do not resolve are inert: the
//! orchestrator publishes `null` for them without touching the network.
//!
//! Each module exposes one statistics report on the backend and a metric picks
//! its section with a boolean selector parameter, e.g.
//! `/pms/asset_amcs/amc_statistics.json?amcs_stats=true`.

use fmdash_core::types::DATE_FORMAT;
use fmdash_core::{DateRange, Module};

/// Backend request description for one metric
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    /// Path relative to the configured base URL
    pub path: &'static str,
    /// Boolean selector sent as `<flag>=true`
    pub flag: Option<&'static str>,
    /// Whether `from_date`/`to_date` are sent
    pub date_scoped: bool,
    /// JSON pointer of the section to publish instead of the whole body
    pub extract: Option<&'static str>,
}

impl Route {
    /// Query parameters for `range`, without site and token
    pub fn query(&self, range: &DateRange) -> Vec<(&'static str, String)> {
        let mut query = Vec::with_capacity(3);
        if let Some(flag) = self.flag {
            query.push((flag, "true".to_string()));
        }
        if self.date_scoped {
            query.push(("from_date", range.from.format(DATE_FORMAT).to_string()));
            query.push(("to_date", range.to.format(DATE_FORMAT).to_string()));
        }
        query
    }
}

/// Statistics report backing each module
pub const fn statistics_path(module: Module) -> &'static str {
    match module {
        Module::Tickets => "/pms/admin/complaints/complaint_statistics.json",
        Module::Tasks => "/pms/custom_forms/checklist_statistics.json",
        Module::Schedule => "/pms/custom_forms/schedule_statistics.json",
        Module::Inventory => "/pms/inventories/inventory_statistics.json",
        Module::Amc => "/pms/asset_amcs/amc_statistics.json",
        Module::Assets => "/pms/assets/assets_statistics.json",
        Module::MeetingRoom => "/pms/admin/meeting_rooms/meeting_room_statistics.json",
        Module::Community => "/pms/communities/community_statistics.json",
        Module::Helpdesk => "/pms/admin/helpdesk/helpdesk_statistics.json",
        Module::AssetManagement => "/pms/assets/asset_management_statistics.json",
        Module::InventoryManagement => "/pms/inventories/inventory_management_statistics.json",
        Module::ParkingManagement => "/pms/parkings/parking_statistics.json",
        Module::VisitorManagement => "/pms/visitors/visitor_statistics.json",
        Module::ChecklistManagement => "/pms/custom_forms/checklist_management_statistics.json",
        Module::Surveys => "/pms/surveys/survey_statistics.json",
    }
}

/// A requestable metric: one `(module, endpoint)` pair of the dispatch table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Metric {
    // tickets
    TicketsCategorywise,
    TicketStatus,
    TicketAgingMatrix,
    TicketsUnitCategorywise,
    TicketsResponseTat,
    TicketsResolutionTat,
    // tasks
    TechnicalChecklist,
    NonTechnicalChecklist,
    TopTenChecklist,
    SiteWiseChecklist,
    // schedule
    ScheduleOverview,
    ScheduleCompletion,
    ResourceUtilization,
    // inventory
    InventoryItemsStatus,
    InventoryCategoryWise,
    InventoryGreenConsumption,
    InventoryAgingMatrix,
    InventoryLowStock,
    InventoryHighValue,
    // amc
    AmcStatusOverview,
    AmcTypeDistribution,
    AmcUnitResourceWise,
    AmcServiceStats,
    AmcExpiryAnalysis,
    AmcServiceTracking,
    AmcCoverageByLocation,
    AmcVendorPerformance,
    // assets
    AssetStatus,
    AssetStatistics,
    AssetGroupWise,
    AssetCategoryWise,
    AssetDistribution,
    // meeting_room
    MeetingRoomRevenueOverview,
    MeetingRoomCenterPerformance,
    MeetingRoomCenterUtilization,
    MeetingRoomResponseTatQuarterly,
    MeetingRoomResolutionTatQuarterly,
    // community
    CommunityEngagementMetrics,
    CommunitySiteWiseAdoption,
    // helpdesk
    HelpdeskSnapshot,
    HelpdeskAgingClosureFeedback,
    HelpdeskTicketPerformance,
    HelpdeskCustomerExperience,
    HelpdeskResponseTatQuarterly,
    HelpdeskResolutionTatQuarterly,
    // asset_management
    AssetOverview,
    HighestMaintenanceAssets,
    AmcContractSummary,
    // inventory_management
    InventoryOverstockReport,
    CenterWiseConsumables,
    ConsumableInventoryComparison,
    // parking_management
    ParkingAllocationOverview,
    // visitor_management
    VisitorTrendAnalysis,
    // checklist_management
    ChecklistProgressQuarterly,
    TopOverdueChecklists,
    // surveys
    SurveyAnalytics,
}

impl Metric {
    /// Every metric in the table
    pub const ALL: [Self; 56] = [
        Self::TicketsCategorywise,
        Self::TicketStatus,
        Self::TicketAgingMatrix,
        Self::TicketsUnitCategorywise,
        Self::TicketsResponseTat,
        Self::TicketsResolutionTat,
        Self::TechnicalChecklist,
        Self::NonTechnicalChecklist,
        Self::TopTenChecklist,
        Self::SiteWiseChecklist,
        Self::ScheduleOverview,
        Self::ScheduleCompletion,
        Self::ResourceUtilization,
        Self::InventoryItemsStatus,
        Self::InventoryCategoryWise,
        Self::InventoryGreenConsumption,
        Self::InventoryAgingMatrix,
        Self::InventoryLowStock,
        Self::InventoryHighValue,
        Self::AmcStatusOverview,
        Self::AmcTypeDistribution,
        Self::AmcUnitResourceWise,
        Self::AmcServiceStats,
        Self::AmcExpiryAnalysis,
        Self::AmcServiceTracking,
        Self::AmcCoverageByLocation,
        Self::AmcVendorPerformance,
        Self::AssetStatus,
        Self::AssetStatistics,
        Self::AssetGroupWise,
        Self::AssetCategoryWise,
        Self::AssetDistribution,
        Self::MeetingRoomRevenueOverview,
        Self::MeetingRoomCenterPerformance,
        Self::MeetingRoomCenterUtilization,
        Self::MeetingRoomResponseTatQuarterly,
        Self::MeetingRoomResolutionTatQuarterly,
        Self::CommunityEngagementMetrics,
        Self::CommunitySiteWiseAdoption,
        Self::HelpdeskSnapshot,
        Self::HelpdeskAgingClosureFeedback,
        Self::HelpdeskTicketPerformance,
        Self::HelpdeskCustomerExperience,
        Self::HelpdeskResponseTatQuarterly,
        Self::HelpdeskResolutionTatQuarterly,
        Self::AssetOverview,
        Self::HighestMaintenanceAssets,
        Self::AmcContractSummary,
        Self::InventoryOverstockReport,
        Self::CenterWiseConsumables,
        Self::ConsumableInventoryComparison,
        Self::ParkingAllocationOverview,
        Self::VisitorTrendAnalysis,
        Self::ChecklistProgressQuarterly,
        Self::TopOverdueChecklists,
        Self::SurveyAnalytics,
    ];

    /// Resolve a persisted `(module, endpoint)` pair
    pub fn parse(module: Module, endpoint: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|metric| {
                metric.module() == module
                    && metric.endpoints().iter().any(|candidate| *candidate == endpoint)
            })
    }

    /// Module the metric belongs to
    pub const fn module(self) -> Module {
        match self {
            Self::TicketsCategorywise
            | Self::TicketStatus
            | Self::TicketAgingMatrix
            | Self::TicketsUnitCategorywise
            | Self::TicketsResponseTat
            | Self::TicketsResolutionTat => Module::Tickets,
            Self::TechnicalChecklist
            | Self::NonTechnicalChecklist
            | Self::TopTenChecklist
            | Self::SiteWiseChecklist => Module::Tasks,
            Self::ScheduleOverview | Self::ScheduleCompletion | Self::ResourceUtilization => {
                Module::Schedule
            }
            Self::InventoryItemsStatus
            | Self::InventoryCategoryWise
            | Self::InventoryGreenConsumption
            | Self::InventoryAgingMatrix
            | Self::InventoryLowStock
            | Self::InventoryHighValue => Module::Inventory,
            Self::AmcStatusOverview
            | Self::AmcTypeDistribution
            | Self::AmcUnitResourceWise
            | Self::AmcServiceStats
            | Self::AmcExpiryAnalysis
            | Self::AmcServiceTracking
            | Self::AmcCoverageByLocation
            | Self::AmcVendorPerformance => Module::Amc,
            Self::AssetStatus
            | Self::AssetStatistics
            | Self::AssetGroupWise
            | Self::AssetCategoryWise
            | Self::AssetDistribution => Module::Assets,
            Self::MeetingRoomRevenueOverview
            | Self::MeetingRoomCenterPerformance
            | Self::MeetingRoomCenterUtilization
            | Self::MeetingRoomResponseTatQuarterly
            | Self::MeetingRoomResolutionTatQuarterly => Module::MeetingRoom,
            Self::CommunityEngagementMetrics | Self::CommunitySiteWiseAdoption => {
                Module::Community
            }
            Self::HelpdeskSnapshot
            | Self::HelpdeskAgingClosureFeedback
            | Self::HelpdeskTicketPerformance
            | Self::HelpdeskCustomerExperience
            | Self::HelpdeskResponseTatQuarterly
            | Self::HelpdeskResolutionTatQuarterly => Module::Helpdesk,
            Self::AssetOverview | Self::HighestMaintenanceAssets | Self::AmcContractSummary => {
                Module::AssetManagement
            }
            Self::InventoryOverstockReport
            | Self::CenterWiseConsumables
            | Self::ConsumableInventoryComparison => Module::InventoryManagement,
            Self::ParkingAllocationOverview => Module::ParkingManagement,
            Self::VisitorTrendAnalysis => Module::VisitorManagement,
            Self::ChecklistProgressQuarterly | Self::TopOverdueChecklists => {
                Module::ChecklistManagement
            }
            Self::SurveyAnalytics => Module::Surveys,
        }
    }

    /// Endpoint names that select this metric; the first one is canonical
    pub const fn endpoints(self) -> &'static [&'static str] {
        match self {
            Self::TicketsCategorywise => &["tickets_categorywise"],
            Self::TicketStatus => &["ticket_status", "tickets_proactive_reactive"],
            Self::TicketAgingMatrix => &["ticket_aging_matrix"],
            Self::TicketsUnitCategorywise => &["unit_categorywise", "tickets_unit_categorywise"],
            Self::TicketsResponseTat => &["response_tat", "tickets_response_tat"],
            Self::TicketsResolutionTat => &["resolution_tat", "tickets_resolution_tat"],
            Self::TechnicalChecklist => &["technical_checklist"],
            Self::NonTechnicalChecklist => &["non_technical_checklist"],
            Self::TopTenChecklist => &["top_ten_checklist"],
            Self::SiteWiseChecklist => &["site_wise_checklist"],
            Self::ScheduleOverview => &["schedule_overview"],
            Self::ScheduleCompletion => &["schedule_completion"],
            Self::ResourceUtilization => &["resource_utilization"],
            Self::InventoryItemsStatus => &["items_status"],
            Self::InventoryCategoryWise | Self::AssetCategoryWise => &["category_wise"],
            Self::InventoryGreenConsumption => &["green_consumption"],
            Self::InventoryAgingMatrix => &["aging_matrix"],
            Self::InventoryLowStock => &["low_stock"],
            Self::InventoryHighValue => &["high_value"],
            Self::AmcStatusOverview => &["status_overview"],
            Self::AmcTypeDistribution => &["type_distribution"],
            Self::AmcUnitResourceWise => &["unit_resource_wise"],
            Self::AmcServiceStats => &["service_stats"],
            Self::AmcExpiryAnalysis => &["expiry_analysis"],
            Self::AmcServiceTracking => &["service_tracking"],
            Self::AmcCoverageByLocation => &["coverage_by_location"],
            Self::AmcVendorPerformance => &["vendor_performance"],
            Self::AssetStatus => &["asset_status"],
            Self::AssetStatistics => &["asset_statistics"],
            Self::AssetGroupWise => &["group_wise"],
            Self::AssetDistribution => &["asset_distribution"],
            Self::MeetingRoomRevenueOverview => &["revenue_generation_overview"],
            Self::MeetingRoomCenterPerformance => &["center_performance_overview"],
            Self::MeetingRoomCenterUtilization => &["center_wise_meeting_room_utilization"],
            Self::MeetingRoomResponseTatQuarterly | Self::HelpdeskResponseTatQuarterly => {
                &["response_tat_performance_quarterly"]
            }
            Self::MeetingRoomResolutionTatQuarterly | Self::HelpdeskResolutionTatQuarterly => {
                &["resolution_tat_performance_quarterly"]
            }
            Self::CommunityEngagementMetrics => &["engagement_metrics"],
            Self::CommunitySiteWiseAdoption => &["site_wise_adoption_rate"],
            Self::HelpdeskSnapshot => &["snapshot"],
            Self::HelpdeskAgingClosureFeedback => &["aging_closure_feedback"],
            Self::HelpdeskTicketPerformance => &["ticket_performance_metrics"],
            Self::HelpdeskCustomerExperience => {
                &["customer_experience_feedback", "customer_rating_overview"]
            }
            Self::AssetOverview => &["company_asset_overview", "center_assets_downtime"],
            Self::HighestMaintenanceAssets => &["highest_maintenance_assets"],
            Self::AmcContractSummary => &[
                "amc_contract_summary",
                "amc_contract_expiry_90",
                "amc_contract_expired",
            ],
            Self::InventoryOverstockReport => {
                &["inventory_overview_summary", "inventory_overstock_top10"]
            }
            Self::CenterWiseConsumables => &["top_consumables_center"],
            Self::ConsumableInventoryComparison => &["consumable_inventory_value_quarterly"],
            Self::ParkingAllocationOverview => &["parking_allocation_overview"],
            Self::VisitorTrendAnalysis => &["visitor_trend_analysis"],
            Self::ChecklistProgressQuarterly => &["cm_progress_quarterly"],
            Self::TopOverdueChecklists => &["cm_overdue_centerwise"],
            Self::SurveyAnalytics => &["survey_summary", "survey_status_distribution", "top_surveys"],
        }
    }

    /// Canonical endpoint name
    pub fn endpoint(self) -> &'static str {
        self.endpoints().first().copied().unwrap_or_default()
    }

    /// Whether the backend report takes the date range
    pub const fn is_date_scoped(self) -> bool {
        !matches!(
            self,
            Self::MeetingRoomResponseTatQuarterly
                | Self::MeetingRoomResolutionTatQuarterly
                | Self::CommunityEngagementMetrics
                | Self::SurveyAnalytics
        )
    }

    /// Backend request for this metric
    pub const fn route(self) -> Route {
        let (path, flag, extract) = match self {
            Self::InventoryGreenConsumption => {
                ("/pms/inventories/consumption_report_green.json", None, None)
            }
            Self::AmcStatusOverview => (
                statistics_path(Module::Amc),
                Some("amcs_stats"),
                Some("/amcs_statistics/amcs_stats"),
            ),
            Self::AmcTypeDistribution => (
                statistics_path(Module::Amc),
                Some("breakdown_vs_preventive"),
                Some("/amcs_statistics/breakdown_vs_preventive_visits"),
            ),
            Self::AmcUnitResourceWise => (
                statistics_path(Module::Amc),
                Some("amcs_unit_resource_wise"),
                Some("/amcs_statistics/amcs_unit_resource_wise"),
            ),
            Self::AmcServiceStats => (
                statistics_path(Module::Amc),
                Some("service_stats"),
                Some("/amcs_statistics/service_stats/overall"),
            ),
            Self::AmcExpiryAnalysis => (
                statistics_path(Module::Amc),
                Some("amcs_expiry_stats"),
                Some("/amcs_statistics/amcs_expiry_stats"),
            ),
            Self::AmcServiceTracking => (
                statistics_path(Module::Amc),
                Some("service_tracking"),
                Some("/amcs_statistics/service_tracking/logs"),
            ),
            Self::AmcCoverageByLocation => (
                statistics_path(Module::Amc),
                Some("coverage_by_location"),
                Some("/coverage_by_location"),
            ),
            other => (statistics_path(other.module()), Some(other.selector()), None),
        };

        Route {
            path,
            flag,
            date_scoped: self.is_date_scoped(),
            extract,
        }
    }

    /// Selector flag of metrics served by their module's statistics report
    const fn selector(self) -> &'static str {
        match self {
            Self::TicketsCategorywise => "tickets_categorywise",
            Self::TicketStatus => "ticket_status",
            Self::TicketAgingMatrix => "ticket_aging_matrix",
            Self::TicketsUnitCategorywise => "unit_categorywise",
            Self::TicketsResponseTat => "response_tat",
            Self::TicketsResolutionTat => "resolution_tat",
            Self::TechnicalChecklist => "technical_checklist",
            Self::NonTechnicalChecklist => "non_technical_checklist",
            Self::TopTenChecklist => "top_ten_checklist",
            Self::SiteWiseChecklist => "site_wise_checklist",
            Self::ScheduleOverview => "schedule_overview",
            Self::ScheduleCompletion => "schedule_completion",
            Self::ResourceUtilization => "resource_utilization",
            Self::InventoryItemsStatus => "items_status",
            Self::InventoryCategoryWise | Self::AssetCategoryWise => "category_wise",
            Self::InventoryGreenConsumption => "green_consumption",
            Self::InventoryAgingMatrix => "aging_matrix",
            Self::InventoryLowStock => "low_stock",
            Self::InventoryHighValue => "high_value",
            Self::AmcStatusOverview => "amcs_stats",
            Self::AmcTypeDistribution => "breakdown_vs_preventive",
            Self::AmcUnitResourceWise => "amcs_unit_resource_wise",
            Self::AmcServiceStats => "service_stats",
            Self::AmcExpiryAnalysis => "amcs_expiry_stats",
            Self::AmcServiceTracking => "service_tracking",
            Self::AmcCoverageByLocation => "coverage_by_location",
            Self::AmcVendorPerformance => "vendor_performance",
            Self::AssetStatus => "asset_status",
            Self::AssetStatistics => "assets_statistics",
            Self::AssetGroupWise => "group_wise",
            Self::AssetDistribution => "asset_distribution",
            Self::MeetingRoomRevenueOverview => "revenue_generation_overview",
            Self::MeetingRoomCenterPerformance => "center_performance_overview",
            Self::MeetingRoomCenterUtilization => "center_wise_utilization",
            Self::MeetingRoomResponseTatQuarterly | Self::HelpdeskResponseTatQuarterly => {
                "response_tat_quarterly"
            }
            Self::MeetingRoomResolutionTatQuarterly | Self::HelpdeskResolutionTatQuarterly => {
                "resolution_tat_quarterly"
            }
            Self::CommunityEngagementMetrics => "engagement_metrics",
            Self::CommunitySiteWiseAdoption => "site_wise_adoption_rate",
            Self::HelpdeskSnapshot => "snapshot",
            Self::HelpdeskAgingClosureFeedback => "aging_closure_feedback",
            Self::HelpdeskTicketPerformance => "ticket_performance_metrics",
            Self::HelpdeskCustomerExperience => "customer_experience_feedback",
            Self::AssetOverview => "asset_overview",
            Self::HighestMaintenanceAssets => "highest_maintenance_assets",
            Self::AmcContractSummary => "amc_contract_summary",
            Self::InventoryOverstockReport => "overstock_report",
            Self::CenterWiseConsumables => "center_wise_consumables",
            Self::ConsumableInventoryComparison => "consumable_inventory_comparison",
            Self::ParkingAllocationOverview => "parking_allocation_overview",
            Self::VisitorTrendAnalysis => "visitor_trend_analysis",
            Self::ChecklistProgressQuarterly => "progress_quarterly",
            Self::TopOverdueChecklists => "overdue_centerwise",
            Self::SurveyAnalytics => "survey_analytics",
        }
    }
}
