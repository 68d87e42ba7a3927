use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Positive,
    Negative,
}

/// Symbolic icon name; the frontend maps it to an actual glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricIcon {
    TrendingUp,
    Users,
    Target,
    BarChart3,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metric {
    pub title: String,
    pub value: String,
    pub change: String,
    pub change_type: ChangeType,
    pub icon: MetricIcon,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    pub name: String,
    pub value: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revenue: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversions: Option<u64>,
}

impl ChartPoint {
    pub fn with_revenue(name: impl Into<String>, value: u64, revenue: u64) -> Self {
        Self {
            name: name.into(),
            value,
            revenue: Some(revenue),
            users: None,
            conversions: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    Active,
    Paused,
    Ended,
}

impl CampaignStatus {
    pub const ALL: [CampaignStatus; 3] = [Self::Active, Self::Paused, Self::Ended];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Ended => "ended",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignRow {
    pub id: String,
    pub campaign: String,
    pub impressions: u64,
    pub clicks: u64,
    pub conversions: u64,
    pub revenue: u64,
    pub ctr: f64,
    pub cpc: f64,
    pub status: CampaignStatus,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Paused,
    Ended,
}

impl StatusFilter {
    pub fn matches(self, status: CampaignStatus) -> bool {
        match self {
            Self::All => true,
            Self::Active => status == CampaignStatus::Active,
            Self::Paused => status == CampaignStatus::Paused,
            Self::Ended => status == CampaignStatus::Ended,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    Id,
    Campaign,
    Impressions,
    Clicks,
    Conversions,
    Revenue,
    Ctr,
    Cpc,
    Status,
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortState {
    #[serde(default)]
    pub field: Option<SortField>,
    #[serde(default)]
    pub direction: Option<SortDirection>,
}

/// Rows per table page. Only the sizes offered by the page-size picker are valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct PageSize(usize);

impl PageSize {
    pub const ALLOWED: [usize; 4] = [5, 10, 20, 50];

    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self(10)
    }
}

impl TryFrom<usize> for PageSize {
    type Error = String;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        if Self::ALLOWED.contains(&value) {
            Ok(Self(value))
        } else {
            Err(format!(
                "page size {} is not one of {:?}",
                value,
                Self::ALLOWED
            ))
        }
    }
}

impl From<PageSize> for usize {
    fn from(value: PageSize) -> Self {
        value.0
    }
}

fn default_page() -> usize {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewParameters {
    #[serde(default)]
    pub search_term: String,
    #[serde(default)]
    pub status_filter: StatusFilter,
    #[serde(default)]
    pub sort: SortState,
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default)]
    pub page_size: PageSize,
}

impl Default for ViewParameters {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            status_filter: StatusFilter::All,
            sort: SortState::default(),
            page: default_page(),
            page_size: PageSize::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableView {
    pub rows: Vec<CampaignRow>,
    pub total_count: usize,
    pub total_pages: usize,
    pub page: usize,
    pub page_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub metrics: Vec<Metric>,
    pub line_chart: Vec<ChartPoint>,
    pub bar_chart: Vec<ChartPoint>,
    pub donut_chart: Vec<ChartPoint>,
    pub table: Vec<CampaignRow>,
    pub last_updated: DateTime<Utc>,
    pub is_loading: bool,
    pub revision: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardEventType {
    DashboardLoaded,
    DashboardRefreshed,
    DashboardUpdated,
    SettingsUpdated,
}

impl DashboardEventType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DashboardLoaded => "dashboard_loaded",
            Self::DashboardRefreshed => "dashboard_refreshed",
            Self::DashboardUpdated => "dashboard_updated",
            Self::SettingsUpdated => "settings_updated",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardEvent {
    pub event_id: String,
    pub r#type: DashboardEventType,
    pub payload: serde_json::Value,
    pub timestamp: DateTime<Utc>,
    pub seq: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResponse {
    pub path: String,
    pub file_name: String,
    pub mime_type: String,
    pub row_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DashboardSettings {
    pub initial_load_delay_ms: u64,
    pub update_interval_secs: u64,
    pub default_page_size: usize,
    pub rng_seed: Option<u64>,
    pub export_dir: Option<PathBuf>,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            initial_load_delay_ms: 1_500,
            update_interval_secs: 15,
            default_page_size: 10,
            rng_seed: None,
            export_dir: None,
        }
    }
}
