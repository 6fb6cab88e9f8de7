use serde::{Deserialize, Serialize};

use crate::analytics::aggregate::{DailyStat, DeviceStats, WindowSummary};
use crate::models::event::EventData;
use crate::models::store_document::Rollup;

pub const DEFAULT_WINDOW_DAYS: u32 = 7;
pub const MAX_WINDOW_DAYS: u32 = 365;

/// `?days=` query. Anything unparsable or zero falls back to the default window.
#[derive(Deserialize, Debug, Default)]
pub struct WindowQuery {
    pub days: Option<String>,
}

impl WindowQuery {
    pub fn days(&self) -> u32 {
        self.days
            .as_deref()
            .and_then(|d| d.trim().parse::<u32>().ok())
            .filter(|d| *d > 0)
            .map(|d| d.min(MAX_WINDOW_DAYS))
            .unwrap_or(DEFAULT_WINDOW_DAYS)
    }
}

/// Cacheable part of `/api/stats`. The handler adds `timestamp` per request.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub visitors: usize,
    pub pageviews: usize,
    pub bounce_rate: f64,
    pub daily_stats: Vec<DailyStat>,
    pub period: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResponse {
    pub success: bool,
    pub daily_stats: Vec<DailyStat>,
    pub device_stats: DeviceStats,
    pub total_visitors: usize,
    pub total_page_views: usize,
    pub bounce_rate: f64,
    pub summary: Rollup,
    pub last7_days: WindowSummary,
    pub last30_days: WindowSummary,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct EventListItem {
    pub visitor_id: String,
    pub session_id: String,
    pub event_name: String,
    pub kind: &'static str,
    pub event_data: EventData,
    pub timestamp: i64,
}

#[derive(Serialize, Debug)]
pub struct EventListResponse {
    pub success: bool,
    pub events: Vec<EventListItem>,
}
