use actix_web::{HttpResponse, web};
use chrono::Local;
use serde::Serialize;
use serde_json::Value;

use crate::analytics::aggregate::Aggregator;
use crate::errors::ApiError;
use crate::models::store_document::StoreDocument;
use crate::state::app_state::AppState;
use crate::state::report_cache::ReportKind;
use crate::structs::stats_response::{AnalyticsResponse, StatsResponse, WindowQuery};

async fn load_snapshot(app_state: &AppState) -> Result<StoreDocument, ApiError> {
    app_state.store.load().await.map_err(|e| {
        log::error!("Failed to load analytics snapshot: {}", e);
        ApiError::Retrieval
    })
}

/// Cached report body, or build it from a fresh snapshot and cache it.
async fn cached_report<R, F>(
    app_state: &AppState,
    kind: ReportKind,
    days: u32,
    build: F,
) -> Result<Value, ApiError>
where
    R: Serialize,
    F: FnOnce(&StoreDocument) -> R,
{
    if let Some(body) = app_state.reports.get(kind, days) {
        return Ok(body);
    }

    let generation = app_state.reports.generation();
    let doc = load_snapshot(app_state).await?;
    let body: Value = serde_json::to_value(build(&doc)).map_err(|e| {
        log::error!("Failed to encode {:?} report: {}", kind, e);
        ApiError::Retrieval
    })?;
    app_state.reports.set(kind, days, generation, body.clone());

    Ok(body)
}

/// Headline numbers plus the daily series
pub async fn get_stats(
    app_state: web::Data<AppState>,
    query: web::Query<WindowQuery>,
) -> Result<HttpResponse, ApiError> {
    let days = query.days();

    let mut body = cached_report(&app_state, ReportKind::Stats, days, |doc| {
        let agg = Aggregator::new(doc, Local::now());
        StatsResponse {
            visitors: agg.unique_visitors(days),
            pageviews: agg.pageview_count(days),
            bounce_rate: agg.bounce_rate(days),
            daily_stats: agg.daily_series(days),
            period: format!("{days}d"),
        }
    })
    .await?;
    body["timestamp"] = Value::String(Local::now().to_rfc3339());

    Ok(HttpResponse::Ok().json(body))
}

/// Full dashboard payload with device split and fixed 7/30 day comparisons
pub async fn get_analytics(
    app_state: web::Data<AppState>,
    query: web::Query<WindowQuery>,
) -> Result<HttpResponse, ApiError> {
    let days = query.days();

    let body = cached_report(&app_state, ReportKind::Analytics, days, |doc| {
        let agg = Aggregator::new(doc, Local::now());
        AnalyticsResponse {
            success: true,
            daily_stats: agg.daily_series(days),
            device_stats: agg.device_distribution(days),
            total_visitors: agg.unique_visitors(days),
            total_page_views: agg.pageview_count(days),
            bounce_rate: agg.bounce_rate(days),
            summary: doc.stats.clone(),
            last7_days: agg.window_summary(7),
            last30_days: agg.window_summary(30),
        }
    })
    .await?;

    Ok(HttpResponse::Ok().json(body))
}
