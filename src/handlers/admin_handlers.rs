use actix_web::{HttpResponse, web};
use chrono::Local;

use crate::analytics::aggregate::DAY_MS;
use crate::state::app_state::AppState;
use crate::structs::stats_response::{EventListItem, EventListResponse, WindowQuery};
use crate::utils::jwt::Claims;

/// Custom events inside the window, newest first
pub async fn list_events(
    app_state: web::Data<AppState>,
    query: web::Query<WindowQuery>,
) -> HttpResponse {
    let cutoff = Local::now().timestamp_millis() - i64::from(query.days()) * DAY_MS;
    let doc = app_state.store.read().await;

    let mut events: Vec<EventListItem> = doc
        .events
        .into_iter()
        .filter(|e| e.timestamp > cutoff)
        .map(|e| EventListItem {
            kind: e.event_data.kind(),
            visitor_id: e.visitor_id,
            session_id: e.session_id,
            event_name: e.event_name,
            event_data: e.event_data,
            timestamp: e.timestamp,
        })
        .collect();
    events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    HttpResponse::Ok().json(EventListResponse {
        success: true,
        events,
    })
}

pub async fn invalidate_reports(
    app_state: web::Data<AppState>,
    claims: web::ReqData<Claims>,
) -> HttpResponse {
    app_state.reports.invalidate();
    log::info!("Report cache cleared by {}", claims.sub);

    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Report cache cleared"
    }))
}
