use actix_web::{HttpRequest, HttpResponse, http, web};
use chrono::Local;
use validator::Validate;

use crate::analytics::ingest::{self, PageviewOutcome};
use crate::db::event_store::Commit;
use crate::errors::ApiError;
use crate::state::app_state::AppState;
use crate::structs::track_request::{EventRequest, PageviewRequest, TrackResponse};

/// Record a pageview from the dashboard
pub async fn track_pageview(
    app_state: web::Data<AppState>,
    req: HttpRequest,
    web::Json(mut body): web::Json<PageviewRequest>,
) -> Result<HttpResponse, ApiError> {
    body.validate()?;

    // Fall back to the request's own user agent when the client didn't report one
    if body.user_agent.is_none() {
        body.user_agent = req
            .headers()
            .get(http::header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
    }

    let now = Local::now();
    let outcome = app_state
        .store
        .update(|doc| match ingest::record_pageview(doc, &body, &now) {
            PageviewOutcome::Recorded => Commit::Write(PageviewOutcome::Recorded),
            skipped => Commit::Skip(skipped),
        })
        .await?;

    let message = match outcome {
        PageviewOutcome::Recorded => {
            app_state.reports.invalidate();
            "Pageview recorded"
        }
        PageviewOutcome::DuplicateSkipped => "Duplicate skipped",
    };

    Ok(HttpResponse::Ok().json(TrackResponse::ok(message)))
}

/// Record a custom telemetry event
pub async fn track_event(
    app_state: web::Data<AppState>,
    web::Json(body): web::Json<EventRequest>,
) -> Result<HttpResponse, ApiError> {
    body.validate()?;

    let now_ms = Local::now().timestamp_millis();
    app_state
        .store
        .update(|doc| {
            ingest::record_event(doc, &body, now_ms);
            Commit::Write(())
        })
        .await?;
    app_state.reports.invalidate();

    Ok(HttpResponse::Ok().json(TrackResponse::ok("Event recorded")))
}
