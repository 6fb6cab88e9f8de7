use actix_web::{HttpResponse, web};

use crate::state::app_state::AppState;

pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    // Make sure the analytics document is still readable
    let timestamp = chrono::Utc::now().to_rfc3339();

    match state.store.load().await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "status": "OK",
            "message": "Analytics server is running",
            "timestamp": timestamp
        })),
        Err(e) => {
            log::error!("Health check failed: {}", e);
            HttpResponse::ServiceUnavailable().json(serde_json::json!({
                "status": "ERROR",
                "message": "Analytics store is unreadable",
                "timestamp": timestamp
            }))
        }
    }
}
