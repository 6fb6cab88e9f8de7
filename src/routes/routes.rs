use actix_web::{error, web};

use crate::errors::ApiError;
use crate::handlers::admin_handlers::{invalidate_reports, list_events};
use crate::handlers::auth_handlers::login;
use crate::handlers::health_handlers::health_check;
use crate::handlers::stats_handlers::{get_analytics, get_stats};
use crate::handlers::track_handlers::{track_event, track_pageview};
use crate::middlewares::authmw::JwtAuth;

const MAX_JSON_BYTES: usize = 64 * 1024;

/// Configure the routes
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    // Malformed bodies get the same shape as validation failures
    cfg.app_data(
        web::JsonConfig::default()
            .limit(MAX_JSON_BYTES)
            .error_handler(|err, _req| {
                let message = format!("Invalid request body: {}", err);
                error::InternalError::from_response(
                    err,
                    actix_web::ResponseError::error_response(&ApiError::Validation(message)),
                )
                .into()
            }),
    );

    cfg.route("/health", web::get().to(health_check));
    // Ingestion routes - public, called by the dashboard
    cfg.service(
        web::scope("/api/track")
            .route("/pageview", web::post().to(track_pageview))
            .route("/event", web::post().to(track_event)),
    );
    // Reporting routes - read only
    cfg.route("/api/stats", web::get().to(get_stats));
    cfg.route("/api/analytics", web::get().to(get_analytics));
    // Authentication routes - no auth required
    cfg.service(web::scope("/api/auth").route("/login", web::post().to(login)));
    // Admin routes - require authentication
    cfg.service(
        web::scope("/api/admin")
            .wrap(JwtAuth)
            .route("/events", web::get().to(list_events))
            .route("/cache/invalidate", web::post().to(invalidate_reports)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::state::app_state::AppState;
    use actix_web::{App, http::StatusCode, http::header, test};
    use serde_json::{Value, json};

    fn state(dir: &tempfile::TempDir) -> web::Data<AppState> {
        web::Data::new(AppState::new(Config::for_tests(
            dir.path().join("analytics.json"),
        )))
    }

    fn pageview(body: Value) -> test::TestRequest {
        test::TestRequest::post()
            .uri("/api/track/pageview")
            .set_json(body)
    }

    #[actix_web::test]
    async fn pageviews_flow_into_stats() {
        let dir = tempfile::tempdir().unwrap();
        let app = test::init_service(App::new().app_data(state(&dir)).configure(init_routes)).await;

        let first = json!({ "visitorId": "v1", "sessionId": "s1", "page": "/" });
        let res: Value =
            test::call_and_read_body_json(&app, pageview(first.clone()).to_request()).await;
        assert_eq!(res, json!({ "success": true, "message": "Pageview recorded" }));

        let res: Value = test::call_and_read_body_json(&app, pageview(first).to_request()).await;
        assert_eq!(res["message"], "Duplicate skipped");

        for body in [
            json!({ "visitorId": "v1", "sessionId": "s1", "page": "/faculty" }),
            json!({ "visitorId": "v2", "sessionId": "s2", "page": "/" }),
        ] {
            let res = test::call_service(&app, pageview(body).to_request()).await;
            assert_eq!(res.status(), StatusCode::OK);
        }

        let req = test::TestRequest::get().uri("/api/stats?days=7").to_request();
        let stats: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(stats["visitors"], 2);
        assert_eq!(stats["pageviews"], 3);
        assert_eq!(stats["bounceRate"], json!(50.0));
        assert_eq!(stats["period"], "7d");

        let daily = stats["dailyStats"].as_array().unwrap();
        assert_eq!(daily.len(), 7);
        let total: u64 = daily.iter().map(|d| d["pageViews"].as_u64().unwrap()).sum();
        assert_eq!(total, 3);
    }

    #[actix_web::test]
    async fn missing_required_fields_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let app = test::init_service(App::new().app_data(state(&dir)).configure(init_routes)).await;

        let res = test::call_service(&app, pageview(json!({ "page": "/" })).to_request()).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body, json!({ "success": false, "message": "visitorId is required" }));

        let req = test::TestRequest::post()
            .uri("/api/track/event")
            .set_json(json!({ "visitorId": "v1" }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["message"], "eventName is required");

        let req = test::TestRequest::post()
            .uri("/api/track/pageview")
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .set_payload("{ not json")
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["success"], false);
    }

    #[actix_web::test]
    async fn analytics_report_has_comparison_blocks() {
        let dir = tempfile::tempdir().unwrap();
        let app = test::init_service(App::new().app_data(state(&dir)).configure(init_routes)).await;

        let body = json!({ "visitorId": "v1", "page": "/", "deviceType": "tablet" });
        test::call_service(&app, pageview(body).to_request()).await;

        let req = test::TestRequest::get().uri("/api/analytics").to_request();
        let report: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(report["success"], true);
        assert_eq!(report["dailyStats"].as_array().unwrap().len(), 7);
        assert_eq!(report["deviceStats"], json!({ "desktop": 0, "mobile": 0, "tablet": 100 }));
        assert_eq!(report["totalVisitors"], 1);
        assert_eq!(report["totalPageViews"], 1);
        assert_eq!(report["bounceRate"], json!(100.0));
        assert_eq!(report["summary"]["totalPageviews"], 1);
        assert_eq!(report["last7Days"]["visitors"], 1);
        assert_eq!(report["last30Days"]["pageviews"], 1);
    }

    #[actix_web::test]
    async fn ingestion_invalidates_cached_reports() {
        let dir = tempfile::tempdir().unwrap();
        let data = state(&dir);
        let app = test::init_service(App::new().app_data(data.clone()).configure(init_routes)).await;

        let req = test::TestRequest::get().uri("/api/stats").to_request();
        let stats: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(stats["visitors"], 0);
        assert_eq!(data.reports.len(), 1);

        test::call_service(&app, pageview(json!({ "visitorId": "v1" })).to_request()).await;
        assert_eq!(data.reports.len(), 0);

        let req = test::TestRequest::get().uri("/api/stats").to_request();
        let stats: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(stats["visitors"], 1);
    }

    #[actix_web::test]
    async fn cached_stats_carry_the_serving_time() {
        let dir = tempfile::tempdir().unwrap();
        let data = state(&dir);
        let app = test::init_service(App::new().app_data(data.clone()).configure(init_routes)).await;

        let req = test::TestRequest::get().uri("/api/stats").to_request();
        let first: Value = test::call_and_read_body_json(&app, req).await;
        assert!(first["timestamp"].is_string());
        assert_eq!(data.reports.len(), 1);

        std::thread::sleep(std::time::Duration::from_millis(5));
        let before = chrono::Local::now();
        let req = test::TestRequest::get().uri("/api/stats").to_request();
        let second: Value = test::call_and_read_body_json(&app, req).await;

        let served =
            chrono::DateTime::parse_from_rfc3339(second["timestamp"].as_str().unwrap()).unwrap();
        assert!(served >= before);
        assert_ne!(first["timestamp"], second["timestamp"]);
        assert_eq!(first["visitors"], second["visitors"]);
    }

    #[actix_web::test]
    async fn admin_routes_require_a_login_token() {
        let dir = tempfile::tempdir().unwrap();
        let app = test::init_service(App::new().app_data(state(&dir)).configure(init_routes)).await;

        let req = test::TestRequest::post()
            .uri("/api/track/event")
            .set_json(json!({
                "visitorId": "v1",
                "eventName": "language_toggle",
                "eventData": { "language": "en" }
            }))
            .to_request();
        let res: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(res["message"], "Event recorded");

        let req = test::TestRequest::get().uri("/api/admin/events").to_request();
        match test::try_call_service(&app, req).await {
            Ok(_) => panic!("admin route served without a token"),
            Err(err) => assert_eq!(
                err.as_response_error().status_code(),
                StatusCode::UNAUTHORIZED
            ),
        }

        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "username": "admin", "password": "wrong" }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "username": "admin", "password": "hunter22" }))
            .to_request();
        let login: Value = test::call_and_read_body_json(&app, req).await;
        let token = login["token"].as_str().unwrap().to_string();
        assert_eq!(login["username"], "admin");

        let req = test::TestRequest::get()
            .uri("/api/admin/events")
            .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
            .to_request();
        let events: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(events["events"][0]["kind"], "language_toggle");
        assert_eq!(events["events"][0]["eventData"], json!({ "language": "en" }));

        let req = test::TestRequest::post()
            .uri("/api/admin/cache/invalidate")
            .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn health_reports_ok() {
        let dir = tempfile::tempdir().unwrap();
        let app = test::init_service(App::new().app_data(state(&dir)).configure(init_routes)).await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "OK");
        assert!(body["timestamp"].is_string());
    }
}
