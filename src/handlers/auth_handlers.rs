use actix_web::{HttpResponse, Result, error, web};
use bcrypt::verify;
use validator::Validate;

use crate::errors::ApiError;
use crate::state::app_state::AppState;
use crate::structs::auth::{LoginRequest, LoginResponse};
use crate::utils::jwt::create_token;

fn invalid_credentials() -> HttpResponse {
    HttpResponse::Unauthorized().json(serde_json::json!({
        "error": "Invalid credentials"
    }))
}

/// Exchange the admin credentials for a bearer token
pub async fn login(
    app_state: web::Data<AppState>,
    web::Json(req): web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    req.validate().map_err(ApiError::from)?;

    let config = &app_state.config;
    let password_hash = match &config.admin_password_hash {
        Some(hash) => hash,
        None => {
            log::warn!("Login attempted but ADMIN_PASSWORD_HASH is not configured");
            return Ok(invalid_credentials());
        }
    };

    if req.username != config.admin_username {
        return Ok(invalid_credentials());
    }

    // Verify password
    let password_matches = verify(&req.password, password_hash)
        .map_err(|_| error::ErrorInternalServerError("Password verification failed"))?;

    if !password_matches {
        log::info!("Failed login for {}", req.username);
        return Ok(invalid_credentials());
    }

    // Generate JWT token
    let (token, expires_at) = create_token(&req.username, &config.jwt_secret, config.jwt_ttl_hours)
        .map_err(|e| error::ErrorInternalServerError(format!("Token generation failed: {}", e)))?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        token,
        username: req.username,
        expires_at,
    }))
}
