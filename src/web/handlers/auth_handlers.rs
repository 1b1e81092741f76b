// src/web/handlers/auth_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::services::auth_service;
use crate::state::AppState;

#[derive(Deserialize, Debug)]
pub struct AdminLoginPayload {
  pub password: String,
}

#[instrument(name = "handler::admin_login", skip(app_state, payload))]
pub async fn admin_login_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<AdminLoginPayload>,
) -> Result<HttpResponse, AppError> {
  let verified = auth_service::verify_password(&app_state.config.admin_password_hash, &payload.password)?;
  if !verified {
    warn!("Admin login attempt with invalid credentials.");
    return Err(AppError::Auth("Invalid admin credentials.".to_string()));
  }

  let session = auth_service::issue_session(
    &app_state.db_pool,
    app_state.config.db_timeout,
    app_state.config.session_ttl_minutes,
  )
  .await?;
  info!("Admin login succeeded.");

  Ok(HttpResponse::Ok().json(json!({
      "success": true,
      "token": session.token,
      "expiresAt": session.expires_at,
  })))
}
