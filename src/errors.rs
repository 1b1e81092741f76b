// src/errors.rs

use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Service Unavailable: {0}")]
  Unavailable(String),

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

// Allow anyhow::Error to be converted into AppError::Internal for convenience
// when `?` is used on functions returning anyhow::Result.
impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    if err.is::<sqlx::Error>() {
      return AppError::Sqlx(err.downcast::<sqlx::Error>().unwrap());
    }
    AppError::Internal(err.to_string())
  }
}

impl ResponseError for AppError {
  fn error_response(&self) -> HttpResponse {
    // Log the full error when it's turned into a response. Internal detail
    // stays in the logs; the client only ever sees the envelope below.
    tracing::error!(application_error = %self, "Responding with error");
    match self {
      AppError::Validation(m) => HttpResponse::BadRequest().json(json!({"success": false, "error": m})),
      AppError::Auth(m) => HttpResponse::Unauthorized().json(json!({"success": false, "error": m})),
      AppError::NotFound(m) => HttpResponse::NotFound().json(json!({"success": false, "error": m})),
      AppError::Config(_) => {
        HttpResponse::InternalServerError().json(json!({"success": false, "error": "Configuration issue"}))
      }
      AppError::Sqlx(_) => {
        HttpResponse::InternalServerError().json(json!({"success": false, "error": "Database operation failed"}))
      }
      AppError::Unavailable(m) => HttpResponse::InternalServerError().json(json!({"success": false, "error": m})),
      AppError::Internal(_) => {
        HttpResponse::InternalServerError().json(json!({"success": false, "error": "An internal error occurred"}))
      }
    }
  }
}

// Define a Result type alias for the application
pub type Result<T, E = AppError> = std::result::Result<T, E>;
