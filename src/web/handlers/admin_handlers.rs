// src/web/handlers/admin_handlers.rs

use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use futures_util::StreamExt as _;
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::services::ingestion::{self, ProductSubmission};
use crate::state::AppState;
use crate::web::extractors::AdminSession;

/// Cap on any single text field of the admin form. The form carries only
/// strings and a JSON-encoded image reference list, never file bytes.
const MAX_FIELD_BYTES: usize = 64 * 1024;

async fn collect_submission(mut payload: Multipart) -> Result<ProductSubmission, AppError> {
  let mut submission = ProductSubmission::default();

  while let Some(item) = payload.next().await {
    let mut field = item.map_err(|e| AppError::Validation(format!("Malformed multipart payload: {}", e)))?;
    let Some(name) = field.content_disposition().get_name().map(str::to_owned) else {
      continue;
    };

    let mut buffer = Vec::new();
    while let Some(chunk) = field.next().await {
      let chunk = chunk.map_err(|e| AppError::Validation(format!("Malformed multipart payload: {}", e)))?;
      if buffer.len() + chunk.len() > MAX_FIELD_BYTES {
        return Err(AppError::Validation(format!("Field '{}' exceeds the size limit", name)));
      }
      buffer.extend_from_slice(&chunk);
    }

    let value =
      String::from_utf8(buffer).map_err(|_| AppError::Validation(format!("Field '{}' is not valid UTF-8", name)))?;
    submission.set(&name, value);
  }

  Ok(submission)
}

#[instrument(name = "handler::add_product", skip(app_state, session, payload), fields(session_expires_at = %session.record.expires_at))]
pub async fn add_product_handler(
  app_state: web::Data<AppState>,
  session: AdminSession,
  payload: Multipart,
) -> Result<HttpResponse, AppError> {
  let submission = collect_submission(payload).await?;
  let product = ingestion::create_product(&app_state.db_pool, app_state.config.db_timeout, &submission).await?;

  info!("Admin created product {}.", product.id);

  Ok(HttpResponse::Created().json(json!({
      "message": "Product created successfully",
      "product": product,
  })))
}
