// src/web/extractors.rs

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::errors::AppError;
use crate::models::session::AdminSessionRecord;
use crate::services::auth_service;
use crate::state::AppState;

/// Extractor guarding admin-path handlers. Resolves only when the request
/// carries a bearer token matching an unexpired server-issued session.
#[derive(Debug)]
pub struct AdminSession {
  pub record: AdminSessionRecord,
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
  req
    .headers()
    .get(header::AUTHORIZATION)?
    .to_str()
    .ok()?
    .strip_prefix("Bearer ")
    .map(str::trim)
    .filter(|t| !t.is_empty())
}

impl FromRequest for AdminSession {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let state = req.app_data::<web::Data<AppState>>().cloned();
    let token = bearer_token(req).map(str::to_owned);

    Box::pin(async move {
      let state = state.ok_or_else(|| AppError::Internal("Application state is not configured.".to_string()))?;
      let Some(token) = token else {
        warn!("AdminSession extractor: missing or malformed Authorization header.");
        return Err(AppError::Auth(
          "Admin authorization required. Provide a bearer session token.".to_string(),
        ));
      };
      let record = auth_service::validate_session(&state.db_pool, state.config.db_timeout, &token).await?;
      Ok(AdminSession { record })
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use actix_web::test::TestRequest;

  #[test]
  fn bearer_token_strips_the_scheme() {
    let req = TestRequest::default()
      .insert_header((header::AUTHORIZATION, "Bearer abc-123"))
      .to_http_request();
    assert_eq!(bearer_token(&req), Some("abc-123"));
  }

  #[test]
  fn non_bearer_and_empty_headers_yield_nothing() {
    let req = TestRequest::default()
      .insert_header((header::AUTHORIZATION, "Basic dXNlcjpwYXNz"))
      .to_http_request();
    assert_eq!(bearer_token(&req), None);

    let req = TestRequest::default()
      .insert_header((header::AUTHORIZATION, "Bearer "))
      .to_http_request();
    assert_eq!(bearer_token(&req), None);

    let req = TestRequest::default().to_http_request();
    assert_eq!(bearer_token(&req), None);
  }
}
