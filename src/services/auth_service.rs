// src/services/auth_service.rs

//! Admin authentication: argon2 password verification and server-issued
//! session tokens. The admin gate is a capability checked at the service
//! boundary, never a client-trusted flag.

use argon2::{
  password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
  Argon2,
};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use sqlx::PgPool;
use std::time::Duration;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use crate::errors::{AppError, Result};
use crate::models::session::AdminSessionRecord;
use crate::services::product_store::bounded;

/// Hashes a plain-text password using Argon2 with a random salt.
/// Used when provisioning the admin credential, and in tests.
#[instrument(name = "auth_service::hash_password", skip(password), err(Display))]
pub fn hash_password(password: &str) -> Result<String> {
  if password.is_empty() {
    return Err(AppError::Validation("Password cannot be empty for hashing.".to_string()));
  }

  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| {
      error!(error = %e, "Argon2 password hashing failed.");
      AppError::Internal(format!("Password hashing process failed: {}", e))
    })
}

/// Verifies a plain-text password against a stored Argon2 hash.
/// Returns `Ok(false)` on a mismatch; only malformed hashes or internal
/// verifier failures are errors.
#[instrument(name = "auth_service::verify_password", skip_all)]
pub fn verify_password(stored_hash: &str, provided_password: &str) -> Result<bool> {
  if provided_password.is_empty() {
    return Ok(false);
  }

  let parsed_hash = PasswordHash::new(stored_hash).map_err(|e| {
    error!(error = %e, "Failed to parse stored password hash string.");
    AppError::Internal(format!("Invalid stored password hash format: {}", e))
  })?;

  match Argon2::default().verify_password(provided_password.as_bytes(), &parsed_hash) {
    Ok(()) => Ok(true),
    Err(argon2::password_hash::Error::Password) => {
      debug!("Password verification failed: passwords do not match.");
      Ok(false)
    }
    Err(e) => {
      error!(error = %e, "Argon2 password verification process encountered an error.");
      Err(AppError::Internal(format!("Password verification process failed: {}", e)))
    }
  }
}

/// Issues a fresh opaque session token with the configured lifetime.
/// Expired rows are swept on this path so the table stays small without a
/// background job.
#[instrument(name = "auth_service::issue_session", skip(pool))]
pub async fn issue_session(pool: &PgPool, timeout: Duration, ttl_minutes: i64) -> Result<AdminSessionRecord> {
  let sweep = sqlx::query("DELETE FROM admin_sessions WHERE expires_at <= now()").execute(pool);
  bounded(timeout, sweep).await?;

  let token = Uuid::new_v4();
  let now = Utc::now();
  let expires_at = expiry_from(now, ttl_minutes);

  let insert = sqlx::query_as::<_, AdminSessionRecord>(
    "INSERT INTO admin_sessions (token, created_at, expires_at) VALUES ($1, $2, $3) \
     RETURNING token, created_at, expires_at",
  )
  .bind(token)
  .bind(now)
  .bind(expires_at)
  .fetch_one(pool);
  let record = bounded(timeout, insert).await?;

  info!("Issued admin session expiring at {}.", record.expires_at);
  Ok(record)
}

/// Checks a presented token against unexpired sessions. Missing and expired
/// tokens fail identically so the response does not reveal which.
#[instrument(name = "auth_service::validate_session", skip(pool, token))]
pub async fn validate_session(pool: &PgPool, timeout: Duration, token: &str) -> Result<AdminSessionRecord> {
  let token = Uuid::parse_str(token).map_err(|_| AppError::Auth("Invalid or expired session token.".to_string()))?;

  let lookup = sqlx::query_as::<_, AdminSessionRecord>(
    "SELECT token, created_at, expires_at FROM admin_sessions WHERE token = $1 AND expires_at > now()",
  )
  .bind(token)
  .fetch_optional(pool);
  let record = bounded(timeout, lookup).await?;

  record.ok_or_else(|| AppError::Auth("Invalid or expired session token.".to_string()))
}

/// Computes the expiry instant a token issued now would carry. Split out so
/// the arithmetic is testable without a database.
pub fn expiry_from(now: DateTime<Utc>, ttl_minutes: i64) -> DateTime<Utc> {
  now + ChronoDuration::minutes(ttl_minutes)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn hash_then_verify_round_trips() {
    let hash = hash_password("correct horse battery staple").unwrap();
    assert!(verify_password(&hash, "correct horse battery staple").unwrap());
    assert!(!verify_password(&hash, "wrong password").unwrap());
  }

  #[test]
  fn empty_password_never_verifies() {
    let hash = hash_password("something").unwrap();
    assert!(!verify_password(&hash, "").unwrap());
  }

  #[test]
  fn malformed_stored_hash_is_an_internal_error() {
    assert!(matches!(
      verify_password("not-a-phc-string", "whatever"),
      Err(AppError::Internal(_))
    ));
  }

  #[test]
  fn expiry_is_ttl_minutes_out() {
    let now = Utc::now();
    let expiry = expiry_from(now, 60);
    assert_eq!(expiry - now, ChronoDuration::minutes(60));
  }

  #[tokio::test]
  async fn session_lookup_resolves_within_the_query_bound() {
    // Nothing is listening behind this pool; the lookup must come back
    // (refused or timed out) rather than block past the bound.
    let pool = PgPool::connect_lazy("postgres://optika@127.0.0.1:1/optika").unwrap();
    let result = tokio::time::timeout(
      Duration::from_secs(2),
      validate_session(&pool, Duration::from_millis(50), &Uuid::new_v4().to_string()),
    )
    .await
    .expect("session lookup must respect the query bound");
    assert!(result.is_err());
  }
}
