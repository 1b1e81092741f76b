// src/models/session.rs

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// A server-issued admin capability. The token is opaque to the client;
/// the service checks it against unexpired rows on every admin request.
#[derive(Debug, Clone, FromRow)]
pub struct AdminSessionRecord {
  pub token: Uuid,
  pub created_at: DateTime<Utc>,
  pub expires_at: DateTime<Utc>,
}
