// src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub database_url: String,

  /// Argon2 hash the admin login password is verified against.
  pub admin_password_hash: String,
  /// Lifetime of an issued admin session token, in minutes.
  pub session_ttl_minutes: i64,

  /// Upper bound on any single store query; expiry surfaces as a 500
  /// rather than a hung request.
  pub db_timeout: Duration,

  /// Run embedded migrations on startup.
  pub run_migrations: bool,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present

    let get_env = |var_name: &str| {
      env::var(var_name).map_err(|e| AppError::Config(format!("Missing environment variable '{}': {}", var_name, e)))
    };

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let server_port = get_env("SERVER_PORT")
      .unwrap_or_else(|_| "8080".to_string())
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;
    let database_url = get_env("DATABASE_URL")?;
    let admin_password_hash = get_env("ADMIN_PASSWORD_HASH")?;

    let session_ttl_minutes = get_env("SESSION_TTL_MINUTES")
      .unwrap_or_else(|_| "60".to_string())
      .parse::<i64>()
      .map_err(|e| AppError::Config(format!("Invalid SESSION_TTL_MINUTES: {}", e)))?;
    if session_ttl_minutes <= 0 {
      return Err(AppError::Config("SESSION_TTL_MINUTES must be positive".to_string()));
    }

    let db_timeout_secs = get_env("DB_TIMEOUT_SECS")
      .unwrap_or_else(|_| "5".to_string())
      .parse::<u64>()
      .map_err(|e| AppError::Config(format!("Invalid DB_TIMEOUT_SECS: {}", e)))?;

    let run_migrations = get_env("RUN_MIGRATIONS")
      .unwrap_or_else(|_| "false".to_string())
      .parse::<bool>()
      .map_err(|e| AppError::Config(format!("Invalid RUN_MIGRATIONS value: {}", e)))?;

    tracing::info!("Application configuration loaded successfully.");

    Ok(Self {
      server_host,
      server_port,
      database_url,
      admin_password_hash,
      session_ttl_minutes,
      db_timeout: Duration::from_secs(db_timeout_secs),
      run_migrations,
    })
  }
}
