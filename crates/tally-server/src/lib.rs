//! HTTP server wiring for Tally: configuration and the top-level router.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::{Json, Router, routing::get};
use chrono::FixedOffset;
use serde::Deserialize;
use serde_json::{Value, json};
use tally_core::store::EngagementStore;
use thiserror::Error;
use tower_http::trace::TraceLayer;

/// Largest UTC offset accepted for local time, in minutes.
pub const MAX_OFFSET_MINUTES: i32 = 18 * 60;

// ─── Configuration ────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to load configuration: {0}")]
  Load(#[from] config::ConfigError),

  #[error("utc_offset_minutes {0} is outside ±1080")]
  OffsetOutOfRange(i32),
}

/// Runtime server configuration, deserialised from `config.toml` and
/// `TALLY_*` environment variables.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
  pub host:               String,
  pub port:               u16,
  pub store_path:         PathBuf,
  /// Local time for hour-of-day insights and daily buckets.
  pub utc_offset_minutes: i32,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:               "127.0.0.1".to_string(),
      port:               8080,
      store_path:         PathBuf::from("tally.db"),
      utc_offset_minutes: 0,
    }
  }
}

impl ServerConfig {
  /// Layer the optional TOML file at `path` under `TALLY_*` environment
  /// variables.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("TALLY").try_parsing(true))
      .build()?;
    Ok(settings.try_deserialize()?)
  }

  /// The configured local offset, validated.
  pub fn offset(&self) -> Result<FixedOffset, ConfigError> {
    let minutes = self.utc_offset_minutes;
    if minutes.abs() > MAX_OFFSET_MINUTES {
      return Err(ConfigError::OffsetOutOfRange(minutes));
    }
    FixedOffset::east_opt(minutes * 60).ok_or(ConfigError::OffsetOutOfRange(minutes))
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Router ───────────────────────────────────────────────────────────────────

async fn health() -> Json<Value> { Json(json!({ "status": "ok" })) }

/// The full application: `/health` plus the JSON API under `/api`, traced.
pub fn app<S>(store: Arc<S>, offset: FixedOffset) -> Router
where
  S: EngagementStore + 'static,
{
  Router::new()
    .route("/health", get(health))
    .nest("/api", tally_api::api_router(store, offset))
    .layer(TraceLayer::new_for_http())
}

// ─── Tests ────────────────────────────────────────────────────────────────────
