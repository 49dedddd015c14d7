//! Handler for `GET /posts/:id/engagement`.
//!
//! `viewer_id` (or `viewerId`) identifies the caller. Viewer insights are
//! included only when it names the post's author; an absent or empty
//! `viewer_id` is treated as an anonymous caller.

use axum::{
  Json,
  extract::{Path, Query, State},
};
use serde::Deserialize;
use tally_core::{Aggregator, EngagementReport, store::EngagementStore};
use uuid::Uuid;

use crate::{ApiState, error::ApiError};

#[derive(Debug, Deserialize, Default)]
pub struct ReportParams {
  #[serde(alias = "viewerId")]
  pub viewer_id: Option<String>,
}

impl ReportParams {
  fn viewer(&self) -> Result<Option<Uuid>, ApiError> {
    self
      .viewer_id
      .as_deref()
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .map(|s| {
        Uuid::parse_str(s)
          .map_err(|e| ApiError::BadRequest(format!("invalid viewer_id: {e}")))
      })
      .transpose()
  }
}

/// `GET /posts/:id/engagement[?viewer_id=<id>]`
pub async fn report<S>(
  State(state): State<ApiState<S>>,
  Path(post_id): Path<Uuid>,
  Query(params): Query<ReportParams>,
) -> Result<Json<EngagementReport>, ApiError>
where
  S: EngagementStore,
{
  let viewer_id = params.viewer()?;
  tracing::debug!(%post_id, ?viewer_id, "building engagement report");

  let report = Aggregator::new(state.store.as_ref())
    .with_offset(state.offset)
    .aggregate(post_id, viewer_id)
    .await?;
  Ok(Json(report))
}
