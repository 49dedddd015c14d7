//! Handlers that record engagement against a post.
//!
//! | Method          | Path | Notes |
//! |-----------------|------|-------|
//! | `POST`          | `/posts/:id/comments` | Body: `{"user_id":"…","content":"…"}`; 201 |
//! | `POST`          | `/posts/:id/views` | Body: `{"user_id":"…"}`; 201 |
//! | `PUT`, `DELETE` | `/posts/:id/saves/:user_id` | 204 |
//! | `PUT`, `DELETE` | `/posts/:id/reactions/:kind/:user_id` | Returns the updated post |
//!
//! Every endpoint answers 404 when the post is missing or deleted.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use tally_core::{
  post::{NewComment, Post},
  store::EngagementStore,
};
use uuid::Uuid;

use crate::{error::ApiError, posts::live_post};

// ─── Comments ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CommentBody {
  pub user_id: Uuid,
  pub content: String,
}

/// `POST /posts/:id/comments`
pub async fn comment<S>(
  State(store): State<Arc<S>>,
  Path(post_id): Path<Uuid>,
  Json(body): Json<CommentBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: EngagementStore,
{
  if body.content.trim().is_empty() {
    return Err(ApiError::BadRequest("comment must not be empty".into()));
  }
  live_post(store.as_ref(), post_id).await?;

  let comment = store
    .add_comment(NewComment { post_id, user_id: body.user_id, content: body.content })
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(comment)))
}

// ─── Views ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ViewBody {
  pub user_id: Uuid,
}

/// `POST /posts/:id/views`
pub async fn view<S>(
  State(store): State<Arc<S>>,
  Path(post_id): Path<Uuid>,
  Json(body): Json<ViewBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: EngagementStore,
{
  live_post(store.as_ref(), post_id).await?;

  let event = store
    .record_view(post_id, body.user_id)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(event)))
}

// ─── Saves ────────────────────────────────────────────────────────────────────

/// `PUT /posts/:id/saves/:user_id`
pub async fn save<S>(
  State(store): State<Arc<S>>,
  Path((post_id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError>
where
  S: EngagementStore,
{
  live_post(store.as_ref(), post_id).await?;
  store
    .save_post(user_id, post_id)
    .await
    .map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /posts/:id/saves/:user_id`
pub async fn unsave<S>(
  State(store): State<Arc<S>>,
  Path((post_id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError>
where
  S: EngagementStore,
{
  live_post(store.as_ref(), post_id).await?;
  store
    .unsave_post(user_id, post_id)
    .await
    .map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Reactions ────────────────────────────────────────────────────────────────

/// `PUT /posts/:id/reactions/:kind/:user_id`
pub async fn react<S>(
  State(store): State<Arc<S>>,
  Path((post_id, kind, user_id)): Path<(Uuid, String, Uuid)>,
) -> Result<Json<Post>, ApiError>
where
  S: EngagementStore,
{
  live_post(store.as_ref(), post_id).await?;
  let post = store
    .set_reaction(post_id, user_id, kind)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(post))
}

/// `DELETE /posts/:id/reactions/:kind/:user_id`
pub async fn unreact<S>(
  State(store): State<Arc<S>>,
  Path((post_id, kind, user_id)): Path<(Uuid, String, Uuid)>,
) -> Result<Json<Post>, ApiError>
where
  S: EngagementStore,
{
  live_post(store.as_ref(), post_id).await?;
  let post = store
    .remove_reaction(post_id, user_id, kind)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(post))
}
