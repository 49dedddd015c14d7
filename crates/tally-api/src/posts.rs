//! Handlers for `/posts` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/posts` | Body: [`NewPost`]; a share when `shared_from_post_id` is set |
//! | `GET`    | `/posts/:id` | 404 if missing or deleted |
//! | `DELETE` | `/posts/:id` | Soft delete; 204 |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use tally_core::{
  post::{NewPost, Post},
  store::EngagementStore,
};
use uuid::Uuid;

use crate::error::ApiError;

/// Fetch a post that exists and has not been deleted.
pub(crate) async fn live_post<S>(store: &S, id: Uuid) -> Result<Post, ApiError>
where
  S: EngagementStore,
{
  store
    .get_post(id)
    .await
    .map_err(ApiError::store)?
    .filter(|p| !p.is_deleted())
    .ok_or_else(|| ApiError::NotFound(format!("post {id} not found")))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /posts` — returns 201 + the stored post.
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewPost>,
) -> Result<impl IntoResponse, ApiError>
where
  S: EngagementStore,
{
  let author = store
    .get_user(body.author_id)
    .await
    .map_err(ApiError::store)?;
  if author.is_none() {
    return Err(ApiError::BadRequest(format!(
      "author {} does not exist",
      body.author_id
    )));
  }

  if let Some(original) = body.shared_from_post_id {
    live_post(store.as_ref(), original).await.map_err(|e| match e {
      ApiError::NotFound(_) => {
        ApiError::BadRequest(format!("shared post {original} does not exist"))
      }
      other => other,
    })?;
  }

  let post = store
    .create_post(body)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(post_id = %post.post_id, share = post.shared_from_post_id.is_some(), "post created");
  Ok((StatusCode::CREATED, Json(post)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /posts/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Post>, ApiError>
where
  S: EngagementStore,
{
  Ok(Json(live_post(store.as_ref(), id).await?))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /posts/:id` — idempotent for posts that were already deleted.
pub async fn delete_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: EngagementStore,
{
  store
    .soft_delete_post(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("post {id} not found")))?;
  tracing::info!(post_id = %id, "post deleted");
  Ok(StatusCode::NO_CONTENT)
}
