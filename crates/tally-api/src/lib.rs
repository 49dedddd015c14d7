//! JSON REST API for Tally.
//!
//! Exposes an axum [`Router`] backed by any
//! [`tally_core::store::EngagementStore`]. Auth, TLS, and transport concerns
//! are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", tally_api::api_router(store.clone(), offset))
//! ```

pub mod engagement;
pub mod error;
pub mod interactions;
pub mod posts;
pub mod users;

use std::sync::Arc;

use axum::{
  Router,
  extract::FromRef,
  routing::{get, post, put},
};
use chrono::FixedOffset;
use tally_core::store::EngagementStore;

pub use error::ApiError;

// ─── State ───────────────────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct ApiState<S> {
  pub store:  Arc<S>,
  /// Local time used for hour-of-day insights and daily buckets.
  pub offset: FixedOffset,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), offset: self.offset }
  }
}

impl<S> FromRef<ApiState<S>> for Arc<S> {
  fn from_ref(state: &ApiState<S>) -> Self { Arc::clone(&state.store) }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>, offset: FixedOffset) -> Router<()>
where
  S: EngagementStore + 'static,
{
  Router::new()
    // Users
    .route("/users", post(users::create::<S>))
    .route("/users/{id}", get(users::get_one::<S>))
    // Posts
    .route("/posts", post(posts::create::<S>))
    .route("/posts/{id}", get(posts::get_one::<S>).delete(posts::delete_one::<S>))
    .route("/posts/{id}/engagement", get(engagement::report::<S>))
    // Interactions
    .route("/posts/{id}/comments", post(interactions::comment::<S>))
    .route("/posts/{id}/views", post(interactions::view::<S>))
    .route(
      "/posts/{id}/saves/{user_id}",
      put(interactions::save::<S>).delete(interactions::unsave::<S>),
    )
    .route(
      "/posts/{id}/reactions/{kind}/{user_id}",
      put(interactions::react::<S>).delete(interactions::unreact::<S>),
    )
    .with_state(ApiState { store, offset })
}
