//! The `EngagementStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `tally-store-sqlite`).
//! The aggregation pipeline and the HTTP layer depend on this abstraction,
//! not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  error::StoreError,
  post::{Comment, NewComment, NewPost, Post, ViewEvent},
  user::{NewUser, User},
};

/// Abstraction over the content store that owns posts, users and their
/// engagement records.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait EngagementStore: Send + Sync {
  type Error: StoreError;

  // ── Users ─────────────────────────────────────────────────────────────

  fn add_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Retrieve a user by id. Returns `None` if not found.
  fn get_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Every user on the platform.
  fn list_users(
    &self,
  ) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + '_;

  // ── Posts ─────────────────────────────────────────────────────────────

  /// Create a post, or a share when `shared_from_post_id` is set.
  fn create_post(
    &self,
    input: NewPost,
  ) -> impl Future<Output = Result<Post, Self::Error>> + Send + '_;

  /// Retrieve a post by id, soft-deleted or not. Returns `None` if it was
  /// never created.
  fn get_post(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Post>, Self::Error>> + Send + '_;

  /// Mark a post deleted. Deleting an already-deleted post keeps the
  /// original deletion time. Returns `None` if the post does not exist.
  fn soft_delete_post(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Post>, Self::Error>> + Send + '_;

  /// Every post whose `shared_from_post_id` is `id`, including shares that
  /// were later soft-deleted.
  fn shares_of_post(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Vec<Post>, Self::Error>> + Send + '_;

  // ── Reactions ─────────────────────────────────────────────────────────

  /// Add `user_id` to the reactors of `kind`. A user appears at most once
  /// per kind. Returns the updated post.
  fn set_reaction(
    &self,
    post_id: Uuid,
    user_id: Uuid,
    kind: String,
  ) -> impl Future<Output = Result<Post, Self::Error>> + Send + '_;

  /// Remove `user_id` from the reactors of `kind`. The kind itself stays in
  /// the map, possibly with no reactors.
  fn remove_reaction(
    &self,
    post_id: Uuid,
    user_id: Uuid,
    kind: String,
  ) -> impl Future<Output = Result<Post, Self::Error>> + Send + '_;

  // ── Comments and views ────────────────────────────────────────────────

  fn add_comment(
    &self,
    input: NewComment,
  ) -> impl Future<Output = Result<Comment, Self::Error>> + Send + '_;

  fn comments_for_post(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Vec<Comment>, Self::Error>> + Send + '_;

  /// Record one view. The `viewed_at` timestamp is set by the store.
  fn record_view(
    &self,
    post_id: Uuid,
    user_id: Uuid,
  ) -> impl Future<Output = Result<ViewEvent, Self::Error>> + Send + '_;

  fn views_for_post(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Vec<ViewEvent>, Self::Error>> + Send + '_;

  // ── Saves ─────────────────────────────────────────────────────────────

  /// Returns `true` if the save was newly recorded. Fails if either the
  /// user or the post does not exist.
  fn save_post(
    &self,
    user_id: Uuid,
    post_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Returns `true` if a save existed and was removed.
  fn unsave_post(
    &self,
    user_id: Uuid,
    post_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn is_post_saved(
    &self,
    user_id: Uuid,
    post_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Number of distinct users who saved `post_id`.
  ///
  /// The provided implementation asks [`EngagementStore::is_post_saved`]
  /// for every user, which is O(users). Backends that can count directly
  /// may override it, provided savers that are not listed users are never
  /// counted.
  fn count_saves(
    &self,
    post_id: Uuid,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_ {
    async move {
      let mut saves = 0;
      for user in self.list_users().await? {
        if self.is_post_saved(user.user_id, post_id).await? {
          saves += 1;
        }
      }
      Ok(saves)
    }
  }
}
