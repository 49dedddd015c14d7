//! Posts and the engagement events recorded against them.
//!
//! All of these are plain value records. The aggregation pipeline reads them
//! and never mutates them; writes go through the store.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reaction kind → users who reacted with it.
///
/// Kinds are free-form (`"like"`, `"love"`, `"paw"`, ...). A kind may be
/// present with no reactor list at all, which counts as zero reactors.
pub type ReactionMap = BTreeMap<String, Option<Vec<Uuid>>>;

// ─── Post ────────────────────────────────────────────────────────────────────

/// A content item. A post whose `shared_from_post_id` is set is a *share*
/// (repost) of that other post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
  pub post_id:             Uuid,
  pub author_id:           Uuid,
  pub title:               Option<String>,
  pub content:             String,
  pub created_at:          DateTime<Utc>,
  pub reactions:           Option<ReactionMap>,
  pub shared_from_post_id: Option<Uuid>,
  /// Caption the sharer wrote when reposting.
  pub shared_comment:      Option<String>,
  /// Soft-deletion marker.
  pub deleted_at:          Option<DateTime<Utc>>,
}

impl Post {
  pub fn is_deleted(&self) -> bool { self.deleted_at.is_some() }

  pub fn is_share_of(&self, post_id: Uuid) -> bool {
    self.shared_from_post_id == Some(post_id)
  }

  /// Preview text for this post when it appears as a share: the caption,
  /// then the title, then the body. Empty strings are skipped.
  pub fn share_preview_source(&self) -> &str {
    [self.shared_comment.as_deref(), self.title.as_deref()]
      .into_iter()
      .flatten()
      .find(|s| !s.is_empty())
      .unwrap_or(&self.content)
  }
}

/// Input to [`crate::store::EngagementStore::create_post`].
/// `post_id` and `created_at` are always set by the store.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPost {
  pub author_id:           Uuid,
  #[serde(default)]
  pub title:               Option<String>,
  #[serde(default)]
  pub content:             String,
  #[serde(default)]
  pub shared_from_post_id: Option<Uuid>,
  #[serde(default)]
  pub shared_comment:      Option<String>,
}

impl NewPost {
  pub fn new(author_id: Uuid, content: impl Into<String>) -> Self {
    Self {
      author_id,
      title: None,
      content: content.into(),
      shared_from_post_id: None,
      shared_comment: None,
    }
  }

  /// A repost of `original` by `author_id`, optionally with a caption.
  pub fn share(author_id: Uuid, original: Uuid, caption: Option<String>) -> Self {
    Self {
      author_id,
      title: None,
      content: String::new(),
      shared_from_post_id: Some(original),
      shared_comment: caption,
    }
  }
}

// ─── Comment ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
  pub comment_id: Uuid,
  pub post_id:    Uuid,
  pub user_id:    Uuid,
  pub content:    String,
  pub created_at: DateTime<Utc>,
}

/// Input to [`crate::store::EngagementStore::add_comment`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewComment {
  pub post_id: Uuid,
  pub user_id: Uuid,
  pub content: String,
}

// ─── Views ───────────────────────────────────────────────────────────────────

/// One view of a post. A user viewing the same post twice produces two
/// events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewEvent {
  pub view_id:   Uuid,
  pub post_id:   Uuid,
  pub user_id:   Uuid,
  pub viewed_at: DateTime<Utc>,
}
