//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as fixed-width RFC 3339 UTC strings so that
//! lexical order matches chronological order. Reaction maps are stored as
//! compact JSON. UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, SecondsFormat, Utc};
use tally_core::{
  post::{Comment, Post, ReactionMap, ViewEvent},
  user::User,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Reactions ────────────────────────────────────────────────────────────────

pub fn encode_reactions(reactions: &ReactionMap) -> Result<String> {
  Ok(serde_json::to_string(reactions)?)
}

pub fn decode_reactions(s: &str) -> Result<ReactionMap> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawUser::from_row`].
pub const USER_COLUMNS: &str =
  "user_id, username, full_name, avatar, location, created_at";

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:    String,
  pub username:   String,
  pub full_name:  String,
  pub avatar:     Option<String>,
  pub location:   Option<String>,
  pub created_at: String,
}

impl RawUser {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:    row.get(0)?,
      username:   row.get(1)?,
      full_name:  row.get(2)?,
      avatar:     row.get(3)?,
      location:   row.get(4)?,
      created_at: row.get(5)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:    decode_uuid(&self.user_id)?,
      username:   self.username,
      full_name:  self.full_name,
      avatar:     self.avatar,
      location:   self.location,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Column list matching [`RawPost::from_row`].
pub const POST_COLUMNS: &str = "post_id, author_id, title, content, created_at, \
   reactions, shared_from_post_id, shared_comment, deleted_at";

/// Raw strings read directly from a `posts` row.
pub struct RawPost {
  pub post_id:             String,
  pub author_id:           String,
  pub title:               Option<String>,
  pub content:             String,
  pub created_at:          String,
  pub reactions:           Option<String>,
  pub shared_from_post_id: Option<String>,
  pub shared_comment:      Option<String>,
  pub deleted_at:          Option<String>,
}

impl RawPost {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      post_id:             row.get(0)?,
      author_id:           row.get(1)?,
      title:               row.get(2)?,
      content:             row.get(3)?,
      created_at:          row.get(4)?,
      reactions:           row.get(5)?,
      shared_from_post_id: row.get(6)?,
      shared_comment:      row.get(7)?,
      deleted_at:          row.get(8)?,
    })
  }

  pub fn into_post(self) -> Result<Post> {
    Ok(Post {
      post_id:             decode_uuid(&self.post_id)?,
      author_id:           decode_uuid(&self.author_id)?,
      title:               self.title,
      content:             self.content,
      created_at:          decode_dt(&self.created_at)?,
      reactions:           self.reactions.as_deref().map(decode_reactions).transpose()?,
      shared_from_post_id: self
        .shared_from_post_id
        .as_deref()
        .map(decode_uuid)
        .transpose()?,
      shared_comment:      self.shared_comment,
      deleted_at:          self.deleted_at.as_deref().map(decode_dt).transpose()?,
    })
  }
}

/// Raw strings read directly from a `comments` row.
pub struct RawComment {
  pub comment_id: String,
  pub post_id:    String,
  pub user_id:    String,
  pub content:    String,
  pub created_at: String,
}

impl RawComment {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      comment_id: row.get(0)?,
      post_id:    row.get(1)?,
      user_id:    row.get(2)?,
      content:    row.get(3)?,
      created_at: row.get(4)?,
    })
  }

  pub fn into_comment(self) -> Result<Comment> {
    Ok(Comment {
      comment_id: decode_uuid(&self.comment_id)?,
      post_id:    decode_uuid(&self.post_id)?,
      user_id:    decode_uuid(&self.user_id)?,
      content:    self.content,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `view_events` row.
pub struct RawView {
  pub view_id:   String,
  pub post_id:   String,
  pub user_id:   String,
  pub viewed_at: String,
}

impl RawView {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      view_id:   row.get(0)?,
      post_id:   row.get(1)?,
      user_id:   row.get(2)?,
      viewed_at: row.get(3)?,
    })
  }

  pub fn into_view(self) -> Result<ViewEvent> {
    Ok(ViewEvent {
      view_id:   decode_uuid(&self.view_id)?,
      post_id:   decode_uuid(&self.post_id)?,
      user_id:   decode_uuid(&self.user_id)?,
      viewed_at: decode_dt(&self.viewed_at)?,
    })
  }
}
