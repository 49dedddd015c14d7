//! [`SqliteStore`] — the SQLite implementation of [`EngagementStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use tally_core::{
  post::{Comment, NewComment, NewPost, Post, ReactionMap, ViewEvent},
  store::EngagementStore,
  user::{NewUser, User},
};

use crate::{
  encode::{
    POST_COLUMNS, RawComment, RawPost, RawUser, RawView, USER_COLUMNS,
    decode_reactions, encode_dt, encode_reactions, encode_uuid,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Connection-side helpers ─────────────────────────────────────────────────

fn fetch_post(
  conn: &rusqlite::Connection,
  post_id: &str,
) -> rusqlite::Result<Option<RawPost>> {
  conn
    .query_row(
      &format!("SELECT {POST_COLUMNS} FROM posts WHERE post_id = ?1"),
      rusqlite::params![post_id],
      RawPost::from_row,
    )
    .optional()
}

fn row_exists(
  conn: &rusqlite::Connection,
  sql: &str,
  id: &str,
) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(sql, rusqlite::params![id], |_| Ok(()))
      .optional()?
      .is_some(),
  )
}

fn post_exists(conn: &rusqlite::Connection, post_id: &str) -> rusqlite::Result<bool> {
  row_exists(conn, "SELECT 1 FROM posts WHERE post_id = ?1", post_id)
}

fn user_exists(conn: &rusqlite::Connection, user_id: &str) -> rusqlite::Result<bool> {
  row_exists(conn, "SELECT 1 FROM users WHERE user_id = ?1", user_id)
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// An engagement store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Read-modify-write the reaction map of a post inside one transaction.
  async fn update_reactions<F>(&self, post_id: Uuid, edit: F) -> Result<Post>
  where
    F: FnOnce(&mut ReactionMap) + Send + 'static,
  {
    let id_str = encode_uuid(post_id);

    // The inner `Result` carries decode failures out of the closure.
    let outcome: Result<Option<RawPost>> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let current: Option<Option<String>> = tx
          .query_row(
            "SELECT reactions FROM posts WHERE post_id = ?1",
            rusqlite::params![id_str],
            |row| row.get(0),
          )
          .optional()?;
        let Some(current) = current else {
          return Ok(Ok(None));
        };

        let mut reactions = match current.as_deref().map(decode_reactions).transpose() {
          Ok(reactions) => reactions.unwrap_or_default(),
          Err(e) => return Ok(Err(e)),
        };
        edit(&mut reactions);
        let json = match encode_reactions(&reactions) {
          Ok(json) => json,
          Err(e) => return Ok(Err(e)),
        };

        tx.execute(
          "UPDATE posts SET reactions = ?2 WHERE post_id = ?1",
          rusqlite::params![id_str, json],
        )?;
        let raw = fetch_post(&tx, &id_str)?;
        tx.commit()?;
        Ok(Ok(raw))
      })
      .await?;

    outcome?
      .ok_or(Error::PostNotFound(post_id))?
      .into_post()
  }
}

// ─── EngagementStore impl ────────────────────────────────────────────────────

impl EngagementStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn add_user(&self, input: NewUser) -> Result<User> {
    let user = User {
      user_id:    Uuid::new_v4(),
      username:   input.username,
      full_name:  input.full_name,
      avatar:     input.avatar,
      location:   input.location,
      created_at: Utc::now(),
    };

    let id_str    = encode_uuid(user.user_id);
    let at_str    = encode_dt(user.created_at);
    let username  = user.username.clone();
    let full_name = user.full_name.clone();
    let avatar    = user.avatar.clone();
    let location  = user.location.clone();

    let inserted = self
      .conn
      .call(move |conn| {
        if row_exists(conn, "SELECT 1 FROM users WHERE username = ?1", &username)? {
          return Ok(false);
        }
        conn.execute(
          "INSERT INTO users (user_id, username, full_name, avatar, location, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, username, full_name, avatar, location, at_str],
        )?;
        Ok(true)
      })
      .await?;

    if !inserted {
      return Err(Error::UsernameTaken(user.username));
    }
    Ok(user)
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1"),
              rusqlite::params![id_str],
              RawUser::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn list_users(&self) -> Result<Vec<User>> {
    let raws: Vec<RawUser> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {USER_COLUMNS} FROM users ORDER BY created_at"
        ))?;
        let rows = stmt
          .query_map([], RawUser::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawUser::into_user).collect()
  }

  // ── Posts ─────────────────────────────────────────────────────────────────

  async fn create_post(&self, input: NewPost) -> Result<Post> {
    let post = Post {
      post_id:             Uuid::new_v4(),
      author_id:           input.author_id,
      title:               input.title,
      content:             input.content,
      created_at:          Utc::now(),
      reactions:           None,
      shared_from_post_id: input.shared_from_post_id,
      shared_comment:      input.shared_comment,
      deleted_at:          None,
    };

    let id_str         = encode_uuid(post.post_id);
    let author_id      = post.author_id;
    let author_str     = encode_uuid(author_id);
    let shared_from    = post.shared_from_post_id;
    let shared_str     = shared_from.map(encode_uuid);
    let at_str         = encode_dt(post.created_at);
    let title          = post.title.clone();
    let content        = post.content.clone();
    let shared_comment = post.shared_comment.clone();

    // `Err` names whichever referenced row is missing.
    let outcome: Result<()> = self
      .conn
      .call(move |conn| {
        if !user_exists(conn, &author_str)? {
          return Ok(Err(Error::UserNotFound(author_id)));
        }
        if let (Some(original), Some(original_str)) = (shared_from, &shared_str)
          && !post_exists(conn, original_str)?
        {
          return Ok(Err(Error::PostNotFound(original)));
        }
        conn.execute(
          "INSERT INTO posts (
             post_id, author_id, title, content, created_at,
             shared_from_post_id, shared_comment
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            id_str,
            author_str,
            title,
            content,
            at_str,
            shared_str,
            shared_comment,
          ],
        )?;
        Ok(Ok(()))
      })
      .await?;

    outcome?;
    Ok(post)
  }

  async fn get_post(&self, id: Uuid) -> Result<Option<Post>> {
    let id_str = encode_uuid(id);

    let raw = self
      .conn
      .call(move |conn| Ok(fetch_post(conn, &id_str)?))
      .await?;

    raw.map(RawPost::into_post).transpose()
  }

  async fn soft_delete_post(&self, id: Uuid) -> Result<Option<Post>> {
    let id_str = encode_uuid(id);
    let at_str = encode_dt(Utc::now());

    let raw = self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE posts SET deleted_at = COALESCE(deleted_at, ?2) WHERE post_id = ?1",
          rusqlite::params![id_str, at_str],
        )?;
        Ok(fetch_post(conn, &id_str)?)
      })
      .await?;

    raw.map(RawPost::into_post).transpose()
  }

  async fn shares_of_post(&self, id: Uuid) -> Result<Vec<Post>> {
    let id_str = encode_uuid(id);

    let raws: Vec<RawPost> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {POST_COLUMNS} FROM posts
           WHERE shared_from_post_id = ?1
           ORDER BY created_at"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], RawPost::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPost::into_post).collect()
  }

  // ── Reactions ─────────────────────────────────────────────────────────────

  async fn set_reaction(&self, post_id: Uuid, user_id: Uuid, kind: String) -> Result<Post> {
    self
      .update_reactions(post_id, move |reactions| {
        let reactors = reactions.entry(kind).or_default().get_or_insert_with(Vec::new);
        if !reactors.contains(&user_id) {
          reactors.push(user_id);
        }
      })
      .await
  }

  async fn remove_reaction(
    &self,
    post_id: Uuid,
    user_id: Uuid,
    kind: String,
  ) -> Result<Post> {
    self
      .update_reactions(post_id, move |reactions| {
        if let Some(Some(reactors)) = reactions.get_mut(&kind) {
          reactors.retain(|id| *id != user_id);
        }
      })
      .await
  }

  // ── Comments and views ────────────────────────────────────────────────────

  async fn add_comment(&self, input: NewComment) -> Result<Comment> {
    let comment = Comment {
      comment_id: Uuid::new_v4(),
      post_id:    input.post_id,
      user_id:    input.user_id,
      content:    input.content,
      created_at: Utc::now(),
    };

    let id_str      = encode_uuid(comment.comment_id);
    let post_id_str = encode_uuid(comment.post_id);
    let user_id_str = encode_uuid(comment.user_id);
    let content     = comment.content.clone();
    let at_str      = encode_dt(comment.created_at);

    let inserted = self
      .conn
      .call(move |conn| {
        if !post_exists(conn, &post_id_str)? {
          return Ok(false);
        }
        conn.execute(
          "INSERT INTO comments (comment_id, post_id, user_id, content, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, post_id_str, user_id_str, content, at_str],
        )?;
        Ok(true)
      })
      .await?;

    if !inserted {
      return Err(Error::PostNotFound(comment.post_id));
    }
    Ok(comment)
  }

  async fn comments_for_post(&self, id: Uuid) -> Result<Vec<Comment>> {
    let id_str = encode_uuid(id);

    let raws: Vec<RawComment> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT comment_id, post_id, user_id, content, created_at
           FROM comments WHERE post_id = ?1 ORDER BY created_at",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], RawComment::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawComment::into_comment).collect()
  }

  async fn record_view(&self, post_id: Uuid, user_id: Uuid) -> Result<ViewEvent> {
    let view = ViewEvent {
      view_id: Uuid::new_v4(),
      post_id,
      user_id,
      viewed_at: Utc::now(),
    };

    let id_str      = encode_uuid(view.view_id);
    let post_id_str = encode_uuid(post_id);
    let user_id_str = encode_uuid(user_id);
    let at_str      = encode_dt(view.viewed_at);

    let inserted = self
      .conn
      .call(move |conn| {
        if !post_exists(conn, &post_id_str)? {
          return Ok(false);
        }
        conn.execute(
          "INSERT INTO view_events (view_id, post_id, user_id, viewed_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, post_id_str, user_id_str, at_str],
        )?;
        Ok(true)
      })
      .await?;

    if !inserted {
      return Err(Error::PostNotFound(post_id));
    }
    Ok(view)
  }

  async fn views_for_post(&self, id: Uuid) -> Result<Vec<ViewEvent>> {
    let id_str = encode_uuid(id);

    let raws: Vec<RawView> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT view_id, post_id, user_id, viewed_at
           FROM view_events WHERE post_id = ?1 ORDER BY viewed_at",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], RawView::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawView::into_view).collect()
  }

  // ── Saves ─────────────────────────────────────────────────────────────────

  async fn save_post(&self, user_id: Uuid, post_id: Uuid) -> Result<bool> {
    let user_id_str = encode_uuid(user_id);
    let post_id_str = encode_uuid(post_id);
    let at_str      = encode_dt(Utc::now());

    // `Err` names whichever referenced row is missing.
    let outcome: Result<bool> = self
      .conn
      .call(move |conn| {
        if !user_exists(conn, &user_id_str)? {
          return Ok(Err(Error::UserNotFound(user_id)));
        }
        if !post_exists(conn, &post_id_str)? {
          return Ok(Err(Error::PostNotFound(post_id)));
        }
        let n = conn.execute(
          "INSERT OR IGNORE INTO saved_posts (user_id, post_id, saved_at)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![user_id_str, post_id_str, at_str],
        )?;
        Ok(Ok(n > 0))
      })
      .await?;

    outcome
  }

  async fn unsave_post(&self, user_id: Uuid, post_id: Uuid) -> Result<bool> {
    let user_id_str = encode_uuid(user_id);
    let post_id_str = encode_uuid(post_id);

    let n = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM saved_posts WHERE user_id = ?1 AND post_id = ?2",
          rusqlite::params![user_id_str, post_id_str],
        )?)
      })
      .await?;

    Ok(n > 0)
  }

  async fn is_post_saved(&self, user_id: Uuid, post_id: Uuid) -> Result<bool> {
    let user_id_str = encode_uuid(user_id);
    let post_id_str = encode_uuid(post_id);

    let saved = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM saved_posts WHERE user_id = ?1 AND post_id = ?2",
              rusqlite::params![user_id_str, post_id_str],
              |_| Ok(()),
            )
            .optional()?
            .is_some(),
        )
      })
      .await?;

    Ok(saved)
  }

  /// Counts savers with one query instead of probing every user. Only
  /// savers that are listed users count, as in the provided scan.
  async fn count_saves(&self, post_id: Uuid) -> Result<u64> {
    let post_id_str = encode_uuid(post_id);

    let n: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(DISTINCT s.user_id) FROM saved_posts s
           JOIN users u ON u.user_id = s.user_id
           WHERE s.post_id = ?1",
          rusqlite::params![post_id_str],
          |row| row.get(0),
        )?)
      })
      .await?;

    Ok(n.max(0) as u64)
  }
}
