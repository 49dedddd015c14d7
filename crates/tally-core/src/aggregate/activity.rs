//! Recent activity feed: comments, shares and views merged into one
//! reverse-chronological list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  directory::UserDirectory,
  post::{Comment, Post, ViewEvent},
  user::UserSummary,
};

/// Maximum number of items in the feed.
pub const RECENT_ACTIVITY_LIMIT: usize = 20;

/// Maximum preview length, in characters.
pub const PREVIEW_CHARS: usize = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
  Comment,
  Repost,
  View,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityItem {
  #[serde(rename = "type")]
  pub kind:      ActivityKind,
  pub timestamp: DateTime<Utc>,
  /// `None` when the acting user cannot be resolved; serialised as `null`.
  pub user:      Option<UserSummary>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub preview:   Option<String>,
}

fn preview(text: &str) -> String { text.chars().take(PREVIEW_CHARS).collect() }

/// Merge all three event sources, newest first, keeping the
/// [`RECENT_ACTIVITY_LIMIT`] most recent overall.
pub fn merge_recent_activity(
  comments: &[Comment],
  shares: &[Post],
  views: &[ViewEvent],
  users: &UserDirectory,
) -> Vec<ActivityItem> {
  let comment_items = comments.iter().map(|c| ActivityItem {
    kind:      ActivityKind::Comment,
    timestamp: c.created_at,
    user:      users.summary(c.user_id),
    preview:   Some(preview(&c.content)),
  });
  let share_items = shares.iter().map(|s| ActivityItem {
    kind:      ActivityKind::Repost,
    timestamp: s.created_at,
    user:      users.summary(s.author_id),
    preview:   Some(preview(s.share_preview_source())),
  });
  let view_items = views.iter().map(|v| ActivityItem {
    kind:      ActivityKind::View,
    timestamp: v.viewed_at,
    user:      users.summary(v.user_id),
    preview:   None,
  });

  let mut items: Vec<ActivityItem> =
    comment_items.chain(share_items).chain(view_items).collect();

  // The cap applies across all three sources, so sort first.
  items.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
  items.truncate(RECENT_ACTIVITY_LIMIT);
  items
}

#[cfg(test)]
mod tests {
  use chrono::{Duration, TimeZone};
  use uuid::Uuid;

  use super::*;
  use crate::user::User;

  fn base() -> DateTime<Utc> { Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap() }

  fn user(name: &str) -> User {
    User {
      user_id:    Uuid::new_v4(),
      username:   name.into(),
      full_name:  name.to_uppercase(),
      avatar:     Some(format!("/avatars/{name}.png")),
      location:   None,
      created_at: base(),
    }
  }

  fn comment(post_id: Uuid, user_id: Uuid, content: &str, minutes: i64) -> Comment {
    Comment {
      comment_id: Uuid::new_v4(),
      post_id,
      user_id,
      content: content.into(),
      created_at: base() + Duration::minutes(minutes),
    }
  }

  fn view(post_id: Uuid, user_id: Uuid, minutes: i64) -> ViewEvent {
    ViewEvent {
      view_id:   Uuid::new_v4(),
      post_id,
      user_id,
      viewed_at: base() + Duration::minutes(minutes),
    }
  }

  fn share(original: Uuid, author_id: Uuid, caption: Option<&str>, minutes: i64) -> Post {
    Post {
      post_id:             Uuid::new_v4(),
      author_id,
      title:               Some("Shared title".into()),
      content:             "Shared body".into(),
      created_at:          base() + Duration::minutes(minutes),
      reactions:           None,
      shared_from_post_id: Some(original),
      shared_comment:      caption.map(str::to_owned),
      deleted_at:          None,
    }
  }

  #[test]
  fn merges_sources_newest_first() {
    let post_id = Uuid::new_v4();
    let alice = user("alice");
    let users: UserDirectory = [alice.clone()].into_iter().collect();

    let items = merge_recent_activity(
      &[comment(post_id, alice.user_id, "good dog", 5)],
      &[share(post_id, alice.user_id, Some("so cute"), 10)],
      &[view(post_id, alice.user_id, 1)],
      &users,
    );

    let kinds: Vec<_> = items.iter().map(|i| i.kind).collect();
    assert_eq!(kinds, [ActivityKind::Repost, ActivityKind::Comment, ActivityKind::View]);
    assert_eq!(items[0].preview.as_deref(), Some("so cute"));
    assert_eq!(items[1].preview.as_deref(), Some("good dog"));
    assert_eq!(items[2].preview, None);
    assert_eq!(items[0].user.as_ref().map(|u| u.id), Some(alice.user_id));
  }

  #[test]
  fn cap_applies_after_sorting_all_sources() {
    let post_id = Uuid::new_v4();
    let viewer = Uuid::new_v4();
    // 25 old views, then 3 recent comments: the comments must survive.
    let views: Vec<_> = (0..25).map(|m| view(post_id, viewer, m)).collect();
    let comments: Vec<_> =
      (100..103).map(|m| comment(post_id, viewer, "late", m)).collect();

    let items = merge_recent_activity(&comments, &[], &views, &UserDirectory::default());

    assert_eq!(items.len(), RECENT_ACTIVITY_LIMIT);
    assert!(items[..3].iter().all(|i| i.kind == ActivityKind::Comment));
    assert!(items.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
    // The oldest five views are the ones dropped.
    assert_eq!(items.last().map(|i| i.timestamp), Some(base() + Duration::minutes(8)));
  }

  #[test]
  fn unknown_user_yields_null_user_but_keeps_preview() {
    let post_id = Uuid::new_v4();
    let items = merge_recent_activity(
      &[comment(post_id, Uuid::new_v4(), "who am i", 0)],
      &[],
      &[],
      &UserDirectory::default(),
    );

    assert_eq!(items.len(), 1);
    assert!(items[0].user.is_none());
    assert_eq!(items[0].preview.as_deref(), Some("who am i"));

    let json = serde_json::to_value(&items[0]).unwrap();
    assert!(json["user"].is_null());
    assert_eq!(json["type"], "comment");
  }

  #[test]
  fn preview_truncates_by_characters() {
    let post_id = Uuid::new_v4();
    let long = "šuo".repeat(100);
    let items = merge_recent_activity(
      &[comment(post_id, Uuid::new_v4(), &long, 0)],
      &[],
      &[],
      &UserDirectory::default(),
    );

    let preview = items[0].preview.as_deref().unwrap();
    assert_eq!(preview.chars().count(), PREVIEW_CHARS);
    assert!(long.starts_with(preview));
  }

  #[test]
  fn share_preview_falls_back_to_title() {
    let post_id = Uuid::new_v4();
    let items = merge_recent_activity(
      &[],
      &[share(post_id, Uuid::new_v4(), None, 0)],
      &[],
      &UserDirectory::default(),
    );
    assert_eq!(items[0].preview.as_deref(), Some("Shared title"));
  }
}
