//! Platform users, as far as engagement reporting needs to know them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A platform member. Only the public profile fields and the free-text
/// location are carried; everything else about a user lives elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub user_id:    Uuid,
  pub username:   String,
  pub full_name:  String,
  pub avatar:     Option<String>,
  /// Comma-separated, most specific segment first
  /// (e.g. `"Vilnius, Vilnius County, Lithuania"`).
  pub location:   Option<String>,
  pub created_at: DateTime<Utc>,
}

impl User {
  /// The most general segment of [`User::location`], treated as the
  /// country. `None` if the location is absent or has no non-empty segment.
  pub fn country(&self) -> Option<&str> {
    self
      .location
      .as_deref()?
      .split(',')
      .map(str::trim)
      .rfind(|segment| !segment.is_empty())
  }
}

/// The public snapshot of a user embedded in activity items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
  pub id:        Uuid,
  pub username:  String,
  pub full_name: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub avatar:    Option<String>,
}

impl From<&User> for UserSummary {
  fn from(user: &User) -> Self {
    Self {
      id:        user.user_id,
      username:  user.username.clone(),
      full_name: user.full_name.clone(),
      avatar:    user.avatar.clone(),
    }
  }
}

/// Input to [`crate::store::EngagementStore::add_user`].
/// `user_id` and `created_at` are assigned by the store.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
  pub username:  String,
  pub full_name: String,
  #[serde(default)]
  pub avatar:    Option<String>,
  #[serde(default)]
  pub location:  Option<String>,
}

impl NewUser {
  /// Convenience constructor with no avatar and no location.
  pub fn new(username: impl Into<String>, full_name: impl Into<String>) -> Self {
    Self {
      username:  username.into(),
      full_name: full_name.into(),
      avatar:    None,
      location:  None,
    }
  }

  pub fn with_location(mut self, location: impl Into<String>) -> Self {
    self.location = Some(location.into());
    self
  }
}
