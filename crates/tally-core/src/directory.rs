//! Per-call user lookup.

use std::collections::HashMap;

use uuid::Uuid;

use crate::user::{User, UserSummary};

/// Users indexed by id, built once from the store's user list and handed to
/// every component that needs to resolve an actor.
#[derive(Debug, Default)]
pub struct UserDirectory {
  by_id: HashMap<Uuid, User>,
}

impl UserDirectory {
  pub fn get(&self, id: Uuid) -> Option<&User> { self.by_id.get(&id) }

  /// The public snapshot of `id`, or `None` if no such user is known.
  pub fn summary(&self, id: Uuid) -> Option<UserSummary> {
    self.get(id).map(UserSummary::from)
  }
}

impl FromIterator<User> for UserDirectory {
  fn from_iter<I: IntoIterator<Item = User>>(iter: I) -> Self {
    Self {
      by_id: iter.into_iter().map(|u| (u.user_id, u)).collect(),
    }
  }
}
