//! Error types for `tally-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  /// The post does not exist or has been soft-deleted.
  #[error("post not found: {0}")]
  NotFound(Uuid),

  /// A collaborator failed to supply its data.
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub(crate) fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// ─── Store error classification ──────────────────────────────────────────────

/// Coarse category of a store failure, so callers can react to missing
/// records and uniqueness conflicts without knowing the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
  /// A referenced post or user does not exist.
  NotFound,
  /// The write would violate a uniqueness constraint.
  Conflict,
  Other,
}

/// Implemented by every [`crate::store::EngagementStore::Error`].
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  fn kind(&self) -> StoreErrorKind { StoreErrorKind::Other }
}

impl StoreError for std::convert::Infallible {}
