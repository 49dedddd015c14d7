//! The engagement report and the [`Aggregator`] that builds it.
//!
//! The aggregator is the only entry point into the pipeline: it fetches a
//! post's engagement records from an [`EngagementStore`], runs each
//! component in [`crate::aggregate`] and assembles the result. The only
//! failure it introduces itself is [`Error::NotFound`].

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  aggregate::{
    ActivityItem, TimeSeries, ViewerInsights, build_time_series,
    build_viewer_insights, merge_recent_activity, tally_reactions,
  },
  directory::UserDirectory,
  store::EngagementStore,
};

// ─── Report ──────────────────────────────────────────────────────────────────

/// Lifetime engagement counts for one post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
  pub reactions: BTreeMap<String, u64>,
  pub comments:  u64,
  pub shares:    u64,
  pub saves:     u64,
  pub views:     u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementReport {
  pub totals:          Totals,
  pub recent_activity: Vec<ActivityItem>,
  /// Only present when the report was requested by the post's author. The
  /// field is left out of the JSON entirely otherwise.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub viewer_insights: Option<ViewerInsights>,
  pub time_series:     TimeSeries,
}

// ─── Aggregator ──────────────────────────────────────────────────────────────

/// Builds [`EngagementReport`]s from a store.
///
/// Holds no state between calls; every report is computed from freshly
/// fetched records.
pub struct Aggregator<'a, S> {
  store:  &'a S,
  offset: FixedOffset,
}

impl<'a, S: EngagementStore> Aggregator<'a, S> {
  /// An aggregator that reports hours and days in UTC.
  pub fn new(store: &'a S) -> Self { Self { store, offset: Utc.fix() } }

  /// Use `offset` as local time for hour-of-day insights and daily bucket
  /// boundaries.
  pub fn with_offset(mut self, offset: FixedOffset) -> Self {
    self.offset = offset;
    self
  }

  /// Build the report for `post_id` as of now.
  pub async fn aggregate(
    &self,
    post_id: Uuid,
    viewer_id: Option<Uuid>,
  ) -> Result<EngagementReport> {
    self.aggregate_at(post_id, viewer_id, Utc::now()).await
  }

  /// Build the report for `post_id` as of `now`.
  ///
  /// Viewer insights are computed only when `viewer_id` is the post's
  /// author.
  pub async fn aggregate_at(
    &self,
    post_id: Uuid,
    viewer_id: Option<Uuid>,
    now: DateTime<Utc>,
  ) -> Result<EngagementReport> {
    let post = self
      .store
      .get_post(post_id)
      .await
      .map_err(Error::store)?
      .filter(|p| !p.is_deleted())
      .ok_or(Error::NotFound(post_id))?;

    let (comments, shares, views, users, saves) = tokio::try_join!(
      self.store.comments_for_post(post_id),
      self.store.shares_of_post(post_id),
      self.store.views_for_post(post_id),
      self.store.list_users(),
      self.store.count_saves(post_id),
    )
    .map_err(Error::store)?;
    let users: UserDirectory = users.into_iter().collect();

    let totals = Totals {
      reactions: tally_reactions(post.reactions.as_ref()),
      comments:  comments.len() as u64,
      shares:    shares.len() as u64,
      saves,
      views:     views.len() as u64,
    };

    let recent_activity = merge_recent_activity(&comments, &shares, &views, &users);

    let viewer_insights = (viewer_id == Some(post.author_id)).then(|| {
      build_viewer_insights(&comments, &shares, &views, &users, self.offset)
    });

    let view_times: Vec<_> = views.iter().map(|v| v.viewed_at).collect();
    let comment_times: Vec<_> = comments.iter().map(|c| c.created_at).collect();
    let share_times: Vec<_> = shares.iter().map(|s| s.created_at).collect();
    let time_series = build_time_series(
      post.created_at,
      now,
      &view_times,
      &comment_times,
      &share_times,
      self.offset,
    );

    Ok(EngagementReport { totals, recent_activity, viewer_insights, time_series })
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
