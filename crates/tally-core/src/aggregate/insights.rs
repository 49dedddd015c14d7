//! Owner-only audience insights: where engaging users are and when they
//! engage.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, FixedOffset, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  directory::UserDirectory,
  post::{Comment, Post, ViewEvent},
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Geography {
  /// Country (last location segment) → number of distinct engaging users.
  pub country_counts: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerInsights {
  pub geography:        Geography,
  /// Engagement events per hour of day in the report's local offset.
  pub time_of_day:      [u64; 24],
  /// Referral tracking does not exist on the platform; always empty.
  pub referral_sources: BTreeMap<String, u64>,
}

/// Build insights from every comment, share and view of a post.
///
/// Geography counts each engaging user once; the hour histogram counts every
/// event. Users without a usable location are left out of the geography.
pub fn build_viewer_insights(
  comments: &[Comment],
  shares: &[Post],
  views: &[ViewEvent],
  users: &UserDirectory,
  offset: FixedOffset,
) -> ViewerInsights {
  let engaged: HashSet<_> = comments
    .iter()
    .map(|c| c.user_id)
    .chain(shares.iter().map(|s| s.author_id))
    .chain(views.iter().map(|v| v.user_id))
    .collect();

  let mut country_counts = BTreeMap::new();
  for country in engaged
    .into_iter()
    .filter_map(|id| users.get(id))
    .filter_map(|u| u.country())
  {
    *country_counts.entry(country.to_owned()).or_insert(0) += 1;
  }

  let timestamps = comments
    .iter()
    .map(|c| c.created_at)
    .chain(shares.iter().map(|s| s.created_at))
    .chain(views.iter().map(|v| v.viewed_at));

  ViewerInsights {
    geography:        Geography { country_counts },
    time_of_day:      hour_histogram(timestamps, offset),
    referral_sources: BTreeMap::new(),
  }
}

fn hour_histogram(
  timestamps: impl Iterator<Item = DateTime<Utc>>,
  offset: FixedOffset,
) -> [u64; 24] {
  let mut hours = [0; 24];
  for ts in timestamps {
    hours[ts.with_timezone(&offset).hour() as usize] += 1;
  }
  hours
}
