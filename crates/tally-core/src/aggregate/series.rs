//! Engagement over time, bucketed hourly or daily.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

/// Posts at most this many hours old are bucketed hourly; older posts daily.
pub const HOURLY_WINDOW_HOURS: i64 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
  Hourly,
  Daily,
}

impl Granularity {
  /// Choose the bucket width for a post created at `created_at`, as seen at
  /// `now`.
  pub fn for_age(created_at: DateTime<Utc>, now: DateTime<Utc>) -> Self {
    if now - created_at <= Duration::hours(HOURLY_WINDOW_HOURS) {
      Self::Hourly
    } else {
      Self::Daily
    }
  }

  pub fn width(self) -> Duration {
    match self {
      Self::Hourly => Duration::hours(1),
      Self::Daily => Duration::days(1),
    }
  }

  /// Start of the bucket containing `ts`: the top of the hour, or local
  /// midnight in `offset`.
  pub fn floor(self, ts: DateTime<Utc>, offset: FixedOffset) -> DateTime<Utc> {
    let local_secs = ts.timestamp() + i64::from(offset.local_minus_utc());
    let into_bucket = local_secs.rem_euclid(self.width().num_seconds());
    ts - Duration::seconds(into_bucket)
      - Duration::nanoseconds(i64::from(ts.timestamp_subsec_nanos()))
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesBucket {
  pub bucket_start: DateTime<Utc>,
  pub views:        u64,
  pub comments:     u64,
  pub shares:       u64,
  pub total:        u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSeries {
  pub granularity: Granularity,
  pub series:      Vec<SeriesBucket>,
}

#[derive(Debug, Default, Clone, Copy)]
struct Counts {
  views:    u64,
  comments: u64,
  shares:   u64,
}

/// Bucket every view, comment and share timestamp between the post's
/// creation and `now`.
///
/// Every bucket in the range is present, zero-filled if idle. Events that
/// land outside the range (clock skew) are dropped. A post created after
/// `now` produces an empty series.
pub fn build_time_series(
  created_at: DateTime<Utc>,
  now: DateTime<Utc>,
  views: &[DateTime<Utc>],
  comments: &[DateTime<Utc>],
  shares: &[DateTime<Utc>],
  offset: FixedOffset,
) -> TimeSeries {
  let granularity = Granularity::for_age(created_at, now);
  let step = granularity.width();

  let mut buckets = BTreeMap::new();
  let mut cursor = granularity.floor(created_at, offset);
  while cursor <= now {
    buckets.insert(cursor, Counts::default());
    cursor += step;
  }

  let bucket_of = |ts: &DateTime<Utc>| granularity.floor(*ts, offset);
  for ts in views {
    if let Some(counts) = buckets.get_mut(&bucket_of(ts)) {
      counts.views += 1;
    }
  }
  for ts in comments {
    if let Some(counts) = buckets.get_mut(&bucket_of(ts)) {
      counts.comments += 1;
    }
  }
  for ts in shares {
    if let Some(counts) = buckets.get_mut(&bucket_of(ts)) {
      counts.shares += 1;
    }
  }

  let mut series: Vec<SeriesBucket> = buckets
    .into_iter()
    .map(|(bucket_start, c)| SeriesBucket {
      bucket_start,
      views: c.views,
      comments: c.comments,
      shares: c.shares,
      total: c.views + c.comments + c.shares,
    })
    .collect();
  series.sort_by_key(|b| b.bucket_start);

  TimeSeries { granularity, series }
}
