//! The pure aggregation components. None of these touch the store; each is
//! total over its inputs.

pub mod activity;
pub mod insights;
pub mod reactions;
pub mod series;

pub use activity::{ActivityItem, ActivityKind, merge_recent_activity};
pub use insights::{Geography, ViewerInsights, build_viewer_insights};
pub use reactions::tally_reactions;
pub use series::{Granularity, SeriesBucket, TimeSeries, build_time_series};
