//! Core types, the store trait and the engagement aggregation pipeline.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod aggregate;
pub mod directory;
pub mod error;
pub mod post;
pub mod report;
pub mod store;
pub mod user;

pub use error::{Error, Result, StoreError, StoreErrorKind};
pub use report::{Aggregator, EngagementReport, Totals};
