//! Statistics over activity records.
//!
//! Rollups live in `aggregator`, goal and pacing math in `progress`, and
//! `summary` composes both into a single view.

pub mod aggregator;
pub mod progress;
pub mod summary;

pub use aggregator::*;
pub use progress::*;
pub use summary::{build_summary, SummaryRequest};
