//! Trip Statistics
//!
//! Folds a stream of decoded readings into per-trip summaries: distance,
//! average speed, maxima, and an end-of-trip fuel consumption estimate.

mod aggregator;
mod trip;

pub use aggregator::{TripAggregator, ASSUMED_TANK_CAPACITY_L};
pub use trip::Trip;
