//! Storage Layer
//!
//! In-memory repository for readings and trips with bounded retention,
//! plus CSV export and summary statistics. The protocol core treats writes
//! as fire-and-forget; the only ordering promise is that a saved reading is
//! visible to the next query.

mod export;
mod repository;
mod stats;

pub use export::CSV_HEADER;
pub use repository::{Repository, StoredReading};
pub use stats::Statistics;

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// A lock was poisoned by a panicking writer
    #[error("storage lock poisoned")]
    LockPoisoned,
    /// The requested record does not exist
    #[error("record not found")]
    NotFound,
}
