//! Core patch-statistics processing modules

pub mod partition;
pub mod period;
pub mod difference;
pub mod statistics;
pub mod series;
pub mod merge;

// Re-export main types
pub use partition::{PatchPartitioner, PartitionParams, Patch, PatchBounds};
pub use period::{PeriodIdentifier, SeriesKey};
pub use difference::{difference, normalize};
pub use statistics::{StatisticReducer, StatisticSet, StatFn, DEFAULT_STATISTICS};
pub use series::{SeriesLoader, SeriesParams, SeriesEntry, lag_predecessor};
pub use merge::merge;
