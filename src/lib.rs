//! gridpatch: patch-level statistics from monthly gridded raster series
//!
//! Each grid is split into a near-square set of rectangular patches, every
//! patch is reduced to a handful of summary statistics, and the per-period
//! rows of feature and target variables are joined into one table keyed by
//! (period, block) for downstream modelling.

pub mod types;
pub mod config;
pub mod io;
pub mod core;
pub mod pipeline;

// Re-export main types and functions for easier access
pub use types::{
    Grid, GridError, GridResult, MonthLocale, Period, PeriodRow, RowKey, StatRow, StatTable,
};

pub use config::PipelineConfig;
pub use io::{GdalGridReader, GridReader};
pub use pipeline::Pipeline;
