//! I/O modules for reading grids, discovering series and exporting tables

pub mod grid_reader;
pub mod discovery;
pub mod export;

pub use grid_reader::{GridReader, GdalGridReader};
pub use discovery::discover;
pub use export::{finalize, write_csv};
