use chrono::Month;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One time-stamped 2-D measurement array (rows x cols)
pub type Grid = Array2<f64>;

/// Composite key of every table row: (period, block index)
pub type RowKey = (Period, usize);

/// Month-name spelling used in grid file names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonthLocale {
    /// January, February, ...
    #[default]
    English,
    /// Janeiro, Fevereiro, ... (pt_BR)
    Portuguese,
}

const PORTUGUESE_MONTHS: [&str; 12] = [
    "Janeiro", "Fevereiro", "Março", "Abril", "Maio", "Junho",
    "Julho", "Agosto", "Setembro", "Outubro", "Novembro", "Dezembro",
];

impl MonthLocale {
    /// Full month name for `month` (1-based)
    pub fn month_name(&self, month: u32) -> Option<&'static str> {
        if !(1..=12).contains(&month) {
            return None;
        }
        match self {
            MonthLocale::English => Month::try_from(month as u8).ok().map(|m| m.name()),
            MonthLocale::Portuguese => Some(PORTUGUESE_MONTHS[month as usize - 1]),
        }
    }

    /// Month number (1-based) for an exact, case-sensitive month name
    pub fn month_number(&self, name: &str) -> Option<u32> {
        (1..=12).find(|&m| self.month_name(m) == Some(name))
    }
}

/// Calendar month + year. Ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    /// Four-digit calendar year (0000-9999) and month 1-12
    pub fn new(year: i32, month: u32) -> GridResult<Self> {
        if !(0..=9999).contains(&year) {
            return Err(GridError::Parse(format!("Year out of range: {}", year)));
        }
        if !(1..=12).contains(&month) {
            return Err(GridError::Parse(format!("Month out of range: {}", month)));
        }
        Ok(Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // First day of the month, the `date` column value
        write!(f, "{:04}-{:02}-01", self.year, self.month)
    }
}

/// Statistic values of one patch, before being keyed into a table
#[derive(Debug, Clone, PartialEq)]
pub struct StatRow {
    pub block: usize,
    /// (column name, value) in configured statistic order
    pub values: Vec<(String, f64)>,
}

/// A statistic row tagged with the period it was computed for
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodRow {
    pub period: Period,
    pub row: StatRow,
}

/// Table of per-(period, block) statistics with explicit nulls.
///
/// Rows are kept ordered by key (period, then block). Cells that were never
/// set hold `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatTable {
    columns: Vec<String>,
    rows: BTreeMap<RowKey, Vec<Option<f64>>>,
}

impl StatTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from collected rows in one pass.
    ///
    /// Columns appear in first-seen order. Rows sharing a key are combined;
    /// assigning the same column twice for one key is a `DuplicateRow` error.
    pub fn from_rows<I>(rows: I) -> GridResult<Self>
    where
        I: IntoIterator<Item = PeriodRow>,
    {
        let mut table = Self::new();
        for PeriodRow { period, row } in rows {
            for (column, value) in row.values {
                table.set((period, row.block), &column, Some(value))?;
            }
        }
        Ok(table)
    }

    /// Column names, excluding the `date` and `block` key columns
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &RowKey> {
        self.rows.keys()
    }

    /// Rows in key order, cells aligned with `columns()`
    pub fn rows(&self) -> impl Iterator<Item = (&RowKey, &[Option<f64>])> {
        self.rows.iter().map(|(k, v)| (k, v.as_slice()))
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell value; `None` when the row, column or value is missing
    pub fn get(&self, key: &RowKey, column: &str) -> Option<f64> {
        let idx = self.column_index(column)?;
        self.rows.get(key).and_then(|cells| cells[idx])
    }

    /// Add a column filled with nulls. No-op if it already exists.
    pub fn add_column(&mut self, name: &str) -> usize {
        if let Some(idx) = self.column_index(name) {
            return idx;
        }
        self.columns.push(name.to_string());
        for cells in self.rows.values_mut() {
            cells.push(None);
        }
        self.columns.len() - 1
    }

    /// Insert an all-null row for `key` if missing
    pub fn ensure_row(&mut self, key: RowKey) -> &mut Vec<Option<f64>> {
        let width = self.columns.len();
        self.rows.entry(key).or_insert_with(|| vec![None; width])
    }

    /// Set a cell, creating the row and column as needed
    pub fn set(&mut self, key: RowKey, column: &str, value: Option<f64>) -> GridResult<()> {
        let idx = self.add_column(column);
        let cells = self.ensure_row(key);
        if cells[idx].is_some() {
            return Err(GridError::DuplicateRow(format!(
                "Column {} already set for period {} block {}",
                column, key.0, key.1
            )));
        }
        cells[idx] = value;
        Ok(())
    }

    pub(crate) fn rows_mut(&mut self) -> &mut BTreeMap<RowKey, Vec<Option<f64>>> {
        &mut self.rows
    }
}

/// Error types for grid statistics processing
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Shape mismatch: current {current:?} vs previous {previous:?}")]
    ShapeMismatch {
        current: (usize, usize),
        previous: (usize, usize),
    },

    #[error("Read error: {0}")]
    Read(String),

    #[error("Degenerate partition: {0}")]
    DegeneratePartition(String),

    #[error("Duplicate row: {0}")]
    DuplicateRow(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),
}

/// Result type for grid statistics operations
pub type GridResult<T> = Result<T, GridError>;
