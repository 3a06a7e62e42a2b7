//! Period and variable-category identification from grid file paths.
//!
//! File names follow `<MonthName>_<Year>.<ext>` and live two directories
//! below their category, e.g. `.../chlorophyll/monthly/March_2019.nc`
//! belongs to category `chlorophyll`.

use crate::types::{GridError, GridResult, MonthLocale, Period};
use std::cmp::Ordering;
use std::path::Path;

impl Period {
    /// Parse `MonthName_Year` using English month names
    pub fn parse(stem: &str) -> GridResult<Self> {
        Self::parse_with(stem, MonthLocale::English)
    }

    /// Parse `MonthName_Year` with the month names of `locale`
    pub fn parse_with(stem: &str, locale: MonthLocale) -> GridResult<Self> {
        let (month_name, year) = stem.split_once('_').ok_or_else(|| {
            GridError::Parse(format!("Expected MonthName_Year, got {:?}", stem))
        })?;

        let month = locale.month_number(month_name).ok_or_else(|| {
            GridError::Parse(format!("Unknown month name {:?} ({:?} locale)", month_name, locale))
        })?;

        if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
            return Err(GridError::Parse(format!("Invalid year {:?} in {:?}", year, stem)));
        }
        let year: i32 = year
            .parse()
            .map_err(|e| GridError::Parse(format!("Invalid year {:?}: {}", year, e)))?;

        Period::new(year, month)
    }
}

/// Period and category of one grid file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesKey {
    pub category: String,
    pub period: Period,
}

impl PartialOrd for SeriesKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SeriesKey {
    /// Category first, then chronological
    fn cmp(&self, other: &Self) -> Ordering {
        self.category
            .cmp(&other.category)
            .then(self.period.cmp(&other.period))
    }
}

/// Derives period and category keys from file paths
#[derive(Debug, Clone, Copy, Default)]
pub struct PeriodIdentifier {
    locale: MonthLocale,
}

impl PeriodIdentifier {
    pub fn new(locale: MonthLocale) -> Self {
        Self { locale }
    }

    /// Period parsed from the file name without its extension
    pub fn period<P: AsRef<Path>>(&self, path: P) -> GridResult<Period> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| GridError::Parse(format!("No file name in {}", path.display())))?;
        // Everything after the first dot is extension
        let stem = file_name.split('.').next().unwrap_or(file_name);
        Period::parse_with(stem, self.locale)
    }

    /// Category taken from the second-from-last directory of the path
    pub fn category<P: AsRef<Path>>(&self, path: P) -> GridResult<String> {
        let path = path.as_ref();
        let dirs: Vec<&str> = path
            .parent()
            .map(|p| {
                p.components()
                    .filter_map(|c| match c {
                        std::path::Component::Normal(s) => s.to_str(),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default();

        if dirs.len() < 2 {
            return Err(GridError::Parse(format!(
                "Path {} is too shallow to contain a category directory",
                path.display()
            )));
        }
        Ok(dirs[dirs.len() - 2].to_string())
    }

    /// Both keys of a file; also its position in a sorted series
    pub fn identify<P: AsRef<Path>>(&self, path: P) -> GridResult<SeriesKey> {
        let path = path.as_ref();
        Ok(SeriesKey {
            category: self.category(path)?,
            period: self.period(path)?,
        })
    }
}
