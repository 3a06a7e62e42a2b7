use crate::core::difference::{difference, normalize};
use crate::core::partition::PatchPartitioner;
use crate::core::period::{PeriodIdentifier, SeriesKey};
use crate::core::statistics::StatisticReducer;
use crate::io::grid_reader::GridReader;
use crate::types::{Grid, GridResult, MonthLocale, PeriodRow, StatTable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Series loading parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeriesParams {
    /// Difference each period against the preceding period of its category
    pub lag: bool,
    /// Month-name spelling in file names
    pub locale: MonthLocale,
}

impl Default for SeriesParams {
    fn default() -> Self {
        Self {
            lag: false,
            locale: MonthLocale::English,
        }
    }
}

/// A grid file with its series key
#[derive(Debug, Clone)]
pub struct SeriesEntry {
    pub key: SeriesKey,
    pub path: PathBuf,
}

/// Index of the entry `i` is differenced against in lag mode.
///
/// Only the immediately preceding sorted entry qualifies, and only when it
/// belongs to the same category. The first entry of every category has none.
pub fn lag_predecessor(entries: &[SeriesEntry], i: usize) -> Option<usize> {
    if i == 0 || i >= entries.len() {
        return None;
    }
    if entries[i - 1].key.category == entries[i].key.category {
        Some(i - 1)
    } else {
        None
    }
}

/// Most recently read grid, kept for lag differencing
struct PreviousGrid {
    index: usize,
    variable: String,
    grid: Grid,
}

/// Turns ordered grid file series into statistic tables
pub struct SeriesLoader<R: GridReader> {
    reader: R,
    identifier: PeriodIdentifier,
    partitioner: PatchPartitioner,
    reducer: StatisticReducer,
    params: SeriesParams,
}

impl<R: GridReader> SeriesLoader<R> {
    pub fn new(
        reader: R,
        partitioner: PatchPartitioner,
        reducer: StatisticReducer,
        params: SeriesParams,
    ) -> Self {
        Self {
            reader,
            identifier: PeriodIdentifier::new(params.locale),
            partitioner,
            reducer,
            params,
        }
    }

    /// Loader with default partitioning and statistics
    pub fn with_reader(reader: R, params: SeriesParams) -> Self {
        Self::new(reader, PatchPartitioner::standard(), StatisticReducer::default(), params)
    }

    pub fn params(&self) -> &SeriesParams {
        &self.params
    }

    /// Sort files by (category, period). Fails on the first unparseable path.
    pub fn sort_series<P: AsRef<Path>>(&self, files: &[P]) -> GridResult<Vec<SeriesEntry>> {
        let mut entries = files
            .iter()
            .map(|f| {
                let path = f.as_ref();
                Ok(SeriesEntry {
                    key: self.identifier.identify(path)?,
                    path: path.to_path_buf(),
                })
            })
            .collect::<GridResult<Vec<_>>>()?;
        entries.sort_by(|a, b| a.key.cmp(&b.key).then_with(|| a.path.cmp(&b.path)));
        Ok(entries)
    }

    /// Load every role's files into one table.
    ///
    /// Role names only group the inputs; they do not affect ordering or columns.
    pub fn load<P: AsRef<Path>>(&self, roles: &BTreeMap<String, Vec<P>>) -> GridResult<StatTable> {
        let mut rows = Vec::new();
        for (role, files) in roles {
            log::info!(
                "Loading {} files for role {} (lag: {})",
                files.len(),
                role,
                self.params.lag
            );
            rows.extend(self.load_series(files)?);
        }

        let table = StatTable::from_rows(rows)?;
        log::info!(
            "Built table with {} rows and {} statistic columns",
            table.len(),
            table.columns().len()
        );
        Ok(table)
    }

    /// Rows for one set of files, in (category, period, block) order
    pub fn load_series<P: AsRef<Path>>(&self, files: &[P]) -> GridResult<Vec<PeriodRow>> {
        let entries = self.sort_series(files)?;
        let mut rows = Vec::new();
        let mut previous: Option<PreviousGrid> = None;

        for (i, entry) in entries.iter().enumerate() {
            let variable = self.reader.first_variable(&entry.path)?;
            let mut grid = self.reader.read(&entry.path, &variable)?;

            let target = if self.params.lag {
                match lag_predecessor(&entries, i) {
                    Some(prev) => {
                        let prev_grid = self.previous_grid(&entries, prev, &variable, previous.take())?;
                        log::debug!(
                            "Differencing {} {} against {}",
                            entry.key.category,
                            entry.key.period,
                            entries[prev].key.period
                        );
                        let diff = difference(grid.view(), prev_grid.view())?;
                        previous = Some(PreviousGrid { index: i, variable, grid });
                        Some(diff)
                    }
                    None => {
                        log::debug!(
                            "Skipping first period {} of category {}",
                            entry.key.period,
                            entry.key.category
                        );
                        previous = Some(PreviousGrid { index: i, variable, grid });
                        None
                    }
                }
            } else {
                normalize(&mut grid);
                Some(grid)
            };

            if let Some(target) = target {
                let patches = self.partitioner.partition(target.view())?;
                let stats = self.reducer.reduce(&patches, &entry.key.category);
                rows.extend(stats.into_iter().map(|row| PeriodRow {
                    period: entry.key.period,
                    row,
                }));
            }
        }

        Ok(rows)
    }

    /// Grid of entry `index`, reusing the cached read when it matches
    fn previous_grid(
        &self,
        entries: &[SeriesEntry],
        index: usize,
        variable: &str,
        cached: Option<PreviousGrid>,
    ) -> GridResult<Grid> {
        match cached {
            Some(prev) if prev.index == index && prev.variable == variable => Ok(prev.grid),
            _ => self.reader.read(&entries[index].path, variable),
        }
    }
}
