use crate::core::partition::Patch;
use crate::types::StatRow;
use ndarray::ArrayView2;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Reduction from all cells of a patch to one scalar
pub type StatFn = fn(&ArrayView2<f64>) -> f64;

/// Ordered, immutable mapping from statistic name to reduction
#[derive(Clone)]
pub struct StatisticSet {
    stats: Vec<(String, StatFn)>,
}

impl std::fmt::Debug for StatisticSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Names of the default statistics, in column order
pub const DEFAULT_STATISTICS: [&str; 5] = ["mean", "median", "std", "min", "max"];

impl StatisticSet {
    /// Empty set; populate with [`StatisticSet::with`]
    pub fn empty() -> Self {
        Self { stats: Vec::new() }
    }

    /// Add or replace a statistic. Replacing keeps the existing position.
    pub fn with(mut self, name: &str, f: StatFn) -> Self {
        match self.stats.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = f,
            None => self.stats.push((name.to_string(), f)),
        }
        self
    }

    /// Subset of the default statistics by name, in the requested order
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Option<Self> {
        let defaults = Self::default();
        let mut set = Self::empty();
        for name in names {
            let f = defaults.get(name.as_ref())?;
            set = set.with(name.as_ref(), f);
        }
        Some(set)
    }

    pub fn get(&self, name: &str) -> Option<StatFn> {
        self.stats.iter().find(|(n, _)| n == name).map(|(_, f)| *f)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.stats.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    /// Column names this set produces for `prefix`
    pub fn column_names(&self, prefix: &str) -> Vec<String> {
        self.names().map(|n| column_name(prefix, n)).collect()
    }
}

impl Default for StatisticSet {
    /// mean, median, population std, min, max
    fn default() -> Self {
        Self::empty()
            .with("mean", mean)
            .with("median", median)
            .with("std", std_dev)
            .with("min", min)
            .with("max", max)
    }
}

pub fn column_name(prefix: &str, statistic: &str) -> String {
    format!("{}_{}", prefix, statistic)
}

pub fn mean(data: &ArrayView2<f64>) -> f64 {
    data.mean().unwrap_or(f64::NAN)
}

pub fn median(data: &ArrayView2<f64>) -> f64 {
    let mut values: Vec<f64> = data.iter().copied().collect();
    if values.is_empty() {
        return f64::NAN;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

/// Population standard deviation (ddof = 0)
pub fn std_dev(data: &ArrayView2<f64>) -> f64 {
    if data.is_empty() {
        return f64::NAN;
    }
    data.std(0.0)
}

pub fn min(data: &ArrayView2<f64>) -> f64 {
    data.iter().copied().fold(f64::INFINITY, f64::min)
}

pub fn max(data: &ArrayView2<f64>) -> f64 {
    data.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

/// Reduces patches to rows of named statistics
pub struct StatisticReducer {
    statistics: StatisticSet,
}

impl StatisticReducer {
    pub fn new(statistics: StatisticSet) -> Self {
        Self { statistics }
    }

    pub fn statistics(&self) -> &StatisticSet {
        &self.statistics
    }

    /// One row per patch; `block` is the patch's position in `patches`
    pub fn reduce(&self, patches: &[Patch<'_>], prefix: &str) -> Vec<StatRow> {
        log::debug!(
            "Reducing {} patches with {} statistics (prefix {})",
            patches.len(),
            self.statistics.len(),
            prefix
        );

        let columns = self.statistics.column_names(prefix);

        #[cfg(feature = "parallel")]
        let rows: Vec<StatRow> = patches
            .par_iter()
            .enumerate()
            .map(|(block, patch)| self.reduce_patch(block, &patch.data, &columns))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let rows: Vec<StatRow> = patches
            .iter()
            .enumerate()
            .map(|(block, patch)| self.reduce_patch(block, &patch.data, &columns))
            .collect();

        rows
    }

    fn reduce_patch(&self, block: usize, data: &ArrayView2<f64>, columns: &[String]) -> StatRow {
        let values = self
            .statistics
            .stats
            .iter()
            .zip(columns)
            .map(|((_, f), column)| (column.clone(), f(data)))
            .collect();
        StatRow { block, values }
    }
}

impl Default for StatisticReducer {
    fn default() -> Self {
        Self::new(StatisticSet::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::partition::{PartitionParams, PatchPartitioner};
    use approx::assert_relative_eq;
    use ndarray::{array, Array2};

    #[test]
    fn test_default_set_order() {
        let names: Vec<_> = StatisticSet::default().names().map(String::from).collect();
        assert_eq!(names, DEFAULT_STATISTICS);
    }

    #[test]
    fn test_constant_grid_statistics() {
        let grid = Array2::from_elem((40, 40), 3.5);
        let patches = PatchPartitioner::new(PartitionParams { num_patches: 9 })
            .partition(grid.view())
            .unwrap();
        let rows = StatisticReducer::default().reduce(&patches, "sst");

        assert_eq!(rows.len(), 9);
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row.block, i);
            let get = |name: &str| {
                row.values.iter().find(|(c, _)| c == name).map(|(_, v)| *v).unwrap()
            };
            for stat in ["mean", "median", "min", "max"] {
                assert_relative_eq!(get(&format!("sst_{}", stat)), 3.5);
            }
            assert_relative_eq!(get("sst_std"), 0.0);
        }
    }

    #[test]
    fn test_known_values() {
        let data = array![[1.0, 2.0], [3.0, 4.0]];
        let view = data.view();
        assert_relative_eq!(mean(&view), 2.5);
        assert_relative_eq!(median(&view), 2.5);
        assert_relative_eq!(std_dev(&view), 1.25f64.sqrt());
        assert_relative_eq!(min(&view), 1.0);
        assert_relative_eq!(max(&view), 4.0);

        let odd = array![[9.0, 1.0, 5.0]];
        assert_relative_eq!(median(&odd.view()), 5.0);
    }

    #[test]
    fn test_column_naming_and_custom_set() {
        fn range(data: &ArrayView2<f64>) -> f64 {
            max(data) - min(data)
        }

        let grid = array![[1.0, 2.0], [3.0, 7.0]];
        let patches = PatchPartitioner::new(PartitionParams { num_patches: 1 })
            .partition(grid.view())
            .unwrap();
        let set = StatisticSet::from_names(&["max"]).unwrap().with("range", range);
        let rows = StatisticReducer::new(set).reduce(&patches, "chl");

        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].values,
            vec![("chl_max".to_string(), 7.0), ("chl_range".to_string(), 6.0)]
        );
    }

    #[test]
    fn test_unknown_statistic_name() {
        assert!(StatisticSet::from_names(&["mean", "skew"]).is_none());
    }

    #[test]
    fn test_replacing_keeps_position() {
        fn zero(_: &ArrayView2<f64>) -> f64 {
            0.0
        }
        let set = StatisticSet::default().with("median", zero);
        let names: Vec<_> = set.names().collect();
        assert_eq!(names, DEFAULT_STATISTICS);
    }
}
