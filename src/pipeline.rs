use crate::config::PipelineConfig;
use crate::core::merge::merge;
use crate::core::partition::PatchPartitioner;
use crate::core::series::SeriesLoader;
use crate::core::statistics::StatisticReducer;
use crate::io::discovery::discover;
use crate::io::export::{finalize, write_csv};
use crate::io::grid_reader::GridReader;
use crate::types::{GridResult, StatTable};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Role name used for every discovered file set
pub const DEFAULT_ROLE: &str = "feat";

/// Discovery, loading and merging of feature and target series
pub struct Pipeline<R: GridReader> {
    config: PipelineConfig,
    loader: SeriesLoader<R>,
}

impl<R: GridReader> Pipeline<R> {
    pub fn new(config: PipelineConfig, reader: R) -> GridResult<Self> {
        config.validate()?;
        let loader = SeriesLoader::new(
            reader,
            PatchPartitioner::new(config.partition.clone()),
            StatisticReducer::new(config.statistic_set()?),
            config.series.clone(),
        );
        Ok(Self { config, loader })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn roles(files: Vec<PathBuf>) -> BTreeMap<String, Vec<PathBuf>> {
        let mut roles = BTreeMap::new();
        roles.insert(DEFAULT_ROLE.to_string(), files);
        roles
    }

    /// Merged feature/target table with explicit nulls
    pub fn build_table(&self) -> GridResult<StatTable> {
        let feature_files = discover(&self.config.feature_root, &self.config.extension)?;
        let target_files = discover(&self.config.target_root, &self.config.extension)?;

        log::info!("Loading feature series from {}", self.config.feature_root.display());
        let features = self.loader.load(&Self::roles(feature_files))?;

        log::info!("Loading target series from {}", self.config.target_root.display());
        let targets = self.loader.load(&Self::roles(target_files))?;

        merge(&features, &targets)
    }

    /// Build the table, optionally finalize it, and write the CSV output
    pub fn run(&self) -> GridResult<StatTable> {
        let mut table = self.build_table()?;
        if self.config.finalize {
            finalize(&mut table);
        }
        write_csv(&table, &self.config.output)?;
        log::info!("Pipeline complete: {} rows written", table.len());
        Ok(table)
    }
}
