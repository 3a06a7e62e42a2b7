use crate::core::partition::PartitionParams;
use crate::core::series::SeriesParams;
use crate::core::statistics::{StatisticSet, DEFAULT_STATISTICS};
use crate::io::discovery::GRID_EXTENSION;
use crate::types::{GridError, GridResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Complete pipeline configuration, loadable from TOML.
///
/// ```toml
/// feature_root = "/data/nc/features"
/// target_root = "/data/nc/chlorophyll"
/// output = "aggregated_data.csv"
///
/// [partition]
/// num_patches = 180
///
/// [series]
/// lag = false
/// locale = "portuguese"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory searched recursively for feature grids
    pub feature_root: PathBuf,
    /// Directory searched recursively for target grids
    pub target_root: PathBuf,
    /// CSV output path
    pub output: PathBuf,
    /// Grid file extension, without the dot
    pub extension: String,
    /// Statistic names, a subset of the defaults
    pub statistics: Vec<String>,
    /// Interpolate gaps and drop incomplete rows before writing
    pub finalize: bool,
    pub partition: PartitionParams,
    pub series: SeriesParams,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            feature_root: PathBuf::new(),
            target_root: PathBuf::new(),
            output: PathBuf::from("aggregated_data.csv"),
            extension: GRID_EXTENSION.to_string(),
            statistics: DEFAULT_STATISTICS.iter().map(|s| s.to_string()).collect(),
            finalize: true,
            partition: PartitionParams::default(),
            series: SeriesParams::default(),
        }
    }
}

impl PipelineConfig {
    pub fn from_toml_str(text: &str) -> GridResult<Self> {
        toml::from_str(text).map_err(|e| GridError::Config(format!("Invalid configuration: {}", e)))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> GridResult<Self> {
        let path = path.as_ref();
        log::info!("Loading configuration from {}", path.display());
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Configured statistic set
    pub fn statistic_set(&self) -> GridResult<StatisticSet> {
        StatisticSet::from_names(self.statistics.as_slice()).ok_or_else(|| {
            GridError::Config(format!(
                "Unknown statistic in {:?}; expected names from {:?}",
                self.statistics, DEFAULT_STATISTICS
            ))
        })
    }

    pub fn validate(&self) -> GridResult<()> {
        if self.feature_root.as_os_str().is_empty() {
            return Err(GridError::Config("feature_root is not set".to_string()));
        }
        if self.target_root.as_os_str().is_empty() {
            return Err(GridError::Config("target_root is not set".to_string()));
        }
        if self.partition.num_patches == 0 {
            return Err(GridError::Config("num_patches must be at least 1".to_string()));
        }
        if self.statistics.is_empty() {
            return Err(GridError::Config("at least one statistic is required".to_string()));
        }
        self.statistic_set()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MonthLocale;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.partition.num_patches, 180);
        assert!(!config.series.lag);
        assert_eq!(config.extension, "nc");
        assert_eq!(config.statistics.len(), 5);
    }

    #[test]
    fn test_parse_toml() {
        let config = PipelineConfig::from_toml_str(
            r#"
            feature_root = "/data/features"
            target_root = "/data/targets"
            statistics = ["mean", "max"]

            [partition]
            num_patches = 64

            [series]
            lag = true
            locale = "portuguese"
            "#,
        )
        .unwrap();

        assert_eq!(config.feature_root, PathBuf::from("/data/features"));
        assert_eq!(config.partition.num_patches, 64);
        assert!(config.series.lag);
        assert_eq!(config.series.locale, MonthLocale::Portuguese);
        assert_eq!(config.output, PathBuf::from("aggregated_data.csv"));
        assert!(config.validate().is_ok());
        assert_eq!(config.statistic_set().unwrap().len(), 2);
    }

    #[test]
    fn test_validation_errors() {
        let mut config = PipelineConfig::default();
        assert!(matches!(config.validate(), Err(GridError::Config(_))));

        config.feature_root = PathBuf::from("/a");
        config.target_root = PathBuf::from("/b");
        config.statistics = vec!["kurtosis".to_string()];
        assert!(matches!(config.validate(), Err(GridError::Config(_))));
    }

    #[test]
    fn test_wrong_value_type_is_config_error() {
        let result = PipelineConfig::from_toml_str("[partition]\nnum_patches = \"many\"");
        assert!(matches!(result, Err(GridError::Config(_))));
    }
}
