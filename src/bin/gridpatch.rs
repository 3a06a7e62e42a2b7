use anyhow::{Context, Result};
use clap::Parser;
use gridpatch::{GdalGridReader, MonthLocale, Pipeline, PipelineConfig};
use std::path::PathBuf;

/// Aggregate monthly grid series into a per-patch statistics table
#[derive(Parser, Debug)]
#[command(name = "gridpatch", version)]
struct Args {
    /// Directory with feature grids (searched recursively)
    #[arg(long)]
    features: Option<PathBuf>,

    /// Directory with target grids (searched recursively)
    #[arg(long)]
    targets: Option<PathBuf>,

    /// Output CSV path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// TOML configuration file; flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Requested patch count (floor(sqrt(n))² patches are produced)
    #[arg(long)]
    patches: Option<usize>,

    /// Difference each period against the previous one of its variable
    #[arg(long)]
    lag: bool,

    /// Parse month names in Portuguese (Janeiro_2020)
    #[arg(long)]
    portuguese: bool,

    /// Write the raw merged table without interpolation or null dropping
    #[arg(long)]
    raw: bool,
}

impl Args {
    fn into_config(self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => PipelineConfig::default(),
        };

        if let Some(features) = self.features {
            config.feature_root = features;
        }
        if let Some(targets) = self.targets {
            config.target_root = targets;
        }
        if let Some(output) = self.output {
            config.output = output;
        }
        if let Some(patches) = self.patches {
            config.partition.num_patches = patches;
        }
        if self.lag {
            config.series.lag = true;
        }
        if self.portuguese {
            config.series.locale = MonthLocale::Portuguese;
        }
        if self.raw {
            config.finalize = false;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Args::parse().into_config()?;
    log::debug!("Configuration: {:?}", config);

    let pipeline = Pipeline::new(config, GdalGridReader::new()).context("invalid configuration")?;
    let table = pipeline.run().context("pipeline failed")?;

    println!(
        "Wrote {} rows x {} statistic columns to {}",
        table.len(),
        table.columns().len(),
        pipeline.config().output.display()
    );
    Ok(())
}
