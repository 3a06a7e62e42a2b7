use crate::types::{Grid, GridError, GridResult};
use gdal::{Dataset, Metadata};
use ndarray::Array2;
use std::path::Path;

/// Variable name exposed for rasters without subdatasets
pub const DEFAULT_BAND: &str = "band1";

/// Source of 2-D gridded variables
pub trait GridReader {
    /// Names of the variables available in `path`, in file order
    fn variables(&self, path: &Path) -> GridResult<Vec<String>>;

    /// Dense 2-D data of `variable`, with missing values already filled
    fn read(&self, path: &Path, variable: &str) -> GridResult<Grid>;

    /// The file's first variable
    fn first_variable(&self, path: &Path) -> GridResult<String> {
        self.variables(path)?.into_iter().next().ok_or_else(|| {
            GridError::Read(format!("No variables found in {}", path.display()))
        })
    }
}

/// GDAL-backed reader for netCDF and single-band rasters
#[derive(Debug, Clone, Default)]
pub struct GdalGridReader {
    /// Value written where the file has NoData or non-finite cells
    pub fill_value: f64,
}

impl GdalGridReader {
    pub fn new() -> Self {
        Self::default()
    }

    fn subdataset_names(dataset: &Dataset) -> Vec<String> {
        dataset
            .metadata_domain("SUBDATASETS")
            .unwrap_or_default()
            .into_iter()
            .filter_map(|entry| {
                let (key, value) = entry.split_once('=')?;
                if key.ends_with("_NAME") {
                    Some(value.to_string())
                } else {
                    None
                }
            })
            .collect()
    }

    /// Variable name of a subdataset descriptor like `NETCDF:"file.nc":chlor_a`
    fn variable_of(descriptor: &str) -> &str {
        descriptor.rsplit(':').next().unwrap_or(descriptor)
    }

    fn read_band(&self, dataset: &Dataset, source: &str) -> GridResult<Grid> {
        if dataset.raster_count() < 1 {
            return Err(GridError::Read(format!("{} has no raster bands", source)));
        }

        let (width, height) = dataset.raster_size();
        log::debug!("Grid size: {}x{} ({})", height, width, source);

        let band = dataset.rasterband(1)?;
        let no_data = band.no_data_value();
        let buffer = band.read_as::<f64>((0, 0), (width, height), (width, height), None)?;

        let mut grid = Array2::from_shape_vec((height, width), buffer.data)
            .map_err(|e| GridError::Read(format!("Failed to reshape {}: {}", source, e)))?;

        let fill = self.fill_value;
        grid.mapv_inplace(|v| match no_data {
            Some(nd) if v == nd => fill,
            _ if !v.is_finite() => fill,
            _ => v,
        });

        Ok(grid)
    }
}

impl GridReader for GdalGridReader {
    fn variables(&self, path: &Path) -> GridResult<Vec<String>> {
        let dataset = Dataset::open(path)
            .map_err(|e| GridError::Read(format!("Cannot open {}: {}", path.display(), e)))?;

        let subdatasets = Self::subdataset_names(&dataset);
        if subdatasets.is_empty() {
            return Ok(vec![DEFAULT_BAND.to_string()]);
        }

        Ok(subdatasets
            .iter()
            .map(|d| Self::variable_of(d).to_string())
            .collect())
    }

    fn read(&self, path: &Path, variable: &str) -> GridResult<Grid> {
        log::debug!("Reading variable {} from {}", variable, path.display());

        if variable == DEFAULT_BAND {
            let dataset = Dataset::open(path)
                .map_err(|e| GridError::Read(format!("Cannot open {}: {}", path.display(), e)))?;
            return self.read_band(&dataset, &path.display().to_string());
        }

        let container = Dataset::open(path)
            .map_err(|e| GridError::Read(format!("Cannot open {}: {}", path.display(), e)))?;
        let descriptor = Self::subdataset_names(&container)
            .into_iter()
            .find(|d| Self::variable_of(d) == variable)
            .ok_or_else(|| {
                GridError::Read(format!("Variable {} not found in {}", variable, path.display()))
            })?;

        let dataset = Dataset::open(Path::new(&descriptor))
            .map_err(|e| GridError::Read(format!("Cannot open {}: {}", descriptor, e)))?;
        self.read_band(&dataset, &descriptor)
    }
}
