use crate::types::{GridError, GridResult};
use ndarray::{s, ArrayView2};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Patch partitioning parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartitionParams {
    /// Requested number of patches. Only `floor(sqrt(n))²` are produced.
    pub num_patches: usize,
}

impl Default for PartitionParams {
    fn default() -> Self {
        Self { num_patches: 180 }
    }
}

/// Row/column extent of one patch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchBounds {
    /// Row-major position within the partition
    pub index: usize,
    pub rows: Range<usize>,
    pub cols: Range<usize>,
}

impl PatchBounds {
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.cols.len())
    }
}

/// A rectangular view into a grid
#[derive(Debug, Clone)]
pub struct Patch<'a> {
    pub bounds: PatchBounds,
    pub data: ArrayView2<'a, f64>,
}

impl Patch<'_> {
    pub fn index(&self) -> usize {
        self.bounds.index
    }
}

/// Splits a grid into a near-square set of rectangular patches
pub struct PatchPartitioner {
    params: PartitionParams,
}

impl PatchPartitioner {
    pub fn new(params: PartitionParams) -> Self {
        Self { params }
    }

    /// Create partitioner with the default patch count
    pub fn standard() -> Self {
        Self::new(PartitionParams::default())
    }

    /// Number of bands per axis: `floor(sqrt(num_patches))`
    pub fn divisions(&self) -> usize {
        // Integer square root; f64 sqrt can round just below a perfect square.
        let n = self.params.num_patches;
        // Squares past usize::MAX count as too large.
        let fits = |d: usize| d.checked_mul(d).map_or(false, |sq| sq <= n);
        let mut d = (n as f64).sqrt() as usize;
        while !fits(d) {
            d -= 1;
        }
        while fits(d + 1) {
            d += 1;
        }
        d
    }

    /// Compute patch bounds for a grid of `shape` in row-major order.
    ///
    /// Interior bands are `floor(R/d)` rows by `floor(C/d)` columns. The last
    /// band on each axis runs to the grid edge, so remainder cells are folded
    /// into it rather than dropped.
    pub fn bands(&self, shape: (usize, usize)) -> GridResult<Vec<PatchBounds>> {
        let (n_rows, n_cols) = shape;
        let d = self.divisions();

        if d == 0 {
            return Err(GridError::DegeneratePartition(format!(
                "num_patches = {} gives zero bands",
                self.params.num_patches
            )));
        }

        let band_rows = n_rows / d;
        let band_cols = n_cols / d;
        if band_rows == 0 || band_cols == 0 {
            return Err(GridError::DegeneratePartition(format!(
                "Grid {}x{} is too small for {}x{} bands",
                n_rows, n_cols, d, d
            )));
        }

        log::debug!(
            "Partitioning {}x{} grid into {}x{} bands of {}x{}",
            n_rows, n_cols, d, d, band_rows, band_cols
        );

        let band_end = |band: usize, size: usize, total: usize| {
            if band == d - 1 {
                total
            } else {
                (band * size + size).min(total)
            }
        };

        let mut bounds = Vec::with_capacity(d * d);
        for i in 0..d {
            for j in 0..d {
                bounds.push(PatchBounds {
                    index: i * d + j,
                    rows: i * band_rows..band_end(i, band_rows, n_rows),
                    cols: j * band_cols..band_end(j, band_cols, n_cols),
                });
            }
        }

        Ok(bounds)
    }

    /// Split `grid` into patch views
    pub fn partition<'a>(&self, grid: ArrayView2<'a, f64>) -> GridResult<Vec<Patch<'a>>> {
        let bounds = self.bands(grid.dim())?;
        let patches = bounds
            .into_iter()
            .map(|b| {
                let data = grid.clone().slice_move(s![b.rows.clone(), b.cols.clone()]);
                Patch { bounds: b, data }
            })
            .collect();
        Ok(patches)
    }
}

impl Default for PatchPartitioner {
    fn default() -> Self {
        Self::standard()
    }
}
