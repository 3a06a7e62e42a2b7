use crate::types::{Grid, GridError, GridResult};
use ndarray::{Array2, ArrayView2, Zip};

/// Replace every value <= 0 (and NaN) with 0 in place
pub fn normalize(grid: &mut Grid) {
    grid.mapv_inplace(|v| if v > 0.0 { v } else { 0.0 });
}

/// Clamped period-over-period difference: `max(current, 0) - max(previous, 0)`.
///
/// Both grids must have the same shape.
pub fn difference(current: ArrayView2<f64>, previous: ArrayView2<f64>) -> GridResult<Grid> {
    if current.dim() != previous.dim() {
        return Err(GridError::ShapeMismatch {
            current: current.dim(),
            previous: previous.dim(),
        });
    }

    log::debug!("Differencing {}x{} grids", current.nrows(), current.ncols());

    let clamp = |v: f64| if v > 0.0 { v } else { 0.0 };
    let mut diff = Array2::zeros(current.dim());
    Zip::from(&mut diff)
        .and(&current)
        .and(&previous)
        .for_each(|d, &c, &p| *d = clamp(c) - clamp(p));

    Ok(diff)
}
