//! Final table preparation and CSV output.
//!
//! The merged table carries explicit nulls. Before export, gaps are linearly
//! interpolated along each block's time series and rows that still contain
//! nulls are dropped.

use crate::types::{GridResult, RowKey, StatTable};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

pub const DATE_COLUMN: &str = "date";
pub const BLOCK_COLUMN: &str = "block";

/// Fill interior nulls of every column by linear interpolation over time,
/// separately for each block. Leading and trailing nulls are left in place.
///
/// This is a straight line between the two nearest known values of the same
/// block, not a polynomial fit across the whole table, so neighbouring blocks
/// and curvature elsewhere in the series never shift a filled value.
pub fn interpolate(table: &mut StatTable) {
    let width = table.columns().len();

    let mut by_block: BTreeMap<usize, Vec<RowKey>> = BTreeMap::new();
    for key in table.keys() {
        by_block.entry(key.1).or_default().push(*key);
    }

    let rows = table.rows_mut();
    let mut filled = 0usize;
    for keys in by_block.values() {
        for col in 0..width {
            let series: Vec<Option<f64>> = keys.iter().map(|k| rows[k][col]).collect();
            for (i, value) in interpolate_series(&series).into_iter().enumerate() {
                if series[i].is_none() && value.is_some() {
                    if let Some(cells) = rows.get_mut(&keys[i]) {
                        cells[col] = value;
                        filled += 1;
                    }
                }
            }
        }
    }

    log::debug!("Interpolated {} null cells", filled);
}

/// Linear interpolation by position between the nearest known neighbours
fn interpolate_series(series: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut out = series.to_vec();
    let mut last_known: Option<(usize, f64)> = None;

    for (i, value) in series.iter().enumerate() {
        if let Some(v) = value {
            if let Some((j, prev)) = last_known {
                let span = (i - j) as f64;
                for (k, slot) in out.iter_mut().enumerate().take(i).skip(j + 1) {
                    let t = (k - j) as f64 / span;
                    *slot = Some(prev + (v - prev) * t);
                }
            }
            last_known = Some((i, *v));
        }
    }

    out
}

/// Remove rows containing any null. Returns the number of rows dropped.
pub fn drop_incomplete(table: &mut StatTable) -> usize {
    let rows = table.rows_mut();
    let before = rows.len();
    rows.retain(|_, cells| cells.iter().all(Option::is_some));
    let dropped = before - rows.len();
    if dropped > 0 {
        log::info!("Dropped {} incomplete rows", dropped);
    }
    dropped
}

/// Interpolate then drop rows that are still incomplete
pub fn finalize(table: &mut StatTable) -> usize {
    interpolate(table);
    drop_incomplete(table)
}

/// Write `date,block,<columns...>`; nulls are empty fields
pub fn write_table<W: Write>(table: &StatTable, writer: W) -> GridResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut header = vec![DATE_COLUMN.to_string(), BLOCK_COLUMN.to_string()];
    header.extend(table.columns().iter().cloned());
    csv_writer.write_record(&header)?;

    for ((period, block), cells) in table.rows() {
        let mut record = Vec::with_capacity(cells.len() + 2);
        record.push(period.to_string());
        record.push(block.to_string());
        record.extend(cells.iter().map(|c| c.map(|v| v.to_string()).unwrap_or_default()));
        csv_writer.write_record(&record)?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Write the table as CSV to `path`
pub fn write_csv<P: AsRef<Path>>(table: &StatTable, path: P) -> GridResult<()> {
    let path = path.as_ref();
    log::info!("Writing {} rows to {}", table.len(), path.display());
    let file = std::fs::File::create(path)?;
    write_table(table, std::io::BufWriter::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Period;

    fn period(month: u32) -> Period {
        Period::new(2020, month).unwrap()
    }

    #[test]
    fn test_interpolate_series() {
        let series = [None, Some(1.0), None, None, Some(4.0), None];
        assert_eq!(
            interpolate_series(&series),
            vec![None, Some(1.0), Some(2.0), Some(3.0), Some(4.0), None]
        );
    }

    #[test]
    fn test_interpolate_within_block_then_drop() {
        let mut table = StatTable::new();
        table.set((period(1), 0), "chl_mean", Some(1.0)).unwrap();
        table.set((period(1), 0), "rain_mean", Some(10.0)).unwrap();
        table.set((period(2), 0), "rain_mean", Some(20.0)).unwrap();
        table.set((period(3), 0), "chl_mean", Some(3.0)).unwrap();
        table.set((period(3), 0), "rain_mean", Some(30.0)).unwrap();
        // block 1 only has a trailing gap
        table.set((period(1), 1), "chl_mean", Some(5.0)).unwrap();
        table.set((period(2), 1), "rain_mean", Some(6.0)).unwrap();

        let dropped = finalize(&mut table);

        assert_eq!(table.get(&(period(2), 0), "chl_mean"), Some(2.0));
        assert_eq!(dropped, 2);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_interpolation_is_linear_and_per_block() {
        let mut table = StatTable::new();
        // Block 0 is quadratic in time with a gap in March
        for (month, value) in [(1, 1.0), (2, 4.0), (4, 16.0), (5, 25.0)] {
            table.set((period(month), 0), "sst_mean", Some(value)).unwrap();
        }
        table.set((period(3), 0), "sst_mean", None).unwrap();
        // Block 1 has values far from block 0
        for month in 1..=5 {
            table.set((period(month), 1), "sst_mean", Some(1000.0)).unwrap();
        }

        interpolate(&mut table);

        assert_eq!(table.get(&(period(3), 0), "sst_mean"), Some(10.0));
        assert_eq!(table.get(&(period(3), 1), "sst_mean"), Some(1000.0));
    }

    #[test]
    fn test_csv_layout_with_nulls() {
        let mut table = StatTable::new();
        table.set((period(1), 0), "rain_mean", Some(1.5)).unwrap();
        table.set((period(2), 3), "chl_mean", Some(2.0)).unwrap();

        let mut buffer = Vec::new();
        write_table(&table, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert_eq!(
            text,
            "date,block,rain_mean,chl_mean\n2020-01-01,0,1.5,\n2020-02-01,3,,2\n"
        );
    }
}
