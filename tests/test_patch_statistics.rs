use approx::assert_relative_eq;
use gridpatch::core::{difference, normalize, PatchPartitioner, StatisticReducer};
use ndarray::Array2;

#[test]
fn test_default_partition_shapes_on_100x100() {
    let grid = Array2::from_shape_fn((100, 100), |(r, c)| (r + c) as f64);
    let patches = PatchPartitioner::standard().partition(grid.view()).unwrap();

    assert_eq!(patches.len(), 169);
    for (i, patch) in patches.iter().enumerate() {
        assert_eq!(patch.index(), i);
        let (rows, cols) = patch.data.dim();
        let row_band = i / 13;
        let col_band = i % 13;
        assert_eq!(rows, if row_band == 12 { 16 } else { 7 });
        assert_eq!(cols, if col_band == 12 { 16 } else { 7 });
    }

    // Patch 14 is the second row band, second column band
    assert_eq!(patches[14].bounds.rows, 7..14);
    assert_eq!(patches[14].bounds.cols, 7..14);
    assert_eq!(patches[14].data[[0, 0]], 14.0);
}

#[test]
fn test_constant_grid_rows() {
    let grid = Array2::from_elem((100, 100), 42.0);
    let patches = PatchPartitioner::standard().partition(grid.view()).unwrap();
    let rows = StatisticReducer::default().reduce(&patches, "sst");

    assert_eq!(rows.len(), 169);
    for row in &rows {
        let names: Vec<_> = row.values.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["sst_mean", "sst_median", "sst_std", "sst_min", "sst_max"]);
        for (name, value) in &row.values {
            let expected = if name == "sst_std" { 0.0 } else { 42.0 };
            assert_relative_eq!(*value, expected);
        }
    }
}

#[test]
fn test_differenced_grid_feeds_reducer() {
    let mut current = Array2::from_elem((6, 6), 5.0);
    current[[0, 0]] = -3.0;
    let previous = Array2::from_elem((6, 6), 2.0);

    let diff = difference(current.view(), previous.view()).unwrap();
    assert_eq!(diff[[0, 0]], -2.0);

    let patches = PatchPartitioner::new(gridpatch::core::PartitionParams { num_patches: 4 })
        .partition(diff.view())
        .unwrap();
    let rows = StatisticReducer::default().reduce(&patches, "rain");
    assert_eq!(rows[0].values[3], ("rain_min".to_string(), -2.0));
    assert_eq!(rows[3].values[0], ("rain_mean".to_string(), 3.0));

    let mut raw = current.clone();
    normalize(&mut raw);
    assert!(raw.iter().all(|&v| v >= 0.0));
}
