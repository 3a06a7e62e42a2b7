use crate::types::{GridResult, StatTable};
use std::collections::HashSet;

/// Suffix for feature-side columns whose names also appear in the targets
pub const FEATURE_SUFFIX: &str = "_input";
/// Suffix for target-side columns whose names also appear in the features
pub const TARGET_SUFFIX: &str = "_output";

/// Outer join of `features` and `targets` on (period, block).
///
/// Keys present on one side only keep nulls in the other side's columns.
/// Feature columns come first, then target columns, each in their table order.
pub fn merge(features: &StatTable, targets: &StatTable) -> GridResult<StatTable> {
    log::info!(
        "Merging {} feature rows with {} target rows",
        features.len(),
        targets.len()
    );

    let shared: HashSet<&String> = features
        .columns()
        .iter()
        .filter(|c| targets.columns().contains(c))
        .collect();
    if !shared.is_empty() {
        log::warn!("{} columns appear on both sides and will be suffixed", shared.len());
    }

    let rename = |column: &String, suffix: &str| {
        if shared.contains(column) {
            format!("{}{}", column, suffix)
        } else {
            column.clone()
        }
    };
    let feature_columns: Vec<String> = features.columns().iter().map(|c| rename(c, FEATURE_SUFFIX)).collect();
    let target_columns: Vec<String> = targets.columns().iter().map(|c| rename(c, TARGET_SUFFIX)).collect();

    let mut merged = StatTable::new();
    for column in feature_columns.iter().chain(target_columns.iter()) {
        merged.add_column(column);
    }

    copy_rows(&mut merged, features, &feature_columns)?;
    copy_rows(&mut merged, targets, &target_columns)?;

    log::info!("Merged table has {} rows", merged.len());
    Ok(merged)
}

fn copy_rows(merged: &mut StatTable, source: &StatTable, columns: &[String]) -> GridResult<()> {
    for (key, cells) in source.rows() {
        merged.ensure_row(*key);
        for (column, value) in columns.iter().zip(cells) {
            if value.is_some() {
                merged.set(*key, column, *value)?;
            }
        }
    }
    Ok(())
}
