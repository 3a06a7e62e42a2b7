use crate::types::{GridError, GridResult};
use std::path::{Path, PathBuf};

/// Default grid file extension
pub const GRID_EXTENSION: &str = "nc";

/// Recursively list files under `root` ending in `.extension`.
///
/// The result is unordered; series ordering is done by the loader.
pub fn discover<P: AsRef<Path>>(root: P, extension: &str) -> GridResult<Vec<PathBuf>> {
    let root = root.as_ref();
    if !root.is_dir() {
        return Err(GridError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Root directory not found: {}", root.display()),
        )));
    }

    let root_pattern = glob::Pattern::escape(&root.display().to_string());
    let pattern = format!("{}/**/*.{}", root_pattern, extension);
    log::debug!("Discovering grid files with pattern {}", pattern);

    let mut files = Vec::new();
    for entry in glob::glob(&pattern)? {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => return Err(GridError::Io(e.into_error())),
        }
    }

    log::info!("Found {} .{} files under {}", files.len(), extension, root.display());
    Ok(files)
}
