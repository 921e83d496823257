//! Project directory scanning.

use std::path::{Path, PathBuf};

use dmf_domain::Result;

/// Collect every file under `root`, skipping any path that contains
/// one of the `exclude` substrings.
///
/// Pure with respect to its inputs: the walk is materialized and the
/// result sorted, so the same tree always produces the same ordered
/// list and downstream planning stays deterministic.
pub fn collect_files(root: &Path, exclude: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in walkdir::WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| !is_excluded(e.path(), exclude))
    {
        let entry = entry.map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
        })?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}

fn is_excluded(path: &Path, exclude: &[String]) -> bool {
    let text = path.to_string_lossy();
    exclude.iter().any(|pattern| text.contains(pattern.as_str()))
}
