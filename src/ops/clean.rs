//! Implementation of `extconf clean`.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::builder::makefile::MAKEFILE_NAME;
use crate::builder::shim::shim_name;
use crate::core::source_set::SourceLists;
use crate::util::fs::remove_file_if_exists;

/// Files that configure may have written into `output_dir` for any platform.
pub fn generated_files(lists: &SourceLists, output_dir: &Path) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    let mut files: Vec<PathBuf> = lists
        .all()
        .iter()
        .map(|source| output_dir.join(shim_name(source)))
        .filter(|file| seen.insert(file.clone()))
        .collect();
    files.push(output_dir.join(MAKEFILE_NAME));
    files
}

/// Remove the makefile and every shim. Missing files are ignored.
///
/// Returns the files that were removed.
pub fn clean(lists: &SourceLists, output_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut removed = Vec::new();
    for file in generated_files(lists, output_dir) {
        if remove_file_if_exists(&file)? {
            tracing::debug!("removed {}", file.display());
            removed.push(file);
        }
    }
    Ok(removed)
}
