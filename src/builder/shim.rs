//! Shim translation units.
//!
//! The makefile builds every object from a flat output directory, so each
//! real source gets a one-line file there that includes it. Objective-C++
//! sources get a `.cpp` shim; the compiler is told the language through
//! `-x objective-c++` in the flags.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::builder::resolve::include_dir;
use crate::core::errors::ConfigureError;
use crate::core::source_set::SourceFileSet;
use crate::util::fs::write_atomic;

/// Flat shim file name for a source path.
///
/// Path separators become `-` and a trailing `.mm` becomes `.cpp`.
pub fn shim_name(path: &Path) -> String {
    let flat = path.to_string_lossy().replace(['/', '\\'], "-");
    match flat.strip_suffix(".mm") {
        Some(stem) => format!("{}.cpp", stem),
        None => flat,
    }
}

/// A generated translation unit including one real source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShimFile {
    /// File name inside the output directory
    pub name: String,
    /// Source path relative to the source root
    pub source: PathBuf,
    pub contents: String,
}

impl ShimFile {
    /// Shim for `source`, including it through `include_root`.
    pub fn new(source: &Path, include_root: &str) -> Self {
        let source_slash = source.to_string_lossy().replace('\\', "/");
        ShimFile {
            name: shim_name(source),
            source: source.to_path_buf(),
            contents: format!("#include \"{}/{}\"\n", include_root, source_slash),
        }
    }

    pub fn path_in(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(&self.name)
    }
}

/// What writing a shim changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ShimStatus {
    Created,
    Updated,
    /// Rewritten with identical contents
    Fresh,
}

/// A shim together with what writing it changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaterializedShim {
    #[serde(flatten)]
    pub shim: ShimFile,
    pub status: ShimStatus,
}

/// Compute the shims for a source set without touching the filesystem.
///
/// Two sources that flatten to the same shim name are rejected.
pub fn plan_shims(
    sources: &SourceFileSet,
    source_root: &Path,
    output_dir: &Path,
) -> Result<Vec<ShimFile>, ConfigureError> {
    let include_root = include_dir(output_dir, source_root);
    let mut names: HashMap<String, &Path> = HashMap::new();
    let mut shims = Vec::with_capacity(sources.len());

    for source in sources.iter() {
        let shim = ShimFile::new(source, &include_root);
        if names.insert(shim.name.clone(), source).is_some() {
            return Err(ConfigureError::DuplicateSource {
                path: source.to_path_buf(),
            });
        }
        shims.push(shim);
    }

    Ok(shims)
}

fn shim_status(path: &Path, contents: &str) -> ShimStatus {
    match fs::read_to_string(path) {
        Ok(existing) if existing == contents => ShimStatus::Fresh,
        Ok(_) => ShimStatus::Updated,
        Err(_) => ShimStatus::Created,
    }
}

/// What [`materialize_shims`] would do, without writing anything.
pub fn preview_shims(
    sources: &SourceFileSet,
    source_root: &Path,
    output_dir: &Path,
) -> Result<Vec<MaterializedShim>, ConfigureError> {
    let shims = plan_shims(sources, source_root, output_dir)?;
    Ok(shims
        .into_iter()
        .map(|shim| {
            let status = shim_status(&shim.path_in(output_dir), &shim.contents);
            MaterializedShim { shim, status }
        })
        .collect())
}

/// Write one shim per source into `output_dir`.
///
/// Every shim is rewritten on each run. Files already written stay in place
/// when a later write fails.
pub fn materialize_shims(
    sources: &SourceFileSet,
    source_root: &Path,
    output_dir: &Path,
) -> Result<Vec<MaterializedShim>, ConfigureError> {
    let shims = plan_shims(sources, source_root, output_dir)?;

    fs::create_dir_all(output_dir)
        .map_err(|e| ConfigureError::filesystem(output_dir, e))?;

    shims
        .into_iter()
        .map(|shim| {
            let path = shim.path_in(output_dir);
            let status = shim_status(&path, &shim.contents);

            write_atomic(&path, shim.contents.as_bytes()).map_err(|e| ConfigureError::filesystem(&path, e))?;
            tracing::debug!("{:?} shim {}", status, path.display());
            Ok(MaterializedShim { shim, status })
        })
        .collect()
}
