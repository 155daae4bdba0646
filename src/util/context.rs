//! Global context for extconf operations.
//!
//! Provides centralized access to configuration, paths, and environment.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::util::config::{global_config_dir, load_config, Config, MANIFEST_NAME};

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Home directory for global extconf data (~/.extconf/)
    home: PathBuf,
}

impl GlobalContext {
    /// Create a new GlobalContext with defaults.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(Self::with_cwd(cwd))
    }

    /// Create a GlobalContext with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Self {
        let home = global_config_dir().unwrap_or_else(|| PathBuf::from(".extconf"));
        GlobalContext { cwd, home }
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the global configuration file path.
    pub fn config_path(&self) -> PathBuf {
        self.home.join("config.toml")
    }

    /// Find `extconf.toml` starting from cwd and searching upward.
    pub fn find_manifest(&self) -> Option<PathBuf> {
        let mut current = self.cwd.clone();
        loop {
            let candidate = current.join(MANIFEST_NAME);
            if candidate.is_file() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Resolve the project root.
    ///
    /// An explicit root wins; otherwise the directory holding the nearest
    /// manifest, falling back to the working directory.
    pub fn project_root(&self, explicit: Option<&Path>) -> PathBuf {
        if let Some(root) = explicit {
            return crate::util::fs::absolutize(&self.cwd, root);
        }

        self.find_manifest()
            .and_then(|manifest| manifest.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| self.cwd.clone())
    }

    /// Load the merged global and project configuration for a project root.
    pub fn load_config(&self, project_root: &Path) -> Result<Config> {
        load_config(&self.config_path(), &project_root.join(MANIFEST_NAME))
    }
}
