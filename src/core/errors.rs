//! Configuration error types and diagnostics.

use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic};

/// Error aborting a configure run.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum ConfigureError {
    #[error("`{name}` is not meant to be built from source on host `{host}`")]
    #[diagnostic(code(extconf::platform::unsupported))]
    UnsupportedPlatform {
        name: String,
        host: String,
        redirect: Option<String>,
    },

    #[error("required dependency `{name}` not found")]
    #[diagnostic(code(extconf::probe::missing))]
    MissingDependency { name: String, detail: String },

    #[error("could not run `{tool}`: {message}")]
    #[diagnostic(code(extconf::probe::failed))]
    Probe { tool: String, message: String },

    #[error("failed to write `{}`", path.display())]
    #[diagnostic(code(extconf::fs::write))]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("source file `{}` is listed more than once", path.display())]
    #[diagnostic(code(extconf::sources::duplicate))]
    DuplicateSource { path: PathBuf },

    #[error("source file `{}` does not exist", path.display())]
    #[diagnostic(code(extconf::sources::missing))]
    MissingSource { path: PathBuf },
}

impl ConfigureError {
    /// Wrap a failed tool invocation.
    pub fn probe(tool: impl Into<String>, err: anyhow::Error) -> Self {
        ConfigureError::Probe {
            tool: tool.into(),
            message: format!("{:#}", err),
        }
    }

    /// Wrap a failed write.
    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigureError::Filesystem {
            path: path.into(),
            source,
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ConfigureError::UnsupportedPlatform { name, redirect, .. } => {
                let diag = Diagnostic::error(self.to_string()).with_context(format!(
                    "`{}` ships pre-built binaries for Windows instead",
                    name
                ));
                match redirect {
                    Some(cmd) => diag.with_suggestion(format!("Instead, please use: {}", cmd)),
                    None => diag,
                }
            }
            ConfigureError::MissingDependency { detail, .. } => {
                Diagnostic::error(self.to_string())
                    .with_context(detail.clone())
                    .with_suggestion(suggestions::MISSING_DEPENDENCY)
                    .with_suggestion(suggestions::RUN_DOCTOR)
            }
            ConfigureError::Probe { .. } => {
                Diagnostic::error(self.to_string()).with_suggestion(suggestions::RUN_DOCTOR)
            }
            ConfigureError::Filesystem { path, source } => Diagnostic::error(self.to_string())
                .with_location(path.clone())
                .with_context(source.to_string()),
            ConfigureError::DuplicateSource { .. } | ConfigureError::MissingSource { .. } => {
                Diagnostic::error(self.to_string()).with_suggestion(suggestions::CHECK_SOURCES)
            }
        }
    }
}
