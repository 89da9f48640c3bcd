//! Error types for the library.
//!
//! Each collaborator owns its error enum. [`AnalyzerError`] wraps the
//! loader error unchanged and adds the one condition the analyzer itself
//! distinguishes: a directory without a `Gemfile.lock`.

use std::path::PathBuf;

/// Errors raised while parsing versions and requirements.
#[derive(Debug, thiserror::Error)]
pub enum VersionError {
    #[error("malformed version number string: '{0}'")]
    Malformed(String),

    #[error("illformed requirement: '{0}'")]
    BadRequirement(String),
}

/// Errors raised by the `Gemfile.lock` loader.
#[derive(Debug, thiserror::Error)]
pub enum LockfileError {
    #[error("lockfile not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{}:{line}: {reason}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        reason: String,
    },
}

/// Errors raised while opening the advisory database.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("advisory database not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid advisory {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("invalid version requirement in {}: {source}", path.display())]
    Requirement {
        path: PathBuf,
        source: VersionError,
    },
}

/// Errors surfaced by [`Analyzer::run`](crate::Analyzer::run).
#[derive(Debug, thiserror::Error)]
pub enum AnalyzerError {
    /// The audited directory has no `Gemfile.lock`. Nothing was written.
    #[error("no Gemfile.lock found in {}", directory.display())]
    GemfileLockNotFound { directory: PathBuf },

    #[error(transparent)]
    Lockfile(LockfileError),

    #[error("failed to serialize issue: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
