//! Locating and loading `Gemfile.lock`.
//!
//! The [`ManifestLoader`] trait is the seam the [`Analyzer`](crate::Analyzer)
//! loads through; [`GemfileLockLoader`] is the filesystem implementation.
//! A missing lockfile is reported as [`LockfileError::NotFound`] so callers
//! can tell it apart from unreadable or malformed files.

mod parser;

pub use parser::parse;

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::LockfileError;
use crate::model::Manifest;

/// File name Bundler writes its lockfile to.
pub const GEMFILE_LOCK: &str = "Gemfile.lock";

/// Loads a [`Manifest`] for a project directory.
pub trait ManifestLoader {
    /// Loads the manifest of `directory`.
    ///
    /// # Errors
    ///
    /// Returns [`LockfileError::NotFound`] when the directory has no lockfile.
    fn load(&self, directory: &Path) -> Result<Manifest, LockfileError>;
}

impl<L: ManifestLoader + ?Sized> ManifestLoader for &L {
    fn load(&self, directory: &Path) -> Result<Manifest, LockfileError> {
        (**self).load(directory)
    }
}

/// Reads and parses `<directory>/Gemfile.lock`.
#[derive(Debug, Clone, Default)]
pub struct GemfileLockLoader;

impl ManifestLoader for GemfileLockLoader {
    fn load(&self, directory: &Path) -> Result<Manifest, LockfileError> {
        let path = directory.join(GEMFILE_LOCK);

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(LockfileError::NotFound { path });
            }
            Err(source) => return Err(LockfileError::Io { path, source }),
        };

        let manifest = parse(&content, &path)?;
        tracing::debug!(
            path = %path.display(),
            sources = manifest.sources().len(),
            specs = manifest.specs().len(),
            "loaded lockfile"
        );
        Ok(manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_lockfile() {
        let dir = TempDir::new().unwrap();
        let err = GemfileLockLoader.load(dir.path()).unwrap_err();

        match err {
            LockfileError::NotFound { path } => assert_eq!(path, dir.path().join(GEMFILE_LOCK)),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_lockfile() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(GEMFILE_LOCK),
            "GEM\n  remote: https://rubygems.org/\n  specs:\n    rack (1.4.1)\n",
        )
        .unwrap();

        let manifest = GemfileLockLoader.load(dir.path()).unwrap();
        assert_eq!(manifest.file_name(), GEMFILE_LOCK);
        assert_eq!(manifest.specs().len(), 1);
        assert_eq!(manifest.specs()[0].line, 4);
    }

    #[test]
    fn test_load_through_reference() {
        fn load_with(loader: impl ManifestLoader, dir: &Path) -> Result<Manifest, LockfileError> {
            loader.load(dir)
        }

        let dir = TempDir::new().unwrap();
        let loader = GemfileLockLoader;
        assert!(matches!(
            load_with(&loader, dir.path()),
            Err(LockfileError::NotFound { .. })
        ));
    }
}
