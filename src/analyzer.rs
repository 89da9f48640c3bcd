//! The audit pipeline: load, scan, classify, emit.
//!
//! An [`Analyzer`] is built for one project directory and writes to two
//! sinks. Recognised findings become [`Issue`]s on the primary sink,
//! separated by `\0`. Findings of a kind the analyzer does not know how to
//! report produce a single diagnostics line and the run carries on.
//!
//! # Example
//!
//! ```no_run
//! use gemaudit::{AdvisoryScanner, Analyzer, Database};
//!
//! fn main() -> anyhow::Result<()> {
//!     let scanner = AdvisoryScanner::new(Database::open(Database::default_path())?);
//!     let stdout = std::io::stdout();
//!
//!     Analyzer::new("path/to/app", scanner)
//!         .with_stdout(stdout.lock())
//!         .with_stderr(std::io::stderr())
//!         .run()?;
//!     Ok(())
//! }
//! ```

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::{AnalyzerError, LockfileError};
use crate::lockfile::{GemfileLockLoader, ManifestLoader};
use crate::model::Finding;
use crate::output::{Diagnostics, Issue, IssueStream};
use crate::scanner::Scanner;

/// Audits one directory's `Gemfile.lock`.
///
/// Both sinks default to [`io::sink`]; the loader defaults to
/// [`GemfileLockLoader`].
pub struct Analyzer<'a> {
    directory: PathBuf,
    stdout: Box<dyn Write + 'a>,
    stderr: Box<dyn Write + 'a>,
    loader: Box<dyn ManifestLoader + 'a>,
    scanner: Box<dyn Scanner + 'a>,
}

impl<'a> Analyzer<'a> {
    pub fn new(directory: impl Into<PathBuf>, scanner: impl Scanner + 'a) -> Self {
        Self {
            directory: directory.into(),
            stdout: Box::new(io::sink()),
            stderr: Box::new(io::sink()),
            loader: Box::new(GemfileLockLoader),
            scanner: Box::new(scanner),
        }
    }

    /// Sets the sink issues are written to.
    pub fn with_stdout(mut self, stdout: impl Write + 'a) -> Self {
        self.stdout = Box::new(stdout);
        self
    }

    /// Sets the sink diagnostics are written to.
    pub fn with_stderr(mut self, stderr: impl Write + 'a) -> Self {
        self.stderr = Box::new(stderr);
        self
    }

    pub fn with_loader(mut self, loader: impl ManifestLoader + 'a) -> Self {
        self.loader = Box::new(loader);
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Runs the audit.
    ///
    /// # Errors
    ///
    /// - [`AnalyzerError::GemfileLockNotFound`] when the directory has no
    ///   lockfile. Neither sink is written to and the scanner is not invoked.
    /// - [`AnalyzerError::Lockfile`] when the lockfile cannot be read or parsed.
    /// - [`AnalyzerError::Io`] or [`AnalyzerError::Serialize`] when writing
    ///   an issue fails.
    pub fn run(&mut self) -> Result<(), AnalyzerError> {
        let manifest = match self.loader.load(&self.directory) {
            Ok(manifest) => manifest,
            Err(LockfileError::NotFound { .. }) => {
                return Err(AnalyzerError::GemfileLockNotFound {
                    directory: self.directory.clone(),
                });
            }
            Err(e) => return Err(AnalyzerError::Lockfile(e)),
        };
        let path = manifest.file_name();

        let mut issues = IssueStream::new(&mut self.stdout);
        let mut diagnostics = Diagnostics::new(&mut self.stderr);

        for finding in self.scanner.scan(&manifest) {
            match finding {
                Finding::UnpatchedGem { gem, advisory } => {
                    tracing::debug!(gem = %gem, advisory = %advisory.id, "unpatched gem");
                    issues.write_issue(&Issue::unpatched_gem(&gem, &advisory, &path))?;
                }
                Finding::InsecureSource(source) => {
                    tracing::debug!(uri = %source.uri, "insecure source");
                    issues.write_issue(&Issue::insecure_source(&source, &path))?;
                }
                Finding::Unsupported { kind } => {
                    tracing::warn!(kind = %kind, "unsupported vulnerability");
                    diagnostics.unsupported(&kind)?;
                }
            }
        }

        tracing::debug!(
            directory = %self.directory.display(),
            issues = issues.written(),
            diagnostics = diagnostics.written(),
            "analysis complete"
        );

        issues.flush()?;
        diagnostics.flush()?;
        Ok(())
    }
}
