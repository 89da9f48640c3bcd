//! Audits a Ruby project's `Gemfile.lock` against the ruby-advisory-db.
//!
//! The [`Analyzer`] loads the lockfile, asks a [`Scanner`] for findings and
//! writes each one as a Code Climate issue. See the [`analyzer`] module for
//! the output format.

pub mod analyzer;
pub mod config;
pub mod database;
pub mod error;
pub mod lockfile;
pub mod model;
pub mod output;
pub mod platform;
pub mod scanner;
pub mod version;

pub use analyzer::Analyzer;
pub use config::Config;
pub use database::Database;
pub use error::AnalyzerError;
pub use lockfile::{GemfileLockLoader, ManifestLoader};
pub use model::{Finding, Manifest};
pub use output::Issue;
pub use scanner::{AdvisoryScanner, Scanner};
