//! Core data types for lockfiles, advisories, and scan findings.
//!
//! This module contains the fundamental types used throughout gemaudit:
//!
//! - [`Manifest`] - A parsed `Gemfile.lock`
//! - [`GemSpec`] - A locked gem and the line it was declared on
//! - [`Source`] - Where gems are fetched from (rubygems remote, git, path)
//! - [`Advisory`] - A known vulnerability record
//! - [`Finding`] - A raw scan result, prior to normalization
//!
//! # Example
//!
//! ```
//! use gemaudit::model::{GemSpec, Manifest};
//! use gemaudit::version::GemVersion;
//!
//! let spec = GemSpec::new("rack", GemVersion::parse("1.4.1").unwrap(), 7);
//! let manifest = Manifest::new("Gemfile.lock", vec![], vec![spec]);
//!
//! assert!(manifest.find_spec("rack").is_some());
//! ```

mod advisory;
mod finding;
mod manifest;

pub use advisory::*;
pub use finding::*;
pub use manifest::*;
