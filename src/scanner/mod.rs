//! Vulnerability scanning.
//!
//! This module provides the [`Scanner`] trait the analyzer consumes findings
//! through, and [`AdvisoryScanner`], which checks a manifest against a local
//! [`Database`].
//!
//! Findings are produced lazily. The analyzer pulls one finding at a time
//! and writes it out before asking for the next, so a scanner never has to
//! hold the full result set.
//!
//! # Example
//!
//! ```no_run
//! use gemaudit::lockfile::{GemfileLockLoader, ManifestLoader};
//! use gemaudit::scanner::{AdvisoryScanner, Scanner};
//! use gemaudit::Database;
//!
//! fn main() -> anyhow::Result<()> {
//!     let manifest = GemfileLockLoader.load(std::path::Path::new("."))?;
//!     let scanner = AdvisoryScanner::new(Database::open(Database::default_path())?);
//!
//!     for finding in scanner.scan(&manifest) {
//!         println!("{}", finding.kind_name());
//!     }
//!     Ok(())
//! }
//! ```

mod sources;

pub use sources::{insecure_sources, is_internal_host};

use std::collections::BTreeSet;

use crate::database::Database;
use crate::model::{Advisory, Finding, Manifest};

/// Produces the raw findings for a manifest.
pub trait Scanner {
    /// Returns a lazy, finite sequence of findings for `manifest`.
    fn scan<'a>(&'a self, manifest: &'a Manifest) -> Box<dyn Iterator<Item = Finding> + 'a>;
}

impl<S: Scanner + ?Sized> Scanner for &S {
    fn scan<'a>(&'a self, manifest: &'a Manifest) -> Box<dyn Iterator<Item = Finding> + 'a> {
        (**self).scan(manifest)
    }
}

impl<S: Scanner + ?Sized> Scanner for Box<S> {
    fn scan<'a>(&'a self, manifest: &'a Manifest) -> Box<dyn Iterator<Item = Finding> + 'a> {
        (**self).scan(manifest)
    }
}

/// Scans sources and locked gems against an advisory database.
///
/// Insecure sources are yielded first, then unpatched gems in lockfile
/// order.
#[derive(Debug, Clone)]
pub struct AdvisoryScanner {
    database: Database,
    ignore: BTreeSet<String>,
}

impl AdvisoryScanner {
    pub fn new(database: Database) -> Self {
        Self {
            database,
            ignore: BTreeSet::new(),
        }
    }

    /// Skips advisories whose id or any identifier (`CVE-…`, `GHSA-…`,
    /// `OSVDB-…`) is listed.
    pub fn with_ignore<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    fn is_ignored(&self, advisory: &Advisory) -> bool {
        if self.ignore.is_empty() {
            return false;
        }
        self.ignore.contains(&advisory.id)
            || advisory
                .identifiers()
                .iter()
                .any(|id| self.ignore.contains(id))
    }

    pub fn scan_sources<'a>(&'a self, manifest: &'a Manifest) -> impl Iterator<Item = Finding> + 'a {
        manifest
            .sources()
            .iter()
            .flat_map(insecure_sources)
            .map(Finding::InsecureSource)
    }

    pub fn scan_specs<'a>(&'a self, manifest: &'a Manifest) -> impl Iterator<Item = Finding> + 'a {
        manifest.specs().iter().flat_map(move |spec| {
            self.database
                .check_gem(spec)
                .filter(move |advisory| {
                    let ignored = self.is_ignored(advisory);
                    if ignored {
                        tracing::debug!(gem = %spec.name, advisory = %advisory.id, "ignoring advisory");
                    }
                    !ignored
                })
                .map(move |advisory| Finding::UnpatchedGem {
                    gem: spec.clone(),
                    advisory: advisory.clone(),
                })
        })
    }
}

impl Scanner for AdvisoryScanner {
    fn scan<'a>(&'a self, manifest: &'a Manifest) -> Box<dyn Iterator<Item = Finding> + 'a> {
        Box::new(self.scan_sources(manifest).chain(self.scan_specs(manifest)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GemSpec, Remote, Source};
    use crate::version::GemVersion;

    fn spec(name: &str, version: &str, line: usize) -> GemSpec {
        GemSpec::new(name, GemVersion::parse(version).unwrap(), line)
    }

    fn advisory(id: &str, gem: &str, patched: &str) -> Advisory {
        let mut advisory = Advisory::new(id, gem, format!("{} advisory", id));
        advisory.patched_versions = vec![patched.parse().unwrap()];
        advisory
    }

    fn manifest() -> Manifest {
        Manifest::new(
            "Gemfile.lock",
            vec![Source::Rubygems {
                remotes: vec![Remote {
                    uri: "http://rubygems.org/".to_string(),
                    line: 2,
                }],
            }],
            vec![spec("rack", "1.4.1", 4), spec("rails", "3.2.10", 5)],
        )
    }

    fn scanner() -> AdvisoryScanner {
        let mut rack = advisory("CVE-2013-0263", "rack", ">= 1.4.5");
        rack.osvdb = Some("89939".to_string());
        AdvisoryScanner::new(Database::from_advisories(vec![
            rack,
            advisory("CVE-2013-0155", "rails", ">= 3.2.11"),
            advisory("CVE-2013-0333", "rails", ">= 3.2.11"),
        ]))
    }

    #[test]
    fn test_scan_order() {
        let manifest = manifest();
        let scanner = scanner();
        let kinds: Vec<String> = scanner
            .scan(&manifest)
            .map(|f| match f {
                Finding::InsecureSource(source) => source.uri,
                Finding::UnpatchedGem { gem, advisory } => format!("{}:{}", gem.name, advisory.id),
                other => other.kind_name().to_string(),
            })
            .collect();

        assert_eq!(
            kinds,
            vec![
                "http://rubygems.org/",
                "rack:CVE-2013-0263",
                "rails:CVE-2013-0155",
                "rails:CVE-2013-0333",
            ]
        );
    }

    #[test]
    fn test_ignore_by_id_or_identifier() {
        let manifest = manifest();

        let scanner = scanner().with_ignore(["CVE-2013-0155"]);
        assert_eq!(scanner.scan_specs(&manifest).count(), 2);

        let scanner = scanner.with_ignore(vec!["OSVDB-89939".to_string()]);
        assert_eq!(scanner.scan_specs(&manifest).count(), 1);
    }

    #[test]
    fn test_patched_gems_yield_nothing() {
        let manifest = Manifest::new("Gemfile.lock", vec![], vec![spec("rack", "1.5.2", 4)]);
        let scanner = scanner();
        assert_eq!(scanner.scan(&manifest).count(), 0);
    }

    #[test]
    fn test_scan_through_reference() {
        let manifest = manifest();
        let scanner = scanner();
        let boxed: Box<dyn Scanner + '_> = Box::new(&scanner);
        assert_eq!(boxed.scan(&manifest).count(), 4);
    }
}
