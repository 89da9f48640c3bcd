//! Local advisory database.
//!
//! Advisories are read from a checkout of the `ruby-advisory-db` layout:
//!
//! ```text
//! <database>/
//!   gems/
//!     actionpack/
//!       CVE-2013-0156.yml
//!       OSVDB-84243.yml
//!     rack/
//!       CVE-2013-0263.yml
//! ```
//!
//! Every file is parsed when the database is opened, so malformed advisories
//! fail fast and lookups during a scan never touch the filesystem. Keeping the
//! checkout up to date is the caller's job.
//!
//! # Example
//!
//! ```no_run
//! use gemaudit::Database;
//!
//! let db = Database::open(Database::default_path())?;
//! println!("{} advisories", db.size());
//! # Ok::<(), gemaudit::error::DatabaseError>(())
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::DatabaseError;
use crate::model::{Advisory, GemSpec};
use crate::platform;
use crate::version::Requirement;

/// On-disk shape of one advisory file.
#[derive(Deserialize)]
struct AdvisoryFile {
    gem: String,
    #[serde(default, deserialize_with = "optional_id")]
    cve: Option<String>,
    #[serde(default, deserialize_with = "optional_id")]
    ghsa: Option<String>,
    #[serde(default, deserialize_with = "optional_id")]
    osvdb: Option<String>,
    url: Option<String>,
    title: String,
    date: Option<NaiveDate>,
    description: Option<String>,
    cvss_v2: Option<f64>,
    cvss_v3: Option<f64>,
    #[serde(default)]
    unaffected_versions: Vec<String>,
    #[serde(default)]
    patched_versions: Vec<String>,
}

/// Identifiers are written bare in YAML, so `osvdb: 89026` arrives as a number.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(u64),
}

fn optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawId>::deserialize(deserializer)?.map(|id| match id {
        RawId::Text(text) => text,
        RawId::Number(number) => number.to_string(),
    }))
}

fn parse_requirements(raw: &[String], path: &Path) -> Result<Vec<Requirement>, DatabaseError> {
    raw.iter()
        .map(|r| {
            Requirement::parse(r).map_err(|source| DatabaseError::Requirement {
                path: path.to_path_buf(),
                source,
            })
        })
        .collect()
}

impl AdvisoryFile {
    fn into_advisory(self, id: String, path: &Path) -> Result<Advisory, DatabaseError> {
        Ok(Advisory {
            id,
            gem: self.gem,
            cve: self.cve,
            ghsa: self.ghsa,
            osvdb: self.osvdb,
            url: self.url,
            title: self.title,
            date: self.date,
            description: self.description,
            cvss_v2: self.cvss_v2,
            cvss_v3: self.cvss_v3,
            unaffected_versions: parse_requirements(&self.unaffected_versions, path)?,
            patched_versions: parse_requirements(&self.patched_versions, path)?,
        })
    }
}

/// Parses a single advisory file. The advisory id is the file stem.
pub fn load_advisory(path: &Path) -> Result<Advisory, DatabaseError> {
    let content = fs::read_to_string(path).map_err(|source| DatabaseError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let file: AdvisoryFile =
        serde_yaml::from_str(&content).map_err(|source| DatabaseError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    let id = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    file.into_advisory(id, path)
}

/// In-memory advisory index keyed by gem name.
///
/// Gems and the advisories of each gem are kept sorted, so scans over an
/// unchanged database always yield findings in the same order.
#[derive(Debug, Clone, Default)]
pub struct Database {
    path: PathBuf,
    advisories: BTreeMap<String, Vec<Advisory>>,
}

impl Database {
    /// Opens the database rooted at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::NotFound`] if `path` has no `gems/`
    /// directory, and a parse error for the first malformed advisory.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, DatabaseError> {
        let path = path.into();
        let gems_dir = path.join("gems");

        if !gems_dir.is_dir() {
            return Err(DatabaseError::NotFound { path });
        }

        let mut advisories: BTreeMap<String, Vec<Advisory>> = BTreeMap::new();

        let walker = WalkDir::new(&gems_dir)
            .min_depth(2)
            .max_depth(2)
            .sort_by_file_name();

        for entry in walker {
            let entry = entry.map_err(|e| DatabaseError::Io {
                path: e.path().map(Path::to_path_buf).unwrap_or_else(|| gems_dir.clone()),
                source: e.into(),
            })?;

            let file = entry.path();
            if !entry.file_type().is_file()
                || file.extension().map(|ext| ext != "yml").unwrap_or(true)
            {
                continue;
            }

            let advisory = load_advisory(file)?;
            advisories
                .entry(advisory.gem.clone())
                .or_default()
                .push(advisory);
        }

        let db = Self { path, advisories };
        tracing::debug!(
            path = %db.path.display(),
            gems = db.advisories.len(),
            advisories = db.size(),
            "loaded advisory database"
        );
        Ok(db)
    }

    /// Builds a database from already parsed advisories.
    pub fn from_advisories(advisories: impl IntoIterator<Item = Advisory>) -> Self {
        let mut index: BTreeMap<String, Vec<Advisory>> = BTreeMap::new();
        for advisory in advisories {
            index.entry(advisory.gem.clone()).or_default().push(advisory);
        }
        for list in index.values_mut() {
            list.sort_by(|a, b| a.id.cmp(&b.id));
        }
        Self {
            path: PathBuf::new(),
            advisories: index,
        }
    }

    /// The default checkout location, `<data_dir>/ruby-advisory-db`.
    pub fn default_path() -> PathBuf {
        platform::advisory_db_dir()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Total number of advisories.
    pub fn size(&self) -> usize {
        self.advisories.values().map(Vec::len).sum()
    }

    pub fn gems(&self) -> impl Iterator<Item = &str> {
        self.advisories.keys().map(String::as_str)
    }

    pub fn advisories_for(&self, gem: &str) -> &[Advisory] {
        self.advisories.get(gem).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Advisories the locked version of `spec` is vulnerable to.
    pub fn check_gem<'a>(&'a self, spec: &'a GemSpec) -> impl Iterator<Item = &'a Advisory> + 'a {
        self.advisories_for(&spec.name)
            .iter()
            .filter(move |advisory| advisory.is_vulnerable(&spec.version))
    }
}
