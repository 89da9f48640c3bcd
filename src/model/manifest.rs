use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::version::GemVersion;

/// A `remote:` entry of a rubygems source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Remote {
    pub uri: String,
    pub line: usize,
}

/// A gem source section of the lockfile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Source {
    Rubygems {
        remotes: Vec<Remote>,
    },
    Git {
        uri: String,
        line: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        revision: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        branch: Option<String>,
    },
    Path {
        path: String,
        line: usize,
    },
}

/// A locked gem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GemSpec {
    pub name: String,
    #[serde(serialize_with = "serialize_display")]
    pub version: GemVersion,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    pub line: usize,
}

impl GemSpec {
    pub fn new(name: impl Into<String>, version: GemVersion, line: usize) -> Self {
        Self {
            name: name.into(),
            version,
            platform: None,
            line,
        }
    }

    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }
}

impl std::fmt::Display for GemSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.version)
    }
}

fn serialize_display<S: serde::Serializer>(
    value: &GemVersion,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// A parsed `Gemfile.lock`.
///
/// Sources and specs keep lockfile order. Once loaded, a manifest is never
/// mutated.
#[derive(Debug, Clone, Serialize)]
pub struct Manifest {
    path: PathBuf,
    sources: Vec<Source>,
    specs: Vec<GemSpec>,
}

impl Manifest {
    pub fn new(path: impl Into<PathBuf>, sources: Vec<Source>, specs: Vec<GemSpec>) -> Self {
        Self {
            path: path.into(),
            sources,
            specs,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The lockfile name used as the location of reported issues.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub fn specs(&self) -> &[GemSpec] {
        &self.specs
    }

    pub fn find_spec(&self, name: &str) -> Option<&GemSpec> {
        self.specs.iter().find(|s| s.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(name: &str, version: &str, line: usize) -> GemSpec {
        GemSpec::new(name, GemVersion::parse(version).unwrap(), line)
    }

    #[test]
    fn test_file_name() {
        let manifest = Manifest::new("/srv/app/Gemfile.lock", vec![], vec![]);
        assert_eq!(manifest.file_name(), "Gemfile.lock");
        assert_eq!(manifest.path(), Path::new("/srv/app/Gemfile.lock"));
    }

    #[test]
    fn test_find_spec() {
        let manifest = Manifest::new(
            "Gemfile.lock",
            vec![],
            vec![spec("rack", "1.4.1", 4), spec("rails", "3.2.10", 9)],
        );

        assert_eq!(manifest.find_spec("rails").map(|s| s.line), Some(9));
        assert!(manifest.find_spec("sinatra").is_none());
        assert_eq!(manifest.specs().len(), 2);
    }

    #[test]
    fn test_spec_display() {
        let gem = spec("nokogiri", "1.6.0", 3).with_platform("x86_64-linux");
        assert_eq!(gem.to_string(), "nokogiri (1.6.0)");
        assert_eq!(gem.platform.as_deref(), Some("x86_64-linux"));
    }

    #[test]
    fn test_source_serializes_tagged() {
        let source = Source::Git {
            uri: "git://github.com/rails/rails.git".to_string(),
            line: 1,
            revision: None,
            branch: None,
        };
        let json = serde_json::to_value(&source).unwrap();
        assert_eq!(json["type"], "git");
        assert_eq!(json["uri"], "git://github.com/rails/rails.git");
        assert!(json.get("revision").is_none());
    }
}
