//! Code Climate issue documents.
//!
//! Field order follows the struct declaration, so serializing the same
//! finding twice produces the same bytes.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::model::{Advisory, Criticality, GemSpec, InsecureSource};

/// Remediation cost of an upgrade that crosses a major version.
pub const MAJOR_UPGRADE_POINTS: u64 = 50_000_000;
/// Remediation cost of an upgrade that crosses a minor version.
pub const MINOR_UPGRADE_POINTS: u64 = 5_000_000;
/// Remediation cost of a patch-level upgrade.
pub const PATCH_UPGRADE_POINTS: u64 = 500_000;
/// Remediation cost when no patched release exists.
pub const UNPATCHED_POINTS: u64 = 500_000_000;
/// Remediation cost of switching a source to a secure protocol.
pub const INSECURE_SOURCE_POINTS: u64 = 5_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckName {
    #[serde(rename = "Insecure Dependency")]
    InsecureDependency,
    #[serde(rename = "Insecure Source")]
    InsecureSource,
}

impl CheckName {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckName::InsecureDependency => "Insecure Dependency",
            CheckName::InsecureSource => "Insecure Source",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Info,
    Minor,
    Major,
    Critical,
    Blocker,
}

impl IssueSeverity {
    pub fn from_criticality(criticality: Option<Criticality>) -> Self {
        match criticality {
            Some(Criticality::Critical) | Some(Criticality::High) => IssueSeverity::Critical,
            Some(Criticality::Medium) => IssueSeverity::Major,
            Some(Criticality::Low) => IssueSeverity::Minor,
            Some(Criticality::None) | None => IssueSeverity::Info,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lines {
    pub begin: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub path: String,
    pub lines: Lines,
}

impl Location {
    pub fn line(path: impl Into<String>, line: usize) -> Self {
        Self {
            path: path.into(),
            lines: Lines {
                begin: line,
                end: line,
            },
        }
    }
}

/// The locked gem an issue is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    pub version: String,
}

impl Package {
    pub fn from_spec(gem: &GemSpec) -> Self {
        Self {
            name: gem.name.clone(),
            version: gem.version.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    pub body: String,
}

/// One reportable problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    #[serde(rename = "type")]
    pub kind: String,
    pub check_name: CheckName,
    pub description: String,
    pub categories: Vec<String>,
    pub remediation_points: u64,
    pub severity: IssueSeverity,
    pub location: Location,
    /// Set for dependency issues, absent for source issues.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub package: Option<Package>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub content: Option<Content>,
    pub fingerprint: String,
}

impl Issue {
    fn new(check_name: CheckName, description: String, location: Location, key: &[&str]) -> Self {
        Self {
            kind: "Issue".to_string(),
            check_name,
            description,
            categories: vec!["Security".to_string()],
            remediation_points: 0,
            severity: IssueSeverity::Info,
            location,
            package: None,
            content: None,
            fingerprint: fingerprint(check_name, key),
        }
    }

    /// Builds the issue for a locked gem covered by `advisory`.
    ///
    /// `path` is the lockfile name reported as the issue location.
    pub fn unpatched_gem(gem: &GemSpec, advisory: &Advisory, path: &str) -> Self {
        let identifier = advisory.identifier();
        let summary = advisory.summary();
        let description = if summary.is_empty() {
            identifier.clone()
        } else {
            summary
        };

        let mut issue = Self::new(
            CheckName::InsecureDependency,
            description,
            Location::line(path, gem.line),
            &[gem.name.as_str(), identifier.as_str()],
        );
        issue.remediation_points = remediation_points(gem, advisory);
        issue.severity = IssueSeverity::from_criticality(advisory.criticality());
        issue.package = Some(Package::from_spec(gem));
        issue.content = Some(Content {
            body: content_body(&identifier, advisory),
        });
        issue
    }

    /// Builds the issue for a source using an insecure protocol.
    pub fn insecure_source(source: &InsecureSource, path: &str) -> Self {
        let mut issue = Self::new(
            CheckName::InsecureSource,
            format!("Insecure Source URI found: {}", source.uri),
            Location::line(path, source.line),
            &[source.uri.as_str()],
        );
        issue.remediation_points = INSECURE_SOURCE_POINTS;
        issue.severity = IssueSeverity::Major;
        issue
    }
}

/// SHA-256 over the check name and the finding key, joined with `|`.
/// Line numbers are not part of the key.
pub fn fingerprint(check_name: CheckName, key: &[&str]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(check_name.as_str().as_bytes());
    for part in key {
        hasher.update(b"|");
        hasher.update(part.as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// The advice shown for an unpatched gem.
pub fn solution(advisory: &Advisory) -> String {
    if advisory.patched_versions.is_empty() {
        return "remove or disable this gem until a patch is available!".to_string();
    }
    let versions: Vec<String> = advisory
        .patched_versions
        .iter()
        .map(|r| r.to_string())
        .collect();
    format!("upgrade to {}", versions.join(", "))
}

fn content_body(identifier: &str, advisory: &Advisory) -> String {
    let criticality = advisory
        .criticality()
        .map(|c| c.display_name())
        .unwrap_or("Unknown");

    [
        format!("**Advisory**: {}", identifier),
        format!("**Criticality**: {}", criticality),
        format!("**URL**: {}", advisory.url.as_deref().unwrap_or("")),
        format!("**Solution**: {}", solution(advisory)),
    ]
    .join("\n\n")
}

fn remediation_points(gem: &GemSpec, advisory: &Advisory) -> u64 {
    let Some(target) = advisory.upgrade_target(&gem.version) else {
        return UNPATCHED_POINTS;
    };

    if target.numeric_segment(0) != gem.version.numeric_segment(0) {
        MAJOR_UPGRADE_POINTS
    } else if target.numeric_segment(1) != gem.version.numeric_segment(1) {
        MINOR_UPGRADE_POINTS
    } else {
        PATCH_UPGRADE_POINTS
    }
}
