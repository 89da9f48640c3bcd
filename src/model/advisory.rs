use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::version::{GemVersion, Operator, Requirement};

/// Severity bucket derived from an advisory's CVSS scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Criticality {
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl Criticality {
    /// Buckets a CVSS v3 base score.
    pub fn from_cvss_v3(score: f64) -> Self {
        match score {
            s if s >= 9.0 => Criticality::Critical,
            s if s >= 7.0 => Criticality::High,
            s if s >= 4.0 => Criticality::Medium,
            s if s > 0.0 => Criticality::Low,
            _ => Criticality::None,
        }
    }

    /// Buckets a CVSS v2 base score. v2 has no critical band.
    pub fn from_cvss_v2(score: f64) -> Self {
        match score {
            s if s >= 7.0 => Criticality::High,
            s if s >= 4.0 => Criticality::Medium,
            _ => Criticality::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Criticality::None => "none",
            Criticality::Low => "low",
            Criticality::Medium => "medium",
            Criticality::High => "high",
            Criticality::Critical => "critical",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Criticality::None => "None",
            Criticality::Low => "Low",
            Criticality::Medium => "Medium",
            Criticality::High => "High",
            Criticality::Critical => "Critical",
        }
    }
}

impl std::fmt::Display for Criticality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// A known-vulnerability record for one gem.
#[derive(Debug, Clone)]
pub struct Advisory {
    /// The advisory file stem, e.g. `CVE-2013-0156` or `OSVDB-89026`.
    pub id: String,
    pub gem: String,
    pub cve: Option<String>,
    pub ghsa: Option<String>,
    pub osvdb: Option<String>,
    pub url: Option<String>,
    pub title: String,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    pub cvss_v2: Option<f64>,
    pub cvss_v3: Option<f64>,
    pub unaffected_versions: Vec<Requirement>,
    pub patched_versions: Vec<Requirement>,
}

impl Advisory {
    pub fn new(id: impl Into<String>, gem: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            gem: gem.into(),
            cve: None,
            ghsa: None,
            osvdb: None,
            url: None,
            title: title.into(),
            date: None,
            description: None,
            cvss_v2: None,
            cvss_v3: None,
            unaffected_versions: Vec::new(),
            patched_versions: Vec::new(),
        }
    }

    pub fn cve_id(&self) -> Option<String> {
        self.cve.as_ref().map(|id| format!("CVE-{}", id))
    }

    pub fn ghsa_id(&self) -> Option<String> {
        self.ghsa.as_ref().map(|id| format!("GHSA-{}", id))
    }

    pub fn osvdb_id(&self) -> Option<String> {
        self.osvdb.as_ref().map(|id| format!("OSVDB-{}", id))
    }

    /// All external identifiers, most specific first.
    pub fn identifiers(&self) -> Vec<String> {
        [self.cve_id(), self.ghsa_id(), self.osvdb_id()]
            .into_iter()
            .flatten()
            .collect()
    }

    /// The identifier shown to users: CVE, then GHSA, then OSVDB, then the
    /// advisory id.
    pub fn identifier(&self) -> String {
        self.identifiers()
            .into_iter()
            .next()
            .unwrap_or_else(|| self.id.clone())
    }

    /// CVSS v3 takes precedence over v2. `None` when neither is present.
    pub fn criticality(&self) -> Option<Criticality> {
        if let Some(score) = self.cvss_v3 {
            return Some(Criticality::from_cvss_v3(score));
        }
        self.cvss_v2.map(Criticality::from_cvss_v2)
    }

    pub fn is_patched(&self, version: &GemVersion) -> bool {
        self.patched_versions
            .iter()
            .any(|r| r.is_satisfied_by(version))
    }

    pub fn is_unaffected(&self, version: &GemVersion) -> bool {
        self.unaffected_versions
            .iter()
            .any(|r| r.is_satisfied_by(version))
    }

    pub fn is_vulnerable(&self, version: &GemVersion) -> bool {
        !self.is_patched(version) && !self.is_unaffected(version)
    }

    /// The lowest patched version above `current`, taken from the lower
    /// bounds of the patched requirements.
    pub fn upgrade_target(&self, current: &GemVersion) -> Option<GemVersion> {
        self.patched_versions
            .iter()
            .flat_map(|r| r.constraints())
            .filter(|c| {
                matches!(
                    c.op,
                    Operator::GtEq | Operator::Gt | Operator::Pessimistic | Operator::Eq
                )
            })
            .map(|c| &c.version)
            .filter(|v| *v > current)
            .min()
            .cloned()
    }

    /// Whitespace-collapsed title, suitable for a one-line description.
    pub fn summary(&self) -> String {
        self.title.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}
