//! RubyGems version ordering and requirement matching.
//!
//! Gem versions are not SemVer: they may carry any number of segments and
//! alphanumeric parts (`3.0.0.rc.2`, `2.2.2.backport2`). A version is split
//! into runs of digits and runs of letters; a letter run anywhere marks the
//! version as a pre-release and sorts below any number in the same position.
//!
//! # Example
//!
//! ```
//! use gemaudit::version::{GemVersion, Requirement};
//!
//! let installed = GemVersion::parse("3.0.0.rc.2").unwrap();
//! let patched = Requirement::parse("~> 3.0.1").unwrap();
//!
//! assert!(installed < GemVersion::parse("3.0.0").unwrap());
//! assert!(!patched.is_satisfied_by(&installed));
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::error::VersionError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Number(u64),
    Text(String),
}

impl Segment {
    fn is_zero(&self) -> bool {
        matches!(self, Segment::Number(0))
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Number(n) => write!(f, "{}", n),
            Segment::Text(s) => write!(f, "{}", s),
        }
    }
}

/// A RubyGems version number.
#[derive(Debug, Clone)]
pub struct GemVersion {
    raw: String,
    segments: Vec<Segment>,
}

impl GemVersion {
    /// Parses a version string.
    ///
    /// Dashes are rewritten to `.pre.` the same way RubyGems does, so
    /// `1.0.0-rc1` orders like `1.0.0.pre.rc1`. An empty string is `0`.
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(Self {
                raw: "0".to_string(),
                segments: vec![Segment::Number(0)],
            });
        }

        if !is_well_formed(trimmed) {
            return Err(VersionError::Malformed(input.to_string()));
        }

        let raw = trimmed.replace('-', ".pre.");
        let segments = split_segments(&raw)
            .ok_or_else(|| VersionError::Malformed(input.to_string()))?;

        Ok(Self { raw, segments })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns true if any segment contains letters.
    pub fn is_prerelease(&self) -> bool {
        self.segments.iter().any(|s| matches!(s, Segment::Text(_)))
    }

    /// The release this version is a pre-release of (`1.2.b.3` -> `1.2`).
    pub fn release(&self) -> GemVersion {
        if !self.is_prerelease() {
            return self.clone();
        }
        let segments: Vec<Segment> = self
            .segments
            .iter()
            .take_while(|s| matches!(s, Segment::Number(_)))
            .cloned()
            .collect();
        Self::from_segments(segments)
    }

    /// The next significant release (`5.3.1` -> `5.4`, `5` -> `6`).
    ///
    /// Used as the exclusive upper bound of `~>` constraints.
    pub fn bump(&self) -> GemVersion {
        let mut segments: Vec<Segment> = self
            .segments
            .iter()
            .take_while(|s| matches!(s, Segment::Number(_)))
            .cloned()
            .collect();
        if segments.len() > 1 {
            segments.pop();
        }
        match segments.last_mut() {
            Some(Segment::Number(n)) => *n = n.saturating_add(1),
            _ => segments.push(Segment::Number(1)),
        }
        Self::from_segments(segments)
    }

    /// Returns the numeric segment at `index`, treating missing or
    /// alphanumeric segments as zero.
    pub fn numeric_segment(&self, index: usize) -> u64 {
        match self.segments.get(index) {
            Some(Segment::Number(n)) => *n,
            _ => 0,
        }
    }

    fn from_segments(segments: Vec<Segment>) -> Self {
        let raw = segments
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(".");
        Self { raw, segments }
    }

    /// Segments with trailing zeros stripped from both the release part and
    /// the pre-release part, so `1.0` and `1.0.0` compare equal.
    fn canonical_segments(&self) -> Vec<&Segment> {
        let split = self
            .segments
            .iter()
            .position(|s| matches!(s, Segment::Text(_)))
            .unwrap_or(self.segments.len());
        let (numeric, rest) = self.segments.split_at(split);

        let mut canonical: Vec<&Segment> = trim_trailing_zeros(numeric).iter().collect();
        canonical.extend(trim_trailing_zeros(rest).iter());
        canonical
    }
}

fn trim_trailing_zeros(segments: &[Segment]) -> &[Segment] {
    let end = segments
        .iter()
        .rposition(|s| !s.is_zero())
        .map(|i| i + 1)
        .unwrap_or(0);
    &segments[..end]
}

/// Mirrors `\A[0-9]+(\.[0-9a-zA-Z]+)*(-[0-9A-Za-z-]+(\.[0-9A-Za-z-]+)*)?\z`.
fn is_well_formed(version: &str) -> bool {
    let (release, pre) = match version.split_once('-') {
        Some((release, pre)) => (release, Some(pre)),
        None => (version, None),
    };

    let mut parts = release.split('.');
    let first_is_numeric = parts
        .next()
        .map(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(false);
    if !first_is_numeric {
        return false;
    }
    if !parts.all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_alphanumeric())) {
        return false;
    }

    match pre {
        None => true,
        Some(pre) => pre
            .split('.')
            .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')),
    }
}

fn split_segments(raw: &str) -> Option<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut chars = raw.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_ascii_digit() {
            let mut digits = String::new();
            while let Some(&d) = chars.peek().filter(|d| d.is_ascii_digit()) {
                digits.push(d);
                chars.next();
            }
            segments.push(Segment::Number(digits.parse().ok()?));
        } else if c.is_ascii_alphabetic() {
            let mut letters = String::new();
            while let Some(&l) = chars.peek().filter(|l| l.is_ascii_alphabetic()) {
                letters.push(l);
                chars.next();
            }
            segments.push(Segment::Text(letters));
        } else {
            chars.next();
        }
    }

    Some(segments)
}

impl FromStr for GemVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for GemVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl Ord for GemVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let lhs = self.canonical_segments();
        let rhs = other.canonical_segments();
        let zero = Segment::Number(0);

        for i in 0..lhs.len().max(rhs.len()) {
            let l = lhs.get(i).copied().unwrap_or(&zero);
            let r = rhs.get(i).copied().unwrap_or(&zero);

            let ordering = match (l, r) {
                (Segment::Number(a), Segment::Number(b)) => a.cmp(b),
                (Segment::Text(a), Segment::Text(b)) => a.cmp(b),
                (Segment::Text(_), Segment::Number(_)) => Ordering::Less,
                (Segment::Number(_), Segment::Text(_)) => Ordering::Greater,
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }

        Ordering::Equal
    }
}

impl PartialOrd for GemVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for GemVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for GemVersion {}

impl Hash for GemVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical_segments().hash(state);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    NotEq,
    Gt,
    Lt,
    GtEq,
    LtEq,
    Pessimistic,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::NotEq => "!=",
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::GtEq => ">=",
            Operator::LtEq => "<=",
            Operator::Pessimistic => "~>",
        }
    }

    /// Splits a leading operator off a constraint. Longest match first.
    fn split(input: &str) -> (Operator, &str) {
        const OPERATORS: [(&str, Operator); 7] = [
            ("~>", Operator::Pessimistic),
            (">=", Operator::GtEq),
            ("<=", Operator::LtEq),
            ("!=", Operator::NotEq),
            ("=", Operator::Eq),
            (">", Operator::Gt),
            ("<", Operator::Lt),
        ];

        for (token, op) in OPERATORS {
            if let Some(rest) = input.strip_prefix(token) {
                return (op, rest);
            }
        }
        (Operator::Eq, input)
    }
}

/// A single `op version` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub op: Operator,
    pub version: GemVersion,
}

impl Constraint {
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(VersionError::BadRequirement(input.to_string()));
        }
        let (op, rest) = Operator::split(trimmed);
        let version = GemVersion::parse(rest)
            .map_err(|_| VersionError::BadRequirement(input.to_string()))?;
        Ok(Self { op, version })
    }

    pub fn is_satisfied_by(&self, version: &GemVersion) -> bool {
        match self.op {
            Operator::Eq => version == &self.version,
            Operator::NotEq => version != &self.version,
            Operator::Gt => version > &self.version,
            Operator::Lt => version < &self.version,
            Operator::GtEq => version >= &self.version,
            Operator::LtEq => version <= &self.version,
            Operator::Pessimistic => {
                version >= &self.version && version.release() < self.version.bump()
            }
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.op.as_str(), self.version)
    }
}

/// A comma separated list of constraints that must all hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    constraints: Vec<Constraint>,
}

impl Requirement {
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let constraints = input
            .split(',')
            .map(Constraint::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { constraints })
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn is_satisfied_by(&self, version: &GemVersion) -> bool {
        self.constraints.iter().all(|c| c.is_satisfied_by(version))
    }
}

impl FromStr for Requirement {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.constraints.iter().map(|c| c.to_string()).collect();
        write!(f, "{}", parts.join(", "))
    }
}
