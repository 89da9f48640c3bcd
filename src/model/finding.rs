use crate::model::{Advisory, GemSpec};

/// A source declared with an unencrypted or unauthenticated protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsecureSource {
    pub uri: String,
    pub line: usize,
}

/// A raw scan result, prior to normalization into an issue.
///
/// Scanners may grow kinds faster than the issue mapper learns to render
/// them; those arrive as [`Finding::Unsupported`] and are reported as
/// diagnostics instead of issues.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum Finding {
    /// A locked gem version covered by an advisory.
    UnpatchedGem { gem: GemSpec, advisory: Advisory },
    /// A gem source using an insecure protocol.
    InsecureSource(InsecureSource),
    /// A finding kind with no issue mapping.
    Unsupported { kind: String },
}

impl Finding {
    pub fn unsupported(kind: impl Into<String>) -> Self {
        Finding::Unsupported { kind: kind.into() }
    }

    pub fn kind_name(&self) -> &str {
        match self {
            Finding::UnpatchedGem { .. } => "UnpatchedGem",
            Finding::InsecureSource(_) => "InsecureSource",
            Finding::Unsupported { kind } => kind,
        }
    }
}
