//! Issue documents and the sinks they are written to.
//!
//! - [`Issue`] - the normalized record emitted for each recognised finding
//! - [`IssueStream`] - writes issues as `\0`-separated JSON documents
//! - [`Diagnostics`] - writes one-line notices for findings with no issue

mod diagnostics;
mod issue;
mod json;

pub use diagnostics::Diagnostics;
pub use issue::{
    fingerprint, solution, CheckName, Content, Issue, IssueSeverity, Lines, Location, Package,
    INSECURE_SOURCE_POINTS, MAJOR_UPGRADE_POINTS, MINOR_UPGRADE_POINTS, PATCH_UPGRADE_POINTS,
    UNPATCHED_POINTS,
};
pub use json::{parse_stream, IssueStream, ISSUE_DELIMITER};
