//! `Gemfile.lock` parser.
//!
//! The format is line oriented. Top-level section headers start in column
//! zero; source attributes are indented two spaces, specs four, and the
//! dependencies of each spec six:
//!
//! ```text
//! GEM
//!   remote: https://rubygems.org/
//!   specs:
//!     actionpack (3.2.10)
//!       activemodel (= 3.2.10)
//!
//! PLATFORMS
//!   ruby
//! ```

use std::path::Path;

use crate::error::LockfileError;
use crate::model::{GemSpec, Manifest, Remote, Source};
use crate::version::GemVersion;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Gem,
    Git,
    Path,
    Other,
}

impl Section {
    fn from_header(header: &str) -> Self {
        match header {
            "GEM" => Section::Gem,
            "GIT" => Section::Git,
            "PATH" => Section::Path,
            _ => Section::Other,
        }
    }
}

/// Source attributes collected until the section ends.
#[derive(Default)]
struct PendingSource {
    remotes: Vec<Remote>,
    revision: Option<String>,
    branch: Option<String>,
}

impl PendingSource {
    fn finish(self, section: Section) -> Option<Source> {
        match section {
            Section::Gem => Some(Source::Rubygems {
                remotes: self.remotes,
            }),
            Section::Git => {
                let remote = self.remotes.into_iter().next()?;
                Some(Source::Git {
                    uri: remote.uri,
                    line: remote.line,
                    revision: self.revision,
                    branch: self.branch,
                })
            }
            Section::Path => {
                let remote = self.remotes.into_iter().next()?;
                Some(Source::Path {
                    path: remote.uri,
                    line: remote.line,
                })
            }
            Section::Other => None,
        }
    }
}

/// Parses lockfile `content`. `path` is recorded on the manifest and used
/// in error messages.
pub fn parse(content: &str, path: &Path) -> Result<Manifest, LockfileError> {
    let mut sources = Vec::new();
    let mut specs = Vec::new();

    let mut section = Section::Other;
    let mut pending = PendingSource::default();

    for (index, raw) in content.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim_end();

        if line.is_empty() {
            continue;
        }

        let indent = line.len() - line.trim_start_matches(' ').len();

        if indent == 0 {
            if let Some(source) = std::mem::take(&mut pending).finish(section) {
                sources.push(source);
            }
            section = Section::from_header(line);
            continue;
        }

        if section == Section::Other {
            continue;
        }

        let body = &line[indent..];
        match indent {
            2 => {
                if let Some((key, value)) = body.split_once(':') {
                    let value = value.trim().to_string();
                    match key {
                        "remote" => pending.remotes.push(Remote {
                            uri: value,
                            line: line_no,
                        }),
                        "revision" => pending.revision = Some(value),
                        "branch" => pending.branch = Some(value),
                        _ => {}
                    }
                }
            }
            4 => specs.push(parse_spec(body, line_no, path)?),
            _ => {}
        }
    }

    if let Some(source) = pending.finish(section) {
        sources.push(source);
    }

    Ok(Manifest::new(path, sources, specs))
}

/// Parses `name (version)` or `name (version-platform)`.
fn parse_spec(body: &str, line: usize, path: &Path) -> Result<GemSpec, LockfileError> {
    let parse_error = |reason: String| LockfileError::Parse {
        path: path.to_path_buf(),
        line,
        reason,
    };

    let (name, rest) = body
        .split_once(" (")
        .ok_or_else(|| parse_error(format!("missing version in spec '{}'", body)))?;
    let locked = rest
        .strip_suffix(')')
        .ok_or_else(|| parse_error(format!("unterminated version in spec '{}'", body)))?;

    let (version, platform) = match locked.split_once('-') {
        Some((version, platform)) => (version, Some(platform)),
        None => (locked, None),
    };

    let version = GemVersion::parse(version).map_err(|e| parse_error(e.to_string()))?;

    let spec = GemSpec::new(name, version, line);
    Ok(match platform {
        Some(platform) => spec.with_platform(platform),
        None => spec,
    })
}
