//! Null-delimited JSON issue stream.
//!
//! Issues are written as compact JSON documents separated by a single `\0`
//! byte, with no enclosing array and no trailing delimiter. Consumers split
//! on `\0` and parse each segment on its own.

use std::io::{self, Write};

use crate::output::Issue;

pub const ISSUE_DELIMITER: u8 = b'\0';

/// Streams issues to a byte sink as they are produced.
pub struct IssueStream<W: Write> {
    sink: W,
    written: usize,
}

impl<W: Write> IssueStream<W> {
    pub fn new(sink: W) -> Self {
        Self { sink, written: 0 }
    }

    /// Number of issues written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Serializes `issue` and writes it, preceded by the delimiter unless it
    /// is the first issue on this stream.
    pub fn write_issue(&mut self, issue: &Issue) -> Result<(), crate::error::AnalyzerError> {
        let document = serde_json::to_vec(issue)?;
        if self.written > 0 {
            self.sink.write_all(&[ISSUE_DELIMITER])?;
        }
        self.sink.write_all(&document)?;
        self.written += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.sink.flush()
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}

/// Splits a stream produced by [`IssueStream`] back into issues.
pub fn parse_stream(bytes: &[u8]) -> serde_json::Result<Vec<Issue>> {
    bytes
        .split(|b| *b == ISSUE_DELIMITER)
        .filter(|segment| !segment.is_empty())
        .map(serde_json::from_slice::<Issue>)
        .collect()
}
