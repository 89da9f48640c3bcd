//! Plain-text diagnostics for findings that produce no issue.

use std::io::{self, Write};

/// Writes one diagnostic per line. Lines are separated by `\n`; nothing
/// follows the last one.
pub struct Diagnostics<W: Write> {
    sink: W,
    written: usize,
}

impl<W: Write> Diagnostics<W> {
    pub fn new(sink: W) -> Self {
        Self { sink, written: 0 }
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn unsupported(&mut self, kind: &str) -> io::Result<()> {
        self.line(&format!("Unsupported vulnerability: {}", kind))
    }

    pub fn line(&mut self, message: &str) -> io::Result<()> {
        if self.written > 0 {
            self.sink.write_all(b"\n")?;
        }
        self.sink.write_all(message.as_bytes())?;
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_diagnostic_has_no_newline() {
        let mut diagnostics = Diagnostics::new(Vec::new());
        diagnostics.unsupported("UnhandledVulnerability").unwrap();
        assert_eq!(
            String::from_utf8(diagnostics.into_inner()).unwrap(),
            "Unsupported vulnerability: UnhandledVulnerability"
        );
    }

    #[test]
    fn test_diagnostics_are_newline_separated() {
        let mut diagnostics = Diagnostics::new(Vec::new());
        diagnostics.unsupported("A").unwrap();
        diagnostics.unsupported("B").unwrap();
        assert_eq!(diagnostics.written(), 2);
        assert_eq!(
            String::from_utf8(diagnostics.into_inner()).unwrap(),
            "Unsupported vulnerability: A\nUnsupported vulnerability: B"
        );
    }
}
