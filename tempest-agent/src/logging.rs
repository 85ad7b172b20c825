//! Log destination setup
//!
//! The agent's metric lines go to stdout, so log output needs a home
//! that will not corrupt the metric stream. Three destinations are
//! supported: stderr (default), a plain file, or stdout itself with
//! every log line rewritten as a `# ` comment, which telegraf's
//! line-protocol parser skips.

use env_logger::{Builder, Target};
use log::LevelFilter;
use std::fs::File;
use std::io::{self, Write};

/// Initialize the process logger
///
/// `destination` is `stderr`, `stdout`, or a file path; matching is
/// case-insensitive for the two stream names. `level` falls back to
/// `info` when unparsable, and `RUST_LOG` still overrides everything.
pub fn init(destination: &str, level: &str) -> io::Result<()> {
    let level = level.parse::<LevelFilter>().unwrap_or(LevelFilter::Info);

    let mut builder = Builder::new();
    builder.filter_level(level);
    builder.parse_default_env();

    match destination.to_ascii_lowercase().as_str() {
        "" | "stderr" => {
            builder.target(Target::Stderr);
        }
        "stdout" => {
            builder.target(Target::Pipe(Box::new(CommentWriter::new(io::stdout()))));
        }
        _ => {
            let file = File::create(destination)?;
            builder.target(Target::Pipe(Box::new(file)));
        }
    }

    builder.init();
    Ok(())
}

/// Writer that emits every complete line prefixed with `# `
///
/// Log writes are not guaranteed to arrive one line at a time, so
/// partial lines are buffered until their newline shows up. Empty
/// lines are discarded.
pub struct CommentWriter<W: Write> {
    inner: W,
    pending: Vec<u8>,
}

impl<W: Write> CommentWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            pending: Vec::new(),
        }
    }

    /// Recover the wrapped writer, dropping any buffered partial line
    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for CommentWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);

        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            // a bare newline carries nothing worth commenting
            if line.len() > 1 {
                self.inner.write_all(b"# ")?;
                self.inner.write_all(&line)?;
            }
        }

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn written(writes: &[&str]) -> String {
        let mut writer = CommentWriter::new(Vec::new());
        for chunk in writes {
            writer.write_all(chunk.as_bytes()).unwrap();
        }
        String::from_utf8(writer.into_inner()).unwrap()
    }

    #[test]
    fn test_complete_lines_are_commented() {
        assert_eq!(
            written(&["first line\nsecond line\n"]),
            "# first line\n# second line\n"
        );
    }

    #[test]
    fn test_partial_line_buffers_until_newline() {
        assert_eq!(written(&["no newline yet"]), "");
        assert_eq!(
            written(&["split ", "across ", "writes\n"]),
            "# split across writes\n"
        );
    }

    #[test]
    fn test_empty_lines_discarded() {
        assert_eq!(written(&["\n\nkept\n\n"]), "# kept\n");
    }
}
