//! Fan-out sink: duplicates one byte stream to several outputs.

use crate::io::StreamLayer;
use std::fmt;
use std::io;
use std::io::Write;

struct NamedSink {
    name: String,
    writer: Box<dyn Write>,
}

/// Writes every buffer, in full, to each of its sinks in turn.
///
/// A failure on any sink fails the whole write; the error message names the
/// sink. With no sinks the stream is discarded.
///
/// # Examples
///
/// ```
/// use backup_core::io::FanOut;
/// use std::io::Write;
///
/// let mut out = FanOut::new()
///     .with_sink("first", Vec::new())
///     .with_sink("second", std::io::sink());
/// out.write_all(b"archive bytes")?;
/// assert_eq!(out.len(), 2);
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Default)]
pub struct FanOut {
    sinks: Vec<NamedSink>,
}

impl FanOut {
    /// Creates a fan-out with no sinks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sink; `name` is used in error messages.
    #[must_use]
    pub fn with_sink(mut self, name: impl Into<String>, writer: impl Write + 'static) -> Self {
        self.push(name, writer);
        self
    }

    /// Adds a sink in place.
    pub fn push(&mut self, name: impl Into<String>, writer: impl Write + 'static) {
        self.sinks.push(NamedSink {
            name: name.into(),
            writer: Box::new(writer),
        });
    }

    /// Number of sinks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Returns `true` if there are no sinks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// Names of the sinks, in write order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sinks.iter().map(|s| s.name.as_str())
    }
}

fn name_error(name: &str, e: &io::Error) -> io::Error {
    io::Error::new(e.kind(), format!("{name}: {e}"))
}

impl Write for FanOut {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for sink in &mut self.sinks {
            sink.writer
                .write_all(buf)
                .map_err(|e| name_error(&sink.name, &e))?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut first = None;
        for sink in &mut self.sinks {
            if let Err(e) = sink.writer.flush() {
                first.get_or_insert_with(|| name_error(&sink.name, &e));
            }
        }
        first.map_or(Ok(()), Err)
    }
}

impl StreamLayer for FanOut {
    fn finalize(&mut self) -> io::Result<()> {
        self.flush()
    }

    fn inner_layer(&mut self) -> Option<&mut dyn StreamLayer> {
        None
    }
}

impl fmt::Debug for FanOut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FanOut")
            .field("sinks", &self.names().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::FailingWriter;
    use crate::test_utils::SharedBuffer;

    #[test]
    fn test_every_sink_gets_identical_bytes() {
        let a = SharedBuffer::new();
        let b = SharedBuffer::new();
        let mut out = FanOut::new()
            .with_sink("a", a.clone())
            .with_sink("b", b.clone());

        out.write_all(b"hello ").unwrap();
        out.write_all(b"world").unwrap();
        out.finalize().unwrap();

        assert_eq!(a.contents(), b"hello world");
        assert_eq!(a.contents(), b.contents());
    }

    #[test]
    fn test_failing_sink_fails_write() {
        let good = SharedBuffer::new();
        let mut out = FanOut::new()
            .with_sink("good", good.clone())
            .with_sink("backup.tgz", FailingWriter::after(4));

        out.write_all(b"1234").unwrap();
        let err = out.write_all(b"5678").unwrap_err();
        assert!(err.to_string().starts_with("backup.tgz:"));
    }

    #[test]
    fn test_flush_reports_first_failure_after_flushing_all() {
        let good = SharedBuffer::new();
        let mut out = FanOut::new()
            .with_sink("bad", FailingWriter::on_flush())
            .with_sink("good", good.clone());

        out.write_all(b"x").unwrap();
        let err = out.flush().unwrap_err();
        assert!(err.to_string().starts_with("bad:"));
        assert_eq!(good.flushes(), 1);
    }

    #[test]
    fn test_no_sinks_discards() {
        let mut out = FanOut::new();
        assert!(out.is_empty());
        out.write_all(b"ignored").unwrap();
        out.finalize().unwrap();
    }
}
