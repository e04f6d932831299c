//! Counting writer for tracking bytes written.

use crate::io::StreamLayer;
use std::io::Write;

/// Wrapper writer that counts accepted bytes and remembers write failures.
///
/// The counter only increments on successful writes. Once the inner writer
/// has returned an error, [`CountingWriter::has_failed`] stays `true`; the
/// archive pipeline uses both to tell a header that was rejected before it
/// reached the stream from a stream that broke midway.
///
/// # Examples
///
/// ```
/// use backup_core::io::CountingWriter;
/// use std::io::Write;
///
/// let mut buffer = Vec::new();
/// let mut writer = CountingWriter::new(&mut buffer);
///
/// writer.write_all(b"Hello, ")?;
/// writer.write_all(b"World!")?;
///
/// assert_eq!(writer.total_bytes(), 13);
/// assert!(!writer.has_failed());
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug)]
pub struct CountingWriter<W> {
    inner: W,
    bytes_written: u64,
    failed: bool,
}

impl<W> CountingWriter<W> {
    /// Creates a new counting writer.
    #[must_use]
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            bytes_written: 0,
            failed: false,
        }
    }

    /// Returns the total number of bytes successfully written.
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.bytes_written
    }

    /// Returns `true` once any write or flush has failed.
    #[must_use]
    pub fn has_failed(&self) -> bool {
        self.failed
    }

    /// Returns a reference to the inner writer.
    #[must_use]
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Returns a mutable reference to the inner writer.
    ///
    /// Bytes written directly to it are not counted.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    /// Consumes the counting writer and returns the inner writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self.inner.write(buf) {
            Ok(bytes) => {
                self.bytes_written += bytes as u64;
                Ok(bytes)
            }
            Err(e) => {
                self.failed = true;
                Err(e)
            }
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush().inspect_err(|_| self.failed = true)
    }
}

impl<W: Write + StreamLayer> StreamLayer for CountingWriter<W> {
    fn finalize(&mut self) -> std::io::Result<()> {
        self.flush()
    }

    fn inner_layer(&mut self) -> Option<&mut dyn StreamLayer> {
        Some(&mut self.inner)
    }
}
