//! Test utilities for the archive pipeline.
//!
//! # Panics
//!
//! Functions in this module may panic on I/O errors since they are designed
//! for test use only where panics are acceptable.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::cell::Cell;
use std::cell::RefCell;
use std::io;
use std::io::Read;
use std::io::Write;
use std::rc::Rc;

/// In-memory sink whose contents stay readable after it is handed off.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    bytes: Rc<RefCell<Vec<u8>>>,
    flushes: Rc<Cell<usize>>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Vec<u8> {
        self.bytes.borrow().clone()
    }

    pub fn flushes(&self) -> usize {
        self.flushes.get()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flushes.set(self.flushes.get() + 1);
        Ok(())
    }
}

/// Sink that accepts a fixed number of bytes, then fails.
#[derive(Debug)]
pub struct FailingWriter {
    remaining: usize,
    fail_flush: bool,
}

impl FailingWriter {
    /// Fails every write once `limit` bytes have been accepted.
    pub fn after(limit: usize) -> Self {
        Self {
            remaining: limit,
            fail_flush: false,
        }
    }

    /// Accepts every write but fails on flush.
    pub fn on_flush() -> Self {
        Self {
            remaining: usize::MAX,
            fail_flush: true,
        }
    }
}

impl Write for FailingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.remaining == 0 {
            return Err(io::Error::other("simulated sink failure"));
        }
        let n = buf.len().min(self.remaining);
        self.remaining -= n;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.fail_flush {
            Err(io::Error::other("simulated flush failure"))
        } else {
            Ok(())
        }
    }
}

/// One entry of an archive as read back by [`read_tar`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadEntry {
    pub path: String,
    pub kind: u8,
    pub data: Vec<u8>,
    pub link: Option<String>,
    pub mode: u32,
}

/// Reads every entry of an uncompressed tar stream.
pub fn read_tar(bytes: &[u8]) -> Vec<ReadEntry> {
    let mut archive = tar::Archive::new(bytes);
    archive
        .entries()
        .unwrap()
        .map(|entry| {
            let mut entry = entry.unwrap();
            let path = entry.path().unwrap().to_string_lossy().into_owned();
            let link = entry
                .link_name()
                .unwrap()
                .map(|l| l.to_string_lossy().into_owned());
            let kind = entry.header().entry_type().as_byte();
            let mode = entry.header().mode().unwrap();
            let mut data = Vec::new();
            entry.read_to_end(&mut data).unwrap();
            ReadEntry {
                path,
                kind,
                data,
                link,
                mode,
            }
        })
        .collect()
}

/// Decompresses a gzip stream.
pub fn gunzip(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    flate2::read::GzDecoder::new(bytes)
        .read_to_end(&mut out)
        .unwrap();
    out
}
