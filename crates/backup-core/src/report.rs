//! Backup run reporting and progress callbacks.

use std::path::Path;
use std::time::Duration;

/// Statistics of one backup run.
///
/// # Examples
///
/// ```
/// use backup_core::BuildReport;
///
/// let mut report = BuildReport::default();
/// report.files_added = 10;
/// report.bytes_written = 1024;
/// report.bytes_compressed = 512;
///
/// assert_eq!(report.compression_ratio(), 2.0);
/// assert_eq!(report.compression_percentage(), 50.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    /// Regular files archived.
    pub files_added: usize,

    /// Directories archived.
    pub directories_added: usize,

    /// Symlinks archived.
    pub symlinks_added: usize,

    /// Device nodes and FIFOs archived.
    pub special_added: usize,

    /// Selected files left out because they could not be read.
    pub files_skipped: usize,

    /// Size of the tar stream before compression.
    pub bytes_written: u64,

    /// Bytes delivered to each output, including any IV.
    pub bytes_compressed: u64,

    /// Wall time of the run.
    pub duration: Duration,

    /// One diagnostic per skipped file or unreadable rule source.
    pub warnings: Vec<String>,
}

impl BuildReport {
    /// Creates an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a warning message.
    ///
    /// # Examples
    ///
    /// ```
    /// use backup_core::BuildReport;
    ///
    /// let mut report = BuildReport::new();
    /// report.add_warning("skipping 'notes.txt': permission denied");
    /// assert!(report.has_warnings());
    /// ```
    pub fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    /// Returns whether any warnings were generated.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Returns uncompressed / compressed, or 0.0 if either is zero.
    #[must_use]
    pub fn compression_ratio(&self) -> f64 {
        if self.bytes_compressed == 0 || self.bytes_written == 0 {
            return 0.0;
        }
        self.bytes_written as f64 / self.bytes_compressed as f64
    }

    /// Returns the share of the tar stream saved by compression, in percent.
    #[must_use]
    pub fn compression_percentage(&self) -> f64 {
        if self.bytes_written == 0 {
            return 0.0;
        }
        if self.bytes_compressed == 0 {
            return 100.0;
        }
        let saved = self.bytes_written.saturating_sub(self.bytes_compressed);
        (saved as f64 / self.bytes_written as f64) * 100.0
    }

    /// Total number of archive entries written.
    #[must_use]
    pub fn total_items(&self) -> usize {
        self.files_added + self.directories_added + self.symlinks_added + self.special_added
    }
}

/// Receives progress events while a backup is written.
///
/// # Examples
///
/// ```
/// use backup_core::ProgressCallback;
/// use std::path::Path;
///
/// struct Printer;
///
/// impl ProgressCallback for Printer {
///     fn on_entry_start(&mut self, path: &Path, total: usize, current: usize) {
///         eprintln!("[{current}/{total}] {}", path.display());
///     }
///
///     fn on_bytes_written(&mut self, _bytes: u64) {}
///
///     fn on_entry_complete(&mut self, _path: &Path) {}
///
///     fn on_complete(&mut self) {
///         eprintln!("done");
///     }
/// }
/// ```
pub trait ProgressCallback {
    /// Called before an entry is captured. `current` is 1-based.
    fn on_entry_start(&mut self, path: &Path, total: usize, current: usize);

    /// Called as file content is copied into the archive, in batches.
    fn on_bytes_written(&mut self, bytes: u64);

    /// Called after an entry was written or skipped.
    fn on_entry_complete(&mut self, path: &Path);

    /// Called once after the stream has been finalized.
    fn on_complete(&mut self);
}

/// Progress callback that ignores every event.
#[derive(Debug, Default)]
pub struct NoopProgress;

impl ProgressCallback for NoopProgress {
    fn on_entry_start(&mut self, _path: &Path, _total: usize, _current: usize) {}

    fn on_bytes_written(&mut self, _bytes: u64) {}

    fn on_entry_complete(&mut self, _path: &Path) {}

    fn on_complete(&mut self) {}
}
