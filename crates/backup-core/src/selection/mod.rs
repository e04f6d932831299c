//! File selection from rule stages.
//!
//! This module turns the ordered `[include]`/`[exclude]` stages into the
//! concrete list of paths to archive: glob expansion, a pruning tree walk
//! and the order-sensitive [`ExclusionWindow`].

pub mod compiler;
pub mod matcher;
pub mod walker;
pub mod window;

use std::path::PathBuf;

pub use compiler::compile;
pub use window::ExclusionWindow;

/// A path chosen for the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    /// Name as matched by the rules and stored in the archive.
    ///
    /// Relative to the selection root, or absolute for absolute patterns.
    pub path: PathBuf,

    /// Location on disk.
    pub source: PathBuf,
}

impl SelectedFile {
    /// Creates a selected file whose archive path is its disk path.
    #[must_use]
    pub fn at(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            source: path.clone(),
            path,
        }
    }
}
