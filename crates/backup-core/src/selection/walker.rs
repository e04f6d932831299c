//! Directory tree walking with exclusion pruning.
//!
//! The walker visits one glob match in pre-order, entries sorted by file
//! name, without following symlinks (not even at the root). Excluded
//! directories are pruned before they are read.

use crate::selection::ExclusionWindow;
use crate::selection::SelectedFile;
use crate::selection::matcher::GlobMatch;
use std::fs::FileType;
use std::path::PathBuf;
use tracing::debug;
use walkdir::DirEntry;
use walkdir::WalkDir;

/// Walks one glob match, yielding the files that survive the window.
///
/// # Examples
///
/// ```no_run
/// use backup_core::selection::ExclusionWindow;
/// use backup_core::selection::matcher::expand;
/// use backup_core::selection::walker::PruningWalker;
/// use std::path::Path;
///
/// let window = ExclusionWindow::default();
/// for root_match in expand("Documents", Path::new("/home/me")) {
///     for file in PruningWalker::new(&root_match, &window).walk() {
///         println!("{}", file.path.display());
///     }
/// }
/// ```
pub struct PruningWalker<'a> {
    root: &'a GlobMatch,
    window: &'a ExclusionWindow,
}

impl<'a> PruningWalker<'a> {
    /// Creates a walker for `root` filtered by `window`.
    #[must_use]
    pub fn new(root: &'a GlobMatch, window: &'a ExclusionWindow) -> Self {
        Self { root, window }
    }

    /// Returns an iterator over selected regular files and symlinks.
    ///
    /// Directories are never yielded. Special files (devices, FIFOs,
    /// sockets) are skipped. Entries that cannot be read are skipped.
    pub fn walk(&self) -> impl Iterator<Item = SelectedFile> + '_ {
        let walker = WalkDir::new(&self.root.source)
            .follow_links(false)
            .follow_root_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| {
                !(entry.file_type().is_dir() && self.window.excludes(&self.display_path(entry)))
            });

        walker.filter_map(move |entry| match entry {
            Ok(entry) => {
                let file_type = entry.file_type();
                if !is_archivable(file_type) || file_type.is_dir() {
                    return None;
                }

                let path = self.display_path(&entry);
                if self.window.excludes(&path) {
                    return None;
                }

                Some(SelectedFile {
                    path,
                    source: entry.into_path(),
                })
            }
            Err(e) => {
                debug!(root = %self.root.source.display(), error = %e, "skipping unreadable entry");
                None
            }
        })
    }

    /// Path of `entry` as seen by exclusion patterns and the archive.
    fn display_path(&self, entry: &DirEntry) -> PathBuf {
        match entry.path().strip_prefix(&self.root.source) {
            Ok(rel) if rel.as_os_str().is_empty() => self.root.path.clone(),
            Ok(rel) => self.root.path.join(rel),
            Err(_) => entry.path().to_path_buf(),
        }
    }
}

/// Returns `true` for the entry types the selection considers at all.
fn is_archivable(file_type: FileType) -> bool {
    file_type.is_file() || file_type.is_dir() || file_type.is_symlink()
}

/// Walks `root` with `window`, collecting into `out`.
pub(crate) fn walk_into(root: &GlobMatch, window: &ExclusionWindow, out: &mut Vec<SelectedFile>) {
    let before = out.len();
    out.extend(PruningWalker::new(root, window).walk());
    debug!(
        root = %root.path.display(),
        selected = out.len() - before,
        "walked glob match"
    );
}
