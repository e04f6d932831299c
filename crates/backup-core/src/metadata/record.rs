//! Archive header records.

use std::path::PathBuf;

/// Type of an archived entry.
///
/// Maps one-to-one onto the tar type flags `0`, `5`, `2`, `4`, `3` and `6`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// Regular file.
    Regular,
    /// Directory.
    Directory,
    /// Symbolic link.
    Symlink,
    /// Block device.
    BlockDevice,
    /// Character device.
    CharDevice,
    /// Named pipe.
    Fifo,
}

impl EntryKind {
    /// Classifies a file type. Anything unrecognised (sockets) is treated as
    /// a regular file.
    #[must_use]
    pub fn from_file_type(file_type: std::fs::FileType) -> Self {
        if file_type.is_dir() {
            return Self::Directory;
        }
        if file_type.is_symlink() {
            return Self::Symlink;
        }
        #[cfg(unix)]
        {
            use std::os::unix::fs::FileTypeExt;
            if file_type.is_block_device() {
                return Self::BlockDevice;
            }
            if file_type.is_char_device() {
                return Self::CharDevice;
            }
            if file_type.is_fifo() {
                return Self::Fifo;
            }
        }
        Self::Regular
    }

    /// The tar entry type for this kind.
    #[must_use]
    pub const fn tar_type(self) -> tar::EntryType {
        match self {
            Self::Regular => tar::EntryType::Regular,
            Self::Directory => tar::EntryType::Directory,
            Self::Symlink => tar::EntryType::Symlink,
            Self::BlockDevice => tar::EntryType::Block,
            Self::CharDevice => tar::EntryType::Char,
            Self::Fifo => tar::EntryType::Fifo,
        }
    }

    /// Returns `true` if entries of this kind carry content after the header.
    #[must_use]
    pub const fn has_body(self) -> bool {
        matches!(self, Self::Regular)
    }
}

/// A point in time as seconds and nanoseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp {
    /// Whole seconds, negative before 1970.
    pub secs: i64,
    /// Nanoseconds within the second.
    pub nanos: u32,
}

impl Timestamp {
    /// Creates a timestamp, clamping out-of-range nanoseconds.
    #[must_use]
    pub fn new(secs: i64, nanos: i64) -> Self {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let nanos = nanos.clamp(0, 999_999_999) as u32;
        Self { secs, nanos }
    }

    /// Seconds as stored in a tar header; pre-epoch times clamp to zero.
    #[must_use]
    pub fn tar_secs(self) -> u64 {
        u64::try_from(self.secs).unwrap_or(0)
    }
}

/// Metadata of one entry, ready to become a tar header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderRecord {
    /// Name inside the archive.
    pub path: PathBuf,
    /// Permission bits, including setuid, setgid and sticky.
    pub mode: u32,
    /// Numeric owner id.
    pub uid: u32,
    /// Numeric group id.
    pub gid: u32,
    /// Owner name, empty when the id does not resolve.
    pub user_name: String,
    /// Group name, empty when the id does not resolve.
    pub group_name: String,
    /// Size reported by the filesystem.
    pub size: u64,
    /// Entry type.
    pub kind: EntryKind,
    /// Target of a symlink.
    pub link_target: Option<PathBuf>,
    /// Major and minor numbers of a device node.
    pub device: Option<(u32, u32)>,
    /// Last modification.
    pub mtime: Timestamp,
    /// Last access.
    pub atime: Timestamp,
    /// Last status change.
    pub ctime: Timestamp,
}

impl HeaderRecord {
    /// Number of body bytes that follow the header in the archive.
    ///
    /// # Examples
    ///
    /// ```
    /// use backup_core::metadata::EntryKind;
    /// use backup_core::metadata::HeaderRecord;
    /// use backup_core::metadata::Timestamp;
    ///
    /// let mut record = HeaderRecord {
    ///     path: "link".into(),
    ///     mode: 0o777,
    ///     uid: 0,
    ///     gid: 0,
    ///     user_name: String::new(),
    ///     group_name: String::new(),
    ///     size: 11,
    ///     kind: EntryKind::Symlink,
    ///     link_target: Some("target.txt".into()),
    ///     device: None,
    ///     mtime: Timestamp::default(),
    ///     atime: Timestamp::default(),
    ///     ctime: Timestamp::default(),
    /// };
    /// assert_eq!(record.body_len(), 0);
    ///
    /// record.kind = EntryKind::Regular;
    /// assert_eq!(record.body_len(), 11);
    /// ```
    #[must_use]
    pub fn body_len(&self) -> u64 {
        if self.kind.has_body() { self.size } else { 0 }
    }
}
