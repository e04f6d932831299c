//! Tar entry assembly.
//!
//! Headers are GNU format so that long names, long link targets, access
//! and change times, and large ids all fit.

use crate::metadata::EntryKind;
use crate::metadata::HeaderRecord;
use std::io;
use std::io::Read;
use std::io::Write;
use tar::Builder;
use tar::Header;
use tracing::debug;

/// Builds the GNU header for `record`.
///
/// The name and checksum are filled in when the entry is appended. Owner
/// or group names too long for the header are left empty; the numeric ids
/// are always stored.
///
/// # Examples
///
/// ```
/// use backup_core::creation::tar::build_header;
/// use backup_core::metadata::EntryKind;
/// use backup_core::metadata::HeaderRecord;
/// use backup_core::metadata::Timestamp;
///
/// let record = HeaderRecord {
///     path: "notes.txt".into(),
///     mode: 0o640,
///     uid: 1000,
///     gid: 100,
///     user_name: "alice".into(),
///     group_name: "users".into(),
///     size: 42,
///     kind: EntryKind::Regular,
///     link_target: None,
///     device: None,
///     mtime: Timestamp::new(1_700_000_000, 0),
///     atime: Timestamp::new(1_700_000_100, 0),
///     ctime: Timestamp::new(1_700_000_050, 0),
/// };
/// let header = build_header(&record);
/// assert_eq!(header.size()?, 42);
/// assert_eq!(header.mode()?, 0o640);
/// assert_eq!(header.username()?, Some("alice"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[must_use]
pub fn build_header(record: &HeaderRecord) -> Header {
    let mut header = Header::new_gnu();
    header.set_entry_type(record.kind.tar_type());
    header.set_mode(record.mode);
    header.set_uid(u64::from(record.uid));
    header.set_gid(u64::from(record.gid));
    header.set_size(record.body_len());
    header.set_mtime(record.mtime.tar_secs());

    if let Err(e) = header.set_username(&record.user_name) {
        debug!(path = %record.path.display(), error = %e, "owner name not stored");
    }
    if let Err(e) = header.set_groupname(&record.group_name) {
        debug!(path = %record.path.display(), error = %e, "group name not stored");
    }

    if let Some(gnu) = header.as_gnu_mut() {
        gnu.set_atime(record.atime.tar_secs());
        gnu.set_ctime(record.ctime.tar_secs());
    }

    if let Some((major, minor)) = record.device
        && let Err(e) = header
            .set_device_major(major)
            .and_then(|()| header.set_device_minor(minor))
    {
        debug!(path = %record.path.display(), error = %e, "device numbers not stored");
    }

    header
}

/// Appends one entry to `builder`.
///
/// Regular files take their content from `body`, which must yield exactly
/// `record.size` bytes. Other kinds carry no content and `body` is ignored.
///
/// # Errors
///
/// Returns an error if the entry name or link target cannot be encoded,
/// `body` fails, or the stream rejects a write.
pub fn append_entry<W: Write>(
    builder: &mut Builder<W>,
    record: &HeaderRecord,
    body: Option<&mut dyn Read>,
) -> io::Result<()> {
    let mut header = build_header(record);

    match record.kind {
        EntryKind::Symlink => {
            let target = record.link_target.as_deref().ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidInput, "symlink without target")
            })?;
            builder.append_link(&mut header, &record.path, target)
        }
        EntryKind::Regular => match body {
            Some(body) => builder.append_data(&mut header, &record.path, body),
            None => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "regular file without content",
            )),
        },
        EntryKind::Directory
        | EntryKind::BlockDevice
        | EntryKind::CharDevice
        | EntryKind::Fifo => builder.append_data(&mut header, &record.path, io::empty()),
    }
}
