//! Reads filesystem metadata into header records.

use crate::metadata::EntryKind;
use crate::metadata::HeaderRecord;
use crate::metadata::IdentityResolver;
use crate::metadata::Timestamp;
use std::fs;
use std::fs::Metadata;
use std::io;
use std::path::Path;
use tracing::debug;

/// Captures the metadata of `source` without following symlinks.
///
/// `archive_path` becomes the record's name. Returns `None` if the entry
/// cannot be stat'ed or, for a symlink, its target cannot be read. Use
/// [`try_capture`] to see why.
///
/// # Examples
///
/// ```no_run
/// use backup_core::metadata::SystemIdentity;
/// use backup_core::metadata::capture;
/// use std::path::Path;
///
/// let ids = SystemIdentity::new();
/// if let Some(record) = capture(Path::new("/etc/hosts"), Path::new("etc/hosts"), &ids) {
///     println!("{} bytes owned by {}", record.size, record.user_name);
/// }
/// ```
#[must_use]
pub fn capture(
    source: &Path,
    archive_path: &Path,
    identity: &dyn IdentityResolver,
) -> Option<HeaderRecord> {
    match try_capture(source, archive_path, identity) {
        Ok(record) => Some(record),
        Err(e) => {
            debug!(path = %source.display(), error = %e, "metadata capture failed");
            None
        }
    }
}

/// Like [`capture`] but reports the failure.
///
/// # Errors
///
/// Returns the error from `lstat` or, for symlinks, from `readlink`.
pub fn try_capture(
    source: &Path,
    archive_path: &Path,
    identity: &dyn IdentityResolver,
) -> io::Result<HeaderRecord> {
    let metadata = fs::symlink_metadata(source)?;
    let kind = EntryKind::from_file_type(metadata.file_type());

    let link_target = if kind == EntryKind::Symlink {
        Some(fs::read_link(source)?)
    } else {
        None
    };

    let mut record = base_record(&metadata, archive_path, kind);
    record.link_target = link_target;
    record.user_name = identity.user_name(record.uid).unwrap_or_default();
    record.group_name = identity.group_name(record.gid).unwrap_or_default();
    Ok(record)
}

#[cfg(unix)]
fn base_record(metadata: &Metadata, archive_path: &Path, kind: EntryKind) -> HeaderRecord {
    use std::os::unix::fs::MetadataExt;

    let device = match kind {
        EntryKind::BlockDevice | EntryKind::CharDevice => device_numbers(metadata.rdev()),
        _ => None,
    };

    HeaderRecord {
        path: archive_path.to_path_buf(),
        mode: metadata.mode() & 0o7777,
        uid: metadata.uid(),
        gid: metadata.gid(),
        user_name: String::new(),
        group_name: String::new(),
        size: metadata.size(),
        kind,
        link_target: None,
        device,
        mtime: Timestamp::new(metadata.mtime(), metadata.mtime_nsec()),
        atime: Timestamp::new(metadata.atime(), metadata.atime_nsec()),
        ctime: Timestamp::new(metadata.ctime(), metadata.ctime_nsec()),
    }
}

#[cfg(not(unix))]
fn base_record(metadata: &Metadata, archive_path: &Path, kind: EntryKind) -> HeaderRecord {
    use std::time::SystemTime;
    use std::time::UNIX_EPOCH;

    let to_timestamp = |time: io::Result<SystemTime>| {
        time.ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| {
                let secs = i64::try_from(d.as_secs()).unwrap_or(i64::MAX);
                Timestamp::new(secs, i64::from(d.subsec_nanos()))
            })
            .unwrap_or_default()
    };
    let mode = match (kind, metadata.permissions().readonly()) {
        (EntryKind::Directory, _) => 0o755,
        (_, true) => 0o444,
        (_, false) => 0o644,
    };

    HeaderRecord {
        path: archive_path.to_path_buf(),
        mode,
        uid: 0,
        gid: 0,
        user_name: String::new(),
        group_name: String::new(),
        size: metadata.len(),
        kind,
        link_target: None,
        device: None,
        mtime: to_timestamp(metadata.modified()),
        atime: to_timestamp(metadata.accessed()),
        ctime: to_timestamp(metadata.created()),
    }
}

#[cfg(target_os = "linux")]
fn device_numbers(rdev: u64) -> Option<(u32, u32)> {
    use nix::sys::stat::major;
    use nix::sys::stat::minor;

    Some((
        u32::try_from(major(rdev)).ok()?,
        u32::try_from(minor(rdev)).ok()?,
    ))
}

#[cfg(all(unix, not(target_os = "linux")))]
fn device_numbers(_rdev: u64) -> Option<(u32, u32)> {
    None
}
