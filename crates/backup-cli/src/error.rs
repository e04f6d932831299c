//! Error conversion utilities for CLI.
//!
//! Converts backup-core's typed errors (thiserror) into user-facing
//! errors (anyhow) with a hint on what to do next.

use anyhow::anyhow;
use backup_core::BackupError;

/// Converts `BackupError` to a user-facing anyhow error with a hint.
pub fn convert_backup_error(err: BackupError) -> anyhow::Error {
    match err {
        BackupError::OutputOpen { path, source } => {
            anyhow!(
                "Cannot create output '{}': {source}\n\
                 HINT: Check that the directory exists and is writable.",
                path.display()
            )
        }
        BackupError::Sink(source) => {
            anyhow!(
                "Writing the archive failed: {source}\n\
                 HINT: An output may be full or disconnected. The archive is incomplete."
            )
        }
        BackupError::BodyRead { path, source } => {
            anyhow!(
                "Reading '{}' failed after its entry was started: {source}\n\
                 HINT: The archive is incomplete. Run the backup again.",
                path.display()
            )
        }
        BackupError::BodyTruncated {
            path,
            expected,
            actual,
        } => {
            anyhow!(
                "'{}' shrank while it was archived ({actual} of {expected} bytes)\n\
                 HINT: The archive is incomplete. Stop programs writing to the file and run the backup again.",
                path.display()
            )
        }
        BackupError::Passphrase(source) => {
            anyhow!(
                "Cannot read the passphrase: {source}\n\
                 HINT: --encrypt reads the passphrase from the terminal; run it interactively."
            )
        }
        BackupError::HomeDirectory { reason } => {
            anyhow!(
                "Cannot find the home directory: {reason}\n\
                 HINT: Set HOME or pass --root."
            )
        }
        BackupError::InvalidCompressionLevel { level } => {
            anyhow!(
                "Invalid compression level {level}\n\
                 HINT: Use a level from 1 (fastest) to 9 (smallest)."
            )
        }
        _ => anyhow::Error::from(err).context("Backup failed"),
    }
}
