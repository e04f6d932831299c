//! Error types for backup operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `BackupError`.
pub type Result<T> = std::result::Result<T, BackupError>;

/// Errors that can occur while building a backup.
///
/// Only some of these abort a run. Per-file problems that happen before any
/// byte of an entry reaches the archive are downgraded to warnings by the
/// pipeline and never surface as a `BackupError`; see [`BackupError::is_fatal`].
#[derive(Error, Debug)]
pub enum BackupError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A rule file could not be opened or read.
    #[error("unable to read rule file '{path}': {source}")]
    RuleSource {
        /// The rule file path.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },

    /// An output file could not be created.
    #[error("unable to open output '{path}': {source}")]
    OutputOpen {
        /// The output path.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },

    /// Writing to the layered output stream failed.
    #[error("write to archive stream failed: {0}")]
    Sink(std::io::Error),

    /// Reading a file body failed after its header was committed.
    #[error("error archiving '{path}': {source}")]
    BodyRead {
        /// The source file.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },

    /// A file shrank while its body was being copied.
    #[error("error archiving '{path}': expected {expected} bytes, read {actual}")]
    BodyTruncated {
        /// The source file.
        path: PathBuf,
        /// Size recorded in the header.
        expected: u64,
        /// Bytes actually read.
        actual: u64,
    },

    /// The passphrase could not be read.
    #[error("unable to read passphrase: {0}")]
    Passphrase(std::io::Error),

    /// The operating system random generator failed.
    #[error("unable to generate initialization vector: {0}")]
    Randomness(String),

    /// The cipher could not be initialized.
    #[error("cipher initialization failed: {0}")]
    CipherInit(String),

    /// Compression level outside 1-9.
    #[error("invalid compression level {level}, must be 1-9")]
    InvalidCompressionLevel {
        /// The rejected level.
        level: u8,
    },

    /// The home directory used as default root could not be determined.
    #[error("unable to find home directory: {reason}")]
    HomeDirectory {
        /// Why the lookup failed.
        reason: String,
    },
}

impl BackupError {
    /// Returns `true` if this error must abort the run.
    ///
    /// Rule sources are reported and skipped; every other variant leaves the
    /// archive stream in an unknown state or prevents it from being opened.
    ///
    /// # Examples
    ///
    /// ```
    /// use backup_core::BackupError;
    /// use std::path::PathBuf;
    ///
    /// let err = BackupError::RuleSource {
    ///     path: PathBuf::from("backup.list"),
    ///     source: std::io::Error::from(std::io::ErrorKind::NotFound),
    /// };
    /// assert!(!err.is_fatal());
    /// ```
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !matches!(self, Self::RuleSource { .. })
    }

    /// Returns `true` if the error happened while setting up encryption.
    #[must_use]
    pub const fn is_cipher_setup(&self) -> bool {
        matches!(
            self,
            Self::Passphrase(_) | Self::Randomness(_) | Self::CipherInit(_)
        )
    }
}
