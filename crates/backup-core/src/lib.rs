//! Staged file selection and metadata-preserving tar backups.
//!
//! `backup-core` reads ordered `[include]`/`[exclude]` rule stages, turns
//! them into a list of files, and writes those files into a GNU tar stream
//! that is compressed, optionally encrypted with AES-256-OFB, and copied to
//! any number of outputs at once.
//!
//! A file that cannot be read before its entry starts is skipped with a
//! warning. A failure after an entry has started, or any output failure,
//! aborts the run.
//!
//! # Examples
//!
//! ```no_run
//! use backup_core::BackupBuilder;
//! use backup_core::BuildConfig;
//! use backup_core::api::open_outputs;
//! use backup_core::rules::Stage;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let report = BackupBuilder::new()
//!     .stages([Stage::include(["Documents"]), Stage::exclude(["*.tmp"])])
//!     .sink(open_outputs(&["backup.tar.gz"])?)
//!     .config(BuildConfig::default())
//!     .run()?;
//! for warning in &report.warnings {
//!     eprintln!("{warning}");
//! }
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod creation;
pub mod crypto;
pub mod error;
pub mod io;
pub mod metadata;
pub mod report;
pub mod rules;
pub mod selection;

#[cfg(test)]
mod test_utils;

// Re-export main API types
pub use api::BackupBuilder;
pub use api::open_outputs;
pub use config::BuildConfig;
pub use creation::CompressionCodec;
pub use error::BackupError;
pub use error::Result;
pub use report::BuildReport;
pub use report::NoopProgress;
pub use report::ProgressCallback;
