//! Filesystem metadata capture.
//!
//! Turns a selected path into a [`HeaderRecord`]: mode, ownership (numeric
//! and by name), size, entry type, link target, device numbers and
//! timestamps.

pub mod capture;
pub mod identity;
pub mod record;

pub use capture::capture;
pub use capture::try_capture;
pub use identity::IdentityResolver;
pub use identity::MapIdentity;
pub use identity::SystemIdentity;
pub use record::EntryKind;
pub use record::HeaderRecord;
pub use record::Timestamp;
