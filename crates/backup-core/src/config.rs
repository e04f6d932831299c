//! Configuration for backup runs.

use crate::BackupError;
use crate::Result;
use crate::creation::CompressionCodec;
use std::path::PathBuf;

/// Configuration for building a backup archive.
///
/// # Examples
///
/// ```
/// use backup_core::BuildConfig;
/// use backup_core::creation::CompressionCodec;
///
/// let config = BuildConfig::default()
///     .with_root("/srv/data")
///     .with_codec(CompressionCodec::Zstd)
///     .with_compression_level(9)
///     .with_encrypt(true);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Directory relative rule patterns are resolved against.
    ///
    /// Default: `None`, meaning the invoking user's home directory.
    pub root: Option<PathBuf>,

    /// Compression codec.
    ///
    /// Default: gzip.
    pub codec: CompressionCodec,

    /// Compression level (1-9). `None` uses the codec's default.
    ///
    /// Default: `Some(6)`.
    pub compression_level: Option<u8>,

    /// Encrypt the compressed stream.
    ///
    /// Default: `false`.
    pub encrypt: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            root: None,
            codec: CompressionCodec::Gzip,
            compression_level: Some(6),
            encrypt: false,
        }
    }
}

impl BuildConfig {
    /// Creates a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the root directory.
    #[must_use]
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Sets the compression codec.
    #[must_use]
    pub fn with_codec(mut self, codec: CompressionCodec) -> Self {
        self.codec = codec;
        self
    }

    /// Sets the compression level. Checked by [`BuildConfig::validate`].
    #[must_use]
    pub fn with_compression_level(mut self, level: u8) -> Self {
        self.compression_level = Some(level);
        self
    }

    /// Sets whether to encrypt.
    #[must_use]
    pub fn with_encrypt(mut self, encrypt: bool) -> Self {
        self.encrypt = encrypt;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::InvalidCompressionLevel`] if the level is set
    /// but not in 1-9.
    pub fn validate(&self) -> Result<()> {
        if let Some(level) = self.compression_level
            && !(1..=9).contains(&level)
        {
            return Err(BackupError::InvalidCompressionLevel { level });
        }
        Ok(())
    }

    /// Returns the configured root, or the home directory if none is set.
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::HomeDirectory`] if no root is configured and
    /// the home directory cannot be determined.
    pub fn resolve_root(&self) -> Result<PathBuf> {
        match &self.root {
            Some(root) => Ok(root.clone()),
            None => home_dir(),
        }
    }
}

/// Returns the invoking user's home directory.
///
/// `$HOME` wins when set and non-empty; otherwise the user database entry
/// of the real user id is used.
///
/// # Errors
///
/// Returns [`BackupError::HomeDirectory`] if neither source yields one.
pub fn home_dir() -> Result<PathBuf> {
    if let Some(home) = std::env::var_os("HOME").filter(|h| !h.is_empty()) {
        return Ok(PathBuf::from(home));
    }
    home_from_user_database()
}

#[cfg(unix)]
fn home_from_user_database() -> Result<PathBuf> {
    use nix::unistd::User;
    use nix::unistd::getuid;

    match User::from_uid(getuid()) {
        Ok(Some(user)) => Ok(user.dir),
        Ok(None) => Err(BackupError::HomeDirectory {
            reason: format!("no user database entry for uid {}", getuid()),
        }),
        Err(e) => Err(BackupError::HomeDirectory {
            reason: e.to_string(),
        }),
    }
}

#[cfg(not(unix))]
fn home_from_user_database() -> Result<PathBuf> {
    Err(BackupError::HomeDirectory {
        reason: "HOME is not set".to_string(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BuildConfig::default();
        assert!(config.root.is_none());
        assert_eq!(config.codec, CompressionCodec::Gzip);
        assert_eq!(config.compression_level, Some(6));
        assert!(!config.encrypt);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range_level() {
        for level in [0, 10, 255] {
            let err = BuildConfig::default()
                .with_compression_level(level)
                .validate()
                .unwrap_err();
            assert!(matches!(err, BackupError::InvalidCompressionLevel { level: l } if l == level));
        }
    }

    #[test]
    fn test_validate_accepts_codec_default_level() {
        let config = BuildConfig {
            compression_level: None,
            ..BuildConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_resolve_root_prefers_configured_root() {
        let config = BuildConfig::default().with_root("/data");
        assert_eq!(config.resolve_root().unwrap(), PathBuf::from("/data"));
    }
}
