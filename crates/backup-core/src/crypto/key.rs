//! Passphrase input and key derivation.

use std::fmt;
use std::io;
use zeroize::Zeroizing;

/// AES-256 key length in bytes.
pub const KEY_LEN: usize = 32;

/// Supplies the passphrase for an encrypted archive.
pub trait PassphraseSource {
    /// Returns the passphrase. Called at most once per run.
    ///
    /// # Errors
    ///
    /// Returns an error if no passphrase can be obtained.
    fn passphrase(&mut self) -> io::Result<Zeroizing<String>>;
}

/// Prompts on the controlling terminal with echo disabled.
#[derive(Debug, Clone)]
pub struct TerminalPrompt {
    prompt: String,
}

impl TerminalPrompt {
    /// Creates a prompt showing `prompt`.
    #[must_use]
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }
}

impl Default for TerminalPrompt {
    fn default() -> Self {
        Self::new("Password: ")
    }
}

impl PassphraseSource for TerminalPrompt {
    fn passphrase(&mut self) -> io::Result<Zeroizing<String>> {
        rpassword::prompt_password(&self.prompt).map(Zeroizing::new)
    }
}

/// A passphrase known up front, for automation and tests.
#[derive(Clone)]
pub struct StaticPassphrase(Zeroizing<String>);

impl StaticPassphrase {
    /// Wraps `passphrase`.
    #[must_use]
    pub fn new(passphrase: impl Into<String>) -> Self {
        Self(Zeroizing::new(passphrase.into()))
    }
}

impl PassphraseSource for StaticPassphrase {
    fn passphrase(&mut self) -> io::Result<Zeroizing<String>> {
        Ok(self.0.clone())
    }
}

impl fmt::Debug for StaticPassphrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StaticPassphrase([REDACTED])")
    }
}

/// Turns a passphrase into an AES-256 key.
///
/// The passphrase bytes are used directly, zero-padded or truncated to
/// [`KEY_LEN`]. There is no key stretching; archives written by earlier
/// versions of the tool depend on this exact derivation.
///
/// # Examples
///
/// ```
/// use backup_core::crypto::derive_key;
///
/// let key = derive_key(b"secret");
/// assert_eq!(&key[..6], b"secret");
/// assert!(key[6..].iter().all(|&b| b == 0));
/// ```
#[must_use]
pub fn derive_key(passphrase: &[u8]) -> Zeroizing<[u8; KEY_LEN]> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    let n = passphrase.len().min(KEY_LEN);
    key[..n].copy_from_slice(&passphrase[..n]);
    key
}
