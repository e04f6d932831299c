//! AES-256-OFB stream encryption.
//!
//! Stream format: a 16-byte random IV in clear, followed by the plaintext
//! XORed with the AES-256 OFB keystream. OFB has no padding, so the
//! ciphertext is exactly as long as the plaintext.

use crate::BackupError;
use crate::Result;
use crate::crypto::KEY_LEN;
use crate::crypto::PassphraseSource;
use crate::crypto::derive_key;
use crate::io::StreamLayer;
use aes::Aes256;
use ofb::cipher::KeyIvInit;
use ofb::cipher::StreamCipher;
use rand::TryRngCore;
use rand::rngs::OsRng;
use std::io;
use std::io::Read;
use std::io::Write;

type Aes256Ofb = ofb::Ofb<Aes256>;

/// Initialization vector length in bytes.
pub const IV_LEN: usize = 16;

/// Draws a fresh IV from the operating system generator.
///
/// # Errors
///
/// Returns [`BackupError::Randomness`] if the generator fails.
pub fn random_iv() -> Result<[u8; IV_LEN]> {
    let mut iv = [0u8; IV_LEN];
    OsRng
        .try_fill_bytes(&mut iv)
        .map_err(|e| BackupError::Randomness(e.to_string()))?;
    Ok(iv)
}

fn init_cipher(key: &[u8; KEY_LEN], iv: &[u8; IV_LEN]) -> Result<Aes256Ofb> {
    Aes256Ofb::new_from_slices(key, iv).map_err(|e| BackupError::CipherInit(e.to_string()))
}

/// Encrypting writer.
///
/// The cipher state is dropped, and with it wiped, when the layer is
/// finalized; writes after that fail.
///
/// # Examples
///
/// ```
/// use backup_core::crypto::CipherReader;
/// use backup_core::crypto::CipherWriter;
/// use backup_core::crypto::IV_LEN;
/// use backup_core::crypto::derive_key;
/// use std::io::Read;
/// use std::io::Write;
///
/// let key = derive_key(b"passphrase");
/// let mut writer = CipherWriter::new(Vec::new(), &key)?;
/// writer.write_all(b"attack at dawn")?;
/// let sealed = writer.into_inner();
/// assert_eq!(sealed.len(), IV_LEN + 14);
///
/// let mut plain = String::new();
/// CipherReader::new(&sealed[..], &key)?.read_to_string(&mut plain)?;
/// assert_eq!(plain, "attack at dawn");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct CipherWriter<W> {
    inner: W,
    cipher: Option<Aes256Ofb>,
    scratch: Vec<u8>,
}

impl<W: Write> CipherWriter<W> {
    /// Writes a random IV to `inner` and returns a writer that encrypts
    /// everything after it.
    ///
    /// # Errors
    ///
    /// Returns an error if no IV can be generated, the cipher cannot be
    /// initialized, or the IV cannot be written.
    pub fn new(inner: W, key: &[u8; KEY_LEN]) -> Result<Self> {
        Self::with_iv(inner, key, random_iv()?)
    }

    /// Like [`CipherWriter::new`] with a caller-chosen IV.
    ///
    /// # Errors
    ///
    /// Returns an error if the cipher cannot be initialized or the IV
    /// cannot be written.
    pub fn with_iv(mut inner: W, key: &[u8; KEY_LEN], iv: [u8; IV_LEN]) -> Result<Self> {
        let cipher = init_cipher(key, &iv)?;
        inner.write_all(&iv).map_err(BackupError::Sink)?;
        Ok(Self {
            inner,
            cipher: Some(cipher),
            scratch: Vec::new(),
        })
    }
}

impl<W> CipherWriter<W> {
    /// Returns a reference to the inner writer.
    #[must_use]
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Returns a mutable reference to the inner writer.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    /// Drops the cipher state and returns the inner writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for CipherWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let Some(cipher) = self.cipher.as_mut() else {
            return Err(io::Error::other("cipher layer already finalized"));
        };
        self.scratch.clear();
        self.scratch.extend_from_slice(buf);
        cipher.apply_keystream(&mut self.scratch);
        // The keystream has advanced; the whole buffer must reach the sink.
        self.inner.write_all(&self.scratch)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<W: Write + StreamLayer> StreamLayer for CipherWriter<W> {
    fn finalize(&mut self) -> io::Result<()> {
        self.cipher = None;
        self.flush()
    }

    fn inner_layer(&mut self) -> Option<&mut dyn StreamLayer> {
        Some(&mut self.inner)
    }
}

/// Decrypting reader for streams produced by [`CipherWriter`].
pub struct CipherReader<R> {
    inner: R,
    cipher: Aes256Ofb,
}

impl<R: Read> CipherReader<R> {
    /// Reads the IV from `inner` and prepares to decrypt the rest.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream is shorter than the IV or the cipher
    /// cannot be initialized.
    pub fn new(mut inner: R, key: &[u8; KEY_LEN]) -> Result<Self> {
        let mut iv = [0u8; IV_LEN];
        inner.read_exact(&mut iv)?;
        let cipher = init_cipher(key, &iv)?;
        Ok(Self { inner, cipher })
    }
}

impl<R: Read> Read for CipherReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.cipher.apply_keystream(&mut buf[..n]);
        Ok(n)
    }
}

/// The optional encryption stage of the output stack.
pub enum EncryptionLayer<W> {
    /// Bytes pass through unchanged.
    Disabled(W),
    /// Bytes are encrypted.
    Enabled(CipherWriter<W>),
}

impl<W: Write> EncryptionLayer<W> {
    /// Asks `source` for the passphrase and starts an encrypted stream on
    /// `inner`. The passphrase and derived key are wiped before returning.
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::Passphrase`] if the passphrase cannot be read,
    /// or any error from [`CipherWriter::new`].
    pub fn encrypt(inner: W, source: &mut dyn PassphraseSource) -> Result<Self> {
        let passphrase = source.passphrase().map_err(BackupError::Passphrase)?;
        let key = derive_key(passphrase.as_bytes());
        Ok(Self::Enabled(CipherWriter::new(inner, &key)?))
    }
}

impl<W> EncryptionLayer<W> {
    /// Returns a reference to the writer beneath this layer.
    #[must_use]
    pub fn get_ref(&self) -> &W {
        match self {
            Self::Disabled(w) => w,
            Self::Enabled(c) => c.get_ref(),
        }
    }

    /// Returns `true` if this layer encrypts.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        matches!(self, Self::Enabled(_))
    }
}

impl<W: Write> Write for EncryptionLayer<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Disabled(w) => w.write(buf),
            Self::Enabled(c) => c.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Disabled(w) => w.flush(),
            Self::Enabled(c) => c.flush(),
        }
    }
}

impl<W: Write + StreamLayer> StreamLayer for EncryptionLayer<W> {
    fn finalize(&mut self) -> io::Result<()> {
        match self {
            Self::Disabled(_) => Ok(()),
            Self::Enabled(c) => c.finalize(),
        }
    }

    fn inner_layer(&mut self) -> Option<&mut dyn StreamLayer> {
        match self {
            Self::Disabled(w) => Some(w),
            Self::Enabled(c) => c.inner_layer(),
        }
    }
}
