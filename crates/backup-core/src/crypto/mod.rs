//! Optional archive encryption.
//!
//! The compressed archive stream can be wrapped in AES-256 in OFB mode. The
//! key comes from a passphrase supplied by a [`PassphraseSource`].

pub mod key;
pub mod stream;

pub use key::KEY_LEN;
pub use key::PassphraseSource;
pub use key::StaticPassphrase;
pub use key::TerminalPrompt;
pub use key::derive_key;
pub use stream::CipherReader;
pub use stream::CipherWriter;
pub use stream::EncryptionLayer;
pub use stream::IV_LEN;
pub use stream::random_iv;
