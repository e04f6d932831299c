//! Compression layer of the archive stream.
//!
//! User levels follow one scale for every codec:
//!
//! - **1-3**: Fast compression (lower CPU usage, larger files)
//! - **6**: Default compression (balanced)
//! - **7-9**: Best compression (higher CPU usage, smaller files)
//!
//! Each codec maps these levels to its own internal scale.

use crate::io::StreamLayer;
use bzip2::write::BzEncoder;
use flate2::write::GzEncoder;
use std::fmt;
use std::io;
use std::io::Write;
use xz2::write::XzEncoder;

/// Compression codec applied to the tar stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CompressionCodec {
    /// Gzip (deflate).
    #[default]
    Gzip,
    /// Bzip2 (Burrows-Wheeler).
    Bzip2,
    /// Xz (LZMA2).
    Xz,
    /// Zstandard.
    Zstd,
}

impl CompressionCodec {
    /// Every codec, in preference order.
    pub const ALL: [Self; 4] = [Self::Gzip, Self::Bzip2, Self::Xz, Self::Zstd];

    /// Typical file extension of a tar archive compressed with this codec.
    ///
    /// # Examples
    ///
    /// ```
    /// use backup_core::creation::CompressionCodec;
    ///
    /// assert_eq!(CompressionCodec::Gzip.extension(), "tar.gz");
    /// assert_eq!(CompressionCodec::Zstd.extension(), "tar.zst");
    /// ```
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Gzip => "tar.gz",
            Self::Bzip2 => "tar.bz2",
            Self::Xz => "tar.xz",
            Self::Zstd => "tar.zst",
        }
    }

    /// Human-readable codec name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Gzip => "gzip",
            Self::Bzip2 => "bzip2",
            Self::Xz => "xz",
            Self::Zstd => "zstd",
        }
    }
}

impl fmt::Display for CompressionCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Converts a user compression level (1-9) to a flate2 level.
#[must_use]
pub fn compression_level_to_flate2(level: Option<u8>) -> flate2::Compression {
    match level {
        None | Some(6) => flate2::Compression::default(),
        Some(1..=3) => flate2::Compression::fast(),
        Some(7..=9) => flate2::Compression::best(),
        Some(n) => flate2::Compression::new(u32::from(n)),
    }
}

/// Converts a user compression level (1-9) to a bzip2 level.
#[must_use]
pub fn compression_level_to_bzip2(level: Option<u8>) -> bzip2::Compression {
    match level {
        None | Some(6) => bzip2::Compression::default(),
        Some(1) => bzip2::Compression::fast(),
        Some(7..=9) => bzip2::Compression::best(),
        Some(n) => bzip2::Compression::new(u32::from(n.min(9))),
    }
}

/// Converts a user compression level (1-9) to an xz preset.
#[must_use]
pub fn compression_level_to_xz(level: Option<u8>) -> u32 {
    level.map_or(6, |n| u32::from(n.min(9)))
}

/// Converts a user compression level (1-9) to a zstd level.
///
/// Zstd's range is 1-22; the user scale picks points along it.
///
/// ```
/// use backup_core::creation::compression::compression_level_to_zstd;
///
/// assert_eq!(compression_level_to_zstd(None), 3);
/// assert_eq!(compression_level_to_zstd(Some(9)), 19);
/// ```
#[allow(clippy::match_same_arms)]
#[must_use]
pub fn compression_level_to_zstd(level: Option<u8>) -> i32 {
    match level {
        None | Some(6) => 3,
        Some(1) => 1,
        Some(2) => 2,
        Some(7) => 10,
        Some(8) => 15,
        Some(9) => 19,
        _ => 3,
    }
}

/// Streaming compressor for one of the supported codecs.
pub enum Compressor<W: Write> {
    /// Gzip encoder.
    Gzip(GzEncoder<W>),
    /// Bzip2 encoder.
    Bzip2(BzEncoder<W>),
    /// Xz encoder.
    Xz(XzEncoder<W>),
    /// Zstd encoder, with content checksum.
    Zstd(zstd::Encoder<'static, W>),
}

impl<W: Write> Compressor<W> {
    /// Creates a compressor writing into `inner`.
    ///
    /// # Errors
    ///
    /// Returns an error if the zstd context cannot be created.
    ///
    /// # Examples
    ///
    /// ```
    /// use backup_core::creation::CompressionCodec;
    /// use backup_core::creation::compression::Compressor;
    /// use std::io::Write;
    ///
    /// let mut gz = Compressor::new(CompressionCodec::Gzip, Some(9), Vec::new())?;
    /// gz.write_all(b"hello")?;
    /// let bytes = gz.finish()?;
    /// assert_eq!(&bytes[..2], &[0x1f, 0x8b]);
    /// # Ok::<(), std::io::Error>(())
    /// ```
    pub fn new(codec: CompressionCodec, level: Option<u8>, inner: W) -> io::Result<Self> {
        Ok(match codec {
            CompressionCodec::Gzip => {
                Self::Gzip(GzEncoder::new(inner, compression_level_to_flate2(level)))
            }
            CompressionCodec::Bzip2 => {
                Self::Bzip2(BzEncoder::new(inner, compression_level_to_bzip2(level)))
            }
            CompressionCodec::Xz => Self::Xz(XzEncoder::new(inner, compression_level_to_xz(level))),
            CompressionCodec::Zstd => {
                let mut encoder = zstd::Encoder::new(inner, compression_level_to_zstd(level))?;
                encoder.include_checksum(true)?;
                Self::Zstd(encoder)
            }
        })
    }

    /// The codec in use.
    #[must_use]
    pub const fn codec(&self) -> CompressionCodec {
        match self {
            Self::Gzip(_) => CompressionCodec::Gzip,
            Self::Bzip2(_) => CompressionCodec::Bzip2,
            Self::Xz(_) => CompressionCodec::Xz,
            Self::Zstd(_) => CompressionCodec::Zstd,
        }
    }

    /// Writes the codec trailer without consuming the compressor.
    ///
    /// # Errors
    ///
    /// Returns the error from writing the trailer.
    pub fn try_finish(&mut self) -> io::Result<()> {
        match self {
            Self::Gzip(e) => e.try_finish(),
            Self::Bzip2(e) => e.try_finish(),
            Self::Xz(e) => e.try_finish(),
            Self::Zstd(e) => e.do_finish(),
        }
    }

    /// Writes the trailer and returns the inner writer.
    ///
    /// # Errors
    ///
    /// Returns the error from writing the trailer.
    pub fn finish(self) -> io::Result<W> {
        Ok(match self {
            Self::Gzip(e) => e.finish()?,
            Self::Bzip2(e) => e.finish()?,
            Self::Xz(e) => e.finish()?,
            Self::Zstd(e) => e.finish()?,
        })
    }

    /// Returns a reference to the inner writer.
    #[must_use]
    pub fn get_ref(&self) -> &W {
        match self {
            Self::Gzip(e) => e.get_ref(),
            Self::Bzip2(e) => e.get_ref(),
            Self::Xz(e) => e.get_ref(),
            Self::Zstd(e) => e.get_ref(),
        }
    }

    /// Returns a mutable reference to the inner writer.
    pub fn get_mut(&mut self) -> &mut W {
        match self {
            Self::Gzip(e) => e.get_mut(),
            Self::Bzip2(e) => e.get_mut(),
            Self::Xz(e) => e.get_mut(),
            Self::Zstd(e) => e.get_mut(),
        }
    }
}

impl<W: Write> Write for Compressor<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Gzip(e) => e.write(buf),
            Self::Bzip2(e) => e.write(buf),
            Self::Xz(e) => e.write(buf),
            Self::Zstd(e) => e.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Gzip(e) => e.flush(),
            Self::Bzip2(e) => e.flush(),
            Self::Xz(e) => e.flush(),
            Self::Zstd(e) => e.flush(),
        }
    }
}

impl<W: Write + StreamLayer> StreamLayer for Compressor<W> {
    fn finalize(&mut self) -> io::Result<()> {
        self.try_finish()
    }

    fn inner_layer(&mut self) -> Option<&mut dyn StreamLayer> {
        Some(self.get_mut())
    }
}

impl<W: Write> fmt::Debug for Compressor<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Compressor").field(&self.codec()).finish()
    }
}
