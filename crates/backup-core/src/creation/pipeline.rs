//! The archive emission pipeline.
//!
//! Output stack, outermost first:
//!
//! ```text
//! tar::Builder
//!   CountingWriter      (uncompressed tar bytes)
//!     Compressor        (gzip, bzip2, xz or zstd)
//!       EncryptionLayer (AES-256-OFB, or pass-through)
//!         CountingWriter (bytes delivered)
//!           FanOut      (every output)
//! ```
//!
//! Per-file problems that occur before any byte of the entry reached the
//! stream are recorded as warnings and the file is skipped. Once bytes are
//! committed, any failure leaves the archive inconsistent and aborts the run.

use crate::BackupError;
use crate::BuildConfig;
use crate::BuildReport;
use crate::ProgressCallback;
use crate::Result;
use crate::creation::compression::Compressor;
use crate::creation::tar::append_entry;
use crate::crypto::EncryptionLayer;
use crate::crypto::PassphraseSource;
use crate::io::CountingWriter;
use crate::io::FanOut;
use crate::io::close_chain;
use crate::metadata::EntryKind;
use crate::metadata::HeaderRecord;
use crate::metadata::IdentityResolver;
use crate::metadata::try_capture;
use crate::selection::SelectedFile;
use crate::selection::matcher::archive_name;
use std::fs::File;
use std::io;
use std::io::Read;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;
use std::time::Instant;
use tar::Builder;
use tracing::debug;
use tracing::info;
use tracing::warn;

type ArchiveStream = CountingWriter<Compressor<EncryptionLayer<CountingWriter<FanOut>>>>;

const PROGRESS_BATCH: u64 = 1024 * 1024;

/// Writes selected files into a compressed, optionally encrypted tar
/// stream.
///
/// # Examples
///
/// ```no_run
/// use backup_core::BuildConfig;
/// use backup_core::NoopProgress;
/// use backup_core::creation::Pipeline;
/// use backup_core::crypto::TerminalPrompt;
/// use backup_core::io::FanOut;
/// use backup_core::metadata::SystemIdentity;
/// use backup_core::selection::SelectedFile;
///
/// let sink = FanOut::new().with_sink("stdout", std::io::stdout());
/// let mut pipeline = Pipeline::new(sink, &BuildConfig::default(), &mut TerminalPrompt::default())?;
/// let files = [SelectedFile::at("/etc/hosts")];
/// pipeline.emit(&files, &SystemIdentity::new(), &mut NoopProgress)?;
/// let report = pipeline.finish(&mut NoopProgress)?;
/// eprintln!("{} files", report.files_added);
/// # Ok::<(), backup_core::BackupError>(())
/// ```
pub struct Pipeline {
    builder: Builder<ArchiveStream>,
    report: BuildReport,
    started: Instant,
}

impl Pipeline {
    /// Sets up the output stack on `sink`.
    ///
    /// When `config.encrypt` is set the passphrase is requested from
    /// `passphrase` and the IV is written before this returns; otherwise
    /// `passphrase` is not used.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the cipher cannot
    /// be set up, or the compressor cannot be created.
    pub fn new(
        sink: FanOut,
        config: &BuildConfig,
        passphrase: &mut dyn PassphraseSource,
    ) -> Result<Self> {
        config.validate()?;
        let started = Instant::now();

        let delivered = CountingWriter::new(sink);
        let sealed = if config.encrypt {
            EncryptionLayer::encrypt(delivered, passphrase)?
        } else {
            EncryptionLayer::Disabled(delivered)
        };
        let compressor = Compressor::new(config.codec, config.compression_level, sealed)
            .map_err(BackupError::Sink)?;

        info!(
            codec = %config.codec,
            level = ?config.compression_level,
            encrypted = config.encrypt,
            "archive stream opened"
        );

        Ok(Self {
            builder: Builder::new(CountingWriter::new(compressor)),
            report: BuildReport::new(),
            started,
        })
    }

    /// Appends `files` in order.
    ///
    /// Files that cannot be captured, opened, or named in a tar header are
    /// skipped with a warning in the final report.
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::BodyRead`] or [`BackupError::BodyTruncated`]
    /// if a file fails after its header was written, and
    /// [`BackupError::Sink`] if the output stream fails. The pipeline must
    /// not be used for further entries after an error.
    pub fn emit(
        &mut self,
        files: &[SelectedFile],
        identity: &dyn IdentityResolver,
        progress: &mut dyn ProgressCallback,
    ) -> Result<()> {
        let total = files.len();
        for (index, file) in files.iter().enumerate() {
            progress.on_entry_start(&file.path, total, index + 1);
            self.emit_one(file, identity, progress)?;
            progress.on_entry_complete(&file.path);
        }
        Ok(())
    }

    fn emit_one(
        &mut self,
        file: &SelectedFile,
        identity: &dyn IdentityResolver,
        progress: &mut dyn ProgressCallback,
    ) -> Result<()> {
        let name = archive_name(&file.path);
        if name.as_os_str().is_empty() || has_parent_component(&name) {
            self.skip(&file.path, "name cannot be stored in the archive");
            return Ok(());
        }

        let record = match try_capture(&file.source, &name, identity) {
            Ok(record) => record,
            Err(e) => {
                self.skip(&file.path, &format!("unable to read metadata: {e}"));
                return Ok(());
            }
        };

        let source = if record.kind == EntryKind::Regular {
            match File::open(&file.source) {
                Ok(source) => Some(source),
                Err(e) => {
                    self.skip(&file.path, &format!("unable to open: {e}"));
                    return Ok(());
                }
            }
        } else {
            None
        };

        let before = self.builder.get_ref().total_bytes();
        let (result, fault) = match source {
            Some(source) => {
                let mut body = BodyReader::new(source, record.size, progress);
                let result = append_entry(&mut self.builder, &record, Some(&mut body));
                (result, body.into_fault())
            }
            None => (append_entry(&mut self.builder, &record, None), None),
        };

        match result {
            Ok(()) => {
                self.record_added(&record);
                Ok(())
            }
            Err(e) => {
                if let Some(fault) = fault {
                    return Err(fault.into_error(file.source.clone()));
                }
                let stream = self.builder.get_ref();
                if stream.has_failed() || stream.total_bytes() != before {
                    return Err(BackupError::Sink(e));
                }
                self.skip(&file.path, &format!("unable to write header: {e}"));
                Ok(())
            }
        }
    }

    fn record_added(&mut self, record: &HeaderRecord) {
        debug!(path = %record.path.display(), kind = ?record.kind, size = record.size, "archived");
        match record.kind {
            EntryKind::Regular => self.report.files_added += 1,
            EntryKind::Directory => self.report.directories_added += 1,
            EntryKind::Symlink => self.report.symlinks_added += 1,
            EntryKind::BlockDevice | EntryKind::CharDevice | EntryKind::Fifo => {
                self.report.special_added += 1;
            }
        }
    }

    fn skip(&mut self, path: &Path, reason: &str) {
        warn!(path = %path.display(), reason, "skipping file");
        self.report.files_skipped += 1;
        self.report
            .add_warning(format!("skipping '{}': {reason}", path.display()));
    }

    /// Adds a warning that did not come from a file, such as an unreadable
    /// rule source.
    pub fn add_warning(&mut self, msg: impl Into<String>) {
        self.report.add_warning(msg);
    }

    /// Finalizes every layer and returns the run report.
    ///
    /// Layers are finalized outermost first: tar trailer, compressor
    /// trailer, cipher, counters, outputs. Every step runs even if an
    /// earlier one failed.
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::Sink`] with the first error any layer
    /// reported.
    pub fn finish(mut self, progress: &mut dyn ProgressCallback) -> Result<BuildReport> {
        let trailer = self.builder.finish();
        let layers = close_chain(self.builder.get_mut());

        let stream = self.builder.get_ref();
        self.report.bytes_written = stream.total_bytes();
        self.report.bytes_compressed = stream.get_ref().get_ref().get_ref().total_bytes();
        self.report.duration = self.started.elapsed();

        trailer.and(layers).map_err(BackupError::Sink)?;

        info!(
            entries = self.report.total_items(),
            skipped = self.report.files_skipped,
            bytes = self.report.bytes_written,
            delivered = self.report.bytes_compressed,
            "archive complete"
        );
        progress.on_complete();
        Ok(std::mem::take(&mut self.report))
    }
}

fn has_parent_component(path: &Path) -> bool {
    path.components().any(|c| matches!(c, Component::ParentDir))
}

/// Why copying a file body failed.
#[derive(Debug)]
enum BodyFault {
    Read(io::Error),
    Truncated { expected: u64, actual: u64 },
}

impl BodyFault {
    fn into_error(self, path: PathBuf) -> BackupError {
        match self {
            Self::Read(source) => BackupError::BodyRead { path, source },
            Self::Truncated { expected, actual } => BackupError::BodyTruncated {
                path,
                expected,
                actual,
            },
        }
    }
}

/// Supplies exactly `expected` bytes of a file to the tar builder.
///
/// A file that grew is cut at `expected`; one that shrank, or a read error,
/// is recorded as a fault and surfaces as an error to the builder.
struct BodyReader<'a> {
    inner: io::Take<File>,
    expected: u64,
    read: u64,
    fault: Option<BodyFault>,
    progress: &'a mut dyn ProgressCallback,
    unreported: u64,
}

impl<'a> BodyReader<'a> {
    fn new(file: File, expected: u64, progress: &'a mut dyn ProgressCallback) -> Self {
        Self {
            inner: file.take(expected),
            expected,
            read: 0,
            fault: None,
            progress,
            unreported: 0,
        }
    }

    fn report_progress(&mut self) {
        if self.unreported > 0 {
            self.progress.on_bytes_written(self.unreported);
            self.unreported = 0;
        }
    }

    fn into_fault(mut self) -> Option<BodyFault> {
        self.report_progress();
        self.fault.take()
    }
}

impl Read for BodyReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        match self.inner.read(buf) {
            Ok(0) if self.read < self.expected => {
                self.fault = Some(BodyFault::Truncated {
                    expected: self.expected,
                    actual: self.read,
                });
                Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "file shrank while being archived",
                ))
            }
            Ok(n) => {
                self.read += n as u64;
                self.unreported += n as u64;
                if self.unreported >= PROGRESS_BATCH {
                    self.report_progress();
                }
                Ok(n)
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Err(e),
            Err(e) => {
                let err = io::Error::new(e.kind(), e.to_string());
                self.fault = Some(BodyFault::Read(e));
                Err(err)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::NoopProgress;
    use crate::creation::CompressionCodec;
    use crate::crypto::StaticPassphrase;
    use crate::metadata::MapIdentity;
    use crate::test_utils::FailingWriter;
    use crate::test_utils::SharedBuffer;
    use crate::test_utils::gunzip;
    use crate::test_utils::read_tar;
    use std::fs;
    use tempfile::TempDir;

    fn selected(root: &Path, rel: &str) -> SelectedFile {
        SelectedFile {
            path: PathBuf::from(rel),
            source: root.join(rel),
        }
    }

    fn run(files: &[SelectedFile], config: &BuildConfig) -> (Result<BuildReport>, Vec<u8>) {
        let buffer = SharedBuffer::new();
        let sink = FanOut::new().with_sink("mem", buffer.clone());
        let mut pipeline =
            Pipeline::new(sink, config, &mut StaticPassphrase::new("pw")).unwrap();
        let result = pipeline
            .emit(files, &MapIdentity::new(), &mut NoopProgress)
            .and_then(|()| pipeline.finish(&mut NoopProgress));
        (result, buffer.contents())
    }

    #[test]
    fn test_pipeline_writes_gzip_tar() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.txt"), "alpha").unwrap();
        fs::write(temp.path().join("b.txt"), "beta").unwrap();
        let files = [selected(temp.path(), "a.txt"), selected(temp.path(), "b.txt")];

        let (report, bytes) = run(&files, &BuildConfig::default());
        let report = report.unwrap();
        assert_eq!(report.files_added, 2);
        assert_eq!(report.bytes_compressed, bytes.len() as u64);
        assert!(report.bytes_written >= 3 * 512);

        let entries = read_tar(&gunzip(&bytes));
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].path, "a.txt");
        assert_eq!(entries[0].data, b"alpha");
        assert_eq!(entries[1].data, b"beta");
    }

    #[test]
    fn test_missing_file_is_skipped_with_warning() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("kept"), "k").unwrap();
        let files = [selected(temp.path(), "gone"), selected(temp.path(), "kept")];

        let (report, bytes) = run(&files, &BuildConfig::default());
        let report = report.unwrap();
        assert_eq!(report.files_added, 1);
        assert_eq!(report.files_skipped, 1);
        assert!(report.warnings[0].contains("gone"));

        let entries = read_tar(&gunzip(&bytes));
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].path, "kept");
    }

    #[test]
    fn test_parent_component_is_skipped() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("outside"), "o").unwrap();
        let files = [SelectedFile {
            path: PathBuf::from("../outside"),
            source: temp.path().join("outside"),
        }];

        let (report, _) = run(&files, &BuildConfig::default());
        let report = report.unwrap();
        assert_eq!(report.files_skipped, 1);
        assert_eq!(report.total_items(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_is_archived() {
        let temp = TempDir::new().unwrap();
        std::os::unix::fs::symlink("missing-target", temp.path().join("dangling")).unwrap();
        let files = [selected(temp.path(), "dangling")];

        let (report, bytes) = run(&files, &BuildConfig::default());
        assert_eq!(report.unwrap().symlinks_added, 1);
        let entries = read_tar(&gunzip(&bytes));
        assert_eq!(entries[0].link.as_deref(), Some("missing-target"));
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_file_is_skipped() {
        use nix::unistd::Uid;
        use std::os::unix::fs::PermissionsExt;

        if Uid::effective().is_root() {
            return;
        }
        let temp = TempDir::new().unwrap();
        let locked = temp.path().join("locked");
        fs::write(&locked, "secret").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        let (report, _) = run(&[selected(temp.path(), "locked")], &BuildConfig::default());
        let report = report.unwrap();
        assert_eq!(report.files_skipped, 1);
        assert!(report.warnings[0].contains("unable to open"));
    }

    #[test]
    fn test_sink_failure_is_fatal() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("big"), vec![7u8; 256 * 1024]).unwrap();
        let sink = FanOut::new().with_sink("broken", FailingWriter::after(0));
        let config = BuildConfig {
            compression_level: Some(1),
            ..BuildConfig::default()
        };
        let mut pipeline =
            Pipeline::new(sink, &config, &mut StaticPassphrase::new("pw")).unwrap();

        let result = pipeline
            .emit(
                &[selected(temp.path(), "big")],
                &MapIdentity::new(),
                &mut NoopProgress,
            )
            .and_then(|()| pipeline.finish(&mut NoopProgress));
        assert!(matches!(result, Err(BackupError::Sink(_))));
    }

    #[test]
    fn test_finish_reports_flush_failure() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a"), "a").unwrap();
        let good = SharedBuffer::new();
        let sink = FanOut::new()
            .with_sink("flaky", FailingWriter::on_flush())
            .with_sink("good", good.clone());
        let mut pipeline = Pipeline::new(
            sink,
            &BuildConfig::default(),
            &mut StaticPassphrase::new("pw"),
        )
        .unwrap();
        pipeline
            .emit(
                &[selected(temp.path(), "a")],
                &MapIdentity::new(),
                &mut NoopProgress,
            )
            .unwrap();

        let err = pipeline.finish(&mut NoopProgress).unwrap_err();
        assert!(matches!(err, BackupError::Sink(_)));
        // The gzip trailer still reached the healthy output.
        let entries = read_tar(&gunzip(&good.contents()));
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_body_reader_detects_shrunk_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("short");
        fs::write(&path, "abc").unwrap();
        let mut progress = NoopProgress;
        let mut reader = BodyReader::new(File::open(&path).unwrap(), 10, &mut progress);

        let mut out = Vec::new();
        let err = reader.read_to_end(&mut out).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
        match reader.into_fault() {
            Some(BodyFault::Truncated { expected, actual }) => {
                assert_eq!((expected, actual), (10, 3));
            }
            other => panic!("unexpected fault {other:?}"),
        }
    }

    #[test]
    fn test_body_reader_cuts_grown_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("long");
        fs::write(&path, "abcdef").unwrap();
        let mut progress = NoopProgress;
        let mut reader = BodyReader::new(File::open(&path).unwrap(), 4, &mut progress);

        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"abcd");
        assert!(reader.into_fault().is_none());
    }

    #[test]
    fn test_invalid_level_rejected_before_output() {
        let buffer = SharedBuffer::new();
        let sink = FanOut::new().with_sink("mem", buffer.clone());
        let config = BuildConfig::default()
            .with_codec(CompressionCodec::Zstd)
            .with_compression_level(12);

        let result = Pipeline::new(sink, &config, &mut StaticPassphrase::new("pw"));
        assert!(matches!(
            result,
            Err(BackupError::InvalidCompressionLevel { level: 12 })
        ));
        assert!(buffer.contents().is_empty());
    }
}
