//! High-level API for building backups.

use crate::BackupError;
use crate::BuildConfig;
use crate::BuildReport;
use crate::NoopProgress;
use crate::ProgressCallback;
use crate::Result;
use crate::creation::Pipeline;
use crate::crypto::PassphraseSource;
use crate::crypto::TerminalPrompt;
use crate::io::FanOut;
use crate::metadata::IdentityResolver;
use crate::metadata::SystemIdentity;
use crate::rules::Stage;
use crate::rules::load_rule_files;
use crate::selection::compile;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::path::PathBuf;
use tracing::info;

/// Rule file read when none is given.
pub const DEFAULT_RULE_FILE: &str = "backup.list";

/// Opens every output for writing, truncating existing files.
///
/// With no paths the archive goes to standard output.
///
/// # Errors
///
/// Returns [`BackupError::OutputOpen`] for the first output that cannot be
/// created.
pub fn open_outputs<P: AsRef<Path>>(paths: &[P]) -> Result<FanOut> {
    if paths.is_empty() {
        return Ok(FanOut::new().with_sink("<stdout>", std::io::stdout()));
    }

    let mut sink = FanOut::new();
    for path in paths {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| BackupError::OutputOpen {
            path: path.to_path_buf(),
            source,
        })?;
        sink.push(path.display().to_string(), BufWriter::new(file));
    }
    Ok(sink)
}

/// Builds one backup: loads rules, selects files, writes the archive.
///
/// # Examples
///
/// ```no_run
/// use backup_core::BackupBuilder;
/// use backup_core::BuildConfig;
/// use backup_core::api::open_outputs;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let report = BackupBuilder::new()
///     .rule_file("backup.list")
///     .sink(open_outputs(&["/mnt/usb/home.tar.gz"])?)
///     .config(BuildConfig::default().with_root("/home/me"))
///     .run()?;
/// println!("archived {} files", report.files_added);
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct BackupBuilder {
    rule_files: Vec<PathBuf>,
    stages: Vec<Stage>,
    sink: Option<FanOut>,
    config: BuildConfig,
    passphrase: Option<Box<dyn PassphraseSource>>,
    identity: Option<Box<dyn IdentityResolver>>,
}

impl BackupBuilder {
    /// Creates a builder with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule file. Files load in the order added, before any stages
    /// given with [`BackupBuilder::stages`].
    #[must_use]
    pub fn rule_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.rule_files.push(path.as_ref().to_path_buf());
        self
    }

    /// Adds stages built in code.
    #[must_use]
    pub fn stages(mut self, stages: impl IntoIterator<Item = Stage>) -> Self {
        self.stages.extend(stages);
        self
    }

    /// Sets the outputs. Defaults to standard output.
    #[must_use]
    pub fn sink(mut self, sink: FanOut) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: BuildConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets where the passphrase comes from. Defaults to a terminal prompt.
    #[must_use]
    pub fn passphrase(mut self, source: impl PassphraseSource + 'static) -> Self {
        self.passphrase = Some(Box::new(source));
        self
    }

    /// Sets the owner and group name resolver. Defaults to the system
    /// databases.
    #[must_use]
    pub fn identity(mut self, identity: impl IdentityResolver + 'static) -> Self {
        self.identity = Some(Box::new(identity));
        self
    }

    /// Runs the backup without progress reporting.
    ///
    /// # Errors
    ///
    /// See [`BackupBuilder::run_with_progress`].
    pub fn run(self) -> Result<BuildReport> {
        self.run_with_progress(&mut NoopProgress)
    }

    /// Runs the backup.
    ///
    /// Unreadable rule files and unreadable selected files are reported as
    /// warnings. With neither rule files nor stages, [`DEFAULT_RULE_FILE`]
    /// is read.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the root cannot be
    /// determined, encryption cannot be set up, a file fails after its
    /// header was written, or an output fails.
    pub fn run_with_progress(self, progress: &mut dyn ProgressCallback) -> Result<BuildReport> {
        self.config.validate()?;
        let root = self.config.resolve_root()?;

        let rule_files = if self.rule_files.is_empty() && self.stages.is_empty() {
            vec![PathBuf::from(DEFAULT_RULE_FILE)]
        } else {
            self.rule_files
        };
        let loaded = load_rule_files(&rule_files);
        let mut stages = loaded.stages;
        stages.extend(self.stages);

        info!(root = %root.display(), "selecting files");
        let selected = compile(&stages, &root);

        let sink = match self.sink {
            Some(sink) => sink,
            None => open_outputs::<&Path>(&[])?,
        };
        let mut passphrase = self
            .passphrase
            .unwrap_or_else(|| Box::new(TerminalPrompt::default()));
        let identity = self
            .identity
            .unwrap_or_else(|| Box::new(SystemIdentity::new()));

        let mut pipeline = Pipeline::new(sink, &self.config, passphrase.as_mut())?;
        for failure in &loaded.failures {
            pipeline.add_warning(failure.to_string());
        }
        pipeline.emit(&selected, identity.as_ref(), progress)?;
        pipeline.finish(progress)
    }
}
