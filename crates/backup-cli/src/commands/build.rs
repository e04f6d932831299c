//! Build command implementation.

use crate::cli::BuildArgs;
use crate::error::convert_backup_error;
use crate::output::OutputFormatter;
use crate::progress::CliProgress;
use anyhow::Result;
use backup_core::BackupBuilder;
use backup_core::BuildConfig;
use backup_core::open_outputs;

/// Maps command-line flags onto a [`BuildConfig`].
pub fn build_config(args: &BuildArgs) -> BuildConfig {
    let mut config = BuildConfig::default()
        .with_codec(args.codec.into())
        .with_encrypt(args.encrypt);
    if let Some(root) = &args.root {
        config = config.with_root(root);
    }
    if let Some(level) = args.level {
        config = config.with_compression_level(level);
    }
    config
}

pub fn execute(
    args: &BuildArgs,
    formatter: &dyn OutputFormatter,
    show_progress: bool,
) -> Result<()> {
    let sink = open_outputs(&args.outputs).map_err(convert_backup_error)?;

    let builder = args
        .lists
        .iter()
        .fold(BackupBuilder::new(), |builder, list| builder.rule_file(list))
        .sink(sink)
        .config(build_config(args));

    let report = if show_progress && CliProgress::should_show() {
        let mut progress = CliProgress::new("Archiving");
        builder.run_with_progress(&mut progress)
    } else {
        builder.run()
    }
    .map_err(convert_backup_error)?;

    formatter.format_build_result(&args.outputs, &report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use crate::cli::Commands;
    use backup_core::CompressionCodec;
    use clap::Parser;
    use std::path::PathBuf;

    fn parse(args: &[&str]) -> BuildArgs {
        match Cli::parse_from(args).command {
            Commands::Build(args) => args,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_default_flags_keep_config_defaults() {
        let config = build_config(&parse(&["backup", "build"]));
        assert!(config.root.is_none());
        assert_eq!(config.codec, CompressionCodec::Gzip);
        assert_eq!(config.compression_level, Some(6));
        assert!(!config.encrypt);
    }

    #[test]
    fn test_flags_map_onto_config() {
        let config = build_config(&parse(&[
            "backup", "build", "--root", "/srv", "-c", "xz", "--level", "9", "--encrypt",
        ]));
        assert_eq!(config.root, Some(PathBuf::from("/srv")));
        assert_eq!(config.codec, CompressionCodec::Xz);
        assert_eq!(config.compression_level, Some(9));
        assert!(config.encrypt);
    }
}
