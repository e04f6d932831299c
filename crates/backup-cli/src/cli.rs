//! CLI argument parsing using clap.

use backup_core::CompressionCodec;
use clap::ArgAction;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "backup")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log detail (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build a backup archive from rule files
    Build(BuildArgs),
    /// Restore a backup archive
    Restore(RestoreArgs),
    /// Generate shell completions
    Completion {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(clap::Args)]
pub struct BuildArgs {
    /// Rule file (can be repeated; default: backup.list)
    #[arg(short = 'l', long = "list", value_name = "LIST")]
    pub lists: Vec<PathBuf>,

    /// Output archive path (can be repeated; default: stdout)
    #[arg(short = 'o', long = "output", value_name = "OUTPUT")]
    pub outputs: Vec<PathBuf>,

    /// Directory relative rules are resolved against (default: home directory)
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Encrypt the archive with a passphrase read from the terminal
    #[arg(short = 'e', long)]
    pub encrypt: bool,

    /// Compression codec
    #[arg(short = 'c', long, value_enum, default_value_t = Codec::Gzip)]
    pub codec: Codec,

    /// Compression level (1-9)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=9))]
    pub level: Option<u8>,
}

#[derive(clap::Args)]
pub struct RestoreArgs {
    /// Path to the archive file
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,
}

/// Compression codec names accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Codec {
    Gzip,
    Bzip2,
    Xz,
    Zstd,
}

impl From<Codec> for CompressionCodec {
    fn from(codec: Codec) -> Self {
        match codec {
            Codec::Gzip => Self::Gzip,
            Codec::Bzip2 => Self::Bzip2,
            Codec::Xz => Self::Xz,
            Codec::Zstd => Self::Zstd,
        }
    }
}
