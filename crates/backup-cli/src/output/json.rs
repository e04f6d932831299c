//! JSON output formatter for machine-readable results.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use super::formatter::output_names;
use anyhow::Result;
use backup_core::BuildReport;
use serde::Serialize;
use std::io;
use std::io::Write;
use std::path::PathBuf;

pub struct JsonFormatter;

#[derive(Serialize)]
struct BuildOutput {
    outputs: Vec<String>,
    files_added: usize,
    symlinks_added: usize,
    special_added: usize,
    files_skipped: usize,
    bytes_written: u64,
    bytes_compressed: u64,
    compression_ratio: f64,
    compression_percentage: f64,
    duration_ms: u128,
    warnings: Vec<String>,
}

impl BuildOutput {
    fn new(outputs: &[PathBuf], report: &BuildReport) -> Self {
        Self {
            outputs: output_names(outputs),
            files_added: report.files_added,
            symlinks_added: report.symlinks_added,
            special_added: report.special_added,
            files_skipped: report.files_skipped,
            bytes_written: report.bytes_written,
            bytes_compressed: report.bytes_compressed,
            compression_ratio: report.compression_ratio(),
            compression_percentage: report.compression_percentage(),
            duration_ms: report.duration.as_millis(),
            warnings: report.warnings.clone(),
        }
    }
}

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stderr(), "{json}")?;
        Ok(())
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_build_result(&self, outputs: &[PathBuf], report: &BuildReport) -> Result<()> {
        let output = JsonOutput::success("build", BuildOutput::new(outputs, report));
        Self::output(&output)
    }

    fn format_error(&self, operation: &str, error: &anyhow::Error) {
        let output = JsonOutput::error(operation, format!("{error:#}"));
        let _ = Self::output(&output);
    }

    fn format_warning(&self, message: &str) {
        #[derive(Serialize)]
        struct WarningData {
            message: String,
        }

        let output = JsonOutput::success(
            "warning",
            WarningData {
                message: message.to_string(),
            },
        );
        let _ = Self::output(&output);
    }
}
