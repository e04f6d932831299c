//! Human-readable output formatter with colors and styling.

use super::formatter::OutputFormatter;
use super::formatter::output_names;
use crate::progress::humanize_bytes;
use anyhow::Result;
use backup_core::BuildReport;
use console::Term;
use console::style;
use std::path::PathBuf;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled_stderr(),
            term: Term::stderr(),
        }
    }

    fn format_number(n: usize) -> String {
        let s = n.to_string();
        let mut result = String::new();
        let mut count = 0;

        for c in s.chars().rev() {
            if count == 3 {
                result.push(',');
                count = 0;
            }
            result.push(c);
            count += 1;
        }

        result.chars().rev().collect()
    }

    fn line(&self, text: &str) {
        let _ = self.term.write_line(text);
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_build_result(&self, outputs: &[PathBuf], report: &BuildReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        let targets = output_names(outputs).join(", ");
        if self.use_colors {
            self.line(&format!(
                "{} Backup written to {targets}",
                style("✓").green().bold()
            ));
        } else {
            self.line(&format!("Backup written to {targets}"));
        }

        self.line("");
        self.line(&format!(
            "  Files added:      {}",
            Self::format_number(report.files_added)
        ));
        if report.symlinks_added > 0 || self.verbose {
            self.line(&format!(
                "  Symlinks:         {}",
                Self::format_number(report.symlinks_added)
            ));
        }
        if report.special_added > 0 || self.verbose {
            self.line(&format!(
                "  Special files:    {}",
                Self::format_number(report.special_added)
            ));
        }
        self.line(&format!(
            "  Total size:       {}",
            humanize_bytes(report.bytes_written)
        ));
        if report.bytes_compressed > 0 {
            self.line(&format!(
                "  Archive size:     {}",
                humanize_bytes(report.bytes_compressed)
            ));
            self.line(&format!(
                "  Compression:      {:.1}%",
                report.compression_percentage()
            ));
        }
        if report.files_skipped > 0 {
            self.line(&format!("  Files skipped:    {}", report.files_skipped));
        }
        if self.verbose {
            self.line(&format!("  Duration:         {:?}", report.duration));
        }

        if report.has_warnings() {
            self.line("");
            if self.use_colors {
                self.line(&format!("{}", style("Warnings:").yellow().bold()));
            } else {
                self.line("Warnings:");
            }
            for warning in &report.warnings {
                self.line(&format!("  - {warning}"));
            }
        }

        Ok(())
    }

    fn format_error(&self, _operation: &str, error: &anyhow::Error) {
        // Always show errors, even in quiet mode
        if self.use_colors {
            self.line(&format!("{} {error:?}", style("ERROR:").red().bold()));
        } else {
            self.line(&format!("ERROR: {error:?}"));
        }
    }

    fn format_warning(&self, message: &str) {
        if self.quiet {
            return;
        }

        if self.use_colors {
            self.line(&format!("{} {message}", style("⚠").yellow().bold()));
        } else {
            self.line(&format!("WARNING: {message}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number_small() {
        assert_eq!(HumanFormatter::format_number(0), "0");
        assert_eq!(HumanFormatter::format_number(42), "42");
        assert_eq!(HumanFormatter::format_number(999), "999");
    }

    #[test]
    fn test_format_number_thousands() {
        assert_eq!(HumanFormatter::format_number(1000), "1,000");
        assert_eq!(HumanFormatter::format_number(1_234_567), "1,234,567");
    }

    #[test]
    fn test_quiet_build_result_prints_nothing() {
        let formatter = HumanFormatter::new(false, true);
        let report = BuildReport::default();
        assert!(formatter.format_build_result(&[], &report).is_ok());
    }
}
