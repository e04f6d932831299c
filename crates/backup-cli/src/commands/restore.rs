//! Restore command implementation (not implemented yet).

use crate::cli::RestoreArgs;
use crate::output::OutputFormatter;
use anyhow::Result;

/// Warns that restoring is unavailable. The run itself still succeeds.
pub fn execute(args: &RestoreArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    formatter.format_warning(&format!(
        "Restoring '{}' is not implemented; extract it with tar instead",
        args.archive.display()
    ));
    Ok(())
}
