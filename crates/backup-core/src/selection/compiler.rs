//! Stage compilation: turns an ordered stage list into a file list.

use crate::rules::Polarity;
use crate::rules::Stage;
use crate::selection::ExclusionWindow;
use crate::selection::SelectedFile;
use crate::selection::matcher::expand;
use crate::selection::walker::walk_into;
use std::path::Path;
use tracing::debug;
use tracing::info;

/// Compiles `stages` into the ordered list of files to archive.
///
/// Relative patterns are resolved against `root`. Each include stage is
/// evaluated against the exclusion window as it stands when the stage is
/// reached; passing an exclude stage retires that stage's patterns (see
/// [`ExclusionWindow`]). Files are listed in discovery order and a file
/// reached by several globs is listed once per glob.
///
/// # Examples
///
/// ```no_run
/// use backup_core::rules::Stage;
/// use backup_core::selection::compile;
/// use std::path::Path;
///
/// let stages = [Stage::include(["Documents"]), Stage::exclude(["*.tmp"])];
/// for file in compile(&stages, Path::new("/home/me")) {
///     println!("{}", file.path.display());
/// }
/// ```
#[must_use]
pub fn compile(stages: &[Stage], root: &Path) -> Vec<SelectedFile> {
    let mut window = ExclusionWindow::from_stages(stages);
    let mut selected = Vec::new();

    for stage in stages {
        match stage.polarity {
            Polarity::Include => {
                for rule in &stage.rules {
                    let matches = expand(&rule.pattern, root);
                    debug!(
                        origin = %stage.origin,
                        line = rule.line,
                        pattern = %rule.pattern,
                        matches = matches.len(),
                        exclusions = window.len(),
                        "expanding include rule"
                    );
                    for root_match in &matches {
                        walk_into(root_match, &window, &mut selected);
                    }
                }
            }
            Polarity::Exclude => window.retire(stage),
        }
    }

    info!(stages = stages.len(), files = selected.len(), "compiled selection");
    selected
}
