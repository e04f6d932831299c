//! Rule-file parsing.
//!
//! Format:
//!
//! ```text
//! # lines before the first marker are ignored
//! [include]
//! Documents
//! *.conf
//!
//! [exclude]
//! *.tmp
//! ```
//!
//! Each line is trimmed. `[include]` and `[exclude]` open a new stage, blank
//! lines are ignored, any other line is a glob rule of the open stage.

use crate::BackupError;
use crate::rules::stage::Polarity;
use crate::rules::stage::Rule;
use crate::rules::stage::Stage;
use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;
use tracing::warn;

/// Stages loaded from a set of rule files, plus the sources that failed.
#[derive(Debug, Default)]
pub struct LoadedRules {
    /// Stages of every readable source, concatenated in load order.
    pub stages: Vec<Stage>,

    /// One error per unreadable source.
    pub failures: Vec<BackupError>,
}

/// Parses rule lines from `reader`, appending stages to `stages`.
///
/// Lines before the first marker of this reader are ignored even if
/// `stages` already holds an open stage from a previous source.
///
/// # Examples
///
/// ```
/// use backup_core::rules::parse_stages;
///
/// let text = "junk\n[include]\n*.txt\n\n[exclude]\nsecret.txt\n";
/// let mut stages = Vec::new();
/// parse_stages(text.as_bytes(), "inline", &mut stages)?;
///
/// assert_eq!(stages.len(), 2);
/// assert_eq!(stages[0].rules[0].pattern, "*.txt");
/// assert_eq!(stages[0].rules[0].line, 3);
/// assert_eq!(stages[1].rules[0].line, 6);
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn parse_stages<R: BufRead>(
    reader: R,
    origin: &str,
    stages: &mut Vec<Stage>,
) -> std::io::Result<()> {
    let first_new = stages.len();
    let mut open = false;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();

        if let Some(polarity) = Polarity::from_marker(line) {
            stages.push(Stage::new(polarity, origin));
            open = true;
            continue;
        }

        if line.is_empty() {
            continue;
        }

        match stages.last_mut() {
            Some(stage) if open => stage.rules.push(Rule::new(line, index + 1)),
            _ => debug!(origin, line = index + 1, "ignoring rule outside of a stage"),
        }
    }

    debug!(origin, stages = stages.len() - first_new, "parsed rule source");
    Ok(())
}

/// Loads rule files in order.
///
/// A source that cannot be opened or read is recorded in
/// [`LoadedRules::failures`] and contributes no stages; the remaining
/// sources still load.
pub fn load_rule_files<P: AsRef<Path>>(paths: &[P]) -> LoadedRules {
    let mut loaded = LoadedRules::default();

    for path in paths {
        let path = path.as_ref();
        let origin = path.display().to_string();

        let mut parsed = Vec::new();
        let result = File::open(path)
            .and_then(|file| parse_stages(BufReader::new(file), &origin, &mut parsed));

        match result {
            Ok(()) => loaded.stages.append(&mut parsed),
            Err(source) => {
                warn!(path = %origin, error = %source, "unable to load rule file");
                loaded.failures.push(BackupError::RuleSource {
                    path: path.to_path_buf(),
                    source,
                });
            }
        }
    }

    loaded
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn parse(text: &str) -> Vec<Stage> {
        let mut stages = Vec::new();
        parse_stages(text.as_bytes(), "test.list", &mut stages).unwrap();
        stages
    }

    #[test]
    fn test_parse_empty_source() {
        assert!(parse("").is_empty());
        assert!(parse("\n\n   \n").is_empty());
    }

    #[test]
    fn test_parse_ignores_lines_before_first_marker() {
        let stages = parse("Documents\nPictures\n[exclude]\n*.tmp\n");
        assert_eq!(stages.len(), 1);
        assert_eq!(stages[0].polarity, Polarity::Exclude);
        assert_eq!(stages[0].rules, vec![Rule::new("*.tmp", 4)]);
    }

    #[test]
    fn test_parse_trims_and_skips_blank_lines() {
        let stages = parse("  [include]  \n\n   Documents  \n\t*.conf\n");
        assert_eq!(stages.len(), 1);
        assert_eq!(
            stages[0].patterns().collect::<Vec<_>>(),
            vec!["Documents", "*.conf"]
        );
        assert_eq!(stages[0].rules[0].line, 3);
        assert_eq!(stages[0].origin, "test.list");
    }

    #[test]
    fn test_parse_keeps_empty_stages() {
        let stages = parse("[include]\n[exclude]\n[include]\na\n");
        assert_eq!(stages.len(), 3);
        assert!(stages[0].rules.is_empty());
        assert!(stages[1].rules.is_empty());
        assert_eq!(stages[2].rules.len(), 1);
    }

    #[test]
    fn test_parse_does_not_continue_previous_source_stage() {
        let mut stages = Vec::new();
        parse_stages("[include]\na\n".as_bytes(), "one", &mut stages).unwrap();
        parse_stages("orphan\n[exclude]\nb\n".as_bytes(), "two", &mut stages).unwrap();

        assert_eq!(stages.len(), 2);
        assert_eq!(stages[0].patterns().collect::<Vec<_>>(), vec!["a"]);
        assert_eq!(stages[1].origin, "two");
        assert_eq!(stages[1].patterns().collect::<Vec<_>>(), vec!["b"]);
    }

    #[test]
    fn test_load_rule_files_concatenates_in_order() {
        let temp = TempDir::new().unwrap();
        let first = temp.path().join("first.list");
        let second = temp.path().join("second.list");
        fs::write(&first, "[include]\n*.txt\n").unwrap();
        fs::write(&second, "[exclude]\nsecret.txt\n[include]\nsecret.txt\n").unwrap();

        let loaded = load_rule_files(&[&first, &second]);

        assert!(loaded.failures.is_empty());
        let polarities: Vec<_> = loaded.stages.iter().map(|s| s.polarity).collect();
        assert_eq!(
            polarities,
            vec![Polarity::Include, Polarity::Exclude, Polarity::Include]
        );
        assert_eq!(loaded.stages[0].origin, first.display().to_string());
        assert_eq!(loaded.stages[2].origin, second.display().to_string());
    }

    #[test]
    fn test_load_rule_files_reports_missing_source_and_continues() {
        let temp = TempDir::new().unwrap();
        let present = temp.path().join("present.list");
        let missing = temp.path().join("missing.list");
        fs::write(&present, "[include]\nnotes\n").unwrap();

        let loaded = load_rule_files(&[&missing, &present]);

        assert_eq!(loaded.stages.len(), 1);
        assert_eq!(loaded.failures.len(), 1);
        assert!(matches!(
            &loaded.failures[0],
            BackupError::RuleSource { path, .. } if path == &missing
        ));
    }
}
