//! The exclusion window.
//!
//! The window is a queue holding the patterns of every `[exclude]` stage, in
//! stage order. While the compiler walks the stages it retires an exclude
//! stage's patterns from the front as soon as it passes that stage.
//!
//! Invariant: when an `[include]` stage is evaluated, the window holds
//! exactly the patterns of the exclude stages that come *after* it. An
//! exclusion therefore filters the inclusions listed before it and has no
//! effect on inclusions listed after it.

use crate::rules::Stage;
use crate::selection::matcher::PathPattern;
use std::collections::VecDeque;
use std::path::Path;

/// Queue of exclusion patterns still in force.
#[derive(Debug, Clone, Default)]
pub struct ExclusionWindow {
    patterns: VecDeque<PathPattern>,
}

impl ExclusionWindow {
    /// Builds the initial window from every exclude stage in `stages`.
    ///
    /// # Examples
    ///
    /// ```
    /// use backup_core::rules::Stage;
    /// use backup_core::selection::ExclusionWindow;
    ///
    /// let stages = [
    ///     Stage::include(["*"]),
    ///     Stage::exclude(["*.tmp", "cache"]),
    ///     Stage::exclude(["*.log"]),
    /// ];
    /// let window = ExclusionWindow::from_stages(&stages);
    /// assert_eq!(window.patterns().collect::<Vec<_>>(), vec!["*.tmp", "cache", "*.log"]);
    /// ```
    #[must_use]
    pub fn from_stages(stages: &[Stage]) -> Self {
        let patterns = stages
            .iter()
            .filter(|stage| !stage.is_include())
            .flat_map(|stage| stage.patterns())
            .map(PathPattern::new)
            .collect();
        Self { patterns }
    }

    /// Retires the patterns of an exclude stage that has just been passed.
    ///
    /// Because stages are consumed in the same order the window was filled,
    /// the front `stage.rules.len()` entries are that stage's own patterns.
    pub fn retire(&mut self, stage: &Stage) {
        debug_assert!(!stage.is_include(), "only exclude stages are retired");
        let count = stage.rules.len().min(self.patterns.len());
        debug_assert!(
            self.patterns
                .iter()
                .zip(stage.patterns())
                .all(|(held, own)| held.as_str() == own),
            "window front out of step with stage order"
        );
        self.patterns.drain(..count);
    }

    /// Returns `true` if any pattern in the window matches `path` or its
    /// base name.
    #[must_use]
    pub fn excludes(&self, path: &Path) -> bool {
        self.patterns.iter().any(|pattern| pattern.matches(path))
    }

    /// Number of patterns still in force.
    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Returns `true` if no exclusion applies any more.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Iterates over the pattern text, front first.
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(PathPattern::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_include_stages_contribute_nothing() {
        let stages = [Stage::include(["*.txt"]), Stage::include(["docs"])];
        let window = ExclusionWindow::from_stages(&stages);
        assert!(window.is_empty());
        assert!(!window.excludes(Path::new("a.txt")));
    }

    #[test]
    fn test_retire_pops_front_in_stage_order() {
        let first = Stage::exclude(["a", "b"]);
        let second = Stage::exclude(["c"]);
        let stages = [
            Stage::include(["x"]),
            first.clone(),
            Stage::include(["y"]),
            second.clone(),
        ];
        let mut window = ExclusionWindow::from_stages(&stages);
        assert_eq!(window.len(), 3);
        assert!(window.excludes(Path::new("dir/a")));

        window.retire(&first);
        assert_eq!(window.patterns().collect::<Vec<_>>(), vec!["c"]);
        assert!(!window.excludes(Path::new("dir/a")));
        assert!(window.excludes(Path::new("c")));

        window.retire(&second);
        assert!(window.is_empty());
    }

    #[test]
    fn test_retire_empty_stage_keeps_window() {
        let empty = Stage::exclude(Vec::<String>::new());
        let stages = [empty.clone(), Stage::exclude(["keep"])];
        let mut window = ExclusionWindow::from_stages(&stages);

        window.retire(&empty);
        assert_eq!(window.patterns().collect::<Vec<_>>(), vec!["keep"]);
    }

    #[test]
    fn test_malformed_patterns_hold_their_slot() {
        let broken = Stage::exclude(["[", "*.log"]);
        let later = Stage::exclude(["*.tmp"]);
        let stages = [broken.clone(), later];
        let mut window = ExclusionWindow::from_stages(&stages);
        assert_eq!(window.len(), 3);
        assert!(window.excludes(Path::new("x.log")));

        window.retire(&broken);
        assert_eq!(window.patterns().collect::<Vec<_>>(), vec!["*.tmp"]);
    }
}
