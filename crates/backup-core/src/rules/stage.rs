//! Stage and rule types.

use std::fmt;

/// Whether a stage adds files to the selection or removes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Polarity {
    /// `[include]` stage.
    Include,
    /// `[exclude]` stage.
    Exclude,
}

impl Polarity {
    /// Returns the marker line that opens a stage of this polarity.
    ///
    /// # Examples
    ///
    /// ```
    /// use backup_core::rules::Polarity;
    ///
    /// assert_eq!(Polarity::Include.marker(), "[include]");
    /// assert_eq!(Polarity::from_marker("[exclude]"), Some(Polarity::Exclude));
    /// assert_eq!(Polarity::from_marker("include"), None);
    /// ```
    #[must_use]
    pub const fn marker(self) -> &'static str {
        match self {
            Self::Include => "[include]",
            Self::Exclude => "[exclude]",
        }
    }

    /// Parses a marker line.
    #[must_use]
    pub fn from_marker(line: &str) -> Option<Self> {
        match line {
            "[include]" => Some(Self::Include),
            "[exclude]" => Some(Self::Exclude),
            _ => None,
        }
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Include => write!(f, "include"),
            Self::Exclude => write!(f, "exclude"),
        }
    }
}

/// A single glob pattern and the line it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Glob pattern, matched against full relative paths and base names.
    pub pattern: String,

    /// 1-based line number in the originating rule file.
    pub line: usize,
}

impl Rule {
    /// Creates a new rule.
    #[must_use]
    pub fn new(pattern: impl Into<String>, line: usize) -> Self {
        Self {
            pattern: pattern.into(),
            line,
        }
    }
}

/// One `[include]` or `[exclude]` block.
///
/// Stages are never reordered or merged once loaded; their position in the
/// overall sequence decides which exclusions apply to which inclusions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    /// Include or exclude.
    pub polarity: Polarity,

    /// Identifier of the rule source, usually the rule file path.
    pub origin: String,

    /// Rules in source order.
    pub rules: Vec<Rule>,
}

impl Stage {
    /// Creates an empty stage.
    #[must_use]
    pub fn new(polarity: Polarity, origin: impl Into<String>) -> Self {
        Self {
            polarity,
            origin: origin.into(),
            rules: Vec::new(),
        }
    }

    /// Creates an include stage from patterns, numbering lines from 1.
    ///
    /// # Examples
    ///
    /// ```
    /// use backup_core::rules::Stage;
    ///
    /// let stage = Stage::include(["*.txt", "docs"]);
    /// assert!(stage.is_include());
    /// assert_eq!(stage.rules.len(), 2);
    /// assert_eq!(stage.rules[1].pattern, "docs");
    /// ```
    #[must_use]
    pub fn include<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_patterns(Polarity::Include, patterns)
    }

    /// Creates an exclude stage from patterns, numbering lines from 1.
    #[must_use]
    pub fn exclude<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_patterns(Polarity::Exclude, patterns)
    }

    fn with_patterns<I, S>(polarity: Polarity, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let rules = patterns
            .into_iter()
            .enumerate()
            .map(|(i, p)| Rule::new(p, i + 1))
            .collect();
        Self {
            polarity,
            origin: String::new(),
            rules,
        }
    }

    /// Returns `true` for `[include]` stages.
    #[must_use]
    pub fn is_include(&self) -> bool {
        self.polarity == Polarity::Include
    }

    /// Iterates over the stage's patterns.
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.pattern.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polarity_markers_roundtrip() {
        for polarity in [Polarity::Include, Polarity::Exclude] {
            assert_eq!(Polarity::from_marker(polarity.marker()), Some(polarity));
        }
        assert_eq!(Polarity::from_marker("[Include]"), None);
    }

    #[test]
    fn test_stage_exclude_numbers_lines() {
        let stage = Stage::exclude(["*.log", "cache", "tmp?"]);
        assert!(!stage.is_include());
        let lines: Vec<_> = stage.rules.iter().map(|r| r.line).collect();
        assert_eq!(lines, vec![1, 2, 3]);
        assert_eq!(stage.patterns().collect::<Vec<_>>(), vec!["*.log", "cache", "tmp?"]);
    }

    #[test]
    fn test_polarity_display() {
        assert_eq!(Polarity::Include.to_string(), "include");
        assert_eq!(Polarity::Exclude.to_string(), "exclude");
    }
}
