//! Glob expansion and path matching.
//!
//! Patterns use shell glob syntax: `*`, `?`, `[abc]`, `[a-z]`, and `[!abc]`
//! or `[^abc]` for negation. Wildcards never cross a `/`, and a leading `.`
//! needs no literal match. There is no recursive `**`: a run of stars is a
//! single `*`.
//! A pattern without special characters is a literal path or name.

use glob::MatchOptions;
use glob::Pattern;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;
use tracing::debug;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// A compiled exclusion pattern.
///
/// A pattern that fails to compile is kept so that the window stays aligned
/// with its stages, but it never matches.
#[derive(Debug, Clone)]
pub struct PathPattern {
    raw: String,
    compiled: Option<Pattern>,
}

impl PathPattern {
    /// Compiles `raw`. Malformed patterns are accepted and never match.
    ///
    /// # Examples
    ///
    /// ```
    /// use backup_core::selection::matcher::PathPattern;
    /// use std::path::Path;
    ///
    /// let pattern = PathPattern::new("*.log");
    /// assert!(pattern.matches(Path::new("var/app.log")));
    /// assert!(!pattern.matches(Path::new("var/app.log.1")));
    ///
    /// let broken = PathPattern::new("[unclosed");
    /// assert!(!broken.matches(Path::new("[unclosed")));
    /// ```
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let compiled = match Pattern::new(&normalize(&raw)) {
            Ok(pattern) => Some(pattern),
            Err(e) => {
                debug!(pattern = %raw, error = %e, "malformed exclusion pattern never matches");
                None
            }
        };
        Self { raw, compiled }
    }

    /// The pattern text as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns `true` if the pattern matches the whole path or its base name.
    #[must_use]
    pub fn matches(&self, path: &Path) -> bool {
        let Some(pattern) = &self.compiled else {
            return false;
        };

        let full = path
            .to_str()
            .is_some_and(|s| pattern.matches_with(s, MATCH_OPTIONS));
        if full {
            return true;
        }

        path.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| pattern.matches_with(name, MATCH_OPTIONS))
    }
}

/// A filesystem match produced by [`expand`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobMatch {
    /// Path relative to the expansion root, or absolute for absolute patterns.
    pub path: PathBuf,

    /// Location on disk.
    pub source: PathBuf,
}

/// Expands `pattern` against the filesystem under `root`.
///
/// Results are sorted the way the filesystem glob returns them. Malformed
/// patterns and unreadable directories produce no matches rather than an
/// error.
pub fn expand(pattern: &str, root: &Path) -> Vec<GlobMatch> {
    let absolute = Path::new(pattern).is_absolute();
    let normalized = normalize(pattern);
    let full_pattern = if absolute {
        normalized
    } else {
        let base = Pattern::escape(&root.to_string_lossy());
        if base.ends_with('/') {
            format!("{base}{normalized}")
        } else {
            format!("{base}/{normalized}")
        }
    };

    let paths = match glob::glob_with(&full_pattern, MATCH_OPTIONS) {
        Ok(paths) => paths,
        Err(e) => {
            debug!(pattern, error = %e, "glob pattern expands to nothing");
            return Vec::new();
        }
    };

    paths
        .filter_map(|entry| match entry {
            Ok(source) => Some(source),
            Err(e) => {
                debug!(pattern, error = %e, "skipping unreadable glob entry");
                None
            }
        })
        .filter_map(|source| {
            let path = if absolute {
                source.clone()
            } else {
                source.strip_prefix(root).ok()?.to_path_buf()
            };
            Some(GlobMatch { path, source })
        })
        .collect()
}

/// Rewrites shell glob syntax into the dialect `glob::Pattern` compiles.
///
/// Runs of `*` outside a bracket expression collapse to one `*`, and a
/// bracket expression opened with `[^` becomes `[!`.
fn normalize(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars().peekable();
    let mut in_class = false;

    while let Some(c) = chars.next() {
        match c {
            '*' if !in_class => {
                out.push('*');
                while chars.next_if_eq(&'*').is_some() {}
            }
            '[' if !in_class => {
                out.push('[');
                in_class = true;
                if chars.next_if(|&n| n == '^' || n == '!').is_some() {
                    out.push('!');
                }
                // A `]` right after the opening is a class member.
                if chars.next_if_eq(&']').is_some() {
                    out.push(']');
                }
            }
            ']' if in_class => {
                out.push(']');
                in_class = false;
            }
            _ => out.push(c),
        }
    }
    out
}

/// Converts a selected path into a tar-safe relative name.
///
/// Absolute selections lose their root and prefix components.
///
/// # Examples
///
/// ```
/// use backup_core::selection::matcher::archive_name;
/// use std::path::Path;
///
/// assert_eq!(archive_name(Path::new("/etc/hosts")), Path::new("etc/hosts"));
/// assert_eq!(archive_name(Path::new("notes/a.txt")), Path::new("notes/a.txt"));
/// ```
#[must_use]
pub fn archive_name(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::RootDir | Component::Prefix(_)))
        .collect()
}
