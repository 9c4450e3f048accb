//! Glob pattern matching with Ruby `Dir.glob` conventions.
//!
//! Manifest discovery has to see the same files a real dependency resolver would
//! see. Bundler finds gemspecs with `Dir["#{path}/{,*,*/*}.gemspec"]`, so this
//! module reproduces the relevant parts of Ruby's glob semantics on top of the
//! `glob` crate:
//!
//! - `*` matches any sequence of characters within a single path component
//! - `*` and `?` never match a leading `.` (hidden files stay hidden)
//! - `{a,b}` alternatives are expanded before matching, including empty ones
//!   (`{,*}.gemspec` is `.gemspec` or `*.gemspec`)
//!
//! # Examples
//!
//! ```rust,no_run
//! use rubygems_import::pattern::PatternResolver;
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! let resolver = PatternResolver::new();
//! let gemspecs = resolver.resolve("{,*,*/*}.gemspec", Path::new("/src/foo"))?;
//! for path in &gemspecs {
//!     println!("candidate: {}", path.display());
//! }
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use glob::{MatchOptions, Pattern};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};
use walkdir::WalkDir;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// A single compiled glob, matched against paths relative to a base directory.
///
/// The pattern may not contain braces; use [`expand_braces`] or
/// [`PatternResolver`] for those.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    pattern: Pattern,
    original_pattern: String,
    depth: usize,
}

impl PatternMatcher {
    /// Compiles a glob pattern.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is not valid glob syntax.
    pub fn new(pattern_str: &str) -> Result<Self> {
        let pattern = Pattern::new(pattern_str)
            .with_context(|| format!("Invalid glob pattern: {pattern_str}"))?;

        let depth = if pattern_str.contains("**") {
            usize::MAX
        } else {
            pattern_str.split('/').count()
        };

        Ok(Self {
            pattern,
            original_pattern: pattern_str.to_string(),
            depth,
        })
    }

    /// Finds every file under `base_path` whose relative path matches.
    ///
    /// Symlinks are followed like Ruby's `Dir.glob` does, both for files and for
    /// directories, and matches keep the path of the link. The walk stops at the
    /// depth the pattern can reach, so `*/*.gemspec` never descends more than two
    /// levels. Entries that cannot be read are skipped with a warning. Returned
    /// paths are relative to `base_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_path` cannot be canonicalized.
    pub fn find_matches(&self, base_path: &Path) -> Result<Vec<PathBuf>> {
        debug!("Searching for pattern '{}' in {:?}", self.original_pattern, base_path);

        let base_path = base_path
            .canonicalize()
            .with_context(|| format!("Failed to canonicalize path: {base_path:?}"))?;

        let mut matches = Vec::new();
        for entry in WalkDir::new(&base_path).follow_links(true).min_depth(1).max_depth(self.depth) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry while searching {}: {}", base_path.display(), e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative_path) = entry.path().strip_prefix(&base_path) else {
                continue;
            };

            trace!("Checking path: {}", relative_path.display());
            if self.matches(relative_path) {
                matches.push(relative_path.to_path_buf());
            }
        }

        debug!("Found {} matches for pattern '{}'", matches.len(), self.original_pattern);
        Ok(matches)
    }

    /// Checks a relative path against the pattern without touching the filesystem.
    pub fn matches(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy().replace('\\', "/");
        self.pattern.matches_with(&path_str, MATCH_OPTIONS)
    }
}

/// Resolves brace-capable glob patterns to sorted, de-duplicated file lists.
#[derive(Debug, Default, Clone, Copy)]
pub struct PatternResolver;

impl PatternResolver {
    pub const fn new() -> Self {
        Self
    }

    /// Expands braces in `pattern` and returns every matching file under
    /// `base_path`, relative to it, in lexicographic order.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid patterns or an inaccessible base path.
    pub fn resolve(&self, pattern: &str, base_path: &Path) -> Result<Vec<PathBuf>> {
        let mut all_matches = BTreeSet::new();
        for alternative in expand_braces(pattern) {
            let matcher = PatternMatcher::new(&alternative)?;
            all_matches.extend(matcher.find_matches(base_path)?);
        }
        Ok(all_matches.into_iter().collect())
    }
}

/// Expands `{a,b}` alternatives, innermost groups included.
///
/// Unbalanced braces are left untouched. Order follows the alternatives as
/// written, so `{,*,*/*}.gemspec` yields `.gemspec`, `*.gemspec`, `*/*.gemspec`.
pub fn expand_braces(pattern: &str) -> Vec<String> {
    let Some(open) = pattern.find('{') else {
        return vec![pattern.to_string()];
    };

    let mut depth = 0usize;
    let mut close = None;
    let mut splits = Vec::new();
    for (offset, ch) in pattern[open..].char_indices() {
        let idx = open + offset;
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    close = Some(idx);
                    break;
                }
            }
            ',' if depth == 1 => splits.push(idx),
            _ => {}
        }
    }

    let Some(close) = close else {
        return vec![pattern.to_string()];
    };

    let prefix = &pattern[..open];
    let suffix = &pattern[close + 1..];
    let mut bounds = vec![open];
    bounds.extend(splits);
    bounds.push(close);

    bounds
        .windows(2)
        .flat_map(|w| {
            let alternative = &pattern[w[0] + 1..w[1]];
            expand_braces(&format!("{prefix}{alternative}{suffix}"))
        })
        .collect()
}
