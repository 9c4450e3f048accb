//! RubyGems version semantics.
//!
//! Gem versions are not semantic versions: they have any number of segments,
//! segments may be alphabetic (`1.0.pre`, `2.0.0.rc1`), and comparison pads the
//! shorter version with zeros. This module models those rules so the resolver and
//! the validator agree with what RubyGems itself would decide.
//!
//! - [`GemVersion`] - a parsed version (`Gem::Version`)
//! - [`Requirement`] - a list of operator/version constraints (`Gem::Requirement`)
//!
//! # Comparison Rules
//!
//! - Segments are compared left to right, the shorter side padded with `0`
//! - Numeric segments compare numerically, alphabetic ones lexically
//! - An alphabetic segment sorts before any numeric one, so `1.0.a < 1.0`
//! - A `-` in the version means prerelease: `1.0-rc1` is `1.0.pre.rc1`
//!
//! ```rust,no_run
//! use rubygems_import::version::GemVersion;
//!
//! let a = GemVersion::parse("1.2")?;
//! let b = GemVersion::parse("1.2.0")?;
//! assert_eq!(a, b);
//! assert!(GemVersion::parse("1.2.0.pre")? < a);
//! # Ok::<(), rubygems_import::core::ImportError>(())
//! ```

pub mod requirement;

pub use requirement::{Operator, Requirement};

use crate::core::ImportError;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::LazyLock;

static VERSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]+(\.[0-9a-zA-Z]+)*(-[0-9A-Za-z-]+(\.[0-9A-Za-z-]+)*)?$")
        .expect("version pattern is valid")
});

static SEGMENT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+|[a-zA-Z]+").expect("segment pattern is valid"));

/// A single component of a version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Numeric component such as `12`
    Number(u64),
    /// Alphabetic component such as `pre` or `rc`
    Text(String),
}

impl Segment {
    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Text(_), Self::Number(_)) => Ordering::Less,
            (Self::Number(_), Self::Text(_)) => Ordering::Greater,
        }
    }

    const fn is_zero(&self) -> bool {
        matches!(self, Self::Number(0))
    }
}

/// A RubyGems version number.
///
/// Equality and hashing follow comparison, so `1.2` and `1.2.0` are equal and hash
/// alike. [`fmt::Display`] prints the version as it was written.
#[derive(Debug, Clone)]
pub struct GemVersion {
    original: String,
    segments: Vec<Segment>,
}

impl GemVersion {
    /// Parses a version string, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::InvalidVersion`] for empty input or text that is not a
    /// RubyGems version.
    pub fn parse(input: &str) -> Result<Self, ImportError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ImportError::InvalidVersion {
                version: input.to_string(),
                reason: "version is empty".to_string(),
            });
        }
        if !VERSION_PATTERN.is_match(trimmed) {
            return Err(ImportError::InvalidVersion {
                version: input.to_string(),
                reason: "expected dot separated numbers and letters".to_string(),
            });
        }

        let normalized = trimmed.replace('-', ".pre.");
        let mut segments = Vec::new();
        for m in SEGMENT_PATTERN.find_iter(&normalized) {
            let text = m.as_str();
            let segment = match text.parse::<u64>() {
                Ok(n) => Segment::Number(n),
                Err(_) if text.chars().all(|c| c.is_ascii_digit()) => {
                    return Err(ImportError::InvalidVersion {
                        version: input.to_string(),
                        reason: format!("segment '{text}' is too large"),
                    });
                }
                Err(_) => Segment::Text(text.to_string()),
            };
            segments.push(segment);
        }

        Ok(Self {
            original: trimmed.to_string(),
            segments,
        })
    }

    /// The parsed segments.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Whether any segment is alphabetic.
    pub fn is_prerelease(&self) -> bool {
        self.segments.iter().any(|s| matches!(s, Segment::Text(_)))
    }

    /// The release this version belongs to: prerelease segments removed.
    #[must_use]
    pub fn release(&self) -> Self {
        if !self.is_prerelease() {
            return self.clone();
        }
        let segments: Vec<Segment> = self
            .segments
            .iter()
            .take_while(|s| matches!(s, Segment::Number(_)))
            .cloned()
            .collect();
        Self::from_segments(segments)
    }

    /// The upper bound used by the pessimistic operator.
    ///
    /// Prerelease segments are dropped, then the last segment is removed (unless it
    /// is the only one) and the new last segment is incremented: `1.2.3` bumps to
    /// `1.3`, `1` bumps to `2`.
    #[must_use]
    pub fn bump(&self) -> Self {
        let mut numbers: Vec<u64> = self
            .segments
            .iter()
            .map_while(|s| match s {
                Segment::Number(n) => Some(*n),
                Segment::Text(_) => None,
            })
            .collect();
        if numbers.len() > 1 {
            numbers.pop();
        }
        match numbers.last_mut() {
            Some(last) => *last = last.saturating_add(1),
            None => numbers.push(1),
        }
        Self::from_segments(numbers.into_iter().map(Segment::Number).collect())
    }

    fn from_segments(segments: Vec<Segment>) -> Self {
        let original = segments
            .iter()
            .map(|s| match s {
                Segment::Number(n) => n.to_string(),
                Segment::Text(t) => t.clone(),
            })
            .collect::<Vec<_>>()
            .join(".");
        Self {
            original,
            segments,
        }
    }

    fn canonical(&self) -> &[Segment] {
        let end = self.segments.iter().rposition(|s| !s.is_zero()).map_or(0, |i| i + 1);
        &self.segments[..end]
    }
}

impl Ord for GemVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let zero = Segment::Number(0);
        let len = self.segments.len().max(other.segments.len());
        for i in 0..len {
            let a = self.segments.get(i).unwrap_or(&zero);
            let b = other.segments.get(i).unwrap_or(&zero);
            match a.compare(b) {
                Ordering::Equal => {}
                ord => return ord,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for GemVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for GemVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for GemVersion {}

impl Hash for GemVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical().hash(state);
    }
}

impl fmt::Display for GemVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl FromStr for GemVersion {
    type Err = ImportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for GemVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.original)
    }
}

impl<'de> Deserialize<'de> for GemVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}
