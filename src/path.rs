//! Hierarchical functor paths.
//!
//! Every literal functor, variable name and action name is a [`Path`]: an ordered
//! list of segments rendered joined by `/`. `a/b/goal` has the prefix `a/b` and the
//! suffix `goal`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Separator between path segments.
pub const SEPARATOR: &str = "/";

/// An ordered, immutable list of path segments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub struct Path {
    segments: Vec<String>,
}

impl Path {
    /// The empty path.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Split a `/`-separated string into a path. Empty segments are dropped.
    pub fn parse(raw: &str) -> Self {
        Self {
            segments: raw
                .split(SEPARATOR)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// Build a path from already separated segments.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments
                .into_iter()
                .map(Into::into)
                .filter(|s: &String| !s.is_empty())
                .collect(),
        }
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Segment at `index`; negative indices count from the end.
    pub fn get(&self, index: isize) -> Option<&str> {
        let idx = if index < 0 {
            self.segments.len().checked_sub(index.unsigned_abs())?
        } else {
            index as usize
        };
        self.segments.get(idx).map(String::as_str)
    }

    /// Last segment, or `""` for the empty path.
    pub fn suffix(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or("")
    }

    /// Everything but the last segment.
    pub fn prefix(&self) -> Path {
        let end = self.segments.len().saturating_sub(1);
        self.sub_path(0, end)
    }

    /// Segments `[from, to)`, clamped to the path length.
    pub fn sub_path(&self, from: usize, to: usize) -> Path {
        let to = to.min(self.segments.len());
        let from = from.min(to);
        Self {
            segments: self.segments[from..to].to_vec(),
        }
    }

    /// New path with `other` appended after `self`.
    pub fn append(&self, other: &Path) -> Path {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        Self { segments }
    }

    /// New path with `other` placed in front of `self`.
    pub fn with_prefix(&self, other: &Path) -> Path {
        other.append(self)
    }

    /// Path consisting of the last segment only.
    pub fn suffix_path(&self) -> Path {
        self.sub_path(self.segments.len().saturating_sub(1), self.segments.len())
    }

    pub fn starts_with(&self, other: &Path) -> bool {
        self.segments.starts_with(&other.segments)
    }

    pub fn ends_with(&self, other: &Path) -> bool {
        self.segments.ends_with(&other.segments)
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(String::as_str)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join(SEPARATOR))
    }
}

impl From<&str> for Path {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<String> for Path {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<Path> for String {
    fn from(path: Path) -> Self {
        path.to_string()
    }
}
