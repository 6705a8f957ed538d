//! Key paths into a section tree.

use std::fmt;

/// The separator used when a path string doesn't specify one.
pub const DEFAULT_SEPARATOR: &str = ".";

/// An ordered sequence of keys addressing a node in a [`Section`](super::Section).
///
/// Parsing drops empty segments, so `"a..b"`, `".a.b."` and `"a.b"` all
/// produce the same path. The empty path addresses the section itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeyPath {
    segments: Vec<String>,
}

impl KeyPath {
    /// The empty path.
    pub fn root() -> Self {
        Self::default()
    }

    /// Splits `path` on `separator`, dropping empty segments.
    ///
    /// An empty separator treats the whole string as one key.
    pub fn parse(path: &str, separator: &str) -> Self {
        let segments = if separator.is_empty() {
            if path.is_empty() {
                Vec::new()
            } else {
                vec![path.to_string()]
            }
        } else {
            path.split(separator)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        };
        Self { segments }
    }

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

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns a new path with `key` appended.
    pub fn child(&self, key: &str) -> Self {
        let mut next = self.clone();
        if !key.is_empty() {
            next.segments.push(key.to_string());
        }
        next
    }

    /// Returns a new path with all of `other`'s segments appended.
    pub fn join(&self, other: &KeyPath) -> Self {
        let mut next = self.clone();
        next.segments.extend(other.segments.iter().cloned());
        next
    }

    /// Splits off the last segment, if any.
    pub fn split_last(&self) -> Option<(&[String], &str)> {
        self.segments
            .split_last()
            .map(|(last, parents)| (parents, last.as_str()))
    }

    /// Joins the segments back into a string with `separator`.
    pub fn to_string_with(&self, separator: &str) -> String {
        self.segments.join(separator)
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_with(DEFAULT_SEPARATOR))
    }
}

/// Anything that can be turned into a [`KeyPath`] given a section's separator.
pub trait ToKeyPath {
    fn to_key_path(&self, separator: &str) -> KeyPath;
}

impl ToKeyPath for str {
    fn to_key_path(&self, separator: &str) -> KeyPath {
        KeyPath::parse(self, separator)
    }
}

impl ToKeyPath for String {
    fn to_key_path(&self, separator: &str) -> KeyPath {
        KeyPath::parse(self, separator)
    }
}

impl ToKeyPath for KeyPath {
    fn to_key_path(&self, _separator: &str) -> KeyPath {
        self.clone()
    }
}

impl<T: ToKeyPath + ?Sized> ToKeyPath for &T {
    fn to_key_path(&self, separator: &str) -> KeyPath {
        (**self).to_key_path(separator)
    }
}
