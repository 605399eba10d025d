//! Paths into nested values.
//!
//! A [`Selector`] addresses one step into a container: a sequence index or a
//! mapping key. A [`Path`] is an ordered list of selectors read root-to-leaf.
//! Paths render as `$`, `$.user.tags[0]`, and serialize as plain JSON arrays
//! (`["user", "tags", 0]`) so error reports stay machine-readable.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One step into a container: a sequence index or a mapping key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Selector {
    /// Index into a sequence.
    Index(usize),
    /// Key into a mapping or attribute set.
    Key(String),
}

impl Selector {
    /// Returns the index if this selector addresses a sequence.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Selector::Index(index) => Some(*index),
            Selector::Key(_) => None,
        }
    }

    /// Returns the key if this selector addresses a mapping.
    pub fn as_key(&self) -> Option<&str> {
        match self {
            Selector::Index(_) => None,
            Selector::Key(key) => Some(key.as_str()),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Index(index) => write!(f, "{}", index),
            Selector::Key(key) => write!(f, "{}", key),
        }
    }
}

impl From<usize> for Selector {
    fn from(index: usize) -> Self {
        Selector::Index(index)
    }
}

impl From<&str> for Selector {
    fn from(key: &str) -> Self {
        Selector::Key(key.to_string())
    }
}

impl From<String> for Selector {
    fn from(key: String) -> Self {
        Selector::Key(key)
    }
}

/// An ordered list of selectors from the root of a value to one position
/// inside it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<Selector>);

impl Path {
    /// The empty path addressing the root value itself.
    pub fn root() -> Self {
        Path(Vec::new())
    }

    /// True if this path addresses the root value.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of selectors in the path.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if the path has no selectors. Same as [`Path::is_root`].
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The selectors, root-to-leaf.
    pub fn segments(&self) -> &[Selector] {
        &self.0
    }

    /// Returns a new path one selector deeper.
    pub fn child(&self, selector: impl Into<Selector>) -> Path {
        let mut segments = self.0.clone();
        segments.push(selector.into());
        Path(segments)
    }

    /// Pushes a selector onto the front. Used when an error propagates out of
    /// a container and the container stamps its own position on it.
    pub(crate) fn prepend(&mut self, selector: Selector) {
        self.0.insert(0, selector);
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$")?;
        for segment in &self.0 {
            match segment {
                Selector::Index(index) => write!(f, "[{}]", index)?,
                Selector::Key(key) => write!(f, ".{}", key)?,
            }
        }
        Ok(())
    }
}

impl From<Vec<Selector>> for Path {
    fn from(segments: Vec<Selector>) -> Self {
        Path(segments)
    }
}

impl FromIterator<Selector> for Path {
    fn from_iter<I: IntoIterator<Item = Selector>>(iter: I) -> Self {
        Path(iter.into_iter().collect())
    }
}
