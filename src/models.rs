use crate::error::{Error, Result};
use serde_yaml::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

// ============================================================================
// Content Model
// ============================================================================

/// A tag attached to a post. Identity is the exact `name` string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A post as seen by the sync pipeline: only its location and tags matter.
#[derive(Debug, Clone)]
pub struct Post {
    pub path: PathBuf,
    pub title: Option<String>,
    pub tags: Vec<Tag>,
}

// ============================================================================
// Tag Map
// ============================================================================

/// Insertion-ordered `tag -> slug` mapping.
///
/// Entries are never replaced once present; [`TagMap::insert`] only appends.
/// A tag written as a bare `tag:` line keeps an empty (`None`) slug so it is
/// rewritten the same way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagMap {
    entries: Vec<(String, Option<String>)>,
    index: HashMap<String, usize>,
}

impl TagMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, tag: &str) -> bool {
        self.index.contains_key(tag)
    }

    /// Slug for `tag`; `None` when unmapped or mapped to nothing.
    pub fn get(&self, tag: &str) -> Option<&str> {
        self.index
            .get(tag)
            .and_then(|&i| self.entries[i].1.as_deref())
    }

    /// Append `tag -> slug` unless `tag` is already mapped. Returns whether
    /// the entry was added.
    pub fn insert(&mut self, tag: impl Into<String>, slug: impl Into<String>) -> bool {
        self.insert_entry(tag.into(), Some(slug.into()))
    }

    /// Append every entry of `other` whose tag is not mapped here yet.
    pub fn extend_missing(&mut self, other: &TagMap) {
        for (tag, slug) in &other.entries {
            self.insert_entry(tag.clone(), slug.clone());
        }
    }

    fn insert_entry(&mut self, tag: String, slug: Option<String>) -> bool {
        if self.index.contains_key(&tag) {
            return false;
        }
        self.index.insert(tag.clone(), self.entries.len());
        self.entries.push((tag, slug));
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    /// Build a map from the value found under `key` in the YAML document at
    /// `path`. `null` (an empty `tag_map:` line) is an empty map.
    ///
    /// Keys and values must be scalars (a value may be empty); anything else
    /// could not be written back unchanged, so it is rejected.
    pub fn from_yaml(value: Option<&Value>, path: &Path, key: &str) -> Result<Self> {
        let mut map = Self::new();
        let mapping = match value {
            None | Some(Value::Null) => return Ok(map),
            Some(Value::Mapping(m)) => m,
            Some(_) => {
                return Err(Error::NotAMapping {
                    path: path.to_path_buf(),
                    key: key.to_string(),
                })
            }
        };

        for (k, v) in mapping {
            let unsupported = || Error::UnsupportedEntry {
                path: path.to_path_buf(),
                key: key.to_string(),
                entry: describe(k),
            };
            let tag = scalar_to_string(k).ok_or_else(unsupported)?;
            let slug = match v {
                Value::Null => None,
                other => Some(scalar_to_string(other).ok_or_else(unsupported)?),
            };
            map.insert_entry(tag, slug);
        }

        Ok(map)
    }
}

fn describe(value: &Value) -> String {
    serde_yaml::to_string(value)
        .map(|s| s.trim_end().replace('\n', " "))
        .unwrap_or_else(|_| format!("{:?}", value))
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TagMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// Stringify a YAML scalar the way a tag name or slug would be read back.
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => None,
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// How a slug was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlugSource {
    /// Translated remotely, then sanitized to `[a-z0-9-]`.
    Translated,
    /// Translation was attempted and failed; naive transform of the tag.
    Fallback,
    /// No translation needed; naive transform of the tag.
    Plain,
}

/// A `(tag, slug)` pair resolved during one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub tag: String,
    pub slug: String,
    pub source: SlugSource,
}
