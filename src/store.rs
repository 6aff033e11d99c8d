use crate::constants::{TAG_MAP_HEADER, TAG_MAP_KEY};
use crate::document::{render_block, Document, LineEnding};
use crate::error::{Error, Result};
use crate::models::{Resolution, TagMap};
use serde_yaml::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Where the persisted tag map lives and how it is rewritten
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagMapTarget {
    /// A file holding nothing but the mapping; regenerated in full
    Dedicated { path: PathBuf },
    /// A `tag_map` block inside a larger document; only that block changes
    Shared {
        path: PathBuf,
        section_marker: String,
    },
}

/// A tag map document as read from disk
#[derive(Debug, Clone)]
pub struct LoadedTagMap {
    /// LF-normalized document text
    pub text: String,
    pub line_ending: LineEnding,
    pub existing: TagMap,
}

impl TagMapTarget {
    pub fn path(&self) -> &Path {
        match self {
            TagMapTarget::Dedicated { path } | TagMapTarget::Shared { path, .. } => path,
        }
    }

    /// Read and parse the document. A missing dedicated file reads as the
    /// default header with an empty mapping.
    pub fn load(&self) -> Result<LoadedTagMap> {
        let path = self.path();
        let raw = if path.exists() {
            fs::read_to_string(path)?
        } else {
            match self {
                TagMapTarget::Dedicated { .. } => render_dedicated(&TagMap::new()),
                TagMapTarget::Shared { .. } => String::new(),
            }
        };

        let line_ending = LineEnding::detect(&raw);
        let text = LineEnding::normalize(&raw);

        let doc: Value = serde_yaml::from_str(&text).map_err(|source| Error::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let existing = TagMap::from_yaml(doc.get(TAG_MAP_KEY), path, TAG_MAP_KEY)?;

        Ok(LoadedTagMap {
            text,
            line_ending,
            existing,
        })
    }

    /// New document content with `added` merged in, in the document's
    /// original line-ending convention.
    ///
    /// The result is parsed again before it is returned; if it would not
    /// read back as exactly the merged map, nothing is produced.
    pub fn render(&self, loaded: &LoadedTagMap, added: &[Resolution]) -> Result<String> {
        let mut merged = loaded.existing.clone();
        for r in added {
            merged.insert(r.tag.as_str(), r.slug.as_str());
        }

        let content = match self {
            TagMapTarget::Dedicated { .. } => render_dedicated(&merged),
            TagMapTarget::Shared { section_marker, .. } => {
                let doc = Document::parse(&loaded.text);
                let placement = doc.placement(TAG_MAP_KEY, section_marker);
                doc.splice(&placement, &render_block(TAG_MAP_KEY, merged.iter()))
            }
        };

        self.verify(&content, &merged)?;
        Ok(loaded.line_ending.apply(&content))
    }

    fn verify(&self, content: &str, expected: &TagMap) -> Result<()> {
        let path = self.path();
        let rejected = |reason: String| Error::Rewrite {
            path: path.to_path_buf(),
            reason,
        };

        let doc: Value = serde_yaml::from_str(content)
            .map_err(|e| rejected(format!("result is not valid YAML: {}", e)))?;
        let written = TagMap::from_yaml(doc.get(TAG_MAP_KEY), path, TAG_MAP_KEY)
            .map_err(|e| rejected(e.to_string()))?;
        if written != *expected {
            return Err(rejected(format!(
                "`{}` would read back with {} entries instead of {}",
                TAG_MAP_KEY,
                written.len(),
                expected.len()
            )));
        }
        Ok(())
    }

    /// Overwrite the whole file
    pub fn write(&self, content: &str) -> Result<()> {
        fs::write(self.path(), content)?;
        Ok(())
    }
}

/// Fixed header, a blank line, then the mapping block
fn render_dedicated(map: &TagMap) -> String {
    let mut content = String::new();
    for line in TAG_MAP_HEADER {
        content.push_str(line);
        content.push('\n');
    }
    content.push('\n');
    content.push_str(&render_block(TAG_MAP_KEY, map.iter()));
    content
}
