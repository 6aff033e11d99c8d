use crate::constants::{DEFAULT_SOURCE_DIR, POSTS_DIR, SITE_CONFIG_FILE, TAG_MAP_KEY};
use crate::error::{Error, Result};
use crate::models::{scalar_to_string, Resolution, TagMap};
use serde_yaml::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// The parts of `_config.yml` the sync pipeline reads and updates
#[derive(Debug, Clone, Default)]
pub struct SiteConfig {
    pub source_dir: Option<String>,
    pub tag_map: TagMap,
}

impl SiteConfig {
    /// Load `_config.yml` from `base_dir`; a missing file yields defaults.
    pub fn load(base_dir: &Path) -> Result<Self> {
        let path = base_dir.join(SITE_CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let doc: Value = serde_yaml::from_str(&content).map_err(|source| Error::Parse {
            path: path.clone(),
            source,
        })?;

        Ok(Self {
            source_dir: doc.get("source_dir").and_then(scalar_to_string),
            tag_map: TagMap::from_yaml(doc.get(TAG_MAP_KEY), &path, TAG_MAP_KEY)?,
        })
    }
}

/// Explicit stand-in for the site generator's process-wide instance:
/// where the site lives and its live configuration.
#[derive(Debug, Clone)]
pub struct SiteContext {
    pub base_dir: PathBuf,
    pub config: SiteConfig,
}

impl SiteContext {
    pub fn new(base_dir: impl Into<PathBuf>, config: SiteConfig) -> Self {
        Self {
            base_dir: base_dir.into(),
            config,
        }
    }

    /// Load the site rooted at `base_dir`. When `overlay` names a tag map
    /// file that exists, its entries take precedence over `_config.yml`.
    pub fn load(base_dir: impl Into<PathBuf>, overlay: Option<&Path>) -> Result<Self> {
        let base_dir = base_dir.into();
        let mut config = SiteConfig::load(&base_dir)?;

        if let Some(path) = overlay.filter(|p| p.exists()) {
            let content = fs::read_to_string(path)?;
            let doc: Value = serde_yaml::from_str(&content).map_err(|source| Error::Parse {
                path: path.to_path_buf(),
                source,
            })?;
            let mut tag_map = TagMap::from_yaml(doc.get(TAG_MAP_KEY), path, TAG_MAP_KEY)?;
            tag_map.extend_missing(&config.tag_map);
            config.tag_map = tag_map;
        }

        Ok(Self::new(base_dir, config))
    }

    pub fn source_dir(&self) -> PathBuf {
        self.base_dir
            .join(self.config.source_dir.as_deref().unwrap_or(DEFAULT_SOURCE_DIR))
    }

    pub fn posts_dir(&self) -> PathBuf {
        self.source_dir().join(POSTS_DIR)
    }

    /// Mirror freshly written pairs into the live configuration so the rest
    /// of this build sees them without another disk read.
    pub fn apply_resolved(&mut self, resolved: &[Resolution]) {
        for r in resolved {
            self.config.tag_map.insert(r.tag.as_str(), r.slug.as_str());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::TAG_MAP_FILE;
    use crate::models::SlugSource;

    #[test]
    fn test_missing_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let site = SiteContext::load(dir.path(), None).unwrap();
        assert!(site.config.tag_map.is_empty());
        assert_eq!(site.posts_dir(), dir.path().join("source").join("_posts"));
    }

    #[test]
    fn test_load_reads_source_dir_and_tag_map() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(SITE_CONFIG_FILE),
            "title: Blog\nsource_dir: src\ntag_map:\n  Rust: rust\n",
        )
        .unwrap();
        let site = SiteContext::load(dir.path(), None).unwrap();
        assert_eq!(site.posts_dir(), dir.path().join("src").join("_posts"));
        assert_eq!(site.config.tag_map.get("Rust"), Some("rust"));
    }

    #[test]
    fn test_overlay_wins_over_site_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(SITE_CONFIG_FILE),
            "tag_map:\n  Rust: rust-lang\n  Go: go\n",
        )
        .unwrap();
        let overlay = dir.path().join(TAG_MAP_FILE);
        fs::write(&overlay, "tag_map:\n  Rust: rust\n").unwrap();

        let site = SiteContext::load(dir.path(), Some(overlay.as_path())).unwrap();
        assert_eq!(site.config.tag_map.get("Rust"), Some("rust"));
        assert_eq!(site.config.tag_map.get("Go"), Some("go"));
    }

    #[test]
    fn test_malformed_config_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(SITE_CONFIG_FILE), "tag_map: [unclosed\n").unwrap();
        assert!(matches!(
            SiteContext::load(dir.path(), None),
            Err(Error::Parse { .. })
        ));
    }

    #[test]
    fn test_apply_resolved_keeps_existing() {
        let mut site = SiteContext::new("/site", SiteConfig::default());
        site.config.tag_map.insert("Rust", "rust");
        site.apply_resolved(&[
            Resolution {
                tag: "Rust".into(),
                slug: "changed".into(),
                source: SlugSource::Plain,
            },
            Resolution {
                tag: "数据库".into(),
                slug: "database".into(),
                source: SlugSource::Translated,
            },
        ]);
        assert_eq!(site.config.tag_map.get("Rust"), Some("rust"));
        assert_eq!(site.config.tag_map.get("数据库"), Some("database"));
    }
}
