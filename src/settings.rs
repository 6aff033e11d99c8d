use crate::constants::{
    DEFAULT_CONCURRENCY, DEFAULT_ENDPOINT, DEFAULT_LANGPAIR, DEFAULT_SECTION_MARKER,
    DEFAULT_TIMEOUT_SECS, SETTINGS_FILE, SITE_CONFIG_FILE, TAG_MAP_FILE,
};
use crate::error::{Error, Result};
use crate::resolver::ResolveOptions;
use crate::store::TagMapTarget;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tokio::time::Instant;

/// Which file holds the tag map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    /// `_config.tag_map.yml`, rewritten as a whole
    Dedicated,
    /// The `tag_map` block inside `_config.yml`, patched in place
    Shared,
}

/// Tool settings: defaults, then `tag_sync.toml`, then command-line flags.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    pub target: TargetKind,
    pub tag_map_file: String,
    pub section_marker: String,
    pub endpoint: String,
    pub langpair: String,
    pub timeout_secs: u64,
    pub concurrency: usize,
    pub deadline_secs: Option<u64>,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            target: TargetKind::Dedicated,
            tag_map_file: TAG_MAP_FILE.to_string(),
            section_marker: DEFAULT_SECTION_MARKER.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            langpair: DEFAULT_LANGPAIR.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            concurrency: DEFAULT_CONCURRENCY,
            deadline_secs: None,
        }
    }
}

impl SyncSettings {
    /// Read `tag_sync.toml` from `base_dir` if present
    pub fn load(base_dir: &Path) -> Result<Self> {
        let path = base_dir.join(SETTINGS_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path)?;
        toml::from_str(&content).map_err(|source| Error::Settings { path, source })
    }

    pub fn target(&self, base_dir: &Path) -> TagMapTarget {
        match self.target {
            TargetKind::Dedicated => TagMapTarget::Dedicated {
                path: base_dir.join(&self.tag_map_file),
            },
            TargetKind::Shared => TagMapTarget::Shared {
                path: base_dir.join(SITE_CONFIG_FILE),
                section_marker: self.section_marker.clone(),
            },
        }
    }

    /// Limits for one run; the deadline clock starts now.
    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions {
            timeout: Duration::from_secs(self.timeout_secs),
            concurrency: self.concurrency.max(1),
            deadline: self
                .deadline_secs
                .map(|secs| Instant::now() + Duration::from_secs(secs)),
        }
    }
}
