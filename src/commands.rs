//! Entry points the outside world calls. Neither lets an error escape:
//! failures are logged and the run is abandoned.

use crate::error::Result;
use crate::loader::load_posts;
use crate::settings::{SyncSettings, TargetKind};
use crate::site::SiteContext;
use crate::sync::{sync_tags, SyncReport};
use crate::translate::Translator;
use std::path::{Path, PathBuf};
use tracing::error;

/// Explicit `sync-tags` command: reload the site and its posts from disk,
/// then sync.
pub async fn sync_tags_command(
    base_dir: impl Into<PathBuf>,
    settings: &SyncSettings,
    translator: &dyn Translator,
) -> Option<SyncReport> {
    let base_dir = base_dir.into();
    let mut site = match load_site(&base_dir, settings) {
        Ok(site) => site,
        Err(e) => {
            error!("Failed to load site at {}: {}", base_dir.display(), e);
            return None;
        }
    };
    before_generate(&mut site, settings, translator).await
}

/// Pre-build hook: sync against the already loaded `site`, updating its
/// live configuration.
pub async fn before_generate(
    site: &mut SiteContext,
    settings: &SyncSettings,
    translator: &dyn Translator,
) -> Option<SyncReport> {
    match run(site, settings, translator).await {
        Ok(report) => Some(report),
        Err(e) => {
            error!("Tag sync abandoned: {}", e);
            None
        }
    }
}

/// Load the site, overlaying the dedicated tag map file when that is the
/// configured target.
pub fn load_site(base_dir: &Path, settings: &SyncSettings) -> Result<SiteContext> {
    let overlay = match settings.target {
        TargetKind::Dedicated => Some(base_dir.join(&settings.tag_map_file)),
        TargetKind::Shared => None,
    };
    SiteContext::load(base_dir, overlay.as_deref())
}

async fn run(
    site: &mut SiteContext,
    settings: &SyncSettings,
    translator: &dyn Translator,
) -> Result<SyncReport> {
    let posts = load_posts(site)?;
    let target = settings.target(&site.base_dir);
    sync_tags(site, &posts, &target, translator, &settings.resolve_options()).await
}
