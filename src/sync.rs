use crate::collector::collect_tags;
use crate::error::Result;
use crate::models::{Post, Resolution};
use crate::resolver::{resolve_all, ResolveOptions};
use crate::site::SiteContext;
use crate::store::TagMapTarget;
use crate::translate::Translator;
use std::path::PathBuf;
use tracing::{debug, info};

/// Outcome of one sync run
#[derive(Debug, Default)]
pub struct SyncReport {
    /// Tags that were missing from the map, with their new slugs
    pub added: Vec<Resolution>,
    /// File that was rewritten, if any
    pub written: Option<PathBuf>,
}

/// Bring the persisted tag map up to date with the tags used in `posts`.
///
/// Existing entries are never touched. When nothing is missing, no request
/// is made and the file is left alone. The live configuration in `site` is
/// only updated after the write succeeded.
pub async fn sync_tags(
    site: &mut SiteContext,
    posts: &[Post],
    target: &TagMapTarget,
    translator: &dyn Translator,
    options: &ResolveOptions,
) -> Result<SyncReport> {
    let tags = collect_tags(posts);
    let tag_count = tags.len();
    let loaded = target.load()?;

    let new_tags: Vec<String> = tags
        .into_iter()
        .filter(|tag| !loaded.existing.contains_key(tag))
        .collect();

    debug!(
        "{} tags in use, {} mapped in {}",
        tag_count,
        loaded.existing.len(),
        target.path().display()
    );

    if new_tags.is_empty() {
        debug!("No new tags for {}", target.path().display());
        return Ok(SyncReport::default());
    }

    let added = resolve_all(&new_tags, translator, options).await;
    let content = target.render(&loaded, &added)?;
    target.write(&content)?;

    info!(
        "Added {} new tags to {}: {}",
        added.len(),
        target.path().display(),
        new_tags.join(", ")
    );

    site.apply_resolved(&added);

    Ok(SyncReport {
        added,
        written: Some(target.path().to_path_buf()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::models::{SlugSource, Tag};
    use crate::site::SiteConfig;
    use crate::translate::testing::FakeTranslator;
    use std::fs;

    fn post(tags: &[&str]) -> Post {
        Post {
            path: PathBuf::from("post.md"),
            title: None,
            tags: tags.iter().map(|t| Tag::new(*t)).collect(),
        }
    }

    fn dedicated(dir: &tempfile::TempDir) -> TagMapTarget {
        TagMapTarget::Dedicated {
            path: dir.path().join("_config.tag_map.yml"),
        }
    }

    #[tokio::test]
    async fn test_new_tags_are_resolved_and_written() {
        let dir = tempfile::tempdir().unwrap();
        let target = dedicated(&dir);
        let mut site = SiteContext::new(dir.path(), SiteConfig::default());
        let translator = FakeTranslator::new().with("数据库", "database");

        let report = sync_tags(
            &mut site,
            &[post(&["Rust", "数据库"])],
            &target,
            &translator,
            &ResolveOptions::default(),
        )
        .await
        .unwrap();

        assert_eq!(report.added.len(), 2);
        assert_eq!(report.written.as_deref(), Some(target.path()));

        let persisted = target.load().unwrap().existing;
        assert_eq!(persisted.get("Rust"), Some("rust"));
        assert_eq!(persisted.get("数据库"), Some("database"));
        assert_eq!(site.config.tag_map, persisted);
    }

    #[tokio::test]
    async fn test_known_tags_are_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        let target = dedicated(&dir);
        let original = "tag_map:\n  Rust: rust\n";
        fs::write(target.path(), original).unwrap();
        let mut site = SiteContext::new(dir.path(), SiteConfig::default());
        let translator = FakeTranslator::new();

        let report = sync_tags(
            &mut site,
            &[post(&["Rust"])],
            &target,
            &translator,
            &ResolveOptions::default(),
        )
        .await
        .unwrap();

        assert!(report.added.is_empty());
        assert!(report.written.is_none());
        assert!(translator.calls().is_empty());
        assert_eq!(fs::read_to_string(target.path()).unwrap(), original);
    }

    #[tokio::test]
    async fn test_second_run_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let target = dedicated(&dir);
        let mut site = SiteContext::new(dir.path(), SiteConfig::default());
        let posts = [post(&["数据库", "Rust"]), post(&["网络"])];
        let translator = FakeTranslator::new()
            .with("数据库", "database")
            .with("网络", "network");

        sync_tags(&mut site, &posts, &target, &translator, &ResolveOptions::default())
            .await
            .unwrap();
        let after_first = fs::read_to_string(target.path()).unwrap();
        let calls_after_first = translator.calls().len();

        let report = sync_tags(&mut site, &posts, &target, &translator, &ResolveOptions::default())
            .await
            .unwrap();

        assert!(report.written.is_none());
        assert_eq!(translator.calls().len(), calls_after_first);
        assert_eq!(fs::read_to_string(target.path()).unwrap(), after_first);
    }

    #[tokio::test]
    async fn test_existing_slug_is_never_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let target = dedicated(&dir);
        fs::write(target.path(), "tag_map:\n  数据库: db\n").unwrap();
        let mut site = SiteContext::new(dir.path(), SiteConfig::default());
        let translator = FakeTranslator::new().with("数据库", "database");

        sync_tags(
            &mut site,
            &[post(&["数据库", "Go"])],
            &target,
            &translator,
            &ResolveOptions::default(),
        )
        .await
        .unwrap();

        let persisted = target.load().unwrap().existing;
        assert_eq!(persisted.get("数据库"), Some("db"));
        assert_eq!(persisted.get("Go"), Some("go"));
        assert!(translator.calls().is_empty());
    }

    #[tokio::test]
    async fn test_translation_failure_uses_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let target = dedicated(&dir);
        let mut site = SiteContext::new(dir.path(), SiteConfig::default());
        let translator = FakeTranslator::new().failing("数据库");

        let report = sync_tags(
            &mut site,
            &[post(&["数据库"])],
            &target,
            &translator,
            &ResolveOptions::default(),
        )
        .await
        .unwrap();

        assert_eq!(report.added[0].slug, "数据库");
        assert_eq!(report.added[0].source, SlugSource::Fallback);
        assert_eq!(translator.calls(), vec!["数据库".to_string()]);
    }

    #[tokio::test]
    async fn test_parse_failure_leaves_everything_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let target = dedicated(&dir);
        let broken = "tag_map:\n  Rust: [rust\n";
        fs::write(target.path(), broken).unwrap();
        let mut site = SiteContext::new(dir.path(), SiteConfig::default());
        let translator = FakeTranslator::new();

        let result = sync_tags(
            &mut site,
            &[post(&["Go"])],
            &target,
            &translator,
            &ResolveOptions::default(),
        )
        .await;

        assert!(matches!(result, Err(Error::Parse { .. })));
        assert!(site.config.tag_map.is_empty());
        assert!(translator.calls().is_empty());
        assert_eq!(fs::read_to_string(target.path()).unwrap(), broken);
    }

    #[tokio::test]
    async fn test_shared_file_outside_block_is_preserved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("_config.yml");
        let before_block = "# Site\r\ntitle: 博客\r\n\r\n# Category & Tag\r\ndefault_category: uncategorized\r\n";
        let after_block = "\r\n# Date / Time format\r\ndate_format: YYYY-MM-DD\r\n";
        fs::write(
            &path,
            format!("{before_block}tag_map:\r\n  Rust: rust\r\n{after_block}"),
        )
        .unwrap();
        let target = TagMapTarget::Shared {
            path: path.clone(),
            section_marker: "Category & Tag".into(),
        };
        let mut site = SiteContext::new(dir.path(), SiteConfig::default());
        let translator = FakeTranslator::new().with("数据库", "database");

        sync_tags(
            &mut site,
            &[post(&["Rust", "数据库"])],
            &target,
            &translator,
            &ResolveOptions::default(),
        )
        .await
        .unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            format!("{before_block}tag_map:\r\n  Rust: rust\r\n  数据库: database\r\n{after_block}")
        );
        assert_eq!(site.config.tag_map.get("数据库"), Some("database"));
    }

    #[tokio::test]
    async fn test_unsupported_entry_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let target = dedicated(&dir);
        let original = "tag_map:\n  Bar: [x, y]\n";
        fs::write(target.path(), original).unwrap();
        let mut site = SiteContext::new(dir.path(), SiteConfig::default());
        let translator = FakeTranslator::new();

        let result = sync_tags(
            &mut site,
            &[post(&["Go"])],
            &target,
            &translator,
            &ResolveOptions::default(),
        )
        .await;

        assert!(matches!(result, Err(Error::UnsupportedEntry { .. })));
        assert_eq!(fs::read_to_string(target.path()).unwrap(), original);
        assert!(site.config.tag_map.is_empty());
    }
}
