// ============================================================================
// Site Layout
// ============================================================================

/// Main site configuration file, relative to the base directory
pub const SITE_CONFIG_FILE: &str = "_config.yml";

/// Dedicated tag map file, relative to the base directory
pub const TAG_MAP_FILE: &str = "_config.tag_map.yml";

/// Optional settings file for this tool, relative to the base directory
pub const SETTINGS_FILE: &str = "tag_sync.toml";

/// Default source directory when `_config.yml` does not set `source_dir`
pub const DEFAULT_SOURCE_DIR: &str = "source";

/// Posts live under `<source_dir>/_posts`
pub const POSTS_DIR: &str = "_posts";

/// File extensions treated as posts
pub const POST_EXTENSIONS: &[&str] = &["md", "markdown"];

// ============================================================================
// Tag Map Document
// ============================================================================

/// Top-level key holding the mapping
pub const TAG_MAP_KEY: &str = "tag_map";

/// Header written at the top of the dedicated tag map file
pub const TAG_MAP_HEADER: &[&str] = &[
    "# Tag Map Configuration",
    "# 将中文标签映射到 URL 友好的英文 slug",
    "# 此文件由 sync_tags 脚本自动维护",
];

/// Section of `_config.yml` the mapping belongs to when it has to be inserted
pub const DEFAULT_SECTION_MARKER: &str = "Category & Tag";

// ============================================================================
// Translation
// ============================================================================

/// Public translation endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.mymemory.translated.net/get";

/// Chinese (simplified) to English
pub const DEFAULT_LANGPAIR: &str = "zh-CN|en";

/// Per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Concurrent translation requests; 1 keeps requests strictly sequential
pub const DEFAULT_CONCURRENCY: usize = 1;

/// Status the endpoint reports for a successful translation
pub const SUCCESS_STATUS: u64 = 200;
