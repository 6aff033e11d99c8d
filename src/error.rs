use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the tag sync pipeline.
///
/// Translation failures never show up here: they degrade to a local slug
/// inside the resolver.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("malformed front matter in {path}: {source}")]
    FrontMatter {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("posts directory not found: {0}")]
    MissingPosts(PathBuf),

    #[error("`{key}` in {path} is not a mapping")]
    NotAMapping { path: PathBuf, key: String },

    #[error("unsupported entry `{entry}` under `{key}` in {path}: keys and values must be plain scalars")]
    UnsupportedEntry {
        path: PathBuf,
        key: String,
        entry: String,
    },

    #[error("refusing to write {path}: {reason}")]
    Rewrite { path: PathBuf, reason: String },

    #[error("invalid settings file {path}: {source}")]
    Settings {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("translation rejected: {0}")]
    Translation(String),

    #[error("translation timed out after {0:?}")]
    Timeout(std::time::Duration),
}

pub type Result<T> = std::result::Result<T, Error>;
