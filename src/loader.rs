use crate::constants::POST_EXTENSIONS;
use crate::error::{Error, Result};
use crate::models::{scalar_to_string, Post, Tag};
use crate::site::SiteContext;
use regex::Regex;
use serde::Deserialize;
use serde_yaml::Value;
use std::fs;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

#[derive(Debug, Default, Deserialize)]
struct FrontMatter {
    #[serde(default)]
    title: Option<Value>,
    #[serde(default)]
    tags: Option<Value>,
}

/// Load every post under `<source_dir>/_posts`.
///
/// A missing posts directory or unreadable front matter is an error; the
/// tag set must never come out empty just because the content is broken.
pub fn load_posts(site: &SiteContext) -> Result<Vec<Post>> {
    let posts_dir = site.posts_dir();
    if !posts_dir.is_dir() {
        return Err(Error::MissingPosts(posts_dir));
    }

    let front_matter_re = Regex::new(r"(?s)\A---[ \t]*\r?\n(.*?)\r?\n---[ \t]*(?:\r?\n|\z)")?;
    let mut posts = Vec::new();

    for entry in WalkDir::new(&posts_dir).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type().is_file() || !is_post(path) {
            continue;
        }

        let content = fs::read_to_string(path)?;
        let front_matter = match front_matter_re.captures(&content) {
            Some(caps) => parse_front_matter(&caps[1], path)?,
            None => FrontMatter::default(),
        };

        let post = Post {
            path: path.to_path_buf(),
            title: front_matter.title.as_ref().and_then(scalar_to_string),
            tags: tags_from_value(front_matter.tags.as_ref()),
        };
        if post.tags.is_empty() {
            debug!(
                "No tags on \"{}\" ({})",
                post.title.as_deref().unwrap_or("untitled"),
                path.display()
            );
        }
        posts.push(post);
    }

    debug!("Loaded {} posts from {}", posts.len(), posts_dir.display());
    Ok(posts)
}

fn is_post(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| POST_EXTENSIONS.contains(&ext))
}

fn parse_front_matter(raw: &str, path: &Path) -> Result<FrontMatter> {
    let to_error = |source| Error::FrontMatter {
        path: path.to_path_buf(),
        source,
    };

    let value: Value = serde_yaml::from_str(raw).map_err(to_error)?;
    if value.is_null() {
        return Ok(FrontMatter::default());
    }
    serde_yaml::from_value(value).map_err(to_error)
}

/// `tags` may be a list, a single scalar, or missing
fn tags_from_value(value: Option<&Value>) -> Vec<Tag> {
    match value {
        Some(Value::Sequence(items)) => items
            .iter()
            .filter_map(scalar_to_string)
            .map(Tag::new)
            .collect(),
        Some(other) => scalar_to_string(other).map(Tag::new).into_iter().collect(),
        None => Vec::new(),
    }
}
