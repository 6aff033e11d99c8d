use crate::models::Post;
use std::collections::HashSet;

/// Distinct tag names across `posts`, in first-seen order.
///
/// Uniqueness is by exact string; no trimming or case folding.
pub fn collect_tags(posts: &[Post]) -> Vec<String> {
    let mut seen = HashSet::new();
    posts
        .iter()
        .flat_map(|post| post.tags.iter())
        .filter(|tag| seen.insert(tag.name.as_str()))
        .map(|tag| tag.name.clone())
        .collect()
}
