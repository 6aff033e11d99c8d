use crate::error::{Error, Result};
use crate::models::{Resolution, SlugSource};
use crate::slug::{contains_chinese, naive_slug, sanitize_translation};
use crate::translate::Translator;
use futures::stream::{self, StreamExt};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Limits applied to translation calls during one run
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Upper bound for a single translation request
    pub timeout: Duration,
    /// Translation requests in flight at once (at least 1)
    pub concurrency: usize,
    /// Whole-run deadline; once passed, remaining tags take the fallback
    pub deadline: Option<Instant>,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(crate::constants::DEFAULT_TIMEOUT_SECS),
            concurrency: crate::constants::DEFAULT_CONCURRENCY,
            deadline: None,
        }
    }
}

/// Produce a slug for `tag`, translating it first when it contains Chinese.
///
/// Never fails: every translation problem is logged and degrades to
/// [`naive_slug`].
pub async fn resolve_slug(
    tag: &str,
    translator: &dyn Translator,
    options: &ResolveOptions,
) -> Resolution {
    if !contains_chinese(tag) {
        return Resolution {
            tag: tag.to_string(),
            slug: naive_slug(tag),
            source: SlugSource::Plain,
        };
    }

    match translate_within_limits(tag, translator, options).await {
        Ok(text) => {
            let slug = sanitize_translation(&text);
            if slug.chars().any(|c| c.is_ascii_alphanumeric()) {
                debug!("Translated \"{}\" to \"{}\"", tag, slug);
                return Resolution {
                    tag: tag.to_string(),
                    slug,
                    source: SlugSource::Translated,
                };
            }
            warn!(
                "Translation of \"{}\" produced no usable slug: \"{}\"",
                tag, text
            );
        }
        Err(Error::Translation(details)) => {
            warn!("Translation failed for \"{}\": {}", tag, details);
        }
        Err(e) => {
            warn!("Translation request failed for \"{}\": {}", tag, e);
        }
    }

    Resolution {
        tag: tag.to_string(),
        slug: naive_slug(tag),
        source: SlugSource::Fallback,
    }
}

/// Resolve every tag, keeping the output in input order.
pub async fn resolve_all(
    tags: &[String],
    translator: &dyn Translator,
    options: &ResolveOptions,
) -> Vec<Resolution> {
    stream::iter(tags)
        .map(|tag| resolve_slug(tag, translator, options))
        .buffered(options.concurrency.max(1))
        .collect()
        .await
}

async fn translate_within_limits(
    tag: &str,
    translator: &dyn Translator,
    options: &ResolveOptions,
) -> Result<String> {
    let mut budget = options.timeout;
    if let Some(deadline) = options.deadline {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(Error::Timeout(Duration::ZERO));
        }
        budget = budget.min(remaining);
    }

    tokio::time::timeout(budget, translator.translate(tag))
        .await
        .map_err(|_| Error::Timeout(budget))?
}
