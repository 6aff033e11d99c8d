//! Local slug transforms used by the resolver.

/// Check whether `text` contains a CJK Unified Ideograph (U+4E00..=U+9FFF)
pub fn contains_chinese(text: &str) -> bool {
    text.chars().any(|c| ('\u{4E00}'..='\u{9FFF}').contains(&c))
}

/// Lowercase and collapse each whitespace run into a single hyphen.
///
/// Non-ASCII characters are kept as-is, so a Chinese tag that reaches this
/// path comes out untransliterated.
pub fn naive_slug(tag: &str) -> String {
    hyphenate(&tag.to_lowercase())
}

/// Turn translated text into a slug restricted to `[a-z0-9-]`
pub fn sanitize_translation(text: &str) -> String {
    hyphenate(&text.to_lowercase())
        .chars()
        .filter(|c| matches!(c, 'a'..='z' | '0'..='9' | '-'))
        .collect()
}

fn hyphenate(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut in_space = false;

    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                result.push('-');
                in_space = true;
            }
        } else {
            result.push(c);
            in_space = false;
        }
    }

    result
}
