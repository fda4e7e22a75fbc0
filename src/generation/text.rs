//! Slug and read-time derivation for generated articles.

use chrono::{DateTime, Utc};

const WORDS_PER_MINUTE: usize = 200;

/// Derive a unique URL slug from the title, the generation date and the
/// article's index within its batch.
pub fn derive_slug(title: &str, generated_at: DateTime<Utc>, index: usize) -> String {
    let base = slugify(title);
    format!("{}-{}-{}", base, generated_at.format("%Y-%m-%d"), index + 1)
}

/// Lowercase, ASCII-alphanumeric slug with single-dash separators.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut last_dash = true;
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Estimated read time in minutes at 200 words per minute, never below 1.
pub fn read_time_minutes(content: &str) -> i32 {
    let words = strip_tags(content).split_whitespace().count();
    (words.div_ceil(WORDS_PER_MINUTE)).max(1) as i32
}

fn strip_tags(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => {
                in_tag = false;
                text.push(' ');
            }
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }
    text
}
