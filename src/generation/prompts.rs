//! Prompt construction for article drafting and header image generation.
//!
//! Randomized parts (topic, category, visual motif, color scheme) go
//! through the `Picker` trait so batch endpoints vary their output while
//! tests substitute a deterministic selector.

use rand::Rng;
use uuid::Uuid;

/// Uniform selection from an enumeration of options.
pub trait Picker: Send + Sync {
    fn pick_index(&self, len: usize) -> usize;
}

/// Production picker backed by the thread-local RNG.
pub struct UniformPicker;

impl Picker for UniformPicker {
    fn pick_index(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

pub fn pick<'a, T>(picker: &dyn Picker, options: &'a [T]) -> &'a T {
    &options[picker.pick_index(options.len()) % options.len()]
}

pub const TOPICS: &[&str] = &[
    "how small businesses can win local search",
    "building a content calendar that actually ships",
    "measuring SEO results without vanity metrics",
    "turning service pages into lead magnets",
    "common technical SEO mistakes and how to fix them",
    "what a realistic PPC budget looks like",
    "writing meta descriptions people click",
    "repurposing one article into a month of social posts",
];

pub const CATEGORIES: &[&str] = &["SEO", "Content Marketing", "PPC", "Web Design", "Strategy"];

pub const VISUAL_MOTIFS: &[&str] = &[
    "abstract geometric shapes",
    "flowing gradient waves",
    "minimalist line art of a city skyline",
    "overlapping translucent circles",
    "a stylized upward graph",
    "scattered paper planes",
];

pub const COLOR_SCHEMES: &[&str] = &[
    "deep navy and electric teal",
    "warm coral and cream",
    "forest green and gold",
    "violet and soft pink",
    "charcoal and amber",
];

pub const ARTICLE_SYSTEM_PROMPT: &str = "You are a senior content writer for a digital \
marketing agency. You write practical, concrete articles for small business owners. \
Respond with a single JSON object and nothing else.";

/// User message demanding the strict JSON article shape.
pub fn article_prompt(topic: &str, category: &str) -> String {
    format!(
        r#"Write a blog article about "{topic}" for the category "{category}".

Respond with exactly this JSON shape:
{{
  "title": "...",
  "metaDescription": "150-160 characters",
  "excerpt": "1-2 sentence teaser",
  "category": "{category}",
  "tags": ["3 to 5 short tags"],
  "content": "the full article as HTML using <h2>, <p>, <ul>, <li>"
}}

The article should be 700-1000 words, actionable, and free of filler."#
    )
}

/// Image prompt with a randomized motif, color scheme and a uniqueness
/// token so a batch does not converge on near-identical images.
pub fn image_prompt(picker: &dyn Picker, title: &str) -> String {
    let motif = pick(picker, VISUAL_MOTIFS);
    let colors = pick(picker, COLOR_SCHEMES);
    let token = Uuid::new_v4();
    format!(
        "A wide blog header illustration for an article titled \"{title}\". \
         Style: {motif}, color palette of {colors}, modern and clean, no text, \
         no watermarks. Variation token: {token}"
    )
}

#[cfg(test)]
pub mod test_support {
    use super::Picker;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Deterministic picker cycling through indices in order.
    #[derive(Default)]
    pub struct RoundRobinPicker {
        next: AtomicUsize,
    }

    impl Picker for RoundRobinPicker {
        fn pick_index(&self, len: usize) -> usize {
            self.next.fetch_add(1, Ordering::Relaxed) % len
        }
    }
}
