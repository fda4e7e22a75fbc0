//! Contextual link injection over article HTML.
//!
//! The injector rewrites the first unlinked occurrence of each catalog
//! keyword into an anchor, subject to per-catalog caps and a minimum
//! character distance between accepted placements. It transforms a copy of
//! the body at read time; stored content is never mutated. Zero matches is
//! a successful no-op.
//!
//! Priority rules, preserved exactly because they decide which link wins
//! when candidates overlap: rules are tried longest-keyword-first, the
//! internal catalogs are exhausted before the external one, each rule
//! contributes at most one anchor, and the first qualifying occurrence in
//! document order is always the one taken.

use std::collections::HashSet;

use crate::seo::catalog::{LinkCatalogs, LinkRule};
use crate::seo::scanner::{SegmentKind, find_ascii_ci, segment};

const ANCHOR_CLASS: &str = "text-primary underline underline-offset-2 hover:text-primary/80";

const EXTERNAL_GLYPH: &str = concat!(
    r#"<svg class="inline-block h-3 w-3 ml-0.5" viewBox="0 0 24 24" fill="none" "#,
    r#"stroke="currentColor" stroke-width="2" stroke-linecap="round" stroke-linejoin="round">"#,
    r#"<path d="M18 13v6a2 2 0 0 1-2 2H5a2 2 0 0 1-2-2V8a2 2 0 0 1 2-2h6"/>"#,
    r#"<path d="M15 3h6v6"/><path d="M10 14 21 3"/></svg>"#
);

#[derive(Debug, Clone)]
pub struct InjectionConfig {
    pub max_internal_links: usize,
    pub max_external_links: usize,
    /// Minimum character distance between any two accepted placements.
    pub min_distance_between_links: usize,
    /// Section tags (by element name) the injector must not touch, on top
    /// of the always-protected anchors and code spans.
    pub exclude_from_linking: Vec<String>,
}

impl Default for InjectionConfig {
    fn default() -> Self {
        Self {
            max_internal_links: 5,
            max_external_links: 3,
            min_distance_between_links: 300,
            exclude_from_linking: ["h1", "h2", "h3", "h4", "blockquote"]
                .iter()
                .map(|t| t.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectionResult {
    pub content: String,
    pub links_added: usize,
    pub internal_links_count: usize,
    pub external_links_count: usize,
}

/// Working state for one run. Each invocation owns its own state, so
/// concurrent runs over different articles need no coordination.
struct Run {
    content: String,
    linked_keywords: HashSet<String>,
    placements: Vec<usize>,
}

/// Annotate `body` with contextual links from `catalogs`.
///
/// `exclude_href` suppresses any rule whose destination equals it, so an
/// article is never linked to itself.
pub fn inject(
    body: &str,
    catalogs: &LinkCatalogs,
    config: &InjectionConfig,
    exclude_href: Option<&str>,
) -> InjectionResult {
    let mut internal: Vec<&LinkRule> = catalogs
        .service
        .iter()
        .chain(catalogs.cross_article.iter())
        .filter(|rule| exclude_href != Some(rule.destination.as_str()))
        .collect();
    let mut external: Vec<&LinkRule> = catalogs
        .authority
        .iter()
        .filter(|rule| exclude_href != Some(rule.destination.as_str()))
        .collect();

    // Stable sort keeps catalog order among rules of equal specificity.
    internal.sort_by(|a, b| b.longest_keyword().cmp(&a.longest_keyword()));
    external.sort_by(|a, b| b.longest_keyword().cmp(&a.longest_keyword()));

    let mut run = Run {
        content: body.to_string(),
        linked_keywords: HashSet::new(),
        placements: Vec::new(),
    };

    let internal_links_count = run_pass(&mut run, &internal, config.max_internal_links, config);
    let external_links_count = run_pass(&mut run, &external, config.max_external_links, config);

    InjectionResult {
        content: run.content,
        links_added: internal_links_count + external_links_count,
        internal_links_count,
        external_links_count,
    }
}

/// Try each rule once, in order, until the cap is reached. Returns the
/// number of links added by this pass.
fn run_pass(run: &mut Run, rules: &[&LinkRule], cap: usize, config: &InjectionConfig) -> usize {
    let mut added = 0;

    for rule in rules {
        if added >= cap {
            break;
        }

        // Longest keyword first within the rule as well, so a synonym set
        // like ["seo", "search engine optimization"] prefers the phrase.
        let mut keywords: Vec<&str> = rule.keywords.iter().map(String::as_str).collect();
        keywords.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));

        for keyword in keywords {
            if run.linked_keywords.contains(&keyword.to_lowercase()) {
                continue;
            }
            let Some(pos) = find_candidate(&run.content, keyword, &run.placements, config) else {
                continue;
            };

            let matched = run.content[pos..pos + keyword.len()].to_string();
            let anchor = render_anchor(rule, &matched);
            run.content.replace_range(pos..pos + keyword.len(), &anchor);

            run.placements.push(pos);
            // Retire every sibling keyword so the same concept is never
            // linked twice via a synonym.
            for sibling in &rule.keywords {
                run.linked_keywords.insert(sibling.to_lowercase());
            }
            added += 1;
            break;
        }
    }

    added
}

/// First occurrence of `keyword` in document order that sits in a text
/// run, on word boundaries, and far enough from every accepted placement.
fn find_candidate(
    content: &str,
    keyword: &str,
    placements: &[usize],
    config: &InjectionConfig,
) -> Option<usize> {
    let bytes = content.as_bytes();

    for seg in segment(content, &config.exclude_from_linking) {
        if seg.kind != SegmentKind::Text {
            continue;
        }
        let mut from = seg.start;
        while let Some(pos) = find_ascii_ci(bytes, keyword.as_bytes(), from) {
            if pos + keyword.len() > seg.end {
                break;
            }
            if on_word_boundary(content, pos, keyword.len())
                && far_enough(pos, placements, config.min_distance_between_links)
            {
                return Some(pos);
            }
            from = pos + 1;
        }
    }

    None
}

fn far_enough(pos: usize, placements: &[usize], min_distance: usize) -> bool {
    placements.iter().all(|&p| pos.abs_diff(p) >= min_distance)
}

fn on_word_boundary(content: &str, pos: usize, len: usize) -> bool {
    let before = content[..pos].chars().next_back();
    let after = content[pos + len..].chars().next();
    !before.is_some_and(|c| c.is_alphanumeric()) && !after.is_some_and(|c| c.is_alphanumeric())
}

/// Render the anchor, preserving the original casing of the matched text.
fn render_anchor(rule: &LinkRule, text: &str) -> String {
    if rule.external {
        format!(
            r#"<a href="{dest}" title="{title}" class="{class}" target="_blank" rel="noopener noreferrer">{text}{glyph}</a>"#,
            dest = rule.destination,
            title = rule.title,
            class = ANCHOR_CLASS,
            text = text,
            glyph = EXTERNAL_GLYPH,
        )
    } else {
        format!(
            r#"<a href="{dest}" title="{title}" class="{class}">{text}</a>"#,
            dest = rule.destination,
            title = rule.title,
            class = ANCHOR_CLASS,
            text = text,
        )
    }
}
