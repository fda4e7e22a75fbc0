//! Related-reading selection for the cross-article catalog.

use crate::seo::catalog::LinkRule;

const MAX_RECOMMENDATIONS: usize = 3;

const TAG_MATCH_SCORE: i32 = 2;
const CATEGORY_MATCH_SCORE: i32 = 3;

/// Pick up to three cross-article rules related to the current article.
///
/// A rule scores +2 for every tag whose text appears in the rule's keyword
/// string and +3 if the keyword string contains the category name, both
/// case-insensitive substring checks. Ties preserve catalog order. A rule
/// pointing back at `current_slug` is always excluded.
pub fn recommend<'a>(
    cross_article: &'a [LinkRule],
    current_slug: &str,
    category: &str,
    tags: &[String],
) -> Vec<&'a LinkRule> {
    let category = category.to_lowercase();
    let tags: Vec<String> = tags.iter().map(|t| t.to_lowercase()).collect();
    // Exact destination match; a suffix check would also hide articles
    // whose slug merely ends with the current one.
    let own_destination = format!("/blog/{current_slug}");

    let mut scored: Vec<(i32, &LinkRule)> = cross_article
        .iter()
        .filter(|rule| current_slug.is_empty() || rule.destination != own_destination)
        .map(|rule| {
            let keyword_text = rule.keyword_text();
            let mut score = 0;
            for tag in &tags {
                if !tag.is_empty() && keyword_text.contains(tag.as_str()) {
                    score += TAG_MATCH_SCORE;
                }
            }
            if !category.is_empty() && keyword_text.contains(category.as_str()) {
                score += CATEGORY_MATCH_SCORE;
            }
            (score, rule)
        })
        .collect();

    // Stable: equal scores keep catalog order.
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored
        .into_iter()
        .take(MAX_RECOMMENDATIONS)
        .map(|(_, rule)| rule)
        .collect()
}
