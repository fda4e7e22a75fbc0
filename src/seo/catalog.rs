//! Static link registries used by the injector and the recommender.
//!
//! Three catalogs are kept logically distinct so callers can cap them
//! independently: service pages (internal), authority domains (external)
//! and cross-article links (internal). The catalogs are immutable and
//! constructed once; callers receive them by reference.

use once_cell::sync::Lazy;

/// One keyword-to-destination mapping.
///
/// Any of `keywords` may trigger the rule; the first one found in the body
/// wins and retires the whole rule for that run.
#[derive(Debug, Clone)]
pub struct LinkRule {
    pub keywords: Vec<String>,
    pub destination: String,
    pub title: String,
    pub external: bool,
}

impl LinkRule {
    pub fn internal(keywords: &[&str], destination: &str, title: &str) -> Self {
        Self::build(keywords, destination, title, false)
    }

    pub fn external(keywords: &[&str], destination: &str, title: &str) -> Self {
        Self::build(keywords, destination, title, true)
    }

    fn build(keywords: &[&str], destination: &str, title: &str, external: bool) -> Self {
        assert!(!keywords.is_empty(), "link rule needs at least one keyword");
        assert!(!destination.is_empty(), "link rule needs a destination");
        Self {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            destination: destination.to_string(),
            title: title.to_string(),
            external,
        }
    }

    /// Length in characters of the rule's longest keyword. Used to order
    /// rules so specific phrases are tried before generic single words.
    pub fn longest_keyword(&self) -> usize {
        self.keywords
            .iter()
            .map(|k| k.chars().count())
            .max()
            .unwrap_or(0)
    }

    /// All keywords joined for substring scoring in the recommender.
    pub fn keyword_text(&self) -> String {
        self.keywords.join(" ").to_lowercase()
    }
}

/// The three registries the injector works from.
#[derive(Debug, Clone, Default)]
pub struct LinkCatalogs {
    pub service: Vec<LinkRule>,
    pub authority: Vec<LinkRule>,
    pub cross_article: Vec<LinkRule>,
}

static SITE_CATALOGS: Lazy<LinkCatalogs> = Lazy::new(|| LinkCatalogs {
    service: vec![
        LinkRule::internal(
            &["seo", "search engine optimization", "organic search"],
            "/services/seo",
            "SEO Services",
        ),
        LinkRule::internal(
            &["local seo", "google business profile", "local search"],
            "/services/local-seo",
            "Local SEO Services",
        ),
        LinkRule::internal(
            &["web design", "website design", "landing page"],
            "/services/web-design",
            "Web Design Services",
        ),
        LinkRule::internal(
            &["ppc", "google ads", "paid advertising", "pay-per-click"],
            "/services/ppc",
            "PPC Management",
        ),
        LinkRule::internal(
            &["content marketing", "content strategy", "blog content"],
            "/services/content-marketing",
            "Content Marketing Services",
        ),
        LinkRule::internal(
            &["social media marketing", "social media strategy"],
            "/services/social-media",
            "Social Media Marketing",
        ),
        LinkRule::internal(
            &["marketing course", "marketing academy", "digital marketing training"],
            "/academy",
            "Marketing Academy",
        ),
    ],
    authority: vec![
        LinkRule::external(
            &["google search central", "google's guidelines", "search essentials"],
            "https://developers.google.com/search",
            "Google Search Central",
        ),
        LinkRule::external(
            &["domain authority", "moz"],
            "https://moz.com/learn/seo",
            "Moz SEO Learning Center",
        ),
        LinkRule::external(
            &["inbound marketing", "hubspot"],
            "https://www.hubspot.com/resources",
            "HubSpot Resources",
        ),
        LinkRule::external(
            &["backlink analysis", "ahrefs"],
            "https://ahrefs.com/blog",
            "Ahrefs Blog",
        ),
        LinkRule::external(
            &["core web vitals", "page experience"],
            "https://web.dev/explore/learn-core-web-vitals",
            "Core Web Vitals on web.dev",
        ),
    ],
    cross_article: vec![
        LinkRule::internal(
            &["keyword research", "search intent"],
            "/blog/keyword-research-guide",
            "Keyword Research: A Practical Guide",
        ),
        LinkRule::internal(
            &["on-page seo", "title tags", "meta descriptions"],
            "/blog/on-page-seo-checklist",
            "The On-Page SEO Checklist",
        ),
        LinkRule::internal(
            &["link building", "internal linking"],
            "/blog/link-building-strategies",
            "Link Building Strategies That Work",
        ),
        LinkRule::internal(
            &["conversion rate", "cro", "landing page optimization"],
            "/blog/conversion-rate-optimization",
            "Conversion Rate Optimization Basics",
        ),
        LinkRule::internal(
            &["email marketing", "newsletter"],
            "/blog/email-marketing-playbook",
            "The Email Marketing Playbook",
        ),
        LinkRule::internal(
            &["google analytics", "marketing metrics"],
            "/blog/marketing-analytics-setup",
            "Setting Up Marketing Analytics",
        ),
    ],
});

impl LinkCatalogs {
    /// The site's built-in registries. Loaded once, shared by reference.
    pub fn site_default() -> &'static LinkCatalogs {
        &SITE_CATALOGS
    }
}
