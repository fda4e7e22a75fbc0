//! Batch article generation.
//!
//! One invocation drafts `count` articles through the LLM, derives slug
//! and read time, sanitizes the HTML and persists each row. A failure for
//! one article (upstream error, malformed JSON, insert error) is logged
//! and skipped; partial success is the expected outcome, not an error.

use std::sync::Arc;

use ammonia::Builder;
use chrono::Utc;
use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::entities::{ArticleSummary, NewBlogPost};
use crate::generation::extract::extract_json_payload;
use crate::generation::llm::LlmClient;
use crate::generation::prompts::{self, Picker, pick};
use crate::generation::text::{derive_slug, read_time_minutes};
use crate::repositories::PostRepositoryTrait;

/// The strict JSON shape the model is prompted for.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DraftArticle {
    title: String,
    meta_description: String,
    excerpt: String,
    category: String,
    tags: Vec<String>,
    content: String,
}

pub struct ArticleGenerator {
    llm: Arc<LlmClient>,
    repo: Arc<dyn PostRepositoryTrait>,
    picker: Arc<dyn Picker>,
}

impl ArticleGenerator {
    pub fn new(
        llm: Arc<LlmClient>,
        repo: Arc<dyn PostRepositoryTrait>,
        picker: Arc<dyn Picker>,
    ) -> Self {
        Self { llm, repo, picker }
    }

    /// Generate and persist up to `count` articles, returning the ones
    /// that made it through.
    #[instrument(skip(self))]
    pub async fn generate(&self, count: usize) -> Vec<ArticleSummary> {
        let mut created = Vec::new();

        for index in 0..count {
            match self.generate_one(index).await {
                Ok(summary) => {
                    info!(index, title = %summary.title, "article created");
                    created.push(summary);
                }
                Err(error) => {
                    warn!(index, %error, "article generation failed, skipping");
                }
            }
        }

        created
    }

    async fn generate_one(&self, index: usize) -> anyhow::Result<ArticleSummary> {
        let topic = pick(self.picker.as_ref(), prompts::TOPICS);
        let category = pick(self.picker.as_ref(), prompts::CATEGORIES);

        let completion = self
            .llm
            .chat(prompts::ARTICLE_SYSTEM_PROMPT, &prompts::article_prompt(topic, category))
            .await?;

        let payload = extract_json_payload(&completion)?;
        let draft: DraftArticle = serde_json::from_str(&payload)?;

        let content = Builder::default().clean(&draft.content).to_string();
        let new_post = NewBlogPost {
            slug: derive_slug(&draft.title, Utc::now(), index),
            read_time_minutes: read_time_minutes(&content),
            title: draft.title,
            meta_description: Some(draft.meta_description),
            excerpt: Some(draft.excerpt),
            content,
            category: draft.category,
            tags: draft.tags,
        };

        let post = self.repo.insert(&new_post).await?;
        Ok(ArticleSummary::from(&post))
    }
}
