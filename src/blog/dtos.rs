use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::ArticleSummary;
use crate::generation::images::RegeneratedImage;

#[derive(Debug, Deserialize, ToSchema)]
pub struct GenerateBlogRequest {
    /// How many articles to draft; defaults to 3, capped at 10.
    pub count: Option<usize>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GenerateBlogResponse {
    pub success: bool,
    pub message: String,
    pub articles: Vec<ArticleSummary>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegenerateImagesRequest {
    /// Specific posts to regenerate; absent means every post without an
    /// image.
    pub ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegenerateImagesResponse {
    pub success: bool,
    pub message: String,
    pub posts: Vec<RegeneratedImage>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

/// A rendered post: stored content annotated with contextual links at
/// read time, plus related reading.
#[derive(Debug, Serialize, ToSchema)]
pub struct PostView {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub meta_description: Option<String>,
    pub excerpt: Option<String>,
    pub content: String,
    pub category: String,
    pub tags: Vec<String>,
    pub image_url: Option<String>,
    pub read_time_minutes: i32,
    pub links_added: usize,
    pub related: Vec<RelatedLink>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RelatedLink {
    pub href: String,
    pub title: String,
}
