use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// --- Tables ---

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct BlogPost {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub meta_description: Option<String>,
    pub excerpt: Option<String>,
    pub content: String, // sanitized HTML
    pub category: String,
    pub tags: Vec<String>,
    pub image_url: Option<String>,
    pub read_time_minutes: i32,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a freshly generated article.
#[derive(Debug, Clone)]
pub struct NewBlogPost {
    pub slug: String,
    pub title: String,
    pub meta_description: Option<String>,
    pub excerpt: Option<String>,
    pub content: String,
    pub category: String,
    pub tags: Vec<String>,
    pub read_time_minutes: i32,
}

/// --- API shapes ---

/// The slice of a post returned by the batch generation endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ArticleSummary {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub category: String,
}

impl From<&BlogPost> for ArticleSummary {
    fn from(post: &BlogPost) -> Self {
        Self {
            id: post.id,
            slug: post.slug.clone(),
            title: post.title.clone(),
            category: post.category.clone(),
        }
    }
}
