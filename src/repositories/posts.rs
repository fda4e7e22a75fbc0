use crate::entities::{BlogPost, NewBlogPost};
use anyhow::Result;
use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

const POST_COLUMNS: &str = "id, slug, title, meta_description, excerpt, content, category, \
                            tags, image_url, read_time_minutes, published_at, created_at, updated_at";

/// Persistence surface for blog posts. Behind a trait so request handlers
/// can be exercised against a mock without a database.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostRepositoryTrait: Send + Sync {
    async fn insert(&self, new_post: &NewBlogPost) -> Result<BlogPost>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<BlogPost>>;
    /// Posts with no header image yet, oldest first.
    async fn find_missing_images(&self) -> Result<Vec<BlogPost>>;
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<BlogPost>>;
    async fn set_image_url(&self, id: Uuid, image_url: &str) -> Result<bool>;
}

#[derive(Clone)]
pub struct PostRepository {
    pool: Pool<Postgres>,
}

impl PostRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostRepositoryTrait for PostRepository {
    async fn insert(&self, new_post: &NewBlogPost) -> Result<BlogPost> {
        let query = format!(
            r#"
            INSERT INTO blog_posts
                (slug, title, meta_description, excerpt, content, category,
                 tags, read_time_minutes, published_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW())
            RETURNING {POST_COLUMNS}
            "#
        );
        let post = sqlx::query_as::<_, BlogPost>(&query)
            .bind(&new_post.slug)
            .bind(&new_post.title)
            .bind(&new_post.meta_description)
            .bind(&new_post.excerpt)
            .bind(&new_post.content)
            .bind(&new_post.category)
            .bind(&new_post.tags)
            .bind(new_post.read_time_minutes)
            .fetch_one(&self.pool)
            .await?;

        Ok(post)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<BlogPost>> {
        let query = format!("SELECT {POST_COLUMNS} FROM blog_posts WHERE slug = $1");
        let post = sqlx::query_as::<_, BlogPost>(&query)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;

        Ok(post)
    }

    async fn find_missing_images(&self) -> Result<Vec<BlogPost>> {
        let query = format!(
            "SELECT {POST_COLUMNS} FROM blog_posts \
             WHERE image_url IS NULL OR image_url = '' \
             ORDER BY created_at ASC"
        );
        let posts = sqlx::query_as::<_, BlogPost>(&query)
            .fetch_all(&self.pool)
            .await?;

        Ok(posts)
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<BlogPost>> {
        let query = format!(
            "SELECT {POST_COLUMNS} FROM blog_posts \
             WHERE id = ANY($1) \
             ORDER BY created_at ASC"
        );
        let posts = sqlx::query_as::<_, BlogPost>(&query)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(posts)
    }

    async fn set_image_url(&self, id: Uuid, image_url: &str) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE blog_posts SET image_url = $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(image_url)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
