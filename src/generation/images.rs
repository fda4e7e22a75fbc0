//! Batch header image regeneration.
//!
//! Posts lacking an image (or posts named explicitly by id) each get a
//! freshly generated header: randomized prompt, base64 decode, object
//! storage upload, image URL write-back. Items are processed sequentially
//! with a fixed delay between them to respect upstream rate limits, and a
//! failure for one post never aborts the batch.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::BlogPost;
use crate::generation::llm::LlmClient;
use crate::generation::prompts::{Picker, image_prompt};
use crate::repositories::PostRepositoryTrait;
use crate::storage::ObjectStore;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegeneratedImage {
    pub id: Uuid,
    pub title: String,
    pub image_url: String,
}

pub struct ImageRegenerator {
    llm: Arc<LlmClient>,
    store: Arc<dyn ObjectStore>,
    repo: Arc<dyn PostRepositoryTrait>,
    picker: Arc<dyn Picker>,
    /// Pause between posts; zero in tests.
    delay: Duration,
}

impl ImageRegenerator {
    pub fn new(
        llm: Arc<LlmClient>,
        store: Arc<dyn ObjectStore>,
        repo: Arc<dyn PostRepositoryTrait>,
        picker: Arc<dyn Picker>,
        delay: Duration,
    ) -> Self {
        Self {
            llm,
            store,
            repo,
            picker,
            delay,
        }
    }

    /// Regenerate headers for the named posts, or for every post missing
    /// an image when `ids` is absent.
    #[instrument(skip(self))]
    pub async fn regenerate(&self, ids: Option<Vec<Uuid>>) -> anyhow::Result<Vec<RegeneratedImage>> {
        let posts = match ids {
            Some(ids) => self.repo.find_by_ids(&ids).await?,
            None => self.repo.find_missing_images().await?,
        };

        info!(count = posts.len(), "regenerating header images");
        let mut regenerated = Vec::new();

        for (index, post) in posts.iter().enumerate() {
            if index > 0 {
                sleep(self.delay).await;
            }
            match self.regenerate_one(post).await {
                Ok(image_url) => {
                    info!(post_id = %post.id, %image_url, "header image updated");
                    regenerated.push(RegeneratedImage {
                        id: post.id,
                        title: post.title.clone(),
                        image_url,
                    });
                }
                Err(error) => {
                    warn!(post_id = %post.id, title = %post.title, %error,
                          "image regeneration failed, skipping");
                }
            }
        }

        Ok(regenerated)
    }

    async fn regenerate_one(&self, post: &BlogPost) -> anyhow::Result<String> {
        let prompt = image_prompt(self.picker.as_ref(), &post.title);
        let bytes = self.llm.generate_image(&prompt).await?;

        let path = format!("blog-headers/{}-{}.png", post.slug, Utc::now().timestamp());
        let image_url = self.store.upload(&path, bytes, "image/png").await?;

        if !self.repo.set_image_url(post.id, &image_url).await? {
            anyhow::bail!("post {} disappeared before image update", post.id);
        }
        Ok(image_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::prompts::test_support::RoundRobinPicker;
    use crate::repositories::MockPostRepositoryTrait;
    use crate::storage::MockObjectStore;
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD as BASE64;
    use reqwest::Client;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn post(slug: &str, title: &str) -> BlogPost {
        let now = Utc::now();
        BlogPost {
            id: Uuid::new_v4(),
            slug: slug.to_string(),
            title: title.to_string(),
            meta_description: None,
            excerpt: None,
            content: "<p>body</p>".to_string(),
            category: "SEO".to_string(),
            tags: vec![],
            image_url: None,
            read_time_minutes: 1,
            published_at: Some(now),
            created_at: now,
            updated_at: now,
        }
    }

    fn image_completion() -> serde_json::Value {
        let encoded = BASE64.encode(b"png-bytes");
        serde_json::json!({
            "choices": [{"message": {
                "content": "done",
                "images": [{"image_url": {"url": format!("data:image/png;base64,{encoded}")}}]
            }}]
        })
    }

    fn regenerator(
        server_uri: &str,
        store: MockObjectStore,
        repo: MockPostRepositoryTrait,
    ) -> ImageRegenerator {
        let llm = LlmClient::new(Client::new(), server_uri, "key", "text-model", "image-model");
        ImageRegenerator::new(
            Arc::new(llm),
            Arc::new(store),
            Arc::new(repo),
            Arc::new(RoundRobinPicker::default()),
            Duration::ZERO,
        )
    }

    #[tokio::test]
    async fn regenerates_posts_missing_images() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(image_completion()))
            .mount(&server)
            .await;

        let posts = vec![post("first-post", "First"), post("second-post", "Second")];
        let mut repo = MockPostRepositoryTrait::new();
        repo.expect_find_missing_images().return_once(move || Ok(posts));
        repo.expect_set_image_url().times(2).returning(|_, _| Ok(true));

        let mut store = MockObjectStore::new();
        store.expect_upload().times(2).returning(|path, bytes, content_type| {
            assert!(path.starts_with("blog-headers/"));
            assert_eq!(bytes, b"png-bytes");
            assert_eq!(content_type, "image/png");
            Ok(format!("https://store.example/public/{path}"))
        });

        let result = regenerator(&server.uri(), store, repo)
            .regenerate(None)
            .await
            .unwrap();
        assert_eq!(result.len(), 2);
        assert!(result[0].image_url.contains("first-post"));
    }

    #[tokio::test]
    async fn explicit_ids_use_find_by_ids() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(image_completion()))
            .mount(&server)
            .await;

        let target = post("target-post", "Target");
        let target_id = target.id;
        let mut repo = MockPostRepositoryTrait::new();
        repo.expect_find_by_ids()
            .withf(move |ids| ids == [target_id])
            .return_once(move |_| Ok(vec![target]));
        repo.expect_set_image_url().returning(|_, _| Ok(true));

        let mut store = MockObjectStore::new();
        store
            .expect_upload()
            .returning(|path, _, _| Ok(format!("https://store.example/public/{path}")));

        let result = regenerator(&server.uri(), store, repo)
            .regenerate(Some(vec![target_id]))
            .await
            .unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, target_id);
    }

    #[tokio::test]
    async fn missing_image_payload_skips_post() {
        let server = MockServer::start().await;
        // First completion has no image, second one does.
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": "no image"}}]
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(image_completion()))
            .mount(&server)
            .await;

        let posts = vec![post("a", "A"), post("b", "B")];
        let mut repo = MockPostRepositoryTrait::new();
        repo.expect_find_missing_images().return_once(move || Ok(posts));
        repo.expect_set_image_url().times(1).returning(|_, _| Ok(true));

        let mut store = MockObjectStore::new();
        store
            .expect_upload()
            .times(1)
            .returning(|path, _, _| Ok(format!("https://store.example/public/{path}")));

        let result = regenerator(&server.uri(), store, repo)
            .regenerate(None)
            .await
            .unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].title, "B");
    }

    #[tokio::test]
    async fn upload_failure_skips_post() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(image_completion()))
            .mount(&server)
            .await;

        let posts = vec![post("a", "A")];
        let mut repo = MockPostRepositoryTrait::new();
        repo.expect_find_missing_images().return_once(move || Ok(posts));
        repo.expect_set_image_url().never();

        let mut store = MockObjectStore::new();
        store.expect_upload().returning(|_, _, _| {
            Err(crate::storage::StorageError::Upload {
                status: reqwest::StatusCode::FORBIDDEN,
                body: "bucket policy".to_string(),
            })
        });

        let result = regenerator(&server.uri(), store, repo)
            .regenerate(None)
            .await
            .unwrap();
        assert!(result.is_empty());
    }
}
