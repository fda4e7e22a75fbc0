use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{error, info, instrument};

use crate::{
    app_state::AppState,
    blog::dtos::{
        ErrorResponse, GenerateBlogRequest, GenerateBlogResponse, PostView, RegenerateImagesRequest,
        RegenerateImagesResponse, RelatedLink,
    },
    generation::{ArticleGenerator, ImageRegenerator},
    seo::{InjectionConfig, inject, recommend},
};

const DEFAULT_ARTICLE_COUNT: usize = 3;
const MAX_ARTICLE_COUNT: usize = 10;

fn misconfigured(what: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new(format!("{what} is not configured"))),
    )
        .into_response()
}

/// Draft and persist a batch of articles. Per-article failures are
/// skipped; the envelope reports how many actually made it.
#[utoipa::path(
    post,
    path = "/generate-blog",
    tag = "blog",
    request_body = GenerateBlogRequest,
    responses(
        (status = 200, description = "Batch finished, possibly partially", body = GenerateBlogResponse),
        (status = 500, description = "Model gateway not configured", body = ErrorResponse)
    )
)]
#[instrument(skip_all)]
pub async fn generate_blog(
    State(state): State<AppState>,
    Json(payload): Json<GenerateBlogRequest>,
) -> Response {
    let Some(llm) = state.llm.clone() else {
        return misconfigured("model gateway API key");
    };

    let requested = payload
        .count
        .unwrap_or(DEFAULT_ARTICLE_COUNT)
        .clamp(1, MAX_ARTICLE_COUNT);

    let generator = ArticleGenerator::new(llm, state.post_repo.clone(), state.picker.clone());
    let articles = generator.generate(requested).await;

    info!(requested, created = articles.len(), "blog generation batch finished");
    (
        StatusCode::OK,
        Json(GenerateBlogResponse {
            success: true,
            message: format!("Created {} of {} articles", articles.len(), requested),
            articles,
        }),
    )
        .into_response()
}

/// Generate header images for posts that lack one (or for the named ids).
#[utoipa::path(
    post,
    path = "/regenerate-blog-images",
    tag = "blog",
    request_body = RegenerateImagesRequest,
    responses(
        (status = 200, description = "Batch finished, possibly partially", body = RegenerateImagesResponse),
        (status = 500, description = "Gateway or storage not configured", body = ErrorResponse)
    )
)]
#[instrument(skip_all)]
pub async fn regenerate_blog_images(
    State(state): State<AppState>,
    Json(payload): Json<RegenerateImagesRequest>,
) -> Response {
    let Some(llm) = state.llm.clone() else {
        return misconfigured("model gateway API key");
    };
    let Some(store) = state.store.clone() else {
        return misconfigured("object storage");
    };

    let regenerator = ImageRegenerator::new(
        llm,
        store,
        state.post_repo.clone(),
        state.picker.clone(),
        state.image_delay,
    );

    match regenerator.regenerate(payload.ids).await {
        Ok(posts) => (
            StatusCode::OK,
            Json(RegenerateImagesResponse {
                success: true,
                message: format!("Updated {} header images", posts.len()),
                posts,
            }),
        )
            .into_response(),
        Err(err) => {
            error!(%err, "could not select posts for image regeneration");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(err.to_string())),
            )
                .into_response()
        }
    }
}

/// Serve one post with contextual links injected at read time. The stored
/// row is never mutated; annotation happens on a copy per request.
#[utoipa::path(
    get,
    path = "/blog/{slug}",
    tag = "blog",
    responses(
        (status = 200, description = "Annotated post", body = PostView),
        (status = 404, description = "Unknown slug", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_post(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    let post = match state.post_repo.find_by_slug(&slug).await {
        Ok(Some(post)) => post,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new(format!("no post with slug '{slug}'"))),
            )
                .into_response();
        }
        Err(err) => {
            error!(%err, "post lookup failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("post lookup failed")),
            )
                .into_response();
        }
    };

    let own_href = format!("/blog/{}", post.slug);
    let result = inject(
        &post.content,
        &state.catalogs,
        &InjectionConfig::default(),
        Some(own_href.as_str()),
    );

    let related = recommend(&state.catalogs.cross_article, &post.slug, &post.category, &post.tags)
        .into_iter()
        .map(|rule| RelatedLink {
            href: rule.destination.clone(),
            title: rule.title.clone(),
        })
        .collect();

    (
        StatusCode::OK,
        Json(PostView {
            id: post.id,
            slug: post.slug,
            title: post.title,
            meta_description: post.meta_description,
            excerpt: post.excerpt,
            content: result.content,
            category: post.category,
            tags: post.tags,
            image_url: post.image_url,
            read_time_minutes: post.read_time_minutes,
            links_added: result.links_added,
            related,
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::BlogPost;
    use crate::generation::LlmClient;
    use crate::generation::prompts::test_support::RoundRobinPicker;
    use crate::repositories::MockPostRepositoryTrait;
    use crate::seo::LinkCatalogs;
    use axum::{
        Router,
        body::Body,
        http::Request,
        routing::{get, post},
    };
    use chrono::Utc;
    use reqwest::Client;
    use sqlx::{Pool, Postgres};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;
    use uuid::Uuid;
    use wiremock::matchers::{method, path as url_path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_pool() -> Pool<Postgres> {
        // Dummy pool; handlers under test never touch it.
        Pool::<Postgres>::connect_lazy("postgresql://dummy").expect("Failed to create test pool")
    }

    fn test_state(repo: MockPostRepositoryTrait, llm_base: Option<&str>) -> AppState {
        AppState {
            post_repo: Arc::new(repo),
            db_pool: create_test_pool(),
            llm: llm_base.map(|base| {
                Arc::new(LlmClient::new(Client::new(), base, "key", "text-model", "image-model"))
            }),
            store: None,
            picker: Arc::new(RoundRobinPicker::default()),
            catalogs: Arc::new(LinkCatalogs::site_default().clone()),
            image_delay: Duration::ZERO,
        }
    }

    fn create_test_app(state: AppState) -> Router {
        Router::new()
            .route("/generate-blog", post(generate_blog))
            .route("/regenerate-blog-images", post(regenerate_blog_images))
            .route("/blog/{slug}", get(get_post))
            .with_state(state)
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn article_completion(title: &str) -> serde_json::Value {
        let article = serde_json::json!({
            "title": title,
            "metaDescription": "Meta.",
            "excerpt": "Excerpt.",
            "category": "SEO",
            "tags": ["seo"],
            "content": "<p>Body text.</p>"
        });
        serde_json::json!({
            "choices": [{"message": {"content": format!("```json\n{article}\n```")}}]
        })
    }

    fn stored_post(slug: &str, content: &str) -> BlogPost {
        let now = Utc::now();
        BlogPost {
            id: Uuid::new_v4(),
            slug: slug.to_string(),
            title: "A Post".to_string(),
            meta_description: None,
            excerpt: None,
            content: content.to_string(),
            category: "SEO".to_string(),
            tags: vec!["local".to_string()],
            image_url: None,
            read_time_minutes: 1,
            published_at: Some(now),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn generate_blog_without_api_key_is_500() {
        let app = create_test_app(test_state(MockPostRepositoryTrait::new(), None));

        let request = Request::builder()
            .method("POST")
            .uri("/generate-blog")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"count": 2}"#))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("not configured"));
    }

    #[tokio::test]
    async fn generate_blog_reports_partial_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(url_path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": "not json at all"}}]
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(url_path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(article_completion("Kept")))
            .mount(&server)
            .await;

        let mut repo = MockPostRepositoryTrait::new();
        repo.expect_insert().returning(|new_post| {
            let now = Utc::now();
            Ok(BlogPost {
                id: Uuid::new_v4(),
                slug: new_post.slug.clone(),
                title: new_post.title.clone(),
                meta_description: new_post.meta_description.clone(),
                excerpt: new_post.excerpt.clone(),
                content: new_post.content.clone(),
                category: new_post.category.clone(),
                tags: new_post.tags.clone(),
                image_url: None,
                read_time_minutes: new_post.read_time_minutes,
                published_at: Some(now),
                created_at: now,
                updated_at: now,
            })
        });

        let app = create_test_app(test_state(repo, Some(server.uri().as_str())));
        let request = Request::builder()
            .method("POST")
            .uri("/generate-blog")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"count": 3}"#))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["articles"].as_array().unwrap().len(), 2);
        assert_eq!(body["message"], "Created 2 of 3 articles");
    }

    #[tokio::test]
    async fn regenerate_images_without_storage_is_500() {
        let server = MockServer::start().await;
        let app = create_test_app(test_state(MockPostRepositoryTrait::new(), Some(server.uri().as_str())));

        let request = Request::builder()
            .method("POST")
            .uri("/regenerate-blog-images")
            .header("content-type", "application/json")
            .body(Body::from("{}"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn get_post_injects_links_and_recommends() {
        let mut repo = MockPostRepositoryTrait::new();
        repo.expect_find_by_slug()
            .withf(|slug| slug == "a-post")
            .return_once(|_| {
                Ok(Some(stored_post(
                    "a-post",
                    "<p>Good local seo starts with keyword research.</p>",
                )))
            });

        let app = create_test_app(test_state(repo, None));
        let request = Request::builder()
            .uri("/blog/a-post")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;

        let content = body["content"].as_str().unwrap();
        assert!(content.contains(r#"href="/services/seo""#));
        assert!(body["links_added"].as_u64().unwrap() >= 1);

        let related = body["related"].as_array().unwrap();
        assert!(!related.is_empty());
        assert!(related.len() <= 3);
        assert!(related.iter().all(|r| r["href"] != "/blog/a-post"));
    }

    #[tokio::test]
    async fn get_post_unknown_slug_is_404() {
        let mut repo = MockPostRepositoryTrait::new();
        repo.expect_find_by_slug().return_once(|_| Ok(None));

        let app = create_test_app(test_state(repo, None));
        let request = Request::builder()
            .uri("/blog/missing")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert_eq!(body["success"], false);
    }
}
