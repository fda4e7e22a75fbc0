use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use sqlx::{Pool, Postgres};

use crate::config::Config;
use crate::generation::{LlmClient, Picker, UniformPicker};
use crate::repositories::{PostRepository, PostRepositoryTrait};
use crate::seo::LinkCatalogs;
use crate::storage::{HttpObjectStore, ObjectStore};

#[derive(Clone)]
pub struct AppState {
    pub post_repo: Arc<dyn PostRepositoryTrait>,
    pub db_pool: Pool<Postgres>,
    /// Absent when no API key is configured; generation endpoints then
    /// answer 500.
    pub llm: Option<Arc<LlmClient>>,
    /// Absent when storage credentials are missing.
    pub store: Option<Arc<dyn ObjectStore>>,
    pub picker: Arc<dyn Picker>,
    pub catalogs: Arc<LinkCatalogs>,
    pub image_delay: Duration,
}

impl AppState {
    pub fn new(pool: Pool<Postgres>, config: &Config) -> Self {
        let http = Client::new();

        let llm = config.llm_api_key().map(|key| {
            Arc::new(LlmClient::new(
                http.clone(),
                config.llm_api_url(),
                key,
                config.llm_text_model(),
                config.llm_image_model(),
            ))
        });

        let store: Option<Arc<dyn ObjectStore>> = match (config.storage_url(), config.storage_key())
        {
            (Some(url), Some(key)) => Some(Arc::new(HttpObjectStore::new(
                http,
                url,
                config.storage_bucket(),
                key,
            ))),
            _ => None,
        };

        Self {
            post_repo: Arc::new(PostRepository::new(pool.clone())),
            db_pool: pool,
            llm,
            store,
            picker: Arc::new(UniformPicker),
            catalogs: Arc::new(LinkCatalogs::site_default().clone()),
            image_delay: config.image_delay(),
        }
    }
}
