//! Object storage client for generated header images.
//!
//! Talks to a Supabase-style storage REST API: bytes are POSTed under a
//! bucket path and served back from a public URL derived from that path.

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::instrument;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("upload failed with status {status}: {body}")]
    Upload { status: reqwest::StatusCode, body: String },

    #[error("storage request failed: {0}")]
    Request(#[from] reqwest::Error),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload `bytes` under `path` and return the public URL.
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError>;
}

pub struct HttpObjectStore {
    http: Client,
    base_url: String,
    bucket: String,
    api_key: String,
}

impl HttpObjectStore {
    pub fn new(http: Client, base_url: &str, bucket: &str, api_key: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            bucket: bucket.to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn object_url(&self, path: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, self.bucket, path)
    }

    fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, path
        )
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    #[instrument(skip(self, bytes), fields(path = %path, size = bytes.len()))]
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let response = self
            .http
            .post(self.object_url(path))
            .bearer_auth(&self.api_key)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .header("x-upsert", "true")
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Upload { status, body });
        }

        Ok(self.public_url(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_url_layout() {
        let store = HttpObjectStore::new(Client::new(), "https://store.example/", "blog", "key");
        assert_eq!(
            store.public_url("images/post-1.png"),
            "https://store.example/storage/v1/object/public/blog/images/post-1.png"
        );
        assert_eq!(
            store.object_url("images/post-1.png"),
            "https://store.example/storage/v1/object/blog/images/post-1.png"
        );
    }
}
