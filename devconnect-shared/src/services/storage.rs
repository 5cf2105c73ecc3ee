/// Object storage for uploaded images
///
/// Uploads go to a Supabase Storage bucket over its REST API:
///
/// - upload: `POST {url}/storage/v1/object/{bucket}/{name}` with `x-upsert: true`
/// - public URL: `{url}/storage/v1/object/public/{bucket}/{name}`
///
/// The API talks to storage through [`ObjectStorage`] so tests can swap in
/// an in-memory implementation.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{header, Client};
use std::time::Duration;
use tracing::{debug, warn};

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Could not build the HTTP client
    #[error("Storage client error: {0}")]
    Client(String),

    /// Request did not reach the storage service
    #[error("Storage request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Storage service answered with an error status
    #[error("Storage rejected upload ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Destination for uploaded files
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Stores `data` under `name`, overwriting any existing object, and
    /// returns its public URL
    async fn upload(&self, name: &str, content_type: &str, data: Bytes) -> Result<String, StorageError>;
}

/// Supabase connection settings
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`
    pub url: String,

    /// Service or anon key
    pub key: String,

    pub bucket: String,
}

/// Supabase Storage client
#[derive(Debug, Clone)]
pub struct SupabaseStorage {
    client: Client,
    config: SupabaseConfig,
}

impl SupabaseStorage {
    pub fn new(mut config: SupabaseConfig) -> Result<Self, StorageError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .user_agent(concat!("devconnect/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| StorageError::Client(e.to_string()))?;

        config.url = config.url.trim_end_matches('/').to_string();

        Ok(Self { client, config })
    }

    fn object_url(&self, name: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.config.url, self.config.bucket, name
        )
    }

    /// Public URL of an object in the configured bucket
    pub fn public_url(&self, name: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.config.url, self.config.bucket, name
        )
    }
}

#[async_trait]
impl ObjectStorage for SupabaseStorage {
    async fn upload(&self, name: &str, content_type: &str, data: Bytes) -> Result<String, StorageError> {
        debug!(name, content_type, size = data.len(), "Uploading object");

        let response = self
            .client
            .post(self.object_url(name))
            .bearer_auth(&self.config.key)
            .header("apikey", &self.config.key)
            .header("x-upsert", "true")
            .header(header::CONTENT_TYPE, content_type)
            .body(data)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), %body, "Storage upload rejected");
            return Err(StorageError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(self.public_url(name))
    }
}

/// Builds the stored object name: `<unix-millis>-<original name>`
///
/// Directory components are dropped and characters outside
/// `[A-Za-z0-9._-]` become `_`.
pub fn object_name(original: &str, unix_millis: i64) -> String {
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    let sanitized: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let sanitized = sanitized.trim_start_matches('.');
    let name = if sanitized.is_empty() { "upload" } else { sanitized };

    format!("{}-{}", unix_millis, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage(url: &str) -> SupabaseStorage {
        SupabaseStorage::new(SupabaseConfig {
            url: url.to_string(),
            key: "key".to_string(),
            bucket: "images".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_urls() {
        let storage = storage("https://demo.supabase.co/");

        assert_eq!(
            storage.object_url("1-a.png"),
            "https://demo.supabase.co/storage/v1/object/images/1-a.png"
        );
        assert_eq!(
            storage.public_url("1-a.png"),
            "https://demo.supabase.co/storage/v1/object/public/images/1-a.png"
        );
    }

    #[test]
    fn test_object_name() {
        assert_eq!(object_name("avatar.png", 1700000000000), "1700000000000-avatar.png");
        assert_eq!(object_name("my photo (1).jpg", 5), "5-my_photo__1_.jpg");
        assert_eq!(object_name("../../etc/passwd", 5), "5-passwd");
        assert_eq!(object_name("C:\\Users\\me\\pic.gif", 5), "5-pic.gif");
        assert_eq!(object_name(".hidden", 5), "5-hidden");
        assert_eq!(object_name("", 5), "5-upload");
        assert_eq!(object_name("dir/", 5), "5-upload");
    }
}
