//! R2 client implementation.
//!
//! The service writes each uploaded performance video once and deletes it
//! with its analysis record; it never reads video bytes back. Playback goes
//! through short-lived presigned URLs, so the client streams directly from
//! the bucket.

use std::time::Duration;

use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::{Builder, Region};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use chrono::Utc;
use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};

/// Configuration for R2 client.
#[derive(Debug, Clone)]
pub struct R2Config {
    /// R2 endpoint URL (S3 API endpoint)
    pub endpoint_url: String,
    /// Access key ID
    pub access_key_id: String,
    /// Secret access key
    pub secret_access_key: String,
    /// Bucket name
    pub bucket_name: String,
    /// Region (usually "auto" for R2)
    pub region: String,
}

impl R2Config {
    /// Create config from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        fn require(name: &str) -> StorageResult<String> {
            std::env::var(name)
                .map_err(|_| StorageError::config_error(format!("{} not set", name)))
        }

        Ok(Self {
            endpoint_url: require("R2_ENDPOINT_URL")?,
            access_key_id: require("R2_ACCESS_KEY_ID")?,
            secret_access_key: require("R2_SECRET_ACCESS_KEY")?,
            bucket_name: require("R2_BUCKET_NAME")?,
            region: std::env::var("R2_REGION").unwrap_or_else(|_| "auto".to_string()),
        })
    }
}

/// A temporary, signed playback URL for a stored video.
#[derive(Debug, Clone)]
pub struct PlaybackUrl {
    /// The presigned URL
    pub url: String,
    /// When this URL expires (ISO 8601)
    pub expires_at: String,
    /// Expiry in seconds from now
    pub expires_in_secs: u64,
}

/// Cloudflare R2 storage client.
#[derive(Clone)]
pub struct R2Client {
    client: Client,
    bucket: String,
}

impl R2Client {
    /// Create a new R2 client from configuration.
    pub fn new(config: R2Config) -> Self {
        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "r2",
        );

        let sdk_config = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&config.endpoint_url)
            .region(Region::new(config.region))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Self {
            client: Client::from_conf(sdk_config),
            bucket: config.bucket_name,
        }
    }

    /// Create from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        Ok(Self::new(R2Config::from_env()?))
    }

    /// Store an uploaded performance video under its canonical key.
    ///
    /// Runs once per analysis, before any AI usage; the key ties the object
    /// to its analysis record for later playback and deletion.
    pub async fn upload_video(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<()> {
        let size = bytes.len();

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::upload_failed(format!("{}: {}", key, e)))?;

        info!(key = %key, bytes = size, "Stored analysis video");
        Ok(())
    }

    /// Generate a temporary signed playback URL for a stored video.
    ///
    /// This is the only way playback reaches the bucket; the URL expires
    /// after `expires_in` and a new one must be requested.
    pub async fn playback_url(&self, key: &str, expires_in: Duration) -> StorageResult<PlaybackUrl> {
        let presign_config = PresigningConfig::expires_in(expires_in)
            .map_err(|e| StorageError::PresignFailed(e.to_string()))?;

        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presign_config)
            .await
            .map_err(|e| StorageError::PresignFailed(format!("{}: {}", key, e)))?;

        let expires_in_secs = expires_in.as_secs();
        let expires_at = (Utc::now() + chrono::Duration::seconds(expires_in_secs as i64))
            .to_rfc3339();

        Ok(PlaybackUrl {
            url: presigned.uri().to_string(),
            expires_at,
            expires_in_secs,
        })
    }

    /// Verify the video bucket is reachable (readiness probe).
    pub async fn check_bucket(&self) -> StorageResult<()> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| {
                StorageError::config_error(format!("bucket {} unreachable: {}", self.bucket, e))
            })?;
        Ok(())
    }

    /// Remove a stored video once its analysis record is deleted.
    pub async fn delete_video(&self, key: &str) -> StorageResult<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::delete_failed(format!("{}: {}", key, e)))?;

        debug!(key = %key, "Deleted analysis video");
        Ok(())
    }
}
