use std::time::Duration;

use async_trait::async_trait;
use aws_config::retry::RetryConfig;
use aws_sdk_s3::{
    config::{Credentials, Region},
    presigning::PresigningConfig,
    primitives::ByteStream,
    Client,
};
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::info;

use crate::config::Config;

use super::ObjectStore;

/// Errors raised by the object storage layer.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("S3 upload failed: {0}")]
    Upload(String),

    #[error("presigned URL generation failed: {0}")]
    Sign(String),

    #[error("presigning config rejected: {0}")]
    Config(String),

    #[error("bucket operation failed: {0}")]
    Bucket(String),
}

/// Presigned download link together with the instant it stops working.
#[derive(Debug, Clone)]
pub struct SignedLink {
    pub url: String,
    pub expires_at: DateTime<Utc>,
}

/// Builds an S3 client for the configured MinIO endpoint.
///
/// Retries are disabled: a failed transfer is reported back to the chat
/// instead of being silently re-attempted.
pub async fn build_client(config: &Config) -> Client {
    let credentials = Credentials::new(
        config.minio_access_key.clone(),
        config.minio_secret_key.clone(),
        None,
        None,
        "static",
    );

    let sdk_config = aws_config::from_env()
        .endpoint_url(&config.minio_endpoint)
        .region(Region::new(config.minio_region.clone()))
        .credentials_provider(credentials)
        .load()
        .await
        .to_builder()
        .retry_config(RetryConfig::disabled())
        .build();

    let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
        .force_path_style(true)
        .build();

    Client::from_conf(s3_config)
}

pub struct S3Storage {
    client: Client,
    bucket: String,
    url_ttl: Duration,
}

impl S3Storage {
    pub fn new(client: Client, bucket: String, url_ttl: Duration) -> Self {
        Self {
            client,
            bucket,
            url_ttl,
        }
    }

    /// Creates the bucket when it does not exist yet.
    ///
    /// Expired objects are never deleted by this process; the bucket is
    /// expected to carry a lifecycle rule that prunes objects once their
    /// links have lapsed.
    pub async fn ensure_bucket(&self) -> Result<(), StorageError> {
        let missing = match self.client.head_bucket().bucket(&self.bucket).send().await {
            Ok(_) => false,
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_not_found() {
                    true
                } else {
                    return Err(StorageError::Bucket(format!(
                        "bucket check failed: {service_err}"
                    )));
                }
            }
        };

        if missing {
            info!("Bucket {} is missing, creating it", self.bucket);
            self.client
                .create_bucket()
                .bucket(&self.bucket)
                .send()
                .await
                .map_err(|err| StorageError::Bucket(format!("bucket creation failed: {err}")))?;
        }

        Ok(())
    }
}

#[async_trait]
impl ObjectStore for S3Storage {
    async fn put_object(
        &self,
        key: &str,
        content_type: Option<&str>,
        payload: Vec<u8>,
    ) -> Result<(), StorageError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .set_content_type(content_type.map(str::to_string))
            .body(ByteStream::from(payload))
            .send()
            .await
            .map_err(|err| StorageError::Upload(err.to_string()))?;

        Ok(())
    }

    async fn presigned_get_url(
        &self,
        key: &str,
        file_name: &str,
    ) -> Result<SignedLink, StorageError> {
        let presign_config = PresigningConfig::expires_in(self.url_ttl)
            .map_err(|err| StorageError::Config(err.to_string()))?;

        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .response_content_disposition(format!("attachment; filename=\"{file_name}\""))
            .presigned(presign_config)
            .await
            .map_err(|err| StorageError::Sign(err.to_string()))?;

        Ok(SignedLink {
            url: request.uri().to_string(),
            expires_at: Utc::now() + self.url_ttl,
        })
    }
}
