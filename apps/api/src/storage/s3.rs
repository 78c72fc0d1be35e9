use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;
use tracing::info;

use super::BlobStore;

/// S3 / MinIO blob store. Download URLs are presigned GETs.
pub struct S3BlobStore {
    client: S3Client,
    bucket: String,
    url_ttl: Duration,
}

impl S3BlobStore {
    pub fn new(client: S3Client, bucket: String, url_ttl: Duration) -> Self {
        Self {
            client,
            bucket,
            url_ttl,
        }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<()> {
        let size = bytes.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("S3 upload failed: {e}"))?;

        info!("Uploaded {size} bytes to s3://{}/{}", self.bucket, key);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        let object = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("S3 download failed: {e}"))?;

        let data = object
            .body
            .collect()
            .await
            .with_context(|| format!("Failed to read s3://{}/{}", self.bucket, key))?;
        Ok(data.into_bytes().to_vec())
    }

    async fn download_url(&self, key: &str) -> Result<String> {
        let presigning = PresigningConfig::expires_in(self.url_ttl)
            .context("Invalid download URL lifetime")?;
        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| anyhow::anyhow!("S3 presigning failed: {e}"))?;
        Ok(request.uri().to_string())
    }
}
