//! S3 Storage Client
//!
//! Object store for chat images on any S3-compatible backend: AWS S3, MinIO,
//! Backblaze B2, Cloudflare R2.

use async_trait::async_trait;
use aws_config::Region;
use aws_sdk_s3::{
    config::{Credentials, IdentityCache, SharedCredentialsProvider, StalledStreamProtectionConfig},
    primitives::ByteStream,
    Client,
};
use tracing::info;

use crate::config::Config;
use crate::gateway::{ObjectStore, PublicUrl, PutOptions, StoreError};

/// S3 client wrapper with configuration.
#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
    public_base: String,
}

impl S3ObjectStore {
    /// Create a new S3 client from configuration.
    ///
    /// Uses path-style addressing when a custom endpoint is configured.
    pub async fn new(config: &Config) -> Result<Self, StoreError> {
        let region_name = std::env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string());

        let mut s3_config_builder = aws_sdk_s3::Config::builder()
            .region(Region::new(region_name.clone()))
            .stalled_stream_protection(StalledStreamProtectionConfig::disabled())
            .identity_cache(IdentityCache::no_cache());

        // Configure credentials from environment
        if let (Ok(access_key), Ok(secret_key)) = (
            std::env::var("AWS_ACCESS_KEY_ID"),
            std::env::var("AWS_SECRET_ACCESS_KEY"),
        ) {
            let credentials = Credentials::new(access_key, secret_key, None, None, "environment");
            s3_config_builder =
                s3_config_builder.credentials_provider(SharedCredentialsProvider::new(credentials));
        }

        if let Some(endpoint) = &config.s3_endpoint {
            s3_config_builder = s3_config_builder
                .endpoint_url(endpoint)
                .force_path_style(true); // Required for MinIO and most S3-compatible backends
        }

        let client = Client::from_conf(s3_config_builder.build());
        let public_base = public_base_url(
            config.s3_public_url.as_deref(),
            config.s3_endpoint.as_deref(),
            &config.s3_bucket,
            &region_name,
        );

        info!(
            bucket = %config.s3_bucket,
            endpoint = ?config.s3_endpoint,
            public_base = %public_base,
            "S3 client initialized"
        );

        Ok(Self {
            client,
            bucket: config.s3_bucket.clone(),
            public_base,
        })
    }

    /// Check if the bucket is accessible (health check).
    pub async fn health_check(&self) -> Result<(), StoreError> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| StoreError::Config(format!("Bucket not accessible: {e}")))?;

        Ok(())
    }

    /// Get the bucket name.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, options: PutOptions) -> Result<(), StoreError> {
        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .content_type(options.content_type)
            .set_cache_control(options.cache_control);

        if !options.overwrite {
            // Conditional write: fails with 412 when the key already exists
            request = request.if_none_match("*");
        }

        request.send().await.map_err(|e| {
            match e.raw_response().map(|r| r.status().as_u16()) {
                Some(409 | 412) => StoreError::AlreadyExists(key.to_string()),
                _ => StoreError::Upload(e.to_string()),
            }
        })?;

        Ok(())
    }

    fn public_url(&self, key: &str) -> Result<PublicUrl, StoreError> {
        object_url(&self.public_base, key)
    }
}

/// Base URL under which the bucket's objects are served.
///
/// Explicit public URL wins, then the custom endpoint (path-style), then
/// the AWS virtual-hosted address.
pub fn public_base_url(
    public_url: Option<&str>,
    endpoint: Option<&str>,
    bucket: &str,
    region: &str,
) -> String {
    match (public_url, endpoint) {
        (Some(base), _) => base.trim_end_matches('/').to_string(),
        (None, Some(endpoint)) => format!("{}/{bucket}", endpoint.trim_end_matches('/')),
        (None, None) => format!("https://{bucket}.s3.{region}.amazonaws.com"),
    }
}

/// Join a base URL and an object key.
pub fn object_url(base: &str, key: &str) -> Result<PublicUrl, StoreError> {
    if key.is_empty() || key.starts_with('/') || key.contains("..") {
        return Err(StoreError::Url(format!("Invalid object key: {key:?}")));
    }
    Ok(PublicUrl(format!("{base}/{key}")))
}
