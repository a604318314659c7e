use anyhow::Context;
use async_trait::async_trait;
use aws_config::{defaults, BehaviorVersion};
use aws_credential_types::Credentials;
use aws_sdk_s3::{
    config::{Builder as S3ConfigBuilder, Region},
    Client,
};
use aws_smithy_types::byte_stream::ByteStream;
use bytes::Bytes;

use crate::config::StorageAccountConfig;

/// Blob store bound to a single container.
#[async_trait]
pub trait StorageClient: Send + Sync {
    fn container(&self) -> &str;
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<()>;
}

#[derive(Clone)]
pub struct Storage {
    client: Client,
    container: String,
}

impl Storage {
    pub async fn new(account: &StorageAccountConfig, region: &str) -> anyhow::Result<Self> {
        let shared = defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .credentials_provider(Credentials::new(
                &account.access_key,
                &account.secret_key,
                None,
                None,
                "static",
            ))
            .endpoint_url(&account.endpoint)
            .load()
            .await;

        let conf = S3ConfigBuilder::from(&shared)
            .endpoint_url(&account.endpoint)
            .force_path_style(true)
            .build();

        Ok(Self {
            client: Client::from_conf(conf),
            container: account.container.clone(),
        })
    }
}

#[async_trait]
impl StorageClient for Storage {
    fn container(&self) -> &str {
        &self.container
    }

    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<()> {
        self.client
            .put_object()
            .bucket(&self.container)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .with_context(|| format!("put_object {}/{}", self.container, key))?;
        Ok(())
    }
}
