use anyhow::{anyhow, Context};
use serde::Deserialize;
use time::{macros::format_description, UtcOffset};

/// Credentials and target bucket for one upload category.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageAccountConfig {
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub container: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DocumentStoreConfig {
    pub url: String,
    pub key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub label_storage: StorageAccountConfig,
    pub food_storage: StorageAccountConfig,
    pub storage_region: String,
    pub document_store: DocumentStoreConfig,
    pub display_offset: UtcOffset,
    pub max_upload_bytes: usize,
}

const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; every credential is required.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> anyhow::Result<String> {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| anyhow!("missing required environment variable {}", key))
        };

        let label_storage = StorageAccountConfig {
            endpoint: required("LABEL_STORAGE_ENDPOINT")?,
            access_key: required("LABEL_STORAGE_ACCESS_KEY")?,
            secret_key: required("LABEL_STORAGE_SECRET_KEY")?,
            container: lookup("LABEL_STORAGE_CONTAINER").unwrap_or_else(|| "label-images".into()),
        };
        let food_storage = StorageAccountConfig {
            endpoint: required("FOOD_STORAGE_ENDPOINT")?,
            access_key: required("FOOD_STORAGE_ACCESS_KEY")?,
            secret_key: required("FOOD_STORAGE_SECRET_KEY")?,
            container: lookup("FOOD_STORAGE_CONTAINER").unwrap_or_else(|| "food-images".into()),
        };
        let document_store = DocumentStoreConfig {
            url: required("DOCUMENT_STORE_URL")?,
            key: required("DOCUMENT_STORE_KEY")?,
        };

        let display_offset = match lookup("DISPLAY_UTC_OFFSET") {
            Some(v) => parse_offset(&v)?,
            None => UtcOffset::UTC,
        };

        let max_upload_bytes = match lookup("MAX_UPLOAD_BYTES") {
            Some(v) => v
                .parse::<usize>()
                .with_context(|| format!("MAX_UPLOAD_BYTES is not a byte count: {}", v))?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        Ok(Self {
            label_storage,
            food_storage,
            storage_region: lookup("STORAGE_REGION").unwrap_or_else(|| "us-east-1".into()),
            document_store,
            display_offset,
            max_upload_bytes,
        })
    }
}

/// Parses offsets of the form `+HH:MM` / `-HH:MM`.
pub fn parse_offset(raw: &str) -> anyhow::Result<UtcOffset> {
    UtcOffset::parse(
        raw.trim(),
        format_description!("[offset_hour sign:mandatory]:[offset_minute]"),
    )
    .with_context(|| format!("DISPLAY_UTC_OFFSET must look like +05:30, got {:?}", raw))
}
