use bytes::Bytes;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{error::ApiError, state::AppState, storage::StorageClient};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageCategory {
    Label,
    Food,
}

impl ImageCategory {
    pub fn storage(self, st: &AppState) -> &dyn StorageClient {
        match self {
            ImageCategory::Label => st.label_storage.as_ref(),
            ImageCategory::Food => st.food_storage.as_ref(),
        }
    }

    pub fn success_message(self) -> &'static str {
        match self {
            ImageCategory::Label => "Nutrition label uploaded to blob storage.",
            ImageCategory::Food => "Food image uploaded to blob storage.",
        }
    }
}

pub struct UploadedImage {
    pub file_name: String,
    pub content_type: String,
    pub body: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub file_name: String,
    pub blob_name: String,
    pub container: String,
}

pub fn is_image_type(content_type: &str) -> bool {
    content_type.trim().to_ascii_lowercase().starts_with("image/")
}

/// `<uuid>-<original name>`, with the original reduced to its last path
/// component and stripped of control characters.
pub fn blob_name(original: &str) -> String {
    lazy_static! {
        static ref CONTROL_RE: Regex = Regex::new(r"[\x00-\x1F\x7F]+").unwrap();
    }
    let base = original.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned = CONTROL_RE.replace_all(base, "_");
    let cleaned = cleaned.trim();
    let cleaned = if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        "image"
    } else {
        cleaned
    };
    format!("{}-{}", Uuid::new_v4().simple(), cleaned)
}

pub async fn upload_image(
    storage: &dyn StorageClient,
    image: UploadedImage,
) -> Result<StoredImage, ApiError> {
    if !is_image_type(&image.content_type) {
        warn!(file_name = %image.file_name, content_type = %image.content_type, "rejected non-image upload");
        return Err(ApiError::InvalidFileType(image.content_type));
    }

    let name = blob_name(&image.file_name);
    let size = image.body.len();
    storage
        .put_object(&name, image.body, &image.content_type)
        .await
        .map_err(ApiError::storage)?;

    info!(container = storage.container(), blob = %name, size, "image stored");
    Ok(StoredImage {
        file_name: image.file_name,
        blob_name: name,
        container: storage.container().to_string(),
    })
}

#[cfg(test)]
mod image_tests {
    use super::*;
    use crate::state::fakes::FakeStorage;

    fn image(name: &str, ct: &str) -> UploadedImage {
        UploadedImage {
            file_name: name.into(),
            content_type: ct.into(),
            body: Bytes::from_static(b"\x89PNG fake"),
        }
    }

    #[test]
    fn test_is_image_type() {
        assert!(is_image_type("image/jpeg"));
        assert!(is_image_type("image/png"));
        assert!(is_image_type("IMAGE/HEIC"));
        assert!(!is_image_type("text/plain"));
        assert!(!is_image_type("application/octet-stream"));
        assert!(!is_image_type("imagefoo"));
    }

    #[test]
    fn test_blob_name_keeps_original_and_is_unique() {
        let a = blob_name("lunch.jpg");
        let b = blob_name("lunch.jpg");
        assert!(a.ends_with("-lunch.jpg"));
        assert_ne!(a, b);
        assert_eq!(a.len(), 32 + 1 + "lunch.jpg".len());
    }

    #[test]
    fn test_blob_name_strips_paths_and_control_chars() {
        assert!(blob_name("C:\\fakepath\\label.png").ends_with("-label.png"));
        assert!(blob_name("../../etc/passwd").ends_with("-passwd"));
        assert!(blob_name("a\nb.jpg").ends_with("-a_b.jpg"));
        assert!(blob_name("").ends_with("-image"));
        assert!(blob_name("photos/").ends_with("-image"));
    }

    #[tokio::test]
    async fn test_rejects_non_image_before_storage() {
        let storage = FakeStorage::new("label-images");
        let err = upload_image(&storage, image("notes.txt", "text/plain"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidFileType(ref ct) if ct == "text/plain"));
        assert!(storage.puts().is_empty());
    }

    #[tokio::test]
    async fn test_preserves_declared_subtype() {
        let storage = FakeStorage::new("food-images");
        let stored = upload_image(&storage, image("salad.png", "image/png"))
            .await
            .unwrap();
        assert_eq!(stored.file_name, "salad.png");
        assert_eq!(stored.container, "food-images");

        let puts = storage.puts();
        assert_eq!(puts.len(), 1);
        assert_eq!(puts[0].key, stored.blob_name);
        assert_eq!(puts[0].content_type, "image/png");
        assert_eq!(puts[0].size, b"\x89PNG fake".len());
    }

    #[tokio::test]
    async fn test_storage_failure_is_propagated() {
        let storage = FakeStorage::failing("label-images", "account key rejected");
        let err = upload_image(&storage, image("label.jpg", "image/jpeg"))
            .await
            .unwrap_err();
        match err {
            ApiError::Storage(msg) => assert!(msg.contains("account key rejected")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
