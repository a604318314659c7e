use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::instrument;

use super::dto::UploadResponse;
use super::services::{upload_image, ImageCategory, UploadedImage};
use crate::{error::ApiError, state::AppState};

/// Multipart part carrying the file.
const IMAGE_FIELD: &str = "image";

pub fn write_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/upload-label-image", post(upload_label_image))
        .route("/upload-food-image", post(upload_food_image))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}

#[instrument(skip(state, mp))]
pub async fn upload_label_image(
    State(state): State<AppState>,
    mp: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    handle_upload(&state, ImageCategory::Label, mp).await
}

#[instrument(skip(state, mp))]
pub async fn upload_food_image(
    State(state): State<AppState>,
    mp: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    handle_upload(&state, ImageCategory::Food, mp).await
}

async fn handle_upload(
    state: &AppState,
    category: ImageCategory,
    mp: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    let image = read_image_field(mp).await?;
    let stored = upload_image(category.storage(state), image).await?;
    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            message: category.success_message().into(),
            file_name: stored.file_name,
            blob_name: stored.blob_name,
            container: stored.container,
        }),
    ))
}

/// Takes the first `image` part; other parts are ignored.
async fn read_image_field(mut mp: Multipart) -> Result<UploadedImage, ApiError> {
    while let Some(field) = mp
        .next_field()
        .await
        .map_err(multipart_error)?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field
            .content_type()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "application/octet-stream".into());
        if !super::services::is_image_type(&content_type) {
            return Err(ApiError::InvalidFileType(content_type));
        }
        let body = field
            .bytes()
            .await
            .map_err(multipart_error)?;
        return Ok(UploadedImage {
            file_name,
            content_type,
            body,
        });
    }
    Err(ApiError::MissingField(IMAGE_FIELD))
}

fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::TooLarge(e.body_text())
    } else {
        ApiError::Multipart(e.body_text())
    }
}
