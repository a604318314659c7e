use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub file_name: String,
    pub blob_name: String,
    pub container: String,
}
