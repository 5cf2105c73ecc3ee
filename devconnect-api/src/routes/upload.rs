/// Image upload
///
/// `POST /upload` takes a multipart form with an `image` file field, stores
/// it in object storage and returns its public URL.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use chrono::Utc;
use devconnect_shared::services::storage::object_name;
use serde::{Deserialize, Serialize};

const FILE_FIELD: &str = "image";

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub url: String,
}

struct UploadedFile {
    file_name: String,
    content_type: String,
    data: Bytes,
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::BadRequest(err.body_text())
    }
}

async fn read_image(multipart: &mut Multipart) -> ApiResult<Option<UploadedFile>> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field.bytes().await?;

        return Ok(Some(UploadedFile {
            file_name,
            content_type,
            data,
        }));
    }

    Ok(None)
}

/// Upload an image
///
/// # Errors
///
/// - `400 Bad Request`: No `image` field, or a malformed form
/// - `503 Service Unavailable`: Object storage is not configured
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<UploadResponse>)> {
    let storage = state
        .storage
        .clone()
        .ok_or_else(|| ApiError::ServiceUnavailable("File storage is not configured".to_string()))?;

    let file = read_image(&mut multipart)
        .await?
        .filter(|file| !file.data.is_empty())
        .ok_or_else(|| ApiError::BadRequest("No file uploaded".to_string()))?;

    let name = object_name(&file.file_name, Utc::now().timestamp_millis());
    let size = file.data.len();

    let url = storage.upload(&name, &file.content_type, file.data).await?;

    tracing::info!(object = %name, size, "Image uploaded");

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            message: "Image uploaded successfully".to_string(),
            url,
        }),
    ))
}
