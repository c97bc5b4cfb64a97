use std::sync::Arc;

use axum::{
    Json,
    extract::{Multipart, Path, Query, State, multipart::MultipartError},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;

use super::UPLOAD_BODY_LIMIT;
use crate::auth::RequireUser;
use crate::server::AppState;
use crate::server::dto::{DownloadParams, MediaContentResponse};
use crate::server::response::{ApiError, ApiResponse};
use crate::error::Error;
use crate::service::{MAX_MEDIA_SIZE_BYTES, MediaPatch, Upload};

/// Fields of a media multipart body. Both are optional at this layer.
#[derive(Default)]
struct MediaForm {
    file: Option<Bytes>,
    file_name: Option<String>,
}

/// A body over the route's limit is reported like any other oversized file.
/// `Content-Length` stands in for the file size when present.
fn form_error(err: MultipartError, headers: &HeaderMap) -> ApiError {
    if err.status() != StatusCode::PAYLOAD_TOO_LARGE {
        return err.into();
    }

    let size = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(UPLOAD_BODY_LIMIT as u64 + 1);

    Error::FileTooLarge {
        size,
        max: MAX_MEDIA_SIZE_BYTES,
    }
    .into()
}

async fn parse_media_form(
    multipart: &mut Multipart,
    headers: &HeaderMap,
) -> Result<MediaForm, ApiError> {
    let mut form = MediaForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| form_error(e, headers))?
    {
        match field.name() {
            Some("file") => {
                if form.file_name.is_none() {
                    form.file_name = field.file_name().map(str::to_string);
                }
                form.file = Some(field.bytes().await.map_err(|e| form_error(e, headers))?);
            }
            Some("file_name") => {
                form.file_name = Some(field.text().await.map_err(|e| form_error(e, headers))?);
            }
            _ => {}
        }
    }

    Ok(form)
}

/// GET /boxes/{id}/media
pub async fn list_media(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(box_id): Path<i64>,
) -> impl IntoResponse {
    let media = state.services.media.list_media(&auth.user, box_id)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(media)))
}

/// POST /boxes/{id}/media - multipart with `file` and optional `file_name`
pub async fn upload_media(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(box_id): Path<i64>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let form = parse_media_form(&mut multipart, &headers).await?;
    let upload = Upload {
        file_name: form.file_name.unwrap_or_default(),
        data: form.file,
    };

    let media = state
        .services
        .media
        .upload(&auth.user, box_id, upload)
        .await?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(media))))
}

/// GET /media/{id}
pub async fn get_media(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let media = state.services.media.metadata(&auth.user, id)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(media)))
}

/// PUT /media/{id} - replace content and/or rename
pub async fn update_media(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let form = parse_media_form(&mut multipart, &headers).await?;
    let patch = MediaPatch {
        file_name: form.file_name,
        data: form.file,
    };

    let media = state
        .services
        .media
        .update(&auth.user, id, patch)
        .await?;

    Ok::<_, ApiError>(Json(ApiResponse::success(media)))
}

/// DELETE /media/{id}
pub async fn delete_media(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    state.services.media.delete(&auth.user, id).await?;
    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}

/// GET /media/{id}/content - raw bytes, or JSON with `?encoding=base64`
pub async fn download_media(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(params): Query<DownloadParams>,
) -> Result<Response, ApiError> {
    let base64 = match params.encoding.as_deref() {
        None | Some("raw") => false,
        Some("base64") => true,
        Some(other) => {
            return Err(ApiError::bad_request(format!(
                "Unsupported encoding '{other}'"
            )));
        }
    };

    let (media, data) = state.services.media.download(&auth.user, id).await?;

    if base64 {
        let body = MediaContentResponse {
            content: STANDARD.encode(&data),
            encoding: "base64",
            media,
        };
        return Ok(Json(ApiResponse::success(body)).into_response());
    }

    let mut response = (
        [(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/octet-stream"),
        )],
        data,
    )
        .into_response();

    let disposition = format!(
        "attachment; filename=\"{}\"",
        media.file_name.replace(['"', '\\'], "_")
    );
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        response
            .headers_mut()
            .insert(header::CONTENT_DISPOSITION, value);
    }

    Ok(response)
}
