use axum::{
    body::Body,
    extract::{multipart::Field, Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::AppError;
use crate::core::extractor::AppJson;
use crate::features::auth::{AuthenticatedUser, MaybeUser};
use crate::features::files::dtos::{
    DeleteFileResponseDto, FetchQuery, FileListQuery, FileResponseDto, UpdateFileDto,
    UploadFileDto, ViewMode, MSG_CREATED, MSG_DELETED, MSG_LISTED, MSG_UPDATED,
};
use crate::features::files::error::FileError;
use crate::features::files::services::{FileService, NewUpload};
use crate::shared::mime_sniff::OCTET_STREAM;
use crate::shared::sanitize::FALLBACK_FILENAME;
use crate::shared::types::ApiResponse;

/// Build a Content-Disposition value with an ASCII fallback and an RFC 5987
/// `filename*` parameter for names that need it.
fn content_disposition_header(disposition: &str, filename: &str) -> String {
    let needs_encoding = filename
        .chars()
        .any(|c| !c.is_ascii() || c.is_control() || c == '"' || c == '\\');

    if !needs_encoding {
        return format!("{}; filename=\"{}\"", disposition, filename);
    }

    // Header values must stay visible ASCII
    let fallback: String = filename
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '"' | '\\' => '_',
            c if !c.is_ascii() => '_',
            _ => c,
        })
        .collect();
    let encoded = urlencoding::encode(filename);

    format!(
        "{}; filename=\"{}\"; filename*=UTF-8''{}",
        disposition, fallback, encoded
    )
}

/// Buffer a multipart field, stopping as soon as it exceeds `limit`
async fn read_capped(mut field: Field<'_>, limit: usize) -> Result<Vec<u8>, AppError> {
    let mut content = Vec::new();

    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        if content.len() + chunk.len() > limit {
            return Err(FileError::SizeExceeded {
                limit,
                actual: content.len() + chunk.len(),
            }
            .into());
        }
        content.extend_from_slice(&chunk);
    }

    Ok(content)
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> AppError {
    debug!("Failed to read multipart data: {}", e);
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    }
}

/// Upload a file
///
/// Accepts multipart/form-data with a `file` part. The stored MIME type and size
/// are taken from the content, not from the part headers.
#[utoipa::path(
    post,
    path = "/api/files",
    tag = "files",
    request_body(
        content = UploadFileDto,
        content_type = "multipart/form-data",
    ),
    responses(
        (status = 201, description = "File uploaded successfully", body = ApiResponse<FileResponseDto>),
        (status = 400, description = "Missing file part"),
        (status = 401, description = "Authentication required"),
        (status = 413, description = "File too large")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload_file(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<FileResponseDto>>), AppError> {
    let mut upload: Option<NewUpload> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            debug!("Ignoring multipart field: {:?}", field.name());
            continue;
        }

        let filename = field
            .file_name()
            .map(|s| s.to_string())
            .unwrap_or_else(|| FALLBACK_FILENAME.to_string());
        let declared_content_type = field.content_type().map(|s| s.to_string());
        let content = read_capped(field, service.max_upload_size()).await?;

        upload = Some(NewUpload {
            filename,
            content,
            declared_content_type,
        });
        break;
    }

    let upload = upload.ok_or(FileError::MissingFile)?;
    let record = service.create(&user, upload).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(record.into()), MSG_CREATED, None)),
    ))
}

/// List the caller's files
///
/// Newest first, optionally filtered by a filename substring.
#[utoipa::path(
    get,
    path = "/api/files",
    tag = "files",
    params(FileListQuery),
    responses(
        (status = 200, description = "Page of files", body = ApiResponse<Vec<FileResponseDto>>),
        (status = 401, description = "Authentication required")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_files(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    Query(query): Query<FileListQuery>,
) -> Result<Json<ApiResponse<Vec<FileResponseDto>>>, AppError> {
    let page = service
        .list(&user, &query.search, &query.pagination())
        .await?;

    let items = page.records.into_iter().map(Into::into).collect();

    Ok(Json(ApiResponse::success(
        Some(items),
        MSG_LISTED,
        Some(page.meta),
    )))
}

/// Fetch file content
///
/// Anonymous callers may fetch shareable files. With `view` present the content is
/// served inline with its stored MIME type; otherwise as a download.
#[utoipa::path(
    get,
    path = "/api/files/{id}",
    tag = "files",
    params(
        ("id" = Uuid, Path, description = "File ID"),
        FetchQuery
    ),
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream"),
        (status = 401, description = "Anonymous access to a private file"),
        (status = 403, description = "File belongs to another user"),
        (status = 404, description = "File not found")
    ),
    security(
        (),
        ("bearer_auth" = [])
    )
)]
pub async fn get_file(
    user: MaybeUser,
    State(service): State<Arc<FileService>>,
    Path(id): Path<Uuid>,
    Query(query): Query<FetchQuery>,
) -> Result<Response, AppError> {
    let file = service.fetch(user.identity(), id).await?;

    let (content_type, disposition) = match query.mode() {
        ViewMode::Inline => (file.mime_type.as_str(), "inline"),
        ViewMode::Attachment => (OCTET_STREAM, "attachment"),
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_header(disposition, &file.filename),
        )
        .body(Body::from(file.content))
        .map_err(|e| AppError::Internal(format!("Failed to build file response: {}", e)))
}

/// Update file metadata
///
/// Only the owner may rename a file or change whether it is shareable.
#[utoipa::path(
    patch,
    path = "/api/files/{id}",
    tag = "files",
    params(
        ("id" = Uuid, Path, description = "File ID")
    ),
    request_body = UpdateFileDto,
    responses(
        (status = 200, description = "File updated", body = ApiResponse<FileResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "File belongs to another user"),
        (status = 404, description = "File not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_file(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateFileDto>,
) -> Result<Json<ApiResponse<FileResponseDto>>, AppError> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let record = service.update(Some(&user), id, dto.into()).await?;

    Ok(Json(ApiResponse::success(
        Some(record.into()),
        MSG_UPDATED,
        None,
    )))
}

/// Delete a file
///
/// Only the owner may delete. Content is removed before metadata.
#[utoipa::path(
    delete,
    path = "/api/files/{id}",
    tag = "files",
    params(
        ("id" = Uuid, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "File deleted", body = ApiResponse<DeleteFileResponseDto>),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "File belongs to another user"),
        (status = 404, description = "File not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_file(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DeleteFileResponseDto>>, AppError> {
    service.delete(Some(&user), id).await?;

    Ok(Json(ApiResponse::success(
        Some(DeleteFileResponseDto { deleted: true }),
        MSG_DELETED,
        None,
    )))
}
