use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::files::models::{FilePatch, FileRecord};
use crate::shared::constants::DEFAULT_PAGE_SIZE;
use crate::shared::types::PaginationQuery;

pub const MSG_CREATED: &str = "success create file";
pub const MSG_UPDATED: &str = "success update file";
pub const MSG_DELETED: &str = "success delete file";
pub const MSG_LISTED: &str = "success list files";

/// Upload file request DTO for OpenAPI documentation
/// Note: This struct is for Swagger UI documentation only.
/// The actual handler uses axum's Multipart extractor directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadFileDto {
    /// The file to upload
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
}

/// Response DTO for file metadata
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FileResponseDto {
    pub id: Uuid,
    /// Sanitized display name
    pub filename: String,
    /// Size of the stored content in bytes
    pub size: i64,
    /// MIME type detected from the content
    pub mime_type: String,
    /// Whether other users may read the file
    pub shareable: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<FileRecord> for FileResponseDto {
    fn from(record: FileRecord) -> Self {
        Self {
            id: record.id,
            filename: record.filename,
            size: record.size,
            mime_type: record.mime_type,
            shareable: record.shareable.is_shareable(),
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Partial update; omitted fields are left unchanged
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateFileDto {
    #[validate(length(min = 1, max = 255, message = "filename must be 1-255 characters"))]
    #[schema(example = "report.pdf")]
    pub filename: Option<String>,
    pub shareable: Option<bool>,
}

impl From<UpdateFileDto> for FilePatch {
    fn from(dto: UpdateFileDto) -> Self {
        Self {
            filename: dto.filename,
            shareable: dto.shareable,
        }
    }
}

/// Query parameters for listing the caller's files
#[derive(Debug, Deserialize, IntoParams)]
pub struct FileListQuery {
    /// Filename substring filter
    #[serde(default)]
    pub search: String,
    /// Page number (1-indexed, default: 1)
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,
    /// Number of items per page (default: 10, max: 100)
    #[serde(default = "default_per_page")]
    #[param(minimum = 1, maximum = 100)]
    pub per_page: i64,
}

fn default_page() -> i64 {
    1
}

fn default_per_page() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl FileListQuery {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery::new(self.page, self.per_page)
    }
}

/// How fetched content is presented to the client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    /// Rendered in the browser with the stored MIME type
    Inline,
    /// Downloaded as an opaque byte stream
    Attachment,
}

/// Query parameters for fetching file content
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct FetchQuery {
    /// Any value (even empty) serves the file inline
    pub view: Option<String>,
}

impl FetchQuery {
    pub fn mode(&self) -> ViewMode {
        if self.view.is_some() {
            ViewMode::Inline
        } else {
            ViewMode::Attachment
        }
    }
}

/// Response DTO for delete operations
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteFileResponseDto {
    pub deleted: bool,
}
