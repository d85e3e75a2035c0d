use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Whether a file may be read by anyone other than its owner.
///
/// `Unset` only appears on rows written before the column existed and is
/// treated as private.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Shareability {
    Unset,
    #[default]
    Private,
    Shareable,
}

impl Shareability {
    pub fn is_shareable(self) -> bool {
        matches!(self, Shareability::Shareable)
    }

    /// Column value; `Unset` maps back to NULL
    pub fn as_column(self) -> Option<bool> {
        match self {
            Shareability::Unset => None,
            Shareability::Private => Some(false),
            Shareability::Shareable => Some(true),
        }
    }
}

impl From<Option<bool>> for Shareability {
    fn from(value: Option<bool>) -> Self {
        match value {
            None => Shareability::Unset,
            Some(false) => Shareability::Private,
            Some(true) => Shareability::Shareable,
        }
    }
}

impl From<bool> for Shareability {
    fn from(value: bool) -> Self {
        Shareability::from(Some(value))
    }
}

/// Database row for the `files` table
#[derive(Debug, Clone, FromRow)]
pub struct FileRow {
    pub id: Uuid,
    pub filename: String,
    pub path: String,
    pub size: i64,
    pub mime_type: String,
    pub shareable: Option<bool>,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Stored file metadata
#[derive(Debug, Clone, PartialEq)]
pub struct FileRecord {
    pub id: Uuid,
    /// Sanitized display name; never used to address storage
    pub filename: String,
    /// Server-assigned content location
    pub path: String,
    pub size: i64,
    pub mime_type: String,
    pub shareable: Shareability,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<FileRow> for FileRecord {
    fn from(row: FileRow) -> Self {
        Self {
            id: row.id,
            filename: row.filename,
            path: row.path,
            size: row.size,
            mime_type: row.mime_type,
            shareable: row.shareable.into(),
            owner_id: row.user_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Partial update of a file's mutable attributes; `None` fields stay untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilePatch {
    pub filename: Option<String>,
    pub shareable: Option<bool>,
}

impl FilePatch {
    pub fn is_empty(&self) -> bool {
        self.filename.is_none() && self.shareable.is_none()
    }
}
