use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::features::files::models::{FilePatch, FileRecord, FileRow};
use crate::modules::storage::StoreError;

/// Relational store of file metadata
#[async_trait]
pub trait MetadataStore: Send + Sync {
    async fn insert(&self, record: &FileRecord) -> Result<FileRecord, StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<FileRecord>, StoreError>;

    /// Apply `patch`; `None` when the row no longer exists
    async fn update(&self, id: Uuid, patch: &FilePatch) -> Result<Option<FileRecord>, StoreError>;

    /// Remove the row; `false` when no row was affected
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;

    /// One page of the owner's files (newest first) plus the total match count.
    ///
    /// An empty `search` matches everything; otherwise it is a substring of the filename.
    async fn list_page(
        &self,
        owner_id: Uuid,
        search: &str,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<FileRecord>, i64), StoreError>;
}

const FILE_COLUMNS: &str =
    "id, filename, path, size, mime_type, shareable, user_id, created_at, updated_at";

/// Postgres-backed metadata store
pub struct PgMetadataStore {
    pool: PgPool,
}

impl PgMetadataStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MetadataStore for PgMetadataStore {
    async fn insert(&self, record: &FileRecord) -> Result<FileRecord, StoreError> {
        let query = format!(
            r#"
            INSERT INTO files (id, filename, path, size, mime_type, shareable, user_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {FILE_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, FileRow>(&query)
            .bind(record.id)
            .bind(&record.filename)
            .bind(&record.path)
            .bind(record.size)
            .bind(&record.mime_type)
            .bind(record.shareable.as_column())
            .bind(record.owner_id)
            .bind(record.created_at)
            .bind(record.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to insert file metadata: {:?}", e);
                StoreError::Database(e)
            })?;

        Ok(row.into())
    }

    async fn get(&self, id: Uuid) -> Result<Option<FileRecord>, StoreError> {
        let query = format!("SELECT {FILE_COLUMNS} FROM files WHERE id = $1");

        let row = sqlx::query_as::<_, FileRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get file metadata: {:?}", e);
                StoreError::Database(e)
            })?;

        Ok(row.map(Into::into))
    }

    async fn update(&self, id: Uuid, patch: &FilePatch) -> Result<Option<FileRecord>, StoreError> {
        let query = format!(
            r#"
            UPDATE files
            SET filename = COALESCE($2, filename),
                shareable = COALESCE($3, shareable),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {FILE_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, FileRow>(&query)
            .bind(id)
            .bind(patch.filename.as_deref())
            .bind(patch.shareable)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update file metadata: {:?}", e);
                StoreError::Database(e)
            })?;

        Ok(row.map(Into::into))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM files WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete file metadata: {:?}", e);
                StoreError::Database(e)
            })?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_page(
        &self,
        owner_id: Uuid,
        search: &str,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<FileRecord>, i64), StoreError> {
        // strpos keeps the search literal: no LIKE wildcards to escape
        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM files
            WHERE user_id = $1 AND ($2 = '' OR strpos(filename, $2) > 0)
            "#,
        )
        .bind(owner_id)
        .bind(search)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count files: {:?}", e);
            StoreError::Database(e)
        })?;

        let query = format!(
            r#"
            SELECT {FILE_COLUMNS}
            FROM files
            WHERE user_id = $1 AND ($2 = '' OR strpos(filename, $2) > 0)
            ORDER BY created_at DESC, id
            OFFSET $3 LIMIT $4
            "#
        );

        let rows = sqlx::query_as::<_, FileRow>(&query)
            .bind(owner_id)
            .bind(search)
            .bind(offset)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list files: {:?}", e);
                StoreError::Database(e)
            })?;

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }
}
