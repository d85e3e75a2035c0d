use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::core::config::StorageConfig;
use crate::features::auth::AuthenticatedUser;
use crate::features::files::error::FileError;
use crate::features::files::models::{FilePatch, FileRecord, Shareability};
use crate::features::files::policy::{AccessPolicy, Operation, Relation};
use crate::features::files::repositories::MetadataStore;
use crate::modules::storage::{ContentStore, StoreError};
use crate::shared::mime_sniff::detect_content_type;
use crate::shared::sanitize::{sanitize_filename, storage_extension};
use crate::shared::types::{Meta, PaginationQuery};

pub type Result<T> = std::result::Result<T, FileError>;

/// An upload as received from the client
#[derive(Debug, Clone)]
pub struct NewUpload {
    pub filename: String,
    pub content: Vec<u8>,
    /// Client-declared type; informational only, the stored type is sniffed
    pub declared_content_type: Option<String>,
}

/// Content returned by a fetch
#[derive(Debug, Clone)]
pub struct FileContent {
    pub content: Vec<u8>,
    pub filename: String,
    pub mime_type: String,
}

/// One page of a requester's files
#[derive(Debug, Clone)]
pub struct FilePage {
    pub records: Vec<FileRecord>,
    pub meta: Meta,
}

/// Coordinates the content store, metadata store and access policy across the
/// file lifecycle.
///
/// Ordering guarantees:
/// - create writes content before metadata, so a row never points at nothing
/// - delete removes content before metadata, and missing content counts as removed
pub struct FileService {
    content: Arc<dyn ContentStore>,
    metadata: Arc<dyn MetadataStore>,
    policy: AccessPolicy,
    settings: StorageConfig,
}

impl FileService {
    pub fn new(
        content: Arc<dyn ContentStore>,
        metadata: Arc<dyn MetadataStore>,
        policy: AccessPolicy,
        settings: StorageConfig,
    ) -> Self {
        Self {
            content,
            metadata,
            policy,
            settings,
        }
    }

    pub fn max_upload_size(&self) -> usize {
        self.settings.max_upload_size
    }

    /// Run a store call under the configured I/O timeout
    async fn guarded<T, F>(&self, operation: &'static str, call: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, StoreError>>,
    {
        let timeout = self.settings.io_timeout;
        match tokio::time::timeout(timeout, call).await {
            Ok(result) => result.map_err(FileError::from),
            Err(_) => {
                error!("Store call timed out: operation={}, timeout={:?}", operation, timeout);
                Err(StoreError::Timeout { operation, timeout }.into())
            }
        }
    }

    async fn find(&self, file_id: Uuid) -> Result<FileRecord> {
        self.guarded("metadata get", self.metadata.get(file_id))
            .await?
            .ok_or(FileError::NotFound)
    }

    fn authorize(
        &self,
        requester: Option<&AuthenticatedUser>,
        record: &FileRecord,
        operation: Operation,
    ) -> Result<()> {
        let decision = self.policy.evaluate(requester, record, operation);
        if decision.is_allowed() {
            return Ok(());
        }

        let relation = decision.relation();
        debug!(
            "Access denied: file_id={}, operation={:?}, relation={:?}",
            record.id, operation, relation
        );

        if operation == Operation::Read && self.settings.hide_private_files {
            return Err(FileError::NotFound);
        }

        Err(FileError::UnauthorizedAccess {
            anonymous: relation == Relation::Anonymous,
        })
    }

    /// Store a new file owned by `owner`.
    ///
    /// Size and MIME type come from the uploaded bytes. Oversized uploads fail
    /// before either store is touched.
    pub async fn create(&self, owner: &AuthenticatedUser, upload: NewUpload) -> Result<FileRecord> {
        let limit = self.settings.max_upload_size;
        if upload.content.len() > limit {
            return Err(FileError::SizeExceeded {
                limit,
                actual: upload.content.len(),
            });
        }

        let mime_type = detect_content_type(&upload.content);
        if let Some(declared) = upload.declared_content_type.as_deref() {
            if declared != mime_type {
                debug!(
                    "Declared content type ignored: declared={}, detected={}",
                    declared, mime_type
                );
            }
        }

        let file_id = Uuid::new_v4();
        let storage_name = format!("{}{}", file_id, storage_extension(&upload.filename));
        let filename = sanitize_filename(&upload.filename);

        let path = self
            .guarded(
                "content write",
                self.content
                    .write(owner.user_id, &storage_name, &upload.content),
            )
            .await?;

        let now = Utc::now();
        let record = FileRecord {
            id: file_id,
            filename,
            path,
            size: upload.content.len() as i64,
            mime_type: mime_type.to_string(),
            shareable: Shareability::Private,
            owner_id: owner.user_id,
            created_at: now,
            updated_at: now,
        };

        let record = match self
            .guarded("metadata insert", self.metadata.insert(&record))
            .await
        {
            Ok(saved) => saved,
            Err(e) => {
                self.discard_orphan(&record, &e).await;
                return Err(e);
            }
        };

        info!(
            "File created: id={}, owner={}, size={}, mime_type={}",
            record.id, record.owner_id, record.size, record.mime_type
        );

        Ok(record)
    }

    /// Content written for a record whose metadata insert failed.
    ///
    /// A timed-out insert may still have committed, so its content is kept.
    async fn discard_orphan(&self, record: &FileRecord, cause: &FileError) {
        if matches!(cause, FileError::Store(StoreError::Timeout { .. })) {
            warn!(
                "Metadata insert outcome unknown, keeping content: id={}, path={}",
                record.id, record.path
            );
            return;
        }

        if !self.settings.cleanup_orphans {
            warn!(
                "Orphaned content left after failed metadata insert: id={}, path={}",
                record.id, record.path
            );
            return;
        }

        match self
            .guarded("content delete", self.content.delete(&record.path))
            .await
        {
            Ok(_) => warn!(
                "Removed orphaned content after failed metadata insert: id={}, path={}",
                record.id, record.path
            ),
            Err(e) => error!(
                "Failed to remove orphaned content: id={}, path={}, error={}",
                record.id, record.path, e
            ),
        }
    }

    /// Rename and/or toggle sharing. Content is never moved.
    pub async fn update(
        &self,
        requester: Option<&AuthenticatedUser>,
        file_id: Uuid,
        patch: FilePatch,
    ) -> Result<FileRecord> {
        let record = self.find(file_id).await?;
        self.authorize(requester, &record, Operation::Update)?;

        let patch = FilePatch {
            filename: patch.filename.as_deref().map(sanitize_filename),
            shareable: patch.shareable,
        };
        if patch.is_empty() {
            return Ok(record);
        }

        let updated = self
            .guarded("metadata update", self.metadata.update(file_id, &patch))
            .await?
            .ok_or(FileError::NotFound)?;

        info!(
            "File updated: id={}, filename_changed={}, shareable={:?}",
            updated.id,
            patch.filename.is_some(),
            patch.shareable
        );

        Ok(updated)
    }

    /// Remove content, then metadata.
    ///
    /// Content already missing on disk counts as removed, and a row already removed
    /// by a concurrent delete counts as deleted.
    pub async fn delete(&self, requester: Option<&AuthenticatedUser>, file_id: Uuid) -> Result<()> {
        let record = self.find(file_id).await?;
        self.authorize(requester, &record, Operation::Delete)?;

        let removed = self
            .guarded("content delete", self.content.delete(&record.path))
            .await?;
        if !removed {
            warn!(
                "Content already absent during delete: id={}, path={}",
                record.id, record.path
            );
        }

        match self
            .guarded("metadata delete", self.metadata.delete(file_id))
            .await
        {
            Ok(true) => {}
            Ok(false) => debug!("Metadata row already removed: id={}", file_id),
            Err(e) => {
                error!(
                    "Metadata row left pointing at removed content: id={}, path={}, error={}",
                    record.id, record.path, e
                );
                return Err(e);
            }
        }

        info!("File deleted: id={}, owner={}", record.id, record.owner_id);

        Ok(())
    }

    /// Read a file's content; anonymous requesters pass `None`.
    pub async fn fetch(
        &self,
        requester: Option<&AuthenticatedUser>,
        file_id: Uuid,
    ) -> Result<FileContent> {
        let record = self.find(file_id).await?;
        self.authorize(requester, &record, Operation::Read)?;

        let content = self
            .guarded("content read", self.content.read(&record.path))
            .await?
            .ok_or_else(|| {
                warn!(
                    "Metadata exists but content is missing: id={}, path={}",
                    record.id, record.path
                );
                FileError::ContentNotFound
            })?;

        Ok(FileContent {
            content,
            filename: record.filename,
            mime_type: record.mime_type,
        })
    }

    /// The requester's own files, filtered by a filename substring
    pub async fn list(
        &self,
        owner: &AuthenticatedUser,
        search: &str,
        pagination: &PaginationQuery,
    ) -> Result<FilePage> {
        let search = search.trim();
        let (records, total) = self
            .guarded(
                "metadata list",
                self.metadata.list_page(
                    owner.user_id,
                    search,
                    pagination.limit(),
                    pagination.offset(),
                ),
            )
            .await?;

        Ok(FilePage {
            records,
            meta: pagination.meta(total),
        })
    }
}
