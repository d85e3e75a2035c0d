use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::MetadataStore;
use crate::features::files::models::{FilePatch, FileRecord};
use crate::modules::storage::StoreError;

/// In-memory metadata store with failure injection
#[derive(Default)]
pub struct InMemoryMetadataStore {
    rows: Mutex<HashMap<Uuid, FileRecord>>,
    fail_inserts: AtomicBool,
    fail_deletes: AtomicBool,
    lose_delete_race: AtomicBool,
    insert_stall: Mutex<Option<Duration>>,
}

impl InMemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// Commit inserts, then hold the call open before acknowledging
    pub fn stall_inserts_after_commit(&self, stall: Duration) {
        *self.insert_stall.lock().unwrap() = Some(stall);
    }

    /// Make the next delete behave as if a concurrent caller removed the row first
    pub fn lose_next_delete_race(&self) {
        self.lose_delete_race.store(true, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    /// Insert a row directly, bypassing the orchestrator
    pub fn seed(&self, record: FileRecord) {
        self.rows.lock().unwrap().insert(record.id, record);
    }

    pub fn snapshot(&self, id: Uuid) -> Option<FileRecord> {
        self.rows.lock().unwrap().get(&id).cloned()
    }

    fn injected(operation: &str) -> StoreError {
        StoreError::Io(std::io::Error::other(format!("injected {} failure", operation)))
    }
}

#[async_trait]
impl MetadataStore for InMemoryMetadataStore {
    async fn insert(&self, record: &FileRecord) -> Result<FileRecord, StoreError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(Self::injected("insert"));
        }
        self.rows
            .lock()
            .unwrap()
            .insert(record.id, record.clone());

        let stall = *self.insert_stall.lock().unwrap();
        if let Some(stall) = stall {
            tokio::time::sleep(stall).await;
        }
        Ok(record.clone())
    }

    async fn get(&self, id: Uuid) -> Result<Option<FileRecord>, StoreError> {
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }

    async fn update(&self, id: Uuid, patch: &FilePatch) -> Result<Option<FileRecord>, StoreError> {
        let mut rows = self.rows.lock().unwrap();
        Ok(rows.get_mut(&id).map(|record| {
            apply_patch(patch, record, Utc::now());
            record.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(Self::injected("delete"));
        }
        let removed = self.rows.lock().unwrap().remove(&id).is_some();
        if self.lose_delete_race.swap(false, Ordering::SeqCst) {
            return Ok(false);
        }
        Ok(removed)
    }

    async fn list_page(
        &self,
        owner_id: Uuid,
        search: &str,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<FileRecord>, i64), StoreError> {
        let mut matching: Vec<FileRecord> = self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.owner_id == owner_id)
            .filter(|r| search.is_empty() || r.filename.contains(search))
            .cloned()
            .collect();

        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));

        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect();

        Ok((page, total))
    }
}

/// Apply the present fields of `patch`, as the SQL `COALESCE` update does
fn apply_patch(patch: &FilePatch, record: &mut FileRecord, now: DateTime<Utc>) {
    if let Some(filename) = &patch.filename {
        record.filename = filename.clone();
    }
    if let Some(shareable) = patch.shareable {
        record.shareable = shareable.into();
    }
    record.updated_at = now;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::files::models::Shareability;

    fn record() -> FileRecord {
        let now = Utc::now();
        FileRecord {
            id: Uuid::new_v4(),
            filename: "notes.txt".to_string(),
            path: "/storage/owner/id.txt".to_string(),
            size: 5,
            mime_type: "text/plain; charset=utf-8".to_string(),
            shareable: Shareability::Private,
            owner_id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_patch_only_touches_present_fields() {
        let mut file = record();
        let original = file.clone();
        let later = original.updated_at + chrono::Duration::seconds(5);

        let share = FilePatch {
            filename: None,
            shareable: Some(true),
        };
        apply_patch(&share, &mut file, later);

        assert_eq!(file.filename, original.filename);
        assert_eq!(file.shareable, Shareability::Shareable);
        assert_eq!(file.path, original.path);
        assert_eq!(file.updated_at, later);

        let rename = FilePatch {
            filename: Some("renamed.txt".to_string()),
            shareable: None,
        };
        apply_patch(&rename, &mut file, later);

        assert_eq!(file.filename, "renamed.txt");
        assert_eq!(file.shareable, Shareability::Shareable);
    }
}
