use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use super::{ContentStore, StoreError};

/// In-memory content store with failure injection
#[derive(Default)]
pub struct InMemoryContentStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
    fail_deletes: AtomicBool,
    read_delay: Mutex<Option<Duration>>,
}

impl InMemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub fn delay_reads(&self, delay: Duration) {
        *self.read_delay.lock().unwrap() = Some(delay);
    }

    /// Number of write attempts that reached the store
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.blobs.lock().unwrap().len()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.blobs.lock().unwrap().contains_key(path)
    }

    /// Drop content behind the metadata store's back
    pub fn remove_out_of_band(&self, path: &str) {
        self.blobs.lock().unwrap().remove(path);
    }

    fn injected(operation: &str) -> StoreError {
        StoreError::Io(std::io::Error::other(format!("injected {} failure", operation)))
    }
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn write(
        &self,
        owner_id: Uuid,
        filename: &str,
        content: &[u8],
    ) -> Result<String, StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::injected("write"));
        }

        let path = format!("/memory/{}/{}", owner_id, filename);
        self.blobs
            .lock()
            .unwrap()
            .insert(path.clone(), content.to_vec());
        Ok(path)
    }

    async fn read(&self, path: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let delay = *self.read_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.blobs.lock().unwrap().get(path).cloned())
    }

    async fn delete(&self, path: &str) -> Result<bool, StoreError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(Self::injected("delete"));
        }
        Ok(self.blobs.lock().unwrap().remove(path).is_some())
    }
}
