//! Local filesystem content store
//!
//! Content is stored one directory per owner:
//! ```text
//! {root}/
//! ├── 6f1c…-owner-a/
//! │   ├── 0b7e…-file.txt
//! │   └── 93d2…-file.png
//! └── a41e…-owner-b/
//!     └── 55aa…-file.pdf
//! ```
//! Filenames are generated by the caller and never taken from client input.

use std::io;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, warn};
use uuid::Uuid;

use super::StoreError;

/// Byte storage addressed by server-assigned paths
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Write `content` as `filename` under the owner's directory, returning its path.
    async fn write(
        &self,
        owner_id: Uuid,
        filename: &str,
        content: &[u8],
    ) -> Result<String, StoreError>;

    /// Read the content at `path`; `None` when nothing exists there.
    async fn read(&self, path: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Remove the content at `path`; `false` when it was already absent.
    async fn delete(&self, path: &str) -> Result<bool, StoreError>;
}

/// Content store rooted at a local directory
#[derive(Debug, Clone)]
pub struct LocalContentStore {
    root: PathBuf,
}

impl LocalContentStore {
    /// Create the store, creating and canonicalizing `root`.
    pub fn new(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        let root = root.canonicalize()?;

        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a stored path back to the filesystem, refusing anything outside the root
    fn resolve(&self, path: &str) -> Result<PathBuf, StoreError> {
        let candidate = PathBuf::from(path);
        let escapes = candidate
            .components()
            .any(|c| matches!(c, Component::ParentDir));

        if escapes || !candidate.starts_with(&self.root) {
            return Err(StoreError::OutsideRoot(path.to_string()));
        }

        Ok(candidate)
    }

    /// A bare file name: no separators, not `.` or `..`
    fn is_plain_name(filename: &str) -> bool {
        let mut components = Path::new(filename).components();
        matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        )
    }
}

/// Temporary file removed on drop unless it was renamed into place.
///
/// Covers failed writes and writes cancelled by a timeout mid-flight.
struct PartialFile {
    path: PathBuf,
    committed: bool,
}

impl PartialFile {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            committed: false,
        }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn committed(mut self) {
        self.committed = true;
    }
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Partial content removed: path={}", self.path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                "Failed to remove partial content: path={}, error={}",
                self.path.display(),
                e
            ),
        }
    }
}

#[async_trait]
impl ContentStore for LocalContentStore {
    async fn write(
        &self,
        owner_id: Uuid,
        filename: &str,
        content: &[u8],
    ) -> Result<String, StoreError> {
        if !Self::is_plain_name(filename) {
            return Err(StoreError::OutsideRoot(filename.to_string()));
        }

        let directory = self.root.join(owner_id.to_string());
        tokio::fs::create_dir_all(&directory).await?;

        let file_path = directory.join(filename);

        // Write beside the target and rename so readers never see a partial file
        let partial = PartialFile::new(directory.join(format!(".{}.part", filename)));
        tokio::fs::write(partial.path(), content).await?;
        tokio::fs::rename(partial.path(), &file_path).await?;
        partial.committed();

        debug!(
            "Content written: path={}, bytes={}",
            file_path.display(),
            content.len()
        );

        Ok(file_path.to_string_lossy().into_owned())
    }

    async fn read(&self, path: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let file_path = self.resolve(path)?;

        match tokio::fs::read(&file_path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, path: &str) -> Result<bool, StoreError> {
        let file_path = self.resolve(path)?;

        match tokio::fs::remove_file(&file_path).await {
            Ok(()) => {
                debug!("Content removed: path={}", file_path.display());
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, LocalContentStore) {
        let dir = TempDir::new().unwrap();
        let store = LocalContentStore::new(dir.path()).unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_write_uses_owner_directory() {
        let (_dir, store) = setup();
        let owner = Uuid::new_v4();

        let path = store.write(owner, "abc.txt", b"hello").await.unwrap();

        let expected = store.root().join(owner.to_string()).join("abc.txt");
        assert_eq!(PathBuf::from(&path), expected);
        assert_eq!(std::fs::read(&expected).unwrap(), b"hello");
    }

    #[tokio::test]
    async fn test_write_leaves_no_partial_file() {
        let (_dir, store) = setup();
        let owner = Uuid::new_v4();

        store.write(owner, "abc.txt", b"hello").await.unwrap();

        let entries: Vec<_> = std::fs::read_dir(store.root().join(owner.to_string()))
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("abc.txt")]);
    }

    #[test]
    fn test_uncommitted_partial_file_is_removed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".abc.txt.part");
        std::fs::write(&path, b"half").unwrap();

        drop(PartialFile::new(path.clone()));
        assert!(!path.exists());

        // Nothing written yet is not an error
        drop(PartialFile::new(dir.path().join(".never.part")));
    }

    #[test]
    fn test_committed_partial_file_is_kept() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("kept.txt");
        std::fs::write(&path, b"whole").unwrap();

        PartialFile::new(path.clone()).committed();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_cancelled_write_leaves_no_partial_file() {
        let (_dir, store) = setup();
        let owner = Uuid::new_v4();
        let content = vec![7u8; 8 * 1024 * 1024];

        // Cancel the write on its first pending poll
        let _ = tokio::time::timeout(
            std::time::Duration::ZERO,
            store.write(owner, "big.bin", &content),
        )
        .await;

        let owner_dir = store.root().join(owner.to_string());
        if owner_dir.exists() {
            let leftovers: Vec<_> = std::fs::read_dir(&owner_dir)
                .unwrap()
                .map(|e| e.unwrap().file_name())
                .filter(|name| name.to_string_lossy().ends_with(".part"))
                .collect();
            assert!(leftovers.is_empty(), "left {leftovers:?}");
        }
    }

    #[tokio::test]
    async fn test_read_round_trip_and_missing() {
        let (_dir, store) = setup();
        let owner = Uuid::new_v4();

        let path = store.write(owner, "data.bin", &[0, 1, 2]).await.unwrap();
        assert_eq!(store.read(&path).await.unwrap(), Some(vec![0, 1, 2]));

        let missing = store.root().join("nope.bin");
        assert_eq!(
            store.read(&missing.to_string_lossy()).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (_dir, store) = setup();
        let path = store.write(Uuid::new_v4(), "x.txt", b"x").await.unwrap();

        assert!(store.delete(&path).await.unwrap());
        assert!(!store.delete(&path).await.unwrap());
        assert_eq!(store.read(&path).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_paths_outside_root_are_refused() {
        let (_dir, store) = setup();
        let outside = TempDir::new().unwrap();
        let victim = outside.path().join("victim.txt");
        std::fs::write(&victim, b"keep me").unwrap();

        let victim_path = victim.to_string_lossy().into_owned();
        assert!(matches!(
            store.delete(&victim_path).await,
            Err(StoreError::OutsideRoot(_))
        ));
        assert!(matches!(
            store.read(&victim_path).await,
            Err(StoreError::OutsideRoot(_))
        ));

        let traversal = format!("{}/../escape.txt", store.root().display());
        assert!(matches!(
            store.read(&traversal).await,
            Err(StoreError::OutsideRoot(_))
        ));
        assert!(victim.exists());
    }

    #[tokio::test]
    async fn test_write_rejects_non_plain_names() {
        let (_dir, store) = setup();
        let owner = Uuid::new_v4();

        for name in ["../x.txt", "a/b.txt", "..", ""] {
            assert!(
                store.write(owner, name, b"x").await.is_err(),
                "accepted {name:?}"
            );
        }
    }
}
