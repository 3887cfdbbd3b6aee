use std::fs::{self, Metadata};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};

use crate::error_handling::types::StorageError;
use crate::storage::filename::CAPTURE_EXTENSION;
use crate::storage::storage_trait::CaptureStorage;
use crate::storage::types::Capture;

/// Captures stored as plain files in a single directory.
///
/// The directory is created on first use, not at construction, so a store can be built
/// before the target volume is mounted.
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        let base_path = base_path.as_ref().to_path_buf();
        info!("FileStorage configured at {}", base_path.display());
        Self { base_path }
    }

    fn capture_path(&self, filename: &str) -> PathBuf {
        self.base_path.join(filename)
    }

    fn ensure_dir(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.base_path).map_err(|e| {
            error!(
                "Failed to create captures dir {}: {}",
                self.base_path.display(),
                e
            );
            StorageError::io("create directory", e)
        })
    }

    /// Loads one directory entry. `Ok(None)` means the entry is not a capture, or it was
    /// removed after the directory was enumerated.
    fn read_capture(&self, filename: String) -> Result<Option<Capture>, StorageError> {
        let path = self.capture_path(&filename);

        let metadata = match fs::metadata(&path) {
            Ok(m) => m,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("{} vanished during listing", path.display());
                return Ok(None);
            }
            Err(e) => {
                error!("Stat failed {}: {}", path.display(), e);
                return Err(StorageError::io("stat", e));
            }
        };
        if !metadata.is_file() {
            return Ok(None);
        }

        let content = match fs::read(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("{} vanished during listing", path.display());
                return Ok(None);
            }
            Err(e) => {
                error!("Read failed {}: {}", path.display(), e);
                return Err(StorageError::io("read", e));
            }
        };

        let created_at = creation_time(&metadata).map_err(|e| {
            error!("No timestamp available for {}: {}", path.display(), e);
            StorageError::io("stat", e)
        })?;

        Ok(Some(Capture {
            filename,
            size_bytes: content.len() as u64,
            created_at,
            content,
        }))
    }
}

/// Birth time where the platform records one, modification time otherwise.
fn creation_time(metadata: &Metadata) -> std::io::Result<DateTime<Utc>> {
    let time = metadata.created().or_else(|_| metadata.modified())?;
    Ok(DateTime::<Utc>::from(time))
}

impl CaptureStorage for FileStorage {
    fn write(&self, filename: &str, content: &[u8]) -> Result<(), StorageError> {
        self.ensure_dir()?;
        let path = self.capture_path(filename);
        fs::write(&path, content).map_err(|e| {
            error!("Write failed {}: {}", path.display(), e);
            StorageError::io("write", e)
        })?;
        debug!("Wrote {} byte(s) to {}", content.len(), path.display());
        Ok(())
    }

    fn list(&self) -> Result<Vec<Capture>, StorageError> {
        self.ensure_dir()?;
        let entries = fs::read_dir(&self.base_path).map_err(|e| {
            error!(
                "Failed to read captures dir {}: {}",
                self.base_path.display(),
                e
            );
            StorageError::io("list", e)
        })?;

        let mut captures = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                error!("Dir entry error: {}", e);
                StorageError::io("list", e)
            })?;
            let filename = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(raw) => {
                    warn!("Skipping non UTF-8 entry {:?}", raw);
                    continue;
                }
            };
            if !filename.ends_with(CAPTURE_EXTENSION) {
                continue;
            }
            if let Some(capture) = self.read_capture(filename)? {
                captures.push(capture);
            }
        }

        // Stable sort: equal timestamps stay in read_dir order.
        captures.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        debug!(
            "Loaded {} capture(s) from {}",
            captures.len(),
            self.base_path.display()
        );
        Ok(captures)
    }

    fn delete(&self, filename: &str) -> Result<(), StorageError> {
        let path = self.capture_path(filename);
        match fs::metadata(&path) {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(StorageError::NotFound),
            Err(e) => {
                error!("Stat failed {}: {}", path.display(), e);
                return Err(StorageError::io("stat", e));
            }
        }

        fs::remove_file(&path).map_err(|e| {
            error!("Delete failed {}: {}", path.display(), e);
            StorageError::io("delete", e)
        })?;
        info!("Removed {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_directory_created_lazily() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("nested").join("captures");
        let storage = FileStorage::new(&root);
        assert!(!root.exists());

        assert!(storage.list().unwrap().is_empty());
        assert!(root.is_dir());
        // second call on an existing directory
        assert!(storage.list().unwrap().is_empty());
    }

    #[test]
    fn test_write_then_list() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path().join("captures"));
        storage.write("img_01012024000000.png", b"hello").unwrap();

        let all = storage.list().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].filename, "img_01012024000000.png");
        assert_eq!(all[0].size_bytes, 5);
        assert_eq!(all[0].content, b"hello");
    }

    #[test]
    fn test_write_overwrites_silently() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path());
        storage.write("img_01012024000000.png", b"first").unwrap();
        storage.write("img_01012024000000.png", b"second!").unwrap();

        let all = storage.list().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].content, b"second!");
        assert_eq!(all[0].size_bytes, 7);
    }

    #[test]
    fn test_list_skips_other_entries() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path());
        storage.write("a.png", b"png").unwrap();
        fs::write(dir.path().join("notes.txt"), b"text").unwrap();
        fs::create_dir(dir.path().join("folder.png")).unwrap();

        let names: Vec<_> = storage
            .list()
            .unwrap()
            .into_iter()
            .map(|c| c.filename)
            .collect();
        assert_eq!(names, vec!["a.png".to_string()]);
    }

    #[test]
    fn test_list_newest_first() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path());
        storage.write("older.png", b"1").unwrap();
        // filesystem timestamps can be tick-granular
        std::thread::sleep(Duration::from_millis(1100));
        storage.write("newer.png", b"2").unwrap();

        let all = storage.list().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].filename, "newer.png");
        assert_eq!(all[1].filename, "older.png");
        assert!(all[0].created_at > all[1].created_at);
    }

    #[test]
    fn test_delete_removes_file() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path());
        storage.write("gone.png", b"x").unwrap();

        storage.delete("gone.png").unwrap();
        assert!(!dir.path().join("gone.png").exists());
        assert!(storage.list().unwrap().is_empty());
    }

    #[test]
    fn test_delete_missing_is_not_found_every_time() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path());
        assert!(matches!(
            storage.delete("never.png"),
            Err(StorageError::NotFound)
        ));

        storage.write("once.png", b"x").unwrap();
        storage.delete("once.png").unwrap();
        assert!(matches!(
            storage.delete("once.png"),
            Err(StorageError::NotFound)
        ));
    }

    #[test]
    fn test_delete_without_directory_is_not_found() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path().join("missing"));
        assert!(matches!(
            storage.delete("img.png"),
            Err(StorageError::NotFound)
        ));
        assert!(!dir.path().join("missing").exists());
    }

    #[test]
    fn test_removal_failure_is_io_error() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path());
        // exists, but remove_file cannot remove a directory
        fs::create_dir(dir.path().join("stuck.png")).unwrap();
        assert!(matches!(
            storage.delete("stuck.png"),
            Err(StorageError::Io {
                operation: "delete",
                ..
            })
        ));
    }

    #[test]
    fn test_write_failure_is_io_error() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, b"not a directory").unwrap();
        let storage = FileStorage::new(blocker.join("captures"));
        assert!(matches!(
            storage.write("a.png", b"x"),
            Err(StorageError::Io { .. })
        ));
    }
}
