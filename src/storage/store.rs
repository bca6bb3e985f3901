//! File Store
//!
//! Maps PIN namespaces onto directories under a storage root.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;

use super::names::{base_name, validate_file_name, validate_pin};
use crate::error::{Error, Result};

/// A stored file as reported by listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileInfo {
    pub name: String,
    pub size: u64,
}

/// Filesystem-backed store rooted at a single directory
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
    strict_pins: bool,
}

impl FileStore {
    /// Create a store rooted at `root`
    pub fn new(root: impl Into<PathBuf>, strict_pins: bool) -> Self {
        Self {
            root: root.into(),
            strict_pins,
        }
    }

    /// Create the storage root if it does not exist yet
    pub async fn init(&self) -> Result<()> {
        if fs::metadata(&self.root).await.is_err() {
            tracing::info!("Creating storage directory: {}", self.root.display());
            fs::create_dir_all(&self.root).await?;
        }
        Ok(())
    }

    /// Storage root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory for a PIN, without touching the filesystem
    pub fn pin_dir(&self, pin: &str) -> Result<PathBuf> {
        validate_pin(pin, self.strict_pins)?;
        Ok(self.root.join(pin))
    }

    /// Directory for a PIN, created on first reference
    pub async fn ensure_pin_dir(&self, pin: &str) -> Result<PathBuf> {
        let dir = self.pin_dir(pin)?;
        if fs::metadata(&dir).await.is_err() {
            tracing::info!(pin, "Creating new directory for PIN");
            fs::create_dir_all(&dir).await?;
        }
        Ok(dir)
    }

    /// List regular files stored under a PIN.
    ///
    /// Entries whose metadata cannot be read are skipped, as are uploads
    /// still in flight. Order follows directory enumeration.
    pub async fn list(&self, pin: &str) -> Result<Vec<FileInfo>> {
        let dir = self.ensure_pin_dir(pin).await?;
        let mut entries = fs::read_dir(&dir).await?;
        let mut files = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            let metadata = match entry.metadata().await {
                Ok(m) => m,
                Err(e) => {
                    tracing::warn!(pin, file = %name, "Error getting info for file: {}", e);
                    continue;
                }
            };
            if metadata.is_dir() || is_part_name(&name) {
                continue;
            }
            files.push(FileInfo {
                name,
                size: metadata.len(),
            });
        }

        Ok(files)
    }

    /// Start writing an upload under a PIN.
    ///
    /// Only the base name of `raw_name` is used. Bytes go to a hidden part
    /// file next to the target; the target is replaced only by
    /// [`Upload::finish`].
    pub async fn create(&self, pin: &str, raw_name: &str) -> Result<Upload> {
        let dir = self.ensure_pin_dir(pin).await?;
        let name = base_name(raw_name)?;
        if is_part_name(&name) {
            return Err(Error::InvalidFileName(raw_name.to_string()));
        }

        let target = dir.join(&name);
        let seq = UPLOAD_SEQ.fetch_add(1, Ordering::Relaxed);
        let part = dir.join(format!(".{}.{}-{}{}", name, std::process::id(), seq, PART_SUFFIX));
        let file = File::create(&part).await?;

        Ok(Upload {
            name,
            target,
            part,
            file,
            written: 0,
            committed: false,
        })
    }

    /// Write a complete upload in one call
    #[cfg(test)]
    pub(crate) async fn save(&self, pin: &str, raw_name: &str, data: &[u8]) -> Result<FileInfo> {
        let mut upload = self.create(pin, raw_name).await?;
        upload.write_chunk(data).await?;
        upload.finish().await
    }

    /// Open a stored file for reading, returning it with its size.
    ///
    /// Any PIN or name that cannot address a stored file reports
    /// [`Error::NotFound`].
    pub async fn open(&self, pin: &str, name: &str) -> Result<(File, u64)> {
        let dir = self.pin_dir(pin).map_err(|_| Error::NotFound)?;
        validate_file_name(name).map_err(|_| Error::NotFound)?;
        if is_part_name(name) {
            return Err(Error::NotFound);
        }
        let path = dir.join(name);

        let metadata = match fs::metadata(&path).await {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(Error::NotFound),
            Err(e) => return Err(e.into()),
        };
        if !metadata.is_file() {
            return Err(Error::NotFound);
        }

        let file = File::open(&path).await?;
        Ok((file, metadata.len()))
    }
}

/// In-flight uploads are hidden dot files ending in this suffix
const PART_SUFFIX: &str = ".part";

static UPLOAD_SEQ: AtomicU64 = AtomicU64::new(0);

fn is_part_name(name: &str) -> bool {
    name.starts_with('.') && name.ends_with(PART_SUFFIX)
}

/// An upload in progress.
///
/// Dropping an upload that was not finished removes its part file and
/// leaves any previously stored file untouched.
#[derive(Debug)]
pub struct Upload {
    name: String,
    target: PathBuf,
    part: PathBuf,
    file: File,
    written: u64,
    committed: bool,
}

impl Upload {
    /// Stored base name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append a chunk of the upload body
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> Result<()> {
        self.file.write_all(chunk).await?;
        self.written += chunk.len() as u64;
        Ok(())
    }

    /// Flush the part file and move it over the target name
    pub async fn finish(mut self) -> Result<FileInfo> {
        self.file.flush().await?;
        fs::rename(&self.part, &self.target).await?;
        self.committed = true;

        Ok(FileInfo {
            name: std::mem::take(&mut self.name),
            size: self.written,
        })
    }
}

impl Drop for Upload {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        if let Err(e) = std::fs::remove_file(&self.part) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("Failed to remove partial upload {}: {}", self.part.display(), e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn test_list_creates_pin_dir() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path(), false);

        let files = store.list("123456").await.unwrap();
        assert!(files.is_empty());
        assert!(dir.path().join("123456").is_dir());
    }

    #[tokio::test]
    async fn test_init_creates_root() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("nested").join("storage");
        let store = FileStore::new(&root, false);

        store.init().await.unwrap();
        assert!(root.is_dir());
        assert_eq!(store.root(), root.as_path());
    }

    #[tokio::test]
    async fn test_save_strips_path_components() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path(), false);

        let info = store.save("123456", "a/../../etc/passwd", b"root").await.unwrap();
        assert_eq!(info.name, "passwd");
        assert!(dir.path().join("123456").join("passwd").is_file());
        assert!(!dir.path().join("etc").exists());
    }

    #[tokio::test]
    async fn test_save_overwrites() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path(), false);

        store.save("42", "notes.txt", b"first version").await.unwrap();
        store.save("42", "notes.txt", b"v2").await.unwrap();

        let files = store.list("42").await.unwrap();
        assert_eq!(files, vec![FileInfo { name: "notes.txt".into(), size: 2 }]);
    }

    #[tokio::test]
    async fn test_list_skips_directories() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path(), false);

        store.save("42", "a.bin", &[0u8; 10]).await.unwrap();
        std::fs::create_dir(dir.path().join("42").join("sub")).unwrap();

        let files = store.list("42").await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].size, 10);
    }

    #[tokio::test]
    async fn test_chunked_upload() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path(), false);

        let mut upload = store.create("7", "log.txt").await.unwrap();
        assert_eq!(upload.name(), "log.txt");
        upload.write_chunk(b"hel").await.unwrap();
        upload.write_chunk(b"lo").await.unwrap();

        // in-flight bytes are not visible under the target name
        assert!(!dir.path().join("7").join("log.txt").exists());
        assert!(store.list("7").await.unwrap().is_empty());

        let info = upload.finish().await.unwrap();
        assert_eq!(info.size, 5);
        assert_eq!(std::fs::read(dir.path().join("7").join("log.txt")).unwrap(), b"hello");
        assert_eq!(std::fs::read_dir(dir.path().join("7")).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_abandoned_upload_keeps_previous_file() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path(), false);
        store.save("7", "keep.txt", b"original contents").await.unwrap();

        let mut upload = store.create("7", "keep.txt").await.unwrap();
        upload.write_chunk(b"partial").await.unwrap();
        drop(upload);

        let pin_dir = dir.path().join("7");
        assert_eq!(std::fs::read(pin_dir.join("keep.txt")).unwrap(), b"original contents");
        assert_eq!(std::fs::read_dir(&pin_dir).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_finish_onto_directory_fails_cleanly() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path(), false);
        let pin_dir = dir.path().join("7");
        std::fs::create_dir_all(pin_dir.join("taken")).unwrap();

        let mut upload = store.create("7", "taken").await.unwrap();
        upload.write_chunk(b"data").await.unwrap();
        assert!(matches!(upload.finish().await, Err(Error::Io(_))));

        assert!(pin_dir.join("taken").is_dir());
        assert_eq!(std::fs::read_dir(&pin_dir).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_part_names_rejected() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path(), false);

        assert!(matches!(
            store.create("7", ".x.1-0.part").await,
            Err(Error::InvalidFileName(_))
        ));
        assert!(matches!(store.open("7", ".x.1-0.part").await, Err(Error::NotFound)));
    }

    #[tokio::test]
    async fn test_open_roundtrip() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path(), false);
        store.save("123456", "report.txt", b"hello").await.unwrap();

        let (mut file, size) = store.open("123456", "report.txt").await.unwrap();
        let mut buf = Vec::new();
        file.read_to_end(&mut buf).await.unwrap();
        assert_eq!(size, 5);
        assert_eq!(buf, b"hello");
    }

    #[tokio::test]
    async fn test_open_missing() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path(), false);

        assert!(matches!(store.open("123456", "nope.txt").await, Err(Error::NotFound)));
        assert!(matches!(store.open("123456", "..").await, Err(Error::NotFound)));
        assert!(matches!(store.open("..", "report.txt").await, Err(Error::NotFound)));

        std::fs::create_dir_all(dir.path().join("123456").join("folder")).unwrap();
        assert!(matches!(store.open("123456", "folder").await, Err(Error::NotFound)));
    }

    #[tokio::test]
    async fn test_strict_pins() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path(), true);

        assert!(matches!(store.list("abc").await, Err(Error::InvalidPin(_))));
        assert!(!dir.path().join("abc").exists());
        assert!(store.list("1234567").await.is_ok());
    }
}
