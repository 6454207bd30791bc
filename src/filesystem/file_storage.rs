//! Manages the stored bytes of uploaded samples.
//!
//! Files are content addressed: `<base_save_path>/<first two hex chars>/<sha256>`.

use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info};
use tokio::fs;

#[derive(Clone, Debug)]
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    /// * `base_path` - Root directory, usually [base_save_path][crate::configuration::config::Config#structfield.base_save_path]
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        FileStorage {
            base_path: base_path.into(),
        }
    }

    /// Location of the content with the given sha256
    pub fn path_of(&self, sha256: &str) -> PathBuf {
        let prefix = sha256.get(..2).unwrap_or("00");
        self.base_path.join(prefix).join(sha256)
    }

    /// Writes `content` unless the same content is already stored and returns its location.
    /// * `sha256` - Hash of `content`, lower case hex
    /// * `content` - The bytes of the file
    pub async fn store(&self, sha256: &str, content: &[u8]) -> io::Result<String> {
        let path = self.path_of(sha256);
        if fs::try_exists(&path).await? {
            debug!("Content {} already stored at {}.", sha256, path.display());
        } else {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).await?;
            }
            fs::write(&path, content).await?;
            info!(
                "Stored {} bytes with sha256 {} at {}.",
                content.len(),
                sha256,
                path.display()
            );
        }
        Ok(path.display().to_string())
    }

    /// Reads back a stored file.
    /// * `location` - Path as returned by [FileStorage::store]
    pub async fn read(&self, location: &str) -> io::Result<Vec<u8>> {
        fs::read(Path::new(location)).await
    }
}

#[cfg(test)]
mod tests {
    use crate::filesystem::file_storage::FileStorage;
    use crate::helpers::hash::hash_bytes;

    #[actix_rt::test]
    async fn store_and_read_back() {
        let dir = tempfile::tempdir().expect("temp dir");
        let storage = FileStorage::new(dir.path());
        let content = b"MZ\x90\x00sample";
        let sha256 = hash_bytes(content).sha256;

        let location = storage.store(&sha256, content).await.expect("stored");
        assert!(location.ends_with(&sha256));
        assert!(location.contains(&sha256[..2]));
        assert_eq!(storage.read(&location).await.expect("read"), content.to_vec());
    }

    #[actix_rt::test]
    async fn storing_twice_keeps_one_copy() {
        let dir = tempfile::tempdir().expect("temp dir");
        let storage = FileStorage::new(dir.path());
        let sha256 = hash_bytes(b"same").sha256;
        let first = storage.store(&sha256, b"same").await.expect("stored");
        let second = storage.store(&sha256, b"same").await.expect("stored");
        assert_eq!(first, second);
    }

    #[actix_rt::test]
    async fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let storage = FileStorage::new(dir.path());
        let location = storage.path_of(&"a".repeat(64)).display().to_string();
        assert!(storage.read(&location).await.is_err());
    }
}
