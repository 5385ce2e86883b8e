//! Blob bucket for Filevault.
//!
//! Uploaded file bytes live in a flat object bucket on the local
//! filesystem. Objects are addressed by a generated UUID and sharded into
//! subdirectories by the first 2 characters of the id.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::{Result, VaultError};

/// Object bucket holding raw file bytes.
///
/// Objects are stored in a sharded directory structure:
/// ```text
/// {base_path}/
/// ├── ab/
/// │   └── ab12cd34-5678-90ab-cdef-123456789012
/// ├── cd/
/// │   └── cd90ab12-3456-7890-abcd-ef1234567890
/// └── ...
/// ```
#[derive(Debug, Clone)]
pub struct Bucket {
    /// Base directory for object storage.
    base_path: PathBuf,
}

impl Bucket {
    /// Create a new Bucket rooted at the given base path.
    ///
    /// The base directory will be created if it doesn't exist.
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path)?;

        Ok(Self { base_path })
    }

    /// Get the base path of this bucket.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Store content under a freshly generated object id.
    ///
    /// Returns the object id.
    pub fn put(&self, content: &[u8]) -> Result<String> {
        let object_id = Uuid::new_v4().to_string();
        self.put_with_id(content, &object_id)?;
        Ok(object_id)
    }

    /// Store content under a specific object id.
    pub fn put_with_id(&self, content: &[u8], object_id: &str) -> Result<()> {
        let path = self.object_path(object_id);

        // Create the shard directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&path, content)?;

        Ok(())
    }

    /// Load an object's content.
    pub fn get(&self, object_id: &str) -> Result<Vec<u8>> {
        let path = self.object_path(object_id);

        match fs::read(&path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(VaultError::NotFound(format!("object {object_id}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Delete an object.
    ///
    /// Returns true if the object was deleted, false if it didn't exist.
    pub fn delete(&self, object_id: &str) -> Result<bool> {
        let path = self.object_path(object_id);

        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Check if an object exists.
    pub fn exists(&self, object_id: &str) -> bool {
        self.object_path(object_id).exists()
    }

    /// Get the size of a stored object in bytes.
    pub fn size(&self, object_id: &str) -> Result<u64> {
        let path = self.object_path(object_id);

        match fs::metadata(&path) {
            Ok(m) => Ok(m.len()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(VaultError::NotFound(format!("object {object_id}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Get the full path for an object id: {base_path}/{shard}/{object_id}.
    fn object_path(&self, object_id: &str) -> PathBuf {
        self.base_path.join(Self::shard(object_id)).join(object_id)
    }

    /// Shard directory name: first 2 characters of the object id.
    fn shard(object_id: &str) -> &str {
        if object_id.len() >= 2 {
            &object_id[..2]
        } else {
            object_id
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_bucket() -> (TempDir, Bucket) {
        let temp_dir = TempDir::new().unwrap();
        let bucket = Bucket::new(temp_dir.path()).unwrap();
        (temp_dir, bucket)
    }

    #[test]
    fn test_new_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let bucket_path = temp_dir.path().join("bucket");

        assert!(!bucket_path.exists());

        let bucket = Bucket::new(&bucket_path).unwrap();

        assert!(bucket_path.exists());
        assert_eq!(bucket.base_path(), bucket_path);
    }

    #[test]
    fn test_put_and_get() {
        let (_temp_dir, bucket) = setup_bucket();
        let content = b"Hello, World!";

        let object_id = bucket.put(content).unwrap();

        assert!(!object_id.is_empty());
        assert_eq!(bucket.get(&object_id).unwrap(), content);
    }

    #[test]
    fn test_put_creates_shard_directory() {
        let (_temp_dir, bucket) = setup_bucket();

        let object_id = bucket.put(b"data").unwrap();

        let shard_dir = bucket.base_path().join(&object_id[..2]);
        assert!(shard_dir.is_dir());
    }

    #[test]
    fn test_ids_are_unique() {
        let (_temp_dir, bucket) = setup_bucket();

        let a = bucket.put(b"a").unwrap();
        let b = bucket.put(b"b").unwrap();

        assert_ne!(a, b);
    }

    #[test]
    fn test_get_not_found() {
        let (_temp_dir, bucket) = setup_bucket();

        let result = bucket.get("missing-object");

        assert!(matches!(result, Err(VaultError::NotFound(_))));
    }

    #[test]
    fn test_delete() {
        let (_temp_dir, bucket) = setup_bucket();

        let object_id = bucket.put(b"to delete").unwrap();
        assert!(bucket.exists(&object_id));

        assert!(bucket.delete(&object_id).unwrap());
        assert!(!bucket.exists(&object_id));

        // Deleting again reports absence, not an error
        assert!(!bucket.delete(&object_id).unwrap());
    }

    #[test]
    fn test_size() {
        let (_temp_dir, bucket) = setup_bucket();
        let content = b"Hello, World!";

        let object_id = bucket.put(content).unwrap();

        assert_eq!(bucket.size(&object_id).unwrap(), content.len() as u64);
        assert!(matches!(
            bucket.size("missing"),
            Err(VaultError::NotFound(_))
        ));
    }

    #[test]
    fn test_binary_content() {
        let (_temp_dir, bucket) = setup_bucket();

        let content: Vec<u8> = (0..=255).collect();

        let object_id = bucket.put(&content).unwrap();
        assert_eq!(bucket.get(&object_id).unwrap(), content);
    }

    #[test]
    fn test_shard() {
        assert_eq!(Bucket::shard("abcdef"), "ab");
        assert_eq!(Bucket::shard("12-345"), "12");
        assert_eq!(Bucket::shard("x"), "x");
        assert_eq!(Bucket::shard(""), "");
    }
}
