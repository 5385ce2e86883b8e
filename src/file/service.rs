//! File service for Filevault.
//!
//! High-level file operations: upload with a compensating blob delete,
//! visibility-scoped listing, rename, share-list replacement, delete and
//! access-checked download. Mutations invalidate the caller-supplied route
//! path after they commit.

use tracing::{info, warn};
use url::Url;

use crate::auth::{CurrentUser, Gateway, UserDirectory};
use crate::cache::RouteCache;
use crate::db::User;
use crate::{Result, VaultError};

use super::category::FileType;
use super::metadata::{FileCollection, FileDoc, ListFilter, NewFileDoc};

/// Default maximum upload size (50 MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// Request data for a file upload.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Original filename.
    pub filename: String,
    /// File content.
    pub content: Vec<u8>,
    /// Owning user document ID.
    pub owner_id: String,
    /// Owning backend account ID.
    pub account_id: String,
    /// Route path to invalidate after the upload commits.
    pub path: String,
}

/// Outcome of a delete operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Document removed; blob removal attempted afterwards.
    Deleted,
    /// No document with that ID existed; nothing was touched.
    DocumentMissing,
}

/// File service over the session gateway.
pub struct FileService<'a> {
    gateway: &'a Gateway<'a>,
    cache: &'a RouteCache,
    public_base_url: String,
    max_file_size: u64,
}

impl<'a> FileService<'a> {
    /// Create a new file service.
    pub fn new(gateway: &'a Gateway<'a>, cache: &'a RouteCache) -> Self {
        Self {
            gateway,
            cache,
            public_base_url: "http://localhost:8600/api/files".to_string(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }

    /// Set the base URL used to build public view URLs.
    pub fn with_public_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.public_base_url = base_url.into();
        self
    }

    /// Set a custom maximum upload size.
    pub fn with_max_file_size(mut self, max_size: u64) -> Self {
        self.max_file_size = max_size;
        self
    }

    /// Build the public view URL for an object id.
    fn view_url(&self, bucket_file_id: &str) -> Result<String> {
        let base = Url::parse(&format!("{}/", self.public_base_url.trim_end_matches('/')))
            .map_err(|e| VaultError::Config(format!("bad public base URL: {e}")))?;
        let url = base
            .join(&format!("{bucket_file_id}/view"))
            .map_err(|e| VaultError::Config(format!("bad public base URL: {e}")))?;
        Ok(url.to_string())
    }

    /// Resolve the current user or fail with `NotAuthenticated`.
    async fn require_user(&self, secret: Option<&str>) -> Result<User> {
        let directory = UserDirectory::new(self.gateway);
        match directory.current_user(secret).await {
            CurrentUser::Found(user) => Ok(user),
            _ => Err(VaultError::NotAuthenticated),
        }
    }

    /// Verify the caller's account owns the file.
    ///
    /// The account id attached to the request must match both the caller's
    /// account and the file's owning account; the check is advisory,
    /// performed here before any backend mutation.
    fn check_ownership(user: &User, file: &FileDoc, account_id: &str) -> Result<()> {
        if user.account_id != account_id || file.account_id != account_id {
            return Err(VaultError::NotOwner);
        }
        Ok(())
    }

    /// Upload a file: blob first, then the metadata document.
    ///
    /// If document creation fails the just-written blob is deleted before
    /// the error propagates, so this path never leaves an orphaned blob.
    pub async fn upload(&self, request: &UploadRequest) -> Result<FileDoc> {
        if request.content.len() as u64 > self.max_file_size {
            let max_mb = self.max_file_size / 1024 / 1024;
            return Err(VaultError::Validation(format!(
                "file is too large (max {max_mb} MB)"
            )));
        }
        if request.filename.trim().is_empty() {
            return Err(VaultError::Validation("filename is required".to_string()));
        }

        let admin = self.gateway.admin();

        let bucket_file_id = admin.bucket().put(&request.content)?;
        let (file_type, extension) = FileType::from_filename(&request.filename);

        let new_doc = NewFileDoc {
            name: request.filename.clone(),
            file_type,
            url: self.view_url(&bucket_file_id)?,
            extension,
            size: request.content.len() as i64,
            owner: request.owner_id.clone(),
            account_id: request.account_id.clone(),
            bucket_file_id: bucket_file_id.clone(),
        };

        let doc = match FileCollection::new(admin.pool()).create(&new_doc).await {
            Ok(doc) => doc,
            Err(e) => {
                // Compensating action: remove the blob before propagating
                if let Err(cleanup) = admin.bucket().delete(&bucket_file_id) {
                    warn!(
                        bucket_file_id = %bucket_file_id,
                        "Failed to remove blob after document creation failure: {cleanup}"
                    );
                }
                return Err(e);
            }
        };

        self.cache.invalidate(&request.path);
        info!(file_id = %doc.id, name = %doc.name, size = doc.size, "File uploaded");

        Ok(doc)
    }

    /// List the files visible to the caller.
    ///
    /// The owner-or-shared predicate always applies; the filter only
    /// narrows the result.
    pub async fn list(&self, secret: Option<&str>, filter: &ListFilter) -> Result<Vec<FileDoc>> {
        let user = self.require_user(secret).await?;

        FileCollection::new(self.gateway.admin().pool())
            .list_visible_to(&user.id, &user.email, filter)
            .await
    }

    /// Rename a file, reassembling the full name as `name.extension`.
    pub async fn rename(
        &self,
        secret: Option<&str>,
        file_id: &str,
        name: &str,
        extension: &str,
        account_id: &str,
        path: &str,
    ) -> Result<FileDoc> {
        let user = self.require_user(secret).await?;
        let collection = FileCollection::new(self.gateway.admin().pool());

        let file = collection
            .get_by_id(file_id)
            .await?
            .ok_or_else(|| VaultError::NotFound("file".to_string()))?;
        Self::check_ownership(&user, &file, account_id)?;

        let new_name = format!("{name}.{extension}");
        let updated = collection
            .update_name(file_id, &new_name)
            .await?
            .ok_or_else(|| VaultError::NotFound("file".to_string()))?;

        self.cache.invalidate(path);
        info!(file_id = %file_id, name = %new_name, "File renamed");

        Ok(updated)
    }

    /// Replace a file's shared-email set with the supplied set.
    pub async fn update_shared_users(
        &self,
        secret: Option<&str>,
        file_id: &str,
        emails: &[String],
        account_id: &str,
        path: &str,
    ) -> Result<FileDoc> {
        let user = self.require_user(secret).await?;
        let collection = FileCollection::new(self.gateway.admin().pool());

        let file = collection
            .get_by_id(file_id)
            .await?
            .ok_or_else(|| VaultError::NotFound("file".to_string()))?;
        Self::check_ownership(&user, &file, account_id)?;

        let updated = collection
            .update_shared_users(file_id, emails)
            .await?
            .ok_or_else(|| VaultError::NotFound("file".to_string()))?;

        self.cache.invalidate(path);
        info!(file_id = %file_id, shared = emails.len(), "Shared-user list replaced");

        Ok(updated)
    }

    /// Delete a file: document first, blob only on success.
    ///
    /// A blob deletion failure is logged and the outcome stays `Deleted`,
    /// leaving an orphaned blob. This mirrors upload's compensation in
    /// reverse order and without rollback; the asymmetry is intentional and
    /// flagged for product-owner confirmation rather than fixed here.
    pub async fn delete(
        &self,
        secret: Option<&str>,
        file_id: &str,
        bucket_file_id: &str,
        account_id: &str,
        path: &str,
    ) -> Result<DeleteOutcome> {
        let user = self.require_user(secret).await?;
        let admin = self.gateway.admin();
        let collection = FileCollection::new(admin.pool());

        let file = match collection.get_by_id(file_id).await? {
            Some(file) => file,
            None => return Ok(DeleteOutcome::DocumentMissing),
        };
        Self::check_ownership(&user, &file, account_id)?;

        if !collection.delete(file_id).await? {
            return Ok(DeleteOutcome::DocumentMissing);
        }

        match admin.bucket().delete(bucket_file_id) {
            Ok(_) => {}
            Err(e) => {
                warn!(
                    bucket_file_id = %bucket_file_id,
                    "Blob removal failed after document delete: {e}"
                );
            }
        }

        self.cache.invalidate(path);
        info!(file_id = %file_id, "File deleted");

        Ok(DeleteOutcome::Deleted)
    }

    /// Open a file's bytes for download.
    ///
    /// Readable by the owner and anyone on the shared-email list.
    pub async fn open(
        &self,
        secret: Option<&str>,
        bucket_file_id: &str,
    ) -> Result<(FileDoc, Vec<u8>)> {
        let user = self.require_user(secret).await?;
        let admin = self.gateway.admin();

        let file = FileCollection::new(admin.pool())
            .get_by_bucket_file_id(bucket_file_id)
            .await?
            .ok_or_else(|| VaultError::NotFound("file".to_string()))?;

        let can_read = file.owner == user.id || file.users.contains(&user.email);
        if !can_read {
            return Err(VaultError::Permission(
                "no read access to this file".to_string(),
            ));
        }

        let content = admin.bucket().get(bucket_file_id)?;
        Ok((file, content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SessionRepository;
    use crate::db::{NewUser, UserRepository};
    use crate::file::Bucket;
    use crate::Database;
    use tempfile::TempDir;

    struct Fixture {
        db: Database,
        _tmp: TempDir,
        bucket: Bucket,
        cache: RouteCache,
    }

    async fn setup() -> Fixture {
        let db = Database::open_in_memory().await.unwrap();
        let tmp = TempDir::new().unwrap();
        let bucket = Bucket::new(tmp.path()).unwrap();
        Fixture {
            db,
            _tmp: tmp,
            bucket,
            cache: RouteCache::new(),
        }
    }

    /// Create a user with an account and an active session.
    async fn signed_in_user(f: &Fixture, name: &str, email: &str, account_id: &str) -> (User, String) {
        sqlx::query("INSERT INTO accounts (id, email) VALUES (?, ?)")
            .bind(account_id)
            .bind(email)
            .execute(f.db.pool())
            .await
            .unwrap();
        let user = UserRepository::new(f.db.pool())
            .create(&NewUser::new(name, email, account_id))
            .await
            .unwrap();
        let session = SessionRepository::new(f.db.pool())
            .create(account_id)
            .await
            .unwrap();
        (user, session.secret)
    }

    fn upload_request(user: &User, filename: &str, content: &[u8]) -> UploadRequest {
        UploadRequest {
            filename: filename.to_string(),
            content: content.to_vec(),
            owner_id: user.id.clone(),
            account_id: user.account_id.clone(),
            path: "/documents".to_string(),
        }
    }

    #[tokio::test]
    async fn test_upload_creates_blob_and_document() {
        let f = setup().await;
        let gateway = Gateway::new(&f.db, &f.bucket);
        let (user, _secret) = signed_in_user(&f, "Ada", "ada@example.com", "acc-1").await;
        let service = FileService::new(&gateway, &f.cache);

        let doc = service
            .upload(&upload_request(&user, "report.pdf", b"hello pdf"))
            .await
            .unwrap();

        assert_eq!(doc.name, "report.pdf");
        assert_eq!(doc.file_type, FileType::Document);
        assert_eq!(doc.size, 9);
        assert_eq!(doc.owner, user.id);
        assert!(doc.url.contains(&doc.bucket_file_id));
        assert!(doc.url.ends_with("/view"));
        assert!(f.bucket.exists(&doc.bucket_file_id));
    }

    #[tokio::test]
    async fn test_upload_too_large_rejected() {
        let f = setup().await;
        let gateway = Gateway::new(&f.db, &f.bucket);
        let (user, _secret) = signed_in_user(&f, "Ada", "ada@example.com", "acc-1").await;
        let service = FileService::new(&gateway, &f.cache).with_max_file_size(8);

        let result = service
            .upload(&upload_request(&user, "big.bin", &[0u8; 16]))
            .await;

        assert!(matches!(result, Err(VaultError::Validation(_))));
    }

    #[tokio::test]
    async fn test_upload_compensates_on_document_failure() {
        let f = setup().await;
        let gateway = Gateway::new(&f.db, &f.bucket);
        let (user, _secret) = signed_in_user(&f, "Ada", "ada@example.com", "acc-1").await;
        let service = FileService::new(&gateway, &f.cache);

        // Force document creation to fail
        sqlx::query("DROP TABLE files")
            .execute(f.db.pool())
            .await
            .unwrap();

        let result = service
            .upload(&upload_request(&user, "report.pdf", b"data"))
            .await;
        assert!(matches!(result, Err(VaultError::Database(_))));

        // The compensating delete removed the blob: the bucket holds nothing
        let shards = std::fs::read_dir(f.bucket.base_path())
            .unwrap()
            .flatten()
            .flat_map(|d| std::fs::read_dir(d.path()).into_iter().flatten())
            .count();
        assert_eq!(shards, 0);
    }

    #[tokio::test]
    async fn test_list_requires_authentication() {
        let f = setup().await;
        let gateway = Gateway::new(&f.db, &f.bucket);
        let service = FileService::new(&gateway, &f.cache);

        let result = service.list(None, &ListFilter::default()).await;
        assert!(matches!(result, Err(VaultError::NotAuthenticated)));

        let result = service.list(Some("stale"), &ListFilter::default()).await;
        assert!(matches!(result, Err(VaultError::NotAuthenticated)));
    }

    #[tokio::test]
    async fn test_shared_file_flow() {
        let f = setup().await;
        let gateway = Gateway::new(&f.db, &f.bucket);
        let (owner, owner_secret) = signed_in_user(&f, "A", "a@example.com", "acc-a").await;
        let (_other, other_secret) = signed_in_user(&f, "B", "b@example.com", "acc-b").await;
        let service = FileService::new(&gateway, &f.cache);

        let doc = service
            .upload(&upload_request(&owner, "report.pdf", b"data"))
            .await
            .unwrap();

        // Not yet shared: B sees nothing
        let visible = service
            .list(Some(&other_secret), &ListFilter::default())
            .await
            .unwrap();
        assert!(visible.is_empty());

        service
            .update_shared_users(
                Some(&owner_secret),
                &doc.id,
                &["b@example.com".to_string()],
                &owner.account_id,
                "/documents",
            )
            .await
            .unwrap();

        let visible = service
            .list(Some(&other_secret), &ListFilter::default())
            .await
            .unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].name, "report.pdf");
    }

    #[tokio::test]
    async fn test_rename_by_non_owner_rejected() {
        let f = setup().await;
        let gateway = Gateway::new(&f.db, &f.bucket);
        let (owner, _owner_secret) = signed_in_user(&f, "A", "a@example.com", "acc-a").await;
        let (other, other_secret) = signed_in_user(&f, "B", "b@example.com", "acc-b").await;
        let service = FileService::new(&gateway, &f.cache);

        let doc = service
            .upload(&upload_request(&owner, "report.pdf", b"data"))
            .await
            .unwrap();

        // B claims their own account id; the file's account does not match
        let result = service
            .rename(
                Some(&other_secret),
                &doc.id,
                "stolen",
                "pdf",
                &other.account_id,
                "/documents",
            )
            .await;
        assert!(matches!(result, Err(VaultError::NotOwner)));

        // B claims A's account id; the caller's account does not match
        let result = service
            .rename(
                Some(&other_secret),
                &doc.id,
                "stolen",
                "pdf",
                &owner.account_id,
                "/documents",
            )
            .await;
        assert!(matches!(result, Err(VaultError::NotOwner)));

        // Document unchanged either way
        let unchanged = FileCollection::new(f.db.pool())
            .get_by_id(&doc.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(unchanged.name, "report.pdf");
    }

    #[tokio::test]
    async fn test_rename_reassembles_name() {
        let f = setup().await;
        let gateway = Gateway::new(&f.db, &f.bucket);
        let (owner, secret) = signed_in_user(&f, "A", "a@example.com", "acc-a").await;
        let service = FileService::new(&gateway, &f.cache);

        let doc = service
            .upload(&upload_request(&owner, "report.pdf", b"data"))
            .await
            .unwrap();

        let renamed = service
            .rename(
                Some(&secret),
                &doc.id,
                "annual-report",
                "pdf",
                &owner.account_id,
                "/documents",
            )
            .await
            .unwrap();

        assert_eq!(renamed.name, "annual-report.pdf");
    }

    #[tokio::test]
    async fn test_delete_removes_document_then_blob() {
        let f = setup().await;
        let gateway = Gateway::new(&f.db, &f.bucket);
        let (owner, secret) = signed_in_user(&f, "A", "a@example.com", "acc-a").await;
        let service = FileService::new(&gateway, &f.cache);

        let doc = service
            .upload(&upload_request(&owner, "report.pdf", b"data"))
            .await
            .unwrap();

        let outcome = service
            .delete(
                Some(&secret),
                &doc.id,
                &doc.bucket_file_id,
                &owner.account_id,
                "/documents",
            )
            .await
            .unwrap();

        assert_eq!(outcome, DeleteOutcome::Deleted);
        assert!(!f.bucket.exists(&doc.bucket_file_id));
        assert!(service
            .list(Some(&secret), &ListFilter::default())
            .await
            .unwrap()
            .is_empty());

        // Deleting again reports the missing document
        let outcome = service
            .delete(
                Some(&secret),
                &doc.id,
                &doc.bucket_file_id,
                &owner.account_id,
                "/documents",
            )
            .await
            .unwrap();
        assert_eq!(outcome, DeleteOutcome::DocumentMissing);
    }

    #[tokio::test]
    async fn test_delete_by_non_owner_rejected() {
        let f = setup().await;
        let gateway = Gateway::new(&f.db, &f.bucket);
        let (owner, _secret) = signed_in_user(&f, "A", "a@example.com", "acc-a").await;
        let (other, other_secret) = signed_in_user(&f, "B", "b@example.com", "acc-b").await;
        let service = FileService::new(&gateway, &f.cache);

        let doc = service
            .upload(&upload_request(&owner, "report.pdf", b"data"))
            .await
            .unwrap();

        let result = service
            .delete(
                Some(&other_secret),
                &doc.id,
                &doc.bucket_file_id,
                &other.account_id,
                "/documents",
            )
            .await;

        assert!(matches!(result, Err(VaultError::NotOwner)));
        assert!(f.bucket.exists(&doc.bucket_file_id));
    }

    #[tokio::test]
    async fn test_mutations_invalidate_route_cache() {
        let f = setup().await;
        let gateway = Gateway::new(&f.db, &f.bucket);
        let (owner, secret) = signed_in_user(&f, "A", "a@example.com", "acc-a").await;
        let service = FileService::new(&gateway, &f.cache);

        f.cache.put("acc-a", "/documents", "stale".to_string());
        f.cache.put("acc-b", "/documents", "stale".to_string());

        service
            .upload(&upload_request(&owner, "report.pdf", b"data"))
            .await
            .unwrap();

        assert!(f.cache.get("acc-a", "/documents").is_none());
        assert!(f.cache.get("acc-b", "/documents").is_none());

        let doc = service
            .list(Some(&secret), &ListFilter::default())
            .await
            .unwrap()
            .remove(0);

        f.cache.put("acc-a", "/documents", "stale".to_string());
        service
            .rename(
                Some(&secret),
                &doc.id,
                "renamed",
                "pdf",
                &owner.account_id,
                "/documents",
            )
            .await
            .unwrap();
        assert!(f.cache.get("acc-a", "/documents").is_none());
    }

    #[tokio::test]
    async fn test_open_checks_read_access() {
        let f = setup().await;
        let gateway = Gateway::new(&f.db, &f.bucket);
        let (owner, owner_secret) = signed_in_user(&f, "A", "a@example.com", "acc-a").await;
        let (_friend, friend_secret) = signed_in_user(&f, "B", "b@example.com", "acc-b").await;
        let (_stranger, stranger_secret) = signed_in_user(&f, "C", "c@example.com", "acc-c").await;
        let service = FileService::new(&gateway, &f.cache);

        let doc = service
            .upload(&upload_request(&owner, "report.pdf", b"secret bytes"))
            .await
            .unwrap();
        service
            .update_shared_users(
                Some(&owner_secret),
                &doc.id,
                &["b@example.com".to_string()],
                &owner.account_id,
                "/documents",
            )
            .await
            .unwrap();

        let (_, content) = service
            .open(Some(&owner_secret), &doc.bucket_file_id)
            .await
            .unwrap();
        assert_eq!(content, b"secret bytes");

        let (file, content) = service
            .open(Some(&friend_secret), &doc.bucket_file_id)
            .await
            .unwrap();
        assert_eq!(content, b"secret bytes");
        assert_eq!(file.name, "report.pdf");

        let denied = service
            .open(Some(&stranger_secret), &doc.bucket_file_id)
            .await;
        assert!(matches!(denied, Err(VaultError::Permission(_))));
    }
}
