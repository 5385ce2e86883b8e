//! File document types and collection access.
//!
//! Backend rows are dynamic bags (the shared-user list is a JSON column),
//! so raw rows are validated into fixed-field `FileDoc` records at this
//! boundary instead of trusting the stored shape downstream.

use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::str::FromStr;
use uuid::Uuid;

use super::category::FileType;
use crate::{Result, VaultError};

const FILE_COLUMNS: &str = "id, name, type, url, extension, size, owner, account_id, users, \
                            bucket_file_id, created_at, updated_at";

/// A validated file document.
#[derive(Debug, Clone)]
pub struct FileDoc {
    /// Unique document ID.
    pub id: String,
    /// Display name, including extension.
    pub name: String,
    /// Fixed category.
    pub file_type: FileType,
    /// Public view URL.
    pub url: String,
    /// Lowercased extension.
    pub extension: String,
    /// Size in bytes.
    pub size: i64,
    /// Owning user document ID.
    pub owner: String,
    /// Owning backend account ID.
    pub account_id: String,
    /// Emails granted read access.
    pub users: Vec<String>,
    /// Object id of the paired blob.
    pub bucket_file_id: String,
    /// Creation timestamp.
    pub created_at: String,
    /// Last update timestamp.
    pub updated_at: String,
}

/// Raw row as stored; validated into [`FileDoc`] before leaving this module.
#[derive(Debug, sqlx::FromRow)]
struct FileRow {
    id: String,
    name: String,
    #[sqlx(rename = "type")]
    file_type: String,
    url: String,
    extension: String,
    size: i64,
    owner: String,
    account_id: String,
    users: String,
    bucket_file_id: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<FileRow> for FileDoc {
    type Error = VaultError;

    fn try_from(row: FileRow) -> Result<Self> {
        let file_type = FileType::from_str(&row.file_type)
            .map_err(|e| VaultError::Validation(format!("file {}: {e}", row.id)))?;

        let users: Vec<String> = serde_json::from_str(&row.users).map_err(|e| {
            VaultError::Validation(format!("file {}: bad shared-user list: {e}", row.id))
        })?;

        Ok(FileDoc {
            id: row.id,
            name: row.name,
            file_type,
            url: row.url,
            extension: row.extension,
            size: row.size,
            owner: row.owner,
            account_id: row.account_id,
            users,
            bucket_file_id: row.bucket_file_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Data for creating a new file document.
#[derive(Debug, Clone)]
pub struct NewFileDoc {
    /// Display name, including extension.
    pub name: String,
    /// Fixed category.
    pub file_type: FileType,
    /// Public view URL.
    pub url: String,
    /// Lowercased extension.
    pub extension: String,
    /// Size in bytes.
    pub size: i64,
    /// Owning user document ID.
    pub owner: String,
    /// Owning backend account ID.
    pub account_id: String,
    /// Object id of the paired blob.
    pub bucket_file_id: String,
}

/// Sortable file fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Display name.
    Name,
    /// Size in bytes.
    Size,
    /// Creation time.
    CreatedAt,
    /// Last update time.
    UpdatedAt,
}

impl SortKey {
    fn as_column(&self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::Size => "size",
            SortKey::CreatedAt => "created_at",
            SortKey::UpdatedAt => "updated_at",
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "name" => Ok(SortKey::Name),
            "size" => Ok(SortKey::Size),
            "created_at" => Ok(SortKey::CreatedAt),
            "updated_at" => Ok(SortKey::UpdatedAt),
            _ => Err(format!("unknown sort field: {s}")),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDir {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

/// A sort specification, e.g. `created_at-desc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    /// Field to sort on.
    pub key: SortKey,
    /// Direction.
    pub dir: SortDir,
}

impl Default for Sort {
    fn default() -> Self {
        Self {
            key: SortKey::CreatedAt,
            dir: SortDir::Desc,
        }
    }
}

impl FromStr for Sort {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (key, dir) = s
            .rsplit_once('-')
            .ok_or_else(|| format!("bad sort spec: {s}"))?;
        let key = SortKey::from_str(key)?;
        let dir = match dir {
            "asc" => SortDir::Asc,
            "desc" => SortDir::Desc,
            other => return Err(format!("bad sort direction: {other}")),
        };
        Ok(Sort { key, dir })
    }
}

/// Filter for listing files.
///
/// The owner-or-shared predicate is always applied; these fields only
/// narrow the result further.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    /// Restrict to these categories (empty = all).
    pub types: Vec<FileType>,
    /// Substring match on the display name.
    pub search_text: Option<String>,
    /// Sort specification (default: creation time, descending).
    pub sort: Option<Sort>,
    /// Maximum number of results.
    pub limit: Option<i64>,
}

/// Collection access for file documents.
pub struct FileCollection<'a> {
    pool: &'a SqlitePool,
}

impl<'a> FileCollection<'a> {
    /// Create a new collection handle.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new file document.
    pub async fn create(&self, new_file: &NewFileDoc) -> Result<FileDoc> {
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            "INSERT INTO files (id, name, type, url, extension, size, owner, account_id, users, bucket_file_id)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, '[]', ?)",
        )
        .bind(&id)
        .bind(&new_file.name)
        .bind(new_file.file_type.as_str())
        .bind(&new_file.url)
        .bind(&new_file.extension)
        .bind(new_file.size)
        .bind(&new_file.owner)
        .bind(&new_file.account_id)
        .bind(&new_file.bucket_file_id)
        .execute(self.pool)
        .await
        .map_err(|e| VaultError::Database(e.to_string()))?;

        self.get_by_id(&id)
            .await?
            .ok_or_else(|| VaultError::NotFound("file".to_string()))
    }

    /// Get a file document by ID.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<FileDoc>> {
        let row = sqlx::query_as::<_, FileRow>(&format!(
            "SELECT {FILE_COLUMNS} FROM files WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| VaultError::Database(e.to_string()))?;

        row.map(FileDoc::try_from).transpose()
    }

    /// Get a file document by the paired blob's object id.
    pub async fn get_by_bucket_file_id(&self, bucket_file_id: &str) -> Result<Option<FileDoc>> {
        let row = sqlx::query_as::<_, FileRow>(&format!(
            "SELECT {FILE_COLUMNS} FROM files WHERE bucket_file_id = ?"
        ))
        .bind(bucket_file_id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| VaultError::Database(e.to_string()))?;

        row.map(FileDoc::try_from).transpose()
    }

    /// List the documents visible to a user: owned by them OR shared with
    /// their email. The compound predicate is mandatory; the filter only
    /// appends further restrictions.
    pub async fn list_visible_to(
        &self,
        user_id: &str,
        email: &str,
        filter: &ListFilter,
    ) -> Result<Vec<FileDoc>> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {FILE_COLUMNS} FROM files WHERE (owner = "
        ));
        query.push_bind(user_id);
        query.push(" OR EXISTS (SELECT 1 FROM json_each(files.users) WHERE json_each.value = ");
        query.push_bind(email);
        query.push("))");

        if !filter.types.is_empty() {
            query.push(" AND type IN (");
            let mut separated = query.separated(", ");
            for file_type in &filter.types {
                separated.push_bind(file_type.as_str());
            }
            query.push(")");
        }

        if let Some(ref search) = filter.search_text {
            query.push(" AND name LIKE ");
            query.push_bind(format!("%{search}%"));
        }

        let sort = filter.sort.unwrap_or_default();
        query.push(" ORDER BY ");
        query.push(sort.key.as_column());
        query.push(match sort.dir {
            SortDir::Asc => " ASC",
            SortDir::Desc => " DESC",
        });

        if let Some(limit) = filter.limit {
            query.push(" LIMIT ");
            query.push_bind(limit);
        }

        let rows: Vec<FileRow> = query
            .build_query_as()
            .fetch_all(self.pool)
            .await
            .map_err(|e| VaultError::Database(e.to_string()))?;

        rows.into_iter().map(FileDoc::try_from).collect()
    }

    /// List the documents owned by a user (shared-with-them excluded).
    pub async fn list_owned_by(&self, user_id: &str) -> Result<Vec<FileDoc>> {
        let rows = sqlx::query_as::<_, FileRow>(&format!(
            "SELECT {FILE_COLUMNS} FROM files WHERE owner = ?"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await
        .map_err(|e| VaultError::Database(e.to_string()))?;

        rows.into_iter().map(FileDoc::try_from).collect()
    }

    /// Update a file's display name.
    pub async fn update_name(&self, id: &str, name: &str) -> Result<Option<FileDoc>> {
        let result =
            sqlx::query("UPDATE files SET name = ?, updated_at = datetime('now') WHERE id = ?")
                .bind(name)
                .bind(id)
                .execute(self.pool)
                .await
                .map_err(|e| VaultError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_by_id(id).await
    }

    /// Replace a file's shared-email set. Whole-set replacement, so the
    /// operation is idempotent.
    pub async fn update_shared_users(&self, id: &str, emails: &[String]) -> Result<Option<FileDoc>> {
        let users_json = serde_json::to_string(emails)
            .map_err(|e| VaultError::Validation(e.to_string()))?;

        let result =
            sqlx::query("UPDATE files SET users = ?, updated_at = datetime('now') WHERE id = ?")
                .bind(&users_json)
                .bind(id)
                .execute(self.pool)
                .await
                .map_err(|e| VaultError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_by_id(id).await
    }

    /// Delete a file document by ID.
    ///
    /// Returns true if a document was deleted.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM files WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| VaultError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}
