//! User repository for Filevault.
//!
//! This module provides CRUD operations for user documents.

use sqlx::SqlitePool;
use uuid::Uuid;

use super::user::{NewUser, User};
use crate::{Result, VaultError};

const USER_COLUMNS: &str =
    "id, full_name, email, avatar, account_id, used_storage, created_at, updated_at";

/// Repository for user document operations.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new UserRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new user document.
    ///
    /// Returns the created user with the assigned ID.
    pub async fn create(&self, new_user: &NewUser) -> Result<User> {
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            "INSERT INTO users (id, full_name, email, avatar, account_id, used_storage)
             VALUES (?, ?, ?, ?, ?, 0)",
        )
        .bind(&id)
        .bind(&new_user.full_name)
        .bind(&new_user.email)
        .bind(&new_user.avatar)
        .bind(&new_user.account_id)
        .execute(self.pool)
        .await
        .map_err(|e| VaultError::Database(e.to_string()))?;

        self.get_by_id(&id)
            .await?
            .ok_or_else(|| VaultError::NotFound("user".to_string()))
    }

    /// Get a user by document ID.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<User>> {
        let result = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| VaultError::Database(e.to_string()))?;

        Ok(result)
    }

    /// Get a user by exact email match.
    ///
    /// Returns the first match; uniqueness is not enforced beyond that.
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let result = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ? LIMIT 1"
        ))
        .bind(email)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| VaultError::Database(e.to_string()))?;

        Ok(result)
    }

    /// Get a user by backend account identifier.
    pub async fn get_by_account_id(&self, account_id: &str) -> Result<Option<User>> {
        let result = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE account_id = ? LIMIT 1"
        ))
        .bind(account_id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| VaultError::Database(e.to_string()))?;

        Ok(result)
    }
}
