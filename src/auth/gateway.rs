//! Session gateway.
//!
//! The gateway is the single place that turns "who is calling" into a
//! capability handle. It hands out either an admin handle (full access to
//! the collections, the bucket and the account service) or a session-scoped
//! handle derived from the cookie-stored session secret. Handles are
//! constructed per call and passed into the components explicitly; there is
//! no process-wide client.

use axum_extra::extract::cookie::{Cookie, SameSite};
use sqlx::SqlitePool;

use super::session::SessionRepository;
use crate::db::Database;
use crate::file::Bucket;
use crate::{Result, VaultError};

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "filevault-session";

/// Session cookie max-age in seconds (30 days).
pub const SESSION_COOKIE_MAX_AGE_SECS: i64 = 30 * 24 * 60 * 60;

/// Handle factory over the embedded backend.
pub struct Gateway<'a> {
    db: &'a Database,
    bucket: &'a Bucket,
}

impl<'a> Gateway<'a> {
    /// Create a gateway over the given backend.
    pub fn new(db: &'a Database, bucket: &'a Bucket) -> Self {
        Self { db, bucket }
    }

    /// Construct the admin handle.
    ///
    /// Construction always succeeds; calls made through the handle can
    /// still fail later.
    pub fn admin(&self) -> AdminHandle<'a> {
        AdminHandle {
            db: self.db,
            bucket: self.bucket,
        }
    }

    /// Construct a session-scoped handle from a cookie-stored secret.
    ///
    /// Returns `None` when no secret is present - an explicit "no session"
    /// signal, not an error. The secret is only checked against the backend
    /// when the handle is used.
    pub fn session(&self, secret: Option<&str>) -> Option<SessionHandle<'a>> {
        let secret = secret?;
        if secret.is_empty() {
            return None;
        }

        Some(SessionHandle {
            db: self.db,
            secret: secret.to_string(),
        })
    }
}

/// Unrestricted backend handle.
pub struct AdminHandle<'a> {
    db: &'a Database,
    bucket: &'a Bucket,
}

impl<'a> AdminHandle<'a> {
    /// Access the document collections.
    pub fn pool(&self) -> &'a SqlitePool {
        self.db.pool()
    }

    /// Access the object bucket.
    pub fn bucket(&self) -> &'a Bucket {
        self.bucket
    }
}

/// Backend handle scoped to one authenticated session.
///
/// Exposes the collections and the account behind the session; never the
/// bucket, and never any server-side credential.
pub struct SessionHandle<'a> {
    db: &'a Database,
    secret: String,
}

impl<'a> SessionHandle<'a> {
    /// Access the document collections.
    pub fn pool(&self) -> &'a SqlitePool {
        self.db.pool()
    }

    /// Resolve the account id behind this session.
    ///
    /// Returns `None` when the secret does not match an active session.
    pub async fn account_id(&self) -> Result<Option<String>> {
        let repo = SessionRepository::new(self.db.pool());
        let session = repo.get_active(&self.secret).await?;
        Ok(session.map(|s| s.account_id))
    }

    /// Delete the backend session behind this handle (sign-out).
    pub async fn delete_session(&self) -> Result<()> {
        let repo = SessionRepository::new(self.db.pool());
        if !repo.delete_by_secret(&self.secret).await? {
            return Err(VaultError::NotFound("session".to_string()));
        }
        Ok(())
    }
}

/// Build the session cookie carrying a freshly issued secret.
pub fn session_cookie(secret: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, secret))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::seconds(SESSION_COOKIE_MAX_AGE_SECS))
        .build()
}

/// Build an expired session cookie that clears the client-side value.
pub fn expired_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::ZERO)
        .build()
}
