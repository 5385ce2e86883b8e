//! Request handlers for the Web API.

mod auth;
mod file;
mod usage;

pub use auth::{me, resend_otp, sign_in, sign_out, sign_up, verify_otp};
pub use file::{delete_file, list_files, rename_file, update_file_users, upload_file, view_file};
pub use usage::{usage_media, usage_summary};

use crate::cache::RouteCache;
use crate::config::Config;
use crate::db::Database;
use crate::file::Bucket;

/// Application state shared across handlers.
///
/// Components are constructed per request from these parts; the state holds
/// no per-request context.
pub struct AppState {
    /// Database handle.
    pub db: Database,
    /// Blob bucket.
    pub bucket: Bucket,
    /// Route-level response cache.
    pub cache: RouteCache,
    /// Application configuration.
    pub config: Config,
}

impl AppState {
    /// Create a new application state.
    pub fn new(db: Database, bucket: Bucket, config: Config) -> Self {
        Self {
            db,
            bucket,
            cache: RouteCache::new(),
            config,
        }
    }
}
