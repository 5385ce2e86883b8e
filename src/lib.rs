//! Filevault - a file storage and sharing service.
//!
//! Users sign in with emailed one-time codes, upload files into a blob
//! bucket, organize and search them by category, share read access by
//! email, and see aggregate storage usage.

pub mod auth;
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod file;
pub mod logging;
pub mod mail;
pub mod web;

pub use auth::{
    CurrentUser, Gateway, SignInOutcome, UserDirectory, VerifiedSession, SESSION_COOKIE,
};
pub use cache::RouteCache;
pub use config::Config;
pub use db::{Database, NewUser, User, UserRepository};
pub use error::{Result, VaultError};
pub use file::{
    Bucket, DeleteOutcome, FileDoc, FileService, FileType, ListFilter, UploadRequest, UsageReport,
    UsageService,
};
