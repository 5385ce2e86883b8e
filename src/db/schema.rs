//! Database schema and migrations for Filevault.
//!
//! This module contains all database migrations that will be applied
//! sequentially when the database is first opened or upgraded.

/// Database migrations.
///
/// Each migration is a SQL script that will be executed in order.
/// The schema_version table tracks which migrations have been applied.
pub const MIGRATIONS: &[&str] = &[
    // v1: Account primitives - accounts, email tokens, sessions
    r#"
-- Accounts keyed by email; created implicitly on first OTP issuance
CREATE TABLE accounts (
    id          TEXT PRIMARY KEY,
    email       TEXT NOT NULL UNIQUE,
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Short-lived email one-time codes; only the code hash is stored
CREATE TABLE email_tokens (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    account_id  TEXT NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
    code_hash   TEXT NOT NULL,
    expires_at  TEXT NOT NULL,
    created_at  TEXT NOT NULL DEFAULT (datetime('now')),
    used_at     TEXT
);

CREATE INDEX idx_email_tokens_account_id ON email_tokens(account_id);

-- Authenticated sessions; the secret is what the cookie carries
CREATE TABLE sessions (
    id          TEXT PRIMARY KEY,
    account_id  TEXT NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
    secret      TEXT NOT NULL UNIQUE,
    created_at  TEXT NOT NULL DEFAULT (datetime('now')),
    expires_at  TEXT NOT NULL
);

CREATE INDEX idx_sessions_account_id ON sessions(account_id);
"#,
    // v2: Users collection
    r#"
-- User documents; one per email, created on first sign-up
CREATE TABLE users (
    id            TEXT PRIMARY KEY,
    full_name     TEXT NOT NULL,
    email         TEXT NOT NULL UNIQUE,
    avatar        TEXT NOT NULL,
    account_id    TEXT NOT NULL,
    used_storage  INTEGER NOT NULL DEFAULT 0,
    created_at    TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at    TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_users_account_id ON users(account_id);
"#,
    // v3: Files collection
    r#"
-- File documents; each row is paired with a blob in the bucket
CREATE TABLE files (
    id              TEXT PRIMARY KEY,
    name            TEXT NOT NULL,
    type            TEXT NOT NULL,      -- 'image', 'document', 'video', 'audio', 'other'
    url             TEXT NOT NULL,
    extension       TEXT NOT NULL,
    size            INTEGER NOT NULL,
    owner           TEXT NOT NULL REFERENCES users(id),
    account_id      TEXT NOT NULL,
    users           TEXT NOT NULL DEFAULT '[]',  -- JSON array of shared emails
    bucket_file_id  TEXT NOT NULL UNIQUE,
    created_at      TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at      TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_files_owner ON files(owner);
CREATE INDEX idx_files_type ON files(type);
CREATE INDEX idx_files_created_at ON files(created_at);
"#,
    // v4: Mail outbox drained by an external relay
    r#"
CREATE TABLE mail_outbox (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    recipient   TEXT NOT NULL,
    subject     TEXT NOT NULL,
    body        TEXT NOT NULL,
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);
"#,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_not_empty() {
        assert!(!MIGRATIONS.is_empty());
    }

    #[test]
    fn test_first_migration_contains_account_tables() {
        let first = MIGRATIONS[0];
        assert!(first.contains("CREATE TABLE accounts"));
        assert!(first.contains("CREATE TABLE email_tokens"));
        assert!(first.contains("CREATE TABLE sessions"));
    }

    #[test]
    fn test_files_migration_has_share_column() {
        let files = MIGRATIONS[2];
        assert!(files.contains("CREATE TABLE files"));
        assert!(files.contains("users"));
        assert!(files.contains("bucket_file_id"));
    }
}
