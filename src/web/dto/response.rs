//! Response DTOs for the Web API.

use serde::Serialize;

use crate::db::User;
use crate::file::FileDoc;

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Response for operations that issued a one-time code.
#[derive(Debug, Serialize)]
pub struct OtpIssuedResponse {
    /// Account identifier to verify against.
    pub account_id: String,
}

/// Sign-in response.
///
/// A missing user is reported in-band with a distinct shape rather than an
/// error status.
#[derive(Debug, Serialize)]
pub struct SignInResponse {
    /// Account identifier when the code was sent.
    pub account_id: Option<String>,
    /// Set to a description when no user exists for the email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Verification response.
#[derive(Debug, Serialize)]
pub struct SessionCreatedResponse {
    /// Backend session identifier.
    pub session_id: String,
}

/// Current user information.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    /// User document ID.
    pub id: String,
    /// Full display name.
    pub full_name: String,
    /// Email address.
    pub email: String,
    /// Avatar URL.
    pub avatar: String,
    /// Backend account identifier.
    pub account_id: String,
    /// Creation timestamp.
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name,
            email: user.email,
            avatar: user.avatar,
            account_id: user.account_id,
            created_at: user.created_at,
        }
    }
}

/// File document in responses.
#[derive(Debug, Serialize)]
pub struct FileResponse {
    /// Document ID.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Category.
    #[serde(rename = "type")]
    pub file_type: String,
    /// Public view URL.
    pub url: String,
    /// Extension.
    pub extension: String,
    /// Size in bytes.
    pub size: i64,
    /// Owning user document ID.
    pub owner: String,
    /// Owning account identifier.
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

impl From<FileDoc> for FileResponse {
    fn from(doc: FileDoc) -> Self {
        Self {
            id: doc.id,
            name: doc.name,
            file_type: doc.file_type.as_str().to_string(),
            url: doc.url,
            extension: doc.extension,
            size: doc.size,
            owner: doc.owner,
            account_id: doc.account_id,
            users: doc.users,
            bucket_file_id: doc.bucket_file_id,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }
    }
}

/// Delete response.
#[derive(Debug, Serialize)]
pub struct DeleteFileResponse {
    /// Status marker.
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::FileType;

    #[test]
    fn test_file_response_serializes_type_key() {
        let response = FileResponse {
            id: "f1".to_string(),
            name: "report.pdf".to_string(),
            file_type: FileType::Document.as_str().to_string(),
            url: "http://localhost/files/b1/view".to_string(),
            extension: "pdf".to_string(),
            size: 42,
            owner: "u1".to_string(),
            account_id: "acc-1".to_string(),
            users: vec!["b@example.com".to_string()],
            bucket_file_id: "b1".to_string(),
            created_at: "2024-01-01 00:00:00".to_string(),
            updated_at: "2024-01-01 00:00:00".to_string(),
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["type"], "document");
        assert_eq!(json["size"], 42);
    }

    #[test]
    fn test_sign_in_response_omits_absent_error() {
        let ok = SignInResponse {
            account_id: Some("acc-1".to_string()),
            error: None,
        };
        let json = serde_json::to_string(&ok).unwrap();
        assert!(!json.contains("error"));

        let missing = SignInResponse {
            account_id: None,
            error: Some("user not found".to_string()),
        };
        let json = serde_json::to_value(&missing).unwrap();
        assert_eq!(json["account_id"], serde_json::Value::Null);
        assert_eq!(json["error"], "user not found");
    }
}
