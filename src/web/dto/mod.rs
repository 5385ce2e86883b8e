//! Data transfer objects for the Web API.

mod request;
mod response;

pub use request::{
    DeleteFileRequest, ListFilesQuery, RenameFileRequest, ResendOtpRequest, SignInRequest,
    SignUpRequest, UpdateFileUsersRequest, VerifyOtpRequest,
};
pub use response::{
    ApiResponse, DeleteFileResponse, FileResponse, OtpIssuedResponse, SessionCreatedResponse,
    SignInResponse, UserResponse,
};
