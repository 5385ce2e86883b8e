//! File management for Filevault: categories, the blob bucket, the file
//! collection, the file service and storage accounting.

pub mod category;
pub mod metadata;
pub mod service;
pub mod storage;
pub mod usage;

pub use category::{FileType, ALL_TYPES, MEDIA_TYPES};
pub use metadata::{FileCollection, FileDoc, ListFilter, NewFileDoc, Sort, SortDir, SortKey};
pub use service::{DeleteOutcome, FileService, UploadRequest, DEFAULT_MAX_FILE_SIZE};
pub use storage::Bucket;
pub use usage::{TypeUsage, UsageReport, UsageService, CAPACITY_BYTES};
