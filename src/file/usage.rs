//! Storage accounting.
//!
//! Folds a user's owned files (shared-with-them files are excluded, which
//! is deliberately narrower than the list visibility rule) into per-category
//! byte totals and most-recent-update timestamps, plus a grand total and a
//! fixed display capacity.

use serde::Serialize;

use crate::auth::{CurrentUser, Gateway, UserDirectory};
use crate::{Result, VaultError};

use super::category::FileType;
use super::metadata::{FileCollection, FileDoc};

/// Fixed display capacity: 2 GiB. Purely informational, never enforced.
pub const CAPACITY_BYTES: i64 = 2 * 1024 * 1024 * 1024;

/// Usage of one category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TypeUsage {
    /// Total bytes in this category.
    pub size: i64,
    /// Most recent update timestamp among the category's files.
    pub latest_date: Option<String>,
}

impl TypeUsage {
    fn record(&mut self, file: &FileDoc) {
        self.size += file.size;

        // Strict comparison keeps the first-seen date on ties
        let newer = match self.latest_date.as_deref() {
            Some(latest) => file.updated_at.as_str() > latest,
            None => true,
        };
        if newer {
            self.latest_date = Some(file.updated_at.clone());
        }
    }
}

/// Aggregated usage across all categories.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UsageReport {
    /// Image usage.
    pub image: TypeUsage,
    /// Document usage.
    pub document: TypeUsage,
    /// Video usage.
    pub video: TypeUsage,
    /// Audio usage.
    pub audio: TypeUsage,
    /// Usage of unclassified files.
    pub other: TypeUsage,
    /// Grand total in bytes.
    pub used: i64,
    /// Fixed display capacity in bytes.
    pub capacity: i64,
}

impl UsageReport {
    /// An empty report with the capacity constant filled in.
    pub fn empty() -> Self {
        Self {
            capacity: CAPACITY_BYTES,
            ..Default::default()
        }
    }

    /// Fold one file into the report.
    pub fn record(&mut self, file: &FileDoc) {
        self.bucket_mut(file.file_type).record(file);
        self.used += file.size;
    }

    /// Usage of one category.
    pub fn for_type(&self, file_type: FileType) -> &TypeUsage {
        match file_type {
            FileType::Image => &self.image,
            FileType::Document => &self.document,
            FileType::Video => &self.video,
            FileType::Audio => &self.audio,
            FileType::Other => &self.other,
        }
    }

    fn bucket_mut(&mut self, file_type: FileType) -> &mut TypeUsage {
        match file_type {
            FileType::Image => &mut self.image,
            FileType::Document => &mut self.document,
            FileType::Video => &mut self.video,
            FileType::Audio => &mut self.audio,
            FileType::Other => &mut self.other,
        }
    }

    /// Combine a subset of categories: sizes summed, the latest of their
    /// latest-dates. Used for derived groups such as media (audio + video).
    pub fn combined(&self, types: &[FileType]) -> TypeUsage {
        let mut combined = TypeUsage::default();

        for file_type in types {
            let usage = self.for_type(*file_type);
            combined.size += usage.size;

            if let Some(ref date) = usage.latest_date {
                let newer = match combined.latest_date.as_deref() {
                    Some(latest) => date.as_str() > latest,
                    None => true,
                };
                if newer {
                    combined.latest_date = Some(date.clone());
                }
            }
        }

        combined
    }
}

/// Storage accounting over the session gateway.
pub struct UsageService<'a> {
    gateway: &'a Gateway<'a>,
}

impl<'a> UsageService<'a> {
    /// Create a new usage service.
    pub fn new(gateway: &'a Gateway<'a>) -> Self {
        Self { gateway }
    }

    /// Aggregate usage over the caller's owned files.
    pub async fn total_usage(&self, secret: Option<&str>) -> Result<UsageReport> {
        let directory = UserDirectory::new(self.gateway);
        let user = match directory.current_user(secret).await {
            CurrentUser::Found(user) => user,
            _ => return Err(VaultError::NotAuthenticated),
        };

        // Queries run through the session-scoped handle
        let handle = self
            .gateway
            .session(secret)
            .ok_or(VaultError::NotAuthenticated)?;

        let files = FileCollection::new(handle.pool())
            .list_owned_by(&user.id)
            .await?;

        let mut report = UsageReport::empty();
        for file in &files {
            report.record(file);
        }

        Ok(report)
    }

    /// Usage restricted to an explicit subset of categories.
    pub async fn usage_for_types(
        &self,
        secret: Option<&str>,
        types: &[FileType],
    ) -> Result<TypeUsage> {
        let report = self.total_usage(secret).await?;
        Ok(report.combined(types))
    }
}
