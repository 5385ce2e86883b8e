//! File categories.
//!
//! Every file is classified into one fixed category from its extension.
//! The category drives filtering, routing and storage accounting. "Media"
//! is a derived group (video + audio) used for aggregation only; it is
//! never stored.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Fixed file category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// Raster and vector images.
    Image,
    /// Text and office documents.
    Document,
    /// Video files.
    Video,
    /// Audio files.
    Audio,
    /// Anything unrecognized.
    Other,
}

/// All stored categories, in accounting order.
pub const ALL_TYPES: [FileType; 5] = [
    FileType::Image,
    FileType::Document,
    FileType::Video,
    FileType::Audio,
    FileType::Other,
];

/// The derived "media" group.
pub const MEDIA_TYPES: [FileType; 2] = [FileType::Video, FileType::Audio];

const DOCUMENT_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "txt", "xls", "xlsx", "csv", "rtf", "ods", "ppt", "pptx", "odp", "md",
    "html", "htm", "epub", "pages",
];

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "svg", "webp", "heic"];

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv", "webm", "m4v", "3gp"];

const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "flac", "aac", "m4a", "wma"];

impl FileType {
    /// Convert the category to its stored string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Image => "image",
            FileType::Document => "document",
            FileType::Video => "video",
            FileType::Audio => "audio",
            FileType::Other => "other",
        }
    }

    /// Classify a filename into a category and its extension.
    ///
    /// The extension is the lowercased text after the last dot; a file
    /// without one classifies as `Other` with an empty extension.
    pub fn from_filename(filename: &str) -> (FileType, String) {
        let extension = std::path::Path::new(filename)
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_lowercase())
            .unwrap_or_default();

        let file_type = if DOCUMENT_EXTENSIONS.contains(&extension.as_str()) {
            FileType::Document
        } else if IMAGE_EXTENSIONS.contains(&extension.as_str()) {
            FileType::Image
        } else if VIDEO_EXTENSIONS.contains(&extension.as_str()) {
            FileType::Video
        } else if AUDIO_EXTENSIONS.contains(&extension.as_str()) {
            FileType::Audio
        } else {
            FileType::Other
        };

        (file_type, extension)
    }

    /// Check whether this category belongs to the media group.
    pub fn is_media(&self) -> bool {
        MEDIA_TYPES.contains(self)
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FileType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "image" => Ok(FileType::Image),
            "document" => Ok(FileType::Document),
            "video" => Ok(FileType::Video),
            "audio" => Ok(FileType::Audio),
            "other" => Ok(FileType::Other),
            _ => Err(format!("unknown file type: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_documents() {
        assert_eq!(
            FileType::from_filename("report.pdf"),
            (FileType::Document, "pdf".to_string())
        );
        assert_eq!(
            FileType::from_filename("notes.MD"),
            (FileType::Document, "md".to_string())
        );
    }

    #[test]
    fn test_classify_images() {
        assert_eq!(
            FileType::from_filename("photo.JPG"),
            (FileType::Image, "jpg".to_string())
        );
        assert_eq!(
            FileType::from_filename("icon.svg"),
            (FileType::Image, "svg".to_string())
        );
    }

    #[test]
    fn test_classify_media() {
        let (video, _) = FileType::from_filename("clip.mp4");
        let (audio, _) = FileType::from_filename("song.mp3");

        assert_eq!(video, FileType::Video);
        assert_eq!(audio, FileType::Audio);
        assert!(video.is_media());
        assert!(audio.is_media());
        assert!(!FileType::Image.is_media());
    }

    #[test]
    fn test_classify_unknown() {
        assert_eq!(
            FileType::from_filename("data.xyz"),
            (FileType::Other, "xyz".to_string())
        );
        assert_eq!(
            FileType::from_filename("no_extension"),
            (FileType::Other, String::new())
        );
        // A leading dot is a filename, not an extension
        assert_eq!(
            FileType::from_filename(".hidden"),
            (FileType::Other, String::new())
        );
    }

    #[test]
    fn test_tar_gz_uses_last_extension() {
        assert_eq!(
            FileType::from_filename("archive.tar.gz"),
            (FileType::Other, "gz".to_string())
        );
    }

    #[test]
    fn test_round_trip_strings() {
        for file_type in ALL_TYPES {
            assert_eq!(
                FileType::from_str(file_type.as_str()).unwrap(),
                file_type
            );
        }
        assert!(FileType::from_str("archive").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", FileType::Document), "document");
    }
}
