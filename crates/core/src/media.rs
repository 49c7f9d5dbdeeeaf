//! Media upload validation: per-category MIME allow-lists, size ceilings,
//! filename sanitizing, and mime/extension maps.
//!
//! Both the MIME check and the size check run before any storage write; a
//! rejected upload never touches the storage collaborator.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// Upload categories. `Profile` replaces the member's profile picture;
/// the rest create attachment rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaCategory {
    Profile,
    Photos,
    Documents,
    Audio,
}

impl MediaCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaCategory::Profile => "profile",
            MediaCategory::Photos => "photos",
            MediaCategory::Documents => "documents",
            MediaCategory::Audio => "audio",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "profile" => Some(MediaCategory::Profile),
            "photos" => Some(MediaCategory::Photos),
            "documents" => Some(MediaCategory::Documents),
            "audio" => Some(MediaCategory::Audio),
            _ => None,
        }
    }

    /// Per-category upload size ceiling in bytes.
    pub fn size_limit(self) -> u64 {
        match self {
            MediaCategory::Profile => 4 * 1024 * 1024,
            MediaCategory::Photos => 8 * 1024 * 1024,
            MediaCategory::Documents => 16 * 1024 * 1024,
            MediaCategory::Audio => 32 * 1024 * 1024,
        }
    }

    /// MIME types accepted for this category.
    pub fn allowed_mime_types(self) -> &'static [&'static str] {
        match self {
            MediaCategory::Profile | MediaCategory::Photos => IMAGE_MIME_TYPES,
            MediaCategory::Documents => DOCUMENT_MIME_TYPES,
            MediaCategory::Audio => AUDIO_MIME_TYPES,
        }
    }
}

const IMAGE_MIME_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

const DOCUMENT_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

const AUDIO_MIME_TYPES: &[&str] = &["audio/mpeg", "audio/wav", "audio/webm", "audio/ogg"];

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate an upload's MIME type and size against its category.
pub fn validate_upload(
    category: MediaCategory,
    mime_type: &str,
    size_bytes: u64,
) -> Result<(), CoreError> {
    if !category.allowed_mime_types().contains(&mime_type) {
        return Err(CoreError::Validation(format!(
            "Invalid {} type '{mime_type}'. Allowed: {}",
            category.as_str(),
            category.allowed_mime_types().join(", ")
        )));
    }
    let limit = category.size_limit();
    if size_bytes > limit {
        return Err(CoreError::Validation(format!(
            "File too large. Maximum size for {} is {}MB",
            category.as_str(),
            limit / (1024 * 1024)
        )));
    }
    Ok(())
}

/// Strip path-traversal attempts and special characters from an uploaded
/// filename; capped at 100 characters.
pub fn sanitize_file_name(file_name: &str) -> String {
    file_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .take(100)
        .collect()
}

// ---------------------------------------------------------------------------
// Mime / extension maps
// ---------------------------------------------------------------------------

/// File extension (with dot) for a known MIME type; empty for unknown.
pub fn extension_for_mime(mime_type: &str) -> &'static str {
    match mime_type {
        "image/jpeg" => ".jpg",
        "image/png" => ".png",
        "image/gif" => ".gif",
        "image/webp" => ".webp",
        "application/pdf" => ".pdf",
        "application/msword" => ".doc",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => ".docx",
        "audio/mpeg" => ".mp3",
        "audio/wav" => ".wav",
        "audio/webm" => ".webm",
        "audio/ogg" => ".ogg",
        _ => "",
    }
}

/// MIME type for a stored path, inferred from its extension.
pub fn mime_for_path(path: &str) -> &'static str {
    let ext = path
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "webm" => "audio/webm",
        "ogg" => "audio/ogg",
        _ => "application/octet-stream",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_uploads_accept_only_images() {
        assert!(validate_upload(MediaCategory::Photos, "image/png", 100).is_ok());
        assert!(validate_upload(MediaCategory::Profile, "image/webp", 100).is_ok());
        assert!(validate_upload(MediaCategory::Photos, "application/pdf", 100).is_err());
        assert!(validate_upload(MediaCategory::Profile, "audio/mpeg", 100).is_err());
    }

    #[test]
    fn test_document_and_audio_allow_lists() {
        assert!(validate_upload(MediaCategory::Documents, "application/pdf", 100).is_ok());
        assert!(validate_upload(MediaCategory::Documents, "image/png", 100).is_err());
        assert!(validate_upload(MediaCategory::Audio, "audio/ogg", 100).is_ok());
        assert!(validate_upload(MediaCategory::Audio, "video/mp4", 100).is_err());
    }

    #[test]
    fn test_size_ceilings() {
        let limit = MediaCategory::Profile.size_limit();
        assert!(validate_upload(MediaCategory::Profile, "image/png", limit).is_ok());
        assert!(validate_upload(MediaCategory::Profile, "image/png", limit + 1).is_err());

        assert_eq!(MediaCategory::Profile.size_limit(), 4 * 1024 * 1024);
        assert_eq!(MediaCategory::Photos.size_limit(), 8 * 1024 * 1024);
        assert_eq!(MediaCategory::Documents.size_limit(), 16 * 1024 * 1024);
        assert_eq!(MediaCategory::Audio.size_limit(), 32 * 1024 * 1024);
    }

    #[test]
    fn test_category_round_trip() {
        for c in [
            MediaCategory::Profile,
            MediaCategory::Photos,
            MediaCategory::Documents,
            MediaCategory::Audio,
        ] {
            assert_eq!(MediaCategory::parse(c.as_str()), Some(c));
        }
        assert_eq!(MediaCategory::parse("video"), None);
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("grandma.jpg"), "grandma.jpg");
        assert_eq!(sanitize_file_name("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(sanitize_file_name("family photo (1).png"), "family_photo__1_.png");
        assert_eq!(sanitize_file_name(&"x".repeat(300)).len(), 100);
    }

    #[test]
    fn test_mime_extension_round_trip() {
        for mime in IMAGE_MIME_TYPES
            .iter()
            .chain(DOCUMENT_MIME_TYPES)
            .chain(AUDIO_MIME_TYPES)
        {
            let ext = extension_for_mime(mime);
            assert!(!ext.is_empty(), "no extension for {mime}");
            assert_eq!(mime_for_path(&format!("a/b/file{ext}")), *mime);
        }
        assert_eq!(extension_for_mime("video/mp4"), "");
        assert_eq!(mime_for_path("file.xyz"), "application/octet-stream");
        assert_eq!(mime_for_path("noext"), "application/octet-stream");
    }
}
