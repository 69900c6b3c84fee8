//! Canonical object key layout.
//!
//! One uploaded video per analysis, keyed by owner and analysis ID so
//! per-user deletion stays a prefix operation.

use fsight_models::AnalysisId;

use crate::error::{StorageError, StorageResult};

/// Map an uploaded video's MIME type to a file extension.
pub fn extension_for_mime(mime_type: &str) -> StorageResult<&'static str> {
    match mime_type {
        "video/mp4" => Ok("mp4"),
        "video/quicktime" => Ok("mov"),
        "video/webm" => Ok("webm"),
        "video/x-matroska" => Ok("mkv"),
        other => Err(StorageError::UnsupportedMediaType(other.to_string())),
    }
}

/// Object key for an analysis video: `videos/{user_id}/{analysis_id}.{ext}`.
pub fn video_key(user_id: &str, analysis_id: &AnalysisId, mime_type: &str) -> StorageResult<String> {
    let ext = extension_for_mime(mime_type)?;
    Ok(format!("videos/{}/{}.{}", user_id, analysis_id, ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_mapping() {
        assert_eq!(extension_for_mime("video/mp4").unwrap(), "mp4");
        assert_eq!(extension_for_mime("video/quicktime").unwrap(), "mov");
        assert!(matches!(
            extension_for_mime("application/pdf"),
            Err(StorageError::UnsupportedMediaType(_))
        ));
    }

    #[test]
    fn test_video_key_layout() {
        let id = AnalysisId::from_string("abc-123");
        let key = video_key("user-9", &id, "video/mp4").unwrap();
        assert_eq!(key, "videos/user-9/abc-123.mp4");
    }
}
