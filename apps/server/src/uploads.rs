//! Product photo storage.
//!
//! Photos are written to the uploads directory as `<uuid>.<ext>` and
//! referenced from products by their public path, `/uploads/<file>`.

use std::path::Path;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::ApiError;

/// URL prefix the uploads directory is served under.
pub const PUBLIC_PREFIX: &str = "/uploads";

/// Upper bound for a request carrying a photo.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "bmp"];

/// Lower-cased image extension of `file_name`, if it has an allowed one.
pub fn image_extension(file_name: &str) -> Option<String> {
    let ext = Path::new(file_name).extension()?.to_str()?.to_ascii_lowercase();
    ALLOWED_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

/// Writes an uploaded photo and returns its public path.
pub async fn save_photo(dir: &Path, original_name: &str, bytes: &[u8]) -> Result<String, ApiError> {
    let ext = image_extension(original_name).ok_or_else(|| {
        ApiError::bad_request(format!(
            "photo must be one of: {}",
            ALLOWED_EXTENSIONS.join(", ")
        ))
    })?;

    let file_name = format!("{}.{}", Uuid::new_v4(), ext);

    tokio::fs::create_dir_all(dir)
        .await
        .map_err(ApiError::internal)?;
    tokio::fs::write(dir.join(&file_name), bytes)
        .await
        .map_err(ApiError::internal)?;

    debug!(file = %file_name, size = bytes.len(), "Photo stored");
    Ok(format!("{}/{}", PUBLIC_PREFIX, file_name))
}

/// Deletes a stored photo. Failures are logged, never returned.
///
/// Paths outside the uploads directory are ignored.
pub async fn remove_photo(dir: &Path, public_path: &str) {
    let Some(file_name) = public_path
        .strip_prefix(PUBLIC_PREFIX)
        .and_then(|rest| rest.strip_prefix('/'))
    else {
        return;
    };
    if file_name.is_empty() || file_name.contains('/') || file_name.contains("..") {
        return;
    }

    match tokio::fs::remove_file(dir.join(file_name)).await {
        Ok(()) => debug!(file = %file_name, "Photo removed"),
        Err(e) => warn!(file = %file_name, error = %e, "Could not remove photo"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_extension() {
        assert_eq!(image_extension("kopi.PNG").as_deref(), Some("png"));
        assert_eq!(image_extension("a.b.jpeg").as_deref(), Some("jpeg"));
        assert_eq!(image_extension("script.sh"), None);
        assert_eq!(image_extension("noext"), None);
    }

    #[tokio::test]
    async fn test_save_and_remove() {
        let dir = tempfile::tempdir().unwrap();

        let path = save_photo(dir.path(), "kopi.png", b"\x89PNG").await.unwrap();
        assert!(path.starts_with("/uploads/"));
        assert!(path.ends_with(".png"));

        let file = dir.path().join(path.trim_start_matches("/uploads/"));
        assert!(file.exists());

        remove_photo(dir.path(), &path).await;
        assert!(!file.exists());
    }

    #[tokio::test]
    async fn test_rejects_non_images() {
        let dir = tempfile::tempdir().unwrap();
        let err = save_photo(dir.path(), "notes.txt", b"hi").await.unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_remove_ignores_foreign_paths() {
        let dir = tempfile::tempdir().unwrap();
        let keep = dir.path().join("keep.png");
        std::fs::write(&keep, b"x").unwrap();

        remove_photo(dir.path(), "/etc/passwd").await;
        remove_photo(dir.path(), "/uploads/../keep.png").await;
        assert!(keep.exists());
    }
}
