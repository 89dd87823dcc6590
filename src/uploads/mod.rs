//! Filesystem-level storage for uploaded marker photos.
//!
//! Accepted uploads land in a single shared directory under generated
//! filenames: the sanitized original stem plus a random token, so two
//! uploads of the same file never collide. Files whose extension is outside
//! the allow-list are silently dropped rather than rejected; callers treat
//! that as "no image provided".

use std::path::{Path, PathBuf};

use geomark_common::{Error, Result};

/// Extensions accepted for upload, lowercase.
const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];

/// Filesystem manager for the upload directory.
#[derive(Debug, Clone)]
pub struct UploadStore {
    base_dir: PathBuf,
}

impl UploadStore {
    /// Create a new `UploadStore` rooted at the given directory.
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Create the upload directory if it does not exist.
    pub fn ensure_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.base_dir)?;
        Ok(())
    }

    /// Store uploaded bytes under a generated filename.
    ///
    /// Returns the stored filename on success, or `None` when the original
    /// filename's extension is not in the allow-list (the silent-drop
    /// policy). The returned name is the value persisted in `image_path`;
    /// the retrieval URL is derived by prefixing `/uploads/`.
    pub async fn save(&self, original_name: &str, data: &[u8]) -> Result<Option<String>> {
        let Some(ext) = allowed_extension(original_name) else {
            tracing::debug!("Dropping upload with disallowed name: {:?}", original_name);
            return Ok(None);
        };

        let filename = generate_filename(original_name, &ext);
        let path = self.base_dir.join(&filename);

        tokio::fs::write(&path, data).await.map_err(|e| {
            Error::internal(format!("Failed to write upload {}: {}", path.display(), e))
        })?;

        tracing::debug!("Stored upload {} ({} bytes)", filename, data.len());
        Ok(Some(filename))
    }

    /// Resolve a stored filename to its on-disk path.
    ///
    /// Returns `None` for names that escape the upload directory; stored
    /// names are single flat path segments.
    pub fn path_for(&self, filename: &str) -> Option<PathBuf> {
        if filename.is_empty()
            || filename.contains('/')
            || filename.contains('\\')
            || filename.contains("..")
        {
            return None;
        }
        Some(self.base_dir.join(filename))
    }
}

/// Return the lowercased extension if the filename carries an allowed one.
fn allowed_extension(filename: &str) -> Option<String> {
    let ext = Path::new(filename).extension()?.to_str()?.to_lowercase();
    if ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        Some(ext)
    } else {
        None
    }
}

/// Build a stored filename: sanitized stem, random token, extension.
///
/// The token replaces the original service's wall-clock suffix so that two
/// uploads of the same name within one second cannot overwrite each other.
fn generate_filename(original_name: &str, ext: &str) -> String {
    let stem = Path::new(original_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("");
    let stem = sanitize_stem(stem);
    let token = uuid::Uuid::new_v4().simple();
    format!("{}_{}.{}", stem, token, ext)
}

/// Strip a filename stem down to safe characters.
///
/// Keeps ASCII alphanumerics, dots, dashes, and underscores; everything else
/// is dropped. Runs of dots collapse to a single dot so the stored name
/// never contains `..` and stays servable through [`UploadStore::path_for`].
/// An empty result falls back to "upload".
fn sanitize_stem(stem: &str) -> String {
    let mut cleaned = String::with_capacity(stem.len());
    for c in stem.chars() {
        if c.is_ascii_alphanumeric() || matches!(c, '-' | '_') {
            cleaned.push(c);
        } else if c == '.' && !cleaned.ends_with('.') {
            cleaned.push(c);
        }
    }

    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

/// Map a stored filename to its HTTP content type by extension.
pub fn content_type_for(filename: &str) -> &'static str {
    match Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_extension_accepts_images() {
        assert_eq!(allowed_extension("photo.png").as_deref(), Some("png"));
        assert_eq!(allowed_extension("photo.JPG").as_deref(), Some("jpg"));
        assert_eq!(allowed_extension("a.b.jpeg").as_deref(), Some("jpeg"));
        assert_eq!(allowed_extension("anim.gif").as_deref(), Some("gif"));
    }

    #[test]
    fn test_allowed_extension_rejects_other() {
        assert_eq!(allowed_extension("notes.txt"), None);
        assert_eq!(allowed_extension("archive.tar.gz"), None);
        assert_eq!(allowed_extension("no_extension"), None);
        assert_eq!(allowed_extension(""), None);
    }

    #[test]
    fn test_sanitize_stem_strips_unsafe() {
        assert_eq!(sanitize_stem("my photo (1)"), "myphoto1");
        assert_eq!(sanitize_stem("../../etc/passwd"), ".etcpasswd");
        assert_eq!(sanitize_stem("safe-name_ok.v2"), "safe-name_ok.v2");
    }

    #[test]
    fn test_sanitize_stem_collapses_dot_runs() {
        assert_eq!(sanitize_stem("a..b"), "a.b");
        assert_eq!(sanitize_stem("a...b"), "a.b");
        assert!(!sanitize_stem("..hidden..name").contains(".."));
    }

    #[test]
    fn test_sanitize_stem_empty_falls_back() {
        assert_eq!(sanitize_stem(""), "upload");
        assert_eq!(sanitize_stem("漢字"), "upload");
    }

    #[test]
    fn test_generated_names_are_servable() {
        let store = UploadStore::new(PathBuf::from("/data/uploads"));
        for original in ["a..b.png", "...png", "..\u{2024}..gif", "normal.jpg"] {
            let ext = allowed_extension(original);
            if let Some(ext) = ext {
                let name = generate_filename(original, &ext);
                assert!(
                    store.path_for(&name).is_some(),
                    "generated name {:?} must resolve",
                    name
                );
            }
        }
    }

    #[test]
    fn test_generate_filename_unique() {
        let a = generate_filename("photo.png", "png");
        let b = generate_filename("photo.png", "png");
        assert_ne!(a, b);
        assert!(a.starts_with("photo_"));
        assert!(a.ends_with(".png"));
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("a.png"), "image/png");
        assert_eq!(content_type_for("a.jpg"), "image/jpeg");
        assert_eq!(content_type_for("a.JPEG"), "image/jpeg");
        assert_eq!(content_type_for("a.gif"), "image/gif");
        assert_eq!(content_type_for("a.bin"), "application/octet-stream");
    }

    #[test]
    fn test_path_for_rejects_traversal() {
        let store = UploadStore::new(PathBuf::from("/data/uploads"));
        assert!(store.path_for("../secret.png").is_none());
        assert!(store.path_for("a/b.png").is_none());
        assert!(store.path_for("a\\b.png").is_none());
        assert!(store.path_for("").is_none());
        assert_eq!(
            store.path_for("photo_abc.png"),
            Some(PathBuf::from("/data/uploads/photo_abc.png"))
        );
    }

    #[tokio::test]
    async fn test_save_and_silent_drop() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path().to_path_buf());
        store.ensure_dir().unwrap();

        // Allowed extension is written to disk
        let stored = store.save("photo.png", b"png bytes").await.unwrap();
        let stored = stored.expect("png should be stored");
        let on_disk = std::fs::read(dir.path().join(&stored)).unwrap();
        assert_eq!(on_disk, b"png bytes");

        // Disallowed extension is dropped without error or file
        let dropped = store.save("notes.txt", b"text").await.unwrap();
        assert_eq!(dropped, None);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
