use std::path::{Path, PathBuf};

use anyhow::Result;
use std::io::ErrorKind;

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

/// Photo suffixes accepted for listings, compared case-insensitively.
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];

/// Attempts at finding a free name before giving up on an upload.
const MAX_NAME_ATTEMPTS: u32 = 100;

/// Flat directory of listing photos.
pub struct PhotoStorage {
    dir: PathBuf,
}

impl PhotoStorage {
    pub async fn new(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir).await?;
        info!("Photo upload directory: {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Store an uploaded photo and return its filename, or `None` when the
    /// extension is not allowed. Only the name is checked, never the content.
    ///
    /// An existing file is never replaced: a taken name gets a counter
    /// appended (`photo_42_1.jpg`, `photo_42_2.jpg`, ...).
    pub async fn save(&self, original: &str, data: &[u8], created: i64) -> std::io::Result<Option<String>> {
        if !allowed_file(original) {
            warn!("Rejected photo upload {:?}: extension not allowed", original);
            return Ok(None);
        }

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let Some(name) = stored_name(original, created, attempt) else {
                return Ok(None);
            };

            let path = self.dir.join(&name);
            let mut file = match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e),
            };
            file.write_all(data).await?;
            file.flush().await?;

            info!("Saved photo {} ({} bytes)", name, data.len());
            return Ok(Some(name));
        }

        Err(std::io::Error::new(
            ErrorKind::AlreadyExists,
            format!("no free upload name for {original:?} after {MAX_NAME_ATTEMPTS} attempts"),
        ))
    }
}

pub fn allowed_file(filename: &str) -> bool {
    filename.rsplit_once('.').is_some_and(|(_, ext)| {
        let ext = ext.to_ascii_lowercase();
        ALLOWED_EXTENSIONS.contains(&ext.as_str())
    })
}

/// `{sanitized stem}_{created}.{ext}`, keeping the extension's original case.
/// A non-zero `attempt` is appended after the timestamp.
pub fn stored_name(original: &str, created: i64, attempt: u32) -> Option<String> {
    if !allowed_file(original) {
        return None;
    }
    let (stem, ext) = original.rsplit_once('.')?;
    let stem = secure_filename(stem);
    let stem = if stem.is_empty() { "photo" } else { stem.as_str() };
    if attempt == 0 {
        Some(format!("{stem}_{created}.{ext}"))
    } else {
        Some(format!("{stem}_{created}_{attempt}.{ext}"))
    }
}

/// Reduce a client-supplied name to `[A-Za-z0-9_.-]`, with path separators
/// and whitespace runs turned into single underscores.
pub fn secure_filename(name: &str) -> String {
    let spaced: String = name
        .chars()
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let cleaned: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();
    cleaned.trim_matches(|c| c == '.' || c == '_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_check_is_case_insensitive_suffix() {
        assert!(allowed_file("photo.JPG"));
        assert!(allowed_file("photo.jpeg"));
        assert!(allowed_file("archive.tar.gif"));
        assert!(!allowed_file("photo.exe"));
        assert!(!allowed_file("photo.jpg.exe"));
        assert!(!allowed_file("jpg"));
        assert!(!allowed_file(""));
    }

    #[test]
    fn stored_name_keeps_extension_and_adds_timestamp() {
        assert_eq!(stored_name("photo.JPG", 1_700_000_000, 0).as_deref(), Some("photo_1700000000.JPG"));
        assert_eq!(stored_name("photo.exe", 1_700_000_000, 0), None);
    }

    #[test]
    fn stored_name_strips_paths_and_odd_characters() {
        assert_eq!(
            stored_name("../../etc/my wallet.png", 5, 0).as_deref(),
            Some("etc_my_wallet_5.png")
        );
        assert_eq!(stored_name("C:\\Users\\kim\\IMG 01.gif", 5, 0).as_deref(), Some("C_Users_kim_IMG_01_5.gif"));
        assert_eq!(stored_name("지갑.jpg", 5, 0).as_deref(), Some("photo_5.jpg"));
    }

    #[test]
    fn retry_names_append_a_counter() {
        assert_eq!(stored_name("photo.jpg", 42, 1).as_deref(), Some("photo_42_1.jpg"));
        assert_eq!(stored_name("photo.jpg", 42, 7).as_deref(), Some("photo_42_7.jpg"));
    }

    #[test]
    fn secure_filename_examples() {
        assert_eq!(secure_filename("My cool movie.mov"), "My_cool_movie.mov");
        assert_eq!(secure_filename("../../../etc/passwd"), "etc_passwd");
        assert_eq!(secure_filename("..."), "");
    }

    #[tokio::test]
    async fn save_writes_allowed_photo_only() {
        let dir = tempfile::tempdir().unwrap();
        let storage = PhotoStorage::new(dir.path().join("uploads")).await.unwrap();

        let name = storage.save("photo.JPG", b"\xff\xd8\xff", 42).await.unwrap();
        assert_eq!(name.as_deref(), Some("photo_42.JPG"));
        let bytes = std::fs::read(storage.dir().join("photo_42.JPG")).unwrap();
        assert_eq!(bytes, b"\xff\xd8\xff");

        let rejected = storage.save("photo.exe", b"MZ", 42).await.unwrap();
        assert!(rejected.is_none());
        assert!(!storage.dir().join("photo_42.exe").exists());
    }

    #[tokio::test]
    async fn same_name_in_same_second_keeps_both_photos() {
        let dir = tempfile::tempdir().unwrap();
        let storage = PhotoStorage::new(dir.path().join("uploads")).await.unwrap();

        let first = storage.save("photo.jpg", b"AAAA", 42).await.unwrap().unwrap();
        let second = storage.save("photo.jpg", b"BBBB", 42).await.unwrap().unwrap();
        let third = storage.save("photo.jpg", b"CCCC", 42).await.unwrap().unwrap();

        assert_eq!(first, "photo_42.jpg");
        assert_eq!(second, "photo_42_1.jpg");
        assert_eq!(third, "photo_42_2.jpg");
        assert_eq!(std::fs::read(storage.dir().join(&first)).unwrap(), b"AAAA");
        assert_eq!(std::fs::read(storage.dir().join(&second)).unwrap(), b"BBBB");
        assert_eq!(std::fs::read(storage.dir().join(&third)).unwrap(), b"CCCC");
    }
}
