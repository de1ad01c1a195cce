//! Image acquisition: local picking and copying, online downloads with cache
//! reuse, and merging both sources into one ordered list.

use std::path::{Path, PathBuf};

use crate::error::{LooperError, LooperResult};
use crate::ui::prelude::*;

pub mod dialog;
pub mod local;
pub mod merge;
pub mod online;

pub use dialog::DialogProvider;
pub use local::{gather, pick_and_copy};
pub use merge::merge_unique;
pub use online::{Downloader, HttpImageSource, ImageSource, Theme};

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif", "webp"];

/// Whether the path carries a recognized image extension (case-insensitive).
pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Make a path absolute without resolving symlinks, so paths produced by
/// different acquisition steps compare equal.
pub(crate) fn absolutize(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Last-resort recovery for an empty image list: scan the images directory,
/// then force a fresh download if a downloader is available.
pub async fn ensure_images(
    images: Vec<PathBuf>,
    images_dir: &Path,
    downloader: Option<&Downloader>,
    theme: &str,
    count: u32,
) -> LooperResult<Vec<PathBuf>> {
    let mut images = images;
    if images.is_empty() {
        images = gather(images_dir);
    }
    if images.is_empty()
        && let Some(downloader) = downloader
    {
        emit(
            Level::Info,
            "images.fallback_download",
            &format!(
                "No local images found, attempting fallback online download ({}, {} images).",
                theme, count
            ),
            None,
        );
        images = downloader.download(theme, count, true).await;
    }

    images.retain(|p| p.exists());
    if images.is_empty() {
        return Err(LooperError::NoImages);
    }
    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn recognizes_extensions_case_insensitively() {
        assert!(is_image(Path::new("/a/b.JPG")));
        assert!(is_image(Path::new("c.webp")));
        assert!(!is_image(Path::new("notes.txt")));
        assert!(!is_image(Path::new("no_extension")));
    }

    #[tokio::test]
    async fn ensure_images_falls_back_to_directory_scan() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.png"), b"x").unwrap();

        let images = ensure_images(Vec::new(), dir.path(), None, "nature", 5)
            .await
            .unwrap();
        assert_eq!(images, vec![dir.path().join("a.png")]);
    }

    #[tokio::test]
    async fn ensure_images_drops_stale_paths_and_aborts_when_empty() {
        let dir = tempfile::tempdir().unwrap();
        let stale = vec![dir.path().join("gone.png")];

        let result = ensure_images(stale, dir.path(), None, "nature", 5).await;
        assert!(matches!(result, Err(LooperError::NoImages)));
    }
}
