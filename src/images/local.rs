use anyhow::{Context, Result};
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};

use super::dialog::DialogProvider;
use super::{absolutize, is_image};
use crate::error::LooperError;
use crate::ui::prelude::*;

/// Let the user pick images and copy each one into `images_dir` as
/// `<unix timestamp>_<file name>`. Returns the absolute destination paths of
/// the files that were copied; anything else is skipped with a warning.
pub async fn pick_and_copy(dialog: &dyn DialogProvider, images_dir: &Path) -> Vec<PathBuf> {
    let selected = dialog.pick_images();
    emit(
        Level::Debug,
        "local.picked",
        &format!("{} file(s) selected via {}", selected.len(), dialog.name()),
        None,
    );

    let mut copied = Vec::new();
    for src in selected {
        match copy_into(&src, images_dir).await {
            Ok(dest) => copied.push(dest),
            Err(e) => emit(
                Level::Warn,
                "local.copy_failed",
                &format!("Could not copy {}: {:#}", src.display(), e),
                None,
            ),
        }
    }
    copied
}

async fn copy_into(src: &Path, images_dir: &Path) -> Result<PathBuf> {
    if !src.is_file() {
        return Err(LooperError::ImageNotFound(src.to_path_buf()).into());
    }
    if !is_image(src) {
        return Err(LooperError::NotAnImage(src.to_path_buf()).into());
    }
    let name = src
        .file_name()
        .context("source path has no file name")?
        .to_string_lossy();

    let dest = unique_destination(images_dir, Utc::now().timestamp(), &name);
    tokio::fs::copy(src, &dest)
        .await
        .with_context(|| format!("copying to {}", dest.display()))?;
    Ok(absolutize(&dest))
}

/// `<stamp>_<name>`, or `<stamp>_<n>_<name>` when that file already exists.
fn unique_destination(images_dir: &Path, stamp: i64, name: &str) -> PathBuf {
    let dest = images_dir.join(format!("{}_{}", stamp, name));
    if !dest.exists() {
        return dest;
    }
    (1u32..)
        .map(|n| images_dir.join(format!("{}_{}_{}", stamp, n, name)))
        .find(|candidate| !candidate.exists())
        .unwrap_or(dest)
}

/// Image files directly inside `images_dir`, sorted by path. Subdirectories
/// are not descended into.
pub fn gather(images_dir: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(images_dir) {
        Ok(entries) => entries,
        Err(e) => {
            emit(
                Level::Warn,
                "local.gather_failed",
                &format!("Error reading {}: {}", images_dir.display(), e),
                None,
            );
            return Vec::new();
        }
    };

    let mut images: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_image(path))
        .map(|path| absolutize(&path))
        .collect();
    images.sort();
    images
}
