use anyhow::{Context, Result};
use std::path::Path;
use std::process::Command;

use super::WallpaperBackend;

pub struct MacOsBackend;

pub fn finder_script(path: &Path) -> String {
    let escaped = path
        .to_string_lossy()
        .replace('\\', "\\\\")
        .replace('"', "\\\"");
    format!(
        "tell application \"Finder\" to set desktop picture to POSIX file \"{}\"",
        escaped
    )
}

impl WallpaperBackend for MacOsBackend {
    fn name(&self) -> &str {
        "macos"
    }

    fn apply(&self, path: &Path) -> Result<()> {
        let status = Command::new("osascript")
            .arg("-e")
            .arg(finder_script(path))
            .status()
            .context("Failed to run osascript")?;

        if !status.success() {
            anyhow::bail!("osascript exited with {}", status);
        }
        Ok(())
    }
}
