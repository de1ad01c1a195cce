use anyhow::{Context, Result};
use std::path::Path;
use std::process::Command;

pub fn apply_wallpaper(path: &Path) -> Result<()> {
    let output = Command::new("feh")
        .arg("--bg-scale")
        .arg(path)
        .output()
        .context("Failed to set wallpaper with feh")?;

    if !output.status.success() {
        anyhow::bail!(
            "feh failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(())
}
