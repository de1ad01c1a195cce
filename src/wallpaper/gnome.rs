use anyhow::{Context, Result};
use std::path::Path;
use std::process::Command;

const SCHEMA: &str = "org.gnome.desktop.background";

pub fn file_uri(path: &Path) -> String {
    format!("file://{}", path.display())
}

fn gsettings_set(key: &str, value: &str) -> Result<bool> {
    let output = Command::new("gsettings")
        .args(["set", SCHEMA, key, value])
        .output()
        .context("Failed to run gsettings")?;
    Ok(output.status.success())
}

pub fn apply_wallpaper(path: &Path) -> Result<()> {
    let uri = file_uri(path);

    if !gsettings_set("picture-uri", &uri)? {
        anyhow::bail!("gsettings could not set picture-uri");
    }
    // GNOME 42+ reads a separate key in dark mode; older versions lack it
    let _ = gsettings_set("picture-uri-dark", &uri);

    Ok(())
}
