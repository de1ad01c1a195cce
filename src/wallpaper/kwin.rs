use anyhow::{Context, Result};
use std::path::Path;
use std::process::Command;

/// qdbus binaries in the order they are tried (Plasma 6, Plasma 5, distro
/// specific Plasma 5 name).
const QDBUS_CANDIDATES: &[&str] = &["qdbus6", "qdbus", "qdbus-qt5"];

/// Plasma shell script that points every desktop at the image.
pub fn build_script(path: &Path) -> String {
    let escaped = path
        .to_string_lossy()
        .replace('\\', "\\\\")
        .replace('\'', "\\'");
    format!(
        "var desktops = desktops(); \
         for (var i = 0; i < desktops.length; i++) {{ \
         var d = desktops[i]; \
         d.wallpaperPlugin = 'org.kde.image'; \
         d.currentConfigGroup = Array('Wallpaper', 'org.kde.image', 'General'); \
         d.writeConfig('Image', 'file://{}'); \
         }}",
        escaped
    )
}

pub fn apply_wallpaper(path: &Path) -> Result<()> {
    let script = build_script(path);

    let installed: Vec<&str> = QDBUS_CANDIDATES
        .iter()
        .copied()
        .filter(|cmd| which::which(cmd).is_ok())
        .collect();
    if installed.is_empty() {
        anyhow::bail!("no qdbus binary found");
    }

    for cmd in installed {
        if run_qdbus_script(cmd, &script).is_ok() {
            return Ok(());
        }
    }

    anyhow::bail!("plasmashell rejected the wallpaper script")
}

fn run_qdbus_script(cmd: &str, script: &str) -> Result<()> {
    let output = Command::new(cmd)
        .args([
            "org.kde.plasmashell",
            "/PlasmaShell",
            "org.kde.PlasmaShell.evaluateScript",
            script,
        ])
        .output()
        .with_context(|| format!("Failed to run {}", cmd))?;

    if !output.status.success() {
        anyhow::bail!(
            "{} returned error: {}",
            cmd,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(())
}
