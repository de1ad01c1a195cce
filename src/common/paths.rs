use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// Get the wallloop config directory
pub fn config_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .context("Unable to determine user config directory")?
        .join("wallloop"))
}

/// Get the default wallloop data directory
pub fn default_data_dir() -> Result<PathBuf> {
    Ok(dirs::data_dir()
        .context("Unable to determine user data directory")?
        .join("wallloop"))
}

/// File locations used by one run. Every component receives these explicitly,
/// so tests can point them at a temporary directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LooperPaths {
    pub root: PathBuf,
    pub images_dir: PathBuf,
    pub session_file: PathBuf,
    pub metadata_file: PathBuf,
}

impl LooperPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            images_dir: root.join("session_images"),
            session_file: root.join("session.json"),
            metadata_file: root.join("metadata.json"),
            root,
        }
    }

    /// Create the images directory and seed an empty metadata log.
    pub fn ensure(&self) -> Result<()> {
        fs::create_dir_all(&self.images_dir).with_context(|| {
            format!(
                "creating session images directory at {}",
                self.images_dir.display()
            )
        })?;

        if !self.metadata_file.exists() {
            fs::write(&self.metadata_file, "[]").with_context(|| {
                format!(
                    "initializing metadata file at {}",
                    self.metadata_file.display()
                )
            })?;
        }
        Ok(())
    }
}
