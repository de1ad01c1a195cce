//! Applying an image as the desktop background.
//!
//! A [`WallpaperBackend`] is chosen once per process for the running platform.
//! [`WallpaperSetter`] wraps it so that callers only ever see a success flag.

use anyhow::Result;
use std::path::Path;

use crate::ui::prelude::*;

pub mod gnome;
pub mod kwin;
pub mod linux;
pub mod macos;
#[cfg(windows)]
pub mod win32;
pub mod x11;

pub trait WallpaperBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Set `path` as the desktop background. `Ok` means the platform reported
    /// success.
    fn apply(&self, path: &Path) -> Result<()>;
}

/// Backend for an OS we cannot set wallpapers on.
pub struct Unsupported {
    os: String,
}

impl WallpaperBackend for Unsupported {
    fn name(&self) -> &str {
        &self.os
    }

    fn apply(&self, _path: &Path) -> Result<()> {
        Err(crate::error::LooperError::UnsupportedPlatform(self.os.clone()).into())
    }
}

/// Pick the backend for the OS this binary runs on.
pub fn detect() -> Box<dyn WallpaperBackend> {
    backend_for(std::env::consts::OS)
}

pub fn backend_for(os: &str) -> Box<dyn WallpaperBackend> {
    match os {
        #[cfg(windows)]
        "windows" => Box::new(win32::WindowsBackend),
        "macos" => Box::new(macos::MacOsBackend),
        "linux" => Box::new(linux::LinuxBackend::default()),
        other => Box::new(Unsupported {
            os: other.to_string(),
        }),
    }
}

pub struct WallpaperSetter {
    backend: Box<dyn WallpaperBackend>,
}

impl WallpaperSetter {
    pub fn new(backend: Box<dyn WallpaperBackend>) -> Self {
        Self { backend }
    }

    pub fn detect() -> Self {
        Self::new(detect())
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Apply `path` and report whether it worked. Failures are logged, never
    /// returned.
    pub fn apply(&self, path: &Path) -> bool {
        if !path.exists() {
            emit(
                Level::Error,
                "wallpaper.not_found",
                &format!("Image not found: {}", path.display()),
                None,
            );
            return false;
        }

        match self.backend.apply(path) {
            Ok(()) => true,
            Err(e) => {
                emit(
                    Level::Error,
                    "wallpaper.apply_failed",
                    &format!("Error setting wallpaper via {}: {:#}", self.backend.name(), e),
                    None,
                );
                false
            }
        }
    }
}
