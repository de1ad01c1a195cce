use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::common::paths::{self, LooperPaths};

pub const DEFAULT_THEME: &str = "nature";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

/// User preferences, stored as `config.toml` in the wallloop config directory.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LooperConfig {
    /// Overrides where session images, session and metadata files live
    pub data_dir: Option<PathBuf>,
    /// Seconds each wallpaper stays up
    pub duration: u64,
    pub shuffle: bool,
    pub theme: String,
    pub online_count: u32,
    /// Download count suggested in dual mode
    pub dual_online_count: u32,
    pub request_timeout_secs: u64,
    /// Pause after every download attempt
    pub polite_delay_ms: u64,
    pub resolution: Resolution,
}

impl Default for LooperConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            duration: 30,
            shuffle: true,
            theme: DEFAULT_THEME.to_string(),
            online_count: 5,
            dual_online_count: 4,
            request_timeout_secs: 20,
            polite_delay_ms: 200,
            resolution: Resolution::default(),
        }
    }
}

impl LooperConfig {
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(paths::config_dir()?.join("config.toml"))
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(cfg_path: &std::path::Path) -> Result<Self> {
        if !cfg_path.exists() {
            return Ok(Self::default());
        }

        let s = fs::read_to_string(cfg_path)
            .with_context(|| format!("reading config {}", cfg_path.display()))?;
        toml::from_str(&s).context("parsing config toml")
    }

    pub fn save_to(&self, cfg_path: &std::path::Path) -> Result<()> {
        if let Some(parent) = cfg_path.parent() {
            fs::create_dir_all(parent).context("creating config directory")?;
        }

        let toml = toml::to_string_pretty(self).context("serializing config to toml")?;
        fs::write(cfg_path, toml).context("writing config file")?;
        Ok(())
    }

    /// File layout under `data_dir`, or under the platform data directory
    /// when no override is set.
    pub fn paths(&self) -> Result<LooperPaths> {
        let root = match &self.data_dir {
            Some(dir) => dir.clone(),
            None => paths::default_data_dir()?,
        };
        Ok(LooperPaths::new(root))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn polite_delay(&self) -> Duration {
        Duration::from_millis(self.polite_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = LooperConfig::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(cfg, LooperConfig::default());
        assert_eq!(cfg.duration, 30);
        assert!(cfg.shuffle);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "duration = 90\ntheme = \"graffiti\"\n").unwrap();

        let cfg = LooperConfig::load_from(&path).unwrap();
        assert_eq!(cfg.duration, 90);
        assert_eq!(cfg.theme, "graffiti");
        assert_eq!(cfg.online_count, 5);
        assert_eq!(cfg.resolution, Resolution::default());
    }

    #[test]
    fn data_dir_override_skips_platform_lookup() {
        let cfg = LooperConfig {
            data_dir: Some(PathBuf::from("/srv/wallloop")),
            ..Default::default()
        };
        let paths = cfg.paths().unwrap();
        assert_eq!(paths.session_file, PathBuf::from("/srv/wallloop/session.json"));
    }

    #[test]
    fn save_then_load_preserves_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/config.toml");
        let cfg = LooperConfig {
            data_dir: Some(dir.path().join("data")),
            ..Default::default()
        };
        cfg.save_to(&path).unwrap();

        let loaded = LooperConfig::load_from(&path).unwrap();
        assert_eq!(loaded.paths().unwrap().images_dir, dir.path().join("data/session_images"));
    }
}
