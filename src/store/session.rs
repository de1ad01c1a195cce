use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::ui::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Local,
    Online,
    Dual,
}

impl Mode {
    pub fn uses_remote(self) -> bool {
        matches!(self, Mode::Online | Mode::Dual)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Local => "local",
            Mode::Online => "online",
            Mode::Dual => "dual",
        };
        f.write_str(name)
    }
}

/// Configuration and image list of the latest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Session {
    pub mode: Option<Mode>,
    /// Copies made in the images directory by the local picker
    pub local_added: Vec<PathBuf>,
    pub theme: Option<String>,
    pub online_count: u32,
    pub online_refresh: bool,
    pub duration: u64,
    pub shuffle: bool,
    pub images: Vec<PathBuf>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            mode: None,
            local_added: Vec::new(),
            theme: None,
            online_count: 5,
            online_refresh: false,
            duration: 30,
            shuffle: true,
            images: Vec::new(),
            timestamp: None,
        }
    }
}

impl Session {
    /// Saved image paths that still exist.
    pub fn existing_images(&self) -> Vec<PathBuf> {
        self.images.iter().filter(|p| p.exists()).cloned().collect()
    }

    pub fn stamp(&mut self) {
        self.timestamp = Some(Utc::now());
    }
}

/// Single JSON snapshot of the latest [`Session`], overwritten on every save.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The saved session, or `None` when there is none or it cannot be read.
    pub fn load(&self) -> Option<Session> {
        if !self.path.exists() {
            return None;
        }
        let parsed = fs::read_to_string(&self.path)
            .context("reading session file")
            .and_then(|text| serde_json::from_str(&text).context("parsing session file"));
        match parsed {
            Ok(session) => Some(session),
            Err(e) => {
                emit(
                    Level::Debug,
                    "session.load_failed",
                    &format!("Ignoring session file {}: {:#}", self.path.display(), e),
                    None,
                );
                None
            }
        }
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("creating session directory")?;
        }
        let text = serde_json::to_string_pretty(session).context("serializing session")?;
        fs::write(&self.path, text)
            .with_context(|| format!("writing session file {}", self.path.display()))?;
        Ok(())
    }

    /// Save and report a failure instead of returning it.
    pub fn persist(&self, session: &Session) {
        if let Err(e) = self.save(session) {
            emit(
                Level::Warn,
                "session.write_failed",
                &format!("Could not save session: {:#}", e),
                None,
            );
        }
    }

    /// Rewrite the stored session with the state active when a loop stopped.
    /// Fields not passed in are carried over from the stored copy.
    pub fn checkpoint(&self, images: &[PathBuf], duration: u64, shuffle: bool) -> Session {
        let mut session = self.load().unwrap_or_default();
        session.images = images.to_vec();
        session.duration = duration;
        session.shuffle = shuffle;
        session.stamp();
        self.persist(&session);
        session
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_or_corrupt_session_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        assert!(store.load().is_none());

        fs::write(store.path(), "][").unwrap();
        assert!(store.load().is_none());
    }

    #[test]
    fn save_overwrites_instead_of_merging() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));

        let first = Session {
            mode: Some(Mode::Dual),
            images: vec![PathBuf::from("/a.png"), PathBuf::from("/b.png")],
            ..Default::default()
        };
        store.save(&first).unwrap();

        let second = Session {
            mode: Some(Mode::Local),
            images: vec![PathBuf::from("/c.png")],
            ..Default::default()
        };
        store.save(&second).unwrap();

        assert_eq!(store.load().unwrap(), second);
    }

    #[test]
    fn partial_session_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        fs::write(store.path(), r#"{"mode":"online","theme":"graffiti"}"#).unwrap();

        let session = store.load().unwrap();
        assert_eq!(session.mode, Some(Mode::Online));
        assert_eq!(session.theme.as_deref(), Some("graffiti"));
        assert_eq!(session.duration, 30);
        assert_eq!(session.online_count, 5);
        assert!(session.images.is_empty());
    }

    #[test]
    fn checkpoint_keeps_unrelated_fields() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        store
            .save(&Session {
                mode: Some(Mode::Online),
                theme: Some("graffiti".into()),
                online_count: 8,
                ..Default::default()
            })
            .unwrap();

        let images = vec![PathBuf::from("/x.jpg")];
        store.checkpoint(&images, 12, false);

        let saved = store.load().unwrap();
        assert_eq!(saved.images, images);
        assert_eq!(saved.duration, 12);
        assert!(!saved.shuffle);
        assert_eq!(saved.theme.as_deref(), Some("graffiti"));
        assert_eq!(saved.online_count, 8);
        assert!(saved.timestamp.is_some());
    }
}
