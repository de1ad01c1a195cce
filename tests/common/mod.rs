#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use wallloop::common::LooperPaths;
use wallloop::config::LooperConfig;
use wallloop::error::{LooperError, LooperResult};
use wallloop::images::{DialogProvider, ImageSource};
use wallloop::runner::CancellationToken;
use wallloop::session::{MenuChoice, Orchestrator, Prompter};
use wallloop::wallpaper::{WallpaperBackend, WallpaperSetter};

/// Isolated data directory for one test.
pub struct TestEnvironment {
    temp_dir: TempDir,
    pub paths: LooperPaths,
    pub config: LooperConfig,
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        let temp_dir = tempfile::tempdir()?;
        let config = LooperConfig {
            data_dir: Some(temp_dir.path().join("data")),
            polite_delay_ms: 0,
            ..Default::default()
        };
        let paths = config.paths()?;
        paths.ensure()?;
        Ok(Self {
            temp_dir,
            paths,
            config,
        })
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Put an image straight into session_images/.
    pub fn add_session_image(&self, name: &str) -> PathBuf {
        let path = self.paths.images_dir.join(name);
        fs::write(&path, b"image").unwrap();
        path
    }

    /// Create an image outside the data directory, as if picked by the user.
    pub fn external_image(&self, name: &str) -> PathBuf {
        let dir = self.path().join("pictures");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, b"picked").unwrap();
        path
    }

    pub fn metadata_json(&self) -> Vec<serde_json::Value> {
        let text = fs::read_to_string(&self.paths.metadata_file).unwrap();
        serde_json::from_str(&text).unwrap()
    }
}

/// Answers prompts from a fixed script. An exhausted script answers with the
/// prompt's default, and the menu with `0`.
#[derive(Default)]
pub struct ScriptedPrompter {
    menu: Mutex<VecDeque<String>>,
    answers: Mutex<VecDeque<String>>,
    pub asked: Arc<Mutex<Vec<String>>>,
}

impl ScriptedPrompter {
    pub fn new(menu: &[&str], answers: &[&str]) -> Self {
        Self {
            menu: Mutex::new(menu.iter().map(|s| s.to_string()).collect()),
            answers: Mutex::new(answers.iter().map(|s| s.to_string()).collect()),
            asked: Arc::default(),
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn menu(&self) -> MenuChoice {
        let choice = self.menu.lock().unwrap().pop_front();
        MenuChoice::parse(choice.as_deref().unwrap_or("0"))
    }

    fn ask(&self, prompt: &str, default: &str) -> String {
        self.asked.lock().unwrap().push(prompt.to_string());
        let answer = self.answers.lock().unwrap().pop_front();
        match answer {
            Some(a) if !a.is_empty() => a,
            _ => default.to_string(),
        }
    }
}

pub struct FixedDialog(pub Vec<PathBuf>);

impl DialogProvider for FixedDialog {
    fn pick_images(&self) -> Vec<PathBuf> {
        self.0.clone()
    }

    fn name(&self) -> &'static str {
        "fixed dialog"
    }
}

/// Image source that counts fetches and returns a tiny body, optionally
/// failing the first few requests.
#[derive(Default)]
pub struct FakeSource {
    pub calls: AtomicUsize,
    fail_first: usize,
}

impl FakeSource {
    pub fn failing_first(fail_first: usize) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_first,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageSource for FakeSource {
    async fn fetch(&self, url: &str) -> LooperResult<Vec<u8>> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if n < self.fail_first {
            return Err(LooperError::HttpStatus {
                status: 500,
                url: url.to_string(),
            });
        }
        Ok(b"jpeg".to_vec())
    }
}

/// Records applied images and cancels the loop after `stop_after` of them.
pub struct RecordingBackend {
    pub applied: Arc<Mutex<Vec<PathBuf>>>,
    token: CancellationToken,
    stop_after: usize,
}

impl RecordingBackend {
    pub fn new(
        applied: Arc<Mutex<Vec<PathBuf>>>,
        token: CancellationToken,
        stop_after: usize,
    ) -> Self {
        Self {
            applied,
            token,
            stop_after,
        }
    }
}

impl WallpaperBackend for RecordingBackend {
    fn name(&self) -> &str {
        "recording"
    }

    fn apply(&self, path: &Path) -> Result<()> {
        let mut applied = self.applied.lock().unwrap();
        applied.push(path.to_path_buf());
        if applied.len() >= self.stop_after {
            self.token.cancel();
        }
        Ok(())
    }
}

pub struct Harness {
    pub orchestrator: Orchestrator,
    pub applied: Arc<Mutex<Vec<PathBuf>>>,
    pub token: CancellationToken,
}

/// Build an orchestrator whose loop stops after `stop_after` wallpapers.
pub fn harness(
    env: &TestEnvironment,
    prompter: ScriptedPrompter,
    dialog: FixedDialog,
    source: Option<Arc<FakeSource>>,
    stop_after: usize,
) -> Harness {
    let token = CancellationToken::new();
    let applied = Arc::new(Mutex::new(Vec::new()));
    let setter = WallpaperSetter::new(Box::new(RecordingBackend::new(
        applied.clone(),
        token.clone(),
        stop_after,
    )));
    let source = source.map(|s| s as Arc<dyn ImageSource>);

    let orchestrator = Orchestrator::new(
        env.config.clone(),
        env.paths.clone(),
        setter,
        Box::new(dialog),
        Box::new(prompter),
        source,
    )
    .with_token(token.clone());

    Harness {
        orchestrator,
        applied,
        token,
    }
}
