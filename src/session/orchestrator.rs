use anyhow::Result;
use std::sync::Arc;

use super::prompt::{MenuChoice, Prompter};
use crate::common::LooperPaths;
use crate::config::LooperConfig;
use crate::error::LooperError;
use crate::images::{
    self, DialogProvider, Downloader, ImageSource, Theme, gather, merge_unique, pick_and_copy,
};
use crate::runner::{CancellationToken, Runner, cancel_on_ctrl_c};
use crate::store::{MetadataStore, Mode, Session, SessionStore};
use crate::ui::prelude::*;
use crate::wallpaper::WallpaperSetter;

/// Where the interactive flow currently is.
#[derive(Debug)]
pub enum State {
    Menu,
    Local,
    Online,
    Dual,
    Resume,
    /// Images acquired; duration and shuffle still to be chosen
    Prepared(Session),
    Running(Session),
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Exited,
    Looped { steps: u64 },
}

/// Drives one invocation: menu, acquisition, persistence and the loop.
pub struct Orchestrator {
    config: LooperConfig,
    paths: LooperPaths,
    metadata: MetadataStore,
    sessions: SessionStore,
    setter: WallpaperSetter,
    dialog: Box<dyn DialogProvider>,
    prompter: Box<dyn Prompter>,
    downloader: Option<Downloader>,
    token: CancellationToken,
    handle_ctrl_c: bool,
}

impl Orchestrator {
    /// `source` is the remote capability; `None` disables online acquisition.
    pub fn new(
        config: LooperConfig,
        paths: LooperPaths,
        setter: WallpaperSetter,
        dialog: Box<dyn DialogProvider>,
        prompter: Box<dyn Prompter>,
        source: Option<Arc<dyn ImageSource>>,
    ) -> Self {
        let metadata = MetadataStore::new(&paths.metadata_file);
        let sessions = SessionStore::new(&paths.session_file);
        let downloader = source.map(|source| {
            Downloader::new(&paths.images_dir, metadata.clone(), source)
                .with_resolution(config.resolution)
                .with_polite_delay(config.polite_delay())
        });

        Self {
            config,
            paths,
            metadata,
            sessions,
            setter,
            dialog,
            prompter,
            downloader,
            token: CancellationToken::new(),
            handle_ctrl_c: true,
        }
    }

    /// Use an externally controlled token and skip installing the Ctrl+C
    /// listener.
    pub fn with_token(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self.handle_ctrl_c = false;
        self
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Run the state machine from `start` until the loop stops or the user
    /// exits. Returns an error when no images could be assembled.
    pub async fn run(&self, start: State) -> Result<Outcome> {
        let mut state = start;
        loop {
            emit(
                Level::Debug,
                "session.state",
                &format!("Entering {}", state_name(&state)),
                None,
            );
            state = match state {
                State::Menu => match self.prompter.menu() {
                    MenuChoice::Local => State::Local,
                    MenuChoice::Online => State::Online,
                    MenuChoice::Dual => State::Dual,
                    MenuChoice::Resume => State::Resume,
                    MenuChoice::Exit => State::Exit,
                    MenuChoice::Invalid(choice) => {
                        emit(
                            Level::Error,
                            "session.invalid_choice",
                            &format!("Invalid choice '{}'. Exiting.", choice),
                            None,
                        );
                        State::Exit
                    }
                },
                State::Resume => self.resume().await,
                State::Local => State::Prepared(self.prepare_local().await?),
                State::Online => State::Prepared(self.prepare_online().await?),
                State::Dual => State::Prepared(self.prepare_dual().await),
                State::Prepared(session) => State::Running(self.finalize(session).await?),
                State::Running(session) => {
                    let steps = self.run_loop(&session).await;
                    return Ok(Outcome::Looped { steps });
                }
                State::Exit => {
                    emit(Level::Info, "session.exit", "Exiting.", None);
                    return Ok(Outcome::Exited);
                }
            };
        }
    }

    fn new_session(&self, mode: Mode) -> Session {
        Session {
            mode: Some(mode),
            online_count: self.config.online_count.max(1),
            duration: self.config.duration.max(1),
            shuffle: self.config.shuffle,
            ..Default::default()
        }
    }

    /// Rehydrate the saved session. Falls back to the menu when there is none
    /// or its images cannot be recovered.
    async fn resume(&self) -> State {
        let Some(mut session) = self.sessions.load() else {
            emit(Level::Warn, "session.resume.none", "No saved session found.", None);
            return State::Menu;
        };
        emit(Level::Info, "session.resume", "Resuming saved session.", None);

        let mut images = session.existing_images();
        if images.is_empty() {
            emit(
                Level::Info,
                "session.resume.rebuild",
                "No usable image list in session, rebuilding from saved preferences.",
                None,
            );
            let local = gather(&self.paths.images_dir);
            let mut online = Vec::new();
            if session.mode.is_some_and(Mode::uses_remote)
                && let Some(downloader) = &self.downloader
            {
                let theme = session.theme.as_deref().unwrap_or(&self.config.theme);
                online = downloader
                    .download(theme, session.online_count.max(1), session.online_refresh)
                    .await;
            }
            images = merge_unique(local, online);
        }

        if images.is_empty() {
            emit(
                Level::Warn,
                "session.resume.empty",
                "Could not find any images for the saved session. Starting fresh menu.",
                None,
            );
            return State::Menu;
        }

        emit(
            Level::Info,
            "session.resume.ready",
            &format!("Found {} images from session. Starting loop.", images.len()),
            None,
        );
        session.images = images;
        // older session files may hold a zero duration
        session.duration = session.duration.max(1);
        State::Running(session)
    }

    async fn prepare_local(&self) -> Result<Session> {
        let mut session = self.new_session(Mode::Local);
        emit(
            Level::Info,
            "local.pick",
            &format!("Opening {} to pick images...", self.dialog.name()),
            None,
        );
        let picked = pick_and_copy(self.dialog.as_ref(), &self.paths.images_dir).await;

        if picked.is_empty() {
            emit(
                Level::Warn,
                "local.none_picked",
                "No files picked/copied. You can add files into session_images/ manually and rerun.",
                None,
            );
            let existing = gather(&self.paths.images_dir);
            if existing.is_empty() {
                emit(Level::Error, "local.empty", "session_images/ is empty.", None);
                return Err(LooperError::NoImages.into());
            }
            emit(
                Level::Info,
                "local.existing",
                &format!(
                    "Found {} existing images in session_images/. Using them.",
                    existing.len()
                ),
                None,
            );
            session.images = existing;
        } else {
            session.local_added = picked;
            session.images = gather(&self.paths.images_dir);
        }
        Ok(session)
    }

    /// Ask for theme, count and refresh, then download.
    async fn download_interactively(
        &self,
        downloader: &Downloader,
        session: &mut Session,
        default_count: u32,
    ) -> Vec<std::path::PathBuf> {
        let names: Vec<&str> = Theme::ALL.iter().map(|t| t.as_str()).collect();
        let answer = self.prompter.ask(
            &format!("Choose theme ({})", names.join("/")),
            &self.config.theme,
        );
        let theme = Theme::resolve(&answer);
        let count = self
            .prompter
            .ask_int("How many online images to download", default_count as u64)
            .clamp(1, u32::MAX as u64) as u32;
        let refresh = self
            .prompter
            .ask_yes_no("Force refresh (download new images even if cache exists)?", false);

        session.theme = Some(theme.as_str().to_string());
        session.online_count = count;
        session.online_refresh = refresh;

        emit(
            Level::Info,
            "download.start",
            &format!("Downloading {} {} images...", count, theme),
            None,
        );
        downloader.download(theme.as_str(), count, refresh).await
    }

    async fn prepare_online(&self) -> Result<Session> {
        let Some(downloader) = &self.downloader else {
            emit(
                Level::Error,
                "online.unavailable",
                "Online mode needs network access, which is disabled.",
                None,
            );
            return Err(LooperError::RemoteUnavailable.into());
        };

        let mut session = self.new_session(Mode::Online);
        let online = self
            .download_interactively(downloader, &mut session, self.config.online_count)
            .await;
        if online.is_empty() {
            emit(
                Level::Error,
                "online.empty",
                "Could not download online images.",
                None,
            );
            return Err(LooperError::NoImages.into());
        }
        session.images = online;
        Ok(session)
    }

    async fn prepare_dual(&self) -> Session {
        let mut session = self.new_session(Mode::Dual);

        if self.prompter.ask_yes_no("Include local images?", true) {
            session.local_added =
                pick_and_copy(self.dialog.as_ref(), &self.paths.images_dir).await;
        }

        let online = match &self.downloader {
            Some(downloader) => {
                self.download_interactively(downloader, &mut session, self.config.dual_online_count)
                    .await
            }
            None => {
                emit(
                    Level::Warn,
                    "dual.online_skipped",
                    "Network access disabled; online portion skipped.",
                    None,
                );
                Vec::new()
            }
        };

        session.images = merge_unique(gather(&self.paths.images_dir), online);
        emit(
            Level::Info,
            "dual.prepared",
            &format!("Prepared {} images (local+online).", session.images.len()),
            None,
        );
        session
    }

    /// Apply the fallback policy, ask for duration and shuffle, and persist.
    async fn finalize(&self, mut session: Session) -> Result<Session> {
        let images = images::ensure_images(
            std::mem::take(&mut session.images),
            &self.paths.images_dir,
            self.downloader.as_ref(),
            &self.config.theme,
            self.config.online_count.max(1),
        )
        .await
        .inspect_err(|e| {
            emit(Level::Error, "session.no_images", &e.to_string(), None);
        })?;

        session.duration = self
            .prompter
            .ask_int("Seconds per wallpaper", self.config.duration.max(1))
            .max(1);
        session.shuffle = self.prompter.ask_yes_no("Shuffle images?", self.config.shuffle);
        session.images = images;
        session.stamp();
        self.sessions.persist(&session);
        Ok(session)
    }

    async fn run_loop(&self, session: &Session) -> u64 {
        let listener = self
            .handle_ctrl_c
            .then(|| cancel_on_ctrl_c(self.token.clone()));

        let runner = Runner::new(&self.setter, &self.metadata, &self.sessions, self.token.clone());
        let steps = runner
            .run(&session.images, session.duration, session.shuffle)
            .await;

        if let Some(listener) = listener {
            listener.abort();
        }
        steps
    }
}

fn state_name(state: &State) -> &'static str {
    match state {
        State::Menu => "menu",
        State::Local => "local",
        State::Online => "online",
        State::Dual => "dual",
        State::Resume => "resume",
        State::Prepared(_) => "prepared",
        State::Running(_) => "running",
        State::Exit => "exit",
    }
}
