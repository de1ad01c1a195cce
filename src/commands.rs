use anyhow::{Context, Result};
use colored::*;
use std::path::Path;
use std::sync::Arc;

use crate::cli::{Cli, Commands};
use crate::common::LooperPaths;
use crate::config::LooperConfig;
use crate::images::{self, HttpImageSource, ImageSource};
use crate::session::{ConsolePrompter, Orchestrator, Outcome, State};
use crate::store::{MetadataEntry, MetadataStore};
use crate::ui::prelude::*;
use crate::wallpaper::WallpaperSetter;

pub async fn handle_command(cli: Cli) -> Result<()> {
    let mut config = LooperConfig::load()?;
    if let Some(dir) = cli.data_dir.clone() {
        config.data_dir = Some(dir);
    }
    let paths = config.paths()?;
    paths.ensure()?;

    match cli.command.unwrap_or(Commands::Menu) {
        Commands::Menu => run_interactive(config, paths, cli.offline, State::Menu).await,
        Commands::Resume => run_interactive(config, paths, cli.offline, State::Resume).await,
        Commands::Set { path } => handle_set(&path),
        Commands::List => handle_list(&paths),
        Commands::History { limit } => handle_history(&paths, limit),
        Commands::Config { init } => {
            if init {
                init_config(&config, &LooperConfig::config_file_path()?)?;
            }
            handle_config(&config, &paths)
        }
    }
}

/// Resolve the remote capability once: `None` when offline or when no HTTP
/// client can be built.
fn image_source(config: &LooperConfig, offline: bool) -> Option<Arc<dyn ImageSource>> {
    if offline {
        return None;
    }
    match HttpImageSource::new(config.request_timeout()) {
        Ok(source) => Some(Arc::new(source) as Arc<dyn ImageSource>),
        Err(e) => {
            emit(
                Level::Warn,
                "online.client_failed",
                &format!("Online downloads unavailable: {}", e),
                None,
            );
            None
        }
    }
}

async fn run_interactive(
    config: LooperConfig,
    paths: LooperPaths,
    offline: bool,
    start: State,
) -> Result<()> {
    let source = image_source(&config, offline);
    let setter = WallpaperSetter::detect();
    emit(
        Level::Debug,
        "wallpaper.backend",
        &format!("Using {} wallpaper backend", setter.backend_name()),
        None,
    );

    let orchestrator = Orchestrator::new(
        config,
        paths,
        setter,
        images::dialog::default_dialog(),
        Box::new(ConsolePrompter),
        source,
    );

    match orchestrator.run(start).await? {
        Outcome::Exited => {}
        Outcome::Looped { steps } => emit(
            Level::Success,
            "session.done",
            &format!("Loop stopped after {} wallpaper change(s).", steps),
            None,
        ),
    }
    Ok(())
}

fn handle_set(path: &Path) -> Result<()> {
    let path = std::path::absolute(path).context("resolving wallpaper path")?;
    let setter = WallpaperSetter::detect();
    if !setter.apply(&path) {
        anyhow::bail!("Could not set wallpaper to {}", path.display());
    }
    emit(
        Level::Success,
        "wallpaper.set",
        &format!("Wallpaper set to: {}", path.display().to_string().green()),
        None,
    );
    Ok(())
}

fn handle_list(paths: &LooperPaths) -> Result<()> {
    let found = images::gather(&paths.images_dir);
    if found.is_empty() {
        emit(
            Level::Info,
            "list.empty",
            &format!("No images in {}", paths.images_dir.display()),
            None,
        );
        return Ok(());
    }
    for image in &found {
        emit(
            Level::Info,
            "list.image",
            &image.display().to_string(),
            Some(serde_json::json!({ "path": image })),
        );
    }
    emit(
        Level::Info,
        "list.total",
        &format!("{} image(s)", found.len()),
        None,
    );
    Ok(())
}

fn describe(entry: &MetadataEntry) -> String {
    match entry {
        MetadataEntry::Download {
            theme, filepath, ..
        } => format!("downloaded {} image {}", theme, filepath.display()),
        MetadataEntry::Run {
            image,
            duration,
            shuffle,
            count,
            ..
        } => format!(
            "#{} set {} ({}s{})",
            count,
            image.display(),
            duration,
            if *shuffle { ", shuffled" } else { "" }
        ),
    }
}

fn handle_history(paths: &LooperPaths, limit: usize) -> Result<()> {
    let store = MetadataStore::new(&paths.metadata_file);
    let recent = store.recent(limit);
    if recent.is_empty() {
        emit(Level::Info, "history.empty", "No history recorded yet.", None);
        return Ok(());
    }

    for entry in &recent {
        let time = entry.time().format("%Y-%m-%d %H:%M:%S UTC").to_string();
        emit(
            Level::Info,
            "history.entry",
            &format!("{}  {:<8} {}", time.dimmed(), entry.kind(), describe(entry)),
            serde_json::to_value(entry).ok(),
        );
    }
    Ok(())
}

/// Write `config` to `path` unless a config file is already there.
fn init_config(config: &LooperConfig, path: &Path) -> Result<bool> {
    if path.exists() {
        emit(
            Level::Warn,
            "config.exists",
            &format!("Config file already exists at {}", path.display()),
            None,
        );
        return Ok(false);
    }
    config.save_to(path)?;
    emit(
        Level::Success,
        "config.created",
        &format!("Wrote config file to {}", path.display()),
        None,
    );
    Ok(true)
}

fn handle_config(config: &LooperConfig, paths: &LooperPaths) -> Result<()> {
    let toml = toml::to_string_pretty(config).context("serializing config to toml")?;
    let config_file = LooperConfig::config_file_path()?;
    emit(
        Level::Info,
        "config.file",
        &format!("Config file: {}", config_file.display()),
        None,
    );
    emit(
        Level::Info,
        "config.values",
        toml.trim_end(),
        serde_json::to_value(config).ok(),
    );
    separator();
    emit(
        Level::Info,
        "config.paths",
        &format!(
            "Images: {}\nSession: {}\nMetadata: {}",
            paths.images_dir.display(),
            paths.session_file.display(),
            paths.metadata_file.display()
        ),
        None,
    );
    Ok(())
}
