use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use super::{absolutize, is_image};
use crate::common::progress::{create_spinner, finish_spinner};
use crate::config::Resolution;
use crate::error::{LooperError, LooperResult};
use crate::store::{MetadataEntry, MetadataStore};
use crate::ui::prelude::*;

const PICSUM_URL: &str = "https://picsum.photos";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Nature,
    Graffiti,
}

impl Theme {
    pub const ALL: [Theme; 2] = [Theme::Nature, Theme::Graffiti];

    /// Map a user supplied theme name onto a supported theme. Unknown or empty
    /// names fall back to [`Theme::Nature`].
    pub fn resolve(name: &str) -> Theme {
        match name.trim().to_lowercase().as_str() {
            "graffiti" => Theme::Graffiti,
            _ => Theme::Nature,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Nature => "nature",
            Theme::Graffiti => "graffiti",
        }
    }

    /// Request URL for one random image of this theme.
    pub fn url(self, signature: u32, resolution: Resolution) -> String {
        match self {
            // picsum has no categories, both themes share the random endpoint
            Theme::Nature | Theme::Graffiti => format!(
                "{}/{}/{}?random={}",
                PICSUM_URL, resolution.width, resolution.height, signature
            ),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Remote capability used to fetch image bytes.
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn fetch(&self, url: &str) -> LooperResult<Vec<u8>>;
}

pub struct HttpImageSource {
    client: reqwest::Client,
}

impl HttpImageSource {
    pub fn new(timeout: Duration) -> LooperResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("wallloop/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ImageSource for HttpImageSource {
    async fn fetch(&self, url: &str) -> LooperResult<Vec<u8>> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(LooperError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(resp.bytes().await?.to_vec())
    }
}

/// Downloads themed images into the session images directory, reusing
/// earlier downloads unless a refresh is forced.
pub struct Downloader {
    images_dir: PathBuf,
    metadata: MetadataStore,
    source: Arc<dyn ImageSource>,
    resolution: Resolution,
    polite_delay: Duration,
}

impl Downloader {
    pub fn new(
        images_dir: impl Into<PathBuf>,
        metadata: MetadataStore,
        source: Arc<dyn ImageSource>,
    ) -> Self {
        Self {
            images_dir: images_dir.into(),
            metadata,
            source,
            resolution: Resolution::default(),
            polite_delay: Duration::from_millis(200),
        }
    }

    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_polite_delay(mut self, delay: Duration) -> Self {
        self.polite_delay = delay;
        self
    }

    /// Files from earlier downloads of `theme`, most recently modified first.
    pub fn cached(&self, theme: Theme) -> Vec<PathBuf> {
        let dir = glob::Pattern::escape(&self.images_dir.to_string_lossy());
        let pattern = format!("{}/{}_*", dir, theme.as_str());
        let Ok(paths) = glob::glob(&pattern) else {
            return Vec::new();
        };

        let mut cached: Vec<(SystemTime, PathBuf)> = paths
            .filter_map(|p| p.ok())
            .filter(|p| p.is_file() && is_image(p))
            .map(|p| {
                let modified = p
                    .metadata()
                    .and_then(|m| m.modified())
                    .unwrap_or(SystemTime::UNIX_EPOCH);
                (modified, absolutize(&p))
            })
            .collect();
        cached.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
        cached.into_iter().map(|(_, p)| p).collect()
    }

    /// Return up to `count` images for `theme`. Cached files are reused unless
    /// `force_refresh` is set; otherwise `count` download attempts are made and
    /// whatever succeeded is returned.
    pub async fn download(&self, theme: &str, count: u32, force_refresh: bool) -> Vec<PathBuf> {
        let theme = Theme::resolve(theme);

        if !force_refresh {
            let cached = self.cached(theme);
            if !cached.is_empty() {
                emit(
                    Level::Info,
                    "download.cache_hit",
                    &format!("Reusing {} cached {} image(s).", cached.len().min(count as usize), theme),
                    None,
                );
                return cached.into_iter().take(count as usize).collect();
            }
        }

        let mut downloaded = Vec::new();
        for attempt in 1..=count {
            let spinner = create_spinner(format!("Downloading {} image {}/{}...", theme, attempt, count));
            let result = self.download_one(theme).await;
            finish_spinner(spinner);

            match result {
                Ok(path) => {
                    emit(
                        Level::Debug,
                        "download.saved",
                        &format!("Saved {}", path.display()),
                        None,
                    );
                    downloaded.push(path);
                }
                Err(e) => emit(
                    Level::Warn,
                    "download.failed",
                    &format!("Download error #{} for {}: {}", attempt, theme, e),
                    None,
                ),
            }
            tokio::time::sleep(self.polite_delay).await;
        }
        downloaded
    }

    async fn download_one(&self, theme: Theme) -> LooperResult<PathBuf> {
        let signature = rand::thread_rng().gen_range(1..=i32::MAX as u32);
        let url = theme.url(signature, self.resolution);
        let bytes = self.source.fetch(&url).await?;

        let suffix = rand::thread_rng().gen_range(1000..=9999);
        let name = format!("{}_{}_{}.jpg", theme, Utc::now().timestamp(), suffix);
        let path = absolutize(&self.images_dir.join(name));
        tokio::fs::write(&path, &bytes).await?;

        self.metadata
            .record(&MetadataEntry::download(theme.as_str(), path.clone(), &url));
        Ok(path)
    }

    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }
}
