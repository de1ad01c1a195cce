//! The wallpaper loop.

use rand::seq::SliceRandom;
use std::path::PathBuf;
use std::time::Duration;

use crate::store::{MetadataEntry, MetadataStore, SessionStore};
use crate::ui::prelude::*;
use crate::wallpaper::WallpaperSetter;

pub mod cancel;

pub use cancel::{CancellationToken, cancel_on_ctrl_c};

pub struct Runner<'a> {
    setter: &'a WallpaperSetter,
    metadata: &'a MetadataStore,
    sessions: &'a SessionStore,
    token: CancellationToken,
}

impl<'a> Runner<'a> {
    pub fn new(
        setter: &'a WallpaperSetter,
        metadata: &'a MetadataStore,
        sessions: &'a SessionStore,
        token: CancellationToken,
    ) -> Self {
        Self {
            setter,
            metadata,
            sessions,
            token,
        }
    }

    /// Cycle through `images` until the token is cancelled, showing each one
    /// for `duration` seconds. With `shuffle` the order is permuted once up
    /// front. Every step is logged to the metadata store before the wallpaper
    /// is applied; a failed application does not stop the loop.
    ///
    /// On cancellation the session is checkpointed with `images`, `duration`
    /// and `shuffle`. Returns the number of steps taken.
    pub async fn run(&self, images: &[PathBuf], duration: u64, shuffle: bool) -> u64 {
        if images.is_empty() {
            emit(Level::Error, "runner.no_images", "No images to loop over.", None);
            return 0;
        }

        let mut pool = images.to_vec();
        if shuffle {
            pool.shuffle(&mut rand::thread_rng());
        }

        emit(
            Level::Info,
            "runner.start",
            &format!(
                "Starting wallpaper loop with {} images, {}s per image. Press Ctrl+C to stop.",
                pool.len(),
                duration
            ),
            Some(serde_json::json!({
                "images": pool.len(),
                "duration": duration,
                "shuffle": shuffle,
            })),
        );

        let wait = Duration::from_secs(duration);
        let mut count = 0u64;
        for image in pool.iter().cycle() {
            if self.token.is_cancelled() {
                break;
            }
            count += 1;
            self.metadata
                .record(&MetadataEntry::run(image.clone(), duration, shuffle, count));

            let ok = self.setter.apply(image);
            emit(
                if ok { Level::Success } else { Level::Warn },
                "runner.applied",
                &format!(
                    "[{}] Set: {} (success={}), next in {}s",
                    count,
                    image.display(),
                    ok,
                    duration
                ),
                Some(serde_json::json!({
                    "count": count,
                    "image": image,
                    "success": ok,
                })),
            );

            if !cancel::sleep(&self.token, wait).await {
                break;
            }
        }

        emit(
            Level::Info,
            "runner.stopped",
            "Stopped by user. Saving session and exiting.",
            None,
        );
        self.sessions.checkpoint(images, duration, shuffle);
        count
    }
}
