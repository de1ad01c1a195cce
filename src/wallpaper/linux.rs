use anyhow::Result;
use std::path::Path;

use super::{WallpaperBackend, gnome, kwin, x11};
use crate::ui::prelude::*;

type MechanismFn = fn(&Path) -> Result<()>;
type Mechanism = (&'static str, MechanismFn);

/// Tries GNOME, then KDE Plasma, then feh. The first mechanism that succeeds
/// wins.
pub struct LinuxBackend {
    mechanisms: Vec<Mechanism>,
}

impl Default for LinuxBackend {
    fn default() -> Self {
        Self {
            mechanisms: vec![
                ("gsettings", gnome::apply_wallpaper as MechanismFn),
                ("plasmashell", kwin::apply_wallpaper as MechanismFn),
                ("feh", x11::apply_wallpaper as MechanismFn),
            ],
        }
    }
}

impl LinuxBackend {
    pub fn mechanism_names(&self) -> Vec<&'static str> {
        self.mechanisms.iter().map(|(name, _)| *name).collect()
    }
}

impl WallpaperBackend for LinuxBackend {
    fn name(&self) -> &str {
        "linux"
    }

    fn apply(&self, path: &Path) -> Result<()> {
        for (name, apply) in &self.mechanisms {
            match apply(path) {
                Ok(()) => {
                    emit(
                        Level::Debug,
                        "wallpaper.linux.applied",
                        &format!("Wallpaper set via {}", name),
                        None,
                    );
                    return Ok(());
                }
                Err(e) => emit(
                    Level::Debug,
                    "wallpaper.linux.mechanism_failed",
                    &format!("{} did not work: {:#}", name, e),
                    None,
                ),
            }
        }
        anyhow::bail!("Could not set wallpaper on this Linux desktop environment")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fail(_: &Path) -> Result<()> {
        anyhow::bail!("unavailable")
    }

    fn succeed(_: &Path) -> Result<()> {
        Ok(())
    }

    #[test]
    fn default_chain_order() {
        assert_eq!(
            LinuxBackend::default().mechanism_names(),
            vec!["gsettings", "plasmashell", "feh"]
        );
    }

    #[test]
    fn first_success_stops_the_chain() {
        let backend = LinuxBackend {
            mechanisms: vec![
                ("a", fail as MechanismFn),
                ("b", succeed as MechanismFn),
                ("c", fail as MechanismFn),
            ],
        };
        assert!(backend.apply(Path::new("/x.png")).is_ok());
    }

    #[test]
    fn all_failing_reports_unsupported_desktop() {
        let backend = LinuxBackend {
            mechanisms: vec![("a", fail as MechanismFn), ("b", fail as MechanismFn)],
        };
        let err = backend.apply(Path::new("/x.png")).unwrap_err();
        assert!(err.to_string().contains("Linux desktop environment"));
    }
}
