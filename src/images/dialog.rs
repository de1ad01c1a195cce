use std::path::PathBuf;

use crate::ui::prelude::*;

/// Something that lets the user choose image files to add to a session.
pub trait DialogProvider: Send + Sync {
    /// Selected files. An empty list means nothing was chosen or the surface
    /// is unavailable.
    fn pick_images(&self) -> Vec<PathBuf>;

    fn name(&self) -> &'static str;
}

/// Native file-open dialog restricted to image files.
#[cfg(feature = "native-dialog")]
pub struct NativeDialog;

#[cfg(feature = "native-dialog")]
impl DialogProvider for NativeDialog {
    fn pick_images(&self) -> Vec<PathBuf> {
        rfd::FileDialog::new()
            .add_filter("Image files", super::IMAGE_EXTENSIONS)
            .set_title("Select images to add to session_images/")
            .pick_files()
            .unwrap_or_default()
    }

    fn name(&self) -> &'static str {
        "native dialog"
    }
}

/// Prompt for whitespace separated paths on the terminal. `~` is expanded.
pub struct TerminalPicker;

impl TerminalPicker {
    fn parse(line: &str) -> Vec<PathBuf> {
        line.split_whitespace()
            .map(|p| PathBuf::from(shellexpand::tilde(p).into_owned()))
            .collect()
    }
}

impl DialogProvider for TerminalPicker {
    fn pick_images(&self) -> Vec<PathBuf> {
        let line = dialoguer::Input::<String>::new()
            .with_prompt("Image paths to add (separated by spaces, empty to skip)")
            .allow_empty(true)
            .interact_text();
        match line {
            Ok(line) => Self::parse(&line),
            Err(e) => {
                emit(
                    Level::Warn,
                    "dialog.input_failed",
                    &format!("Could not read image paths: {}", e),
                    None,
                );
                Vec::new()
            }
        }
    }

    fn name(&self) -> &'static str {
        "terminal prompt"
    }
}

/// The best picker this build supports.
pub fn default_dialog() -> Box<dyn DialogProvider> {
    #[cfg(feature = "native-dialog")]
    {
        Box::new(NativeDialog)
    }
    #[cfg(not(feature = "native-dialog"))]
    {
        Box::new(TerminalPicker)
    }
}
