use anyhow::{Context, Result};
use std::ffi::c_void;
use std::os::windows::ffi::OsStrExt;
use std::path::Path;

use ::windows::Win32::UI::WindowsAndMessaging::{
    SPI_SETDESKWALLPAPER, SPIF_SENDCHANGE, SPIF_UPDATEINIFILE, SystemParametersInfoW,
};

use super::WallpaperBackend;

pub struct WindowsBackend;

impl WallpaperBackend for WindowsBackend {
    fn name(&self) -> &str {
        "windows"
    }

    fn apply(&self, path: &Path) -> Result<()> {
        let mut wide: Vec<u16> = path.as_os_str().encode_wide().chain(Some(0)).collect();

        // SAFETY: `wide` is a NUL terminated UTF-16 buffer that outlives the call.
        unsafe {
            SystemParametersInfoW(
                SPI_SETDESKWALLPAPER,
                0,
                Some(wide.as_mut_ptr() as *mut c_void),
                SPIF_UPDATEINIFILE | SPIF_SENDCHANGE,
            )
        }
        .context("SystemParametersInfoW rejected the wallpaper")?;
        Ok(())
    }
}
