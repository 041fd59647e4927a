//! Chrome/Chromium executable discovery.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{Result, ScrapeError};

/// Common Chrome executable paths to check.
const CHROME_PATHS: &[&str] = &[
    // Linux
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
    // macOS
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    // Common install locations
    "/opt/google/chrome/google-chrome",
];

const CHROME_COMMANDS: &[&str] = &[
    "google-chrome",
    "google-chrome-stable",
    "chromium",
    "chromium-browser",
];

/// Locate a Chrome executable.
///
/// A configured path must exist; it is never silently replaced by a discovered
/// one. Otherwise well-known install paths are checked, then `PATH`.
pub fn find_chrome_executable(configured: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = configured {
        if path.exists() {
            info!("Using configured Chrome at: {}", path.display());
            return Ok(path.to_path_buf());
        }
        return Err(ScrapeError::Launch(format!(
            "configured Chrome executable not found: {}",
            path.display()
        )));
    }

    for path in CHROME_PATHS {
        let p = Path::new(path);
        if p.exists() {
            info!("Found Chrome at: {}", path);
            return Ok(p.to_path_buf());
        }
    }

    for cmd in CHROME_COMMANDS {
        if let Ok(path) = which::which(cmd) {
            info!("Found Chrome in PATH: {}", path.display());
            return Ok(path);
        }
    }

    Err(ScrapeError::Launch(
        "Chrome/Chromium not found. Install it or set CHROME_PATH:\n\
         - Ubuntu/Debian: sudo apt install chromium-browser\n\
         - Fedora: sudo dnf install chromium\n\
         - Arch/Manjaro: sudo pacman -S chromium"
            .to_string(),
    ))
}
