use std::path::PathBuf;

use crate::error::{Error, Result};

/// Chromium-based browsers in order of preference.
pub const SUPPORTED_BROWSERS: &[&str] = &[
    "helium-browser",
    "chromium",
    "chromium-browser",
    "google-chrome",
    "google-chrome-stable",
    "brave-browser",
    "brave",
    "microsoft-edge",
    "microsoft-edge-stable",
];

/// Where web apps live and which browsers may launch them.
#[derive(Debug, Clone)]
pub struct Settings {
    pub apps_dir: PathBuf,
    pub browsers: &'static [&'static str],
}

impl Settings {
    /// Settings rooted at `apps_dir`, or at the user's
    /// `~/.local/share/applications` when none is given.
    pub fn new(apps_dir: Option<PathBuf>) -> Result<Self> {
        let apps_dir = match apps_dir {
            Some(dir) => dir,
            None => default_apps_dir()?,
        };
        Ok(Self {
            apps_dir,
            browsers: SUPPORTED_BROWSERS,
        })
    }

    pub fn icons_dir(&self) -> PathBuf {
        self.apps_dir.join("icons")
    }

    pub fn desktop_path(&self, name: &str) -> PathBuf {
        self.apps_dir.join(format!("{}.desktop", name))
    }

    pub fn icon_path(&self, name: &str) -> PathBuf {
        self.icons_dir().join(format!("{}.png", name))
    }

    pub fn with_browsers(mut self, browsers: &'static [&'static str]) -> Self {
        self.browsers = browsers;
        self
    }
}

fn default_apps_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(".local").join("share").join("applications"))
        .ok_or(Error::NoHomeDir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_share_the_app_name_as_stem() {
        let settings = Settings::new(Some(PathBuf::from("/tmp/apps"))).unwrap();
        assert_eq!(
            settings.desktop_path("myapp"),
            PathBuf::from("/tmp/apps/myapp.desktop")
        );
        assert_eq!(
            settings.icon_path("myapp"),
            PathBuf::from("/tmp/apps/icons/myapp.png")
        );
    }

    #[test]
    fn chromium_is_preferred_over_chrome() {
        let chromium = SUPPORTED_BROWSERS.iter().position(|b| *b == "chromium");
        let chrome = SUPPORTED_BROWSERS.iter().position(|b| *b == "google-chrome");
        assert!(chromium < chrome);
        assert_eq!(SUPPORTED_BROWSERS[0], "helium-browser");
    }
}
