//! Lifecycle of web apps: create, remove and list.
//!
//! A web app is a pair of files keyed by its name:
//! `<apps-dir>/<name>.desktop` and `<apps-dir>/icons/<name>.png`.
//! The desktop entry is authoritative; an icon on its own is not an app.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::config::Settings;
use crate::desktop::{parse_entry, DesktopEntry};
use crate::detect::{detect_browser, detect_display_server, EnvProbe, Platform};
use crate::error::{Error, Result};
use crate::fetch::{is_image_content_type, Fetcher};
use crate::validate::{validate_name, validate_url};

/// Arguments of `add`.
#[derive(Debug, Clone)]
pub struct AddRequest {
    pub name: String,
    pub url: String,
    pub icon_url: String,
    pub platform: Option<Platform>,
    pub browser: Option<String>,
}

/// A web app as it was written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebApp {
    pub name: String,
    pub url: String,
    pub icon_path: PathBuf,
    pub desktop_path: PathBuf,
    pub browser: String,
    pub platform: Platform,
}

/// One row of `list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedApp {
    pub name: String,
    pub url: String,
    pub has_icon: bool,
}

/// Non-fatal conditions reported back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    MissingIcon { name: String },
    UnexpectedContentType { url: String, content_type: String },
    NoContentType { url: String },
    ProbeFailed { url: String, reason: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::MissingIcon { name } => {
                write!(f, "webapp icon with name '{}' not found.", name)
            }
            Warning::UnexpectedContentType { url, content_type } => write!(
                f,
                "icon url {} reports content type '{}', which is not an image.",
                url, content_type
            ),
            Warning::NoContentType { url } => {
                write!(f, "icon url {} did not report a content type.", url)
            }
            Warning::ProbeFailed { url, reason } => {
                write!(f, "could not check icon url {}: {}", url, reason)
            }
        }
    }
}

/// Result of a successful `create`.
#[derive(Debug)]
pub struct Created {
    pub app: WebApp,
    pub warnings: Vec<Warning>,
}

pub struct AppManager<E> {
    settings: Settings,
    env: E,
}

impl<E: EnvProbe> AppManager<E> {
    pub fn new(settings: Settings, env: E) -> Self {
        Self { settings, env }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Downloads the icon and writes the desktop entry for a new web app.
    ///
    /// Every argument is validated before anything touches the network or
    /// the file system. Both files are staged next to their destinations and
    /// only moved into place once both have been written. An icon being
    /// replaced is kept aside until the new entry is in place.
    pub fn create(&self, request: &AddRequest, fetcher: &impl Fetcher) -> Result<Created> {
        validate_name(&request.name)?;
        validate_url("url", &request.url)?;
        let icon_url = validate_url("icon url", &request.icon_url)?;

        let platform = request
            .platform
            .unwrap_or_else(|| detect_display_server(&self.env));
        let browser = match request.browser.as_deref() {
            Some(browser) => browser.to_string(),
            None => detect_browser(&self.env, self.settings.browsers)
                .ok_or_else(|| Error::NoBrowser {
                    supported: self.settings.browsers.iter().map(|b| b.to_string()).collect(),
                })?
                .to_string(),
        };
        debug!("Using browser {} on {}", browser, platform);

        let mut warnings = Vec::new();
        if let Some(warning) = probe_icon(fetcher, &icon_url) {
            debug!("Icon probe: {}", warning);
            warnings.push(warning);
        }

        let icons_dir = self.settings.icons_dir();
        fs::create_dir_all(&icons_dir)
            .map_err(|e| Error::io("create directory", &icons_dir, e))?;

        let icon_path = self.settings.icon_path(&request.name);
        let desktop_path = self.settings.desktop_path(&request.name);
        let icon = fetcher.download(&icon_url)?;

        let entry = DesktopEntry {
            name: request.name.clone(),
            url: request.url.clone(),
            icon: icon_path.clone(),
            browser: browser.clone(),
            platform: Some(platform),
        };

        let staged_icon = stage(&icon_path, &icon, false)?;
        let staged_entry = match stage(&desktop_path, entry.render().as_bytes(), true) {
            Ok(path) => path,
            Err(e) => {
                discard(&staged_icon);
                return Err(e);
            }
        };
        let backup = match back_up(&icon_path) {
            Ok(backup) => backup,
            Err(e) => {
                discard(&staged_icon);
                discard(&staged_entry);
                return Err(e);
            }
        };
        let committed = commit(&staged_icon, &icon_path)
            .inspect_err(|_| discard(&staged_icon))
            .and_then(|()| {
                commit(&staged_entry, &desktop_path).inspect_err(|_| discard(&icon_path))
            });
        if let Err(e) = committed {
            discard(&staged_entry);
            if let Some(ref backup) = backup {
                restore(backup, &icon_path);
            }
            return Err(e);
        }
        if let Some(ref backup) = backup {
            discard(backup);
        }
        info!("Created web app {} at {:?}", request.name, desktop_path);

        Ok(Created {
            app: WebApp {
                name: request.name.clone(),
                url: entry.url,
                icon_path,
                desktop_path,
                browser,
                platform,
            },
            warnings,
        })
    }

    /// Deletes a web app. A missing icon is reported as a warning.
    pub fn remove(&self, name: &str) -> Result<Vec<Warning>> {
        validate_name(name)?;
        let desktop_path = self.settings.desktop_path(name);
        let icon_path = self.settings.icon_path(name);

        if !desktop_path.is_file() {
            return Err(Error::AppNotFound(name.to_string()));
        }

        let mut warnings = Vec::new();
        if icon_path.exists() {
            fs::remove_file(&icon_path).map_err(|e| Error::io("remove icon", &icon_path, e))?;
        } else {
            debug!("Icon {:?} is already gone", icon_path);
            warnings.push(Warning::MissingIcon {
                name: name.to_string(),
            });
        }
        fs::remove_file(&desktop_path)
            .map_err(|e| Error::io("remove desktop entry", &desktop_path, e))?;
        info!("Removed web app {}", name);

        Ok(warnings)
    }

    /// Web apps found in the apps directory, sorted by file name.
    pub fn list(&self) -> Result<Vec<ListedApp>> {
        let apps_dir = &self.settings.apps_dir;
        if !apps_dir.is_dir() {
            debug!("Apps directory {:?} does not exist", apps_dir);
            return Ok(Vec::new());
        }

        let icons_dir = self.settings.icons_dir();
        let walker = WalkDir::new(apps_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();

        let mut apps = Vec::new();
        for entry in walker.into_iter().filter_map(|e| e.ok()) {
            let path = entry.path();
            if !entry.file_type().is_file() || path.extension().is_none_or(|e| e != "desktop") {
                continue;
            }
            let Ok(content) = fs::read_to_string(path) else {
                debug!("Skipping unreadable entry {:?}", path);
                continue;
            };
            let Some(parsed) = parse_entry(&content) else {
                continue;
            };
            let has_icon = path
                .file_stem()
                .map(|stem| icons_dir.join(format!("{}.png", stem.to_string_lossy())).exists())
                .unwrap_or(false);

            apps.push(ListedApp {
                name: parsed.name,
                url: parsed.url,
                has_icon,
            });
        }
        Ok(apps)
    }
}

/// HEAD the icon url and check it looks like an image. Never fatal.
fn probe_icon(fetcher: &impl Fetcher, icon_url: &url::Url) -> Option<Warning> {
    let url = icon_url.to_string();
    match fetcher.content_type(icon_url) {
        Ok(Some(content_type)) if is_image_content_type(&content_type) => None,
        Ok(Some(content_type)) => Some(Warning::UnexpectedContentType { url, content_type }),
        Ok(None) => Some(Warning::NoContentType { url }),
        Err(e) => Some(Warning::ProbeFailed {
            url,
            reason: e.to_string(),
        }),
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.tmp", file_name))
}

/// Writes `contents` to a hidden sibling of `path` and returns its location.
fn stage(path: &Path, contents: &[u8], executable: bool) -> Result<PathBuf> {
    let staged = staging_path(path);
    fs::write(&staged, contents).map_err(|e| Error::io("write", &staged, e))?;
    if executable {
        if let Err(e) = set_executable(&staged) {
            discard(&staged);
            return Err(e);
        }
    }
    Ok(staged)
}

/// Moves an existing file at `path` aside so a failed create can put it back.
fn back_up(path: &Path) -> Result<Option<PathBuf>> {
    if !path.exists() {
        return Ok(None);
    }
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let backup = path.with_file_name(format!(".{}.bak", file_name));
    fs::rename(path, &backup).map_err(|e| Error::io("back up", path, e))?;
    Ok(Some(backup))
}

fn restore(backup: &Path, path: &Path) {
    if let Err(e) = fs::rename(backup, path) {
        debug!("Could not restore {:?} from {:?}: {}", path, backup, e);
    }
}

fn commit(staged: &Path, path: &Path) -> Result<()> {
    fs::rename(staged, path).map_err(|e| Error::io("move into place", path, e))
}

fn discard(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        debug!("Could not clean up {:?}: {}", path, e);
    }
}

#[cfg(unix)]
fn set_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
        .map_err(|e| Error::io("set permissions on", path, e))
}

#[cfg(not(unix))]
fn set_executable(_: &Path) -> Result<()> {
    Ok(())
}
