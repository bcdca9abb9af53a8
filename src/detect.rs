use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use tracing::debug;

/// Display server a web app window should be created for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Platform {
    Wayland,
    X11,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Wayland => "wayland",
            Platform::X11 => "x11",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only view of the host environment used for auto-detection.
pub trait EnvProbe {
    fn var(&self, key: &str) -> Option<String>;

    /// Full path of `name` if it is an executable somewhere on `PATH`.
    fn find_executable(&self, name: &str) -> Option<PathBuf>;
}

/// Probe backed by the real process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemEnv;

impl EnvProbe for SystemEnv {
    fn var(&self, key: &str) -> Option<String> {
        env::var(key).ok()
    }

    fn find_executable(&self, name: &str) -> Option<PathBuf> {
        let path = env::var_os("PATH")?;
        env::split_paths(&path)
            .map(|dir| dir.join(name))
            .find(|candidate| is_executable(candidate))
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

pub fn detect_display_server(env: &impl EnvProbe) -> Platform {
    let wayland_display = env.var("WAYLAND_DISPLAY").is_some_and(|v| !v.is_empty());
    if wayland_display || env.var("XDG_SESSION_TYPE").as_deref() == Some("wayland") {
        Platform::Wayland
    } else {
        Platform::X11
    }
}

/// First browser from `preference` that is present on `PATH`.
pub fn detect_browser<'a>(env: &impl EnvProbe, preference: &[&'a str]) -> Option<&'a str> {
    preference.iter().copied().find(|browser| {
        let found = env.find_executable(browser);
        if let Some(ref path) = found {
            debug!("Detected browser {} at {:?}", browser, path);
        }
        found.is_some()
    })
}
