//! Create, remove and list desktop launchers that open a web page in a
//! Chromium-based browser's app mode.

pub mod config;
pub mod desktop;
pub mod detect;
pub mod error;
pub mod fetch;
pub mod manager;
pub mod validate;

pub use config::{Settings, SUPPORTED_BROWSERS};
pub use detect::{EnvProbe, Platform, SystemEnv};
pub use error::{Error, ErrorKind, Result};
pub use fetch::{Fetcher, HttpFetcher};
pub use manager::{AddRequest, AppManager, Created, ListedApp, WebApp, Warning};
