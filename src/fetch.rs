//! Icon download over HTTP.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::debug;
use url::Url;

use crate::error::{Error, Result};

/// Timeout for the content-type probe only; downloads are unbounded.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// MIME types accepted as icon images.
pub const IMAGE_CONTENT_TYPES: &[&str] = &[
    "image/png",
    "image/jpeg",
    "image/gif",
    "image/webp",
    "image/svg+xml",
    "image/x-icon",
    "image/vnd.microsoft.icon",
];

pub trait Fetcher {
    /// `Content-Type` reported by a HEAD request, if the server sent one.
    fn content_type(&self, url: &Url) -> Result<Option<String>>;

    /// Body of a successful GET, following redirects.
    fn download(&self, url: &Url) -> Result<Vec<u8>>;
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("web2app/", env!("CARGO_PKG_VERSION")))
            .timeout(None::<Duration>)
            .build()
            .map_err(Error::HttpClient)?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    fn content_type(&self, url: &Url) -> Result<Option<String>> {
        let response = self
            .client
            .head(url.clone())
            .timeout(PROBE_TIMEOUT)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|source| Error::Http {
                url: url.to_string(),
                source,
            })?;

        Ok(response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string))
    }

    fn download(&self, url: &Url) -> Result<Vec<u8>> {
        debug!("Downloading {}", url);
        let response = self
            .client
            .get(url.clone())
            .send()
            .map_err(|source| Error::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().map_err(|source| Error::Http {
            url: url.to_string(),
            source,
        })?;
        debug!("Downloaded {} bytes from {}", bytes.len(), url);
        Ok(bytes.to_vec())
    }
}

/// Whether a `Content-Type` header value names an accepted image type.
pub fn is_image_content_type(value: &str) -> bool {
    let mime = value.split(';').next().unwrap_or_default().trim();
    IMAGE_CONTENT_TYPES
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(mime))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::Cell;

    /// Serves fixed HEAD and GET responses and counts downloads.
    pub(crate) struct FakeFetcher {
        pub head: std::result::Result<Option<String>, u16>,
        pub body: std::result::Result<Vec<u8>, u16>,
        pub downloads: Cell<usize>,
    }

    impl FakeFetcher {
        pub fn png() -> Self {
            Self {
                head: Ok(Some("image/png".into())),
                body: Ok(b"\x89PNG\r\n\x1a\n".to_vec()),
                downloads: Cell::new(0),
            }
        }

        pub fn status(status: u16) -> Self {
            Self {
                head: Err(status),
                body: Err(status),
                downloads: Cell::new(0),
            }
        }

        pub fn with_head(mut self, head: std::result::Result<Option<&str>, u16>) -> Self {
            self.head = head.map(|ct| ct.map(str::to_string));
            self
        }
    }

    impl Fetcher for FakeFetcher {
        fn content_type(&self, url: &Url) -> Result<Option<String>> {
            self.head.clone().map_err(|status| Error::HttpStatus {
                url: url.to_string(),
                status,
            })
        }

        fn download(&self, url: &Url) -> Result<Vec<u8>> {
            self.downloads.set(self.downloads.get() + 1);
            self.body.clone().map_err(|status| Error::HttpStatus {
                url: url.to_string(),
                status,
            })
        }
    }

    #[test]
    fn image_content_types() {
        assert!(is_image_content_type("image/png"));
        assert!(is_image_content_type("image/SVG+xml; charset=utf-8"));
        assert!(!is_image_content_type("text/html; charset=utf-8"));
        assert!(!is_image_content_type(""));
    }
}
