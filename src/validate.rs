use url::Url;

use crate::error::{Error, Result};

/// Parses `value` as an absolute `http`/`https` URL with a host.
///
/// `field` names the argument in the error message ("url", "icon url").
pub fn validate_url(field: &'static str, value: &str) -> Result<Url> {
    let invalid = |reason: String| Error::InvalidUrl {
        field,
        value: value.to_string(),
        reason,
    };

    let url = Url::parse(value).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!(
            "scheme must be http or https, got '{}'",
            url.scheme()
        )));
    }
    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(invalid("missing host".into())),
    }
}

/// App names double as file stems, so they must stay inside the apps directory.
pub fn validate_name(name: &str) -> Result<()> {
    let reason = if name.trim().is_empty() {
        Some("name must not be empty")
    } else if name == "." || name == ".." {
        Some("name must not be a relative path component")
    } else if name.contains('/') {
        Some("name must not contain '/'")
    } else if name.chars().any(char::is_control) {
        Some("name must not contain control characters")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(Error::InvalidName {
            name: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}
