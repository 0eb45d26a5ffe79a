//! Backend endpoint configuration.

use crate::error::{AuthError, AuthResult};
use url::Url;

/// Path of the token refresh endpoint, relative to the base URL.
pub const REFRESH_PATH: &str = "/auth/refresh";

/// Backend location for all REST calls.
///
/// The base URL is external configuration; everything else is a fixed path
/// relative to it.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    base_url: String,
}

impl ApiConfig {
    /// Create a config from the backend base URL.
    ///
    /// The URL is validated up front so a bad deployment value fails at
    /// startup rather than on the first request.
    pub fn new(base_url: impl Into<String>) -> AuthResult<Self> {
        let base_url = base_url.into();
        let parsed = Url::parse(&base_url)
            .map_err(|e| AuthError::Config(format!("invalid base URL {}: {}", base_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(AuthError::Config(format!(
                "unsupported base URL scheme: {}",
                parsed.scheme()
            )));
        }
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Absolute URL for an endpoint path (path must start with `/`).
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Absolute URL of the token refresh endpoint.
    pub fn refresh_url(&self) -> String {
        self.url_for(REFRESH_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_base_url() {
        let config = ApiConfig::new("https://api.swiftbite.app").unwrap();
        assert_eq!(
            config.url_for("/orders/active"),
            "https://api.swiftbite.app/orders/active"
        );
        assert_eq!(
            config.refresh_url(),
            "https://api.swiftbite.app/auth/refresh"
        );
    }

    #[test]
    fn trailing_slash_is_normalized() {
        let config = ApiConfig::new("https://api.swiftbite.app/").unwrap();
        assert_eq!(
            config.url_for("/orders/active"),
            "https://api.swiftbite.app/orders/active"
        );
    }

    #[test]
    fn invalid_url_rejected() {
        assert!(ApiConfig::new("not a url").is_err());
        assert!(ApiConfig::new("ftp://api.swiftbite.app").is_err());
    }
}
