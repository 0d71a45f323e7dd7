//! Client configuration

use std::time::Duration;

use url::Url;

use crate::error::Error;

/// OAuth gateway used when neither `OAUTH_BASE_URL` nor `NEXT_PUBLIC_OAUTH_BASE_URL` is set
pub const DEFAULT_OAUTH_BASE_URL: &str = "http://localhost:8080";

/// Application origin serving the cookie endpoint when `APP_BASE_URL` is not set
pub const DEFAULT_APP_BASE_URL: &str = "http://localhost:3000";

/// Timeout applied to every outbound auth request
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Endpoints and limits used by the client side of the auth flow.
///
/// Use [`from_env()`](ClientConfig::from_env) for deployments, or [`new()`](ClientConfig::new)
/// with `with_*` methods for full control.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    oauth_base_url: Url,
    app_base_url: Url,
    request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(
            DEFAULT_OAUTH_BASE_URL
                .parse()
                .expect("valid default URL"),
            DEFAULT_APP_BASE_URL.parse().expect("valid default URL"),
        )
    }
}

impl ClientConfig {
    pub fn new(oauth_base_url: Url, app_base_url: Url) -> Self {
        Self {
            oauth_base_url,
            app_base_url,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Creates config from environment variables.
    ///
    /// # Optional env vars
    /// - `OAUTH_BASE_URL`: base URL of the external OAuth gateway, `NEXT_PUBLIC_OAUTH_BASE_URL` is
    ///   read when it is not set
    /// - `APP_BASE_URL`: origin serving `/api/auth/set-cookie`
    /// - `AUTH_REQUEST_TIMEOUT_SECS`: timeout for outbound auth requests
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&'static str) -> Option<String>) -> Result<Self, Error> {
        let mut config = Self::default();

        let oauth_base_url = ["OAUTH_BASE_URL", "NEXT_PUBLIC_OAUTH_BASE_URL"]
            .into_iter()
            .find_map(|name| lookup(name).map(|value| (name, value)));
        if let Some((name, value)) = oauth_base_url {
            config.oauth_base_url = parse_url(name, value)?;
        }

        if let Some(value) = lookup("APP_BASE_URL") {
            config.app_base_url = parse_url("APP_BASE_URL", value)?;
        }

        if let Some(value) = lookup("AUTH_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = value.trim().parse().map_err(|_| Error::InvalidEnv {
                name: "AUTH_REQUEST_TIMEOUT_SECS",
                value: value.clone(),
            })?;
            config.request_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    pub fn with_oauth_base_url(mut self, url: Url) -> Self {
        self.oauth_base_url = url;
        self
    }

    pub fn with_app_base_url(mut self, url: Url) -> Self {
        self.app_base_url = url;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn oauth_base_url(&self) -> &Url {
        &self.oauth_base_url
    }

    pub fn app_base_url(&self) -> &Url {
        &self.app_base_url
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// HTTP client shared by the auth requests.
    ///
    /// The cookie jar plays the browser's part: cookies set by the app origin are sent back on
    /// later requests, and nothing in this crate reads them.
    pub(crate) fn http_client(&self) -> Result<reqwest::Client, Error> {
        reqwest::Client::builder()
            .timeout(self.request_timeout)
            .cookie_store(true)
            .build()
            .map_err(Into::into)
    }
}

/// Appends `path` to `base` keeping any path prefix the base already has
pub(crate) fn join(base: &Url, name: &'static str, path: &str) -> Result<Url, Error> {
    let joined = format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    parse_url(name, joined)
}

fn parse_url(name: &'static str, value: String) -> Result<Url, Error> {
    Url::parse(value.trim()).map_err(|source| Error::InvalidUrl {
        name,
        value,
        source,
    })
}
