//! Starting the OAuth flow
//!
//! The external OAuth service hands out the provider authorization URL. Any failure here aborts
//! the flow before the user leaves the page and carries a message meant to be shown to them.

use std::fmt;
use std::str::FromStr;

use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info, warn};
use url::Url;

use crate::config::{self, ClientConfig};
use crate::error::Error;
use crate::redirect::Navigator;

/// Supported OAuth providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    Naver,
    Kakao,
}

impl Provider {
    /// Identifier used in URLs and redirect parameters
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Naver => "naver",
            Self::Kakao => "kakao",
        }
    }

    /// Name shown to users
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Naver => "네이버",
            Self::Kakao => "카카오",
        }
    }

    /// Whether the OAuth service issues login URLs for this provider
    pub fn is_available(self) -> bool {
        matches!(self, Self::Naver)
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown OAuth provider: {0}")]
pub struct UnknownProvider(pub String);

impl FromStr for Provider {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "naver" => Ok(Self::Naver),
            "kakao" => Ok(Self::Kakao),
            _ => Err(UnknownProvider(s.to_owned())),
        }
    }
}

/// Provider authorization URL issued by the OAuth service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginUrl {
    /// Where to send the browser
    pub url: String,
    /// CSRF state bound to this URL, when the service reports it
    pub state: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoginUrlResponse {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    state: Option<String>,
}

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("{0} login is not available yet")]
    ProviderUnavailable(Provider),
    #[error("Login URL request failed with status {status}")]
    Status { status: StatusCode, body: String },
    #[error("Login URL missing in the OAuth service response")]
    MissingUrl,
    #[error("Login URL request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Cannot build login URL endpoint: {0}")]
    Endpoint(#[from] Error),
}

impl LoginError {
    /// Message to show the user when the login cannot start
    pub fn user_message(&self) -> String {
        match self {
            Self::ProviderUnavailable(provider) => {
                format!("{} 로그인은 준비 중입니다.", provider.display_name())
            }
            Self::Status { status, .. } => format!(
                "로그인 URL 요청 실패: {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or_default()
            )
            .trim_end()
            .to_owned(),
            Self::MissingUrl => "로그인 URL을 받지 못했습니다.".to_owned(),
            Self::Request(err) => format!("로그인 요청 중 오류가 발생했습니다: {err}"),
            Self::Endpoint(err) => format!("로그인 요청 중 오류가 발생했습니다: {err}"),
        }
    }
}

/// Client of the external OAuth service
#[derive(Debug, Clone)]
pub struct LoginClient {
    http: reqwest::Client,
    base_url: Url,
}

impl LoginClient {
    pub fn new(config: &ClientConfig) -> Result<Self, Error> {
        Ok(Self {
            http: config.http_client()?,
            base_url: config.oauth_base_url().clone(),
        })
    }

    /// Use a custom HTTP client, eg. to share a cookie jar
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    /// Asks the OAuth service for the provider's authorization URL
    pub async fn request_login_url(&self, provider: Provider) -> Result<LoginUrl, LoginError> {
        if !provider.is_available() {
            warn!(%provider, "Login requested for a provider that is not available");
            return Err(LoginError::ProviderUnavailable(provider));
        }

        let endpoint = config::join(
            &self.base_url,
            "login URL endpoint",
            &format!("oauth/{provider}/login-url"),
        )?;
        info!(%endpoint, "Requesting login URL");

        let response = self
            .http
            .get(endpoint)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .inspect_err(|err| error!(error = %err, "Error while requesting login URL"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(%status, %body, "Failed to get login URL from OAuth service");
            return Err(LoginError::Status { status, body });
        }

        let LoginUrlResponse { url, state } = response
            .json::<LoginUrlResponse>()
            .await
            .inspect_err(|err| error!(error = %err, "Malformed login URL response"))?;

        let url = url.filter(|url| !url.is_empty()).ok_or_else(|| {
            error!("No URL in login URL response");
            LoginError::MissingUrl
        })?;

        info!(%provider, "Received login URL");
        Ok(LoginUrl { url, state })
    }

    /// Requests the login URL and sends the user there.
    ///
    /// On error nothing is navigated and the error's
    /// [`user_message`](LoginError::user_message) is what the user should see.
    pub async fn start_login(
        &self,
        provider: Provider,
        navigator: &impl Navigator,
    ) -> Result<LoginUrl, LoginError> {
        let login_url = self.request_login_url(provider).await?;
        info!(%provider, "Redirecting to provider login");
        navigator.navigate(&login_url.url);
        Ok(login_url)
    }
}
