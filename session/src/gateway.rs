//! Refresh token persistence through the cookie endpoint
//!
//! The refresh token is only ever stored by the server answering [`SET_COOKIE_PATH`], in a
//! cookie flagged HttpOnly so no client code can read it back. Failures here are never fatal to
//! the caller, they only mean the session cannot be restored later.

use std::future::Future;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::config::{self, ClientConfig};
use crate::error::Error;

/// Same-origin endpoint setting and clearing the refresh token cookie
pub const SET_COOKIE_PATH: &str = "/api/auth/set-cookie";

/// Body of the cookie store request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetCookieRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// The only way to persist or erase the refresh token.
///
/// Both operations report success as `bool`. Errors are logged by the implementation and never
/// reach the caller.
pub trait RefreshCookieStore: Send + Sync {
    /// Hands the refresh token over to be kept in the cookie
    fn store(&self, refresh_token: &str) -> impl Future<Output = bool> + Send;

    /// Clears the cookie, succeeding also when there was nothing to clear
    fn remove(&self) -> impl Future<Output = bool> + Send;
}

/// [`RefreshCookieStore`] calling the cookie endpoint over HTTP
#[derive(Debug, Clone)]
pub struct CookieGateway {
    http: reqwest::Client,
    endpoint: Url,
}

impl CookieGateway {
    pub fn new(config: &ClientConfig) -> Result<Self, Error> {
        Ok(Self {
            http: config.http_client()?,
            endpoint: config::join(config.app_base_url(), "cookie endpoint", SET_COOKIE_PATH)?,
        })
    }

    /// Use a custom HTTP client, eg. to share a cookie jar
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl RefreshCookieStore for CookieGateway {
    async fn store(&self, refresh_token: &str) -> bool {
        let body = SetCookieRequest {
            refresh_token: Some(refresh_token.to_owned()),
        };

        let result = self
            .http
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status);

        match result {
            Ok(_) => {
                debug!("Refresh token stored in cookie");
                true
            }
            Err(err) => {
                warn!(error = %err, status = ?err.status(), "Failed to store refresh token cookie");
                false
            }
        }
    }

    async fn remove(&self) -> bool {
        let result = self
            .http
            .delete(self.endpoint.clone())
            .send()
            .await
            .and_then(reqwest::Response::error_for_status);

        match result {
            Ok(_) => {
                debug!("Refresh token cookie removed");
                true
            }
            Err(err) => {
                warn!(error = %err, status = ?err.status(), "Failed to remove refresh token cookie");
                false
            }
        }
    }
}
