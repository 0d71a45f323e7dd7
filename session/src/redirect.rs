//! Landing routes of the provider redirect
//!
//! The OAuth service redirects back with the freshly issued tokens in the query string. The
//! handler consumes them once: the refresh token goes to the cookie endpoint, the access token to
//! the session store. Whatever happens, it ends in exactly one of the [`RedirectState`]s.

use std::time::Duration;

use tracing::{debug, info, warn};
use url::Url;
use url::form_urlencoded;

use crate::gateway::RefreshCookieStore;
use crate::store::SessionStore;

/// How long the success state is shown before going home
pub const SUCCESS_REDIRECT_DELAY: Duration = Duration::from_secs(2);

/// Route to land on after the flow is over
pub const HOME_ROUTE: &str = "/";

const FAILURE_MESSAGE: &str = "로그인에 실패했습니다.";
const DEFAULT_PROVIDER_LABEL: &str = "네이버";
const UNKNOWN_ERROR_MESSAGE: &str = "알 수 없는 오류가 발생했습니다.";

/// Moves the user to another location
pub trait Navigator: Send + Sync {
    fn navigate(&self, location: &str);
}

/// Query parameters of the provider redirect.
///
/// Empty values count as missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackParams {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub provider: Option<String>,
    pub success: Option<String>,
}

impl CallbackParams {
    /// Parses the raw query string, without the leading `?`
    pub fn from_query(query: &str) -> Self {
        let mut params = Self::default();

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            let slot = match &*key {
                "accessToken" => &mut params.access_token,
                "refreshToken" => &mut params.refresh_token,
                "provider" => &mut params.provider,
                "success" => &mut params.success,
                _ => continue,
            };

            // First occurrence wins
            if slot.is_none() && !value.is_empty() {
                *slot = Some(value.into_owned());
            }
        }

        params
    }

    pub fn from_url(url: &Url) -> Self {
        Self::from_query(url.query().unwrap_or_default())
    }

    fn succeeded(&self) -> bool {
        self.success.as_deref() == Some("true")
    }
}

/// State of the landing route
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RedirectState {
    /// Page just mounted, nothing consumed yet
    #[default]
    Loading,
    /// Session established, going home shortly
    Success { message: String },
    /// Redirect carried no usable tokens, user has to go home explicitly
    Error { message: String },
}

impl RedirectState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Loading)
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Loading => None,
            Self::Success { message } | Self::Error { message } => Some(message),
        }
    }
}

/// One-shot handler of the provider redirect
pub struct RedirectHandler<G, N> {
    store: SessionStore,
    gateway: G,
    navigator: N,
    state: RedirectState,
}

impl<G, N> RedirectHandler<G, N>
where
    G: RefreshCookieStore,
    N: Navigator,
{
    pub fn new(store: SessionStore, gateway: G, navigator: N) -> Self {
        Self {
            store,
            gateway,
            navigator,
            state: RedirectState::Loading,
        }
    }

    pub fn state(&self) -> &RedirectState {
        &self.state
    }

    /// Consumes the redirect parameters.
    ///
    /// Runs at most once. Later calls return the state reached by the first one without touching
    /// the cookie or the store again.
    pub async fn handle(&mut self, params: &CallbackParams) -> &RedirectState {
        if self.state.is_terminal() {
            debug!(state = ?self.state, "Redirect already handled");
            return &self.state;
        }

        self.state = self.establish_session(params).await;
        &self.state
    }

    /// Waits out [`SUCCESS_REDIRECT_DELAY`] and goes home, if the session was established.
    ///
    /// Does nothing in other states.
    pub async fn auto_navigate(&self) {
        if !matches!(self.state, RedirectState::Success { .. }) {
            return;
        }

        tokio::time::sleep(SUCCESS_REDIRECT_DELAY).await;
        self.navigator.navigate(HOME_ROUTE);
    }

    /// Explicit navigation home, eg. from the error state
    pub fn go_home(&self) {
        self.navigator.navigate(HOME_ROUTE);
    }

    async fn establish_session(&self, params: &CallbackParams) -> RedirectState {
        let access_token = match (params.succeeded(), params.access_token.as_deref()) {
            (true, Some(access_token)) => access_token,
            (success, access_token) => {
                warn!(
                    success,
                    has_access_token = access_token.is_some(),
                    "OAuth redirect without usable tokens"
                );
                return RedirectState::Error {
                    message: FAILURE_MESSAGE.to_owned(),
                };
            }
        };

        // The cookie only matters for restoring the session later, the in-memory access token is
        // enough to carry on.
        if let Some(refresh_token) = params.refresh_token.as_deref() {
            if !self.gateway.store(refresh_token).await {
                warn!("Refresh token not persisted, continuing with in-memory session only");
            }
        }

        if let Err(err) = self.store.login(access_token, None) {
            warn!(error = %err, "Cannot establish session");
            return RedirectState::Error {
                message: FAILURE_MESSAGE.to_owned(),
            };
        }

        let provider = params.provider.as_deref().unwrap_or(DEFAULT_PROVIDER_LABEL);
        info!(provider, "OAuth login successful");

        RedirectState::Success {
            message: format!("{provider} 로그인에 성공했습니다!"),
        }
    }
}

/// Error landing route, used when the OAuth service itself failed the login
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorLanding {
    pub message: String,
    pub provider: Option<String>,
}

impl ErrorLanding {
    /// Parses `error` and `provider` from the raw query string
    pub fn from_query(query: &str) -> Self {
        let mut message = None;
        let mut provider = None;

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            let slot = match &*key {
                "error" => &mut message,
                "provider" => &mut provider,
                _ => continue,
            };

            if slot.is_none() && !value.is_empty() {
                *slot = Some(value.into_owned());
            }
        }

        Self {
            message: message.unwrap_or_else(|| UNKNOWN_ERROR_MESSAGE.to_owned()),
            provider,
        }
    }

    pub fn from_url(url: &Url) -> Self {
        Self::from_query(url.query().unwrap_or_default())
    }
}
