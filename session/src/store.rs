//! In-memory session store
//!
//! The access token is kept only here, never in durable storage, so it is gone after the process
//! restarts. Restoring a session afterwards goes through the refresh cookie, which this module
//! never touches.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::Error;
use crate::token::{self, UserInfo};

/// Snapshot of the authentication state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    access_token: Option<String>,
    user_info: Option<UserInfo>,
}

impl Session {
    /// Current bearer token, if logged in
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// Display identity of the logged in user
    pub fn user_info(&self) -> Option<&UserInfo> {
        self.user_info.as_ref()
    }

    /// The session is logged in exactly when it holds an access token
    pub fn is_logged_in(&self) -> bool {
        self.access_token.is_some()
    }
}

/// Shared handle to the current session.
///
/// Cloning the store gives another handle to the same state. Every mutation replaces the state in
/// a single step, and subscribers are woken only when the observable state changes.
#[derive(Debug, Clone)]
pub struct SessionStore {
    state: Arc<watch::Sender<Session>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    /// Creates a logged out store
    pub fn new() -> Self {
        let (state, _) = watch::channel(Session::default());
        Self {
            state: Arc::new(state),
        }
    }

    /// Logs in with the given access token.
    ///
    /// When `user_info` is not provided it is decoded from the token payload. A token that cannot
    /// be decoded still logs the session in, just without user info.
    pub fn login(
        &self,
        access_token: impl Into<String>,
        user_info: Option<UserInfo>,
    ) -> Result<(), Error> {
        let access_token = access_token.into();
        if access_token.is_empty() {
            return Err(Error::EmptyAccessToken);
        }

        let user_info = user_info.or_else(|| match token::decode_user_info(&access_token) {
            Ok(info) => Some(info),
            Err(err) => {
                warn!(error = %err, "Cannot decode user info from access token");
                None
            }
        });

        let changed = self.replace(Session {
            access_token: Some(access_token),
            user_info,
        });

        if changed {
            info!(
                email = ?self.state.borrow().user_info().and_then(|info| info.email.as_deref()),
                "Logged in"
            );
        } else {
            debug!("Login repeated with the same token");
        }

        Ok(())
    }

    /// Clears the access token and user info.
    ///
    /// The refresh cookie is left alone, removing it is the caller's job.
    pub fn logout(&self) {
        if self.replace(Session::default()) {
            info!("Logged out");
        }
    }

    /// Replaces just the access token, keeping user info as is
    pub fn set_access_token(&self, token: Option<String>) {
        let token = token.filter(|token| !token.is_empty());
        self.state.send_if_modified(|session| {
            if session.access_token == token {
                return false;
            }
            session.access_token = token;
            true
        });
    }

    /// Replaces just the user info
    pub fn set_user_info(&self, info: Option<UserInfo>) {
        self.state.send_if_modified(|session| {
            if session.user_info == info {
                return false;
            }
            session.user_info = info;
            true
        });
    }

    /// Current session snapshot
    pub fn session(&self) -> Session {
        self.state.borrow().clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.state.borrow().access_token.clone()
    }

    pub fn user_info(&self) -> Option<UserInfo> {
        self.state.borrow().user_info.clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.state.borrow().is_logged_in()
    }

    /// Receiver woken on every change of the session
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    fn replace(&self, next: Session) -> bool {
        self.state.send_if_modified(|session| {
            if *session == next {
                return false;
            }
            *session = next;
            true
        })
    }
}
