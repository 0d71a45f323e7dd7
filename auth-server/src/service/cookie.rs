//! Refresh token cookie

use actix_web::cookie::time::Duration;
use actix_web::cookie::{Cookie, SameSite};

use crate::config::Config;

/// How the refresh token cookie is issued
#[derive(Debug, Clone)]
pub struct CookieSettings {
    /// Cookie name
    name: String,
    /// Cookie lifetime
    max_age: Duration,
    /// Sets the `Secure` flag, only on production deployments
    secure: bool,
}

impl CookieSettings {
    pub fn new(name: impl Into<String>, max_age: Duration, secure: bool) -> Self {
        Self {
            name: name.into(),
            max_age,
            secure,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.cookie.name.clone(),
            Duration::days(config.cookie.max_age_days.into()),
            config.production,
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cookie holding the refresh token.
    ///
    /// HttpOnly keeps it away from scripts, SameSite=Strict keeps it off cross-site requests. The
    /// value is percent-encoded, so separators and control characters in the token end up inside
    /// the value instead of the header.
    pub fn refresh_cookie(&self, refresh_token: &str) -> Cookie<'static> {
        let value = urlencoding::encode(refresh_token).into_owned();
        Cookie::build(self.name.clone(), value)
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Strict)
            .path("/")
            .max_age(self.max_age)
            .finish()
    }

    /// Cookie clearing the refresh token
    pub fn removal_cookie(&self) -> Cookie<'static> {
        let mut cookie = Cookie::build(self.name.clone(), "")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Strict)
            .path("/")
            .finish();
        cookie.make_removal();
        cookie
    }
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self::new("refreshToken", Duration::days(7), false)
    }
}
