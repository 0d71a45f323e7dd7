//! Services integration tests

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;

use super::CookieSettings;

mod set_cookie;

/// Settings of a development deployment
fn settings() -> CookieSettings {
    CookieSettings::default()
}

/// Returns the refresh token cookie set by the response, if any
fn refresh_cookie(resp: &ServiceResponse) -> Option<Cookie<'static>> {
    resp.response()
        .cookies()
        .find(|cookie| cookie.name() == "refreshToken")
        .map(Cookie::into_owned)
}
