//! Auth HTTP endpoints

use actix_web::http::StatusCode;
use actix_web::web::{Bytes, Data, ServiceConfig};
use actix_web::{HttpMessage, HttpRequest, HttpResponse, ResponseError, delete, get, post};
use serde::Serialize;
use serde_json::json;
use session::SetCookieRequest;
use thiserror::Error;
use tracing::{debug, error, warn};

#[cfg(test)]
mod tests;

mod cookie;

pub use cookie::CookieSettings;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Content-Type must be application/json")]
    UnsupportedContentType,
    #[error("Refresh token is required")]
    MissingRefreshToken,
    #[error("Failed to set refresh token")]
    MalformedRequest(#[source] serde_json::Error),
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::UnsupportedContentType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::MissingRefreshToken => StatusCode::BAD_REQUEST,
            Self::MalformedRequest(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}

/// Body of successful cookie operations
#[derive(Debug, Serialize)]
struct Done {
    success: bool,
    message: &'static str,
}

impl Done {
    fn new(message: &'static str) -> Self {
        Self {
            success: true,
            message,
        }
    }
}

/// Stores the refresh token in the HttpOnly cookie.
///
/// Only JSON bodies are accepted, which plain cross-site form posts cannot send.
#[post("/api/auth/set-cookie")]
async fn store_refresh_token(
    req: HttpRequest,
    body: Bytes,
    settings: Data<CookieSettings>,
) -> Result<HttpResponse, Error> {
    if !req.content_type().eq_ignore_ascii_case("application/json") {
        warn!(content_type = req.content_type(), "Set cookie request is not JSON");
        return Err(Error::UnsupportedContentType);
    }

    let request: SetCookieRequest = serde_json::from_slice(&body).map_err(|err| {
        error!(error = %err, "Error setting refresh token cookie");
        Error::MalformedRequest(err)
    })?;

    let refresh_token = request
        .refresh_token
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            warn!("Set cookie request without refresh token");
            Error::MissingRefreshToken
        })?;

    debug!(cookie = settings.name(), "Refresh token stored in cookie");
    Ok(HttpResponse::Ok()
        .cookie(settings.refresh_cookie(&refresh_token))
        .json(Done::new("Refresh token stored in cookie")))
}

/// Clears the refresh token cookie, whether there was one or not
#[delete("/api/auth/set-cookie")]
async fn remove_refresh_token(settings: Data<CookieSettings>) -> HttpResponse {
    debug!(cookie = settings.name(), "Refresh token cookie removed");
    HttpResponse::Ok()
        .cookie(settings.removal_cookie())
        .json(Done::new("Refresh token removed"))
}

/// Liveness probe
#[get("/health")]
async fn health() -> &'static str {
    "ok"
}

/// Returns configuration function for the ActixWeb services
pub fn configure(
    settings: CookieSettings,
) -> impl Fn(&mut ServiceConfig) + Clone + Send + 'static {
    move |cfg: &mut ServiceConfig| {
        cfg.app_data(Data::new(settings.clone()))
            .service(store_refresh_token)
            .service(remove_refresh_token)
            .service(health);
    }
}
