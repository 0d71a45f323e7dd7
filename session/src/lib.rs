//! Client side of the OAuth token lifecycle
//!
//! The access token lives only in the in-memory [`SessionStore`]. The refresh token never touches
//! client storage: it is handed to the cookie endpoint through a [`RefreshCookieStore`], which
//! keeps it in an HttpOnly cookie. [`RedirectHandler`] glues both together when the provider
//! redirects back with fresh tokens, and [`LoginClient`] starts the whole flow.

pub mod config;
pub mod gateway;
pub mod login;
pub mod redirect;
pub mod store;
pub mod token;

mod error;

pub use config::ClientConfig;
pub use error::Error;
pub use gateway::{CookieGateway, RefreshCookieStore, SET_COOKIE_PATH, SetCookieRequest};
pub use login::{LoginClient, LoginError, LoginUrl, Provider};
pub use redirect::{CallbackParams, ErrorLanding, Navigator, RedirectHandler, RedirectState};
pub use store::{Session, SessionStore};
pub use token::{TokenError, UserInfo, decode_user_info};
