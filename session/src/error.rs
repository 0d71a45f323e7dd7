use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("Access token must not be empty")]
    EmptyAccessToken,
    #[error("Invalid {name} URL {value:?}: {source}")]
    InvalidUrl {
        name: &'static str,
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Invalid value {value:?} for {name}")]
    InvalidEnv { name: &'static str, value: String },
    #[error("Cannot build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}
