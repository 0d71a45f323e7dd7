//! Service configuration

use std::net::SocketAddr;

use derivative::Derivative;
use serde::{Deserialize, Deserializer};
use tracing_subscriber::filter::Directive;

/// Logging output format
#[derive(Debug, Clone, Copy, Deserialize, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Logging {
    /// Additional filtering directives
    #[serde(default, deserialize_with = "Logging::deserialize_filters")]
    pub filters: Vec<Directive>,

    /// Logging format
    #[serde(default)]
    pub format: LogFormat,
}

impl Logging {
    fn deserialize_filters<'de, D>(deserializer: D) -> Result<Vec<Directive>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let dirs: Vec<String> = Deserialize::deserialize(deserializer)?;
        dirs.into_iter()
            .map(|dir| dir.parse().map_err(serde::de::Error::custom))
            .collect()
    }
}

/// Refresh token cookie configuration
#[derive(Debug, Clone, Deserialize, Derivative)]
#[derivative(Default)]
#[serde(default)]
pub struct Cookie {
    /// Cookie name
    #[derivative(Default(value = "\"refreshToken\".to_owned()"))]
    pub name: String,

    /// Cookie lifetime in days
    #[derivative(Default(value = "7"))]
    pub max_age_days: u16,
}

/// Top level service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Address where to host the service
    #[serde(default = "Config::default_host")]
    pub host: SocketAddr,

    /// Production deployment, cookies are marked `Secure` only then
    #[serde(default)]
    pub production: bool,

    /// Refresh token cookie
    #[serde(default)]
    pub cookie: Cookie,

    /// Logging configuration
    #[serde(default)]
    pub logging: Logging,
}

impl Config {
    fn default_host() -> SocketAddr {
        ([127, 0, 0, 1], 3000).into()
    }
}
