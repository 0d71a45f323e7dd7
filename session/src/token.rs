//! Informational access token decoding
//!
//! Access tokens are three dot-separated segments with a base64 encoded JSON payload in the
//! middle. Only the payload is read here and the signature is never checked, so the decoded
//! [`UserInfo`] is display data. It must never be used to gate access to anything.

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tokens are usually base64url without padding, but some issuers pad or use the standard
/// alphabet.
const LENIENT: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);
const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Expected 3 token segments, found {0}")]
    SegmentCount(usize),
    #[error("Payload segment is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("Payload is not a valid claims object: {0}")]
    Claims(#[from] serde_json::Error),
}

/// Identity shown for the logged in user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl UserInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Subset of the payload claims used for display
#[derive(Debug, Deserialize)]
struct Claims {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

/// Decodes `{email, name}` from the access token payload without verifying it
pub fn decode_user_info(token: &str) -> Result<UserInfo, TokenError> {
    let segments: Vec<&str> = token.split('.').collect();
    let [_, payload, _] = segments.as_slice() else {
        return Err(TokenError::SegmentCount(segments.len()));
    };

    let payload = URL_SAFE_LENIENT
        .decode(payload)
        .or_else(|_| STANDARD_LENIENT.decode(payload))?;
    let claims: Claims = serde_json::from_slice(&payload)?;

    Ok(UserInfo {
        email: claims.email,
        name: claims.name,
    })
}
