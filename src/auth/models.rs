//! Identity data models

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use thiserror::Error;

/// The caller's identity, as asserted by a verified token.
///
/// Lives for one request only; handlers receive it as an extractor argument.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedIdentity {
    pub email: String,
    pub name: Option<String>,
    pub photo: Option<String>,
}

/// ID token claims issued by the identity provider
#[derive(Debug, Deserialize)]
pub struct FirebaseClaims {
    pub sub: String,
    pub exp: usize,
    pub iat: Option<i64>,
    pub auth_time: Option<i64>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
}

/// The subset of a service account JSON the server needs
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccount {
    pub project_id: String,
    #[serde(default)]
    pub client_email: Option<String>,
}

#[derive(Debug, Error)]
pub enum ServiceAccountError {
    #[error("service key is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("service key is not a valid service account JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("service account has an empty project_id")]
    MissingProjectId,
}

impl ServiceAccount {
    /// Decodes the base64-encoded JSON bundle supplied through the environment
    pub fn from_base64(encoded: &str) -> Result<Self, ServiceAccountError> {
        let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = STANDARD.decode(compact)?;
        let account: ServiceAccount = serde_json::from_slice(&bytes)?;
        if account.project_id.trim().is_empty() {
            return Err(ServiceAccountError::MissingProjectId);
        }
        Ok(account)
    }
}
