//! Authentication extractors for Axum

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use std::sync::Arc;
use tracing::{debug, error, warn};

use super::models::VerifiedIdentity;
use crate::common::{safe_email_log, safe_token_log, ApiError, AppState};

/// Verified identity extractor
///
/// Protected handlers take a `VerifiedIdentity` argument; the request is
/// rejected before the handler body runs when the token is missing or
/// invalid, or when the server cannot verify tokens at all.
#[async_trait]
impl<S> FromRequestParts<S> for VerifiedIdentity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Extension(app_state): Extension<Arc<AppState>> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;

        let token = match bearer_token(&parts.headers) {
            Some(t) => t,
            None => {
                warn!(uri = %parts.uri, "Authentication failed: missing Authorization header");
                return Err(ApiError::Unauthorized("Unauthorized access".into()));
            }
        };

        let verifier = match app_state.verifier.as_ref() {
            Some(v) => v,
            None => {
                error!("Identity verification requested but no service key is configured");
                return Err(ApiError::Unconfigured(
                    "Identity verification is not configured".into(),
                ));
            }
        };

        match verifier.verify(token).await {
            Ok(identity) => {
                debug!(
                    email = %safe_email_log(&identity.email),
                    "Identity token verified"
                );
                Ok(identity)
            }
            Err(e) => {
                warn!(
                    error = %e,
                    token = %safe_token_log(token),
                    "Identity token verification failed"
                );
                Err(ApiError::Unauthorized("Invalid or expired token".into()))
            }
        }
    }
}

/// Reads the token from `Authorization: Bearer <token>`, or a bare token
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();

    let token = match value.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        // A scheme with no credential after it
        None if value.eq_ignore_ascii_case("bearer") => "",
        _ => value,
    };

    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}
