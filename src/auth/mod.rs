//! # Auth Module
//!
//! This module handles identity verification for protected routes:
//! - Service account decoding (the trust material)
//! - Identity token verification against the provider's signing keys
//! - `VerifiedIdentity` extractor for protected handlers

pub mod extractors;
pub mod models;
pub mod verifier;


pub use models::{ServiceAccount, VerifiedIdentity};
pub use verifier::{AuthError, FirebaseVerifier, IdentityVerifier};
