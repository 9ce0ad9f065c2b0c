// src/auth/verifier.rs
//! Identity token verification against the identity provider's signing keys

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use reqwest::{header::CACHE_CONTROL, Client};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::models::{FirebaseClaims, ServiceAccount, VerifiedIdentity};

pub const DEFAULT_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";
const ISSUER_PREFIX: &str = "https://securetoken.google.com/";
const DEFAULT_KEY_TTL: Duration = Duration::from_secs(60 * 60);
/// Minimum gap between fetches triggered by an unknown key id
const REFETCH_COOLDOWN: Duration = Duration::from_secs(60);
/// Allowed clock skew, in seconds, for `iat`/`auth_time`
const CLOCK_SKEW_SECS: i64 = 60;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token could not be decoded: {0}")]
    MalformedToken(String),

    #[error("unsupported signing algorithm {0:?}")]
    UnsupportedAlgorithm(Algorithm),

    #[error("token header has no key id")]
    MissingKeyId,

    #[error("no signing key matches key id {0}")]
    UnknownKeyId(String),

    #[error("token rejected: {0}")]
    Rejected(String),

    #[error("token has no email claim")]
    MissingEmail,

    #[error("could not fetch signing keys: {0}")]
    KeyFetch(String),
}

/// Turns a bearer token into a verified identity
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, AuthError>;
}

#[derive(Debug, Deserialize)]
struct JwkSet {
    keys: Vec<Jwk>,
}

#[derive(Debug, Deserialize)]
struct Jwk {
    kid: String,
    n: String,
    e: String,
}

/// Signing keys by key id, valid until `expires_at`
struct SigningKeys {
    keys: HashMap<String, DecodingKey>,
    fetched_at: Instant,
    expires_at: Instant,
}

/// Outcome of looking a key id up in the cache
enum Lookup {
    Found(DecodingKey),
    Unknown,
    Refresh,
}

impl SigningKeys {
    fn from_jwks(set: JwkSet, max_age: Duration, now: Instant) -> Self {
        let mut keys = HashMap::new();
        for jwk in set.keys {
            match DecodingKey::from_rsa_components(&jwk.n, &jwk.e) {
                Ok(key) => {
                    keys.insert(jwk.kid, key);
                }
                Err(e) => warn!(kid = %jwk.kid, error = %e, "Skipping unusable signing key"),
            }
        }
        Self {
            keys,
            fetched_at: now,
            expires_at: now + max_age,
        }
    }

    fn is_fresh(&self, now: Instant) -> bool {
        now < self.expires_at
    }

    fn may_refetch(&self, now: Instant) -> bool {
        now.duration_since(self.fetched_at) >= REFETCH_COOLDOWN
    }

    fn get(&self, kid: &str) -> Option<&DecodingKey> {
        self.keys.get(kid)
    }
}

/// Verifies Firebase ID tokens for one project.
///
/// Keys are cached for as long as the key endpoint's `Cache-Control` allows;
/// a token signed with an unknown key id triggers one refetch.
pub struct FirebaseVerifier {
    jwks_url: String,
    http: Client,
    validation: Validation,
    keys: RwLock<Option<SigningKeys>>,
}

impl FirebaseVerifier {
    pub fn new(account: &ServiceAccount, jwks_url: Option<String>, http: Client) -> Self {
        let issuer = format!("{}{}", ISSUER_PREFIX, account.project_id);

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&account.project_id]);
        validation.set_issuer(&[&issuer]);

        info!(
            project_id = %account.project_id,
            service_account = account.client_email.as_deref().unwrap_or("unknown"),
            "Identity verification enabled"
        );

        Self {
            jwks_url: jwks_url.unwrap_or_else(|| DEFAULT_JWKS_URL.to_string()),
            http,
            validation,
            keys: RwLock::new(None),
        }
    }

    async fn key_for(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        let cached = {
            let keys = self.keys.read().await;
            lookup(keys.as_ref(), kid, Instant::now())
        };
        match cached {
            Lookup::Found(key) => return Ok(key),
            Lookup::Unknown => return Err(AuthError::UnknownKeyId(kid.to_string())),
            Lookup::Refresh => {}
        }

        // Held across the fetch so concurrent misses wait for one refresh
        let mut keys = self.keys.write().await;
        match lookup(keys.as_ref(), kid, Instant::now()) {
            Lookup::Found(key) => return Ok(key),
            Lookup::Unknown => return Err(AuthError::UnknownKeyId(kid.to_string())),
            Lookup::Refresh => {}
        }

        let fresh = self.fetch_keys().await?;
        let key = fresh.get(kid).cloned();
        *keys = Some(fresh);
        key.ok_or_else(|| AuthError::UnknownKeyId(kid.to_string()))
    }

    async fn fetch_keys(&self) -> Result<SigningKeys, AuthError> {
        debug!(url = %self.jwks_url, "Fetching identity provider signing keys");

        let response = self
            .http
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| AuthError::KeyFetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::KeyFetch(format!("key endpoint returned {}", status)));
        }

        let max_age = response
            .headers()
            .get(CACHE_CONTROL)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_max_age)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_KEY_TTL);

        let set: JwkSet = response
            .json()
            .await
            .map_err(|e| AuthError::KeyFetch(e.to_string()))?;

        let keys = SigningKeys::from_jwks(set, max_age, Instant::now());
        debug!(
            key_count = keys.keys.len(),
            max_age_secs = max_age.as_secs(),
            "Signing keys refreshed"
        );
        Ok(keys)
    }
}

#[async_trait]
impl IdentityVerifier for FirebaseVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, AuthError> {
        let header = decode_header(token).map_err(|e| AuthError::MalformedToken(e.to_string()))?;
        if header.alg != Algorithm::RS256 {
            return Err(AuthError::UnsupportedAlgorithm(header.alg));
        }
        let kid = header.kid.ok_or(AuthError::MissingKeyId)?;

        let key = self.key_for(&kid).await?;
        let data = decode::<FirebaseClaims>(token, &key, &self.validation)
            .map_err(|e| AuthError::Rejected(e.to_string()))?;

        identity_from_claims(data.claims, Utc::now().timestamp())
    }
}

/// An unknown key id only refetches when the cache is stale or the last
/// fetch is older than `REFETCH_COOLDOWN`
fn lookup(cached: Option<&SigningKeys>, kid: &str, now: Instant) -> Lookup {
    match cached {
        Some(keys) if keys.is_fresh(now) => match keys.get(kid) {
            Some(key) => Lookup::Found(key.clone()),
            None if keys.may_refetch(now) => Lookup::Refresh,
            None => Lookup::Unknown,
        },
        _ => Lookup::Refresh,
    }
}

/// Applies the claim checks the signature check doesn't cover
pub fn identity_from_claims(claims: FirebaseClaims, now: i64) -> Result<VerifiedIdentity, AuthError> {
    if claims.sub.trim().is_empty() {
        return Err(AuthError::Rejected("empty subject".to_string()));
    }
    if claims.iat.is_some_and(|iat| iat > now + CLOCK_SKEW_SECS) {
        return Err(AuthError::Rejected("issued in the future".to_string()));
    }
    if claims
        .auth_time
        .is_some_and(|auth_time| auth_time > now + CLOCK_SKEW_SECS)
    {
        return Err(AuthError::Rejected("authenticated in the future".to_string()));
    }

    let email = claims
        .email
        .filter(|e| !e.trim().is_empty())
        .ok_or(AuthError::MissingEmail)?;

    Ok(VerifiedIdentity {
        email,
        name: claims.name,
        photo: claims.picture,
    })
}

/// Extracts `max-age` seconds from a `Cache-Control` header value
pub fn parse_max_age(cache_control: &str) -> Option<u64> {
    cache_control.split(',').find_map(|directive| {
        let (name, value) = directive.trim().split_once('=')?;
        if name.trim().eq_ignore_ascii_case("max-age") {
            value.trim().trim_matches('"').parse().ok()
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    // Modulus from the RFC 7515 RSA example key
    const RFC_MODULUS: &str = "ofgWCuLjybRlzo0tZWJjNiuSfb4p4fAkd_wWJcyQoTbji9k0l8W26mPddxHmfHQp-Vaw-4qPCJrcS2mJPMEzP1Pt0Bm4d4QlL-yRT-SFd2lZS-pCgNMsD1W_YpRPEwOWvG6b32690r2jZ47soMZo9wGzjb_7OMg0LOL-bSf63kpaSHSXndS5z5rexMdbBYUsLA9e-KXBdQOS-UTo7WTBEMa2R2CapHg665xsmtdVMTBQY4uDZlxvb3qCo5ZwKh9kG4LT6_I5IhlJH7aGhyxXFvUK-DWNmoudF8NAco9_h9iaGNj8q2ethFkMLs91kzk2PAcDTW9gb54h4FRWyuXpoQ";
    const RS256_HEADER_NO_KID: &str = "eyJhbGciOiJSUzI1NiIsInR5cCI6IkpXVCJ9";
    // {"alg":"RS256","kid":"known"}
    const RS256_HEADER_KNOWN_KID: &str = "eyJhbGciOiJSUzI1NiIsImtpZCI6Imtub3duIn0";
    // {"alg":"RS256","kid":"other"}
    const RS256_HEADER_OTHER_KID: &str = "eyJhbGciOiJSUzI1NiIsImtpZCI6Im90aGVyIn0";

    fn claims(email: Option<&str>) -> FirebaseClaims {
        FirebaseClaims {
            sub: "uid-1".to_string(),
            exp: 4_102_444_800,
            iat: Some(1_700_000_000),
            auth_time: Some(1_700_000_000),
            email: email.map(str::to_string),
            name: Some("Alice".to_string()),
            picture: Some("https://img.test/a.png".to_string()),
        }
    }

    fn verifier_with_cached_key() -> FirebaseVerifier {
        let account = ServiceAccount {
            project_id: "food-share-test".to_string(),
            client_email: None,
        };
        // Port 9 (discard) refuses connections, so any refetch fails fast
        let verifier = FirebaseVerifier::new(
            &account,
            Some("http://127.0.0.1:9/keys".to_string()),
            Client::new(),
        );
        let set = JwkSet {
            keys: vec![Jwk {
                kid: "known".to_string(),
                n: RFC_MODULUS.to_string(),
                e: "AQAB".to_string(),
            }],
        };
        let keys = SigningKeys::from_jwks(set, DEFAULT_KEY_TTL, Instant::now());
        *verifier.keys.try_write().unwrap() = Some(keys);
        verifier
    }

    #[test]
    fn test_identity_from_claims_maps_profile_fields() {
        let identity = identity_from_claims(claims(Some("alice@x.com")), 1_700_000_100).unwrap();
        assert_eq!(identity.email, "alice@x.com");
        assert_eq!(identity.name.as_deref(), Some("Alice"));
        assert_eq!(identity.photo.as_deref(), Some("https://img.test/a.png"));
    }

    #[test]
    fn test_identity_requires_email() {
        let err = identity_from_claims(claims(None), 1_700_000_100).unwrap_err();
        assert!(matches!(err, AuthError::MissingEmail));

        let err = identity_from_claims(claims(Some(" ")), 1_700_000_100).unwrap_err();
        assert!(matches!(err, AuthError::MissingEmail));
    }

    #[test]
    fn test_identity_rejects_future_issue_time() {
        let err = identity_from_claims(claims(Some("alice@x.com")), 1_600_000_000).unwrap_err();
        assert!(matches!(err, AuthError::Rejected(_)));
    }

    #[test]
    fn test_identity_rejects_empty_subject() {
        let mut c = claims(Some("alice@x.com"));
        c.sub = String::new();
        assert!(matches!(
            identity_from_claims(c, 1_700_000_100),
            Err(AuthError::Rejected(_))
        ));
    }

    #[test]
    fn test_parse_max_age() {
        assert_eq!(parse_max_age("public, max-age=19800, must-revalidate"), Some(19800));
        assert_eq!(parse_max_age("MAX-AGE=60"), Some(60));
        assert_eq!(parse_max_age("no-cache"), None);
        assert_eq!(parse_max_age("max-age=soon"), None);
    }

    #[test]
    fn test_signing_keys_expire() {
        let now = Instant::now();
        let keys = SigningKeys::from_jwks(JwkSet { keys: vec![] }, Duration::from_secs(10), now);
        assert!(keys.is_fresh(now));
        assert!(!keys.is_fresh(now + Duration::from_secs(11)));
    }

    #[tokio::test]
    async fn test_verify_rejects_garbage() {
        let verifier = verifier_with_cached_key();
        let err = verifier.verify("not-a-jwt").await.unwrap_err();
        assert!(matches!(err, AuthError::MalformedToken(_)));
    }

    #[tokio::test]
    async fn test_verify_rejects_hmac_tokens() {
        use jsonwebtoken::{encode, EncodingKey, Header};

        let token = encode(
            &Header::new(Algorithm::HS256),
            &serde_json::json!({ "sub": "uid", "exp": 4_102_444_800_u64, "email": "a@x.com" }),
            &EncodingKey::from_secret(b"shared-secret"),
        )
        .unwrap();

        let err = verifier_with_cached_key().verify(&token).await.unwrap_err();
        assert!(matches!(err, AuthError::UnsupportedAlgorithm(Algorithm::HS256)));
    }

    #[tokio::test]
    async fn test_verify_requires_key_id() {
        let token = format!("{}.e30.c2ln", RS256_HEADER_NO_KID);
        let err = verifier_with_cached_key().verify(&token).await.unwrap_err();
        assert!(matches!(err, AuthError::MissingKeyId));
    }

    #[tokio::test]
    async fn test_verify_rejects_bad_signature_for_known_key() {
        let token = format!("{}.e30.c2ln", RS256_HEADER_KNOWN_KID);
        let err = verifier_with_cached_key().verify(&token).await.unwrap_err();
        assert!(matches!(err, AuthError::Rejected(_)));
    }

    #[tokio::test]
    async fn test_unknown_key_id_within_cooldown_does_not_refetch() {
        let token = format!("{}.e30.c2ln", RS256_HEADER_OTHER_KID);
        let err = verifier_with_cached_key().verify(&token).await.unwrap_err();
        assert!(matches!(err, AuthError::UnknownKeyId(kid) if kid == "other"));
    }

    #[test]
    fn test_lookup_refreshes_after_cooldown_or_expiry() {
        let now = Instant::now();
        let set = JwkSet {
            keys: vec![Jwk {
                kid: "known".to_string(),
                n: RFC_MODULUS.to_string(),
                e: "AQAB".to_string(),
            }],
        };
        let keys = SigningKeys::from_jwks(set, DEFAULT_KEY_TTL, now);

        assert!(matches!(lookup(Some(&keys), "known", now), Lookup::Found(_)));
        assert!(matches!(lookup(Some(&keys), "other", now), Lookup::Unknown));
        assert!(matches!(
            lookup(Some(&keys), "other", now + REFETCH_COOLDOWN),
            Lookup::Refresh
        ));
        assert!(matches!(
            lookup(Some(&keys), "known", now + DEFAULT_KEY_TTL),
            Lookup::Refresh
        ));
        assert!(matches!(lookup(None, "known", now), Lookup::Refresh));
    }

    /// Serves `{"keys":[]}` over plain HTTP and counts the fetches
    async fn empty_key_server() -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let fetches = Arc::new(AtomicUsize::new(0));

        let counter = fetches.clone();
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::spawn(async move {
                    let mut buf = [0u8; 4096];
                    let mut read = Vec::new();
                    while !read.windows(4).any(|w| w == b"\r\n\r\n") {
                        match socket.read(&mut buf).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => read.extend_from_slice(&buf[..n]),
                        }
                    }
                    let body = r#"{"keys":[]}"#;
                    let response = format!(
                        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nCache-Control: public, max-age=3600\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        (format!("http://{}/keys", addr), fetches)
    }

    fn verifier_for(url: String) -> FirebaseVerifier {
        let account = ServiceAccount {
            project_id: "food-share-test".to_string(),
            client_email: None,
        };
        let http = Client::builder().no_proxy().build().unwrap();
        FirebaseVerifier::new(&account, Some(url), http)
    }

    #[tokio::test]
    async fn test_forged_key_ids_fetch_keys_once() {
        let (url, fetches) = empty_key_server().await;
        let verifier = verifier_for(url);
        let token = format!("{}.e30.c2ln", RS256_HEADER_OTHER_KID);

        for _ in 0..20 {
            let err = verifier.verify(&token).await.unwrap_err();
            assert!(matches!(err, AuthError::UnknownKeyId(_)));
        }

        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_misses_share_one_fetch() {
        let (url, fetches) = empty_key_server().await;
        let verifier = Arc::new(verifier_for(url));
        let token = format!("{}.e30.c2ln", RS256_HEADER_KNOWN_KID);

        let tasks: Vec<_> = (0..10)
            .map(|_| {
                let verifier = verifier.clone();
                let token = token.clone();
                tokio::spawn(async move { verifier.verify(&token).await })
            })
            .collect();
        for task in tasks {
            assert!(matches!(task.await.unwrap(), Err(AuthError::UnknownKeyId(_))));
        }

        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }
}
