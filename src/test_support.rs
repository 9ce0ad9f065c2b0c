// Shared fixtures for router-level tests

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tower::ServiceExt;

use crate::app::build_router;
use crate::auth::{AuthError, IdentityVerifier, VerifiedIdentity};
use crate::common::AppState;
use crate::store::memory::MemoryStore;

/// Builds the identity a static token resolves to
pub fn identity(email: &str) -> VerifiedIdentity {
    let local = email.split('@').next().unwrap_or(email);
    VerifiedIdentity {
        email: email.to_string(),
        name: Some(format!("{} Tester", local)),
        photo: Some(format!("https://img.test/{}.png", local)),
    }
}

/// Accepts a fixed set of tokens, no signatures involved
pub struct StaticVerifier {
    tokens: HashMap<String, VerifiedIdentity>,
}

impl StaticVerifier {
    /// `alice-token`, `bob-token` and `carol-token`
    pub fn standard() -> Self {
        let tokens = [
            ("alice-token", "alice@x.com"),
            ("bob-token", "bob@x.com"),
            ("carol-token", "carol@y.com"),
        ]
        .into_iter()
        .map(|(token, email)| (token.to_string(), identity(email)))
        .collect();
        Self { tokens }
    }
}

#[async_trait]
impl IdentityVerifier for StaticVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, AuthError> {
        self.tokens
            .get(token)
            .cloned()
            .ok_or_else(|| AuthError::Rejected("unknown test token".to_string()))
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
}

impl TestApp {
    pub fn new() -> Self {
        let verifier: Arc<dyn IdentityVerifier> = Arc::new(StaticVerifier::standard());
        Self::with_verifier(Some(verifier))
    }

    pub fn with_verifier(verifier: Option<Arc<dyn IdentityVerifier>>) -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(store.clone(), verifier);
        Self {
            router: build_router(state, None),
            store,
        }
    }

    /// Sends one request and returns the status with the parsed JSON body
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    /// Creates a food as `token` and returns its id
    pub async fn create_food(&self, token: &str, body: Value) -> String {
        let (status, json) = self.send(Method::POST, "/foods", Some(token), Some(body)).await;
        assert_eq!(status, StatusCode::CREATED, "create food failed: {}", json);
        json["insertedId"].as_str().unwrap().to_string()
    }
}
