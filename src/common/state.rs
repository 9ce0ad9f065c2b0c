// Application state shared across all modules

use std::sync::Arc;

use crate::auth::IdentityVerifier;
use crate::store::DocumentStore;

/// Built once at startup and handed to every handler through an `Extension` layer
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    /// `None` when no identity provider credentials were supplied
    pub verifier: Option<Arc<dyn IdentityVerifier>>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        verifier: Option<Arc<dyn IdentityVerifier>>,
    ) -> Self {
        Self { store, verifier }
    }
}
