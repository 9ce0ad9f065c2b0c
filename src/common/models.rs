// Query and response shapes shared by the foods and requests routes

use serde::{Deserialize, Serialize};

/// `?status=` filter for the listing endpoints
#[derive(Debug, Default, Deserialize)]
pub struct StatusQuery {
    pub status: Option<String>,
}

impl StatusQuery {
    /// An empty `status` means no filter
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// Body of a 201 from either create endpoint
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertedResponse {
    pub inserted_id: String,
}
