//! Clients for the hosted Firebase services, spoken over their public REST
//! APIs: Identity Toolkit (auth), Firestore (documents) and Cloud Storage
//! for Firebase (objects).

pub mod auth;
pub mod firestore;
pub mod storage;
pub mod value;

use aasrah_shared::ServiceError;
use serde::Deserialize;

pub const IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com/v1";
pub const SECURE_TOKEN_URL: &str = "https://securetoken.googleapis.com/v1";
pub const FIRESTORE_URL: &str = "https://firestore.googleapis.com/v1";
pub const STORAGE_URL: &str = "https://firebasestorage.googleapis.com/v0";

/// Project settings plus the service endpoints (overridable for emulators).
#[derive(Debug, Clone)]
pub struct FirebaseConfig {
    pub api_key: String,
    pub project_id: String,
    pub storage_bucket: String,
    pub identity_url: String,
    pub token_url: String,
    pub firestore_url: String,
    pub storage_url: String,
}

impl FirebaseConfig {
    pub fn new(
        api_key: impl Into<String>,
        project_id: impl Into<String>,
        storage_bucket: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            project_id: project_id.into(),
            storage_bucket: storage_bucket.into(),
            identity_url: IDENTITY_TOOLKIT_URL.to_string(),
            token_url: SECURE_TOKEN_URL.to_string(),
            firestore_url: FIRESTORE_URL.to_string(),
            storage_url: STORAGE_URL.to_string(),
        }
    }

    /// Root of the default database's document tree.
    pub fn documents_url(&self) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents",
            self.firestore_url.trim_end_matches('/'),
            self.project_id
        )
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// Pass successful responses through; turn Google API error bodies
/// (`{"error": {"code", "message", "status"}}`) into [`ServiceError::Rejected`].
pub(crate) async fn check(resp: reqwest::Response) -> Result<reqwest::Response, ServiceError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(rejection(status.as_u16(), &body))
}

pub(crate) fn rejection(status: u16, body: &str) -> ServiceError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .ok()
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.trim().to_string());
    ServiceError::Rejected { status, message }
}

pub(crate) fn network(e: reqwest::Error) -> ServiceError {
    ServiceError::Network(e.to_string())
}

pub(crate) fn invalid(e: reqwest::Error) -> ServiceError {
    ServiceError::InvalidResponse(e.to_string())
}
