//! # aasrah-remote
//!
//! HTTP clients for the hosted services the Aasrah client talks to: the
//! Firebase auth, document and object stores, and a reverse geocoder.
//! Every client implements one of the service traits from `aasrah-shared`.

pub mod firebase;
pub mod geocode;

use aasrah_shared::ServiceError;

pub use firebase::auth::FirebaseAuth;
pub use firebase::firestore::FirestoreReports;
pub use firebase::storage::FirebaseStorage;
pub use firebase::FirebaseConfig;
pub use geocode::NominatimGeocoder;

/// Shared HTTP client. Requests carry no timeout of their own.
pub fn http_client() -> Result<reqwest::Client, ServiceError> {
    reqwest::Client::builder()
        .user_agent(concat!("aasrah/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ServiceError::Network(format!("Failed to build HTTP client: {e}")))
}
