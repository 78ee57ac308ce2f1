//! Seams to the external collaborators.
//!
//! The client never talks to a concrete backend directly: it holds these
//! traits as `Arc<dyn ...>` so the hosted services, the local demo backend and
//! test fakes are interchangeable.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::ServiceError;
use crate::geo::Coordinates;
use crate::report::{NewReport, Report, ReportFilter, ReportId, StatusUpdate};
use crate::types::AuthUser;

/// Hosted authentication provider.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Create an account and sign it in.
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, ServiceError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, ServiceError>;

    async fn sign_out(&self) -> Result<(), ServiceError>;

    /// The account currently signed in with the provider, if any.
    fn current_user(&self) -> Option<AuthUser>;

    /// Re-establish a previously persisted sign-in.
    fn restore(&self, user: AuthUser);
}

/// Queryable document collection of reports.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Equality query. The result is unordered.
    async fn query(&self, filter: &ReportFilter) -> Result<Vec<Report>, ServiceError>;

    async fn create(&self, report: &NewReport) -> Result<ReportId, ServiceError>;

    /// Single targeted write of status, actor id and timestamp.
    async fn update_status(&self, id: &ReportId, update: &StatusUpdate)
        -> Result<(), ServiceError>;
}

/// Write-once object storage.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload `data` under `key` and return a retrievable address.
    async fn upload(&self, key: &str, data: Bytes, content_type: &str)
        -> Result<String, ServiceError>;
}

/// Reverse geocoding lookup.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn reverse(&self, at: Coordinates) -> Result<String, ServiceError>;
}

/// The device's location API.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_position(&self) -> Result<Coordinates, ServiceError>;
}
