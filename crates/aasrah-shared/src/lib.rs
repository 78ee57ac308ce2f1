//! Domain types and service seams shared by every Aasrah crate.

pub mod constants;
pub mod error;
pub mod geo;
pub mod report;
pub mod services;
pub mod types;
pub mod validation;

pub use error::{ServiceError, ValidationError};
pub use geo::Coordinates;
pub use report::{NewReport, Report, ReportFilter, ReportId, ReportStatus, StatusUpdate};
pub use services::{AuthService, Geocoder, LocationProvider, ObjectStore, ReportStore};
pub use types::{AuthUser, Credential, Role, User, UserPatch};
