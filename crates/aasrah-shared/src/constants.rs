/// Application name
pub const APP_NAME: &str = "Aasrah";

/// Document collection holding every report
pub const REPORTS_COLLECTION: &str = "reports";

/// Local storage key of the serialized session state
pub const SESSION_STORAGE_KEY: &str = "userState";

/// Local storage key of the hosted-auth credential
pub const AUTH_STORAGE_KEY: &str = "authUser";

/// Local storage key of the demo (non-backend) report list
pub const DEMO_REPORTS_STORAGE_KEY: &str = "reports";

/// Object storage prefix for report photos
pub const REPORT_IMAGE_PREFIX: &str = "report-images";

/// Report poller period in seconds
pub const POLL_INTERVAL_SECS: u64 = 15;

/// Placeholder stored when reverse geocoding fails
pub const UNKNOWN_LOCATION: &str = "Unknown location";

/// Accounts allowed to look up reports filed by other users
pub const DEFAULT_ADMIN_EMAILS: [&str; 2] = ["admin@aasrah.com", "admin2@aasrah.com"];

/// Maximum accepted image size in bytes (10 MiB)
pub const MAX_IMAGE_SIZE: usize = 10 * 1024 * 1024;

/// Default reverse geocoding service
pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org";
