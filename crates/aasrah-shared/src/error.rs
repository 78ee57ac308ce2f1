use thiserror::Error;

/// Failures reported by an external collaborator (auth, document store,
/// object store, geocoder, device location).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("No user is signed in")]
    NotSignedIn,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Service rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Geolocation unavailable: {0}")]
    LocationUnavailable(String),
}

/// Local form validation failures. Raised before any network call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Passwords do not match!")]
    PasswordMismatch,

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Report {id} cannot move from {from} to {to}")]
    IllegalTransition {
        id: String,
        from: String,
        to: String,
    },

    #[error("Image too large: {size} bytes (max {max})")]
    ImageTooLarge { size: usize, max: usize },
}
