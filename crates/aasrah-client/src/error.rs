use aasrah_shared::{Role, ServiceError, ValidationError};
use aasrah_store::StoreError;
use thiserror::Error;

/// Failure of a client operation. Every variant is caught at the operation
/// boundary, logged and shown as a transient notification.
#[derive(Error, Debug)]
pub enum AppError {
    /// Bad credentials or a missing session.
    #[error("{0}")]
    Auth(String),

    /// Query, write or upload failure of a hosted service.
    #[error("{0}")]
    Service(ServiceError),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Local persistent storage failure.
    #[error("{0}")]
    Store(#[from] StoreError),

    /// The signed-in role may not use this page or action.
    #[error("This action requires the {0} role")]
    Forbidden(Role),
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Auth(message) => AppError::Auth(message),
            ServiceError::NotSignedIn => AppError::Auth("Please log in to continue.".to_string()),
            other => AppError::Service(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_service_errors_become_auth() {
        let err: AppError = ServiceError::Auth("EMAIL_EXISTS".into()).into();
        assert!(matches!(err, AppError::Auth(ref m) if m == "EMAIL_EXISTS"));

        let err: AppError = ServiceError::NotSignedIn.into();
        assert!(matches!(err, AppError::Auth(_)));

        let err: AppError = ServiceError::Network("down".into()).into();
        assert!(matches!(err, AppError::Service(_)));
    }

    #[test]
    fn test_validation_message_passes_through() {
        let err: AppError = ValidationError::PasswordMismatch.into();
        assert_eq!(err.to_string(), "Passwords do not match!");
    }
}
