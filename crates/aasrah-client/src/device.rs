use aasrah_shared::{Coordinates, LocationProvider, ServiceError};
use async_trait::async_trait;

/// Device location API backed by a configured position. Without one the
/// device reports geolocation as unsupported.
pub struct DeviceLocation {
    position: Option<Coordinates>,
}

impl DeviceLocation {
    pub fn new(position: Option<Coordinates>) -> Self {
        Self { position }
    }
}

#[async_trait]
impl LocationProvider for DeviceLocation {
    async fn current_position(&self) -> Result<Coordinates, ServiceError> {
        self.position.ok_or_else(|| {
            ServiceError::LocationUnavailable("Geolocation is not supported".to_string())
        })
    }
}
