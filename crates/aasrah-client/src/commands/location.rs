use aasrah_shared::constants::UNKNOWN_LOCATION;
use aasrah_shared::validation::require;
use aasrah_shared::{Coordinates, ServiceError};
use tracing::{debug, warn};

use crate::error::{AppError, Result};
use crate::events::Toast;
use crate::state::AppState;

/// Where the report's location comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationInput {
    Typed(String),
    /// The device's location API.
    Device,
    /// A point picked on the map, reverse geocoded to an address.
    Map(Coordinates),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLocation {
    /// Free-text address or `"lat, lng"`.
    pub text: String,
    pub coordinates: Option<Coordinates>,
}

pub async fn resolve(state: &AppState, input: LocationInput) -> Result<ResolvedLocation> {
    match input {
        LocationInput::Typed(text) => Ok(ResolvedLocation {
            text: require(&text, "Location")?.to_string(),
            coordinates: None,
        }),
        LocationInput::Device => detect(state).await,
        LocationInput::Map(at) => Ok(pick_on_map(state, at).await),
    }
}

/// Ask the device for its position and format it as `"lat, lng"`.
pub async fn detect(state: &AppState) -> Result<ResolvedLocation> {
    match state.services.locator.current_position().await {
        Ok(at) => {
            state.events.toast(Toast::info(
                "Location Detected",
                "Your current location has been added to the report.",
            ));
            Ok(ResolvedLocation {
                text: at.to_string(),
                coordinates: Some(at),
            })
        }
        Err(e) => {
            let (title, description) = match e {
                ServiceError::LocationUnavailable(_) => (
                    "Geolocation Not Supported",
                    "Please enter your location manually.",
                ),
                _ => (
                    "Location Error",
                    "Unable to get your location. Please enter it manually.",
                ),
            };
            warn!(error = %e, "Device location failed");
            state.events.toast(Toast::error(title, description));
            Err(AppError::from(e))
        }
    }
}

/// Reverse geocode a map pick. Any lookup failure yields the
/// `"Unknown location"` placeholder; this never fails.
pub async fn pick_on_map(state: &AppState, at: Coordinates) -> ResolvedLocation {
    let text = match state.services.geocoder.reverse(at).await {
        Ok(address) => address,
        Err(e) => {
            warn!(%at, error = %e, "Reverse geocoding failed");
            UNKNOWN_LOCATION.to_string()
        }
    };
    debug!(%at, location = %text, "Map location picked");
    ResolvedLocation {
        text,
        coordinates: Some(at),
    }
}
