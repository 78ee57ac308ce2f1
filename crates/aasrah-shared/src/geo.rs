use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A WGS84 position picked on the map or reported by the device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Result<Self, ValidationError> {
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return Err(ValidationError::InvalidCoordinates(format!("{lat},{lng}")));
        }
        Ok(Self { lat, lng })
    }

    /// Parse `"lat,lng"` (whitespace around either number is ignored).
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidCoordinates(s.to_string());
        let (lat, lng) = s.split_once(',').ok_or_else(invalid)?;
        let lat: f64 = lat.trim().parse().map_err(|_| invalid())?;
        let lng: f64 = lng.trim().parse().map_err(|_| invalid())?;
        Self::new(lat, lng)
    }
}

// Six decimals, the precision the location field has always carried.
impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6}, {:.6}", self.lat, self.lng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_six_decimals() {
        let c = Coordinates::new(28.6139, 77.209).unwrap();
        assert_eq!(c.to_string(), "28.613900, 77.209000");
    }

    #[test]
    fn test_parse_round_trips_display() {
        let c = Coordinates::parse("19.076, 72.8777").unwrap();
        assert_eq!(Coordinates::parse(&c.to_string()).unwrap(), c);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Coordinates::parse("somewhere").is_err());
        assert!(Coordinates::parse("91,0").is_err());
        assert!(Coordinates::parse("10,abc").is_err());
    }
}
