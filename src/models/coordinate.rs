//! Geographic coordinate type.

use serde::{Deserialize, Serialize};

/// A WGS84 position in degrees.
///
/// # Examples
///
/// ```
/// use locker_tour::models::Coordinate;
///
/// let c = Coordinate::new(50.06, 19.94);
/// assert_eq!(c.latitude(), 50.06);
/// assert_eq!(c.longitude(), 19.94);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    /// Creates a coordinate from latitude and longitude in degrees.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Latitude in degrees.
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Planar `[x, y]` = `[longitude, latitude]` pair, the layout the spatial index uses.
    pub fn to_xy(&self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_xy_order() {
        let c = Coordinate::new(1.0, 2.0);
        assert_eq!(c.to_xy(), [2.0, 1.0]);
    }

    #[test]
    fn test_coordinate_serde() {
        let c = Coordinate::new(50.0, 20.0);
        let json = serde_json::to_string(&c).expect("serialize");
        assert_eq!(json, r#"{"latitude":50.0,"longitude":20.0}"#);
        let back: Coordinate = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, c);
    }
}
