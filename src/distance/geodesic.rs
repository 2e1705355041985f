//! Spheroidal (WGS84) distance between coordinates.
//!
//! # Algorithm
//!
//! Delegates to Karney's geodesic solution on the WGS84 ellipsoid, which
//! is accurate to nanometers and converges for nearly antipodal points.
//!
//! # Reference
//!
//! Karney, C.F.F. (2013). "Algorithms for geodesics", *Journal of Geodesy*
//! 87(1), 43-55.

use geo::{GeodesicDistance, Point};

use crate::models::Coordinate;

/// Geodesic distance in meters between two coordinates.
///
/// # Examples
///
/// ```
/// use locker_tour::models::Coordinate;
/// use locker_tour::distance::geodesic_distance;
///
/// let a = Coordinate::new(0.0, 0.0);
/// let b = Coordinate::new(0.0, 1.0);
/// assert!((geodesic_distance(&a, &b) - 111_319.49).abs() < 1.0);
/// ```
pub fn geodesic_distance(a: &Coordinate, b: &Coordinate) -> f64 {
    let pa = Point::new(a.longitude(), a.latitude());
    let pb = Point::new(b.longitude(), b.latitude());
    pa.geodesic_distance(&pb)
}

/// Geodesic distance rounded up to a whole meter, the road edge weight.
pub fn edge_length(a: &Coordinate, b: &Coordinate) -> f64 {
    geodesic_distance(a, b).ceil()
}
