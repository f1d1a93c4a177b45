//! Great-circle distance.

use tandem_core::constants::EARTH_RADIUS_M;
use tandem_core::models::GeoPoint;

/// Haversine distance in meters on a sphere of radius 6,371 km.
pub fn haversine_distance_m(a: GeoPoint, b: GeoPoint) -> f64 {
    haversine_with_radius(a, b, EARTH_RADIUS_M)
}

/// Haversine distance in meters on a sphere of the given radius.
pub fn haversine_with_radius(a: GeoPoint, b: GeoPoint, radius_m: f64) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let d_phi = (b.lat - a.lat).to_radians();
    let d_lambda = (b.lon - a.lon).to_radians();

    let h = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    // Rounding can push h a hair past 1 for antipodal points.
    let c = 2.0 * h.sqrt().min(1.0).asin();
    radius_m * c
}
