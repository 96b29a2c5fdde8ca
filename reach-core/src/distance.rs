//! Planar distance approximation between two WGS84 coordinates.
//!
//! The engine avoids a full geodesic computation. Latitude and longitude
//! deltas are scaled to kilometres with an equirectangular projection whose
//! longitude factor shrinks with the cosine of the first coordinate's
//! latitude. Accuracy degrades with distance and toward the poles, where the
//! cosine term approaches zero; campaign radii are a few tens of kilometres
//! so neither matters in practice.

use geo::Coord;

/// Kilometres spanned by one degree of latitude.
pub const KM_PER_DEGREE_LATITUDE: f64 = 110.574;

/// Kilometres spanned by one degree of longitude on the equator.
pub const KM_PER_DEGREE_LONGITUDE: f64 = 111.320;

/// Approximate distance in kilometres between `from` and `to`.
///
/// The longitude term is scaled by `cos(from.latitude)`, so the function is
/// not exactly symmetric. The engine always passes the user as `from`.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use reach_core::approximate_distance_km;
///
/// let origin = Coord { x: 0.0, y: 0.0 };
/// let north = Coord { x: 0.0, y: 1.0 };
/// let km = approximate_distance_km(north, origin);
/// assert!((km - 110.574).abs() < 1e-9);
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "the equirectangular projection is floating-point by nature"
)]
pub fn approximate_distance_km(from: Coord<f64>, to: Coord<f64>) -> f64 {
    let lat_km = (from.y - to.y) * KM_PER_DEGREE_LATITUDE;
    let lon_km = (from.x - to.x) * KM_PER_DEGREE_LONGITUDE * from.y.to_radians().cos();
    lat_km.hypot(lon_km)
}
