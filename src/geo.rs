//! Great-circle distance between two coordinates.

/// Mean Earth radius used by [`distance_km`], in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Returns the haversine distance in kilometres between two points given in
/// decimal degrees.
///
/// Inputs are not normalised; callers supply latitudes in [-90, 90] and
/// longitudes in [-180, 180].
///
/// # Examples
///
/// ```
/// use shift_guard::geo::distance_km;
///
/// assert_eq!(distance_km(10.0, 10.0, 10.0, 10.0), 0.0);
///
/// // One degree of latitude is roughly 111 km.
/// let d = distance_km(0.0, 0.0, 1.0, 0.0);
/// assert!((d - 111.19).abs() < 0.01);
/// ```
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let lat1 = lat1.to_radians();
    let lat2 = lat2.to_radians();
    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    // Rounding can push `a` a hair above 1 for antipodal points.
    let c = 2.0 * a.sqrt().min(1.0).asin();
    EARTH_RADIUS_KM * c
}
