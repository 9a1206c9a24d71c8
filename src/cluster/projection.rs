//! Spherical Mercator projection
//!
//! `x` grows eastwards from 0 (lon -180) to 1 (lon 180). `y` grows
//! southwards and is 0.5 on the equator; latitudes past the Mercator limit
//! (about ±85.05) project outside [0, 1] instead of piling up on its edges,
//! so polar points keep their separation. Latitudes are capped at
//! [`MAX_LATITUDE`] to keep `y` finite at the poles.

use std::f64::consts::PI;

/// Coefficient to translate from degrees to radians
pub const DEGREE_RAD: f64 = PI / 180.0;

/// Highest latitude fed into the projection
pub const MAX_LATITUDE: f64 = 89.9999;

/// Projects longitude to `x` in [0, 1]
pub fn lng_x(lng: f64) -> f64 {
    lng / 360.0 + 0.5
}

/// Projects latitude to `y`, 0 and 1 being the Mercator limits
pub fn lat_y(lat: f64) -> f64 {
    let sin = (lat.clamp(-MAX_LATITUDE, MAX_LATITUDE) * DEGREE_RAD).sin();
    0.5 - 0.25 * ((1.0 + sin) / (1.0 - sin)).ln() / PI
}

/// Wraps longitude into [-180, 180)
pub fn wrap_lng(lng: f64) -> f64 {
    if (-180.0..180.0).contains(&lng) {
        return lng;
    }
    (lng + 180.0).rem_euclid(360.0) - 180.0
}
