//! Conversions between SI units and the units shown to users.
//!
//! Distances are displayed in millions of miles and speeds in km/s.

/// One million statute miles [m]
pub const MILLION_MILES: f64 = 1.609344e9;

/// Meters per kilometer.
pub const METERS_PER_KILOMETER: f64 = 1000.0;

/// Millions of miles to meters.
pub fn million_miles_to_meters(distance: f64) -> f64 {
    distance * MILLION_MILES
}

/// Meters to millions of miles.
pub fn meters_to_million_miles(distance: f64) -> f64 {
    distance / MILLION_MILES
}

/// km/s to m/s.
pub fn km_per_s_to_m_per_s(speed: f64) -> f64 {
    speed * METERS_PER_KILOMETER
}

/// m/s to km/s.
pub fn m_per_s_to_km_per_s(speed: f64) -> f64 {
    speed / METERS_PER_KILOMETER
}
