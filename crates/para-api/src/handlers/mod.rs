//! API handlers
//!
//! Author: hephaex@gmail.com

pub mod ads;
pub mod ai_reports;
pub mod bookings;
pub mod catalog;
pub mod equipment;
pub mod hauntings;
pub mod health;
pub mod investigators;
pub mod sightings;
pub mod subscriptions;

/// Round to `places` decimal digits
pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Convert a pence amount to pounds
pub(crate) fn pence_to_gbp(pence: u64) -> f64 {
    pence as f64 / 100.0
}
