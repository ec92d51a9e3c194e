//! Proximity filter
//!
//! Great-circle (haversine) distance and the nearest-first radius search
//! used by the nearby-sightings endpoint. Both functions are pure and keep
//! no state between calls.
//!
//! Author: hephaex@gmail.com

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Mean Earth radius used by every stored distance
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Coordinate substituted when a location cannot be parsed (central London)
pub const DEFAULT_LOCATION: (f64, f64) = (51.5074, -0.1278);

/// A latitude/longitude pair with an optional human-readable address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GeoPoint {
    /// Degrees, expected in [-90, 90]
    #[schema(example = 51.5074)]
    pub latitude: f64,

    /// Degrees, expected in [-180, 180]
    #[schema(example = -0.1278)]
    pub longitude: f64,

    #[serde(default)]
    #[schema(example = "Tower of London")]
    pub address: Option<String>,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            address: None,
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// The fallback coordinate, labelled with whatever text could not be parsed
    pub fn default_with_address(address: impl Into<String>) -> Self {
        Self::new(DEFAULT_LOCATION.0, DEFAULT_LOCATION.1).with_address(address)
    }

    /// Whether both coordinates are finite and inside their ranges
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Great-circle distance to another point in kilometres
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        haversine_km(
            self.latitude,
            self.longitude,
            other.latitude,
            other.longitude,
        )
    }
}

/// Haversine distance in kilometres between two points given in degrees.
///
/// Identical points yield exactly `0.0`; antipodal points yield about
/// `π · 6371`. Non-finite input propagates as `NaN`.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);

    EARTH_RADIUS_KM * 2.0 * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Anything that carries a position and can be ranked by the proximity filter
pub trait Located {
    fn location(&self) -> &GeoPoint;
}

impl Located for GeoPoint {
    fn location(&self) -> &GeoPoint {
        self
    }
}

impl<T: Located + ?Sized> Located for &T {
    fn location(&self) -> &GeoPoint {
        (**self).location()
    }
}

/// A candidate annotated with its distance from the query origin
#[derive(Debug, Clone, PartialEq)]
pub struct Nearby<T> {
    pub item: T,
    pub distance_km: f64,
}

/// Return every candidate within `radius_km` of `origin`, nearest first.
///
/// The boundary is inclusive. Ties keep their encounter order. Candidates
/// whose distance is `NaN` (invalid coordinates) never satisfy the radius
/// test and are dropped.
pub fn find_nearby<I, T>(candidates: I, origin: &GeoPoint, radius_km: f64) -> Vec<Nearby<T>>
where
    I: IntoIterator<Item = T>,
    T: Located,
{
    let mut nearby: Vec<Nearby<T>> = candidates
        .into_iter()
        .filter_map(|item| {
            let distance_km = origin.distance_km(item.location());
            (distance_km <= radius_km).then_some(Nearby { item, distance_km })
        })
        .collect();

    // sort_by is stable
    nearby.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    nearby
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    struct Candidate {
        id: u32,
        location: GeoPoint,
    }

    impl Located for Candidate {
        fn location(&self) -> &GeoPoint {
            &self.location
        }
    }

    fn candidate(id: u32, lat: f64, lon: f64) -> Candidate {
        Candidate {
            id,
            location: GeoPoint::new(lat, lon),
        }
    }

    fn london() -> GeoPoint {
        GeoPoint::new(51.5074, -0.1278)
    }

    #[test]
    fn test_same_point_is_zero_and_included() {
        let candidates = vec![candidate(1, 51.5074, -0.1278)];
        let result = find_nearby(&candidates, &london(), 1.0);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].item.id, 1);
        assert_eq!(result[0].distance_km, 0.0);
    }

    #[test]
    fn test_paris_outside_300km() {
        let paris = GeoPoint::new(48.8566, 2.3522);
        let distance = london().distance_km(&paris);
        assert!((distance - 343.5).abs() < 0.5, "got {distance}");

        let candidates = vec![candidate(1, 48.8566, 2.3522)];
        assert!(find_nearby(&candidates, &london(), 300.0).is_empty());
        assert_eq!(find_nearby(&candidates, &london(), 350.0).len(), 1);
    }

    #[test]
    fn test_antipodal_distance() {
        let d = haversine_km(0.0, 0.0, 0.0, 180.0);
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);
        assert!(d < 20_016.0);
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let target = candidate(7, 52.2053, 0.1218);
        let exact = london().distance_km(&target.location);

        let included = find_nearby(vec![target.clone()], &london(), exact);
        assert_eq!(included.len(), 1);

        let excluded = find_nearby(vec![target], &london(), exact * (1.0 - 1e-12));
        assert!(excluded.is_empty());
    }

    #[test]
    fn test_sorted_nearest_first_with_stable_ties() {
        let candidates = vec![
            candidate(1, 53.4808, -2.2426), // Manchester
            candidate(2, 51.4545, -2.5879), // Bristol
            candidate(3, 51.5074, -0.1278), // London
            candidate(4, 51.4545, -2.5879), // Bristol again
        ];

        let ids: Vec<u32> = find_nearby(&candidates, &london(), 500.0)
            .iter()
            .map(|n| n.item.id)
            .collect();
        assert_eq!(ids, vec![3, 2, 4, 1]);
    }

    #[test]
    fn test_input_not_mutated() {
        let candidates = vec![candidate(1, 10.0, 10.0), candidate(2, 0.0, 0.0)];
        let _ = find_nearby(&candidates, &GeoPoint::new(0.0, 0.0), 20_000.0);
        assert_eq!(candidates[0].id, 1);
        assert_eq!(candidates[1].id, 2);
    }

    #[test]
    fn test_invalid_coordinates_do_not_panic() {
        let candidates = vec![
            candidate(1, f64::NAN, 0.0),
            candidate(2, 51.5074, f64::INFINITY),
            candidate(3, 500.0, -900.0),
            candidate(4, 51.5074, -0.1278),
        ];

        let result = find_nearby(&candidates, &london(), 10.0);
        assert!(result.iter().all(|n| !n.distance_km.is_nan()));
        assert!(result.iter().any(|n| n.item.id == 4));
        assert!(result.iter().all(|n| n.item.id != 1 && n.item.id != 2));

        let nan_origin = GeoPoint::new(f64::NAN, f64::NAN);
        assert!(find_nearby(&candidates, &nan_origin, 1e9).is_empty());
    }

    #[test]
    fn test_geo_point_validity() {
        assert!(london().is_valid());
        assert!(!GeoPoint::new(91.0, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, -180.5).is_valid());
        assert!(!GeoPoint::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_default_with_address() {
        let p = GeoPoint::default_with_address("somewhere");
        assert_eq!((p.latitude, p.longitude), DEFAULT_LOCATION);
        assert_eq!(p.address.as_deref(), Some("somewhere"));
    }

    fn lat() -> impl Strategy<Value = f64> {
        -90.0f64..=90.0
    }

    fn lon() -> impl Strategy<Value = f64> {
        -180.0f64..=180.0
    }

    proptest! {
        #[test]
        fn prop_distance_is_symmetric(a in lat(), b in lon(), c in lat(), d in lon()) {
            let ab = haversine_km(a, b, c, d);
            let ba = haversine_km(c, d, a, b);
            prop_assert!((ab - ba).abs() < 1e-6);
        }

        #[test]
        fn prop_distance_to_self_is_zero(a in lat(), b in lon()) {
            prop_assert_eq!(haversine_km(a, b, a, b), 0.0);
        }

        #[test]
        fn prop_results_are_ordered_and_within_radius(
            points in proptest::collection::vec((lat(), lon()), 0..40),
            origin in (lat(), lon()),
            radius in 0.0f64..20_100.0,
        ) {
            let candidates: Vec<GeoPoint> =
                points.iter().map(|&(la, lo)| GeoPoint::new(la, lo)).collect();
            let origin = GeoPoint::new(origin.0, origin.1);
            let result = find_nearby(&candidates, &origin, radius);

            for pair in result.windows(2) {
                prop_assert!(pair[0].distance_km <= pair[1].distance_km);
            }
            prop_assert!(result.iter().all(|n| n.distance_km <= radius));
        }
    }
}
