use geo::{Distance, HaversineMeasure};
use serde::{Deserialize, Serialize};

/// Equatorial radius used for every great-circle distance in the optimizer.
pub const EARTH_RADIUS_KM: f64 = 6378.137;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    point: geo::Point,
}

impl Location {
    pub fn from_lat_lng(lat: f64, lng: f64) -> Self {
        Self {
            point: geo::Point::new(lng, lat),
        }
    }

    pub fn lat(&self) -> f64 {
        self.point.y()
    }

    pub fn lng(&self) -> f64 {
        self.point.x()
    }

    /// Haversine distance in kilometers.
    pub fn haversine_km(&self, to: &Location) -> f64 {
        HaversineMeasure::new(EARTH_RADIUS_KM * 1000.0).distance(self.point, to.point) / 1000.0
    }
}

impl From<&Location> for geo::Point<f64> {
    fn from(location: &Location) -> Self {
        location.point
    }
}

impl From<geo::Point<f64>> for Location {
    fn from(point: geo::Point<f64>) -> Self {
        Location { point }
    }
}

impl From<&Location> for geo::Coord<f64> {
    fn from(location: &Location) -> Self {
        location.point.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_point_is_zero() {
        let location = Location::from_lat_lng(31.2, 121.4);
        assert_eq!(location.haversine_km(&location), 0.0);
    }

    #[test]
    fn test_one_degree_of_latitude() {
        let from = Location::from_lat_lng(0.0, 0.0);
        let to = Location::from_lat_lng(1.0, 0.0);

        let expected = EARTH_RADIUS_KM * 1.0_f64.to_radians();
        assert!((from.haversine_km(&to) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_symmetric() {
        let a = Location::from_lat_lng(31.23, 121.47);
        let b = Location::from_lat_lng(31.19, 121.43);

        assert!((a.haversine_km(&b) - b.haversine_km(&a)).abs() < 1e-12);
    }

    #[test]
    fn test_short_city_hop() {
        let a = Location::from_lat_lng(31.23, 121.47);
        let b = Location::from_lat_lng(31.19, 121.43);

        // equatorial radius, not geo's default mean radius
        let mean = geo::Haversine.distance(geo::Point::from(&a), geo::Point::from(&b)) / 1000.0;
        assert!(a.haversine_km(&b) > mean);
        assert!((a.haversine_km(&b) - mean * 6_378_137.0 / 6_371_008.8).abs() < 1e-9);
    }

    #[test]
    fn test_lat_lng_accessors() {
        let location = Location::from_lat_lng(31.23, 121.47);
        assert_eq!(location.lat(), 31.23);
        assert_eq!(location.lng(), 121.47);

        let point: geo::Point = (&location).into();
        assert_eq!(point.x(), 121.47);
    }
}
