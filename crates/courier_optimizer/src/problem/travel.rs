use super::kmh::Kmh;

/// Minutes needed to cover `distance_km` at `speed`.
pub fn travel_time(distance_km: f64, speed: Kmh) -> f64 {
    distance_km * 60.0 / speed.value()
}

/// Minutes spent handing over `packages` at a stop. Never below five minutes.
pub fn service_time(packages: f64) -> f64 {
    3.0 * packages.sqrt() + 5.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_travel_time_default_speed() {
        assert_eq!(travel_time(10.0, Kmh::default()), 40.0);
        assert_eq!(travel_time(0.0, Kmh::default()), 0.0);
        assert_eq!(travel_time(2.5, Kmh::default()), 10.0);
    }

    #[test]
    fn test_travel_time_custom_speed() {
        assert_eq!(travel_time(30.0, Kmh::new(30.0)), 60.0);
    }

    #[test]
    fn test_service_time() {
        assert_eq!(service_time(0.0), 5.0);
        assert_eq!(service_time(4.0), 11.0);
        assert_eq!(service_time(9.0), 14.0);
    }
}
