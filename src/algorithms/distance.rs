use crate::core::{GeoFix, EARTH_RADIUS_M};

/// Great-circle distance between two fixes in meters (haversine, spherical Earth).
///
/// Elevation and heading are ignored. The result is symmetric in its
/// arguments and exactly zero for identical coordinates.
pub fn haversine_distance(a: &GeoFix, b: &GeoFix) -> f64 {
    if a.latitude == b.latitude && a.longitude == b.longitude {
        return 0.0;
    }

    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let delta_lat = (b.latitude - a.latitude).to_radians();
    let delta_lon = (b.longitude - a.longitude).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    // Rounding can push h a hair above 1 for antipodal points
    let c = 2.0 * h.min(1.0).sqrt().asin();

    EARTH_RADIUS_M * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_to_self_is_zero() {
        let fix = GeoFix::new(-3.7214696, -38.5430259).with_elevation(20.0);
        assert_eq!(haversine_distance(&fix, &fix), 0.0);
        let other_elevation = GeoFix::new(-3.7214696, -38.5430259).with_elevation(90.0);
        assert_eq!(haversine_distance(&fix, &other_elevation), 0.0);
    }

    #[test]
    fn test_distance_is_commutative() {
        let samples = [
            (GeoFix::new(-3.72, -38.54), GeoFix::new(-3.92, -38.45)),
            (GeoFix::new(21.4225, 39.8262), GeoFix::new(-3.72, -38.54)),
            (GeoFix::new(89.9, 179.9), GeoFix::new(-89.9, -179.9)),
            (GeoFix::new(0.0, 0.0), GeoFix::new(0.0, 180.0)),
        ];

        for (a, b) in samples.iter() {
            let ab = haversine_distance(a, b);
            let ba = haversine_distance(b, a);
            assert!((ab - ba).abs() < 1e-6, "{} != {}", ab, ba);
        }
    }

    #[test]
    fn test_one_degree_of_longitude_at_equator() {
        let d = haversine_distance(&GeoFix::new(0.0, 0.0), &GeoFix::new(0.0, 1.0));
        assert!((d - 111_194.9).abs() < 1.0, "got {}", d);
    }

    #[test]
    fn test_antipodal_points() {
        let d = haversine_distance(&GeoFix::new(0.0, 0.0), &GeoFix::new(0.0, 180.0));
        let half_circumference = std::f64::consts::PI * EARTH_RADIUS_M;
        assert!((d - half_circumference).abs() < 1.0);
    }

    #[test]
    fn test_fortaleza_sites_distance() {
        // Two sites in the Fortaleza metro area, roughly 24 km apart
        let d = haversine_distance(&GeoFix::new(-3.72, -38.54), &GeoFix::new(-3.92, -38.45));
        assert!(d > 23_000.0 && d < 26_000.0, "got {}", d);
    }
}
