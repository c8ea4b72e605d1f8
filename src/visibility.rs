//! Stateless ground-station geometry.
//!
//! All distances are in km, angles in degrees unless noted. The Earth is
//! treated as a sphere of radius 6371 km, matching the reception-radius
//! figures satellites are configured with.

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Observer location on the ground.
#[derive(Debug, Clone, Copy)]
pub struct StationLocation {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
}

/// Great-circle distance between two points, haversine formula.
pub fn ground_distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// True 3-D distance from the station to the satellite.
///
/// Law of cosines over the triangle formed by the station (at Earth radius),
/// the satellite (at Earth radius + altitude) and the central angle between
/// them.
pub fn slant_range_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64, alt_km: f64) -> f64 {
    let psi = ground_distance_km(lat1, lon1, lat2, lon2) / EARTH_RADIUS_KM;
    let r1 = EARTH_RADIUS_KM;
    let r2 = EARTH_RADIUS_KM + alt_km;
    (r1 * r1 + r2 * r2 - 2.0 * r1 * r2 * psi.cos()).sqrt()
}

/// Angle of the satellite above the station's local horizon.
///
/// Clamped to [-10, 90]: anything below -10 degrees is deep below the horizon
/// and large negative values must not leak into downstream thresholds.
pub fn elevation_deg(ground_dist_km: f64, alt_km: f64) -> f64 {
    let psi = ground_dist_km / EARTH_RADIUS_KM;
    if psi == 0.0 {
        return 90.0;
    }

    let ratio = EARTH_RADIUS_KM / (EARTH_RADIUS_KM + alt_km);
    let el = (psi.cos() - ratio).atan2(psi.sin()).to_degrees();
    el.clamp(-10.0, 90.0)
}

/// The single gating predicate: in range iff the slant range is inside the
/// configured reception radius and the elevation clears the configured
/// minimum.
pub fn is_visible(range_km: f64, elevation: f64, radius_km: f64, min_elevation_deg: f64) -> bool {
    range_km < radius_km && elevation >= min_elevation_deg
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn ground_distance_known_points() {
        // Same point.
        assert_relative_eq!(ground_distance_km(50.0, 10.0, 50.0, 10.0), 0.0);
        // Quarter of the equator.
        assert_relative_eq!(
            ground_distance_km(0.0, 0.0, 0.0, 90.0),
            EARTH_RADIUS_KM * std::f64::consts::FRAC_PI_2,
            epsilon = 1e-6
        );
        // Pole to pole.
        assert_relative_eq!(
            ground_distance_km(90.0, 0.0, -90.0, 0.0),
            EARTH_RADIUS_KM * std::f64::consts::PI,
            epsilon = 1e-6
        );
    }

    #[test]
    fn slant_range_overhead_equals_altitude() {
        assert_relative_eq!(slant_range_km(40.0, 7.0, 40.0, 7.0, 600.0), 600.0, epsilon = 1e-9);
    }

    #[test]
    fn slant_range_exceeds_ground_distance() {
        let gd = ground_distance_km(0.0, 0.0, 5.0, 5.0);
        let sr = slant_range_km(0.0, 0.0, 5.0, 5.0, 600.0);
        assert!(sr > gd);
    }

    #[test]
    fn elevation_overhead_is_exactly_90() {
        assert_eq!(elevation_deg(0.0, 600.0), 90.0);
    }

    #[test]
    fn elevation_decreases_with_distance() {
        let near = elevation_deg(100.0, 600.0);
        let far = elevation_deg(1500.0, 600.0);
        assert!(near > far);
    }

    #[test]
    fn elevation_is_clamped() {
        for dist in [0.0, 500.0, 3000.0, 10000.0, 20000.0] {
            let el = elevation_deg(dist, 600.0);
            assert!((-10.0..=90.0).contains(&el), "el {} out of range for {}", el, dist);
        }
        // Far side of the planet would be a huge negative angle without the clamp.
        assert_eq!(elevation_deg(EARTH_RADIUS_KM * std::f64::consts::PI, 600.0), -10.0);
    }

    #[test]
    fn visibility_requires_both_conditions() {
        assert!(is_visible(1000.0, 30.0, 1500.0, 5.0));
        assert!(!is_visible(2000.0, 30.0, 1500.0, 5.0)); // out of radius
        assert!(!is_visible(1000.0, 2.0, 1500.0, 5.0)); // below min elevation
        assert!(!is_visible(1500.0, 30.0, 1500.0, 5.0)); // radius is exclusive
        assert!(is_visible(1000.0, 5.0, 1500.0, 5.0)); // min elevation is inclusive
    }
}
