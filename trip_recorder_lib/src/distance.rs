use crate::location_point::LocationPoint;

const EARTH_RADIUS_M: f64 = 6_371_008.8; // Mean earth radius in meters

/// Great-circle distance in meters between two (latitude, longitude) pairs.
pub fn haversine_distance(p1: (f64, f64), p2: (f64, f64)) -> f64 {
    let d_lat = (p2.0 - p1.0).to_radians();
    let d_lon = (p2.1 - p1.1).to_radians();
    let lat1 = p1.0.to_radians();
    let lat2 = p2.0.to_radians();

    let a = f64::sin(d_lat / 2.).powi(2)
        + f64::cos(lat1) * f64::cos(lat2) * f64::sin(d_lon / 2.).powi(2);
    let c = 2. * f64::asin(f64::sqrt(a));

    EARTH_RADIUS_M * c
}

/// Total path length in meters over points ordered by ascending timestamp:
/// the sum of the legs between each adjacent pair, not the start-to-end
/// displacement. Accumulates strictly left to right, so the same sequence
/// always sums to the same value.
pub fn path_distance(points: &[LocationPoint]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }

    let mut total = 0.0;
    for pair in points.windows(2) {
        total += haversine_distance(
            (pair[0].latitude, pair[0].longitude),
            (pair[1].latitude, pair[1].longitude),
        );
    }
    total
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn point(latitude: f64, longitude: f64, secs: i64) -> LocationPoint {
        LocationPoint::new(1, latitude, longitude, Utc.timestamp_opt(secs, 0).unwrap())
    }

    fn sample_track() -> Vec<LocationPoint> {
        vec![
            point(19.0000, -99.0000, 0),
            point(19.0010, -99.0000, 1),
            point(19.0010, -99.0012, 2),
            point(19.0020, -99.0012, 3),
            point(19.0020, -99.0030, 4),
        ]
    }

    #[test]
    fn empty_and_single_point_are_exactly_zero() {
        assert_eq!(path_distance(&[]), 0.0);
        assert_eq!(path_distance(&[point(19.0, -99.0, 0)]), 0.0);
    }

    #[test]
    fn splitting_at_any_index_preserves_the_total() {
        let track = sample_track();
        let total = path_distance(&track);

        for k in 0..track.len() {
            let split = path_distance(&track[..=k]) + path_distance(&track[k..]);
            assert!(
                (total - split).abs() < 1e-9,
                "split at {k}: {split} != {total}"
            );
        }
    }

    #[test]
    fn appending_a_point_never_decreases_the_total() {
        let track = sample_track();
        let mut previous = 0.0;

        for end in 0..=track.len() {
            let total = path_distance(&track[..end]);
            assert!(total >= previous, "total shrank at {end}");
            previous = total;
        }
    }

    #[test]
    fn duplicate_consecutive_points_contribute_nothing() {
        let mut track = sample_track();
        let total = path_distance(&track);

        track.insert(2, track[1].clone());
        assert!((path_distance(&track) - total).abs() < 1e-9);
    }

    #[test]
    fn right_triangle_sums_the_legs_not_the_hypotenuse() {
        // Two 100 m legs approximated with small deltas at a fixed latitude.
        let reference_lat: f64 = 19.0;
        let meters_per_degree = EARTH_RADIUS_M * std::f64::consts::PI / 180.0;
        let d_lat = 100.0 / meters_per_degree;
        let d_lon = 100.0 / (meters_per_degree * reference_lat.to_radians().cos());

        let track = vec![
            point(reference_lat, -99.0, 0),
            point(reference_lat + d_lat, -99.0, 1),
            point(reference_lat + d_lat, -99.0 + d_lon, 2),
        ];

        let total = path_distance(&track);
        assert!((total - 200.0).abs() < 1.0, "path was {total}");

        let displacement = haversine_distance(
            (track[0].latitude, track[0].longitude),
            (track[2].latitude, track[2].longitude),
        );
        assert!((displacement - 141.4).abs() < 2.0, "displacement was {displacement}");
        assert!(total > displacement);
    }

    #[test]
    fn result_is_bitwise_deterministic() {
        let track = sample_track();
        assert_eq!(path_distance(&track).to_bits(), path_distance(&track).to_bits());
    }
}
