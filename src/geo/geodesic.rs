//! Great-circle path sampling
//!
//! Paths are sampled by fractional arc length on the unit sphere, so the
//! spacing between consecutive samples is uniform regardless of latitude.

use glam::DVec3;

use super::coord::Coordinate;
use crate::normalize_longitude;

/// Below this the endpoints are treated as the same point (radians)
const COINCIDENT_EPSILON: f64 = 1e-12;
/// Below this the endpoints are treated as antipodal (length of the rejection vector)
const ANTIPODAL_EPSILON: f64 = 1e-9;

/// Coordinate to unit vector (x toward lon 0, z toward the north pole)
pub fn to_unit(c: Coordinate) -> DVec3 {
    let (lat, lon) = (c.lat().to_radians(), c.lon().to_radians());
    DVec3::new(lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin())
}

/// Unit vector back to a coordinate
pub fn from_unit(v: DVec3) -> Coordinate {
    let lat = v.z.clamp(-1.0, 1.0).asin().to_degrees();
    let lon = normalize_longitude(v.y.atan2(v.x).to_degrees());
    Coordinate::new(lat, lon)
}

/// Central angle between two coordinates (radians)
pub fn angular_distance(a: Coordinate, b: Coordinate) -> f64 {
    to_unit(a).dot(to_unit(b)).clamp(-1.0, 1.0).acos()
}

/// Unit tangent at `c` pointing due north
///
/// At the poles this degenerates to the direction of the pole's longitude,
/// which is still a valid unit tangent.
fn north_tangent(c: Coordinate) -> DVec3 {
    let (lat, lon) = (c.lat().to_radians(), c.lon().to_radians());
    DVec3::new(-lat.sin() * lon.cos(), -lat.sin() * lon.sin(), lat.cos())
}

/// Sample `num_samples` points along the great circle from `start` to `end`
///
/// The first sample is `start` and the last is `end`. Coincident endpoints
/// yield copies of `start`. For antipodal endpoints every great
/// circle is shortest, so the one leaving `start` due north is used.
/// Longitudes are normalized but not wrapped for the screen; see
/// [`super::segment`] for that.
pub fn compute_path(start: Coordinate, end: Coordinate, num_samples: usize) -> Vec<Coordinate> {
    match num_samples {
        0 => return Vec::new(),
        1 => return vec![start],
        _ => {}
    }

    let a = to_unit(start);
    let b = to_unit(end);
    let dot = a.dot(b).clamp(-1.0, 1.0);
    let theta = dot.acos();

    if theta < COINCIDENT_EPSILON {
        // Same point, possibly spelled differently (e.g. a pole at two longitudes)
        let mut path = vec![start; num_samples];
        path[num_samples - 1] = end;
        return path;
    }

    // Orthonormal basis {a, u} spanning the great circle through a and b
    let rejection = b - a * dot;
    let u = if rejection.length() < ANTIPODAL_EPSILON {
        north_tangent(start)
    } else {
        rejection.normalize()
    };

    let last = num_samples - 1;
    let mut path = Vec::with_capacity(num_samples);
    for i in 0..num_samples {
        let coord = if i == 0 {
            start
        } else if i == last {
            end
        } else {
            let angle = theta * (i as f64 / last as f64);
            from_unit(a * angle.cos() + u * angle.sin())
        };
        path.push(coord);
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::segment::split_geo_path;
    use proptest::prelude::*;

    #[test]
    fn test_empty_and_single() {
        let a = Coordinate::new(10.0, 20.0);
        let b = Coordinate::new(-30.0, 40.0);
        assert!(compute_path(a, b, 0).is_empty());
        assert_eq!(compute_path(a, b, 1), vec![a]);
    }

    #[test]
    fn test_coincident_points_repeat() {
        let a = Coordinate::new(51.5074, -0.1278);
        let path = compute_path(a, a, 5);
        assert_eq!(path.len(), 5);
        assert!(path.iter().all(|p| *p == a));
    }

    #[test]
    fn test_equator_path_stays_on_equator() {
        let path = compute_path(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 170.0), 220);
        assert_eq!(path.len(), 220);
        assert_eq!(path[0], Coordinate::new(0.0, 0.0));
        assert_eq!(path[219], Coordinate::new(0.0, 170.0));

        let step = 170.0 / 219.0;
        for (i, p) in path.iter().enumerate() {
            assert!(p.lat().abs() < 1e-9, "sample {i} left the equator: {}", p.lat());
            assert!((p.lon() - step * i as f64).abs() < 1e-6);
        }

        assert_eq!(split_geo_path(&path).len(), 1);
        let screen: Vec<_> = path
            .iter()
            .map(|c| crate::geo::projection::project(*c, 1920, 1080, None))
            .collect();
        let segs = crate::geo::segment::split_screen_path(&screen, 1920.0);
        assert_eq!(segs.len(), 1);
        assert_eq!(segs[0].len(), 220);
    }

    #[test]
    fn test_short_way_across_antimeridian() {
        let path = compute_path(Coordinate::new(0.0, 170.0), Coordinate::new(0.0, -170.0), 220);
        assert_eq!(path.len(), 220);
        // Every sample stays on the short 20 degree arc
        assert!(path.iter().all(|p| p.lon().abs() >= 170.0 - 1e-6));
        assert_eq!(split_geo_path(&path).len(), 2);
    }

    #[test]
    fn test_antimeridian_path_splits_on_screen() {
        let (w, h) = (1920, 1080);
        let path = compute_path(Coordinate::new(0.0, 170.0), Coordinate::new(0.0, -170.0), 220);
        let screen: Vec<_> = path
            .iter()
            .map(|c| crate::geo::projection::project(*c, w, h, None))
            .collect();
        let segs = crate::geo::segment::split_screen_path(&screen, w as f32);
        assert_eq!(segs.len(), 2);
        assert_eq!(segs.iter().map(Vec::len).sum::<usize>(), 220);
        for seg in &segs {
            for pair in seg.windows(2) {
                assert!((pair[1].x - pair[0].x).abs() <= w as f32 * 0.5);
            }
        }
    }

    #[test]
    fn test_antipodal_goes_north() {
        let start = Coordinate::new(0.0, 0.0);
        let end = Coordinate::new(0.0, 180.0);
        let path = compute_path(start, end, 101);
        assert_eq!(path.len(), 101);
        // Midpoint of a northbound half circle is the north pole
        assert!((path[50].lat() - 90.0).abs() < 1e-6);
        assert!(path[1].lat() > 0.0);
    }

    #[test]
    fn test_angular_distance() {
        let d = angular_distance(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 90.0));
        assert!((d - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    fn coordinate() -> impl Strategy<Value = Coordinate> {
        (-90.0f64..=90.0, -180.0f64..=180.0).prop_map(|(lat, lon)| Coordinate::new(lat, lon))
    }

    proptest! {
        #[test]
        fn prop_sample_count_and_endpoints(a in coordinate(), b in coordinate(), n in 2usize..400) {
            let path = compute_path(a, b, n);
            prop_assert_eq!(path.len(), n);
            prop_assert_eq!(path[0], a);
            prop_assert_eq!(path[n - 1], b);
        }

        #[test]
        fn prop_uniform_spacing(a in coordinate(), b in coordinate(), n in 3usize..300) {
            let path = compute_path(a, b, n);
            let total = angular_distance(a, b);
            let expected = total / (n - 1) as f64;
            for pair in path.windows(2) {
                let step = angular_distance(pair[0], pair[1]);
                prop_assert!((step - expected).abs() < 1e-6, "step {} expected {}", step, expected);
            }
        }

        #[test]
        fn prop_samples_in_range(a in coordinate(), b in coordinate()) {
            for p in compute_path(a, b, 64) {
                prop_assert!((-90.0..=90.0).contains(&p.lat()));
                prop_assert!(p.lon() > -180.0 && p.lon() <= 180.0);
            }
        }
    }
}
