use geo::Point;

/// Statute miles in one minute of arc (a nautical mile), empirical
const STATUTE_MILES_PER_NAUTICAL_MILE: f64 = 1.1515;
const KILOMETERS_PER_MILE: f64 = 1.609_344;

/// Great-circle distance in meters between two points (`x` = longitude,
/// `y` = latitude, degrees) using the spherical law of cosines.
///
/// The cosine argument is clamped to `[-1, 1]` so that rounding on nearly
/// identical points cannot push `acos` out of its domain.
pub fn great_circle_distance(a: Point<f64>, b: Point<f64>) -> f64 {
    let (lat1, lat2) = (a.y().to_radians(), b.y().to_radians());
    let theta = (a.x() - b.x()).to_radians();

    let cosine = lat1.sin() * lat2.sin() + lat1.cos() * lat2.cos() * theta.cos();
    let degrees = cosine.clamp(-1.0, 1.0).acos().to_degrees();

    degrees * 60.0 * STATUTE_MILES_PER_NAUTICAL_MILE * KILOMETERS_PER_MILE * 1000.0
}
