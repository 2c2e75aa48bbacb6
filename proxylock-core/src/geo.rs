//! Geographic types and great-circle distance

/// Mean Earth radius used by the haversine formula
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Rejected geofence input
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),
    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),
    #[error("radius must be a positive number of meters, got {0}")]
    NonPositiveRadius(f64),
}

/// A latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Create a point, rejecting out-of-range (or NaN) coordinates
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ValidationError> {
        let point = Self { latitude, longitude };
        point.validate()?;
        Ok(point)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(ValidationError::LatitudeOutOfRange(self.latitude));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(ValidationError::LongitudeOutOfRange(self.longitude));
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

/// Circular home region. Radius is always positive and finite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HomeGeofence {
    center: GeoPoint,
    radius_meters: f64,
}

impl HomeGeofence {
    pub fn new(center: GeoPoint, radius_meters: f64) -> Result<Self, ValidationError> {
        center.validate()?;
        if !radius_meters.is_finite() || radius_meters <= 0.0 {
            return Err(ValidationError::NonPositiveRadius(radius_meters));
        }
        Ok(Self { center, radius_meters })
    }

    pub fn center(&self) -> GeoPoint {
        self.center
    }

    pub fn radius_meters(&self) -> f64 {
        self.radius_meters
    }

    /// Inclusive: a point exactly on the circle counts as inside
    pub fn contains(&self, point: &GeoPoint) -> bool {
        haversine_distance(&self.center, point) <= self.radius_meters
    }
}

/// Great-circle distance in meters between two points
pub fn haversine_distance(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let d_phi = (b.latitude - a.latitude).to_radians();
    let d_lambda = (b.longitude - a.longitude).to_radians();

    let h = (d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    // rounding pushes h just past 1.0 near the antipode
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_METERS * c
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint::new(lat, lon).unwrap()
    }

    #[test]
    fn distance_to_self_is_zero() {
        for point in [p(0.0, 0.0), p(37.0, -122.0), p(-89.9, 179.9), p(51.5, -0.12)] {
            assert_eq!(haversine_distance(&point, &point), 0.0);
        }
    }

    #[test]
    fn distance_is_symmetric() {
        let a = p(37.0, -122.0);
        let b = p(40.7128, -74.006);
        let ab = haversine_distance(&a, &b);
        let ba = haversine_distance(&b, &a);
        assert!((ab - ba).abs() < 1e-6, "{ab} != {ba}");
    }

    #[test]
    fn one_degree_of_longitude_on_equator() {
        let d = haversine_distance(&p(0.0, 0.0), &p(0.0, 1.0));
        assert!((d - 111_195.0).abs() < 111_195.0 * 0.01, "got {d}");
    }

    #[test]
    fn antipodal_distance_is_finite() {
        let half_circumference = std::f64::consts::PI * EARTH_RADIUS_METERS;
        let mut lat = -89.0;
        while lat <= 89.0 {
            let mut lon = -180.0;
            while lon <= 180.0 {
                let opposite = if lon > 0.0 { lon - 180.0 } else { lon + 180.0 };
                let d = haversine_distance(&p(lat, lon), &p(-lat, opposite));
                assert!(d.is_finite(), "({lat}, {lon}) gave {d}");
                assert!((d - half_circumference).abs() < 1.0, "({lat}, {lon}) gave {d}");
                lon += 7.3;
            }
            lat += 3.7;
        }

        let fence = HomeGeofence::new(p(37.0, -122.0), half_circumference + 1.0).unwrap();
        assert!(fence.contains(&p(-37.0, 58.0)));
    }

    #[test]
    fn point_validation() {
        assert_eq!(GeoPoint::new(90.5, 0.0), Err(ValidationError::LatitudeOutOfRange(90.5)));
        assert_eq!(GeoPoint::new(0.0, -181.0), Err(ValidationError::LongitudeOutOfRange(-181.0)));
        assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
        assert!(GeoPoint::new(-90.0, 180.0).is_ok());
    }

    #[test]
    fn geofence_rejects_bad_radius() {
        let center = p(37.0, -122.0);
        assert_eq!(HomeGeofence::new(center, -5.0), Err(ValidationError::NonPositiveRadius(-5.0)));
        assert!(HomeGeofence::new(center, 0.0).is_err());
        assert!(HomeGeofence::new(center, f64::NAN).is_err());
        assert!(HomeGeofence::new(center, f64::INFINITY).is_err());
        assert!(HomeGeofence::new(center, 0.5).is_ok());
    }

    #[test]
    fn contains_is_inclusive() {
        let center = p(37.0, -122.0);
        let edge = p(37.001, -122.0);
        let radius = haversine_distance(&center, &edge);
        let fence = HomeGeofence::new(center, radius).unwrap();
        assert!(fence.contains(&edge));
        assert!(!fence.contains(&p(37.0011, -122.0)));
    }
}
