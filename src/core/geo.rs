use serde::{Deserialize, Serialize};

/// Represents a geographical coordinate with latitude and longitude
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    /// Creates a new LatLng coordinate
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Creates a coordinate from a GeoJSON-ordered `[lon, lat]` pair
    pub fn from_lon_lat(lon: f64, lat: f64) -> Self {
        Self { lat, lng: lon }
    }

    /// Unit vector on the sphere for this coordinate
    pub fn to_cartesian(&self) -> [f64; 3] {
        let (lat, lng) = (self.lat.to_radians(), self.lng.to_radians());
        [lat.cos() * lng.cos(), lat.cos() * lng.sin(), lat.sin()]
    }

    /// Coordinate pointed at by a (not necessarily unit) cartesian vector
    pub fn from_cartesian(v: [f64; 3]) -> Option<Self> {
        let m = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
        if m < f64::EPSILON {
            return None;
        }
        let lat = (v[2] / m).clamp(-1.0, 1.0).asin().to_degrees();
        let lng = v[1].atan2(v[0]).to_degrees();
        Some(Self::new(lat, lng))
    }

    /// Points along the great circle from `self` to `other`, both ends included
    pub fn great_circle_to(&self, other: &LatLng, max_step_deg: f64) -> Vec<LatLng> {
        let a = self.to_cartesian();
        let b = other.to_cartesian();

        let dot = a[0] * b[0] + a[1] * b[1] + a[2] * b[2];
        let theta = dot.clamp(-1.0, 1.0).acos();

        if theta.abs() < 1e-6 || theta > std::f64::consts::PI - 1e-6 {
            // Coincident or antipodal: no unique great circle
            return vec![*self, *other];
        }

        let steps = ((theta.to_degrees() / max_step_deg.max(0.1)).ceil() as usize).max(1);
        let sin_theta = theta.sin();

        (0..=steps)
            .filter_map(|i| {
                let t = i as f64 / steps as f64;
                let wa = ((1.0 - t) * theta).sin() / sin_theta;
                let wb = (t * theta).sin() / sin_theta;
                LatLng::from_cartesian([
                    wa * a[0] + wb * b[0],
                    wa * a[1] + wb * b[1],
                    wa * a[2] + wb * b[2],
                ])
            })
            .collect()
    }
}

impl Default for LatLng {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Represents a point in screen or projected coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn subtract(&self, other: &Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn midpoint(&self, other: &Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lat_lng_creation() {
        let coord = LatLng::from_lon_lat(-74.0060, 40.7128);
        assert_eq!(coord.lat, 40.7128);
        assert_eq!(coord.lng, -74.0060);
    }

    #[test]
    fn test_point_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert_eq!(a.distance_to(&b), 5.0);
        assert_eq!(a.midpoint(&b), Point::new(1.5, 2.0));
    }

    #[test]
    fn test_cartesian_round_trip_keeps_coordinate() {
        let coord = LatLng::new(-33.9, 151.2);
        let back = LatLng::from_cartesian(coord.to_cartesian()).unwrap();
        assert!((back.lat - coord.lat).abs() < 1e-9);
        assert!((back.lng - coord.lng).abs() < 1e-9);
    }

    #[test]
    fn test_great_circle_endpoints_and_density() {
        let a = LatLng::new(0.0, 0.0);
        let b = LatLng::new(0.0, 90.0);
        let points = a.great_circle_to(&b, 10.0);

        assert_eq!(points.len(), 10);
        assert!((points[0].lng - 0.0).abs() < 1e-9);
        assert!((points[9].lng - 90.0).abs() < 1e-9);
        // Along the equator every intermediate point stays at latitude 0
        assert!(points.iter().all(|p| p.lat.abs() < 1e-9));
    }
}
