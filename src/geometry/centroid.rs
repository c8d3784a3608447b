use crate::core::geo::LatLng;
use geo_types::{Coord, Geometry, LineString, Polygon};

const EPSILON: f64 = 1e-9;

type Vec3 = [f64; 3];

/// Geographic center of a geometry on the sphere.
///
/// Areal geometries are weighted by spherical area, lines by length and
/// points equally; a lower dimension is only used when the higher one is
/// degenerate. Ring winding does not matter: each ring is taken as the
/// smaller region it bounds, and holes are subtracted.
pub fn spherical_centroid(geometry: &Geometry<f64>) -> Option<LatLng> {
    let mut acc = Accumulator::default();
    acc.geometry(geometry);

    [acc.area, acc.length, acc.points]
        .into_iter()
        .find_map(|v| if norm(v) > EPSILON { LatLng::from_cartesian(v) } else { None })
}

#[derive(Default)]
struct Accumulator {
    area: Vec3,
    length: Vec3,
    points: Vec3,
}

impl Accumulator {
    fn geometry(&mut self, geometry: &Geometry<f64>) {
        match geometry {
            Geometry::Point(p) => self.point(p.0),
            Geometry::MultiPoint(mp) => mp.0.iter().for_each(|p| self.point(p.0)),
            Geometry::Line(line) => self.line(&LineString::new(vec![line.start, line.end])),
            Geometry::LineString(ls) => self.line(ls),
            Geometry::MultiLineString(mls) => mls.0.iter().for_each(|ls| self.line(ls)),
            Geometry::Polygon(polygon) => self.polygon(polygon),
            Geometry::MultiPolygon(mp) => mp.0.iter().for_each(|p| self.polygon(p)),
            Geometry::GeometryCollection(gc) => gc.0.iter().for_each(|g| self.geometry(g)),
            Geometry::Rect(rect) => self.polygon(&rect.to_polygon()),
            Geometry::Triangle(triangle) => self.polygon(&triangle.to_polygon()),
        }
    }

    fn point(&mut self, coord: Coord<f64>) {
        add(&mut self.points, cartesian(coord), 1.0);
    }

    fn line(&mut self, line: &LineString<f64>) {
        for c in &line.0 {
            self.point(*c);
        }
        for pair in line.0.windows(2) {
            let (a, b) = (cartesian(pair[0]), cartesian(pair[1]));
            let angle = norm(cross(a, b)).atan2(dot(a, b));
            let mid = [a[0] + b[0], a[1] + b[1], a[2] + b[2]];
            let m = norm(mid);
            if m > EPSILON {
                add(&mut self.length, mid, angle / m);
            }
        }
    }

    fn polygon(&mut self, polygon: &Polygon<f64>) {
        let exterior = ring_moment(polygon.exterior());
        add(&mut self.area, exterior, 1.0);
        for hole in polygon.interiors() {
            add(&mut self.area, ring_moment(hole), -1.0);
        }
        self.line(polygon.exterior());
        for hole in polygon.interiors() {
            self.line(hole);
        }
    }
}

/// First moment of the region bounded by a ring, oriented toward its vertices
fn ring_moment(ring: &LineString<f64>) -> Vec3 {
    let vertices: Vec<Vec3> = ring.0.iter().map(|c| cartesian(*c)).collect();
    let mut moment = [0.0; 3];
    let mut mean = [0.0; 3];

    for (i, &a) in vertices.iter().enumerate() {
        add(&mut mean, a, 1.0);
        let b = vertices[(i + 1) % vertices.len()];
        let n = cross(a, b);
        let m = norm(n);
        if m > EPSILON {
            add(&mut moment, n, m.atan2(dot(a, b)) / m);
        }
    }

    if dot(moment, mean) < 0.0 {
        moment.iter_mut().for_each(|v| *v = -*v);
    }
    moment
}

fn cartesian(coord: Coord<f64>) -> Vec3 {
    LatLng::from_lon_lat(coord.x, coord.y).to_cartesian()
}

fn add(acc: &mut Vec3, v: Vec3, weight: f64) {
    for i in 0..3 {
        acc[i] += v[i] * weight;
    }
}

fn dot(a: Vec3, b: Vec3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn cross(a: Vec3, b: Vec3) -> Vec3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn norm(v: Vec3) -> f64 {
    dot(v, v).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{line_string, polygon, MultiPoint, Point};

    fn square(x0: f64, y0: f64, size: f64) -> Polygon<f64> {
        polygon![
            (x: x0, y: y0),
            (x: x0 + size, y: y0),
            (x: x0 + size, y: y0 + size),
            (x: x0, y: y0 + size),
            (x: x0, y: y0),
        ]
    }

    fn assert_near(actual: LatLng, lat: f64, lng: f64) {
        assert!(
            (actual.lat - lat).abs() < 0.05 && (actual.lng - lng).abs() < 0.05,
            "{actual:?} not near ({lat}, {lng})"
        );
    }

    #[test]
    fn test_square_centroid() {
        let c = spherical_centroid(&Geometry::Polygon(square(-5.0, -5.0, 10.0))).unwrap();
        assert_near(c, 0.0, 0.0);
    }

    #[test]
    fn test_winding_does_not_matter() {
        let mut reversed = square(20.0, 10.0, 4.0);
        reversed.exterior_mut(|ring| ring.0.reverse());
        let a = spherical_centroid(&Geometry::Polygon(square(20.0, 10.0, 4.0))).unwrap();
        let b = spherical_centroid(&Geometry::Polygon(reversed)).unwrap();
        assert_near(a, b.lat, b.lng);
        assert_near(a, 12.0, 22.0);
    }

    #[test]
    fn test_centroid_across_antimeridian() {
        let c = spherical_centroid(&Geometry::Polygon(square(175.0, 0.0, 10.0))).unwrap();
        assert!((c.lng.abs() - 180.0).abs() < 0.05);
    }

    #[test]
    fn test_line_and_point_fallbacks() {
        let line = line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0)];
        assert_near(spherical_centroid(&Geometry::LineString(line)).unwrap(), 0.0, 5.0);

        let points = MultiPoint(vec![Point::new(0.0, 10.0), Point::new(0.0, -10.0)]);
        assert_near(spherical_centroid(&Geometry::MultiPoint(points)).unwrap(), 0.0, 0.0);
    }

    #[test]
    fn test_empty_geometry_has_no_centroid() {
        let empty = Geometry::MultiPoint(MultiPoint(vec![]));
        assert_eq!(spherical_centroid(&empty), None);
    }
}
