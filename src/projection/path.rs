//! SVG path data for projected geometries.

use super::Projection;
use crate::core::constants::LINK_SAMPLE_STEP_DEG;
use crate::core::geo::{LatLng, Point};
use geo_types::{Coord, Geometry, LineString, Polygon};
use std::f64::consts::PI;
use std::fmt::Write;

/// Radius (px) of the circle drawn for point geometries
const POINT_RADIUS: f64 = 4.5;

/// Renders geometries through a projection.
///
/// Lines are broken wherever a vertex is clipped or where consecutive vertices
/// jump across the antimeridian of a non-azimuthal projection. Rings are only
/// closed with `Z` when they survive unbroken.
#[derive(Debug, Clone, Copy)]
pub struct PathGenerator<'a> {
    projection: &'a Projection,
}

impl<'a> PathGenerator<'a> {
    pub fn new(projection: &'a Projection) -> Self {
        Self { projection }
    }

    pub fn projection(&self) -> &Projection {
        self.projection
    }

    /// Path data for any geometry; empty when nothing is visible
    pub fn geometry(&self, geometry: &Geometry<f64>) -> String {
        let mut out = String::new();
        self.write_geometry(&mut out, geometry);
        out
    }

    /// Path data for a link drawn along the great circle between two points
    pub fn link(&self, from: LatLng, to: LatLng) -> String {
        let samples = from.great_circle_to(&to, LINK_SAMPLE_STEP_DEG);
        let mut out = String::new();
        for run in self.runs(samples.into_iter()) {
            write_run(&mut out, &run, false);
        }
        out
    }

    /// Screen-space polygons covering the visible parts of a geometry
    pub fn screen_polygons(&self, geometry: &Geometry<f64>) -> Vec<Polygon<f64>> {
        let mut polygons = Vec::new();
        self.collect_polygons(&mut polygons, geometry);
        polygons
    }

    fn write_geometry(&self, out: &mut String, geometry: &Geometry<f64>) {
        match geometry {
            Geometry::Point(p) => self.write_point(out, p.0),
            Geometry::MultiPoint(mp) => {
                for p in &mp.0 {
                    self.write_point(out, p.0);
                }
            }
            Geometry::Line(line) => self.write_line(out, &LineString::new(vec![line.start, line.end]), false),
            Geometry::LineString(ls) => self.write_line(out, ls, false),
            Geometry::MultiLineString(mls) => {
                for ls in &mls.0 {
                    self.write_line(out, ls, false);
                }
            }
            Geometry::Polygon(polygon) => self.write_polygon(out, polygon),
            Geometry::MultiPolygon(mp) => {
                for polygon in &mp.0 {
                    self.write_polygon(out, polygon);
                }
            }
            Geometry::GeometryCollection(gc) => {
                for g in &gc.0 {
                    self.write_geometry(out, g);
                }
            }
            Geometry::Rect(rect) => self.write_polygon(out, &rect.to_polygon()),
            Geometry::Triangle(triangle) => self.write_polygon(out, &triangle.to_polygon()),
        }
    }

    fn write_point(&self, out: &mut String, coord: Coord<f64>) {
        if let Some(p) = self.projection.project(to_lat_lng(coord)) {
            let r = POINT_RADIUS;
            let _ = write!(
                out,
                "M{},{}m0,{}a{},{} 0 1,1 0,{}a{},{} 0 1,1 0,{}z",
                fmt_num(p.x),
                fmt_num(p.y),
                fmt_num(r),
                fmt_num(r),
                fmt_num(r),
                fmt_num(-2.0 * r),
                fmt_num(r),
                fmt_num(r),
                fmt_num(2.0 * r)
            );
        }
    }

    fn write_polygon(&self, out: &mut String, polygon: &Polygon<f64>) {
        self.write_line(out, polygon.exterior(), true);
        for ring in polygon.interiors() {
            self.write_line(out, ring, true);
        }
    }

    fn write_line(&self, out: &mut String, line: &LineString<f64>, ring: bool) {
        let coords = line.0.iter().copied().map(to_lat_lng);
        let runs = self.runs(coords);
        let closed = ring && runs.len() == 1 && runs[0].len() == line.0.len();
        for run in &runs {
            write_run(out, run, closed);
        }
    }

    fn collect_polygons(&self, polygons: &mut Vec<Polygon<f64>>, geometry: &Geometry<f64>) {
        match geometry {
            Geometry::Polygon(polygon) => self.push_polygon(polygons, polygon),
            Geometry::MultiPolygon(mp) => {
                for polygon in &mp.0 {
                    self.push_polygon(polygons, polygon);
                }
            }
            Geometry::GeometryCollection(gc) => {
                for g in &gc.0 {
                    self.collect_polygons(polygons, g);
                }
            }
            Geometry::Rect(rect) => self.push_polygon(polygons, &rect.to_polygon()),
            Geometry::Triangle(triangle) => self.push_polygon(polygons, &triangle.to_polygon()),
            _ => {}
        }
    }

    fn push_polygon(&self, polygons: &mut Vec<Polygon<f64>>, polygon: &Polygon<f64>) {
        let exterior = self.runs(polygon.exterior().0.iter().copied().map(to_lat_lng));
        if exterior.len() == 1 {
            let holes = polygon
                .interiors()
                .iter()
                .filter_map(|ring| {
                    let mut runs = self.runs(ring.0.iter().copied().map(to_lat_lng));
                    match runs.len() {
                        1 if runs[0].len() >= 3 => runs.pop().map(screen_ring),
                        _ => None,
                    }
                })
                .collect();
            if let Some(run) = exterior.into_iter().next().filter(|run| run.len() >= 3) {
                polygons.push(Polygon::new(screen_ring(run), holes));
            }
        } else {
            // Broken exteriors lose their holes; each visible piece stands alone
            polygons.extend(
                exterior
                    .into_iter()
                    .filter(|run| run.len() >= 3)
                    .map(|run| Polygon::new(screen_ring(run), vec![])),
            );
        }
    }

    /// Split a coordinate sequence into continuous projected runs
    fn runs(&self, coords: impl Iterator<Item = LatLng>) -> Vec<Vec<Point>> {
        let breaks_at_antimeridian = !self.projection.raw().is_azimuthal();
        let mut runs: Vec<Vec<Point>> = Vec::new();
        let mut current: Vec<Point> = Vec::new();
        let mut previous_lambda: Option<f64> = None;

        for coord in coords {
            let rotated = self.projection.rotate(coord);
            let projected = self.projection.project_rotated(rotated);

            let jumped = matches!(previous_lambda, Some(lambda) if breaks_at_antimeridian && (rotated.0 - lambda).abs() > PI);
            if jumped || projected.is_none() {
                if !current.is_empty() {
                    runs.push(std::mem::take(&mut current));
                }
            }

            match projected {
                Some(p) => {
                    current.push(p);
                    previous_lambda = Some(rotated.0);
                }
                None => previous_lambda = None,
            }
        }
        if !current.is_empty() {
            runs.push(current);
        }
        runs
    }
}

fn to_lat_lng(coord: Coord<f64>) -> LatLng {
    LatLng::from_lon_lat(coord.x, coord.y)
}

fn screen_ring(run: Vec<Point>) -> LineString<f64> {
    LineString::from(run.into_iter().map(|p| (p.x, p.y)).collect::<Vec<_>>())
}

fn write_run(out: &mut String, run: &[Point], closed: bool) {
    let Some((first, rest)) = run.split_first() else {
        return;
    };
    let _ = write!(out, "M{},{}", fmt_num(first.x), fmt_num(first.y));
    for p in rest {
        let _ = write!(out, "L{},{}", fmt_num(p.x), fmt_num(p.y));
    }
    if closed {
        out.push('Z');
    }
}

/// Fixed three-decimal output with trailing zeros stripped
fn fmt_num(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    let text = format!("{:.3}", if rounded == 0.0 { 0.0 } else { rounded });
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::ProjectionId;
    use geo_types::{line_string, polygon, Point as GeoPoint};

    #[test]
    fn test_number_formatting() {
        assert_eq!(fmt_num(480.0), "480");
        assert_eq!(fmt_num(1.23456), "1.235");
        assert_eq!(fmt_num(-0.0001), "0");
        assert_eq!(fmt_num(-2.5), "-2.5");
    }

    #[test]
    fn test_polygon_is_closed() {
        let projection = ProjectionId::Equirectangular.default_projection();
        let path = PathGenerator::new(&projection);
        let square = polygon![
            (x: 0.0, y: 0.0),
            (x: 10.0, y: 0.0),
            (x: 10.0, y: 10.0),
            (x: 0.0, y: 10.0),
            (x: 0.0, y: 0.0),
        ];
        let d = path.geometry(&Geometry::Polygon(square));
        assert!(d.starts_with("M480,250L"));
        assert!(d.ends_with('Z'));
        assert_eq!(d.matches('M').count(), 1);
    }

    #[test]
    fn test_line_breaks_at_antimeridian() {
        let projection = ProjectionId::Equirectangular.default_projection();
        let path = PathGenerator::new(&projection);
        let crossing = line_string![(x: 170.0, y: 0.0), (x: -170.0, y: 0.0)];
        let d = path.geometry(&Geometry::LineString(crossing));
        assert_eq!(d.matches('M').count(), 2);
        assert!(!d.contains('L'));
    }

    #[test]
    fn test_clipped_ring_is_not_closed() {
        let projection = ProjectionId::Orthographic.default_projection();
        let path = PathGenerator::new(&projection);
        let wide = polygon![
            (x: 0.0, y: 0.0),
            (x: 60.0, y: 0.0),
            (x: 120.0, y: 0.0),
            (x: 120.0, y: 10.0),
            (x: 0.0, y: 10.0),
            (x: 0.0, y: 0.0),
        ];
        let d = path.geometry(&Geometry::Polygon(wide));
        assert!(!d.is_empty());
        assert!(!d.contains('Z'));
    }

    #[test]
    fn test_hidden_point_renders_nothing() {
        let projection = ProjectionId::Orthographic.default_projection();
        let path = PathGenerator::new(&projection);
        assert!(path.geometry(&Geometry::Point(GeoPoint::new(180.0, 0.0))).is_empty());
        assert!(path.geometry(&Geometry::Point(GeoPoint::new(0.0, 0.0))).starts_with("M480,250m0,4.5"));
    }

    #[test]
    fn test_link_follows_great_circle() {
        let projection = ProjectionId::Equirectangular.default_projection();
        let path = PathGenerator::new(&projection);
        let d = path.link(LatLng::new(0.0, 0.0), LatLng::new(0.0, 10.0));
        assert!(d.starts_with("M480,250"));
        assert!(d.matches('L').count() >= 5);
    }

    #[test]
    fn test_screen_polygons_cover_projected_area() {
        let projection = ProjectionId::Equirectangular.default_projection();
        let path = PathGenerator::new(&projection);
        let square = polygon![
            (x: -5.0, y: -5.0),
            (x: 5.0, y: -5.0),
            (x: 5.0, y: 5.0),
            (x: -5.0, y: 5.0),
            (x: -5.0, y: -5.0),
        ];
        let polygons = path.screen_polygons(&Geometry::Polygon(square));
        assert_eq!(polygons.len(), 1);
        assert_eq!(polygons[0].exterior().0.len(), 5);
    }
}
