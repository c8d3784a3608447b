//! TopoJSON decoding into boundary features.
//!
//! Arcs are shared polylines; geometries reference them by index, with a
//! negative index `i` meaning arc `!i` traversed backwards. Quantized
//! topologies store arcs delta-encoded in integer space and carry a
//! `transform` mapping them back to longitude/latitude.

use super::{BoundaryFeature, BoundaryLayer};
use crate::{MapError, Result};
use fxhash::FxHashMap;
use geo_types::{Coord, Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Quantization transform of a topology
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Transform {
    pub scale: [f64; 2],
    pub translate: [f64; 2],
}

impl Transform {
    fn apply(&self, x: f64, y: f64) -> Coord<f64> {
        Coord {
            x: x * self.scale[0] + self.translate[0],
            y: y * self.scale[1] + self.translate[1],
        }
    }
}

/// A parsed topology document
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Topology {
    #[serde(default)]
    pub transform: Option<Transform>,
    #[serde(default)]
    pub arcs: Vec<Vec<Vec<f64>>>,
    #[serde(default)]
    pub objects: FxHashMap<String, TopoObject>,
}

/// A geometry object of a topology, possibly a collection
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TopoObject {
    /// Geometry type; `null` for features without geometry
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
    #[serde(default)]
    pub arcs: Option<Value>,
    #[serde(default)]
    pub coordinates: Option<Value>,
    #[serde(default)]
    pub geometries: Vec<TopoObject>,
}

impl Topology {
    /// Decode the named object into a boundary layer
    pub fn layer(&self, name: &str) -> Result<BoundaryLayer> {
        let object = self
            .objects
            .get(name)
            .ok_or_else(|| MapError::Topology(format!("missing object {name:?}")))?;

        let decoder = Decoder::new(self);
        let features = if object.kind.as_deref() == Some("GeometryCollection") {
            object
                .geometries
                .iter()
                .map(|o| decoder.feature(o))
                .collect::<Result<Vec<_>>>()?
        } else {
            vec![decoder.feature(object)?]
        };

        log::debug!("decoded {} features from {name:?}", features.len());
        Ok(BoundaryLayer::new(name, features))
    }

    pub fn object_names(&self) -> impl Iterator<Item = &str> {
        self.objects.keys().map(String::as_str)
    }
}

struct Decoder {
    transform: Option<Transform>,
    arcs: Vec<Vec<Coord<f64>>>,
}

impl Decoder {
    fn new(topology: &Topology) -> Self {
        let transform = topology.transform;
        let arcs = topology
            .arcs
            .iter()
            .map(|arc| decode_arc(arc, transform.as_ref()))
            .collect();
        Self { transform, arcs }
    }

    fn feature(&self, object: &TopoObject) -> Result<BoundaryFeature> {
        let id = object.id.as_ref().and_then(|id| match id {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        });
        Ok(BoundaryFeature::new(
            id,
            object.properties.clone().unwrap_or_default(),
            self.geometry(object)?,
        ))
    }

    fn geometry(&self, object: &TopoObject) -> Result<Option<Geometry<f64>>> {
        let Some(kind) = object.kind.as_deref() else {
            return Ok(None);
        };

        let geometry = match kind {
            "Point" => {
                let position: Vec<f64> = parse(&object.coordinates, "coordinates")?;
                Geometry::Point(Point(self.position(&position)?))
            }
            "MultiPoint" => {
                let positions: Vec<Vec<f64>> = parse(&object.coordinates, "coordinates")?;
                Geometry::MultiPoint(MultiPoint(
                    positions
                        .iter()
                        .map(|p| self.position(p).map(Point))
                        .collect::<Result<_>>()?,
                ))
            }
            "LineString" => {
                let arcs: Vec<i64> = parse(&object.arcs, "arcs")?;
                Geometry::LineString(self.line(&arcs)?)
            }
            "MultiLineString" => {
                let arcs: Vec<Vec<i64>> = parse(&object.arcs, "arcs")?;
                Geometry::MultiLineString(MultiLineString(
                    arcs.iter().map(|a| self.line(a)).collect::<Result<_>>()?,
                ))
            }
            "Polygon" => {
                let rings: Vec<Vec<i64>> = parse(&object.arcs, "arcs")?;
                Geometry::Polygon(self.polygon(&rings)?)
            }
            "MultiPolygon" => {
                let polygons: Vec<Vec<Vec<i64>>> = parse(&object.arcs, "arcs")?;
                Geometry::MultiPolygon(MultiPolygon(
                    polygons
                        .iter()
                        .map(|rings| self.polygon(rings))
                        .collect::<Result<_>>()?,
                ))
            }
            "GeometryCollection" => {
                let mut geometries = Vec::with_capacity(object.geometries.len());
                for child in &object.geometries {
                    if let Some(g) = self.geometry(child)? {
                        geometries.push(g);
                    }
                }
                Geometry::GeometryCollection(GeometryCollection(geometries))
            }
            other => return Err(MapError::Topology(format!("unsupported geometry type {other:?}"))),
        };
        Ok(Some(geometry))
    }

    fn position(&self, position: &[f64]) -> Result<Coord<f64>> {
        let [x, y] = match position {
            [x, y, ..] => [*x, *y],
            _ => return Err(MapError::Topology("position needs two values".into())),
        };
        Ok(match &self.transform {
            Some(t) => t.apply(x, y),
            None => Coord { x, y },
        })
    }

    fn arc(&self, index: i64, points: &mut Vec<Coord<f64>>) -> Result<()> {
        let (i, reversed) = if index < 0 { (!index, true) } else { (index, false) };
        let arc = usize::try_from(i)
            .ok()
            .and_then(|i| self.arcs.get(i))
            .ok_or_else(|| MapError::Topology(format!("arc index {index} out of range")))?;

        // Shared endpoints appear once
        points.pop();
        if reversed {
            points.extend(arc.iter().rev().copied());
        } else {
            points.extend(arc.iter().copied());
        }
        Ok(())
    }

    fn points(&self, arcs: &[i64]) -> Result<Vec<Coord<f64>>> {
        let mut points = Vec::new();
        for &index in arcs {
            self.arc(index, &mut points)?;
        }
        Ok(points)
    }

    fn line(&self, arcs: &[i64]) -> Result<LineString<f64>> {
        let mut points = self.points(arcs)?;
        pad(&mut points, 2);
        Ok(LineString(points))
    }

    fn ring(&self, arcs: &[i64]) -> Result<LineString<f64>> {
        let mut points = self.points(arcs)?;
        pad(&mut points, 4);
        Ok(LineString(points))
    }

    fn polygon(&self, rings: &[Vec<i64>]) -> Result<Polygon<f64>> {
        let mut rings = rings.iter().map(|r| self.ring(r)).collect::<Result<Vec<_>>>()?;
        if rings.is_empty() {
            return Ok(Polygon::new(LineString(vec![]), vec![]));
        }
        let exterior = rings.remove(0);
        Ok(Polygon::new(exterior, rings))
    }
}

/// Repeat the first point until the sequence has at least `min` points
fn pad(points: &mut Vec<Coord<f64>>, min: usize) {
    if let Some(&first) = points.first() {
        while points.len() < min {
            points.push(first);
        }
    }
}

fn decode_arc(arc: &[Vec<f64>], transform: Option<&Transform>) -> Vec<Coord<f64>> {
    let positions = arc.iter().filter_map(|p| match p.as_slice() {
        [x, y, ..] => Some((*x, *y)),
        _ => None,
    });
    match transform {
        Some(t) => {
            let (mut x, mut y) = (0.0, 0.0);
            positions
                .map(|(dx, dy)| {
                    x += dx;
                    y += dy;
                    t.apply(x, y)
                })
                .collect()
        }
        None => positions.map(|(x, y)| Coord { x, y }).collect(),
    }
}

fn parse<T: serde::de::DeserializeOwned>(value: &Option<Value>, field: &str) -> Result<T> {
    let value = value
        .as_ref()
        .ok_or_else(|| MapError::Topology(format!("geometry is missing {field:?}")))?;
    serde_json::from_value(value.clone()).map_err(|e| MapError::Topology(format!("invalid {field:?}: {e}")))
}
