//! Geographic projections: rotation, raw formulas, scaling and the registry
//! mapping projection identifiers to factories.

pub mod path;
pub mod raw;
pub mod registry;

pub use path::PathGenerator;
pub use raw::RawProjection;
pub use registry::{ProjectionFactory, ProjectionRegistry};

use crate::animation::{interpolation::linear, Interpolatable};
use crate::core::constants::{SURFACE_HEIGHT, SURFACE_WIDTH};
use crate::core::geo::{LatLng, Point};
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};
use std::fmt;
use std::str::FromStr;

/// Identifiers of the built-in projections, displayed by their menu labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProjectionId {
    #[serde(rename = "Albers")]
    Albers,
    #[serde(rename = "Azimuthal I")]
    AzimuthalEqualArea,
    #[serde(rename = "Azimuthal II")]
    AzimuthalEquidistant,
    #[serde(rename = "Conic I")]
    ConicConformal,
    #[serde(rename = "Conic II")]
    ConicEqualArea,
    #[serde(rename = "Conic III")]
    ConicEquidistant,
    #[serde(rename = "Rectangular")]
    Equirectangular,
    #[serde(rename = "Gnomonic")]
    Gnomonic,
    #[serde(rename = "Mercator I")]
    Mercator,
    #[serde(rename = "Mercator II")]
    TransverseMercator,
    #[serde(rename = "Natural Earth")]
    NaturalEarth,
    #[serde(rename = "Orthographic")]
    Orthographic,
    #[serde(rename = "Stereographic")]
    Stereographic,
}

impl ProjectionId {
    /// All identifiers in menu order
    pub const ALL: [ProjectionId; 13] = [
        ProjectionId::Albers,
        ProjectionId::AzimuthalEqualArea,
        ProjectionId::AzimuthalEquidistant,
        ProjectionId::ConicConformal,
        ProjectionId::ConicEqualArea,
        ProjectionId::ConicEquidistant,
        ProjectionId::Equirectangular,
        ProjectionId::Gnomonic,
        ProjectionId::Mercator,
        ProjectionId::TransverseMercator,
        ProjectionId::NaturalEarth,
        ProjectionId::Orthographic,
        ProjectionId::Stereographic,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ProjectionId::Albers => "Albers",
            ProjectionId::AzimuthalEqualArea => "Azimuthal I",
            ProjectionId::AzimuthalEquidistant => "Azimuthal II",
            ProjectionId::ConicConformal => "Conic I",
            ProjectionId::ConicEqualArea => "Conic II",
            ProjectionId::ConicEquidistant => "Conic III",
            ProjectionId::Equirectangular => "Rectangular",
            ProjectionId::Gnomonic => "Gnomonic",
            ProjectionId::Mercator => "Mercator I",
            ProjectionId::TransverseMercator => "Mercator II",
            ProjectionId::NaturalEarth => "Natural Earth",
            ProjectionId::Orthographic => "Orthographic",
            ProjectionId::Stereographic => "Stereographic",
        }
    }

    /// A projection configured with this identifier's conventional defaults
    pub fn default_projection(&self) -> Projection {
        let id = *self;
        match self {
            ProjectionId::Albers => Projection::new(id, RawProjection::conic_equal_area(29.5, 45.5), 1070.0)
                .with_rotation(Rotation::new(96.0, 0.0, 0.0))
                .with_center(LatLng::from_lon_lat(-0.6, 38.7)),
            ProjectionId::AzimuthalEqualArea => {
                Projection::new(id, RawProjection::AzimuthalEqualArea, 124.75).with_clip_angle(180.0 - 1e-3)
            }
            ProjectionId::AzimuthalEquidistant => {
                Projection::new(id, RawProjection::AzimuthalEquidistant, 79.4188).with_clip_angle(180.0 - 1e-3)
            }
            ProjectionId::ConicConformal => {
                Projection::new(id, RawProjection::conic_conformal(30.0, 30.0), 109.5)
            }
            ProjectionId::ConicEqualArea => Projection::new(id, RawProjection::conic_equal_area(0.0, 60.0), 155.424)
                .with_center(LatLng::from_lon_lat(0.0, 33.6442)),
            ProjectionId::ConicEquidistant => {
                Projection::new(id, RawProjection::conic_equidistant(0.0, 60.0), 131.154)
                    .with_center(LatLng::from_lon_lat(0.0, 13.9389))
            }
            ProjectionId::Equirectangular => Projection::new(id, RawProjection::Equirectangular, 152.63),
            ProjectionId::Gnomonic => Projection::new(id, RawProjection::Gnomonic, 144.049).with_clip_angle(60.0),
            ProjectionId::Mercator => Projection::new(id, RawProjection::Mercator, 961.0 / TAU),
            ProjectionId::TransverseMercator => {
                Projection::new(id, RawProjection::TransverseMercator, 159.155).with_base_roll(90.0)
            }
            ProjectionId::NaturalEarth => Projection::new(id, RawProjection::NaturalEarth1, 175.295),
            ProjectionId::Orthographic => {
                Projection::new(id, RawProjection::Orthographic, 249.5).with_clip_angle(90.0 + 1e-6)
            }
            ProjectionId::Stereographic => {
                Projection::new(id, RawProjection::Stereographic, 250.0).with_clip_angle(142.0)
            }
        }
    }
}

impl fmt::Display for ProjectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ProjectionId {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self> {
        ProjectionId::ALL
            .iter()
            .copied()
            .find(|id| id.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| MapError::UnknownProjection(s.to_string()))
    }
}

/// Three-axis rotation in degrees: longitude (lambda), latitude (phi), roll (gamma)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rotation {
    pub lambda: f64,
    pub phi: f64,
    pub gamma: f64,
}

impl Rotation {
    pub fn new(lambda: f64, phi: f64, gamma: f64) -> Self {
        Self { lambda, phi, gamma }
    }

    pub fn as_array(&self) -> [f64; 3] {
        [self.lambda, self.phi, self.gamma]
    }

    /// Rotate spherical coordinates (radians), adding `extra_gamma` degrees of roll
    fn apply(&self, lambda: f64, phi: f64, extra_gamma: f64) -> (f64, f64) {
        let lambda = wrap_pi(lambda + self.lambda.to_radians());
        let delta_phi = self.phi.to_radians();
        let delta_gamma = (self.gamma + extra_gamma).to_radians();

        if delta_phi == 0.0 && delta_gamma == 0.0 {
            return (lambda, phi);
        }

        let (sin_dp, cos_dp) = delta_phi.sin_cos();
        let (sin_dg, cos_dg) = delta_gamma.sin_cos();
        let cos_phi = phi.cos();
        let x = lambda.cos() * cos_phi;
        let y = lambda.sin() * cos_phi;
        let z = phi.sin();
        let k = z * cos_dp + x * sin_dp;

        (
            (y * cos_dg - k * sin_dg).atan2(x * cos_dp - z * sin_dp),
            (k * cos_dg + y * sin_dg).clamp(-1.0, 1.0).asin(),
        )
    }
}

impl Interpolatable for Rotation {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        Rotation::new(
            linear(self.lambda, other.lambda, t),
            linear(self.phi, other.phi, t),
            linear(self.gamma, other.gamma, t),
        )
    }
}

fn wrap_pi(lambda: f64) -> f64 {
    if (-PI..=PI).contains(&lambda) {
        lambda
    } else {
        (lambda + PI).rem_euclid(TAU) - PI
    }
}

/// A configured projection: raw formula, rotation, scale, translation and clipping.
///
/// Owned by a single map instance and mutated in place while dragging and
/// while the rotate-to-selection animation runs.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    id: ProjectionId,
    raw: RawProjection,
    scale: f64,
    translate: Point,
    rotation: Rotation,
    /// Fixed extra roll hidden from the public rotation (transverse Mercator)
    base_roll: f64,
    /// Geographic point placed at `translate`
    center: LatLng,
    /// Small-circle clip radius in degrees around the rotated center
    clip_angle: Option<f64>,
    center_offset: (f64, f64),
}

impl Projection {
    pub fn new(id: ProjectionId, raw: RawProjection, scale: f64) -> Self {
        let mut projection = Self {
            id,
            raw,
            scale,
            translate: Point::new(SURFACE_WIDTH / 2.0, SURFACE_HEIGHT / 2.0),
            rotation: Rotation::default(),
            base_roll: 0.0,
            center: LatLng::default(),
            clip_angle: None,
            center_offset: (0.0, 0.0),
        };
        projection.recenter();
        projection
    }

    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_center(mut self, center: LatLng) -> Self {
        self.center = center;
        self.recenter();
        self
    }

    pub fn with_clip_angle(mut self, degrees: f64) -> Self {
        self.clip_angle = Some(degrees);
        self
    }

    pub fn with_translate(mut self, translate: Point) -> Self {
        self.translate = translate;
        self
    }

    fn with_base_roll(mut self, degrees: f64) -> Self {
        self.base_roll = degrees;
        self
    }

    fn recenter(&mut self) {
        self.center_offset = self
            .raw
            .forward(self.center.lng.to_radians(), self.center.lat.to_radians())
            .unwrap_or((0.0, 0.0));
    }

    pub fn id(&self) -> ProjectionId {
        self.id
    }

    pub fn raw(&self) -> RawProjection {
        self.raw
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
    }

    pub fn translate(&self) -> Point {
        self.translate
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: Rotation) {
        self.rotation = rotation;
    }

    pub fn clip_angle(&self) -> Option<f64> {
        self.clip_angle
    }

    /// Rotated spherical coordinates (radians) of a geographic point
    pub fn rotate(&self, coord: LatLng) -> (f64, f64) {
        self.rotation
            .apply(coord.lng.to_radians(), coord.lat.to_radians(), self.base_roll)
    }

    /// Whether rotated coordinates fall inside the clip circle
    pub fn is_visible(&self, rotated: (f64, f64)) -> bool {
        match self.clip_angle {
            Some(angle) => raw::angular_distance_from_center(rotated.0, rotated.1) <= angle.to_radians(),
            None => true,
        }
    }

    /// Screen position of rotated coordinates, `None` when clipped
    pub fn project_rotated(&self, rotated: (f64, f64)) -> Option<Point> {
        if !self.is_visible(rotated) {
            return None;
        }
        let (x, y) = self.raw.forward(rotated.0, rotated.1)?;
        Some(Point::new(
            self.translate.x + self.scale * (x - self.center_offset.0),
            self.translate.y - self.scale * (y - self.center_offset.1),
        ))
    }

    /// Screen position of a geographic point, `None` when clipped
    pub fn project(&self, coord: LatLng) -> Option<Point> {
        self.project_rotated(self.rotate(coord))
    }
}
