//! Raw (unit-sphere) projection formulas.
//!
//! Every function maps radians `(lambda, phi)` to unscaled plane coordinates
//! with y pointing north. Scaling, translation and the y flip happen in
//! [`super::Projection`].

use crate::core::constants::MAX_LATITUDE;
use std::f64::consts::FRAC_PI_2;

const EPSILON: f64 = 1e-6;

/// The planar mapping behind a projection
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawProjection {
    Equirectangular,
    Mercator,
    /// Mercator on a sphere turned by 90 degrees of roll
    TransverseMercator,
    NaturalEarth1,
    Orthographic,
    Stereographic,
    Gnomonic,
    AzimuthalEqualArea,
    AzimuthalEquidistant,
    CylindricalEqualArea { cos_phi0: f64 },
    ConicEqualArea { n: f64, c: f64, r0: f64 },
    ConicConformal { n: f64, f: f64 },
    ConicEquidistant { n: f64, g: f64 },
}

impl RawProjection {
    /// Equal-area conic with standard parallels `phi0`, `phi1` (degrees)
    pub fn conic_equal_area(phi0: f64, phi1: f64) -> Self {
        let (y0, y1) = (phi0.to_radians(), phi1.to_radians());
        let sy0 = y0.sin();
        let n = (sy0 + y1.sin()) / 2.0;
        if n.abs() < EPSILON {
            return RawProjection::CylindricalEqualArea { cos_phi0: y0.cos() };
        }
        let c = 1.0 + sy0 * (2.0 * n - sy0);
        RawProjection::ConicEqualArea { n, c, r0: c.sqrt() / n }
    }

    /// Conformal conic with standard parallels `phi0`, `phi1` (degrees)
    pub fn conic_conformal(phi0: f64, phi1: f64) -> Self {
        let (y0, y1) = (phi0.to_radians(), phi1.to_radians());
        let cy0 = y0.cos();
        let n = if y0 == y1 {
            y0.sin()
        } else {
            (cy0 / y1.cos()).ln() / (tan_half(y1) / tan_half(y0)).ln()
        };
        if n.abs() < EPSILON || !n.is_finite() {
            return RawProjection::Mercator;
        }
        let f = cy0 * tan_half(y0).powf(n) / n;
        RawProjection::ConicConformal { n, f }
    }

    /// Equidistant conic with standard parallels `phi0`, `phi1` (degrees)
    pub fn conic_equidistant(phi0: f64, phi1: f64) -> Self {
        let (y0, y1) = (phi0.to_radians(), phi1.to_radians());
        let cy0 = y0.cos();
        let n = if y0 == y1 {
            y0.sin()
        } else {
            (cy0 - y1.cos()) / (y1 - y0)
        };
        if n.abs() < EPSILON {
            return RawProjection::Equirectangular;
        }
        RawProjection::ConicEquidistant { n, g: cy0 / n + y0 }
    }

    /// Whether the projection shows a single hemisphere-like disc around its center
    pub fn is_azimuthal(&self) -> bool {
        matches!(
            self,
            RawProjection::Orthographic
                | RawProjection::Stereographic
                | RawProjection::Gnomonic
                | RawProjection::AzimuthalEqualArea
                | RawProjection::AzimuthalEquidistant
        )
    }

    /// Project rotated spherical coordinates (radians)
    pub fn forward(&self, lambda: f64, phi: f64) -> Option<(f64, f64)> {
        let out = match *self {
            RawProjection::Equirectangular => (lambda, phi),
            RawProjection::Mercator => (lambda, mercator_y(phi)),
            RawProjection::TransverseMercator => (mercator_y(phi), -lambda),
            RawProjection::NaturalEarth1 => {
                let phi2 = phi * phi;
                let phi4 = phi2 * phi2;
                (
                    lambda
                        * (0.8707 - 0.131979 * phi2
                            + phi4 * (-0.013791 + phi4 * (0.003971 * phi2 - 0.001529 * phi4))),
                    phi * (1.007226
                        + phi2 * (0.015085 + phi4 * (-0.044475 + 0.028874 * phi2 - 0.005916 * phi4))),
                )
            }
            RawProjection::Orthographic => (phi.cos() * lambda.sin(), phi.sin()),
            RawProjection::Stereographic => {
                let cy = phi.cos();
                let k = 1.0 + lambda.cos() * cy;
                if k.abs() < EPSILON {
                    return None;
                }
                (cy * lambda.sin() / k, phi.sin() / k)
            }
            RawProjection::Gnomonic => {
                let cy = phi.cos();
                let k = lambda.cos() * cy;
                if k <= EPSILON {
                    return None;
                }
                (cy * lambda.sin() / k, phi.sin() / k)
            }
            RawProjection::AzimuthalEqualArea => {
                azimuthal(lambda, phi, |cxcy| (2.0 / (1.0 + cxcy)).sqrt())?
            }
            RawProjection::AzimuthalEquidistant => azimuthal(lambda, phi, |cxcy| {
                let c = cxcy.clamp(-1.0, 1.0).acos();
                if c == 0.0 {
                    0.0
                } else {
                    c / c.sin()
                }
            })?,
            RawProjection::CylindricalEqualArea { cos_phi0 } => {
                (lambda * cos_phi0, phi.sin() / cos_phi0)
            }
            RawProjection::ConicEqualArea { n, c, r0 } => {
                let r = (c - 2.0 * n * phi.sin()).max(0.0).sqrt() / n;
                let x = lambda * n;
                (r * x.sin(), r0 - r * x.cos())
            }
            RawProjection::ConicConformal { n, f } => {
                let phi = if f > 0.0 {
                    phi.max(-FRAC_PI_2 + EPSILON)
                } else {
                    phi.min(FRAC_PI_2 - EPSILON)
                };
                let r = f / tan_half(phi).powf(n);
                (r * (n * lambda).sin(), f - r * (n * lambda).cos())
            }
            RawProjection::ConicEquidistant { n, g } => {
                let gy = g - phi;
                let nx = n * lambda;
                (gy * nx.sin(), g - gy * nx.cos())
            }
        };

        if out.0.is_finite() && out.1.is_finite() {
            Some(out)
        } else {
            None
        }
    }
}

fn tan_half(phi: f64) -> f64 {
    ((FRAC_PI_2 + phi) / 2.0).tan()
}

fn mercator_y(phi: f64) -> f64 {
    let limit = MAX_LATITUDE.to_radians();
    tan_half(phi.clamp(-limit, limit)).ln()
}

fn azimuthal(lambda: f64, phi: f64, scale: impl Fn(f64) -> f64) -> Option<(f64, f64)> {
    let cx = lambda.cos();
    let cy = phi.cos();
    let k = scale(cx * cy);
    if !k.is_finite() {
        return None;
    }
    Some((k * cy * lambda.sin(), k * phi.sin()))
}

/// Angular distance (radians) of a rotated point from the projection center
pub(crate) fn angular_distance_from_center(lambda: f64, phi: f64) -> f64 {
    (phi.cos() * lambda.cos()).clamp(-1.0, 1.0).acos()
}
