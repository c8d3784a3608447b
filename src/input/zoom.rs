//! Zoom and pan transform of the map's group layer.

use crate::core::config::InteractionConfig;
use crate::core::geo::Point;
use std::fmt;

/// A uniform scale `k` followed by a translation `(x, y)`: screen = local * k + t
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomTransform {
    pub x: f64,
    pub y: f64,
    pub k: f64,
}

impl Default for ZoomTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl ZoomTransform {
    pub fn new(x: f64, y: f64, k: f64) -> Self {
        Self { x, y, k }
    }

    pub fn identity() -> Self {
        Self::new(0.0, 0.0, 1.0)
    }

    pub fn apply(&self, p: Point) -> Point {
        Point::new(p.x * self.k + self.x, p.y * self.k + self.y)
    }

    pub fn invert(&self, p: Point) -> Point {
        Point::new((p.x - self.x) / self.k, (p.y - self.y) / self.k)
    }

    /// Shift by `(dx, dy)` in local units
    fn translate(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + self.k * dx, self.y + self.k * dy, self.k)
    }
}

impl fmt::Display for ZoomTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "translate({},{}) scale({})", self.x, self.y, self.k)
    }
}

/// Pointer-anchored zooming with a clamped scale and a translation that never
/// exposes anything outside the surface.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoomBehavior {
    transform: ZoomTransform,
    scale_extent: (f64, f64),
    /// Surface bounds, also the translate extent
    width: f64,
    height: f64,
    wheel_sensitivity: f64,
    double_click_factor: f64,
}

impl ZoomBehavior {
    pub fn new(width: f64, height: f64, config: &InteractionConfig) -> Self {
        Self {
            transform: ZoomTransform::identity(),
            scale_extent: config.scale_extent,
            width,
            height,
            wheel_sensitivity: config.wheel_sensitivity,
            double_click_factor: config.double_click_zoom,
        }
    }

    pub fn transform(&self) -> ZoomTransform {
        self.transform
    }

    pub fn scale(&self) -> f64 {
        self.transform.k
    }

    pub fn reset(&mut self) {
        self.transform = ZoomTransform::identity();
    }

    /// Zoom for a wheel event; scrolling down zooms out
    pub fn wheel(&mut self, delta_y: f64, position: Point) -> ZoomTransform {
        let factor = 2f64.powf(-delta_y * self.wheel_sensitivity);
        self.scale_by(factor, position)
    }

    /// Zoom in by the double-click factor around `position`
    pub fn double_click(&mut self, position: Point) -> ZoomTransform {
        self.scale_by(self.double_click_factor, position)
    }

    /// Multiply the scale by `factor`, keeping `position` fixed on screen
    pub fn scale_by(&mut self, factor: f64, position: Point) -> ZoomTransform {
        self.scale_to(self.transform.k * factor, position)
    }

    /// Set the scale to `k`, keeping `position` fixed on screen
    pub fn scale_to(&mut self, k: f64, position: Point) -> ZoomTransform {
        let k = k.clamp(self.scale_extent.0, self.scale_extent.1);
        if k == 1.0 {
            // At unit scale the only in-bounds transform is the identity
            self.transform = ZoomTransform::identity();
            return self.transform;
        }
        let anchor = self.transform.invert(position);
        let scaled = ZoomTransform::new(position.x - anchor.x * k, position.y - anchor.y * k, k);
        self.transform = self.constrain(scaled);
        self.transform
    }

    /// Pull a transform back so the viewport stays inside the surface
    pub fn constrain(&self, transform: ZoomTransform) -> ZoomTransform {
        let dx0 = -transform.x / transform.k;
        let dx1 = (self.width - transform.x) / transform.k - self.width;
        let dy0 = -transform.y / transform.k;
        let dy1 = (self.height - transform.y) / transform.k - self.height;

        transform.translate(shift(dx0, dx1), shift(dy0, dy1))
    }
}

fn shift(d0: f64, d1: f64) -> f64 {
    if d1 > d0 {
        (d0 + d1) / 2.0
    } else {
        let low = d0.min(0.0);
        if low != 0.0 {
            low
        } else {
            d1.max(0.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn behavior() -> ZoomBehavior {
        ZoomBehavior::new(960.0, 500.0, &InteractionConfig::default())
    }

    fn assert_in_bounds(t: ZoomTransform) {
        assert!(t.k >= 1.0 && t.k <= 20.0);
        // The surface corners map outside or onto the viewport corners
        let top_left = t.apply(Point::new(0.0, 0.0));
        let bottom_right = t.apply(Point::new(960.0, 500.0));
        assert!(top_left.x <= 1e-9 && top_left.y <= 1e-9, "{t:?}");
        assert!(bottom_right.x >= 960.0 - 1e-9 && bottom_right.y >= 500.0 - 1e-9, "{t:?}");
    }

    #[test]
    fn test_wheel_zooms_around_pointer() {
        let mut zoom = behavior();
        let pointer = Point::new(480.0, 250.0);
        let t = zoom.wheel(-500.0, pointer);

        assert!((t.k - 2.0).abs() < 1e-9);
        let fixed = t.apply(Point::new(480.0, 250.0));
        assert!((fixed.x - 480.0).abs() < 1e-9 && (fixed.y - 250.0).abs() < 1e-9);
    }

    #[test]
    fn test_scale_is_clamped() {
        let mut zoom = behavior();
        assert_eq!(zoom.scale_by(0.1, Point::new(10.0, 10.0)).k, 1.0);
        assert_eq!(zoom.scale_by(1000.0, Point::new(10.0, 10.0)).k, 20.0);
    }

    #[test]
    fn test_translation_stays_in_extent() {
        let mut zoom = behavior();
        for (factor, x, y) in [(2.0, 0.0, 0.0), (3.0, 960.0, 500.0), (0.5, 100.0, 400.0), (20.0, 700.0, 20.0)] {
            assert_in_bounds(zoom.scale_by(factor, Point::new(x, y)));
        }
        // Zooming out to 1 always snaps back to identity
        assert_eq!(zoom.scale_to(1.0, Point::new(300.0, 300.0)), ZoomTransform::identity());
    }

    #[test]
    fn test_wheel_out_to_unit_scale_is_exact_identity() {
        let mut zoom = behavior();
        zoom.wheel(-700.0, Point::new(123.4, 77.7));
        zoom.wheel(-300.0, Point::new(901.3, 433.1));
        let t = zoom.wheel(5000.0, Point::new(517.9, 12.6));
        assert_eq!(t, ZoomTransform::identity());
        assert_eq!(t.to_string(), "translate(0,0) scale(1)");
    }

    #[test]
    fn test_double_click_doubles_scale() {
        let mut zoom = behavior();
        assert_eq!(zoom.double_click(Point::new(0.0, 0.0)), ZoomTransform::new(0.0, 0.0, 2.0));
    }

    #[test]
    fn test_transform_display_and_invert() {
        let t = ZoomTransform::new(-10.0, 5.5, 2.0);
        assert_eq!(t.to_string(), "translate(-10,5.5) scale(2)");
        let p = Point::new(3.0, 4.0);
        assert_eq!(t.invert(t.apply(p)), p);
    }
}
