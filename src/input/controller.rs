//! Drag, zoom and click handling against a map view.

use super::events::InputEvent;
use super::zoom::{ZoomBehavior, ZoomTransform};
use crate::animation::Tween;
use crate::core::config::InteractionConfig;
use crate::core::geo::{LatLng, Point};
use crate::core::map::MapView;
use crate::geometry::RegionKey;
use crate::projection::{PathGenerator, Rotation};
use crate::render::surface::SELECTED_CLASS;
use crate::render::{Document, NodeId};
use crate::route::{RouteEntry, RouteTracker};
use crate::Result;
use instant::Instant;
use serde::{Deserialize, Serialize};

/// Which rotation axes a drag may change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisMask {
    pub x: bool,
    pub y: bool,
}

impl AxisMask {
    pub const LONGITUDE: AxisMask = AxisMask { x: true, y: false };
    pub const BOTH: AxisMask = AxisMask { x: true, y: true };

    fn factor(enabled: bool) -> f64 {
        if enabled {
            1.0
        } else {
            0.0
        }
    }
}

/// What handling an event did
#[derive(Debug, Clone, PartialEq)]
pub enum GestureOutcome {
    /// Nothing to do: drag bookkeeping, or a click that resolved to no region
    Ignored,
    Rotated,
    /// The zoom transform changed; carries the new scale factor
    Zoomed(f64),
    /// A region was selected and appended to the route
    Selected(RouteEntry),
}

/// Interprets input events against the projection and surface of one map
/// instance.
///
/// At most one rotate-to-selection tween exists at a time; a new selection
/// replaces it, starting from whatever rotation the previous one reached.
pub struct GestureController {
    mask: AxisMask,
    zoom: ZoomBehavior,
    tween: Option<Tween<Rotation>>,
    config: InteractionConfig,
}

impl GestureController {
    pub fn new(mask: AxisMask, width: f64, height: f64, config: InteractionConfig) -> Self {
        Self {
            mask,
            zoom: ZoomBehavior::new(width, height, &config),
            tween: None,
            config,
        }
    }

    pub fn mask(&self) -> AxisMask {
        self.mask
    }

    pub fn set_mask(&mut self, mask: AxisMask) {
        self.mask = mask;
    }

    pub fn zoom_transform(&self) -> ZoomTransform {
        self.zoom.transform()
    }

    pub fn is_animating(&self) -> bool {
        self.tween.is_some()
    }

    pub fn handle(
        &mut self,
        event: &InputEvent,
        view: &mut MapView,
        route: &mut RouteTracker,
        doc: &mut dyn Document,
        now: Instant,
    ) -> Result<GestureOutcome> {
        match event {
            InputEvent::Drag { delta } => self.drag(*delta, view, doc),
            InputEvent::DragStart { .. } | InputEvent::DragEnd => Ok(GestureOutcome::Ignored),
            InputEvent::Wheel { delta_y, position } => {
                let transform = self.zoom.wheel(*delta_y, *position);
                self.after_zoom(transform, view, doc)
            }
            InputEvent::DoubleClick { position } => {
                let transform = self.zoom.double_click(*position);
                self.after_zoom(transform, view, doc)
            }
            InputEvent::Pinch { scale, center } => {
                let transform = self.zoom.scale_by(*scale, *center);
                self.after_zoom(transform, view, doc)
            }
            InputEvent::Click { position, target } => self.click(*position, *target, view, route, doc, now),
        }
    }

    /// Rotate by a drag delta; disabled axes are reset to zero and roll always is
    fn drag(&mut self, delta: Point, view: &mut MapView, doc: &mut dyn Document) -> Result<GestureOutcome> {
        let rotation = view.projection.rotation();
        let k = self.config.drag_sensitivity / view.projection.scale();
        let next = Rotation::new(
            AxisMask::factor(self.mask.x) * (rotation.lambda + delta.x * k),
            AxisMask::factor(self.mask.y) * (rotation.phi + delta.y * k),
            0.0,
        );
        log::debug!("drag {:?} -> rotation {:?}", delta, next.as_array());

        view.projection.set_rotation(next);
        view.render(doc)?;
        Ok(GestureOutcome::Rotated)
    }

    /// Shared post-processing of every zoom change
    fn after_zoom(&mut self, transform: ZoomTransform, view: &mut MapView, doc: &mut dyn Document) -> Result<GestureOutcome> {
        view.surface.transform(doc, &transform)?;
        view.surface
            .set_boundary_stroke(doc, self.config.base_stroke_width / transform.k)?;
        Ok(GestureOutcome::Zoomed(transform.k))
    }

    fn click(
        &mut self,
        position: Point,
        target: Option<NodeId>,
        view: &mut MapView,
        route: &mut RouteTracker,
        doc: &mut dyn Document,
        now: Instant,
    ) -> Result<GestureOutcome> {
        let node = target
            .filter(|&node| view.surface.feature_for(node).is_some())
            .or_else(|| {
                let path = PathGenerator::new(&view.projection);
                view.surface
                    .hit_test(doc, position, &self.zoom.transform(), &path)
            });
        let Some(node) = node else {
            return Ok(GestureOutcome::Ignored);
        };

        let Some((key, center)) = view
            .surface
            .feature_for(node)
            .and_then(|feature| Some((feature.region()?, feature.centroid()?)))
        else {
            log::debug!("click on node {} without a selectable region", node.0);
            return Ok(GestureOutcome::Ignored);
        };

        doc.add_class(node, SELECTED_CLASS)?;
        self.select(key, center, view, route, doc, now)
    }

    /// Start centering `center`, then record the region in the route
    pub fn select(
        &mut self,
        key: RegionKey,
        center: LatLng,
        view: &mut MapView,
        route: &mut RouteTracker,
        doc: &mut dyn Document,
        now: Instant,
    ) -> Result<GestureOutcome> {
        let target = Rotation::new(
            -center.lng * AxisMask::factor(self.mask.x),
            -center.lat * AxisMask::factor(self.mask.y),
            0.0,
        );
        if self.tween.is_some() {
            log::debug!("replacing running rotation tween");
        }
        self.tween = Some(Tween::new(
            view.projection.rotation(),
            target,
            self.config.center_duration(),
            self.config.center_easing,
            now,
        ));

        let (entry, link) = route.append(doc, key.as_str(), center)?;
        if let Some(link) = link {
            let path = PathGenerator::new(&view.projection);
            view.surface.draw_link(doc, link.from, link.to, &path)?;
        }
        log::info!("selected {} at ({:.3}, {:.3})", entry.region_id, center.lng, center.lat);
        Ok(GestureOutcome::Selected(entry))
    }

    /// Advance the rotation tween to `now`; returns whether it is still running
    pub fn tick(&mut self, now: Instant, view: &mut MapView, doc: &mut dyn Document) -> Result<bool> {
        let Some(tween) = &self.tween else {
            return Ok(false);
        };

        view.projection.set_rotation(tween.value_at(now));
        let finished = tween.is_finished(now);
        if finished {
            self.tween = None;
        }
        view.render(doc)?;
        Ok(!finished)
    }

    /// Drop any running tween without touching the projection
    pub fn cancel_animation(&mut self) {
        self.tween = None;
    }
}
