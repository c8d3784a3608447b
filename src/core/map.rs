//! A single map instance: projection, SVG surface, gesture wiring and route.

use crate::core::config::SessionConfig;
use crate::core::geo::Point;
use crate::core::settings::MapSettings;
use crate::geometry::{Atlas, BoundaryLayer, RegionKey};
use crate::input::{AxisMask, GestureController, GestureOutcome, InputEvent};
use crate::projection::{PathGenerator, Projection, ProjectionId, ProjectionRegistry};
use crate::render::surface::BOUNDARY_CLASS;
use crate::render::{Document, NodeId, SvgSurface};
use crate::route::RouteTracker;
use crate::{MapError, Result};
use instant::Instant;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Group classes of the two boundary layers
const COUNTRY_LAYER_CLASS: &str = BOUNDARY_CLASS;
const STATE_LAYER_CLASS: &str = "boundary state hidden";

/// Flat maps rotate around the pole only; the globe rotates freely
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapMode {
    Flat,
    Globe,
}

impl fmt::Display for MapMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapMode::Flat => f.write_str("flat"),
            MapMode::Globe => f.write_str("globe"),
        }
    }
}

impl FromStr for MapMode {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flat" | "2d" => Ok(MapMode::Flat),
            "globe" | "3d" => Ok(MapMode::Globe),
            other => Err(MapError::InvalidMode(other.to_string())),
        }
    }
}

/// Everything that differs between modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeDescriptor {
    pub mode: MapMode,
    pub projection: ProjectionId,
    pub mask: AxisMask,
}

impl ModeDescriptor {
    /// The flat map uses the chosen projection and rotation axes
    pub fn flat(settings: &MapSettings) -> Self {
        Self {
            mode: MapMode::Flat,
            projection: settings.current_projection,
            mask: settings.rotation.mask(),
        }
    }

    pub fn globe() -> Self {
        Self {
            mode: MapMode::Globe,
            projection: ProjectionId::Orthographic,
            mask: AxisMask::BOTH,
        }
    }

    pub fn for_mode(mode: MapMode, settings: &MapSettings) -> Self {
        match mode {
            MapMode::Flat => Self::flat(settings),
            MapMode::Globe => Self::globe(),
        }
    }
}

/// The projection and the surface rendered through it
pub struct MapView {
    pub projection: Projection,
    pub surface: SvgSurface,
}

impl MapView {
    pub fn new(projection: Projection, surface: SvgSurface) -> Self {
        Self { projection, surface }
    }

    pub fn draw_layer(&mut self, doc: &mut dyn Document, layer: Arc<BoundaryLayer>, class: &str) -> Result<NodeId> {
        let path = PathGenerator::new(&self.projection);
        self.surface.draw_layer(doc, layer, class, &path)
    }

    /// Re-render every path through the current projection
    pub fn render(&mut self, doc: &mut dyn Document) -> Result<()> {
        let path = PathGenerator::new(&self.projection);
        self.surface.apply_projection(doc, &path)
    }
}

/// One live map: built for a mode, torn down when the session switches
pub struct MapInstance {
    descriptor: ModeDescriptor,
    pub view: MapView,
    pub controller: GestureController,
    pub route: RouteTracker,
}

impl MapInstance {
    /// Mount a surface, draw countries and (hidden) states, and wire the controller
    pub fn build(
        doc: &mut dyn Document,
        atlas: &Atlas,
        registry: &ProjectionRegistry,
        descriptor: ModeDescriptor,
        config: &SessionConfig,
    ) -> Result<Self> {
        let projection = registry
            .create(descriptor.projection)?
            .with_translate(Point::new(config.width / 2.0, config.height / 2.0));
        let surface = SvgSurface::mount(doc, &config.container, config.width, config.height)?;

        let mut view = MapView::new(projection, surface);
        view.draw_layer(doc, atlas.countries.clone(), COUNTRY_LAYER_CLASS)?;
        view.draw_layer(doc, atlas.states.clone(), STATE_LAYER_CLASS)?;

        let controller = GestureController::new(descriptor.mask, config.width, config.height, config.interaction.clone());
        let route = RouteTracker::attach(doc, &config.route_list);

        log::info!("built {} map with {}", descriptor.mode, descriptor.projection);
        Ok(Self {
            descriptor,
            view,
            controller,
            route,
        })
    }

    pub fn mode(&self) -> MapMode {
        self.descriptor.mode
    }

    pub fn descriptor(&self) -> ModeDescriptor {
        self.descriptor
    }

    pub fn handle(&mut self, event: &InputEvent, doc: &mut dyn Document, now: Instant) -> Result<GestureOutcome> {
        self.controller
            .handle(event, &mut self.view, &mut self.route, doc, now)
    }

    pub fn tick(&mut self, now: Instant, doc: &mut dyn Document) -> Result<bool> {
        self.controller.tick(now, &mut self.view, doc)
    }

    /// Select a region by route identifier as if its path had been clicked
    pub fn select_region(&mut self, doc: &mut dyn Document, id: &str, now: Instant) -> Result<GestureOutcome> {
        let selection = [RegionKey::Country(id.to_string()), RegionKey::State(id.to_string())]
            .into_iter()
            .find_map(|key| {
                let node = self.view.surface.path_for(&key)?;
                let center = self.view.surface.feature_for(node)?.centroid()?;
                Some((key, center))
            });
        let Some((key, center)) = selection else {
            log::debug!("no selectable region {id:?}");
            return Ok(GestureOutcome::Ignored);
        };

        self.view.surface.select_region(doc, &key)?;
        self.controller
            .select(key, center, &mut self.view, &mut self.route, doc, now)
    }

    /// Swap the projection in place, keeping surface, zoom and route
    pub fn set_projection(&mut self, doc: &mut dyn Document, projection: Projection) -> Result<()> {
        let translate = self.view.projection.translate();
        self.controller.cancel_animation();
        self.descriptor.projection = projection.id();
        self.view.projection = projection.with_translate(translate);
        self.view.render(doc)
    }

    pub fn set_mask(&mut self, mask: AxisMask) {
        self.descriptor.mask = mask;
        self.controller.set_mask(mask);
    }

    pub fn zoom_level(&self) -> f64 {
        self.controller.zoom_transform().k
    }

    pub fn teardown(&mut self, doc: &mut dyn Document) -> Result<()> {
        self.controller.cancel_animation();
        self.view.surface.teardown(doc)
    }
}
