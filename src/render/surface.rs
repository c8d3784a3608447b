//! The SVG surface a map instance draws into.

use super::document::{Document, NodeId};
use crate::core::constants::{BOUNDARY_FILL, LINK_STROKE, LINK_STROKE_WIDTH};
use crate::core::geo::{LatLng, Point};
use crate::geometry::{BoundaryFeature, BoundaryLayer, RegionKey};
use crate::input::zoom::ZoomTransform;
use crate::projection::PathGenerator;
use crate::{MapError, Result};
use fxhash::FxHashMap;
use geo::Contains;
use std::sync::Arc;

/// Class marking every boundary group; stroke width follows the zoom
pub const BOUNDARY_CLASS: &str = "boundary";
/// Class of groups that are drawn but not shown
pub const HIDDEN_CLASS: &str = "hidden";
/// Class added to a clicked region's path
pub const SELECTED_CLASS: &str = "selected";
/// Class of route link paths
pub const LINK_CLASS: &str = "path-link";

struct RenderedLayer {
    layer: Arc<BoundaryLayer>,
    group: NodeId,
    paths: Vec<NodeId>,
}

struct RenderedLink {
    node: NodeId,
    from: LatLng,
    to: LatLng,
}

/// An `<svg>` with one transformable `<g>` holding a group per boundary layer
/// and, on top, the route links.
///
/// Every boundary path stays bound to the feature it was drawn from so click
/// targets resolve back to geometry.
pub struct SvgSurface {
    svg: Option<NodeId>,
    group: NodeId,
    links_group: Option<NodeId>,
    width: f64,
    height: f64,
    layers: Vec<RenderedLayer>,
    bindings: FxHashMap<NodeId, (usize, usize)>,
    links: Vec<RenderedLink>,
}

impl SvgSurface {
    /// Append an `<svg>` sized `width` x `height` to the element matching `container`
    pub fn mount(doc: &mut dyn Document, container: &str, width: f64, height: f64) -> Result<Self> {
        let parent = doc
            .query(container)
            .ok_or_else(|| MapError::MissingElement(container.to_string()))?;

        let svg = doc.create_element(parent, "svg")?;
        doc.set_attribute(svg, "viewBox", &format!("0,0,{width},{height}"))?;
        doc.set_attribute(svg, "width", &width.to_string())?;
        doc.set_attribute(svg, "height", &height.to_string())?;
        let group = doc.create_element(svg, "g")?;

        log::debug!("mounted {width}x{height} surface in {container}");
        Ok(Self {
            svg: Some(svg),
            group,
            links_group: None,
            width,
            height,
            layers: Vec::new(),
            bindings: FxHashMap::default(),
            links: Vec::new(),
        })
    }

    pub fn is_mounted(&self) -> bool {
        self.svg.is_some()
    }

    pub fn svg(&self) -> Option<NodeId> {
        self.svg
    }

    /// The transformable group layer
    pub fn group(&self) -> NodeId {
        self.group
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn ensure_mounted(&self) -> Result<()> {
        if self.svg.is_none() {
            return Err(MapError::Dom("surface has been torn down".into()));
        }
        Ok(())
    }

    /// Draw one path per feature inside a new group classed `class`
    pub fn draw_layer(
        &mut self,
        doc: &mut dyn Document,
        layer: Arc<BoundaryLayer>,
        class: &str,
        path: &PathGenerator<'_>,
    ) -> Result<NodeId> {
        self.ensure_mounted()?;
        let group = doc.create_element(self.group, "g")?;
        doc.set_attribute(group, "class", class)?;

        let layer_index = self.layers.len();
        let mut paths = Vec::with_capacity(layer.features.len());
        for (feature_index, feature) in layer.features.iter().enumerate() {
            let node = doc.create_element(group, "path")?;
            if let Some(name) = feature.name() {
                doc.set_attribute(node, "name", name)?;
            }
            if let Some(id) = &feature.id {
                doc.set_attribute(node, "id", id)?;
            }
            doc.set_attribute(node, "d", &render_feature(feature, path))?;
            doc.set_style(node, "fill", BOUNDARY_FILL)?;

            self.bindings.insert(node, (layer_index, feature_index));
            paths.push(node);
        }

        log::debug!("drew {} paths for layer {:?}", paths.len(), layer.name);
        self.layers.push(RenderedLayer { layer, group, paths });

        // Links stay above every boundary layer
        if let Some(links) = self.links_group.take() {
            doc.remove(links)?;
            let existing = std::mem::take(&mut self.links);
            for link in existing {
                self.draw_link(doc, link.from, link.to, path)?;
            }
        }
        Ok(group)
    }

    /// Re-render every boundary and link through `path`
    pub fn apply_projection(&mut self, doc: &mut dyn Document, path: &PathGenerator<'_>) -> Result<()> {
        self.ensure_mounted()?;
        for rendered in &self.layers {
            for (feature, &node) in rendered.layer.features.iter().zip(&rendered.paths) {
                doc.set_attribute(node, "d", &render_feature(feature, path))?;
            }
        }
        for link in &self.links {
            doc.set_attribute(link.node, "d", &path.link(link.from, link.to))?;
        }
        Ok(())
    }

    /// Apply a zoom/pan transform to the group layer
    pub fn transform(&mut self, doc: &mut dyn Document, transform: &ZoomTransform) -> Result<()> {
        self.ensure_mounted()?;
        doc.set_attribute(self.group, "transform", &transform.to_string())
    }

    /// Set the stroke width of every boundary group
    pub fn set_boundary_stroke(&mut self, doc: &mut dyn Document, width: f64) -> Result<()> {
        self.ensure_mounted()?;
        for rendered in &self.layers {
            if doc.has_class(rendered.group, BOUNDARY_CLASS) {
                doc.set_style(rendered.group, "stroke-width", &width.to_string())?;
            }
        }
        Ok(())
    }

    /// Append a link path between two geographic points
    pub fn draw_link(
        &mut self,
        doc: &mut dyn Document,
        from: LatLng,
        to: LatLng,
        path: &PathGenerator<'_>,
    ) -> Result<NodeId> {
        self.ensure_mounted()?;
        let links = match self.links_group {
            Some(group) => group,
            None => {
                let group = doc.create_element(self.group, "g")?;
                doc.set_attribute(group, "class", "links")?;
                self.links_group = Some(group);
                group
            }
        };

        let node = doc.create_element(links, "path")?;
        doc.set_attribute(node, "class", LINK_CLASS)?;
        doc.set_attribute(node, "d", &path.link(from, to))?;
        doc.set_style(node, "fill", "none")?;
        doc.set_style(node, "stroke", LINK_STROKE)?;
        doc.set_style(node, "stroke-width", &LINK_STROKE_WIDTH.to_string())?;

        self.links.push(RenderedLink { node, from, to });
        Ok(node)
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// The feature a path element was drawn from
    pub fn feature_for(&self, node: NodeId) -> Option<&BoundaryFeature> {
        let &(layer, feature) = self.bindings.get(&node)?;
        self.layers.get(layer)?.layer.features.get(feature)
    }

    /// The first path drawn for a region
    pub fn path_for(&self, key: &RegionKey) -> Option<NodeId> {
        self.layers.iter().find_map(|rendered| {
            rendered
                .layer
                .features
                .iter()
                .position(|feature| feature.region().as_ref() == Some(key))
                .map(|index| rendered.paths[index])
        })
    }

    /// Mark a region's path as selected
    pub fn select_region(&mut self, doc: &mut dyn Document, key: &RegionKey) -> Result<Option<NodeId>> {
        self.ensure_mounted()?;
        let node = self.path_for(key);
        if let Some(node) = node {
            doc.add_class(node, SELECTED_CLASS)?;
        }
        Ok(node)
    }

    /// Path under a surface position, searching visible layers top-down
    pub fn hit_test(
        &self,
        doc: &dyn Document,
        position: Point,
        transform: &ZoomTransform,
        path: &PathGenerator<'_>,
    ) -> Option<NodeId> {
        let local = transform.invert(position);
        let target = geo::Point::new(local.x, local.y);

        self.layers
            .iter()
            .rev()
            .filter(|rendered| !doc.has_class(rendered.group, HIDDEN_CLASS))
            .find_map(|rendered| {
                rendered
                    .layer
                    .features
                    .iter()
                    .zip(&rendered.paths)
                    .rev()
                    .find(|(feature, _)| {
                        feature.geometry.as_ref().is_some_and(|geometry| {
                            path.screen_polygons(geometry)
                                .iter()
                                .any(|polygon| polygon.contains(&target))
                        })
                    })
                    .map(|(_, &node)| node)
            })
    }

    /// Remove the surface and everything in it; repeated calls are no-ops
    pub fn teardown(&mut self, doc: &mut dyn Document) -> Result<()> {
        if let Some(svg) = self.svg.take() {
            if doc.contains(svg) {
                doc.remove(svg)?;
            }
            log::debug!("surface torn down");
        }
        self.layers.clear();
        self.bindings.clear();
        self.links.clear();
        self.links_group = None;
        Ok(())
    }
}

fn render_feature(feature: &BoundaryFeature, path: &PathGenerator<'_>) -> String {
    feature
        .geometry
        .as_ref()
        .map(|geometry| path.geometry(geometry))
        .unwrap_or_default()
}
