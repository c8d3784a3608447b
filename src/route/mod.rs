//! The ordered route of selected regions and its on-page list.

use crate::core::geo::LatLng;
use crate::render::{Document, NodeId};
use crate::Result;
use serde::Serialize;

/// One selected region
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteEntry {
    pub index: usize,
    pub region_id: String,
    /// Geographic center, serialized as `[lon, lat]`
    #[serde(serialize_with = "lon_lat")]
    pub center: LatLng,
}

fn lon_lat<S: serde::Serializer>(center: &LatLng, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    [center.lng, center.lat].serialize(serializer)
}

/// A link to draw between two consecutive entries
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkSegment {
    pub from: LatLng,
    pub to: LatLng,
    pub from_index: usize,
    pub to_index: usize,
}

/// Append-only route with contiguous indices starting at 0, mirrored into an
/// ordered list on the page when one is present
#[derive(Debug, Clone, Default)]
pub struct RouteTracker {
    entries: Vec<RouteEntry>,
    list: Option<NodeId>,
}

impl RouteTracker {
    /// A tracker with no on-page list
    pub fn new() -> Self {
        Self::default()
    }

    /// A tracker mirroring entries into the list matching `selector`
    pub fn attach(doc: &dyn Document, selector: &str) -> Self {
        let list = doc.query(selector);
        if list.is_none() {
            log::warn!("route list {selector} not found; route will not be shown");
        }
        Self {
            entries: Vec::new(),
            list,
        }
    }

    /// Append a region; from the second entry on, also returns the link to draw
    pub fn append(
        &mut self,
        doc: &mut dyn Document,
        region_id: &str,
        center: LatLng,
    ) -> Result<(RouteEntry, Option<LinkSegment>)> {
        let previous = self.entries.last();
        let index = previous.map_or(0, |last| last.index + 1);
        let link = previous.map(|last| LinkSegment {
            from: last.center,
            to: center,
            from_index: last.index,
            to_index: index,
        });

        let entry = RouteEntry {
            index,
            region_id: region_id.to_string(),
            center,
        };
        self.mirror(doc, &entry)?;
        self.entries.push(entry.clone());
        Ok((entry, link))
    }

    fn mirror(&self, doc: &mut dyn Document, entry: &RouteEntry) -> Result<()> {
        let Some(list) = self.list.filter(|&list| doc.contains(list)) else {
            return Ok(());
        };
        let item = doc.create_element(list, "li")?;
        doc.set_attribute(item, "class", "route-selected")?;
        let swatch = doc.create_element(item, "div")?;
        doc.set_attribute(swatch, "class", "route-selected-color")?;
        let code = doc.create_element(item, "span")?;
        doc.set_attribute(code, "class", "route-selected-code")?;
        doc.set_text(code, &entry.region_id)?;
        Ok(())
    }

    /// Forget every entry and empty the on-page list
    pub fn reset(&mut self, doc: &mut dyn Document) -> Result<()> {
        self.entries.clear();
        if let Some(list) = self.list.filter(|&list| doc.contains(list)) {
            doc.clear_children(list)?;
        }
        Ok(())
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
