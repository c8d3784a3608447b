//! Boundary features decoded from topology documents, and where they come from.

pub mod centroid;
pub mod source;
pub mod topology;

pub use centroid::spherical_centroid;
pub use source::{Fetch, GeometrySource, HttpFetcher, StaticFetcher};
#[cfg(feature = "tokio-runtime")]
pub use source::FileFetcher;
pub use topology::Topology;

use crate::core::geo::LatLng;
use crate::{MapError, Result};
use geo_types::Geometry;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Name of the topology object holding country boundaries
pub const COUNTRIES: &str = "countries";
/// Name of the topology object holding state boundaries
pub const STATES: &str = "states";

/// A single immutable boundary: geometry plus properties and an optional id
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryFeature {
    pub id: Option<String>,
    pub properties: Map<String, Value>,
    pub geometry: Option<Geometry<f64>>,
}

impl BoundaryFeature {
    pub fn new(id: Option<String>, properties: Map<String, Value>, geometry: Option<Geometry<f64>>) -> Self {
        Self {
            id: id.filter(|id| !id.is_empty()),
            properties,
            geometry,
        }
    }

    /// The `name` property, when it is a non-empty string
    pub fn name(&self) -> Option<&str> {
        self.properties
            .get("name")
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
    }

    /// What a click on this feature selects: countries by id, states by name
    pub fn region(&self) -> Option<RegionKey> {
        if let Some(id) = &self.id {
            return Some(RegionKey::Country(id.clone()));
        }
        self.name().map(|name| RegionKey::State(name.to_string()))
    }

    pub fn centroid(&self) -> Option<LatLng> {
        self.geometry.as_ref().and_then(spherical_centroid)
    }
}

/// Identifier of a selectable region
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RegionKey {
    Country(String),
    State(String),
}

impl RegionKey {
    /// Identifier recorded in the route
    pub fn as_str(&self) -> &str {
        match self {
            RegionKey::Country(id) | RegionKey::State(id) => id,
        }
    }
}

/// A named collection of boundary features
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryLayer {
    pub name: String,
    pub features: Vec<BoundaryFeature>,
}

impl BoundaryLayer {
    pub fn new(name: impl Into<String>, features: Vec<BoundaryFeature>) -> Self {
        Self {
            name: name.into(),
            features,
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// First feature whose region key matches
    pub fn find(&self, key: &RegionKey) -> Option<&BoundaryFeature> {
        self.features
            .iter()
            .find(|feature| feature.region().as_ref() == Some(key))
    }
}

/// The decoded geometry used by a session: countries and states
#[derive(Debug, Clone, PartialEq)]
pub struct Atlas {
    pub countries: Arc<BoundaryLayer>,
    pub states: Arc<BoundaryLayer>,
}

impl Atlas {
    /// Decode both required layers from a topology
    pub fn from_topology(topology: &Topology) -> Result<Self> {
        Ok(Self {
            countries: Arc::new(topology.layer(COUNTRIES)?),
            states: Arc::new(topology.layer(STATES)?),
        })
    }

    /// Parse and decode a topology JSON document
    pub fn from_json(text: &str) -> Result<Self> {
        let topology: Topology = serde_json::from_str(text)?;
        Self::from_topology(&topology)
    }

    /// Look a region up across both layers by its route identifier
    pub fn find_region(&self, id: &str) -> Option<&BoundaryFeature> {
        self.countries
            .find(&RegionKey::Country(id.to_string()))
            .or_else(|| self.states.find(&RegionKey::State(id.to_string())))
    }

    pub fn layer(&self, name: &str) -> Result<&Arc<BoundaryLayer>> {
        match name {
            COUNTRIES => Ok(&self.countries),
            STATES => Ok(&self.states),
            other => Err(MapError::Topology(format!("no layer named {other}"))),
        }
    }
}
