//! # worldroute
//!
//! An interactive world map core: geographic projections, TopoJSON boundary
//! decoding, an SVG render surface, drag/zoom/click gestures and a route of
//! selected regions linked on the map.
//!
//! A [`MapSession`] owns one live map at a time, in either flat or globe
//! mode, over any [`Document`]: the in-memory [`MemoryDocument`] for tests
//! and headless rendering, or the browser DOM with the `wasm` feature.

pub mod animation;
pub mod core;
pub mod geometry;
pub mod input;
pub mod prelude;
pub mod projection;
pub mod render;
pub mod route;
pub mod ui;
#[cfg(feature = "wasm")]
pub mod web;
pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    config::{InteractionConfig, SessionConfig},
    geo::{LatLng, Point},
    map::{MapInstance, MapMode, MapView, ModeDescriptor},
    session::{MapSession, SessionState},
    settings::{MapSettings, MemoryStorage, RotationAxis, RotationSettings, SettingsStore},
};

pub use crate::geometry::{Atlas, BoundaryFeature, BoundaryLayer, GeometrySource, RegionKey, Topology};

pub use crate::input::{AxisMask, GestureController, GestureOutcome, GestureRecognizer, InputEvent, PointerInput, ZoomTransform};

pub use crate::projection::{PathGenerator, Projection, ProjectionId, ProjectionRegistry, Rotation};

pub use crate::render::{Document, MemoryDocument, NodeId, SvgSurface};

pub use crate::route::{LinkSegment, RouteEntry, RouteTracker};

pub use crate::animation::{EasingFunction, Tween};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("failed to load {url}: {reason}")]
    Load { url: String, reason: String },

    #[error("unknown projection: {0}")]
    UnknownProjection(String),

    #[error("invalid map mode: {0}")]
    InvalidMode(String),

    #[error("Topology error: {0}")]
    Topology(String),

    #[error("missing element: {0}")]
    MissingElement(String),

    #[error("DOM error: {0}")]
    Dom(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(String),
}
