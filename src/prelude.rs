//! Prelude module for common worldroute types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use worldroute::prelude::*;`

pub use crate::core::{
    config::{InteractionConfig, SessionConfig},
    geo::{LatLng, Point},
    map::{MapMode, ModeDescriptor},
    session::{MapSession, SessionState},
    settings::{MapSettings, MemoryStorage, RotationAxis, SettingsStore},
};

pub use crate::geometry::{Atlas, BoundaryFeature, BoundaryLayer, Fetch, GeometrySource, HttpFetcher, RegionKey, StaticFetcher};

#[cfg(feature = "tokio-runtime")]
pub use crate::geometry::FileFetcher;

pub use crate::input::{AxisMask, GestureOutcome, InputEvent, PointerInput, TouchEventType, TouchPoint};

pub use crate::projection::{Projection, ProjectionId, ProjectionRegistry, Rotation};

pub use crate::render::{Document, MemoryDocument, NodeId};

pub use crate::route::RouteEntry;

#[cfg(feature = "wasm")]
pub use crate::web::{install_panic_hook, LocalStorage, WebDocument};

pub use crate::{MapError, Result};

pub use std::sync::Arc;

pub use instant::{Duration, Instant};
