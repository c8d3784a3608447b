//! Core constants shared by the projection, gesture and rendering code.
//! Keeping them in a single place makes it easier to tweak engine-wide magic numbers.

/// Default render surface width in pixels.
pub const SURFACE_WIDTH: f64 = 960.0;

/// Default render surface height in pixels.
pub const SURFACE_HEIGHT: f64 = 500.0;

/// Rotation (degrees) per pixel of drag is this value divided by the projection scale.
pub const DRAG_SENSITIVITY: f64 = 75.0;

/// Duration of the rotate-to-selection animation.
pub const CENTER_DURATION_MS: u64 = 1000;

/// Zoom scale extent.
pub const MIN_ZOOM: f64 = 1.0;
pub const MAX_ZOOM: f64 = 20.0;

/// Boundary stroke width at zoom 1; divided by the zoom factor afterwards.
pub const BASE_STROKE_WIDTH: f64 = 0.5;

/// Wheel delta to zoom exponent (one notch of 100 ≈ 13% zoom).
pub const WHEEL_SENSITIVITY: f64 = 0.002;

/// Scale factor applied by a double click.
pub const DOUBLE_CLICK_ZOOM: f64 = 2.0;

/// Latitude limit of the Mercator family; beyond it y diverges.
pub const MAX_LATITUDE: f64 = 85.0511287798;

/// Route link styling.
pub const LINK_STROKE: &str = "orange";
pub const LINK_STROKE_WIDTH: f64 = 7.0;

/// Maximum angular step (degrees) when sampling a link along its great circle.
pub const LINK_SAMPLE_STEP_DEG: f64 = 2.0;

/// Boundary fill colour.
pub const BOUNDARY_FILL: &str = "green";

/// Storage key of the persisted map settings.
pub const SETTINGS_KEY: &str = "options";
