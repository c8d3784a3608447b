//! Configuration for a map session and its interaction behaviour
//!
//! Plain structs with `Default` impls; the defaults reproduce the stock
//! 960x500 world map with a one second rotate-to-selection animation.

use crate::animation::EasingFunction;
use crate::core::constants::*;
use instant::Duration;

/// Tuning of the gesture controller
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionConfig {
    /// Drag rotation factor, divided by the projection scale
    pub drag_sensitivity: f64,
    /// Duration of the rotate-to-selection animation
    pub center_duration_ms: u64,
    /// Easing applied to the rotate-to-selection animation
    pub center_easing: EasingFunction,
    /// Boundary stroke width at zoom 1
    pub base_stroke_width: f64,
    /// Allowed zoom factor range
    pub scale_extent: (f64, f64),
    /// Wheel delta to zoom exponent
    pub wheel_sensitivity: f64,
    /// Scale factor applied by a double click
    pub double_click_zoom: f64,
    /// Pointer travel (px) before a press becomes a drag instead of a click
    pub click_distance: f64,
}

impl InteractionConfig {
    pub fn center_duration(&self) -> Duration {
        Duration::from_millis(self.center_duration_ms)
    }
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            drag_sensitivity: DRAG_SENSITIVITY,
            center_duration_ms: CENTER_DURATION_MS,
            center_easing: EasingFunction::EaseOutCubic,
            base_stroke_width: BASE_STROKE_WIDTH,
            scale_extent: (MIN_ZOOM, MAX_ZOOM),
            wheel_sensitivity: WHEEL_SENSITIVITY,
            double_click_zoom: DOUBLE_CLICK_ZOOM,
            click_distance: 3.0,
        }
    }
}

/// Where a session mounts itself in the host document and what it loads
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub width: f64,
    pub height: f64,
    /// Selector of the element the SVG surface is appended to
    pub container: String,
    /// Selector of the ordered list mirroring the route
    pub route_list: String,
    /// Selector of the projection `<select>`
    pub projection_dropdown: String,
    /// Selector of the collapsible settings panel
    pub settings_panel: String,
    /// Storage key of the persisted settings
    pub settings_key: String,
    /// Topology document loaded at startup
    pub geometry_url: String,
    pub interaction: InteractionConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            width: SURFACE_WIDTH,
            height: SURFACE_HEIGHT,
            container: "#map-container".to_string(),
            route_list: "#route-selected-container > ol".to_string(),
            projection_dropdown: "#settings-dropdown".to_string(),
            settings_panel: "#settings-container".to_string(),
            settings_key: SETTINGS_KEY.to_string(),
            geometry_url: "combined.json".to_string(),
            interaction: InteractionConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interaction_defaults() {
        let config = InteractionConfig::default();
        assert_eq!(config.drag_sensitivity, 75.0);
        assert_eq!(config.center_duration(), Duration::from_millis(1000));
        assert_eq!(config.scale_extent, (1.0, 20.0));
        assert_eq!(config.center_easing, EasingFunction::EaseOutCubic);
    }

    #[test]
    fn test_session_defaults() {
        let config = SessionConfig::default();
        assert_eq!((config.width, config.height), (960.0, 500.0));
        assert_eq!(config.container, "#map-container");
        assert_eq!(config.settings_key, "options");
    }
}
