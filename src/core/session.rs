//! The map session: owns the single live map, the settings and the zoom level.

use crate::core::config::SessionConfig;
use crate::core::map::{MapInstance, MapMode, ModeDescriptor};
use crate::core::settings::{MapSettings, RotationAxis, SettingsStore};
use crate::geometry::Atlas;
use crate::input::{GestureConfig, GestureOutcome, GestureRecognizer, InputEvent, PointerInput};
use crate::projection::{ProjectionId, ProjectionRegistry};
use crate::render::Document;
use crate::route::RouteEntry;
use crate::ui::controls;
use crate::{MapError, Result};
use instant::Instant;
use std::sync::Arc;

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NoMap,
    FlatActive,
    GlobeActive,
}

/// Owns the document, the decoded geometry and at most one map instance.
///
/// Switching modes tears the current instance down before the next one is
/// built, so a document never holds two surfaces.
pub struct MapSession<D: Document> {
    doc: D,
    atlas: Arc<Atlas>,
    registry: ProjectionRegistry,
    settings: MapSettings,
    storage: Option<Box<dyn SettingsStore>>,
    config: SessionConfig,
    active: Option<MapInstance>,
    zoom_level: f64,
    recognizer: GestureRecognizer,
}

impl<D: Document> MapSession<D> {
    pub fn new(doc: D, atlas: Arc<Atlas>, config: SessionConfig) -> Self {
        let recognizer = GestureRecognizer::with_config(GestureConfig {
            drag_threshold: config.interaction.click_distance,
            ..GestureConfig::default()
        });
        Self {
            doc,
            atlas,
            registry: ProjectionRegistry::with_defaults(),
            settings: MapSettings::default(),
            storage: None,
            config,
            active: None,
            zoom_level: 1.0,
            recognizer,
        }
    }

    /// Persist settings in `storage`, starting from whatever it already holds
    pub fn with_storage(mut self, storage: Box<dyn SettingsStore>) -> Self {
        self.settings = MapSettings::load(storage.as_ref(), &self.config.settings_key);
        self.storage = Some(storage);
        self
    }

    pub fn with_registry(mut self, registry: ProjectionRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn state(&self) -> SessionState {
        match self.active.as_ref().map(MapInstance::mode) {
            None => SessionState::NoMap,
            Some(MapMode::Flat) => SessionState::FlatActive,
            Some(MapMode::Globe) => SessionState::GlobeActive,
        }
    }

    /// Replace the live map with a fresh one for `mode`, with an empty route
    /// and the zoom reset
    pub fn select_mode(&mut self, mode: MapMode) -> Result<()> {
        if let Some(mut previous) = self.active.take() {
            previous.route.reset(&mut self.doc)?;
            previous.teardown(&mut self.doc)?;
        }
        self.zoom_level = 1.0;

        let descriptor = ModeDescriptor::for_mode(mode, &self.settings);
        let mut instance = MapInstance::build(&mut self.doc, &self.atlas, &self.registry, descriptor, &self.config)?;
        instance.route.reset(&mut self.doc)?;
        self.active = Some(instance);

        log::info!("session switched to {mode} mode");
        Ok(())
    }

    /// Dispatch a semantic event to the live map
    pub fn handle_input(&mut self, event: &InputEvent, now: Instant) -> Result<GestureOutcome> {
        let Some(instance) = self.active.as_mut() else {
            return Ok(GestureOutcome::Ignored);
        };
        let outcome = instance.handle(event, &mut self.doc, now)?;
        if let GestureOutcome::Zoomed(k) = outcome {
            self.zoom_level = k;
        }
        Ok(outcome)
    }

    /// Recognize raw pointer input and dispatch every resulting event
    pub fn handle_pointer(&mut self, input: PointerInput, now: Instant) -> Result<Vec<GestureOutcome>> {
        self.recognizer
            .process_input(input)
            .iter()
            .map(|event| self.handle_input(event, now))
            .collect()
    }

    /// Advance the centering animation; returns whether it is still running
    pub fn tick(&mut self, now: Instant) -> Result<bool> {
        match self.active.as_mut() {
            Some(instance) => instance.tick(now, &mut self.doc),
            None => Ok(false),
        }
    }

    /// Select a region by its route identifier as if it had been clicked
    pub fn click_region(&mut self, id: &str, now: Instant) -> Result<GestureOutcome> {
        match self.active.as_mut() {
            Some(instance) => instance.select_region(&mut self.doc, id, now),
            None => Ok(GestureOutcome::Ignored),
        }
    }

    /// Make `id` the flat map projection, persisting the choice. A live flat
    /// map switches in place and keeps its route.
    pub fn change_projection(&mut self, id: ProjectionId) -> Result<()> {
        let projection = self.registry.create(id)?;
        self.settings.current_projection = id;
        self.persist();

        if let Some(instance) = self.active.as_mut().filter(|i| i.mode() == MapMode::Flat) {
            instance.set_projection(&mut self.doc, projection)?;
        }
        log::info!("projection changed to {id}");
        Ok(())
    }

    /// Like [`Self::change_projection`] for a dropdown value
    pub fn change_projection_by_name(&mut self, name: &str) -> Result<()> {
        let id = name.parse::<ProjectionId>()?;
        if !self.registry.contains(id) {
            return Err(MapError::UnknownProjection(name.to_string()));
        }
        self.change_projection(id)
    }

    /// Enable or disable a rotation axis of the flat map, persisting the choice
    pub fn toggle_rotation(&mut self, axis: RotationAxis, enabled: bool) {
        self.settings.set_axis(axis, enabled);
        self.persist();

        let mask = self.settings.rotation.mask();
        if let Some(instance) = self.active.as_mut().filter(|i| i.mode() == MapMode::Flat) {
            instance.set_mask(mask);
        }
        log::debug!("rotation axis {axis:?} enabled={enabled}");
    }

    /// Fill the projection dropdown with every registered projection
    pub fn populate_projection_dropdown(&mut self) -> Result<usize> {
        controls::populate_projection_dropdown(
            &mut self.doc,
            &self.config.projection_dropdown,
            self.registry.list(),
            self.settings.current_projection,
        )
    }

    /// Show or hide the settings panel; returns whether it is now open
    pub fn toggle_settings_panel(&mut self) -> Result<bool> {
        controls::toggle_settings_panel(&mut self.doc, &self.config.settings_panel)
    }

    fn persist(&mut self) {
        let Some(storage) = self.storage.as_mut() else {
            return;
        };
        if let Err(e) = self.settings.save(storage.as_mut(), &self.config.settings_key) {
            log::warn!("could not save settings: {e}");
        }
    }

    pub fn zoom_level(&self) -> f64 {
        self.zoom_level
    }

    pub fn settings(&self) -> &MapSettings {
        &self.settings
    }

    pub fn route(&self) -> &[RouteEntry] {
        self.active
            .as_ref()
            .map(|instance| instance.route.entries())
            .unwrap_or_default()
    }

    pub fn active(&self) -> Option<&MapInstance> {
        self.active.as_ref()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn atlas(&self) -> &Arc<Atlas> {
        &self.atlas
    }

    pub fn registry(&self) -> &ProjectionRegistry {
        &self.registry
    }

    pub fn document(&self) -> &D {
        &self.doc
    }

    pub fn document_mut(&mut self) -> &mut D {
        &mut self.doc
    }

    pub fn into_document(self) -> D {
        self.doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::Point;
    use crate::core::settings::MemoryStorage;
    use crate::projection::Rotation;
    use crate::render::MemoryDocument;
    use instant::Duration;

    const TOPOLOGY: &str = r#"{
        "type": "Topology",
        "arcs": [
            [[0, 0], [10, 0], [10, 10], [0, 10], [0, 0]],
            [[30, 20], [40, 20], [40, 30], [30, 30], [30, 20]],
            [[-100, 30], [-95, 30], [-95, 35], [-100, 35], [-100, 30]]
        ],
        "objects": {
            "countries": {"type": "GeometryCollection", "geometries": [
                {"type": "Polygon", "id": "A", "arcs": [[0]], "properties": {"name": "Alpha"}},
                {"type": "Polygon", "id": "B", "arcs": [[1]], "properties": {"name": "Beta"}}
            ]},
            "states": {"type": "GeometryCollection", "geometries": [
                {"type": "Polygon", "arcs": [[2]], "properties": {"name": "Gamma"}}
            ]}
        }
    }"#;

    fn session() -> MapSession<MemoryDocument> {
        let atlas = Arc::new(Atlas::from_json(TOPOLOGY).unwrap());
        MapSession::new(MemoryDocument::host_page(), atlas, SessionConfig::default())
    }

    #[test]
    fn test_initial_state_ignores_input() {
        let mut session = session();
        assert_eq!(session.state(), SessionState::NoMap);
        let outcome = session
            .handle_input(&InputEvent::DragEnd, Instant::now())
            .unwrap();
        assert_eq!(outcome, GestureOutcome::Ignored);
        assert!(!session.tick(Instant::now()).unwrap());
    }

    #[test]
    fn test_select_mode_keeps_one_surface_and_empty_route() {
        let mut session = session();
        session.select_mode(MapMode::Flat).unwrap();
        session.click_region("A", Instant::now()).unwrap();
        assert_eq!(session.route().len(), 1);

        session.select_mode(MapMode::Globe).unwrap();
        assert_eq!(session.state(), SessionState::GlobeActive);
        assert_eq!(session.document().query_all("svg").len(), 1);
        assert!(session.route().is_empty());
        assert!(session.document().query_all("li").is_empty());
        assert_eq!(session.zoom_level(), 1.0);
    }

    #[test]
    fn test_route_of_two_clicks() {
        let mut session = session();
        session.select_mode(MapMode::Globe).unwrap();
        let now = Instant::now();
        session.click_region("A", now).unwrap();
        session.click_region("B", now).unwrap();

        let ids: Vec<_> = session
            .route()
            .iter()
            .map(|e| (e.region_id.as_str(), e.index))
            .collect();
        assert_eq!(ids, [("A", 0), ("B", 1)]);
        assert_eq!(session.document().query_all("path.path-link").len(), 1);
        assert_eq!(session.active().unwrap().view.surface.link_count(), 1);

        while session.tick(now + Duration::from_millis(1000)).unwrap() {}
        let rotation = session.active().unwrap().view.projection.rotation();
        let b = session.route()[1].center;
        assert!((rotation.lambda + b.lng).abs() < 1e-9 && (rotation.phi + b.lat).abs() < 1e-9);
    }

    #[test]
    fn test_states_are_selected_by_name() {
        let mut session = session();
        session.select_mode(MapMode::Flat).unwrap();
        let outcome = session.click_region("Gamma", Instant::now()).unwrap();
        assert!(matches!(outcome, GestureOutcome::Selected(entry) if entry.region_id == "Gamma"));
        assert_eq!(session.click_region("Nowhere", Instant::now()).unwrap(), GestureOutcome::Ignored);
    }

    #[test]
    fn test_zoom_level_follows_wheel() {
        let mut session = session();
        session.select_mode(MapMode::Flat).unwrap();
        let event = InputEvent::Wheel {
            delta_y: -500.0,
            position: Point::new(100.0, 100.0),
        };
        session.handle_input(&event, Instant::now()).unwrap();
        assert!((session.zoom_level() - 2.0).abs() < 1e-9);

        let event = InputEvent::Wheel {
            delta_y: -100_000.0,
            position: Point::new(100.0, 100.0),
        };
        session.handle_input(&event, Instant::now()).unwrap();
        assert_eq!(session.zoom_level(), 20.0);
    }

    #[test]
    fn test_pointer_drag_rotates_flat_map_on_longitude_only() {
        let mut session = session();
        session.select_mode(MapMode::Flat).unwrap();
        let now = Instant::now();
        session
            .handle_pointer(PointerInput::Down { position: Point::new(100.0, 100.0), target: None }, now)
            .unwrap();
        let outcomes = session
            .handle_pointer(PointerInput::Move { position: Point::new(140.0, 60.0) }, now)
            .unwrap();
        session
            .handle_pointer(PointerInput::Up { position: Point::new(140.0, 60.0) }, now)
            .unwrap();

        assert!(outcomes.contains(&GestureOutcome::Rotated));
        let rotation = session.active().unwrap().view.projection.rotation();
        assert!(rotation.lambda > 0.0);
        assert_eq!(rotation.phi, 0.0);
    }

    #[test]
    fn test_settings_are_loaded_and_persisted() {
        let stored = r#"{"currentProjection": "Mercator I", "rotation": {"rotationX": true, "rotationY": true}}"#;
        let storage = MemoryStorage::new().with_value("options", stored);
        let mut session = session().with_storage(Box::new(storage));
        assert_eq!(session.settings().current_projection, ProjectionId::Mercator);

        session.select_mode(MapMode::Flat).unwrap();
        assert_eq!(session.active().unwrap().view.projection.id(), ProjectionId::Mercator);
        assert!(session.active().unwrap().controller.mask().y);

        session.toggle_rotation(RotationAxis::Y, false);
        assert!(!session.active().unwrap().controller.mask().y);
        assert!(!session.settings().rotation.rotation_y);
    }

    #[test]
    fn test_malformed_settings_use_defaults() {
        let storage = MemoryStorage::new().with_value("options", "{{{");
        let session = session().with_storage(Box::new(storage));
        assert_eq!(*session.settings(), MapSettings::default());
    }

    #[test]
    fn test_change_projection_in_place() {
        let mut session = session();
        session.select_mode(MapMode::Flat).unwrap();
        session.click_region("A", Instant::now()).unwrap();

        session.change_projection_by_name("gnomonic").unwrap();
        let instance = session.active().unwrap();
        assert_eq!(instance.view.projection.id(), ProjectionId::Gnomonic);
        assert_eq!(instance.view.projection.rotation(), Rotation::default());
        assert_eq!(session.route().len(), 1);
        assert_eq!(session.settings().current_projection, ProjectionId::Gnomonic);
        assert_eq!(session.document().query_all("svg").len(), 1);
    }

    #[test]
    fn test_change_projection_on_globe_only_records_choice() {
        let mut session = session();
        session.select_mode(MapMode::Globe).unwrap();
        session.change_projection(ProjectionId::Albers).unwrap();
        assert_eq!(session.active().unwrap().view.projection.id(), ProjectionId::Orthographic);

        session.select_mode(MapMode::Flat).unwrap();
        assert_eq!(session.active().unwrap().view.projection.id(), ProjectionId::Albers);
    }

    #[test]
    fn test_unknown_projection_fails() {
        let mut session = session().with_registry(ProjectionRegistry::new());
        assert!(matches!(
            session.change_projection(ProjectionId::Mercator),
            Err(MapError::UnknownProjection(_))
        ));
        assert!(matches!(
            session.change_projection_by_name("Dymaxion"),
            Err(MapError::UnknownProjection(_))
        ));
        assert_eq!(session.settings().current_projection, ProjectionId::NaturalEarth);
    }

    #[test]
    fn test_settings_controls() {
        let mut session = session();
        assert_eq!(session.populate_projection_dropdown().unwrap(), 13);
        assert!(session.toggle_settings_panel().unwrap());
        assert!(!session.toggle_settings_panel().unwrap());
    }
}
