use instant::{Duration, Instant};
use worldroute::{
    geometry::{GeometrySource, StaticFetcher},
    Document, GestureOutcome, InputEvent, MapError, MapMode, MapSession, MapSettings, MemoryDocument,
    MemoryStorage, Point, PointerInput, ProjectionId, SessionConfig, SessionState,
};

/// Two countries, one unnamed country and one state, with quantized arcs
const WORLD: &str = r#"{
    "type": "Topology",
    "transform": {"scale": [0.1, 0.1], "translate": [0, 0]},
    "arcs": [
        [[0, 0], [100, 0], [0, 100], [-100, 0], [0, -100]],
        [[300, 200], [100, 0], [0, 100], [-100, 0], [0, -100]],
        [[-400, -300], [50, 0], [0, 50], [-50, 0], [0, -50]]
    ],
    "objects": {
        "countries": {"type": "GeometryCollection", "geometries": [
            {"type": "Polygon", "id": "A", "arcs": [[0]], "properties": {"name": "Alpha"}},
            {"type": "Polygon", "id": "B", "arcs": [[1]], "properties": {"name": "Beta"}},
            {"type": "Polygon", "arcs": [[2]]}
        ]},
        "states": {"type": "GeometryCollection", "geometries": [
            {"type": "Polygon", "arcs": [[-1]], "properties": {"name": "Inner"}}
        ]}
    }
}"#;

async fn session_with(config: SessionConfig) -> MapSession<MemoryDocument> {
    let _ = env_logger::builder().is_test(true).try_init();
    let source = GeometrySource::new(StaticFetcher::new().with_document("combined.json", WORLD));
    let atlas = source.load("combined.json").await.unwrap();
    MapSession::new(MemoryDocument::host_page(), atlas, config)
}

async fn session() -> MapSession<MemoryDocument> {
    session_with(SessionConfig::default()).await
}

fn finish_animation(session: &mut MapSession<MemoryDocument>, start: Instant) {
    let mut now = start;
    while session.tick(now).unwrap() {
        now += Duration::from_millis(16);
    }
}

#[tokio::test]
async fn test_clicking_two_countries_builds_a_linked_route() {
    let mut session = session().await;
    session.select_mode(MapMode::Globe).unwrap();

    let start = Instant::now();
    for id in ["A", "B"] {
        let outcome = session.click_region(id, start).unwrap();
        assert!(matches!(outcome, GestureOutcome::Selected(_)));
        finish_animation(&mut session, start);
    }

    let route: Vec<_> = session
        .route()
        .iter()
        .map(|entry| (entry.region_id.clone(), entry.index))
        .collect();
    assert_eq!(route, [("A".to_string(), 0), ("B".to_string(), 1)]);

    let doc = session.document();
    assert_eq!(doc.query_all("path.path-link").len(), 1);
    let codes: Vec<_> = doc
        .query_all("li.route-selected > span.route-selected-code")
        .into_iter()
        .filter_map(|node| doc.text(node).map(str::to_string))
        .collect();
    assert_eq!(codes, ["A", "B"]);

    let a = doc.query("#A").unwrap();
    assert!(doc.has_class(a, "selected"));
}

#[tokio::test]
async fn test_mode_switch_leaves_one_surface_and_an_empty_route() {
    let mut session = session().await;
    assert_eq!(session.state(), SessionState::NoMap);

    session.select_mode(MapMode::Flat).unwrap();
    session.click_region("A", Instant::now()).unwrap();
    session.click_region("B", Instant::now()).unwrap();
    assert_eq!(session.state(), SessionState::FlatActive);

    for mode in [MapMode::Globe, MapMode::Flat, MapMode::Globe] {
        session.select_mode(mode).unwrap();
        let doc = session.document();
        assert_eq!(doc.query_all("svg").len(), 1);
        assert!(doc.query_all("path.path-link").is_empty());
        assert!(doc.query_all("li").is_empty());
        assert!(session.route().is_empty());
    }
    assert_eq!(session.state(), SessionState::GlobeActive);
}

#[tokio::test]
async fn test_pointer_click_hit_tests_the_projected_feature() {
    let mut session = session().await;
    session.select_mode(MapMode::Flat).unwrap();

    let center = session.atlas().find_region("A").unwrap().centroid().unwrap();
    let position = session
        .active()
        .unwrap()
        .view
        .projection
        .project(center)
        .unwrap();

    let now = Instant::now();
    session
        .handle_pointer(PointerInput::Down { position, target: None }, now)
        .unwrap();
    let outcomes = session
        .handle_pointer(PointerInput::Up { position }, now)
        .unwrap();

    assert!(matches!(&outcomes[..], [GestureOutcome::Selected(entry)] if entry.region_id == "A"));
}

#[tokio::test]
async fn test_clicking_an_unidentified_feature_changes_nothing() {
    let mut session = session().await;
    session.select_mode(MapMode::Globe).unwrap();

    let anonymous = session
        .document()
        .query_all("g.boundary > path")
        .into_iter()
        .find(|&node| session.document().attribute(node, "id").is_none())
        .unwrap();
    let before = session.document().to_markup(session.document().root());

    let event = InputEvent::Click {
        position: Point::new(0.0, 0.0),
        target: Some(anonymous),
    };
    let outcome = session.handle_input(&event, Instant::now()).unwrap();

    assert_eq!(outcome, GestureOutcome::Ignored);
    assert!(session.route().is_empty());
    assert_eq!(session.document().to_markup(session.document().root()), before);
}

#[tokio::test]
async fn test_zoom_stays_clamped_and_in_bounds() {
    let mut session = session().await;
    session.select_mode(MapMode::Flat).unwrap();
    let now = Instant::now();

    let wheels = [(-800.0, 100.0, 50.0), (-3000.0, 900.0, 480.0), (2500.0, 10.0, 10.0), (-5000.0, 0.0, 500.0), (9000.0, 480.0, 250.0)];
    for (delta_y, x, y) in wheels {
        let event = InputEvent::Wheel {
            delta_y,
            position: Point::new(x, y),
        };
        session.handle_input(&event, now).unwrap();

        let k = session.zoom_level();
        assert!((1.0..=20.0).contains(&k), "k = {k}");
        let t = session.active().unwrap().controller.zoom_transform();
        assert!(t.x <= 1e-9 && t.y <= 1e-9);
        assert!(t.x + 960.0 * t.k >= 960.0 - 1e-9 && t.y + 500.0 * t.k >= 500.0 - 1e-9);
    }
    assert_eq!(session.zoom_level(), 1.0);

    let doc = session.document();
    let countries = doc.query("g.boundary").unwrap();
    assert_eq!(doc.style(countries, "stroke-width"), Some("0.5"));
}

#[tokio::test]
async fn test_flat_drag_never_moves_latitude() {
    let mut session = session().await;
    session.select_mode(MapMode::Flat).unwrap();
    let now = Instant::now();

    let path = [(200.0, 200.0), (260.0, 140.0), (180.0, 320.0), (400.0, 20.0)];
    session
        .handle_pointer(PointerInput::Down { position: Point::new(path[0].0, path[0].1), target: None }, now)
        .unwrap();
    for &(x, y) in &path[1..] {
        session
            .handle_pointer(PointerInput::Move { position: Point::new(x, y) }, now)
            .unwrap();
        let rotation = session.active().unwrap().view.projection.rotation();
        assert_eq!((rotation.phi, rotation.gamma), (0.0, 0.0));
    }
    session
        .handle_pointer(PointerInput::Up { position: Point::new(400.0, 20.0) }, now)
        .unwrap();
    assert!(session.route().is_empty());
}

#[tokio::test]
async fn test_malformed_settings_fall_back_to_defaults() {
    let storage = MemoryStorage::new().with_value("options", r#"{"currentProjection": 7}"#);
    let mut session = session().await.with_storage(Box::new(storage));
    assert_eq!(*session.settings(), MapSettings::default());

    session.select_mode(MapMode::Flat).unwrap();
    let instance = session.active().unwrap();
    assert_eq!(instance.view.projection.id(), ProjectionId::NaturalEarth);
    assert!(instance.controller.mask().x && !instance.controller.mask().y);
}

#[tokio::test]
async fn test_missing_geometry_is_a_load_error() {
    let source = GeometrySource::new(StaticFetcher::new());
    match source.load("missing.json").await {
        Err(MapError::Load { url, .. }) => assert_eq!(url, "missing.json"),
        other => panic!("expected a load error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_states_share_arcs_with_countries() {
    let session = session().await;
    let atlas = session.atlas();
    assert_eq!(atlas.countries.len(), 3);
    assert_eq!(atlas.states.len(), 1);

    let inner = atlas.find_region("Inner").unwrap().centroid().unwrap();
    let alpha = atlas.find_region("A").unwrap().centroid().unwrap();
    assert!((inner.lat - alpha.lat).abs() < 1e-9 && (inner.lng - alpha.lng).abs() < 1e-9);
}
