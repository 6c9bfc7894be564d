//! Save/load contract tests.
//!
//! Verifies:
//!   - save → load reproduces the state exactly, including through JSON
//!   - every invalid payload is rejected and leaves the live session untouched
//!   - payloads in the older front-end format (embedded entities, gameDay) load
//!   - a restored session continues with the same random stream

use ecosim_core::{
    config::SimConfig,
    engine::SimEngine,
    error::{LoadError, SimError},
    event::SimEvent,
    ledger::ResourceMap,
    snapshot::{SavePayload, SavedCell},
};

fn played_engine(seed: u64) -> SimEngine {
    let mut engine = SimEngine::build_test(seed).unwrap();
    engine.place(0, 0, "factory").unwrap();
    engine.place(4, 2, "tree").unwrap();
    engine.place(1, 3, "house").unwrap();
    engine.place(2, 3, "house").unwrap();
    engine.run_ticks(12);
    engine
}

fn assert_load_fails(engine: &mut SimEngine, payload: SavePayload, expected: LoadError) {
    let before = engine.state().clone();
    let err = engine.load(payload).unwrap_err();
    match err {
        SimError::Load(actual) => assert_eq!(actual, expected),
        other => panic!("Expected LoadError, got {other:?}"),
    }
    assert_eq!(engine.state(), &before, "failed load must not touch live state");
}

#[test]
fn save_then_load_restores_identical_state() {
    let engine = played_engine(21);
    let payload = engine.save(Some("Round trip"));

    let mut fresh = SimEngine::build_test(21).unwrap();
    fresh.load(payload).unwrap();

    assert_eq!(fresh.state(), engine.state());
    assert_eq!(fresh.day(), 13);
}

#[test]
fn json_round_trip_is_lossless() {
    let engine = played_engine(22);
    let payload = engine.save(None);
    let json = payload.to_json().unwrap();

    let parsed = SavePayload::from_json(&json).unwrap();
    assert_eq!(parsed, payload);

    let restored = SimEngine::from_save(parsed, 22).unwrap();
    assert_eq!(restored.state(), engine.state());
    assert_eq!(restored.config(), engine.config());
}

/// The payload has the shape the save service stores.
#[test]
fn payload_shape_matches_save_service() {
    let engine = played_engine(23);
    let json = serde_json::to_value(engine.save(None)).unwrap();

    assert_eq!(json["title"], "Test City");
    assert_eq!(json["config"]["grid"]["width"], 5);
    assert_eq!(json["state"]["day"], 13);
    assert_eq!(json["state"]["grid"][0][0], "factory");
    assert_eq!(json["state"]["grid"][2][4], "tree");
    assert!(json["state"]["grid"][0][1].is_null());
    assert!(json["state"]["resources"]["budget"].is_number());
}

#[test]
fn rejects_wrong_row_count() {
    let mut engine = played_engine(30);
    let mut payload = engine.save(None);
    payload.state.grid.pop();
    assert_load_fails(
        &mut engine,
        payload,
        LoadError::GridHeightMismatch { expected: 5, actual: 4 },
    );
}

#[test]
fn rejects_wrong_row_width() {
    let mut engine = played_engine(31);
    let mut payload = engine.save(None);
    payload.state.grid[3].push(None);
    assert_load_fails(
        &mut engine,
        payload,
        LoadError::GridWidthMismatch { row: 3, expected: 5, actual: 6 },
    );
}

#[test]
fn rejects_unknown_entity_reference() {
    let mut engine = played_engine(32);
    let mut payload = engine.save(None);
    payload.state.grid[1][2] = Some(SavedCell::Id("volcano".into()));
    assert_load_fails(
        &mut engine,
        payload,
        LoadError::UnknownEntity { id: "volcano".into(), x: 2, y: 1 },
    );
}

#[test]
fn rejects_day_zero() {
    let mut engine = played_engine(33);
    let mut payload = engine.save(None);
    payload.state.day = 0;
    assert_load_fails(&mut engine, payload, LoadError::InvalidDay { day: 0 });
}

#[test]
fn rejects_config_with_duplicate_ids() {
    let mut engine = played_engine(34);
    let mut payload = engine.save(None);
    let dup = payload.config.entities[0].clone();
    payload.config.entities.push(dup);
    assert_load_fails(
        &mut engine,
        payload,
        LoadError::DuplicateEntity { id: "tree".into() },
    );
}

#[test]
fn rejects_oversized_grid_without_allocating() {
    let mut engine = played_engine(35);
    let mut payload = engine.save(None);
    payload.config.grid.width = u32::MAX;
    payload.config.grid.height = u32::MAX;
    let before = engine.state().clone();

    let err = engine.load(payload.clone()).unwrap_err();
    assert!(matches!(err, SimError::Load(LoadError::InvalidConfig(_))), "got {err:?}");
    assert_eq!(engine.state(), &before);

    let err = SimEngine::build(payload.config, 1).err().expect("oversized grid must not build");
    assert!(matches!(err, SimError::Load(LoadError::InvalidConfig(_))), "got {err:?}");
}

/// A ledger value with no short decimal form comes back unchanged.
#[test]
fn fractional_budget_survives_json() {
    let mut engine = SimEngine::build_test(36).unwrap();
    let mut payload = engine.save(None);
    payload.state.resources.insert("budget", 199.693_463_366_731_38);
    payload.state.resources.insert("pollution", 208.421_941_530_854_78);
    engine.load(payload).unwrap();

    let json = engine.save(None).to_json().unwrap();
    let restored = SimEngine::from_save(SavePayload::from_json(&json).unwrap(), 36).unwrap();
    assert_eq!(restored.state(), engine.state());
}

#[test]
fn malformed_json_is_a_load_error() {
    let err = SavePayload::from_json(r#"{"title": "x", "state": 3}"#).unwrap_err();
    assert!(matches!(err, LoadError::Malformed(_)), "got {err:?}");
}

/// The older front-end stored whole entity objects in the grid and the day
/// as `gameDay`.
#[test]
fn loads_legacy_payload() {
    let config = serde_json::to_value(SimConfig::default_test()).unwrap();
    let json = serde_json::json!({
        "title": "Old save",
        "config": config,
        "state": {
            "grid": [
                [{"id": "tree", "name": "Tree", "icon": "T", "cost": {"budget": 10}, "effects": {"pollution": -1}}, null, null, null, null],
                [null, null, null, null, null],
                [null, null, "house", null, null],
                [null, null, null, null, null],
                [null, null, null, null, null]
            ],
            "resources": {"budget": 940, "pollution": -3, "score": 3},
            "gameDay": 4,
            "history": []
        }
    });
    let payload = SavePayload::from_json(&json.to_string()).unwrap();

    let mut engine = SimEngine::build_test(1).unwrap();
    engine.load(payload).unwrap();

    let state = engine.state();
    assert_eq!(state.day, 4);
    assert_eq!(state.grid.get(0, 0).unwrap().map(|e| e.id.as_str()), Some("tree"));
    assert_eq!(state.grid.get(2, 2).unwrap().map(|e| e.id.as_str()), Some("house"));
    assert_eq!(state.resources.get("budget"), Some(940.0));
}

/// Loading swaps in the payload's catalog and grid shape.
#[test]
fn load_replaces_config() {
    let mut other = SimConfig::default_test();
    other.title = "Big Map".into();
    other.grid.width = 8;
    other.grid.height = 3;
    other.global_resources = [("gold".to_string(), 5.0)].into_iter().collect::<ResourceMap>();
    let source = SimEngine::build(other, 1).unwrap();
    let payload = source.save(None);

    let mut engine = played_engine(40);
    engine.load(payload).unwrap();

    assert_eq!(engine.config().title, "Big Map");
    assert_eq!(engine.state().grid.width(), 8);
    assert_eq!(engine.state().grid.occupied_count(), 0);
    assert!(engine.state().resources.contains("gold"));
    assert!(engine.place(7, 2, "tree").is_err(), "no budget resource in loaded ledger");
}

/// Observers hear about loads.
#[test]
fn load_emits_state_loaded() {
    let mut engine = played_engine(41);
    let payload = engine.save(Some("Checkpoint"));
    engine.run_ticks(3);

    let recorder = std::sync::Arc::new(std::sync::Mutex::new(
        ecosim_core::observer::EventRecorder::new(),
    ));
    engine.register_observer(Box::new(std::sync::Arc::clone(&recorder)));
    engine.load(payload).unwrap();

    let recorder = recorder.lock().unwrap();
    assert_eq!(
        recorder.events,
        vec![SimEvent::StateLoaded { day: 13, title: "Checkpoint".into() }]
    );
}

/// A session restored at day D draws the same random stream as the
/// original session from day D on.
#[test]
fn restored_session_continues_deterministically() {
    let seed = 0xDEAD_BEEF_CAFE_1234;
    let mut original = SimEngine::build_test(seed).unwrap();
    for x in 0..5 {
        original.place(x, 0, "factory").unwrap();
    }
    // Push pollution deep into collapse territory.
    original.run_ticks(10);
    let checkpoint = original.save(None);

    let mut restored = SimEngine::from_save(checkpoint, seed).unwrap();
    let a = original.run_ticks(200);
    let b = restored.run_ticks(200);

    assert_eq!(a, b, "event streams diverged after restore");
    assert_eq!(original.state(), restored.state());
}
