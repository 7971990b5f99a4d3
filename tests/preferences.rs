use dashboard_presets::cycle::MAX_DELAY_SECS;
use dashboard_presets::prefs::mapping::{self, AUTO_CYCLE_KEY};
use dashboard_presets::{
    JsonFilePreferenceStore, PreferenceStore, PresetEngine, PresetError, PresetType, Rect,
    Settings, WidgetDefinition, WidgetPlacement, WidgetRegistry,
};
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::tempdir;

fn catalog() -> Arc<WidgetRegistry> {
    Arc::new(WidgetRegistry::from_definitions([
        WidgetDefinition::new("clock", "Clock", "time", 2, 1),
        WidgetDefinition::new("notes", "Notes", "text", 2, 2),
    ]))
}

#[test]
fn presets_survive_a_restart() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("preferences.json");
    {
        let store = Arc::new(JsonFilePreferenceStore::open(&path).unwrap());
        let mut engine = PresetEngine::open(store, catalog(), &Settings::default());
        engine
            .save_preset(
                3,
                &[WidgetPlacement::new("notes:todo", Rect::new(1, 1, 2, 2))],
                PresetType::Fullscreen,
                Some("Focus".into()),
                None,
            )
            .unwrap();
        engine.force_sync().unwrap();
    }

    let store = Arc::new(JsonFilePreferenceStore::open(&path).unwrap());
    let engine = PresetEngine::open(store, catalog(), &Settings::default());
    let preset = engine.slots().get(3).unwrap().unwrap();
    assert_eq!(preset.name.as_deref(), Some("Focus"));
    assert_eq!(preset.preset_type, PresetType::Fullscreen);
    assert_eq!(preset.layout[0].id, "notes:todo");
}

#[test]
fn stored_document_uses_nested_dashboard_keys() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("preferences.json");
    let store = Arc::new(JsonFilePreferenceStore::open(&path).unwrap());
    let mut engine = PresetEngine::open(store, catalog(), &Settings::default());
    engine
        .save_preset(
            0,
            &[WidgetPlacement::new("clock", Rect::new(0, 0, 2, 1))],
            PresetType::Grid,
            None,
            None,
        )
        .unwrap();
    engine.clear_preset(0).unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["preferences"]["dashboard"]["presets"]["slot_0"], json!(null));
    assert!(raw["version"].as_u64().unwrap() >= 2);
}

#[test]
fn corrupt_entries_are_repaired_on_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("preferences.json");
    let store = JsonFilePreferenceStore::open(&path).unwrap();
    store.set(&mapping::slot_key(1), json!({"layout": "nope"}));
    store.set(
        &mapping::slot_key(2),
        json!({
            "type": "fullscreen",
            "layout": [
                {"id": "clock", "x": 0, "y": 0, "w": 2, "h": 1},
                {"id": "notes", "x": 2, "y": 0, "w": 2, "h": 2},
                {"id": "radar", "x": 4, "y": 0, "w": 2, "h": 2}
            ]
        }),
    );
    store.set(AUTO_CYCLE_KEY, json!({"enabled": true, "selectedIndices": [2, 1, 2, 12]}));

    let engine = PresetEngine::open(Arc::new(store), catalog(), &Settings::default());
    assert!(engine.slots().is_vacant(1).unwrap());
    let repaired = engine.slots().get(2).unwrap().unwrap();
    assert_eq!(repaired.layout.len(), 2);
    assert_eq!(repaired.enabled_count(), 1);
    assert_eq!(engine.auto_cycle_config().selected_indices, vec![2]);
    assert_eq!(engine.load_warnings().len(), 4);
}

#[test]
fn replace_all_rejects_stale_version() {
    let dir = tempdir().unwrap();
    let store = JsonFilePreferenceStore::open(dir.path().join("p.json")).unwrap();
    store.set("theme", json!("dark"));
    let version = store.version();

    let stale = store.replace_all(serde_json::Map::new(), Some(version - 1));
    assert_eq!(
        stale,
        Err(PresetError::VersionConflict {
            expected: version - 1,
            actual: version
        })
    );
    assert_eq!(store.get("theme"), Some(json!("dark")));

    let mut fresh = serde_json::Map::new();
    fresh.insert("theme".into(), json!("light"));
    assert_eq!(store.replace_all(fresh, Some(version)).unwrap(), version + 1);
    assert_eq!(store.get("theme"), Some(json!("light")));
}

#[test]
fn merge_and_batch_delete() {
    let dir = tempdir().unwrap();
    let store = JsonFilePreferenceStore::open(dir.path().join("p.json")).unwrap();
    store.set("dashboard.grid", json!({"cols": 12, "rows": 8}));
    let updates = json!({"dashboard": {"grid": {"rows": 6}, "density": "compact"}});
    store
        .merge(updates.as_object().cloned().unwrap(), None)
        .unwrap();
    assert_eq!(store.get("dashboard.grid"), Some(json!({"cols": 12, "rows": 6})));

    assert_eq!(
        store.remove_many(&["dashboard.density", "dashboard.grid.cols", "missing.key"]),
        2
    );
    assert_eq!(store.get("dashboard"), Some(json!({"grid": {"rows": 6}})));
}

#[test]
fn unwritable_location_keeps_in_memory_state() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("file");
    std::fs::write(&blocker, "x").unwrap();
    // parent is a regular file, so every write fails
    let store = JsonFilePreferenceStore::open(blocker.join("prefs.json")).unwrap();
    store.set("a", json!(1));
    assert_eq!(store.get("a"), Some(json!(1)));
    assert!(store.force_sync().is_err());
}

#[test]
fn duplicate_placements_never_reach_the_store() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("preferences.json");
    let store = Arc::new(JsonFilePreferenceStore::open(&path).unwrap());
    let mut engine = PresetEngine::open(store.clone(), catalog(), &Settings::default());
    let layout = [
        WidgetPlacement::new("clock", Rect::new(0, 0, 2, 1)),
        WidgetPlacement::new("clock", Rect::new(3, 3, 2, 1)),
    ];
    assert!(matches!(
        engine.save_preset(0, &layout, PresetType::Grid, None, None),
        Err(PresetError::DuplicatePlacement { .. })
    ));
    assert_eq!(store.get(&mapping::slot_key(0)), None);

    let reopened = PresetEngine::open(store, catalog(), &Settings::default());
    assert!(reopened.slots().is_vacant(0).unwrap());
    assert!(reopened.load_warnings().is_empty());
}

#[test]
fn huge_stored_intervals_are_capped_before_starting() {
    let dir = tempdir().unwrap();
    let store = JsonFilePreferenceStore::open(dir.path().join("p.json")).unwrap();
    store.set(
        &mapping::slot_key(1),
        json!({"type": "grid", "layout": [{"id": "clock", "x": 0, "y": 0, "w": 2, "h": 1}]}),
    );
    store.set(
        AUTO_CYCLE_KEY,
        json!({
            "enabled": true,
            "intervalSeconds": u64::MAX,
            "resumeDelaySeconds": u64::MAX,
            "selectedIndices": [1]
        }),
    );

    let mut engine = PresetEngine::open(Arc::new(store), catalog(), &Settings::default());
    assert_eq!(engine.auto_cycle_config().interval_seconds, MAX_DELAY_SECS);
    assert_eq!(engine.auto_cycle_config().resume_delay_seconds, MAX_DELAY_SECS);

    let t0 = Instant::now();
    assert!(engine.start_auto_cycle(t0).is_changed());
    assert_eq!(engine.next_deadline(), Some(t0 + Duration::from_secs(MAX_DELAY_SECS)));
    engine.notify_interaction(t0 + Duration::from_secs(1));
    assert!(engine.poll(t0 + Duration::from_secs(2)).is_empty());
}
