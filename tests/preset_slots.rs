use chrono::TimeZone;
use dashboard_presets::clock::ManualClock;
use dashboard_presets::naming::WidgetListNameGenerator;
use dashboard_presets::{
    NoOp, Outcome, PresetError, PresetFields, PresetSlots, PresetType, Rect, WidgetPlacement,
    SLOT_COUNT,
};
use std::sync::Arc;

fn slots() -> (PresetSlots, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(
        chrono::Utc.with_ymd_and_hms(2024, 3, 10, 9, 30, 0).unwrap(),
    ));
    let slots = PresetSlots::new(clock.clone(), Arc::new(WidgetListNameGenerator::default()));
    (slots, clock)
}

fn layout() -> Vec<WidgetPlacement> {
    vec![
        WidgetPlacement::new("weather", Rect::new(0, 0, 3, 2)).with_display_name("Weather"),
        WidgetPlacement::new("clock", Rect::new(3, 0, 2, 1)).with_display_name("Clock"),
        WidgetPlacement::new("notes:work", Rect::new(0, 2, 2, 2)).disabled(),
    ]
}

#[test]
fn save_then_get_returns_the_layout_for_every_slot() {
    let (mut slots, clock) = slots();
    for index in 0..SLOT_COUNT {
        let preset_type = if index % 2 == 0 {
            PresetType::Grid
        } else {
            PresetType::Fullscreen
        };
        let mut l = layout();
        if preset_type == PresetType::Fullscreen {
            l[1].enabled = false;
        }
        slots.save(index, &l, preset_type, None, None).unwrap();
        let preset = slots.get(index).unwrap().unwrap();
        assert_eq!(preset.layout, l);
        assert_eq!(preset.preset_type, preset_type);
        assert_eq!(preset.created_at, preset.updated_at);
        clock.advance(chrono::Duration::seconds(1));
    }
}

#[test]
fn resave_refreshes_updated_at_only() {
    let (mut slots, clock) = slots();
    slots.save(0, &layout(), PresetType::Grid, None, None).unwrap();
    clock.advance(chrono::Duration::hours(1));
    slots.save(0, &layout(), PresetType::Grid, None, None).unwrap();
    let preset = slots.get(0).unwrap().unwrap();
    assert_eq!(preset.created_at.as_deref(), Some("2024-03-10T09:30:00.000Z"));
    assert_eq!(preset.updated_at.as_deref(), Some("2024-03-10T10:30:00.000Z"));
}

#[test]
fn generated_name_is_stable_across_saves() {
    let (mut slots, _) = slots();
    slots.save(1, &layout(), PresetType::Grid, None, None).unwrap();
    let first = slots.get(1).unwrap().unwrap().name.clone();
    let mut reordered = layout();
    reordered.reverse();
    slots.save(1, &reordered, PresetType::Grid, Some("  ".into()), None).unwrap();
    assert_eq!(first.as_deref(), Some("Clock, Weather"));
    assert_eq!(slots.get(1).unwrap().unwrap().name, first);
}

#[test]
fn duplicate_without_room_leaves_array_unchanged() {
    let (mut slots, _) = slots();
    for index in 0..SLOT_COUNT {
        slots.save(index, &layout(), PresetType::Grid, None, None).unwrap();
    }
    let before = slots.cells().clone();
    assert_eq!(slots.duplicate(4).unwrap(), None);
    assert_eq!(slots.cells(), &before);
}

#[test]
fn duplicate_skips_blank_presets_when_looking_for_room() {
    let (mut slots, _) = slots();
    slots.create_blank(0, PresetType::Grid).unwrap();
    slots.save(1, &layout(), PresetType::Grid, Some("Desk".into()), None).unwrap();
    assert_eq!(slots.duplicate(1).unwrap(), Some(2));
    let copy = slots.get(2).unwrap().unwrap();
    assert_eq!(copy.name.as_deref(), Some("Desk (copy)"));
    assert_eq!(copy.layout, layout());
}

#[test]
fn save_with_nothing_enabled_is_a_no_op() {
    let (mut slots, _) = slots();
    let hidden: Vec<_> = layout().into_iter().map(|p| p.disabled()).collect();
    let before = slots.cells().clone();
    assert_eq!(
        slots.save(2, &hidden, PresetType::Grid, None, None).unwrap(),
        Outcome::Unchanged(NoOp::NothingEnabled)
    );
    assert_eq!(slots.cells(), &before);
}

#[test]
fn clear_and_update_on_vacant_slots() {
    let (mut slots, _) = slots();
    assert_eq!(slots.clear(3).unwrap(), Outcome::Unchanged(NoOp::AlreadyInState));
    slots.save(3, &layout(), PresetType::Grid, None, None).unwrap();
    assert!(slots.clear(3).unwrap().is_changed());
    assert!(slots.is_vacant(3).unwrap());
    assert_eq!(
        slots.update(3, PresetFields::name("Evening")).unwrap(),
        Outcome::Unchanged(NoOp::SlotEmpty)
    );
}

#[test]
fn indices_outside_the_array_fail_loudly() {
    let (mut slots, _) = slots();
    assert_eq!(
        slots.duplicate(SLOT_COUNT),
        Err(PresetError::InvalidIndex { index: SLOT_COUNT })
    );
    assert!(slots.create_blank(100, PresetType::Grid).is_err());
    assert!(slots.update(9, PresetFields::name("x")).is_err());
}

#[test]
fn layouts_repeating_a_widget_id_are_refused() {
    let (mut slots, _) = slots();
    let layout = vec![
        WidgetPlacement::new("clock", Rect::new(0, 0, 2, 1)),
        WidgetPlacement::new("clock", Rect::new(3, 3, 2, 1)),
    ];
    assert_eq!(
        slots.save(0, &layout, PresetType::Grid, None, None),
        Err(PresetError::DuplicatePlacement { id: "clock".into() })
    );
    assert!(slots.is_vacant(0).unwrap());
}
