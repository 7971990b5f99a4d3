//! Where presets and the auto-cycle config live in the preference tree.

use super::PreferenceStore;
use crate::catalog::WidgetCatalog;
use crate::cycle::AutoCycleConfig;
use crate::model::Preset;
use crate::slots::{PresetSlots, SLOT_COUNT};
use serde_json::Value;

pub const PRESETS_PREFIX: &str = "dashboard.presets";
pub const AUTO_CYCLE_KEY: &str = "dashboard.presets.auto_cycle";

pub fn slot_key(index: usize) -> String {
    format!("{PRESETS_PREFIX}.slot_{index}")
}

/// Fill `slots` from the store. Unreadable entries become vacant and are
/// reported; the result is then sanitized against `catalog`.
pub fn load_slots(
    store: &dyn PreferenceStore,
    slots: &mut PresetSlots,
    catalog: Option<&dyn WidgetCatalog>,
) -> Vec<String> {
    let mut warnings = Vec::new();
    for index in 0..SLOT_COUNT {
        let preset = match store.get(&slot_key(index)) {
            None | Some(Value::Null) => None,
            Some(value) => match serde_json::from_value::<Preset>(value) {
                Ok(preset) => Some(preset),
                Err(err) => {
                    tracing::warn!(slot = index, error = %err, "stored preset unreadable");
                    warnings.push(format!("slot {index}: stored preset unreadable ({err})"));
                    None
                }
            },
        };
        if let Err(err) = slots.restore(index, preset) {
            tracing::warn!(slot = index, error = %err, "failed to restore preset");
            warnings.push(format!("slot {index}: {err}"));
        }
    }
    warnings.extend(slots.sanitize(catalog));
    warnings
}

/// Write one slot; a vacant cell is stored as `null`.
pub fn persist_slot(store: &dyn PreferenceStore, slots: &PresetSlots, index: usize) {
    let value = match slots.get(index) {
        Ok(Some(preset)) => match serde_json::to_value(preset) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(slot = index, error = %err, "failed to serialize preset");
                return;
            }
        },
        Ok(None) => Value::Null,
        Err(err) => {
            tracing::warn!(error = %err, "refusing to persist slot");
            return;
        }
    };
    store.set(&slot_key(index), value);
}

pub fn persist_all_slots(store: &dyn PreferenceStore, slots: &PresetSlots) {
    for index in 0..SLOT_COUNT {
        persist_slot(store, slots, index);
    }
}

/// Read the auto-cycle config, falling back to defaults when it is absent
/// or malformed.
pub fn load_auto_cycle(store: &dyn PreferenceStore) -> (AutoCycleConfig, Vec<String>) {
    match store.get(AUTO_CYCLE_KEY) {
        None | Some(Value::Null) => (AutoCycleConfig::default(), Vec::new()),
        Some(value) => match serde_json::from_value(value) {
            Ok(config) => (config, Vec::new()),
            Err(err) => {
                tracing::warn!(error = %err, "stored auto-cycle config unreadable");
                (
                    AutoCycleConfig::default(),
                    vec![format!("auto-cycle config unreadable ({err}); using defaults")],
                )
            }
        },
    }
}

pub fn persist_auto_cycle(store: &dyn PreferenceStore, config: &AutoCycleConfig) {
    match serde_json::to_value(config) {
        Ok(value) => store.set(AUTO_CYCLE_KEY, value),
        Err(err) => tracing::warn!(error = %err, "failed to serialize auto-cycle config"),
    }
}
