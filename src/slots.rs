use crate::catalog::WidgetCatalog;
use crate::clock::{Clock, SystemClock};
use crate::error::{NoOp, Outcome, PresetError, Result};
use crate::model::{Preset, PresetFields, PresetType, WidgetPlacement};
use crate::naming::{NameGenerator, WidgetListNameGenerator};
use std::sync::Arc;

pub const SLOT_COUNT: usize = 9;

pub type SlotCells = [Option<Preset>; SLOT_COUNT];

/// Fails loudly on an index outside `0..SLOT_COUNT`; never clamps.
pub fn check_index(index: usize) -> Result<usize> {
    if index < SLOT_COUNT {
        Ok(index)
    } else {
        Err(PresetError::InvalidIndex { index })
    }
}

fn normalize_text(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// The nine persisted preset slots.
#[derive(Clone)]
pub struct PresetSlots {
    cells: SlotCells,
    clock: Arc<dyn Clock>,
    namer: Arc<dyn NameGenerator>,
}

impl Default for PresetSlots {
    fn default() -> Self {
        Self::new(
            Arc::new(SystemClock),
            Arc::new(WidgetListNameGenerator::default()),
        )
    }
}

impl std::fmt::Debug for PresetSlots {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresetSlots")
            .field("cells", &self.cells)
            .finish_non_exhaustive()
    }
}

impl PresetSlots {
    pub fn new(clock: Arc<dyn Clock>, namer: Arc<dyn NameGenerator>) -> Self {
        Self {
            cells: Default::default(),
            clock,
            namer,
        }
    }

    pub fn with_cells(mut self, cells: SlotCells) -> Self {
        self.cells = cells;
        self
    }

    pub fn cells(&self) -> &SlotCells {
        &self.cells
    }

    pub fn namer(&self) -> &dyn NameGenerator {
        self.namer.as_ref()
    }

    pub fn get(&self, index: usize) -> Result<Option<&Preset>> {
        Ok(self.cells[check_index(index)?].as_ref())
    }

    /// `true` when the cell holds no preset at all.
    pub fn is_vacant(&self, index: usize) -> Result<bool> {
        Ok(self.get(index)?.is_none())
    }

    /// `true` when the cell is vacant or its preset has no enabled widget.
    pub fn is_empty(&self, index: usize) -> Result<bool> {
        Ok(self.get(index)?.map_or(true, Preset::is_empty))
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, Option<&Preset>)> {
        self.cells.iter().enumerate().map(|(i, p)| (i, p.as_ref()))
    }

    pub fn non_empty_indices(&self) -> Vec<usize> {
        self.iter()
            .filter(|(_, p)| p.map_or(false, |p| !p.is_empty()))
            .map(|(i, _)| i)
            .collect()
    }

    pub fn vacant_indices(&self) -> Vec<usize> {
        self.iter()
            .filter(|(_, p)| p.is_none())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn first_vacant(&self) -> Option<usize> {
        self.cells.iter().position(Option::is_none)
    }

    /// Store `layout` at `index`. A layout without enabled widgets is refused
    /// as a no-op; use [`PresetSlots::create_blank`] for an empty preset.
    pub fn save(
        &mut self,
        index: usize,
        layout: &[WidgetPlacement],
        preset_type: PresetType,
        name: Option<String>,
        description: Option<String>,
    ) -> Result<Outcome> {
        check_index(index)?;
        let enabled = crate::model::enabled_count(layout);
        if enabled == 0 {
            tracing::debug!(slot = index, "save skipped: layout has no enabled widgets");
            return Ok(Outcome::Unchanged(NoOp::NothingEnabled));
        }
        self.write(index, layout, preset_type, name, description)
    }

    /// Store a preset with an empty layout at `index`.
    pub fn create_blank(&mut self, index: usize, preset_type: PresetType) -> Result<Outcome> {
        check_index(index)?;
        self.write(index, &[], preset_type, None, None)
    }

    fn write(
        &mut self,
        index: usize,
        layout: &[WidgetPlacement],
        preset_type: PresetType,
        name: Option<String>,
        description: Option<String>,
    ) -> Result<Outcome> {
        let mut seen = std::collections::HashSet::new();
        if let Some(dup) = layout.iter().find(|p| !seen.insert(p.id.as_str())) {
            return Err(PresetError::DuplicatePlacement { id: dup.id.clone() });
        }
        let enabled = crate::model::enabled_count(layout);
        if preset_type == PresetType::Fullscreen && enabled > 1 {
            return Err(PresetError::FullscreenOverflow { enabled });
        }
        let now = self.clock.timestamp();
        let created_at = match &self.cells[index] {
            Some(existing) => existing.created_at.clone(),
            None => Some(now.clone()),
        };
        let name =
            normalize_text(name).unwrap_or_else(|| self.namer.generate_name(layout));
        self.cells[index] = Some(Preset {
            preset_type,
            layout: layout.to_vec(),
            name: Some(name),
            description: normalize_text(description),
            created_at,
            updated_at: Some(now),
        });
        tracing::info!(slot = index, preset_type = %preset_type, widgets = enabled, "preset saved");
        Ok(Outcome::Changed)
    }

    /// Edit name/description in place. The layout and `createdAt` are kept.
    pub fn update(&mut self, index: usize, fields: PresetFields) -> Result<Outcome> {
        check_index(index)?;
        if fields.is_empty() {
            return Ok(Outcome::Unchanged(NoOp::AlreadyInState));
        }
        let now = self.clock.timestamp();
        let Some(preset) = self.cells[index].as_mut() else {
            return Ok(Outcome::Unchanged(NoOp::SlotEmpty));
        };
        if let Some(name) = fields.name {
            preset.name = normalize_text(Some(name));
        }
        if let Some(description) = fields.description {
            preset.description = normalize_text(Some(description));
        }
        preset.updated_at = Some(now);
        tracing::info!(slot = index, "preset metadata updated");
        Ok(Outcome::Changed)
    }

    /// Reset the cell to `null`. Clearing the session cursor is up to the caller.
    pub fn clear(&mut self, index: usize) -> Result<Outcome> {
        check_index(index)?;
        if self.cells[index].take().is_none() {
            return Ok(Outcome::Unchanged(NoOp::AlreadyInState));
        }
        tracing::info!(slot = index, "preset cleared");
        Ok(Outcome::Changed)
    }

    /// Copy the preset at `source` into the first vacant cell. Returns the
    /// target index, or `None` when there is nothing to copy or no room.
    pub fn duplicate(&mut self, source: usize) -> Result<Option<usize>> {
        check_index(source)?;
        let Some(original) = self.cells[source].as_ref() else {
            return Ok(None);
        };
        let Some(target) = self.first_vacant() else {
            tracing::debug!(slot = source, "duplicate skipped: no vacant slot");
            return Ok(None);
        };
        let now = self.clock.timestamp();
        let base = original
            .name
            .clone()
            .unwrap_or_else(|| self.namer.generate_name(&original.layout));
        let copy = Preset {
            name: Some(format!("{base} (copy)")),
            created_at: Some(now.clone()),
            updated_at: Some(now),
            ..original.clone()
        };
        self.cells[target] = Some(copy);
        tracing::info!(source, target, "preset duplicated");
        Ok(Some(target))
    }

    /// Replace a cell without touching timestamps. Used when loading from storage.
    pub fn restore(&mut self, index: usize, preset: Option<Preset>) -> Result<()> {
        self.cells[check_index(index)?] = preset;
        Ok(())
    }

    /// Repair invariants of presets read from storage. Unknown widget types
    /// are dropped when a catalog is given.
    pub fn sanitize(&mut self, catalog: Option<&dyn WidgetCatalog>) -> Vec<String> {
        let mut warnings = Vec::new();
        for (index, cell) in self.cells.iter_mut().enumerate() {
            let Some(preset) = cell.as_mut() else {
                continue;
            };
            for id in preset.dedupe_placements() {
                tracing::warn!(slot = index, widget = %id, "duplicate placement dropped");
                warnings.push(format!("slot {index}: duplicate placement '{id}' dropped"));
            }
            if let Some(catalog) = catalog {
                preset.layout.retain(|p| {
                    if catalog.contains(&p.id) {
                        return true;
                    }
                    tracing::warn!(slot = index, widget = %p.id, "unknown widget dropped");
                    warnings.push(format!("slot {index}: unknown widget '{}' dropped", p.id));
                    false
                });
            }
            let disabled = preset.enforce_fullscreen();
            if disabled > 0 {
                tracing::warn!(slot = index, disabled, "fullscreen preset had extra widgets");
                warnings.push(format!(
                    "slot {index}: fullscreen preset kept one widget, disabled {disabled}"
                ));
            }
        }
        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::model::Rect;
    use chrono::TimeZone;

    fn slots() -> (PresetSlots, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(
            chrono::Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        ));
        let slots = PresetSlots::new(clock.clone(), Arc::new(WidgetListNameGenerator::default()));
        (slots, clock)
    }

    fn layout() -> Vec<WidgetPlacement> {
        vec![
            WidgetPlacement::new("clock", Rect::new(0, 0, 2, 1)).with_display_name("Clock"),
            WidgetPlacement::new("notes", Rect::new(2, 0, 2, 2)).disabled(),
        ]
    }

    #[test]
    fn out_of_range_index_is_an_error() {
        let (mut slots, _) = slots();
        assert_eq!(
            slots.get(9).unwrap_err(),
            PresetError::InvalidIndex { index: 9 }
        );
        assert!(slots.save(42, &layout(), PresetType::Grid, None, None).is_err());
        assert!(slots.clear(SLOT_COUNT).is_err());
    }

    #[test]
    fn created_at_only_set_on_first_save() {
        let (mut slots, clock) = slots();
        slots.save(0, &layout(), PresetType::Grid, None, None).unwrap();
        let first = slots.get(0).unwrap().unwrap().clone();
        assert_eq!(first.created_at.as_deref(), Some("2024-05-01T12:00:00.000Z"));
        assert_eq!(first.name.as_deref(), Some("Clock"));

        clock.advance(chrono::Duration::minutes(5));
        slots
            .save(0, &layout(), PresetType::Grid, Some("Mine".into()), None)
            .unwrap();
        let second = slots.get(0).unwrap().unwrap();
        assert_eq!(second.created_at, first.created_at);
        assert_eq!(second.updated_at.as_deref(), Some("2024-05-01T12:05:00.000Z"));
        assert_eq!(second.name.as_deref(), Some("Mine"));
    }

    #[test]
    fn fullscreen_rejects_multiple_enabled() {
        let (mut slots, _) = slots();
        let mut two = layout();
        two[1].enabled = true;
        assert_eq!(
            slots.save(1, &two, PresetType::Fullscreen, None, None),
            Err(PresetError::FullscreenOverflow { enabled: 2 })
        );
        assert!(slots.is_vacant(1).unwrap());
    }

    #[test]
    fn blank_preset_counts_as_empty() {
        let (mut slots, _) = slots();
        slots.create_blank(3, PresetType::Grid).unwrap();
        assert!(!slots.is_vacant(3).unwrap());
        assert!(slots.is_empty(3).unwrap());
        assert!(slots.non_empty_indices().is_empty());
    }

    #[test]
    fn update_keeps_layout_and_created_at() {
        let (mut slots, clock) = slots();
        slots.save(2, &layout(), PresetType::Grid, None, Some("desc".into())).unwrap();
        clock.advance(chrono::Duration::seconds(1));
        let outcome = slots
            .update(2, PresetFields::name("Morning").with_description(""))
            .unwrap();
        assert_eq!(outcome, Outcome::Changed);
        let preset = slots.get(2).unwrap().unwrap();
        assert_eq!(preset.name.as_deref(), Some("Morning"));
        assert_eq!(preset.description, None);
        assert_eq!(preset.layout, layout());
        assert_eq!(preset.created_at.as_deref(), Some("2024-05-01T12:00:00.000Z"));
        assert_eq!(preset.updated_at.as_deref(), Some("2024-05-01T12:00:01.000Z"));
        assert_eq!(
            slots.update(5, PresetFields::name("x")).unwrap(),
            Outcome::Unchanged(NoOp::SlotEmpty)
        );
    }

    #[test]
    fn duplicate_uses_first_vacant_slot() {
        let (mut slots, _) = slots();
        slots.save(0, &layout(), PresetType::Grid, None, None).unwrap();
        slots.save(1, &layout(), PresetType::Grid, None, None).unwrap();
        assert_eq!(slots.duplicate(0).unwrap(), Some(2));
        assert_eq!(
            slots.get(2).unwrap().unwrap().name.as_deref(),
            Some("Clock (copy)")
        );
        assert_eq!(slots.duplicate(7).unwrap(), None);
    }

    #[test]
    fn sanitize_repairs_loaded_presets() {
        let (mut slots, _) = slots();
        let preset = Preset {
            preset_type: PresetType::Fullscreen,
            layout: vec![
                WidgetPlacement::new("clock", Rect::default()),
                WidgetPlacement::new("clock", Rect::new(1, 1, 1, 1)),
                WidgetPlacement::new("radar", Rect::default()),
                WidgetPlacement::new("notes", Rect::default()),
            ],
            name: None,
            description: None,
            created_at: None,
            updated_at: None,
        };
        slots.restore(4, Some(preset)).unwrap();
        let catalog = crate::catalog::WidgetRegistry::from_definitions([
            crate::catalog::WidgetDefinition::new("clock", "Clock", "time", 2, 1),
            crate::catalog::WidgetDefinition::new("notes", "Notes", "text", 2, 2),
        ]);
        let warnings = slots.sanitize(Some(&catalog));
        assert_eq!(warnings.len(), 3);
        let repaired = slots.get(4).unwrap().unwrap();
        assert_eq!(repaired.layout.len(), 2);
        assert_eq!(repaired.enabled_count(), 1);
    }
}
