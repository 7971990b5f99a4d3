use crate::catalog::{CatalogFilter, WidgetCatalog, WidgetDefinition};
use crate::error::{NoOp, Outcome, PresetError, Result};
use crate::model::{enabled_count, enabled_fingerprint, Rect, WidgetPlacement};
use crate::slots::{check_index, PresetSlots};
use std::collections::BTreeSet;

fn placement_from_definition(id: &str, def: &WidgetDefinition) -> WidgetPlacement {
    let mut placement = WidgetPlacement::new(
        id,
        Rect::new(0, 0, def.default_size.w, def.default_size.h),
    )
    .with_display_name(def.title.clone());
    if !def.category.is_empty() {
        placement.category = Some(def.category.clone());
    }
    if !def.description.is_empty() {
        placement.description = Some(def.description.clone());
    }
    placement
}

/// The layout the user is editing plus the slot it was loaded from.
///
/// `active_preset_index` records provenance only. Editing the working layout
/// leaves it in place, which is what makes the session dirty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutSession {
    working_layout: Vec<WidgetPlacement>,
    active_preset_index: Option<usize>,
}

impl LayoutSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layout(layout: Vec<WidgetPlacement>) -> Self {
        Self {
            working_layout: layout,
            active_preset_index: None,
        }
    }

    pub fn working_layout(&self) -> &[WidgetPlacement] {
        &self.working_layout
    }

    /// Direct access for the grid view (drag/resize).
    pub fn working_layout_mut(&mut self) -> &mut Vec<WidgetPlacement> {
        &mut self.working_layout
    }

    pub fn active_preset_index(&self) -> Option<usize> {
        self.active_preset_index
    }

    pub fn set_active_preset_index(&mut self, index: Option<usize>) -> Result<()> {
        if let Some(index) = index {
            check_index(index)?;
        }
        self.active_preset_index = index;
        Ok(())
    }

    /// Drop the cursor if it points at `index`. Returns whether it did.
    pub fn forget_preset(&mut self, index: usize) -> bool {
        if self.active_preset_index == Some(index) {
            self.active_preset_index = None;
            true
        } else {
            false
        }
    }

    pub fn enabled_count(&self) -> usize {
        enabled_count(&self.working_layout)
    }

    pub fn enabled_ids(&self) -> Vec<&str> {
        self.working_layout
            .iter()
            .filter(|p| p.enabled)
            .map(|p| p.id.as_str())
            .collect()
    }

    /// Unsaved work exists when nothing was loaded and some widget is enabled,
    /// or when the enabled widgets (id and cell) differ from the source preset.
    pub fn is_dirty(&self, slots: &PresetSlots) -> bool {
        let source = self
            .active_preset_index
            .and_then(|index| slots.get(index).ok().flatten());
        match source {
            Some(preset) => {
                enabled_fingerprint(&self.working_layout) != enabled_fingerprint(&preset.layout)
            }
            None => self.enabled_count() > 0,
        }
    }

    /// Replace the working layout with a copy of the preset at `index`.
    pub fn load_from(&mut self, slots: &PresetSlots, index: usize) -> Result<Outcome> {
        let Some(preset) = slots.get(index)? else {
            return Ok(Outcome::Unchanged(NoOp::SlotEmpty));
        };
        if preset.is_empty() {
            return Ok(Outcome::Unchanged(NoOp::SlotEmpty));
        }
        self.working_layout = preset.layout.clone();
        self.active_preset_index = Some(index);
        tracing::info!(slot = index, widgets = preset.enabled_count(), "preset loaded");
        Ok(Outcome::Changed)
    }

    pub fn clear_working_layout(&mut self) {
        self.working_layout.clear();
    }

    /// Flip a placed widget, or place it with catalog defaults when absent.
    /// Flipping keeps the former position so re-enabling restores it.
    pub fn toggle_widget(&mut self, id: &str, catalog: &dyn WidgetCatalog) -> Result<Outcome> {
        if let Some(placement) = self.working_layout.iter_mut().find(|p| p.id == id) {
            placement.enabled = !placement.enabled;
            tracing::debug!(widget = %id, enabled = placement.enabled, "widget toggled");
            return Ok(Outcome::Changed);
        }
        let def = catalog.get(id).ok_or_else(|| PresetError::UnknownWidget {
            id: id.to_string(),
        })?;
        self.working_layout.push(placement_from_definition(id, &def));
        tracing::debug!(widget = %id, "widget placed with default size");
        Ok(Outcome::Changed)
    }

    pub fn move_widget(&mut self, id: &str, rect: Rect) -> Result<Outcome> {
        let placement = self
            .working_layout
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| PresetError::UnknownWidget { id: id.to_string() })?;
        if placement.rect() == rect {
            return Ok(Outcome::Unchanged(NoOp::AlreadyInState));
        }
        placement.set_rect(rect);
        Ok(Outcome::Changed)
    }

    /// Enable every widget matching `filter`, placing the missing ones.
    /// Returns the number of placements changed or added.
    pub fn select_all_visible(
        &mut self,
        catalog: &dyn WidgetCatalog,
        filter: &CatalogFilter,
    ) -> usize {
        let visible = filter.filtered_ids(catalog);
        let mut changed = 0;
        for placement in self.visible_mut(&visible) {
            if !placement.enabled {
                placement.enabled = true;
                changed += 1;
            }
        }
        changed + self.place_missing(catalog, &visible)
    }

    pub fn deselect_all_visible(
        &mut self,
        catalog: &dyn WidgetCatalog,
        filter: &CatalogFilter,
    ) -> usize {
        let visible = filter.filtered_ids(catalog);
        let mut changed = 0;
        for placement in self.visible_mut(&visible) {
            if placement.enabled {
                placement.enabled = false;
                changed += 1;
            }
        }
        changed
    }

    /// Flip every matching placement; matching widgets not yet placed are
    /// added enabled.
    pub fn invert_selection(
        &mut self,
        catalog: &dyn WidgetCatalog,
        filter: &CatalogFilter,
    ) -> usize {
        let visible = filter.filtered_ids(catalog);
        let mut changed = 0;
        for placement in self.visible_mut(&visible) {
            placement.enabled = !placement.enabled;
            changed += 1;
        }
        changed + self.place_missing(catalog, &visible)
    }

    /// Remove matching placements entirely, forgetting their positions.
    pub fn clear_all(&mut self, catalog: &dyn WidgetCatalog, filter: &CatalogFilter) -> usize {
        let visible = filter.filtered_ids(catalog);
        let before = self.working_layout.len();
        self.working_layout
            .retain(|p| !visible.contains(p.widget_type()));
        before - self.working_layout.len()
    }

    fn visible_mut<'a>(
        &'a mut self,
        visible: &'a BTreeSet<String>,
    ) -> impl Iterator<Item = &'a mut WidgetPlacement> + 'a {
        self.working_layout
            .iter_mut()
            .filter(move |p| visible.contains(p.widget_type()))
    }

    fn place_missing(&mut self, catalog: &dyn WidgetCatalog, visible: &BTreeSet<String>) -> usize {
        let placed: BTreeSet<String> = self
            .working_layout
            .iter()
            .map(|p| p.widget_type().to_string())
            .collect();
        let mut added = 0;
        for ty in visible.difference(&placed) {
            if let Some(def) = catalog.get(ty) {
                self.working_layout.push(placement_from_definition(ty, &def));
                added += 1;
            }
        }
        added
    }
}
