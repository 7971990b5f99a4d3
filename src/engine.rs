//! The facade the UI talks to. Owns the slots, the editing session, the
//! dialog and the auto-cycle scheduler, and writes every slot change through
//! to the preference store.

use crate::catalog::{CatalogFilter, WidgetCatalog};
use crate::clock::{Clock, SystemClock};
use crate::cycle::{AutoCycleConfig, AutoCycleScheduler, CycleSignal, CycleState};
use crate::dialog::{DialogChoice, DialogOutcome, PresetDialog};
use crate::error::{NoOp, Outcome, Result};
use crate::model::{PresetFields, PresetType, Rect, WidgetPlacement};
use crate::naming::WidgetListNameGenerator;
use crate::prefs::{mapping, PreferenceStore};
use crate::session::LayoutSession;
use crate::settings::{DirtyPolicy, Settings};
use crate::slots::PresetSlots;
use std::sync::Arc;
use std::time::Instant;

/// Why an auto-cycle advance did not load anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No selected slot currently holds a non-empty preset.
    NoTargets,
    /// The session has unsaved edits and the policy is `skip`.
    UnsavedChanges,
    /// The unsaved-changes warning was raised instead of loading.
    AwaitingConfirmation,
    /// A preset dialog is already open.
    DialogOpen,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresetEvent {
    Loaded { slot: usize },
    Saved { slot: usize },
    Updated { slot: usize },
    Cleared { slot: usize },
    Duplicated { source: usize, target: usize },
    CycleAdvanced { slot: usize },
    CycleSkipped { target: Option<usize>, reason: SkipReason },
    CycleStateChanged { state: CycleState },
}

pub type EventCallback = Arc<dyn Fn(PresetEvent) + Send + Sync>;

pub struct PresetEngine {
    slots: PresetSlots,
    session: LayoutSession,
    dialog: PresetDialog,
    scheduler: AutoCycleScheduler,
    store: Arc<dyn PreferenceStore>,
    catalog: Arc<dyn WidgetCatalog>,
    dirty_policy: DirtyPolicy,
    min_interval_secs: u64,
    load_warnings: Vec<String>,
    on_event: Option<EventCallback>,
}

impl std::fmt::Debug for PresetEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresetEngine")
            .field("slots", &self.slots)
            .field("session", &self.session)
            .field("dialog", &self.dialog)
            .field("scheduler", &self.scheduler)
            .field("dirty_policy", &self.dirty_policy)
            .finish_non_exhaustive()
    }
}

impl PresetEngine {
    pub fn open(
        store: Arc<dyn PreferenceStore>,
        catalog: Arc<dyn WidgetCatalog>,
        settings: &Settings,
    ) -> Self {
        Self::open_with_clock(store, catalog, settings, Arc::new(SystemClock))
    }

    /// Load slots and the auto-cycle config from `store`. Anything that had
    /// to be repaired is listed in [`PresetEngine::load_warnings`].
    pub fn open_with_clock(
        store: Arc<dyn PreferenceStore>,
        catalog: Arc<dyn WidgetCatalog>,
        settings: &Settings,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let namer = Arc::new(WidgetListNameGenerator::new(settings.name_max_widgets));
        let mut slots = PresetSlots::new(clock, namer);
        let mut warnings = mapping::load_slots(store.as_ref(), &mut slots, Some(catalog.as_ref()));

        let (mut config, config_warnings) = mapping::load_auto_cycle(store.as_ref());
        warnings.extend(config_warnings);
        let before = config.clone();
        warnings.extend(config.sanitize(&slots, settings.min_interval_secs));
        if config != before {
            mapping::persist_auto_cycle(store.as_ref(), &config);
        }
        for warning in &warnings {
            tracing::warn!("{warning}");
        }
        tracing::info!(
            presets = slots.non_empty_indices().len(),
            auto_cycle = config.enabled,
            "preset engine ready"
        );

        Self {
            slots,
            session: LayoutSession::new(),
            dialog: PresetDialog::new(),
            scheduler: AutoCycleScheduler::new(config),
            store,
            catalog,
            dirty_policy: settings.auto_cycle_dirty_policy,
            min_interval_secs: settings.min_interval_secs,
            load_warnings: warnings,
            on_event: None,
        }
    }

    pub fn set_event_callback(&mut self, callback: EventCallback) {
        self.on_event = Some(callback);
    }

    pub fn slots(&self) -> &PresetSlots {
        &self.slots
    }

    pub fn session(&self) -> &LayoutSession {
        &self.session
    }

    /// The working layout for direct drag/resize edits by the grid view.
    pub fn working_layout_mut(&mut self) -> &mut Vec<WidgetPlacement> {
        self.session.working_layout_mut()
    }

    pub fn dialog(&self) -> &PresetDialog {
        &self.dialog
    }

    pub fn auto_cycle_config(&self) -> &AutoCycleConfig {
        self.scheduler.config()
    }

    pub fn cycle_state(&self) -> CycleState {
        self.scheduler.state()
    }

    pub fn load_warnings(&self) -> &[String] {
        &self.load_warnings
    }

    pub fn dirty_policy(&self) -> DirtyPolicy {
        self.dirty_policy
    }

    pub fn set_dirty_policy(&mut self, policy: DirtyPolicy) {
        self.dirty_policy = policy;
    }

    fn emit(&self, event: PresetEvent) {
        tracing::trace!(?event, "preset event");
        if let Some(callback) = &self.on_event {
            callback(event);
        }
    }

    fn persist_slot(&self, index: usize) {
        mapping::persist_slot(self.store.as_ref(), &self.slots, index);
    }

    pub fn is_dirty(&self) -> bool {
        self.session.is_dirty(&self.slots)
    }

    pub fn load_preset(&mut self, index: usize) -> Result<Outcome> {
        let outcome = self.session.load_from(&self.slots, index)?;
        if outcome.is_changed() {
            self.emit(PresetEvent::Loaded { slot: index });
        }
        Ok(outcome)
    }

    pub fn save_preset(
        &mut self,
        index: usize,
        layout: &[WidgetPlacement],
        preset_type: PresetType,
        name: Option<String>,
        description: Option<String>,
    ) -> Result<Outcome> {
        let outcome = self
            .slots
            .save(index, layout, preset_type, name, description)?;
        if outcome.is_changed() {
            self.persist_slot(index);
            self.emit(PresetEvent::Saved { slot: index });
        }
        Ok(outcome)
    }

    /// Save the working layout into `index` and point the cursor at it.
    pub fn save_working_layout(
        &mut self,
        index: usize,
        preset_type: PresetType,
        name: Option<String>,
        description: Option<String>,
    ) -> Result<Outcome> {
        let layout = self.session.working_layout().to_vec();
        let outcome = self.save_preset(index, &layout, preset_type, name, description)?;
        if outcome.is_changed() {
            self.session.set_active_preset_index(Some(index))?;
        }
        Ok(outcome)
    }

    pub fn update_preset(&mut self, index: usize, fields: PresetFields) -> Result<Outcome> {
        let outcome = self.slots.update(index, fields)?;
        if outcome.is_changed() {
            self.persist_slot(index);
            self.emit(PresetEvent::Updated { slot: index });
        }
        Ok(outcome)
    }

    /// Empty the slot, drop the cursor and the auto-cycle selection entry
    /// pointing at it, and close a prompt aimed at it.
    pub fn clear_preset(&mut self, index: usize) -> Result<Outcome> {
        let outcome = self.slots.clear(index)?;
        if !outcome.is_changed() {
            return Ok(outcome);
        }
        self.persist_slot(index);
        if self.session.forget_preset(index) {
            tracing::debug!(slot = index, "active preset cleared");
        }
        if self.dialog.state().slot() == Some(index) {
            self.dialog.close();
        }
        let mut config = self.scheduler.config().clone();
        let before = config.selected_indices.len();
        config.selected_indices.retain(|&i| i != index);
        if config.selected_indices.len() != before {
            mapping::persist_auto_cycle(self.store.as_ref(), &config);
            self.scheduler.set_selection(config.selected_indices);
        }
        self.emit(PresetEvent::Cleared { slot: index });
        Ok(outcome)
    }

    pub fn duplicate_preset(&mut self, index: usize) -> Result<Option<usize>> {
        let target = self.slots.duplicate(index)?;
        if let Some(target) = target {
            self.persist_slot(target);
            self.emit(PresetEvent::Duplicated {
                source: index,
                target,
            });
        }
        Ok(target)
    }

    pub fn toggle_widget(&mut self, id: &str) -> Result<Outcome> {
        self.session.toggle_widget(id, self.catalog.as_ref())
    }

    pub fn move_widget(&mut self, id: &str, rect: Rect) -> Result<Outcome> {
        self.session.move_widget(id, rect)
    }

    pub fn select_all_visible(&mut self, filter: &CatalogFilter) -> usize {
        self.session.select_all_visible(self.catalog.as_ref(), filter)
    }

    pub fn deselect_all_visible(&mut self, filter: &CatalogFilter) -> usize {
        self.session
            .deselect_all_visible(self.catalog.as_ref(), filter)
    }

    pub fn invert_selection(&mut self, filter: &CatalogFilter) -> usize {
        self.session.invert_selection(self.catalog.as_ref(), filter)
    }

    pub fn clear_all(&mut self, filter: &CatalogFilter) -> usize {
        self.session.clear_all(self.catalog.as_ref(), filter)
    }

    pub fn slot_activated(&mut self, slot: usize) -> Result<DialogOutcome> {
        let outcome = self
            .dialog
            .slot_activated(slot, &self.slots, &mut self.session)?;
        self.after_dialog(outcome);
        Ok(outcome)
    }

    pub fn slot_save_requested(&mut self, slot: usize) -> Result<DialogOutcome> {
        self.dialog.slot_save_requested(slot, &self.slots)
    }

    pub fn choose(&mut self, choice: DialogChoice) -> Result<DialogOutcome> {
        let outcome = self
            .dialog
            .choose(choice, &mut self.slots, &mut self.session)?;
        self.after_dialog(outcome);
        Ok(outcome)
    }

    fn after_dialog(&self, outcome: DialogOutcome) {
        match outcome {
            DialogOutcome::Loaded { slot } => self.emit(PresetEvent::Loaded { slot }),
            DialogOutcome::Created { slot } | DialogOutcome::Saved { slot } => {
                self.persist_slot(slot);
                self.emit(PresetEvent::Saved { slot });
            }
            _ => {}
        }
    }

    fn track_state<F>(&mut self, f: F) -> Outcome
    where
        F: FnOnce(&mut AutoCycleScheduler) -> Outcome,
    {
        let before = self.scheduler.state();
        let outcome = f(&mut self.scheduler);
        let after = self.scheduler.state();
        if before != after {
            self.emit(PresetEvent::CycleStateChanged { state: after });
        }
        outcome
    }

    pub fn start_auto_cycle(&mut self, now: Instant) -> Outcome {
        self.track_state(|s| s.start(now))
    }

    pub fn stop_auto_cycle(&mut self) -> Outcome {
        self.track_state(|s| s.stop())
    }

    pub fn notify_interaction(&mut self, now: Instant) -> Outcome {
        self.track_state(|s| s.notify_interaction(now))
    }

    /// Sanitize, persist and apply a new auto-cycle configuration. An
    /// enabled config starts a stopped scheduler; a paused one keeps waiting
    /// for its resume delay. Returns what was repaired.
    pub fn set_auto_cycle_config(&mut self, mut config: AutoCycleConfig, now: Instant) -> Vec<String> {
        let warnings = config.sanitize(&self.slots, self.min_interval_secs);
        mapping::persist_auto_cycle(self.store.as_ref(), &config);
        let enabled = config.enabled;
        self.track_state(|s| {
            s.set_config(config, now);
            if enabled && s.state() == CycleState::Stopped {
                s.start(now)
            } else {
                Outcome::Changed
            }
        });
        warnings
    }

    /// Fire due timers. Call from the host loop, at the latest by
    /// [`PresetEngine::next_deadline`].
    pub fn poll(&mut self, now: Instant) -> Vec<PresetEvent> {
        let mut events = Vec::new();
        let before = self.scheduler.state();
        let signal = self.scheduler.poll(now);
        if self.scheduler.state() != before {
            events.push(PresetEvent::CycleStateChanged {
                state: self.scheduler.state(),
            });
        }
        if signal == Some(CycleSignal::Advance) {
            events.push(self.advance());
        }
        for event in &events {
            self.emit(event.clone());
        }
        events
    }

    fn advance(&mut self) -> PresetEvent {
        let current = self.session.active_preset_index();
        let Some(target) = self.scheduler.next_target(&self.slots, current) else {
            tracing::debug!(reason = ?NoOp::NoCycleTargets, "auto-cycle advance idle");
            return PresetEvent::CycleSkipped {
                target: None,
                reason: SkipReason::NoTargets,
            };
        };
        let skipped = |reason| PresetEvent::CycleSkipped {
            target: Some(target),
            reason,
        };
        if self.dialog.is_open() {
            return skipped(SkipReason::DialogOpen);
        }
        if self.is_dirty() {
            match self.dirty_policy {
                DirtyPolicy::Skip => {
                    tracing::debug!(slot = target, "auto-cycle skipped: unsaved changes");
                    return skipped(SkipReason::UnsavedChanges);
                }
                DirtyPolicy::Prompt => {
                    return match self
                        .dialog
                        .slot_activated(target, &self.slots, &mut self.session)
                    {
                        Ok(DialogOutcome::Loaded { slot }) => PresetEvent::CycleAdvanced { slot },
                        Ok(_) => skipped(SkipReason::AwaitingConfirmation),
                        Err(err) => {
                            tracing::warn!(error = %err, "auto-cycle prompt failed");
                            skipped(SkipReason::NoTargets)
                        }
                    };
                }
                DirtyPolicy::Discard => {
                    tracing::info!(slot = target, "auto-cycle discarding unsaved changes");
                }
            }
        }
        match self.session.load_from(&self.slots, target) {
            Ok(Outcome::Changed) => PresetEvent::CycleAdvanced { slot: target },
            Ok(Outcome::Unchanged(_)) => skipped(SkipReason::NoTargets),
            Err(err) => {
                tracing::warn!(error = %err, "auto-cycle load failed");
                skipped(SkipReason::NoTargets)
            }
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.next_deadline()
    }

    /// Cancel both auto-cycle timers for good.
    pub fn dispose(&mut self) {
        self.track_state(|s| {
            s.dispose();
            Outcome::Changed
        });
    }

    /// Blocking flush of the preference store.
    pub fn force_sync(&self) -> anyhow::Result<()> {
        self.store.force_sync()
    }
}
