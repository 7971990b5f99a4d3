//! Slot dialog flow.
//!
//! A click on a slot either loads it, prompts to create a preset in an empty
//! slot, or warns about unsaved changes. A save request prompts for the
//! preset type, or asks to confirm an overwrite. Every terminal choice
//! returns the dialog to [`DialogState::Idle`].

use crate::error::{NoOp, Outcome, Result};
use crate::model::PresetType;
use crate::session::LayoutSession;
use crate::slots::{check_index, PresetSlots};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DialogState {
    #[default]
    Idle,
    EmptySlotPrompt {
        slot: usize,
    },
    SaveTypePrompt {
        slot: usize,
    },
    OverwriteConfirm {
        slot: usize,
    },
    UnsavedChangesWarning {
        slot: usize,
    },
}

impl DialogState {
    pub fn slot(&self) -> Option<usize> {
        match *self {
            DialogState::Idle => None,
            DialogState::EmptySlotPrompt { slot }
            | DialogState::SaveTypePrompt { slot }
            | DialogState::OverwriteConfirm { slot }
            | DialogState::UnsavedChangesWarning { slot } => Some(slot),
        }
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, DialogState::Idle)
    }
}

/// User answer to the open prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogChoice {
    /// Empty slot: create a blank preset and clear the working layout.
    StartEmpty,
    /// Empty slot: snapshot the working layout as a grid preset.
    CopyCurrent,
    /// Unsaved warning: drop the edits and load the clicked slot.
    DiscardAndLoad,
    /// Unsaved warning: close without changes.
    KeepEditing,
    /// Save-type prompt or overwrite confirmation.
    Save {
        preset_type: PresetType,
        name: Option<String>,
        description: Option<String>,
    },
    Cancel,
}

impl DialogChoice {
    pub fn save(preset_type: PresetType) -> Self {
        DialogChoice::Save {
            preset_type,
            name: None,
            description: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogOutcome {
    /// A prompt is now shown.
    Prompt(DialogState),
    Loaded { slot: usize },
    Created { slot: usize },
    Saved { slot: usize },
    /// Closed without changes.
    Closed,
    /// Nothing happened; the dialog stays as it was and shows the reason.
    Rejected(NoOp),
    /// The choice does not apply to the open prompt.
    Ignored,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresetDialog {
    state: DialogState,
    notice: Option<NoOp>,
}

impl PresetDialog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DialogState {
        self.state
    }

    /// Inline message for the last rejected choice.
    pub fn notice(&self) -> Option<NoOp> {
        self.notice
    }

    pub fn is_open(&self) -> bool {
        self.state.is_open()
    }

    pub fn close(&mut self) {
        self.transition(DialogState::Idle);
    }

    fn transition(&mut self, next: DialogState) {
        if self.state != next {
            tracing::debug!(from = ?self.state, to = ?next, "preset dialog transition");
        }
        self.state = next;
        self.notice = None;
    }

    /// A click on slot `slot`. Replaces any prompt already open.
    pub fn slot_activated(
        &mut self,
        slot: usize,
        slots: &PresetSlots,
        session: &mut LayoutSession,
    ) -> Result<DialogOutcome> {
        check_index(slot)?;
        if slots.is_empty(slot)? {
            self.transition(DialogState::EmptySlotPrompt { slot });
            return Ok(DialogOutcome::Prompt(self.state));
        }
        if session.is_dirty(slots) {
            self.transition(DialogState::UnsavedChangesWarning { slot });
            return Ok(DialogOutcome::Prompt(self.state));
        }
        self.transition(DialogState::Idle);
        Ok(Self::load(slot, slots, session)?)
    }

    /// An explicit save into `slot` (shift-click or save button).
    pub fn slot_save_requested(&mut self, slot: usize, slots: &PresetSlots) -> Result<DialogOutcome> {
        check_index(slot)?;
        let next = if slots.is_empty(slot)? {
            DialogState::SaveTypePrompt { slot }
        } else {
            DialogState::OverwriteConfirm { slot }
        };
        self.transition(next);
        Ok(DialogOutcome::Prompt(next))
    }

    pub fn choose(
        &mut self,
        choice: DialogChoice,
        slots: &mut PresetSlots,
        session: &mut LayoutSession,
    ) -> Result<DialogOutcome> {
        match (self.state, choice) {
            (DialogState::Idle, _) => Ok(DialogOutcome::Ignored),
            (_, DialogChoice::Cancel) => {
                self.transition(DialogState::Idle);
                Ok(DialogOutcome::Closed)
            }
            (DialogState::EmptySlotPrompt { slot }, DialogChoice::StartEmpty) => {
                slots.create_blank(slot, PresetType::Grid)?;
                session.clear_working_layout();
                session.set_active_preset_index(Some(slot))?;
                self.transition(DialogState::Idle);
                Ok(DialogOutcome::Created { slot })
            }
            (DialogState::EmptySlotPrompt { slot }, DialogChoice::CopyCurrent) => self.save(
                slot,
                PresetType::Grid,
                None,
                None,
                slots,
                session,
            ),
            (
                DialogState::SaveTypePrompt { slot } | DialogState::OverwriteConfirm { slot },
                DialogChoice::Save {
                    preset_type,
                    name,
                    description,
                },
            ) => self.save(slot, preset_type, name, description, slots, session),
            (DialogState::UnsavedChangesWarning { slot }, DialogChoice::DiscardAndLoad) => {
                self.transition(DialogState::Idle);
                Ok(Self::load(slot, slots, session)?)
            }
            (DialogState::UnsavedChangesWarning { .. }, DialogChoice::KeepEditing) => {
                self.transition(DialogState::Idle);
                Ok(DialogOutcome::Closed)
            }
            (state, choice) => {
                tracing::debug!(?state, ?choice, "dialog choice ignored");
                Ok(DialogOutcome::Ignored)
            }
        }
    }

    fn save(
        &mut self,
        slot: usize,
        preset_type: PresetType,
        name: Option<String>,
        description: Option<String>,
        slots: &mut PresetSlots,
        session: &mut LayoutSession,
    ) -> Result<DialogOutcome> {
        let outcome = slots.save(slot, session.working_layout(), preset_type, name, description)?;
        match outcome {
            Outcome::Changed => {
                session.set_active_preset_index(Some(slot))?;
                self.transition(DialogState::Idle);
                Ok(DialogOutcome::Saved { slot })
            }
            Outcome::Unchanged(reason) => {
                self.notice = Some(reason);
                Ok(DialogOutcome::Rejected(reason))
            }
        }
    }

    fn load(slot: usize, slots: &PresetSlots, session: &mut LayoutSession) -> Result<DialogOutcome> {
        Ok(match session.load_from(slots, slot)? {
            Outcome::Changed => DialogOutcome::Loaded { slot },
            Outcome::Unchanged(reason) => DialogOutcome::Rejected(reason),
        })
    }
}
