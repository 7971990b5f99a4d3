use thiserror::Error;

/// Invalid-input failures raised by the preset engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PresetError {
    #[error("preset slot index {index} is out of range 0..=8")]
    InvalidIndex { index: usize },
    #[error("a fullscreen preset holds at most one enabled widget, got {enabled}")]
    FullscreenOverflow { enabled: usize },
    #[error("widget '{id}' is placed more than once")]
    DuplicatePlacement { id: String },
    #[error("widget '{id}' is not in the catalog")]
    UnknownWidget { id: String },
    #[error("preferences changed underneath (expected version {expected}, found {actual})")]
    VersionConflict { expected: u64, actual: u64 },
}

/// Why an operation completed without changing any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoOp {
    /// Save requested with zero enabled widgets in the layout.
    NothingEnabled,
    /// Load requested from a slot with no enabled widgets.
    SlotEmpty,
    /// Auto-cycle advance found no selected, non-empty slot.
    NoCycleTargets,
    /// The target was already in the requested state.
    AlreadyInState,
}

/// Result signal for operations that may legitimately do nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Changed,
    Unchanged(NoOp),
}

impl Outcome {
    pub fn is_changed(self) -> bool {
        matches!(self, Outcome::Changed)
    }

    pub fn no_op(self) -> Option<NoOp> {
        match self {
            Outcome::Changed => None,
            Outcome::Unchanged(reason) => Some(reason),
        }
    }
}

pub type Result<T> = std::result::Result<T, PresetError>;
