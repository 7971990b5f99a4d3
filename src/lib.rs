pub mod catalog;
pub mod clock;
pub mod common;
pub mod cycle;
pub mod dialog;
pub mod engine;
pub mod error;
pub mod logging;
pub mod model;
pub mod naming;
pub mod prefs;
pub mod session;
pub mod settings;
pub mod slots;

pub use catalog::{CatalogFilter, WidgetCatalog, WidgetDefinition, WidgetRegistry};
pub use cycle::{AutoCycleConfig, AutoCycleScheduler, CycleState};
pub use dialog::{DialogChoice, DialogOutcome, DialogState, PresetDialog};
pub use engine::{PresetEngine, PresetEvent, SkipReason};
pub use error::{NoOp, Outcome, PresetError};
pub use model::{Preset, PresetFields, PresetType, Rect, WidgetPlacement};
pub use prefs::{JsonFilePreferenceStore, MemoryPreferenceStore, PreferenceStore};
pub use session::LayoutSession;
pub use settings::{DirtyPolicy, Settings};
pub use slots::{PresetSlots, SLOT_COUNT};
