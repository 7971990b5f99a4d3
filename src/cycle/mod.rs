pub mod config;
pub mod scheduler;
pub mod timer;

pub use config::{next_cycle_index, AutoCycleConfig, MAX_DELAY_SECS};
pub use scheduler::{AutoCycleScheduler, CycleSignal, CycleState};
pub use timer::Timer;
