use super::config::{next_cycle_index, AutoCycleConfig};
use super::timer::Timer;
use crate::error::{NoOp, Outcome};
use crate::slots::PresetSlots;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Stopped,
    Running,
    Paused,
}

/// What a poll produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleSignal {
    /// The interval elapsed; the owner should advance to the next preset.
    Advance,
    /// The pause ended and the interval restarted.
    Resumed,
}

/// Drives preset rotation with two timers: the repeating advance interval
/// (armed while running) and the one-shot resume debounce (armed while
/// paused). Both are cancelled on stop and dispose.
#[derive(Debug)]
pub struct AutoCycleScheduler {
    config: AutoCycleConfig,
    state: CycleState,
    interval: Timer,
    resume: Timer,
    disposed: bool,
}

impl AutoCycleScheduler {
    pub fn new(config: AutoCycleConfig) -> Self {
        Self {
            config,
            state: CycleState::Stopped,
            interval: Timer::default(),
            resume: Timer::default(),
            disposed: false,
        }
    }

    pub fn config(&self) -> &AutoCycleConfig {
        &self.config
    }

    pub fn state(&self) -> CycleState {
        self.state
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Replace the selected slots without touching either timer.
    pub fn set_selection(&mut self, selected_indices: Vec<usize>) {
        self.config.selected_indices = selected_indices;
    }

    /// Apply new settings. Disabling stops the scheduler; a running
    /// scheduler restarts its interval when the period changed.
    pub fn set_config(&mut self, config: AutoCycleConfig, now: Instant) {
        let interval_changed = config.interval_seconds != self.config.interval_seconds;
        self.config = config;
        if !self.config.enabled {
            self.stop();
            return;
        }
        match self.state {
            CycleState::Running if interval_changed => {
                self.interval.arm_repeating(now, self.config.interval());
            }
            CycleState::Paused if !self.config.pause_on_interaction => {
                self.resume_at(now);
            }
            _ => {}
        }
    }

    pub fn start(&mut self, now: Instant) -> Outcome {
        if self.disposed || !self.config.enabled {
            return Outcome::Unchanged(NoOp::AlreadyInState);
        }
        if self.state == CycleState::Running {
            return Outcome::Unchanged(NoOp::AlreadyInState);
        }
        self.resume_at(now);
        Outcome::Changed
    }

    pub fn stop(&mut self) -> Outcome {
        let had_timer = self.interval.cancel() | self.resume.cancel();
        if self.state == CycleState::Stopped && !had_timer {
            return Outcome::Unchanged(NoOp::AlreadyInState);
        }
        self.set_state(CycleState::Stopped);
        Outcome::Changed
    }

    /// User interaction: pause while running, or push back the resume while
    /// already paused.
    pub fn notify_interaction(&mut self, now: Instant) -> Outcome {
        if !self.config.pause_on_interaction {
            return Outcome::Unchanged(NoOp::AlreadyInState);
        }
        match self.state {
            CycleState::Stopped => Outcome::Unchanged(NoOp::AlreadyInState),
            CycleState::Running => {
                self.interval.cancel();
                self.resume.arm_once(now, self.config.resume_delay());
                self.set_state(CycleState::Paused);
                Outcome::Changed
            }
            CycleState::Paused => {
                self.resume.arm_once(now, self.config.resume_delay());
                tracing::trace!("auto-cycle resume postponed");
                Outcome::Changed
            }
        }
    }

    /// Fire whichever timer is due at `now`.
    pub fn poll(&mut self, now: Instant) -> Option<CycleSignal> {
        match self.state {
            CycleState::Stopped => None,
            CycleState::Paused => {
                if self.resume.fire_if_due(now) {
                    self.resume_at(now);
                    Some(CycleSignal::Resumed)
                } else {
                    None
                }
            }
            CycleState::Running => self
                .interval
                .fire_if_due(now)
                .then_some(CycleSignal::Advance),
        }
    }

    /// Target of the next advance given the current slots and cursor.
    pub fn next_target(&self, slots: &PresetSlots, current: Option<usize>) -> Option<usize> {
        next_cycle_index(&self.config.selected_indices, slots, current)
    }

    /// Earliest armed deadline, for scheduling the next poll.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.interval.deadline(), self.resume.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Tear down: cancel both timers and refuse to start again.
    pub fn dispose(&mut self) {
        self.stop();
        self.disposed = true;
    }

    fn resume_at(&mut self, now: Instant) {
        self.resume.cancel();
        self.interval.arm_repeating(now, self.config.interval());
        self.set_state(CycleState::Running);
    }

    fn set_state(&mut self, next: CycleState) {
        if self.state != next {
            tracing::debug!(from = ?self.state, to = ?next, "auto-cycle state changed");
            self.state = next;
        }
    }
}
