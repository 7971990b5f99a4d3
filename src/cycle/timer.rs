use std::time::{Duration, Instant};

/// A cancellable deadline, either one-shot or repeating. Fires only when
/// polled, so cancelling it guarantees no callback runs afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timer {
    deadline: Option<Instant>,
    period: Option<Duration>,
}

impl Timer {
    /// A delay too large to represent leaves the timer unarmed.
    pub fn arm_once(&mut self, now: Instant, delay: Duration) {
        self.deadline = now.checked_add(delay);
        self.period = None;
    }

    pub fn arm_repeating(&mut self, now: Instant, period: Duration) {
        self.deadline = now.checked_add(period);
        self.period = self.deadline.map(|_| period);
    }

    /// Returns whether the timer was armed.
    pub fn cancel(&mut self) -> bool {
        self.period = None;
        self.deadline.take().is_some()
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Consume a due deadline. A repeating timer re-arms from `now`, so a
    /// late poll fires once instead of catching up.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = self.period.and_then(|period| now.checked_add(period));
                if self.deadline.is_none() {
                    self.period = None;
                }
                true
            }
            _ => false,
        }
    }
}
