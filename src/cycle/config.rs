use crate::slots::{PresetSlots, SLOT_COUNT};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Upper bound for both the cycle interval and the resume delay.
pub const MAX_DELAY_SECS: u64 = 24 * 60 * 60;

fn default_interval_seconds() -> u64 {
    60
}

fn default_pause_on_interaction() -> bool {
    true
}

fn default_resume_delay_seconds() -> u64 {
    30
}

/// Persisted auto-cycle settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoCycleConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_interval_seconds")]
    pub interval_seconds: u64,
    #[serde(default)]
    pub selected_indices: Vec<usize>,
    #[serde(default = "default_pause_on_interaction")]
    pub pause_on_interaction: bool,
    #[serde(default = "default_resume_delay_seconds")]
    pub resume_delay_seconds: u64,
}

impl Default for AutoCycleConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_seconds: default_interval_seconds(),
            selected_indices: Vec::new(),
            pause_on_interaction: default_pause_on_interaction(),
            resume_delay_seconds: default_resume_delay_seconds(),
        }
    }
}

impl AutoCycleConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds.clamp(1, MAX_DELAY_SECS))
    }

    pub fn resume_delay(&self) -> Duration {
        Duration::from_secs(self.resume_delay_seconds.clamp(1, MAX_DELAY_SECS))
    }

    /// Sort and de-duplicate the selection, drop indices that are out of
    /// range or point at empty slots, and clamp the intervals.
    pub fn sanitize(&mut self, slots: &PresetSlots, min_interval_secs: u64) -> Vec<String> {
        let mut warnings = Vec::new();
        let before = self.selected_indices.clone();
        self.selected_indices.sort_unstable();
        self.selected_indices.dedup();
        self.selected_indices
            .retain(|&i| i < SLOT_COUNT && matches!(slots.is_empty(i), Ok(false)));
        if self.selected_indices != before {
            tracing::debug!(?before, after = ?self.selected_indices, "auto-cycle selection normalized");
            if before.iter().any(|i| !self.selected_indices.contains(i)) {
                warnings.push("auto-cycle selection dropped empty or invalid slots".to_string());
            }
        }
        let min_interval = min_interval_secs.max(1);
        if self.interval_seconds < min_interval {
            warnings.push(format!(
                "auto-cycle interval raised from {}s to {min_interval}s",
                self.interval_seconds
            ));
            self.interval_seconds = min_interval;
        }
        let max_interval = MAX_DELAY_SECS.max(min_interval);
        if self.interval_seconds > max_interval {
            warnings.push(format!(
                "auto-cycle interval lowered from {}s to {max_interval}s",
                self.interval_seconds
            ));
            self.interval_seconds = max_interval;
        }
        self.resume_delay_seconds = self.resume_delay_seconds.clamp(1, MAX_DELAY_SECS);
        warnings
    }
}

/// Next slot to show: the entry after `current` among the selected,
/// non-empty slots in ascending order, wrapping around. Starts from the
/// first entry when `current` is `None` or not in the list.
pub fn next_cycle_index(
    selected: &[usize],
    slots: &PresetSlots,
    current: Option<usize>,
) -> Option<usize> {
    let mut targets: Vec<usize> = selected
        .iter()
        .copied()
        .filter(|&i| matches!(slots.is_empty(i), Ok(false)))
        .collect();
    targets.sort_unstable();
    targets.dedup();
    if targets.is_empty() {
        return None;
    }
    let next = match current.and_then(|c| targets.iter().position(|&t| t == c)) {
        Some(pos) => (pos + 1) % targets.len(),
        None => 0,
    };
    Some(targets[next])
}
