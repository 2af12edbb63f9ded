// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Fixed and variable timestep scheduling.
//!
//! The scheduler is a pure state machine: it is fed one adjusted elapsed sample per
//! tick and answers how many update steps to run and how long each one is. It never
//! reads a clock or calls a system, which keeps the timing rules testable in
//! isolation.

use std::time::Duration;

/// Number of recent ticks whose update counts are averaged.
const UPDATE_HISTORY_LEN: usize = 4;

/// Update count per tick that is still considered "keeping up".
const MAX_UPDATES_KEEPING_UP: u32 = 2;

/// Mean update count above which the game is running slowly: two ticks at the
/// maximum count and the remaining ticks at one update each.
const RUNNING_SLOWLY_MEAN: f64 = (MAX_UPDATES_KEEPING_UP as usize * MAX_UPDATES_KEEPING_UP as usize
    + (UPDATE_HISTORY_LEN - MAX_UPDATES_KEEPING_UP as usize)) as f64
    / UPDATE_HISTORY_LEN as f64;

/// What to do with one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepPlan {
    /// Number of update steps to run. Zero skips the tick, including its draw.
    pub update_count: u32,
    /// Elapsed time handed to every step.
    pub step_elapsed: Duration,
    /// Value of `GameTime::is_running_slowly` for this tick.
    pub is_running_slowly: bool,
    /// When the tick is skipped, the time left until the next step is due.
    pub idle: Duration,
}

impl StepPlan {
    /// Returns `true` when no step is due this tick.
    pub fn is_skipped(&self) -> bool {
        self.update_count == 0
    }

    /// Total time covered by the planned steps.
    pub fn total_elapsed(&self) -> Duration {
        self.step_elapsed * self.update_count
    }
}

/// Turns measured frame times into update steps.
#[derive(Debug, Clone)]
pub struct TimestepScheduler {
    is_fixed_time_step: bool,
    target_elapsed_time: Duration,
    max_elapsed_time: Duration,
    accumulated: Duration,
    update_history: [u32; UPDATE_HISTORY_LEN],
    next_history_slot: usize,
    force_zero: bool,
    is_running_slowly: bool,
}

impl TimestepScheduler {
    /// Creates a scheduler.
    pub fn new(
        is_fixed_time_step: bool,
        target_elapsed_time: Duration,
        max_elapsed_time: Duration,
    ) -> Self {
        Self {
            is_fixed_time_step,
            target_elapsed_time,
            max_elapsed_time,
            accumulated: Duration::ZERO,
            update_history: [0; UPDATE_HISTORY_LEN],
            next_history_slot: 0,
            force_zero: false,
            is_running_slowly: false,
        }
    }

    /// Plans the steps for one tick from the clock's adjusted elapsed time.
    pub fn plan(&mut self, elapsed_adjusted: Duration) -> StepPlan {
        let mut elapsed = elapsed_adjusted;
        if std::mem::take(&mut self.force_zero) {
            elapsed = Duration::ZERO;
            self.clear_history();
        }
        if elapsed > self.max_elapsed_time {
            log::trace!(
                "TimestepScheduler: clamping elapsed {:?} to {:?}",
                elapsed,
                self.max_elapsed_time
            );
            elapsed = self.max_elapsed_time;
        }

        if !self.is_fixed_time_step {
            self.clear_history();
            return StepPlan {
                update_count: 1,
                step_elapsed: elapsed,
                is_running_slowly: false,
                idle: Duration::ZERO,
            };
        }

        let target = self.target_elapsed_time;
        if abs_diff(elapsed, target) < target / 64 {
            elapsed = target;
        }
        self.accumulated += elapsed;

        let update_count =
            u32::try_from(self.accumulated.as_nanos() / target.as_nanos()).unwrap_or(u32::MAX);
        if update_count == 0 {
            return StepPlan {
                update_count: 0,
                step_elapsed: target,
                is_running_slowly: self.is_running_slowly,
                idle: target - self.accumulated,
            };
        }

        self.record_update_count(update_count);
        self.accumulated -= target * update_count;

        StepPlan {
            update_count,
            step_elapsed: target,
            is_running_slowly: self.is_running_slowly,
            idle: Duration::ZERO,
        }
    }

    /// Makes the next planned tick see a zero elapsed time.
    pub fn force_zero(&mut self) {
        self.force_zero = true;
    }

    /// Drops the accumulated time and the update history.
    pub fn reset(&mut self) {
        self.accumulated = Duration::ZERO;
        self.force_zero = false;
        self.clear_history();
    }

    /// Time measured but not yet consumed by a fixed step.
    pub fn accumulated(&self) -> Duration {
        self.accumulated
    }

    /// Whether the most recent fixed-step tick was running slowly.
    pub fn is_running_slowly(&self) -> bool {
        self.is_running_slowly
    }

    /// Whether updates use a fixed step.
    pub fn is_fixed_time_step(&self) -> bool {
        self.is_fixed_time_step
    }

    /// Switches between fixed and variable stepping.
    pub fn set_fixed_time_step(&mut self, fixed: bool) {
        if self.is_fixed_time_step != fixed {
            self.is_fixed_time_step = fixed;
            self.reset();
        }
    }

    /// Duration of one fixed step.
    pub fn target_elapsed_time(&self) -> Duration {
        self.target_elapsed_time
    }

    /// Changes the fixed step. Zero is ignored.
    pub fn set_target_elapsed_time(&mut self, target: Duration) {
        if target.is_zero() {
            log::warn!("TimestepScheduler: ignoring a zero target elapsed time");
            return;
        }
        self.target_elapsed_time = target;
    }

    /// Upper bound applied to every measured sample.
    pub fn max_elapsed_time(&self) -> Duration {
        self.max_elapsed_time
    }

    /// Changes the upper bound applied to every measured sample.
    pub fn set_max_elapsed_time(&mut self, max: Duration) {
        self.max_elapsed_time = max;
    }

    fn record_update_count(&mut self, count: u32) {
        self.update_history[self.next_history_slot] = count;
        self.next_history_slot = (self.next_history_slot + 1) % UPDATE_HISTORY_LEN;

        let sum: u64 = self.update_history.iter().map(|&c| u64::from(c)).sum();
        let mean = sum as f64 / UPDATE_HISTORY_LEN as f64;
        self.is_running_slowly = mean > RUNNING_SLOWLY_MEAN;
    }

    fn clear_history(&mut self) {
        self.update_history = [0; UPDATE_HISTORY_LEN];
        self.next_history_slot = 0;
        self.is_running_slowly = false;
    }
}

fn abs_diff(a: Duration, b: Duration) -> Duration {
    if a > b {
        a - b
    } else {
        b - a
    }
}
