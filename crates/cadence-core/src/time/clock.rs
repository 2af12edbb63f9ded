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

//! Game clock with pause/resume semantics.

use super::source::{SystemTimeSource, TimeSource};
use std::sync::Arc;
use std::time::Duration;

/// Measures the wall-clock time between ticks.
///
/// Two deltas are produced per tick: the raw [`elapsed_time`](Self::elapsed_time)
/// and the [`elapsed_adjusted_time`](Self::elapsed_adjusted_time), which excludes any
/// time spent paused. The scheduler consumes the adjusted value. Pauses nest: the
/// clock only resumes when every `pause` has been matched by a `resume`.
pub struct GameClock {
    source: Arc<dyn TimeSource>,
    start: Duration,
    last: Duration,
    total_time: Duration,
    elapsed_time: Duration,
    elapsed_adjusted_time: Duration,
    pause_count: u32,
    pause_started: Duration,
    time_paused: Duration,
}

impl GameClock {
    /// Creates a clock reading the system wall clock.
    pub fn new() -> Self {
        Self::with_source(Arc::new(SystemTimeSource::new()))
    }

    /// Creates a clock reading from `source`.
    pub fn with_source(source: Arc<dyn TimeSource>) -> Self {
        let now = source.now();
        Self {
            source,
            start: now,
            last: now,
            total_time: Duration::ZERO,
            elapsed_time: Duration::ZERO,
            elapsed_adjusted_time: Duration::ZERO,
            pause_count: 0,
            pause_started: Duration::ZERO,
            time_paused: Duration::ZERO,
        }
    }

    /// The time source this clock reads from.
    pub fn source(&self) -> &Arc<dyn TimeSource> {
        &self.source
    }

    /// Restarts measurement from "now". A paused clock stays paused, with its
    /// pause counted from the reset.
    pub fn reset(&mut self) {
        let now = self.source.now();
        self.start = now;
        self.last = now;
        self.total_time = Duration::ZERO;
        self.elapsed_time = Duration::ZERO;
        self.elapsed_adjusted_time = Duration::ZERO;
        self.time_paused = Duration::ZERO;
        if self.is_paused() {
            self.pause_started = now;
        }
    }

    /// Samples the time source. Does nothing while paused.
    pub fn tick(&mut self) {
        if self.is_paused() {
            return;
        }

        let now = self.source.now();
        self.total_time = now.saturating_sub(self.start);
        self.elapsed_time = now.saturating_sub(self.last);
        self.elapsed_adjusted_time = now.saturating_sub(self.last + self.time_paused);
        self.time_paused = Duration::ZERO;
        self.last = now;
    }

    /// Stops time accumulation until the matching [`resume`](Self::resume).
    pub fn pause(&mut self) {
        self.pause_count += 1;
        if self.pause_count == 1 {
            self.pause_started = self.source.now();
        }
    }

    /// Ends one [`pause`](Self::pause). Unbalanced calls are ignored.
    pub fn resume(&mut self) {
        if self.pause_count == 0 {
            log::warn!("GameClock: resume called without a matching pause");
            return;
        }
        self.pause_count -= 1;
        if self.pause_count == 0 {
            let paused_for = self.source.now().saturating_sub(self.pause_started);
            self.time_paused += paused_for;
        }
    }

    /// Returns `true` while at least one pause is outstanding.
    pub fn is_paused(&self) -> bool {
        self.pause_count > 0
    }

    /// Wall-clock time since the last reset, including paused time.
    pub fn total_time(&self) -> Duration {
        self.total_time
    }

    /// Raw time between the last two ticks.
    pub fn elapsed_time(&self) -> Duration {
        self.elapsed_time
    }

    /// Time between the last two ticks minus the time spent paused in between.
    pub fn elapsed_adjusted_time(&self) -> Duration {
        self.elapsed_adjusted_time
    }

    /// Sleeps through the clock's time source.
    pub fn sleep(&self, duration: Duration) {
        self.source.sleep(duration);
    }
}

impl Default for GameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for GameClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameClock")
            .field("total_time", &self.total_time)
            .field("elapsed_time", &self.elapsed_time)
            .field("elapsed_adjusted_time", &self.elapsed_adjusted_time)
            .field("pause_count", &self.pause_count)
            .finish()
    }
}
