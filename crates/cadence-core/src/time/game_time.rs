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

use std::time::Duration;

/// A read-only snapshot of game timing handed to every `update` and `draw` call.
///
/// The orchestrator builds a fresh value for each simulation step and for each
/// draw; consumers cannot mutate it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GameTime {
    total: Duration,
    elapsed: Duration,
    is_running_slowly: bool,
    frame_count: u64,
}

impl GameTime {
    /// Creates a snapshot.
    pub fn new(
        total: Duration,
        elapsed: Duration,
        is_running_slowly: bool,
        frame_count: u64,
    ) -> Self {
        Self {
            total,
            elapsed,
            is_running_slowly,
            frame_count,
        }
    }

    /// Game time accumulated since the game started, excluding this step.
    pub fn total(&self) -> Duration {
        self.total
    }

    /// Time covered by this step (for `update`) or by all steps of the tick (for `draw`).
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// [`elapsed`](Self::elapsed) in seconds.
    pub fn elapsed_secs_f64(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    /// [`total`](Self::total) in seconds.
    pub fn total_secs_f64(&self) -> f64 {
        self.total.as_secs_f64()
    }

    /// Advisory flag: the fixed-step scheduler has recently needed several
    /// updates per frame to keep up. Consumers may reduce detail.
    pub fn is_running_slowly(&self) -> bool {
        self.is_running_slowly
    }

    /// Number of update steps run before this snapshot was taken.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}
