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

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A monotonic time source the game clock reads from.
///
/// Sleeping goes through the source as well, so a game driven by a
/// [`ManualTimeSource`] never blocks the calling thread.
pub trait TimeSource: Send + Sync {
    /// Monotonic time since the source was created.
    fn now(&self) -> Duration;

    /// Blocks the calling thread for `duration`.
    fn sleep(&self, duration: Duration);
}

/// Wall-clock source backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemTimeSource {
    origin: Instant,
}

impl SystemTimeSource {
    /// Creates a source whose origin is "now".
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

/// A time source that only moves when told to.
///
/// Clones share the same timeline, so a test can keep one clone and hand the
/// other to the game. `sleep` never blocks; it only records how long the caller
/// asked to sleep.
#[derive(Debug, Clone, Default)]
pub struct ManualTimeSource {
    now_nanos: Arc<AtomicU64>,
    slept_nanos: Arc<AtomicU64>,
}

impl ManualTimeSource {
    /// Creates a source at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the timeline forward.
    pub fn advance(&self, delta: Duration) {
        self.now_nanos
            .fetch_add(duration_to_nanos(delta), Ordering::SeqCst);
    }

    /// Total time callers asked to sleep so far.
    pub fn slept(&self) -> Duration {
        Duration::from_nanos(self.slept_nanos.load(Ordering::SeqCst))
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.now_nanos.load(Ordering::SeqCst))
    }

    fn sleep(&self, duration: Duration) {
        self.slept_nanos
            .fetch_add(duration_to_nanos(duration), Ordering::SeqCst);
    }
}

fn duration_to_nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_source_shares_timeline_between_clones() {
        let source = ManualTimeSource::new();
        let other = source.clone();
        source.advance(Duration::from_millis(16));
        assert_eq!(other.now(), Duration::from_millis(16));
    }

    #[test]
    fn manual_sleep_records_without_advancing() {
        let source = ManualTimeSource::new();
        source.sleep(Duration::from_millis(20));
        assert_eq!(source.now(), Duration::ZERO);
        assert_eq!(source.slept(), Duration::from_millis(20));
    }

    #[test]
    fn system_source_is_monotonic() {
        let source = SystemTimeSource::new();
        let a = source.now();
        let b = source.now();
        assert!(b >= a);
    }
}
