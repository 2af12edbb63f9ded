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

//! A handle systems use to steer the game loop from inside their callbacks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
struct ControlFlags {
    exit_requested: AtomicBool,
    suppress_draw: AtomicBool,
    reset_elapsed_time: AtomicBool,
}

/// Cloneable, thread-safe requests to the game loop.
///
/// Every request is a flag the loop reads at a defined point: exit at the top of
/// a tick and between update steps, draw suppression after each update step, and
/// the elapsed time reset when the next tick is planned.
#[derive(Debug, Clone, Default)]
pub struct GameControl {
    flags: Arc<ControlFlags>,
}

impl GameControl {
    /// Creates a handle with no request raised.
    pub fn new() -> Self {
        Self::default()
    }

    /// Asks the game to stop. No further update step or draw runs.
    pub fn exit(&self) {
        if !self.flags.exit_requested.swap(true, Ordering::AcqRel) {
            log::info!("GameControl: exit requested");
        }
    }

    /// Returns `true` once [`exit`](Self::exit) has been called.
    pub fn is_exit_requested(&self) -> bool {
        self.flags.exit_requested.load(Ordering::Acquire)
    }

    /// Skips the draw of the current tick, as long as every update step of the
    /// tick asks for it. Consumed by the step that raised it.
    pub fn suppress_draw(&self) {
        self.flags.suppress_draw.store(true, Ordering::Release);
    }

    /// Makes the next tick behave as if no time had passed, e.g. after a long
    /// load that should not be caught up.
    pub fn reset_elapsed_time(&self) {
        self.flags.reset_elapsed_time.store(true, Ordering::Release);
    }

    pub(crate) fn take_suppress_draw(&self) -> bool {
        self.flags.suppress_draw.swap(false, Ordering::AcqRel)
    }

    pub(crate) fn take_reset_elapsed_time(&self) -> bool {
        self.flags.reset_elapsed_time.swap(false, Ordering::AcqRel)
    }

    pub(crate) fn clear_exit(&self) {
        self.flags.exit_requested.store(false, Ordering::Release);
    }
}
