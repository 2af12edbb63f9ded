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

use super::order::OrderKey;
use crate::time::GameTime;

/// The update facet of a game system.
pub trait Updateable {
    /// Key ordering this system among updateables; lower runs first.
    fn update_order(&self) -> &OrderKey;

    /// Disabled systems stay registered but are skipped during dispatch.
    fn enabled(&self) -> bool {
        true
    }

    /// Advances the system by one simulation step.
    fn update(&mut self, time: &GameTime) -> anyhow::Result<()>;
}

/// The draw facet of a game system.
pub trait Drawable {
    /// Key ordering this system among drawables; lower draws first.
    fn draw_order(&self) -> &OrderKey;

    /// Invisible systems stay registered but are skipped during dispatch.
    fn visible(&self) -> bool {
        true
    }

    /// Called before [`draw`](Self::draw). Returning `false` declines this frame and
    /// skips both `draw` and `end_draw`.
    fn begin_draw(&mut self) -> bool {
        true
    }

    /// Renders the system.
    fn draw(&mut self, time: &GameTime) -> anyhow::Result<()>;

    /// Called after `draw`, including when `draw` failed.
    fn end_draw(&mut self) {}
}

/// The content facet of a game system.
pub trait Contentable {
    /// Loads device-dependent content. Called once the device exists, and again
    /// after the device has been recreated.
    fn load_content(&mut self) -> anyhow::Result<()>;

    /// Releases what [`load_content`](Self::load_content) acquired.
    fn unload_content(&mut self) -> anyhow::Result<()>;
}

/// A unit of behavior registered with the game.
///
/// Only [`name`](Self::name) is required. A system advertises its facets by
/// overriding the `as_*` probes to return `Some(self)`:
///
/// ```rust
/// use cadence_core::{GameSystem, GameTime, OrderKey, Updateable};
///
/// struct Spinner { order: OrderKey, angle: f64 }
///
/// impl Updateable for Spinner {
///     fn update_order(&self) -> &OrderKey { &self.order }
///     fn update(&mut self, time: &GameTime) -> anyhow::Result<()> {
///         self.angle += time.elapsed_secs_f64();
///         Ok(())
///     }
/// }
///
/// impl GameSystem for Spinner {
///     fn name(&self) -> &str { "Spinner" }
///     fn as_updateable(&mut self) -> Option<&mut dyn Updateable> { Some(self) }
/// }
/// ```
pub trait GameSystem: Send {
    /// Human-readable name used in logs and errors.
    fn name(&self) -> &str;

    /// Called once when the system leaves the pending state.
    fn initialize(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called when the game shuts down, after content was unloaded. Background
    /// work started in [`initialize`](Self::initialize) must be stopped here; the
    /// system is initialized again if the game restarts.
    fn shutdown(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Update facet probe.
    fn as_updateable(&mut self) -> Option<&mut dyn Updateable> {
        None
    }

    /// Draw facet probe.
    fn as_drawable(&mut self) -> Option<&mut dyn Drawable> {
        None
    }

    /// Content facet probe.
    fn as_contentable(&mut self) -> Option<&mut dyn Contentable> {
        None
    }
}
