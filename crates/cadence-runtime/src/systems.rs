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

//! Demo systems the runtime registers.

use cadence_sdk::prelude::*;
use std::f64::consts::TAU;

/// Requests an exit after a fixed number of update steps.
pub struct FrameLimiter {
    order: OrderKey,
    remaining: u64,
    control: GameControl,
}

impl FrameLimiter {
    pub fn new(frames: u64, control: GameControl) -> Self {
        Self {
            // Last, so every other system sees the final step.
            order: OrderKey::new(i32::MAX),
            remaining: frames,
            control,
        }
    }
}

impl Updateable for FrameLimiter {
    fn update_order(&self) -> &OrderKey {
        &self.order
    }

    fn update(&mut self, _time: &GameTime) -> anyhow::Result<()> {
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            log::info!("FrameLimiter: frame budget reached, exiting");
            self.control.exit();
        }
        Ok(())
    }
}

impl GameSystem for FrameLimiter {
    fn name(&self) -> &str {
        "FrameLimiter"
    }

    fn as_updateable(&mut self) -> Option<&mut dyn Updateable> {
        Some(self)
    }
}

/// Turns at a constant rate and counts what it was asked to do.
pub struct Spinner {
    update_order: OrderKey,
    draw_order: OrderKey,
    revolutions_per_second: f64,
    pub angle: f64,
    pub frames_drawn: u64,
    pub slow_steps: u64,
    pub content_loads: u32,
}

impl Spinner {
    pub fn new(revolutions_per_second: f64) -> Self {
        Self {
            update_order: OrderKey::new(0),
            draw_order: OrderKey::new(0),
            revolutions_per_second,
            angle: 0.0,
            frames_drawn: 0,
            slow_steps: 0,
            content_loads: 0,
        }
    }
}

impl Updateable for Spinner {
    fn update_order(&self) -> &OrderKey {
        &self.update_order
    }

    fn update(&mut self, time: &GameTime) -> anyhow::Result<()> {
        let turned = time.elapsed_secs_f64() * self.revolutions_per_second * TAU;
        self.angle = (self.angle + turned) % TAU;
        if time.is_running_slowly() {
            self.slow_steps += 1;
        }
        Ok(())
    }
}

impl Drawable for Spinner {
    fn draw_order(&self) -> &OrderKey {
        &self.draw_order
    }

    fn draw(&mut self, time: &GameTime) -> anyhow::Result<()> {
        self.frames_drawn += 1;
        log::trace!(
            "Spinner: frame {} at {:.3} rad, t = {:.3}s",
            self.frames_drawn,
            self.angle,
            time.total_secs_f64()
        );
        Ok(())
    }
}

impl Contentable for Spinner {
    fn load_content(&mut self) -> anyhow::Result<()> {
        self.content_loads += 1;
        log::debug!("Spinner: content loaded ({} time(s))", self.content_loads);
        Ok(())
    }

    fn unload_content(&mut self) -> anyhow::Result<()> {
        log::debug!("Spinner: content unloaded");
        Ok(())
    }
}

impl GameSystem for Spinner {
    fn name(&self) -> &str {
        "Spinner"
    }

    fn as_updateable(&mut self) -> Option<&mut dyn Updateable> {
        Some(self)
    }

    fn as_drawable(&mut self) -> Option<&mut dyn Drawable> {
        Some(self)
    }

    fn as_contentable(&mut self) -> Option<&mut dyn Contentable> {
        Some(self)
    }
}
