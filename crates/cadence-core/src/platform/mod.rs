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

//! Abstractions over the host platform: the window and the outer run loop.
//!
//! A [`GamePlatform`] is the game's only route to the operating system. It owns the
//! window, enumerates adapters, turns a chosen [`GraphicsDeviceInformation`] into a
//! device, and pumps the message loop between ticks.

mod candidates;
mod window;

pub use candidates::enumerate_device_candidates;
pub use window::{DisplayOrientation, GameWindow, Rectangle, WindowEvent};

use crate::error::DeviceError;
use crate::graphics::{
    AdapterEnumerator, GraphicsAdapter, GraphicsDevice, GraphicsDeviceInformation,
    GraphicsDevicePreferences,
};
use std::sync::Arc;

/// What the platform's message pump observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpStatus {
    /// Keep ticking.
    Continue,
    /// The platform wants the loop to end (last window closed, OS quit request).
    Exit,
}

/// A platform-specific window and device-enumeration provider.
pub trait GamePlatform {
    /// Short platform name for logs.
    fn name(&self) -> &str;

    /// The game window.
    fn window(&self) -> &dyn GameWindow;

    /// The game window, mutably.
    fn window_mut(&mut self) -> &mut dyn GameWindow;

    /// Hands the platform the channel its window events must be published on.
    fn attach_window_events(&mut self, sender: flume::Sender<WindowEvent>);

    /// Creates the enumerator the game's adapter registry is built from.
    fn adapter_enumerator(&mut self) -> Box<dyn AdapterEnumerator>;

    /// Lists every device configuration that satisfies `preferences`, unranked.
    fn find_best_devices(
        &self,
        adapters: &[Arc<GraphicsAdapter>],
        preferences: &GraphicsDevicePreferences,
    ) -> Vec<GraphicsDeviceInformation> {
        enumerate_device_candidates(adapters, preferences)
    }

    /// Creates a device from the winning candidate.
    fn create_device(
        &mut self,
        info: &GraphicsDeviceInformation,
    ) -> Result<Box<dyn GraphicsDevice>, DeviceError>;

    /// Processes pending OS messages. Called once before every tick.
    fn pump_events(&mut self) -> PumpStatus;

    /// Called once when the game leaves its run loop.
    fn exit(&mut self) {}
}
