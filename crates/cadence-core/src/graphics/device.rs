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

//! The opaque device and presenter contracts.

use super::adapter::GraphicsAdapter;
use super::format::{FeatureLevel, PixelFormat};
use super::parameters::PresentationParameters;
use crate::error::DeviceError;

/// Health of a device as reported by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceStatus {
    /// The device is usable.
    Normal,
    /// The device was removed (driver crash, unplugged adapter).
    Removed,
    /// The device was reset by the driver.
    Reset,
}

/// The swap chain of a device.
pub trait GraphicsPresenter {
    /// The current swap chain description.
    fn description(&self) -> &PresentationParameters;

    /// Resizes the back buffer in place.
    fn resize(&mut self, width: u32, height: u32, format: PixelFormat)
        -> Result<(), DeviceError>;

    /// Switches between windowed and exclusive full-screen presentation.
    fn set_full_screen(&mut self, full_screen: bool) -> Result<(), DeviceError>;

    /// Selects the output used in full screen.
    fn set_full_screen_output_index(&mut self, index: usize);

    /// Presents the back buffer.
    fn present(&mut self) -> Result<(), DeviceError>;
}

/// A created graphics device. The game holds at most one.
pub trait GraphicsDevice {
    /// Current driver-reported status.
    fn status(&self) -> DeviceStatus;

    /// Feature level the device was created with.
    fn feature_level(&self) -> FeatureLevel;

    /// The adapter the device runs on.
    fn adapter(&self) -> &GraphicsAdapter;

    /// The device's presenter, if it renders to a swap chain.
    fn presenter(&mut self) -> Option<&mut dyn GraphicsPresenter>;

    /// Resets all device-local render state.
    fn clear_state(&mut self);

    /// Binds the back buffer and depth buffer as render targets and sets a
    /// viewport covering the back buffer.
    fn set_default_render_target(&mut self) -> Result<(), DeviceError>;

    /// Presents the frame through the presenter.
    fn present(&mut self) -> Result<(), DeviceError> {
        match self.presenter() {
            Some(presenter) => presenter.present(),
            None => Ok(()),
        }
    }

    /// Releases the device. The device is not used afterwards.
    fn dispose(&mut self);
}
