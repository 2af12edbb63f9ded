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

//! A device and presenter that render nowhere.

use super::probe::DeviceProbe;
use cadence_core::graphics::{
    DeviceStatus, FeatureLevel, GraphicsAdapter, GraphicsDevice, GraphicsDeviceInformation,
    GraphicsPresenter, PixelFormat, PresentationParameters,
};
use cadence_core::DeviceError;

/// The swap chain of a [`HeadlessDevice`]. It only tracks its description.
#[derive(Debug)]
pub struct HeadlessPresenter {
    description: PresentationParameters,
    probe: DeviceProbe,
}

impl GraphicsPresenter for HeadlessPresenter {
    fn description(&self) -> &PresentationParameters {
        &self.description
    }

    fn resize(
        &mut self,
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> Result<(), DeviceError> {
        self.probe.on_resize(width, height)?;
        self.description.back_buffer_width = width;
        self.description.back_buffer_height = height;
        self.description.back_buffer_format = format;
        log::trace!("HeadlessPresenter: resized to {width}x{height} {format:?}");
        Ok(())
    }

    fn set_full_screen(&mut self, full_screen: bool) -> Result<(), DeviceError> {
        self.description.is_full_screen = full_screen;
        Ok(())
    }

    fn set_full_screen_output_index(&mut self, index: usize) {
        self.description.full_screen_output_index = index;
    }

    fn present(&mut self) -> Result<(), DeviceError> {
        self.probe.on_present()
    }
}

/// A graphics device without a GPU behind it.
///
/// Its status and failures are driven through the [`DeviceProbe`] of the platform
/// that created it.
#[derive(Debug)]
pub struct HeadlessDevice {
    information: GraphicsDeviceInformation,
    presenter: HeadlessPresenter,
    probe: DeviceProbe,
    state_clears: u64,
    is_disposed: bool,
}

impl HeadlessDevice {
    /// Creates a device from a chosen configuration.
    pub fn new(information: GraphicsDeviceInformation, probe: DeviceProbe) -> Self {
        let presenter = HeadlessPresenter {
            description: information.presentation_parameters.clone(),
            probe: probe.clone(),
        };
        Self {
            information,
            presenter,
            probe,
            state_clears: 0,
            is_disposed: false,
        }
    }

    /// The configuration the device was created with.
    pub fn information(&self) -> &GraphicsDeviceInformation {
        &self.information
    }

    /// How many times the render state was cleared.
    pub fn state_clears(&self) -> u64 {
        self.state_clears
    }
}

impl GraphicsDevice for HeadlessDevice {
    fn status(&self) -> DeviceStatus {
        if self.is_disposed {
            DeviceStatus::Removed
        } else {
            self.probe.status()
        }
    }

    fn feature_level(&self) -> FeatureLevel {
        self.information.graphics_profile
    }

    fn adapter(&self) -> &GraphicsAdapter {
        &self.information.adapter
    }

    fn presenter(&mut self) -> Option<&mut dyn GraphicsPresenter> {
        Some(&mut self.presenter)
    }

    fn clear_state(&mut self) {
        self.state_clears += 1;
    }

    fn set_default_render_target(&mut self) -> Result<(), DeviceError> {
        if self.is_disposed {
            return Err(DeviceError::NotCreated);
        }
        Ok(())
    }

    fn dispose(&mut self) {
        if !self.is_disposed {
            self.is_disposed = true;
            self.probe.on_dispose();
            log::debug!(
                "HeadlessDevice: disposed device on '{}'",
                self.information.adapter.description
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::adapters::default_adapters;
    use std::sync::Arc;

    fn device(probe: &DeviceProbe) -> HeadlessDevice {
        let adapter = Arc::new(default_adapters().remove(0));
        HeadlessDevice::new(
            GraphicsDeviceInformation {
                graphics_profile: adapter.max_feature_level,
                adapter,
                presentation_parameters: PresentationParameters::default(),
            },
            probe.clone(),
        )
    }

    #[test]
    fn present_failure_marks_device_removed() {
        let probe = DeviceProbe::new();
        let mut device = device(&probe);
        device.present().unwrap();
        probe.fail_next_present(DeviceError::DeviceRemoved);

        assert_eq!(device.present(), Err(DeviceError::DeviceRemoved));
        assert_eq!(device.status(), DeviceStatus::Removed);
        assert_eq!(probe.presents(), 1);
    }

    #[test]
    fn resize_updates_description_unless_failing() {
        let probe = DeviceProbe::new();
        let mut device = device(&probe);
        let presenter = device.presenter().unwrap();
        presenter
            .resize(1280, 720, PixelFormat::B8G8R8A8Unorm)
            .unwrap();
        assert_eq!(presenter.description().back_buffer_width, 1280);

        probe.fail_resizes(true);
        assert!(presenter.resize(640, 480, PixelFormat::B8G8R8A8Unorm).is_err());
        assert_eq!(presenter.description().back_buffer_width, 1280);
    }

    #[test]
    fn dispose_is_counted_once() {
        let probe = DeviceProbe::new();
        let mut device = device(&probe);
        device.dispose();
        device.dispose();
        assert_eq!(probe.devices_disposed(), 1);
        assert_eq!(device.status(), DeviceStatus::Removed);
    }
}
