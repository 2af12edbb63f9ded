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

//! Fault injection and counters shared by the headless devices.

use cadence_core::graphics::{DeviceStatus, GraphicsDeviceInformation};
use cadence_core::DeviceError;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug)]
struct ProbeState {
    status: DeviceStatus,
    next_present_error: Option<DeviceError>,
    fail_resize: bool,
    fail_creation: Option<String>,
    devices_created: u32,
    devices_disposed: u32,
    presents: u64,
    resizes: u32,
    last_created: Option<GraphicsDeviceInformation>,
}

impl Default for ProbeState {
    fn default() -> Self {
        Self {
            status: DeviceStatus::Normal,
            next_present_error: None,
            fail_resize: false,
            fail_creation: None,
            devices_created: 0,
            devices_disposed: 0,
            presents: 0,
            resizes: 0,
            last_created: None,
        }
    }
}

/// A cloneable window into the headless devices of one platform.
///
/// Tests keep a clone to simulate driver failures on the live device and to count
/// what the device manager did with it.
#[derive(Debug, Clone, Default)]
pub struct DeviceProbe {
    state: Arc<Mutex<ProbeState>>,
}

impl DeviceProbe {
    /// Creates a probe with a healthy device and zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, ProbeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Makes the live device report [`DeviceStatus::Removed`].
    pub fn remove_device(&self) {
        log::debug!("DeviceProbe: simulating device removal");
        self.state().status = DeviceStatus::Removed;
    }

    /// Makes the live device report [`DeviceStatus::Reset`].
    pub fn reset_device(&self) {
        log::debug!("DeviceProbe: simulating device reset");
        self.state().status = DeviceStatus::Reset;
    }

    /// Makes the next present fail with `error`. A lost-device error also
    /// changes the device status accordingly.
    pub fn fail_next_present(&self, error: DeviceError) {
        self.state().next_present_error = Some(error);
    }

    /// Makes every presenter resize fail until called again with `false`.
    pub fn fail_resizes(&self, fail: bool) {
        self.state().fail_resize = fail;
    }

    /// Makes device creation fail with `reason` until called with `None`.
    pub fn fail_creation(&self, reason: Option<String>) {
        self.state().fail_creation = reason;
    }

    /// Status reported by the live device.
    pub fn status(&self) -> DeviceStatus {
        self.state().status
    }

    /// Number of devices created.
    pub fn devices_created(&self) -> u32 {
        self.state().devices_created
    }

    /// Number of devices disposed.
    pub fn devices_disposed(&self) -> u32 {
        self.state().devices_disposed
    }

    /// Number of successful presents.
    pub fn presents(&self) -> u64 {
        self.state().presents
    }

    /// Number of successful in-place presenter resizes.
    pub fn resizes(&self) -> u32 {
        self.state().resizes
    }

    /// Configuration of the most recently created device.
    pub fn last_created(&self) -> Option<GraphicsDeviceInformation> {
        self.state().last_created.clone()
    }

    pub(crate) fn on_create(&self, info: &GraphicsDeviceInformation) -> Result<(), DeviceError> {
        let mut state = self.state();
        if let Some(reason) = state.fail_creation.clone() {
            return Err(DeviceError::CreationFailed(reason));
        }
        state.status = DeviceStatus::Normal;
        state.devices_created += 1;
        state.last_created = Some(info.clone());
        Ok(())
    }

    pub(crate) fn on_dispose(&self) {
        self.state().devices_disposed += 1;
    }

    pub(crate) fn on_present(&self) -> Result<(), DeviceError> {
        let mut state = self.state();
        if let Some(error) = state.next_present_error.take() {
            match error {
                DeviceError::DeviceRemoved => state.status = DeviceStatus::Removed,
                DeviceError::DeviceReset => state.status = DeviceStatus::Reset,
                _ => {}
            }
            return Err(error);
        }
        state.presents += 1;
        Ok(())
    }

    pub(crate) fn on_resize(&self, width: u32, height: u32) -> Result<(), DeviceError> {
        let mut state = self.state();
        if state.fail_resize {
            return Err(DeviceError::ResizeFailed(format!(
                "simulated failure resizing to {width}x{height}"
            )));
        }
        state.resizes += 1;
        Ok(())
    }
}
