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

//! Selection, creation, and recovery of the graphics device.

use crate::ranking::rank_devices;
use cadence_core::graphics::{
    AdapterRegistry, DepthFormat, DeviceStatus, FeatureLevel, GraphicsDevice,
    GraphicsDeviceEvent, GraphicsDeviceInformation, GraphicsDevicePreferences, MultisampleCount,
    PixelFormat, PresentInterval, PresentationParameters,
};
use cadence_core::platform::{DisplayOrientation, GamePlatform};
use cadence_core::{DeviceError, EventBus, GameError, TimeSource};
use std::sync::Arc;
use std::time::Duration;

/// Hook invoked with the winning candidate before the device is created or reset.
pub type PreparingDeviceSettings = Box<dyn FnMut(&mut GraphicsDeviceInformation)>;

/// Owns the graphics device and keeps it matching the tracked preferences.
///
/// The manager holds at most one device. A change of preferences, a window resize,
/// or an orientation change first tries to reconfigure the existing presenter in
/// place; when that is impossible (different adapter or feature level) or fails,
/// the device is disposed and recreated. A device reported lost by the driver is
/// recreated at the next [`begin_draw`](Self::begin_draw).
///
/// Lifecycle notifications are published on [`events`](Self::events):
/// [`GraphicsDeviceEvent::Created`] means device-dependent content must be loaded
/// again.
pub struct GraphicsDeviceManager {
    adapters: AdapterRegistry,
    preferences: GraphicsDevicePreferences,
    device: Option<Box<dyn GraphicsDevice>>,
    current: Option<GraphicsDeviceInformation>,
    is_dirty: bool,
    is_changing_device: bool,
    is_drawing: bool,
    device_lost_sleep: Duration,
    time_source: Arc<dyn TimeSource>,
    events: EventBus<GraphicsDeviceEvent>,
    preparing_device_settings: Option<PreparingDeviceSettings>,
}

impl GraphicsDeviceManager {
    /// Creates a manager with no device.
    pub fn new(
        adapters: AdapterRegistry,
        preferences: GraphicsDevicePreferences,
        time_source: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            adapters,
            preferences,
            device: None,
            current: None,
            is_dirty: true,
            is_changing_device: false,
            is_drawing: false,
            device_lost_sleep: Duration::from_millis(20),
            time_source,
            events: EventBus::new(),
            preparing_device_settings: None,
        }
    }

    /// Sets how long [`begin_draw`](Self::begin_draw) waits before recreating a lost
    /// device.
    pub fn set_device_lost_sleep(&mut self, sleep: Duration) {
        self.device_lost_sleep = sleep;
    }

    /// Installs a hook that may adjust the winning candidate before it is applied.
    pub fn set_preparing_device_settings(
        &mut self,
        hook: impl FnMut(&mut GraphicsDeviceInformation) + 'static,
    ) {
        self.preparing_device_settings = Some(Box::new(hook));
    }

    /// The device lifecycle event bus.
    pub fn events(&self) -> &EventBus<GraphicsDeviceEvent> {
        &self.events
    }

    /// The current device, if one has been created.
    pub fn device(&self) -> Option<&dyn GraphicsDevice> {
        self.device.as_deref()
    }

    /// The current device, mutably.
    pub fn device_mut(&mut self) -> Option<&mut (dyn GraphicsDevice + 'static)> {
        self.device.as_deref_mut()
    }

    /// The configuration the current device was created or reset with.
    pub fn current_information(&self) -> Option<&GraphicsDeviceInformation> {
        self.current.as_ref()
    }

    /// The tracked preferences.
    pub fn preferences(&self) -> &GraphicsDevicePreferences {
        &self.preferences
    }

    /// The owned adapter registry.
    pub fn adapters(&self) -> &AdapterRegistry {
        &self.adapters
    }

    /// Returns `true` when a preference changed since the last applied change.
    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    /// Preferred back buffer width.
    pub fn set_preferred_back_buffer_width(&mut self, width: u32) {
        track(&mut self.is_dirty, &mut self.preferences.back_buffer_width, width);
    }

    /// Preferred back buffer height.
    pub fn set_preferred_back_buffer_height(&mut self, height: u32) {
        track(&mut self.is_dirty, &mut self.preferences.back_buffer_height, height);
    }

    /// Preferred back buffer format.
    pub fn set_preferred_back_buffer_format(&mut self, format: PixelFormat) {
        track(&mut self.is_dirty, &mut self.preferences.back_buffer_format, format);
    }

    /// Preferred depth-stencil format.
    pub fn set_preferred_depth_stencil_format(&mut self, format: DepthFormat) {
        track(&mut self.is_dirty, &mut self.preferences.depth_stencil_format, format);
    }

    /// Full-screen presentation.
    pub fn set_full_screen(&mut self, full_screen: bool) {
        track(&mut self.is_dirty, &mut self.preferences.is_full_screen, full_screen);
    }

    /// Feature levels to try, most preferred first.
    pub fn set_graphics_profiles(&mut self, profiles: Vec<FeatureLevel>) {
        track(&mut self.is_dirty, &mut self.preferences.graphics_profiles, profiles);
    }

    /// Multisampling preference.
    pub fn set_prefer_multisampling(&mut self, prefer: bool) {
        track(&mut self.is_dirty, &mut self.preferences.prefer_multisampling, prefer);
    }

    /// Vertical retrace synchronization.
    pub fn set_synchronize_with_vertical_retrace(&mut self, vsync: bool) {
        track(
            &mut self.is_dirty,
            &mut self.preferences.synchronize_with_vertical_retrace,
            vsync,
        );
    }

    /// Output used in full screen.
    pub fn set_full_screen_output_index(&mut self, index: usize) {
        track(&mut self.is_dirty, &mut self.preferences.full_screen_output_index, index);
    }

    /// Preferred refresh rate.
    pub fn set_preferred_refresh_rate(&mut self, refresh_rate: u32) {
        track(&mut self.is_dirty, &mut self.preferences.refresh_rate, refresh_rate);
    }

    /// Creates the device, or applies preference changes to it.
    pub fn apply_changes(&mut self, platform: &mut dyn GamePlatform) -> Result<(), GameError> {
        if self.device.is_none() || self.is_dirty {
            self.change_or_create_device(platform, false)?;
        }
        Ok(())
    }

    /// Flips the full-screen preference and applies it.
    pub fn toggle_full_screen(&mut self, platform: &mut dyn GamePlatform) -> Result<(), GameError> {
        let full_screen = !self.preferences.is_full_screen;
        log::info!("GraphicsDeviceManager: switching to full screen = {full_screen}");
        self.set_full_screen(full_screen);
        self.apply_changes(platform)
    }

    /// Selects the best configuration for the current preferences and makes the
    /// device match it, resetting in place when allowed and recreating otherwise.
    ///
    /// `force` re-enumerates adapters and always recreates. Calls made while a
    /// change is already in progress are ignored.
    pub fn change_or_create_device(
        &mut self,
        platform: &mut dyn GamePlatform,
        force: bool,
    ) -> Result<(), GameError> {
        if self.is_changing_device {
            log::debug!("GraphicsDeviceManager: device change already in progress");
            return Ok(());
        }
        self.is_changing_device = true;
        let result = self.change_or_create_inner(platform, force);
        self.is_changing_device = false;
        result
    }

    fn change_or_create_inner(
        &mut self,
        platform: &mut dyn GamePlatform,
        force: bool,
    ) -> Result<(), GameError> {
        if force {
            self.adapters.reinitialize()?;
        }
        let adapters = self.adapters.adapters()?.to_vec();
        let candidates = platform.find_best_devices(&adapters, &self.preferences);
        if candidates.is_empty() {
            log::error!(
                "GraphicsDeviceManager: no device matches {:?}",
                self.preferences.graphics_profiles
            );
            return Err(DeviceError::NoCompatibleDevice.into());
        }
        log::debug!(
            "GraphicsDeviceManager: ranking {} candidate(s)",
            candidates.len()
        );

        let mut winner = rank_devices(candidates, &self.preferences)
            .into_iter()
            .next()
            .ok_or(DeviceError::NoCompatibleDevice)?;
        if let Some(hook) = self.preparing_device_settings.as_mut() {
            hook(&mut winner);
        }
        self.write_back(&winner.presentation_parameters);

        let params = winner.presentation_parameters.clone();
        platform
            .window_mut()
            .begin_screen_device_change(params.is_full_screen);
        let outcome = self.reset_or_recreate(platform, &winner, force);
        platform
            .window_mut()
            .end_screen_device_change(params.back_buffer_width, params.back_buffer_height);
        outcome?;

        log::info!(
            "GraphicsDeviceManager: using '{}' at {:?}, {}x{} {:?}{}",
            winner.adapter.description,
            winner.graphics_profile,
            params.back_buffer_width,
            params.back_buffer_height,
            params.back_buffer_format,
            if params.is_full_screen { " (full screen)" } else { "" }
        );
        self.current = Some(winner);
        self.is_dirty = false;
        Ok(())
    }

    fn reset_or_recreate(
        &mut self,
        platform: &mut dyn GamePlatform,
        winner: &GraphicsDeviceInformation,
        force: bool,
    ) -> Result<(), GameError> {
        let can_reset = !force
            && self.device.as_ref().is_some_and(|device| {
                device.feature_level() == winner.graphics_profile
                    && device.adapter().index == winner.adapter.index
            });

        if can_reset {
            self.events.publish(GraphicsDeviceEvent::Resetting);
            match self.reset_presenter(&winner.presentation_parameters) {
                Ok(()) => {
                    log::debug!("GraphicsDeviceManager: presenter reset in place");
                    self.events.publish(GraphicsDeviceEvent::Reset);
                    return Ok(());
                }
                Err(e) => {
                    log::warn!("GraphicsDeviceManager: reset failed ({e}), recreating device");
                }
            }
        }

        self.dispose_device();
        let device = platform.create_device(winner)?;
        self.device = Some(device);
        self.events.publish(GraphicsDeviceEvent::Created);
        Ok(())
    }

    fn reset_presenter(&mut self, params: &PresentationParameters) -> Result<(), DeviceError> {
        let presenter = self
            .device
            .as_mut()
            .and_then(|device| device.presenter())
            .ok_or_else(|| DeviceError::ResizeFailed("device has no presenter".into()))?;
        presenter.set_full_screen_output_index(params.full_screen_output_index);
        presenter.resize(
            params.back_buffer_width,
            params.back_buffer_height,
            params.back_buffer_format,
        )?;
        presenter.set_full_screen(params.is_full_screen)
    }

    fn write_back(&mut self, params: &PresentationParameters) {
        let prefs = &mut self.preferences;
        prefs.back_buffer_width = params.back_buffer_width;
        prefs.back_buffer_height = params.back_buffer_height;
        prefs.back_buffer_format = params.back_buffer_format;
        prefs.depth_stencil_format = params.depth_stencil_format;
        prefs.is_full_screen = params.is_full_screen;
        prefs.full_screen_output_index = params.full_screen_output_index;
        prefs.prefer_multisampling = params.multisample_count != MultisampleCount::None;
        prefs.synchronize_with_vertical_retrace =
            params.present_interval != PresentInterval::Immediate;
        prefs.refresh_rate = params.refresh_rate;
    }

    /// Prepares the device for a frame.
    ///
    /// Returns `false` when there is nothing to draw on: no device yet, or the
    /// device was lost, in which case it is recreated before returning.
    pub fn begin_draw(&mut self, platform: &mut dyn GamePlatform) -> Result<bool, GameError> {
        self.is_drawing = false;
        let Some(device) = self.device.as_mut() else {
            return Ok(false);
        };

        match device.status() {
            DeviceStatus::Normal => {
                device.clear_state();
                device.set_default_render_target()?;
                self.is_drawing = true;
                Ok(true)
            }
            status => {
                log::warn!("GraphicsDeviceManager: device status {status:?}, recreating");
                self.time_source.sleep(self.device_lost_sleep);
                self.events.publish(GraphicsDeviceEvent::Lost);
                self.change_or_create_device(platform, true)?;
                Ok(false)
            }
        }
    }

    /// Presents the frame started by a successful [`begin_draw`](Self::begin_draw).
    ///
    /// A present failing because the device was removed or reset is absorbed; the
    /// next `begin_draw` sees the status and recreates the device.
    pub fn end_draw(&mut self) -> Result<(), GameError> {
        if !std::mem::take(&mut self.is_drawing) {
            return Ok(());
        }
        let Some(device) = self.device.as_mut() else {
            return Ok(());
        };
        match device.present() {
            Ok(()) => Ok(()),
            Err(e) if e.is_device_lost() => {
                log::warn!("GraphicsDeviceManager: present reported {e}");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Follows a window resize. Empty sizes and minimized windows are ignored.
    pub fn on_client_size_changed(
        &mut self,
        platform: &mut dyn GamePlatform,
        width: u32,
        height: u32,
    ) -> Result<(), GameError> {
        if self.device.is_none() || self.is_changing_device {
            return Ok(());
        }
        if width == 0 || height == 0 || platform.window().is_minimized() {
            log::trace!("GraphicsDeviceManager: ignoring resize to {width}x{height}");
            return Ok(());
        }
        if !self.preferences.is_full_screen {
            self.preferences.back_buffer_width = width;
            self.preferences.back_buffer_height = height;
        }
        self.change_or_create_device(platform, false)
    }

    /// Follows a display rotation by swapping the preferred back buffer axes when
    /// they no longer match the orientation.
    pub fn on_orientation_changed(
        &mut self,
        platform: &mut dyn GamePlatform,
        orientation: DisplayOrientation,
    ) -> Result<(), GameError> {
        if self.device.is_none() || self.is_changing_device {
            return Ok(());
        }
        let (width, height) = self.preferences.target_size();
        let swap = match orientation {
            DisplayOrientation::Portrait => width > height,
            DisplayOrientation::LandscapeLeft | DisplayOrientation::LandscapeRight => {
                height > width
            }
            DisplayOrientation::Default => false,
        };
        if swap {
            self.preferences.back_buffer_width = height;
            self.preferences.back_buffer_height = width;
        }
        self.change_or_create_device(platform, false)
    }

    fn dispose_device(&mut self) {
        if let Some(mut device) = self.device.take() {
            self.events.publish(GraphicsDeviceEvent::Disposing);
            log::debug!(
                "GraphicsDeviceManager: disposing device on '{}'",
                device.adapter().description
            );
            device.dispose();
        }
        self.current = None;
    }

    /// Disposes the device and forgets the adapter list.
    pub fn dispose(&mut self) {
        self.dispose_device();
        self.adapters.dispose();
        self.is_dirty = true;
    }
}

impl Drop for GraphicsDeviceManager {
    fn drop(&mut self) {
        self.dispose_device();
    }
}

impl std::fmt::Debug for GraphicsDeviceManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphicsDeviceManager")
            .field("has_device", &self.device.is_some())
            .field("current", &self.current)
            .field("is_dirty", &self.is_dirty)
            .finish()
    }
}

fn track<T: PartialEq>(dirty: &mut bool, field: &mut T, value: T) {
    if *field != value {
        *field = value;
        *dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_marks_dirty_only_on_change() {
        let mut dirty = false;
        let mut width = 800;
        track(&mut dirty, &mut width, 800);
        assert!(!dirty);
        track(&mut dirty, &mut width, 1024);
        assert!(dirty);
        assert_eq!(width, 1024);
    }
}
