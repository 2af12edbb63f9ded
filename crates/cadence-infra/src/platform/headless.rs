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

//! A platform without an operating system window.

use super::window::{lock_window, HeadlessWindow, SharedWindowState, WindowState};
use crate::graphics::{default_adapters, DeviceProbe, HeadlessAdapterEnumerator, HeadlessDevice};
use cadence_core::graphics::{
    AdapterEnumerator, GraphicsAdapter, GraphicsDevice, GraphicsDeviceInformation,
};
use cadence_core::platform::{
    DisplayOrientation, GamePlatform, GameWindow, PumpStatus, Rectangle, WindowEvent,
};
use cadence_core::DeviceError;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct PumpState {
    sender: Option<flume::Sender<WindowEvent>>,
    queued: Vec<WindowEvent>,
    quit_requested: bool,
    pumps: u64,
}

/// A cloneable remote control for a [`HeadlessPlatform`].
///
/// It plays the part of the user and the operating system: resizing, rotating,
/// focusing and closing the window, quitting the message loop, and, through its
/// [`DeviceProbe`], breaking the graphics device.
#[derive(Debug, Clone)]
pub struct HeadlessController {
    pump: Arc<Mutex<PumpState>>,
    window: SharedWindowState,
    enumerator: HeadlessAdapterEnumerator,
    probe: DeviceProbe,
}

impl HeadlessController {
    fn pump(&self) -> MutexGuard<'_, PumpState> {
        self.pump.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Publishes a window event, or queues it until the game attaches.
    pub fn send(&self, event: WindowEvent) {
        let mut pump = self.pump();
        if let Some(sender) = pump.sender.as_ref() {
            if sender.send(event).is_err() {
                log::warn!("HeadlessController: game is gone, dropping {event:?}");
            }
            return;
        }
        pump.queued.push(event);
    }

    /// Resizes the client area and publishes the change.
    pub fn resize(&self, width: u32, height: u32) {
        {
            let mut window = lock_window(&self.window);
            window.bounds.width = width;
            window.bounds.height = height;
        }
        self.send(WindowEvent::ClientSizeChanged { width, height });
    }

    /// Minimizes or restores the window.
    pub fn set_minimized(&self, minimized: bool) {
        lock_window(&self.window).is_minimized = minimized;
        if minimized {
            self.send(WindowEvent::ClientSizeChanged {
                width: 0,
                height: 0,
            });
        }
    }

    /// Rotates the display and publishes the change.
    pub fn rotate(&self, orientation: DisplayOrientation) {
        lock_window(&self.window).orientation = orientation;
        self.send(WindowEvent::OrientationChanged(orientation));
    }

    /// Gives the window focus.
    pub fn activate(&self) {
        self.send(WindowEvent::Activated);
    }

    /// Takes focus away from the window.
    pub fn deactivate(&self) {
        self.send(WindowEvent::Deactivated);
    }

    /// Asks to close the window, as the close button would.
    pub fn request_close(&self) {
        self.send(WindowEvent::CloseRequested);
    }

    /// Makes the next pump report [`PumpStatus::Exit`].
    pub fn quit(&self) {
        self.pump().quit_requested = true;
    }

    /// Number of pumps so far.
    pub fn pump_count(&self) -> u64 {
        self.pump().pumps
    }

    /// Current client area.
    pub fn client_bounds(&self) -> Rectangle {
        lock_window(&self.window).bounds
    }

    /// Number of device changes the window went through.
    pub fn device_changes(&self) -> u32 {
        lock_window(&self.window).device_changes
    }

    /// Replaces the adapters reported at the next enumeration.
    pub fn set_adapters(&self, adapters: Vec<GraphicsAdapter>) {
        self.enumerator.set_adapters(adapters);
    }

    /// The fault injection handle of the platform's devices.
    pub fn probe(&self) -> &DeviceProbe {
        &self.probe
    }
}

/// Builds a [`HeadlessPlatform`].
#[derive(Debug)]
pub struct HeadlessPlatformBuilder {
    title: String,
    width: u32,
    height: u32,
    adapters: Vec<GraphicsAdapter>,
}

impl HeadlessPlatformBuilder {
    /// Creates a builder with an 800x480 window and [`default_adapters`].
    pub fn new() -> Self {
        Self {
            title: "Cadence".to_string(),
            width: 800,
            height: 480,
            adapters: default_adapters(),
        }
    }

    /// Sets the window title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the initial client size.
    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Sets the adapters the platform reports.
    pub fn with_adapters(mut self, adapters: Vec<GraphicsAdapter>) -> Self {
        self.adapters = adapters;
        self
    }

    /// Builds the platform.
    pub fn build(self) -> HeadlessPlatform {
        log::info!(
            "HeadlessPlatform: '{}' {}x{} with {} adapter(s)",
            self.title,
            self.width,
            self.height,
            self.adapters.len()
        );
        let window = Arc::new(Mutex::new(WindowState {
            title: self.title,
            bounds: Rectangle::from_size(self.width, self.height),
            is_minimized: false,
            orientation: DisplayOrientation::Default,
            is_full_screen: false,
            is_changing_device: false,
            device_changes: 0,
        }));
        let controller = HeadlessController {
            pump: Arc::new(Mutex::new(PumpState::default())),
            window: Arc::clone(&window),
            enumerator: HeadlessAdapterEnumerator::new(self.adapters),
            probe: DeviceProbe::new(),
        };
        HeadlessPlatform {
            window: HeadlessWindow::new(window),
            controller,
        }
    }
}

impl Default for HeadlessPlatformBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A [`GamePlatform`] that needs neither a GPU nor a window system.
#[derive(Debug)]
pub struct HeadlessPlatform {
    window: HeadlessWindow,
    controller: HeadlessController,
}

impl HeadlessPlatform {
    /// Starts building a platform.
    pub fn builder() -> HeadlessPlatformBuilder {
        HeadlessPlatformBuilder::new()
    }

    /// A remote control sharing this platform's state.
    pub fn controller(&self) -> HeadlessController {
        self.controller.clone()
    }

    /// The platform's window.
    pub fn headless_window(&self) -> &HeadlessWindow {
        &self.window
    }
}

impl Default for HeadlessPlatform {
    fn default() -> Self {
        HeadlessPlatformBuilder::new().build()
    }
}

impl GamePlatform for HeadlessPlatform {
    fn name(&self) -> &str {
        "headless"
    }

    fn window(&self) -> &dyn GameWindow {
        &self.window
    }

    fn window_mut(&mut self) -> &mut dyn GameWindow {
        &mut self.window
    }

    fn attach_window_events(&mut self, sender: flume::Sender<WindowEvent>) {
        let mut pump = self.controller.pump();
        for event in pump.queued.drain(..) {
            if sender.send(event).is_err() {
                log::warn!("HeadlessPlatform: dropping queued {event:?}");
            }
        }
        pump.sender = Some(sender);
    }

    fn adapter_enumerator(&mut self) -> Box<dyn AdapterEnumerator> {
        Box::new(self.controller.enumerator.clone())
    }

    fn create_device(
        &mut self,
        info: &GraphicsDeviceInformation,
    ) -> Result<Box<dyn GraphicsDevice>, DeviceError> {
        self.controller.probe.on_create(info)?;
        log::debug!(
            "HeadlessPlatform: created device on '{}' at {:?}",
            info.adapter.description,
            info.graphics_profile
        );
        Ok(Box::new(HeadlessDevice::new(
            info.clone(),
            self.controller.probe.clone(),
        )))
    }

    fn pump_events(&mut self) -> PumpStatus {
        let mut pump = self.controller.pump();
        pump.pumps += 1;
        if pump.quit_requested {
            PumpStatus::Exit
        } else {
            PumpStatus::Continue
        }
    }

    fn exit(&mut self) {
        log::info!("HeadlessPlatform: exiting");
        self.controller.pump().sender = None;
    }
}
