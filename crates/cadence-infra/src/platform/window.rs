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

//! A window that exists only as state.

use cadence_core::platform::{DisplayOrientation, GameWindow, Rectangle};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone)]
pub(crate) struct WindowState {
    pub(crate) title: String,
    pub(crate) bounds: Rectangle,
    pub(crate) is_minimized: bool,
    pub(crate) orientation: DisplayOrientation,
    pub(crate) is_full_screen: bool,
    pub(crate) is_changing_device: bool,
    pub(crate) device_changes: u32,
}

pub(crate) type SharedWindowState = Arc<Mutex<WindowState>>;

pub(crate) fn lock_window(state: &SharedWindowState) -> MutexGuard<'_, WindowState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The window of a headless platform.
///
/// Its bounds follow the back buffer size reported at the end of each device
/// change, the way a real window is resized to fit its swap chain.
#[derive(Debug)]
pub struct HeadlessWindow {
    state: SharedWindowState,
}

impl HeadlessWindow {
    pub(crate) fn new(state: SharedWindowState) -> Self {
        Self { state }
    }

    /// The window title.
    pub fn title(&self) -> String {
        lock_window(&self.state).title.clone()
    }

    /// Number of completed device changes.
    pub fn device_changes(&self) -> u32 {
        lock_window(&self.state).device_changes
    }

    /// Whether the window currently covers its output exclusively.
    pub fn is_full_screen(&self) -> bool {
        lock_window(&self.state).is_full_screen
    }
}

impl GameWindow for HeadlessWindow {
    fn client_bounds(&self) -> Rectangle {
        lock_window(&self.state).bounds
    }

    fn is_minimized(&self) -> bool {
        lock_window(&self.state).is_minimized
    }

    fn current_orientation(&self) -> DisplayOrientation {
        lock_window(&self.state).orientation
    }

    fn begin_screen_device_change(&mut self, will_be_full_screen: bool) {
        let mut state = lock_window(&self.state);
        if state.is_changing_device {
            log::warn!("HeadlessWindow: nested device change");
        }
        state.is_changing_device = true;
        state.is_full_screen = will_be_full_screen;
    }

    fn end_screen_device_change(&mut self, client_width: u32, client_height: u32) {
        let mut state = lock_window(&self.state);
        state.is_changing_device = false;
        state.device_changes += 1;
        state.bounds.width = client_width;
        state.bounds.height = client_height;
        log::trace!("HeadlessWindow: client area now {client_width}x{client_height}");
    }
}
