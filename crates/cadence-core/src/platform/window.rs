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

use serde::{Deserialize, Serialize};

/// An integer rectangle in window coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rectangle {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Rectangle {
    /// Creates a rectangle at the origin.
    pub fn from_size(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    /// Returns `true` when either dimension is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Orientation of the display the window is shown on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DisplayOrientation {
    /// Whatever the platform considers natural.
    #[default]
    Default,
    /// Landscape, rotated counter-clockwise.
    LandscapeLeft,
    /// Landscape, rotated clockwise.
    LandscapeRight,
    /// Portrait.
    Portrait,
}

/// Notifications the window publishes to the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    /// The client area changed size.
    ClientSizeChanged {
        /// New client width.
        width: u32,
        /// New client height.
        height: u32,
    },
    /// The display orientation changed.
    OrientationChanged(DisplayOrientation),
    /// The window gained focus.
    Activated,
    /// The window lost focus.
    Deactivated,
    /// The user asked to close the window.
    CloseRequested,
}

/// A trait that abstracts the behavior of the game window.
pub trait GameWindow {
    /// The client area in window coordinates.
    fn client_bounds(&self) -> Rectangle;

    /// Returns `true` while the window is minimized.
    fn is_minimized(&self) -> bool;

    /// The current display orientation.
    fn current_orientation(&self) -> DisplayOrientation;

    /// Called before the device manager swaps or resets the device.
    fn begin_screen_device_change(&mut self, will_be_full_screen: bool);

    /// Called after the device change, with the back buffer size now in effect.
    fn end_screen_device_change(&mut self, client_width: u32, client_height: u32);
}
