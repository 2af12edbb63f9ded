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

//! The graphics data model and the device contracts consumed by the device manager.
//!
//! The native device itself is out of reach of this crate: it is an opaque
//! [`GraphicsDevice`] created by the platform from a [`GraphicsDeviceInformation`].
//! Everything here is plain data or a trait.

mod adapter;
mod device;
mod events;
mod format;
mod parameters;

pub use adapter::{
    AdapterEnumerator, AdapterRegistry, DisplayMode, GraphicsAdapter, GraphicsOutput,
};
pub use device::{DeviceStatus, GraphicsDevice, GraphicsPresenter};
pub use events::GraphicsDeviceEvent;
pub use format::{DepthFormat, FeatureLevel, MultisampleCount, PixelFormat, PresentInterval};
pub use parameters::{
    GraphicsDeviceInformation, GraphicsDevicePreferences, PresentationParameters,
    DEFAULT_BACK_BUFFER_HEIGHT, DEFAULT_BACK_BUFFER_WIDTH,
};
