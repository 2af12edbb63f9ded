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

//! Presentation parameters, device candidates, and the tracked preference set.

use super::adapter::GraphicsAdapter;
use super::format::{DepthFormat, FeatureLevel, MultisampleCount, PixelFormat, PresentInterval};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Back buffer width used when no preference is set.
pub const DEFAULT_BACK_BUFFER_WIDTH: u32 = 800;
/// Back buffer height used when no preference is set.
pub const DEFAULT_BACK_BUFFER_HEIGHT: u32 = 480;

/// Describes the swap chain a presenter owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentationParameters {
    /// Back buffer width in pixels.
    pub back_buffer_width: u32,
    /// Back buffer height in pixels.
    pub back_buffer_height: u32,
    /// Back buffer pixel format.
    pub back_buffer_format: PixelFormat,
    /// Depth-stencil buffer format.
    pub depth_stencil_format: DepthFormat,
    /// `true` for exclusive full-screen presentation.
    pub is_full_screen: bool,
    /// Output used when presenting full screen.
    pub full_screen_output_index: usize,
    /// Samples per pixel.
    pub multisample_count: MultisampleCount,
    /// Vertical retrace synchronization.
    pub present_interval: PresentInterval,
    /// Refresh rate in hertz, meaningful in full screen.
    pub refresh_rate: u32,
}

impl Default for PresentationParameters {
    fn default() -> Self {
        Self {
            back_buffer_width: DEFAULT_BACK_BUFFER_WIDTH,
            back_buffer_height: DEFAULT_BACK_BUFFER_HEIGHT,
            back_buffer_format: PixelFormat::R8G8B8A8Unorm,
            depth_stencil_format: DepthFormat::Depth24Stencil8,
            is_full_screen: false,
            full_screen_output_index: 0,
            multisample_count: MultisampleCount::None,
            present_interval: PresentInterval::One,
            refresh_rate: 60,
        }
    }
}

impl PresentationParameters {
    /// Width divided by height; zero-height buffers report 0.
    pub fn aspect_ratio(&self) -> f64 {
        if self.back_buffer_height == 0 {
            return 0.0;
        }
        f64::from(self.back_buffer_width) / f64::from(self.back_buffer_height)
    }

    /// Number of pixels in the back buffer.
    pub fn pixel_count(&self) -> u64 {
        u64::from(self.back_buffer_width) * u64::from(self.back_buffer_height)
    }
}

/// One candidate device configuration: an adapter, a feature level, and the
/// presentation parameters to create the device with.
///
/// Candidates are transient: built during device (re)selection, ranked, and
/// discarded once the winner has been used. Cloning copies the parameters; the
/// adapter description is immutable and shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphicsDeviceInformation {
    /// The adapter the device would be created on.
    pub adapter: Arc<GraphicsAdapter>,
    /// Feature level of the device.
    pub graphics_profile: FeatureLevel,
    /// Swap chain description.
    pub presentation_parameters: PresentationParameters,
}

/// The preferences the device manager tracks between `apply_changes` calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphicsDevicePreferences {
    /// Preferred back buffer width; 0 means "use the default".
    pub back_buffer_width: u32,
    /// Preferred back buffer height; 0 means "use the default".
    pub back_buffer_height: u32,
    /// Preferred back buffer format.
    pub back_buffer_format: PixelFormat,
    /// Preferred depth-stencil format.
    pub depth_stencil_format: DepthFormat,
    /// Present full screen.
    pub is_full_screen: bool,
    /// Feature levels to try, most preferred first.
    pub graphics_profiles: Vec<FeatureLevel>,
    /// Use the adapter's highest multisample count.
    pub prefer_multisampling: bool,
    /// Synchronize presentation with the vertical retrace.
    pub synchronize_with_vertical_retrace: bool,
    /// Output used when presenting full screen.
    pub full_screen_output_index: usize,
    /// Preferred refresh rate in hertz.
    pub refresh_rate: u32,
}

impl Default for GraphicsDevicePreferences {
    fn default() -> Self {
        Self {
            back_buffer_width: DEFAULT_BACK_BUFFER_WIDTH,
            back_buffer_height: DEFAULT_BACK_BUFFER_HEIGHT,
            back_buffer_format: PixelFormat::R8G8B8A8Unorm,
            depth_stencil_format: DepthFormat::Depth24Stencil8,
            is_full_screen: false,
            graphics_profiles: FeatureLevel::ALL_DESCENDING.to_vec(),
            prefer_multisampling: false,
            synchronize_with_vertical_retrace: true,
            full_screen_output_index: 0,
            refresh_rate: 60,
        }
    }
}

impl GraphicsDevicePreferences {
    /// The size the ranking aims for, falling back to the defaults when either
    /// dimension is unset.
    pub fn target_size(&self) -> (u32, u32) {
        if self.back_buffer_width == 0 || self.back_buffer_height == 0 {
            (DEFAULT_BACK_BUFFER_WIDTH, DEFAULT_BACK_BUFFER_HEIGHT)
        } else {
            (self.back_buffer_width, self.back_buffer_height)
        }
    }

    /// Present interval implied by the vsync preference.
    pub fn present_interval(&self) -> PresentInterval {
        if self.synchronize_with_vertical_retrace {
            PresentInterval::One
        } else {
            PresentInterval::Immediate
        }
    }
}
