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

//! Enumerations describing device capabilities and surface formats.

use serde::{Deserialize, Serialize};

/// The hardware feature level (graphics profile) of a device. Ordered from the
/// least to the most capable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FeatureLevel {
    /// Feature level 9.1.
    Level9_1,
    /// Feature level 9.2.
    Level9_2,
    /// Feature level 9.3.
    Level9_3,
    /// Feature level 10.0.
    Level10_0,
    /// Feature level 10.1.
    Level10_1,
    /// Feature level 11.0.
    Level11_0,
    /// Feature level 11.1.
    Level11_1,
    /// Feature level 12.0.
    Level12_0,
    /// Feature level 12.1.
    Level12_1,
}

impl FeatureLevel {
    /// Every level, most capable first. This is the default preference list.
    pub const ALL_DESCENDING: [FeatureLevel; 9] = [
        FeatureLevel::Level12_1,
        FeatureLevel::Level12_0,
        FeatureLevel::Level11_1,
        FeatureLevel::Level11_0,
        FeatureLevel::Level10_1,
        FeatureLevel::Level10_0,
        FeatureLevel::Level9_3,
        FeatureLevel::Level9_2,
        FeatureLevel::Level9_1,
    ];
}

/// Back buffer pixel formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelFormat {
    /// 8 bits per channel RGBA, linear.
    R8G8B8A8Unorm,
    /// 8 bits per channel RGBA, sRGB.
    R8G8B8A8UnormSrgb,
    /// 8 bits per channel BGRA, linear.
    B8G8R8A8Unorm,
    /// 8 bits per channel BGRA, sRGB.
    B8G8R8A8UnormSrgb,
    /// 10 bits per color channel, 2 bits alpha.
    R10G10B10A2Unorm,
    /// 16-bit float per channel.
    R16G16B16A16Float,
    /// 16-bit packed 5/6/5.
    B5G6R5Unorm,
    /// 16-bit packed 5/5/5/1.
    B5G5R5A1Unorm,
}

impl PixelFormat {
    /// Storage size of one pixel. Formats of equal size form a "bit-depth family".
    pub fn bits_per_pixel(self) -> u32 {
        match self {
            PixelFormat::R16G16B16A16Float => 64,
            PixelFormat::R8G8B8A8Unorm
            | PixelFormat::R8G8B8A8UnormSrgb
            | PixelFormat::B8G8R8A8Unorm
            | PixelFormat::B8G8R8A8UnormSrgb
            | PixelFormat::R10G10B10A2Unorm => 32,
            PixelFormat::B5G6R5Unorm | PixelFormat::B5G5R5A1Unorm => 16,
        }
    }
}

/// Depth-stencil buffer formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DepthFormat {
    /// No depth buffer.
    None,
    /// 16-bit depth.
    Depth16,
    /// 24-bit depth, 8-bit stencil.
    Depth24Stencil8,
    /// 32-bit float depth.
    Depth32,
}

/// Number of samples per pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MultisampleCount {
    /// No multisampling.
    None,
    /// 2 samples.
    X2,
    /// 4 samples.
    X4,
    /// 8 samples.
    X8,
}

impl MultisampleCount {
    /// The sample count as a number.
    pub fn samples(self) -> u32 {
        match self {
            MultisampleCount::None => 1,
            MultisampleCount::X2 => 2,
            MultisampleCount::X4 => 4,
            MultisampleCount::X8 => 8,
        }
    }
}

/// How presentation synchronizes with the display's vertical retrace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PresentInterval {
    /// Present immediately, possibly tearing.
    Immediate,
    /// Wait for one vertical retrace.
    One,
    /// Wait for two vertical retraces.
    Two,
}
