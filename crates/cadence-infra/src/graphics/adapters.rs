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

//! A scriptable adapter list.

use cadence_core::graphics::{
    AdapterEnumerator, DisplayMode, FeatureLevel, GraphicsAdapter, GraphicsOutput,
    MultisampleCount, PixelFormat,
};
use cadence_core::DeviceError;
use std::sync::{Arc, Mutex, PoisonError};

/// The adapters a fresh headless platform reports: a default discrete adapter
/// with every multisample count, and a software adapter capped at 10.1.
pub fn default_adapters() -> Vec<GraphicsAdapter> {
    let modes = |refresh_rates: &[u32]| -> Vec<DisplayMode> {
        let mut modes = Vec::new();
        for &(width, height) in &[(1920, 1080), (1280, 720), (1024, 768), (800, 600)] {
            for &refresh_rate in refresh_rates {
                modes.push(DisplayMode {
                    width,
                    height,
                    format: PixelFormat::R8G8B8A8Unorm,
                    refresh_rate,
                });
            }
        }
        modes
    };

    vec![
        GraphicsAdapter {
            index: 0,
            description: "Headless Discrete Adapter".to_string(),
            is_default: true,
            max_feature_level: FeatureLevel::Level12_1,
            multisample_counts: vec![
                MultisampleCount::None,
                MultisampleCount::X2,
                MultisampleCount::X4,
                MultisampleCount::X8,
            ],
            outputs: vec![GraphicsOutput {
                name: "Headless Display 1".to_string(),
                desktop_width: 1920,
                desktop_height: 1080,
                display_modes: modes(&[60, 144]),
            }],
        },
        GraphicsAdapter {
            index: 1,
            description: "Headless Software Adapter".to_string(),
            is_default: false,
            max_feature_level: FeatureLevel::Level10_1,
            multisample_counts: vec![MultisampleCount::None],
            outputs: vec![GraphicsOutput {
                name: "Headless Display 2".to_string(),
                desktop_width: 1280,
                desktop_height: 720,
                display_modes: modes(&[60]),
            }],
        },
    ]
}

/// Enumerates from a list that can be swapped at runtime, e.g. to simulate an
/// adapter being unplugged before a forced re-enumeration.
#[derive(Debug, Clone)]
pub struct HeadlessAdapterEnumerator {
    adapters: Arc<Mutex<Vec<GraphicsAdapter>>>,
}

impl HeadlessAdapterEnumerator {
    /// Creates an enumerator reporting `adapters`.
    pub fn new(adapters: Vec<GraphicsAdapter>) -> Self {
        Self {
            adapters: Arc::new(Mutex::new(adapters)),
        }
    }

    /// Replaces the reported adapters. Takes effect at the next enumeration.
    pub fn set_adapters(&self, adapters: Vec<GraphicsAdapter>) {
        *self.adapters.lock().unwrap_or_else(PoisonError::into_inner) = adapters;
    }
}

impl AdapterEnumerator for HeadlessAdapterEnumerator {
    fn enumerate(&mut self) -> Result<Vec<GraphicsAdapter>, DeviceError> {
        let adapters = self
            .adapters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if adapters.is_empty() {
            return Err(DeviceError::EnumerationFailed(
                "no headless adapter configured".into(),
            ));
        }
        Ok(adapters)
    }
}
