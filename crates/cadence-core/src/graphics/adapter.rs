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

//! Adapter descriptions and the owned adapter registry.

use super::format::{FeatureLevel, MultisampleCount, PixelFormat};
use crate::error::DeviceError;
use std::sync::Arc;

/// A full-screen mode supported by an output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DisplayMode {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel format of the mode.
    pub format: PixelFormat,
    /// Refresh rate in hertz.
    pub refresh_rate: u32,
}

/// A display connected to an adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphicsOutput {
    /// Display name reported by the system.
    pub name: String,
    /// Desktop width in pixels.
    pub desktop_width: u32,
    /// Desktop height in pixels.
    pub desktop_height: u32,
    /// Every full-screen mode the output accepts.
    pub display_modes: Vec<DisplayMode>,
}

/// Provides standardized, backend-agnostic information about a graphics adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphicsAdapter {
    /// Position of the adapter in the enumeration.
    pub index: usize,
    /// The name of the adapter (e.g., "NVIDIA GeForce RTX 4090").
    pub description: String,
    /// `true` for the adapter the system renders the desktop with.
    pub is_default: bool,
    /// Highest feature level the adapter supports.
    pub max_feature_level: FeatureLevel,
    /// Multisample counts usable for back buffers.
    pub multisample_counts: Vec<MultisampleCount>,
    /// Displays attached to the adapter.
    pub outputs: Vec<GraphicsOutput>,
}

impl GraphicsAdapter {
    /// Returns `true` if a device of `level` can be created on this adapter.
    pub fn is_profile_supported(&self, level: FeatureLevel) -> bool {
        level <= self.max_feature_level
    }

    /// Highest supported multisample count.
    pub fn max_multisample_count(&self) -> MultisampleCount {
        self.multisample_counts
            .iter()
            .copied()
            .max()
            .unwrap_or(MultisampleCount::None)
    }
}

/// Discovers the adapters present on the machine.
///
/// A concrete implementation lives with the platform; the headless one in
/// `cadence-infra` returns a fixed list.
pub trait AdapterEnumerator {
    /// Queries the system for its adapters.
    fn enumerate(&mut self) -> Result<Vec<GraphicsAdapter>, DeviceError>;
}

/// The explicitly owned adapter list handed to the device manager.
///
/// Enumeration is lazy: the first call to [`adapters`](Self::adapters) or an
/// explicit [`initialize`](Self::initialize) queries the enumerator. A forced
/// device recreation calls [`reinitialize`](Self::reinitialize) so that hot-plugged
/// or removed adapters are seen.
pub struct AdapterRegistry {
    enumerator: Box<dyn AdapterEnumerator>,
    adapters: Vec<Arc<GraphicsAdapter>>,
    initialized: bool,
    generation: u64,
}

impl AdapterRegistry {
    /// Creates an uninitialized registry.
    pub fn new(enumerator: Box<dyn AdapterEnumerator>) -> Self {
        Self {
            enumerator,
            adapters: Vec::new(),
            initialized: false,
            generation: 0,
        }
    }

    /// Enumerates adapters if that has not happened since the last dispose.
    pub fn initialize(&mut self) -> Result<(), DeviceError> {
        if self.initialized {
            return Ok(());
        }
        let adapters = self.enumerator.enumerate()?;
        log::info!("AdapterRegistry: found {} adapter(s)", adapters.len());
        for adapter in &adapters {
            log::debug!(
                "  [{}] {} (max {:?}, default: {})",
                adapter.index,
                adapter.description,
                adapter.max_feature_level,
                adapter.is_default
            );
        }
        self.adapters = adapters.into_iter().map(Arc::new).collect();
        self.initialized = true;
        self.generation += 1;
        Ok(())
    }

    /// Drops the current adapter list.
    pub fn dispose(&mut self) {
        self.adapters.clear();
        self.initialized = false;
    }

    /// Disposes and enumerates again.
    pub fn reinitialize(&mut self) -> Result<(), DeviceError> {
        self.dispose();
        self.initialize()
    }

    /// The enumerated adapters, enumerating on first use.
    pub fn adapters(&mut self) -> Result<&[Arc<GraphicsAdapter>], DeviceError> {
        self.initialize()?;
        Ok(&self.adapters)
    }

    /// The default adapter, if any.
    pub fn default_adapter(&mut self) -> Result<Option<Arc<GraphicsAdapter>>, DeviceError> {
        Ok(self.adapters()?.iter().find(|a| a.is_default).cloned())
    }

    /// Returns `true` if the list is currently populated.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Number of successful enumerations so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("adapters", &self.adapters.len())
            .field("initialized", &self.initialized)
            .field("generation", &self.generation)
            .finish()
    }
}
