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

//! Game settings loaded from JSON.

use cadence_core::graphics::GraphicsDevicePreferences;
use cadence_core::GameError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Timing and graphics configuration of a [`Game`](crate::Game).
///
/// Every field has a default, so a settings file only needs to name what it
/// changes. Durations are written as fractional seconds:
///
/// ```json
/// { "is_fixed_time_step": false, "max_elapsed_time": 0.25,
///   "graphics": { "back_buffer_width": 1280, "back_buffer_height": 720 } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    /// Run updates at a fixed rate instead of once per frame.
    pub is_fixed_time_step: bool,
    /// Duration of one fixed update step.
    #[serde(with = "duration_secs")]
    pub target_elapsed_time: Duration,
    /// Measured frame times are clamped to this before being scheduled.
    #[serde(with = "duration_secs")]
    pub max_elapsed_time: Duration,
    /// How long each tick sleeps while the window is inactive.
    #[serde(with = "duration_secs")]
    pub inactive_sleep_time: Duration,
    /// How long the device manager waits before recreating a lost device.
    #[serde(with = "duration_secs")]
    pub device_lost_sleep: Duration,
    /// Initial graphics device preferences.
    pub graphics: GraphicsDevicePreferences,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            is_fixed_time_step: true,
            target_elapsed_time: Duration::from_nanos(1_000_000_000 / 60),
            max_elapsed_time: Duration::from_millis(500),
            inactive_sleep_time: Duration::from_millis(20),
            device_lost_sleep: Duration::from_millis(20),
            graphics: GraphicsDevicePreferences::default(),
        }
    }
}

impl GameSettings {
    /// Parses settings from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, GameError> {
        serde_json::from_str(json).map_err(|e| GameError::InvalidSettings(e.to_string()))
    }

    /// Reads and parses a JSON settings file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GameError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            GameError::InvalidSettings(format!("cannot read {}: {e}", path.display()))
        })?;
        let settings = Self::from_json_str(&text)?;
        log::info!("GameSettings: loaded from {}", path.display());
        Ok(settings)
    }

    /// Serializes the settings as pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String, GameError> {
        serde_json::to_string_pretty(self).map_err(|e| GameError::InvalidSettings(e.to_string()))
    }

    /// Rejects settings the scheduler cannot run with.
    pub fn validate(&self) -> Result<(), GameError> {
        if self.target_elapsed_time.is_zero() {
            return Err(GameError::InvalidSettings(
                "target_elapsed_time must be greater than zero".into(),
            ));
        }
        if self.max_elapsed_time < self.target_elapsed_time {
            return Err(GameError::InvalidSettings(format!(
                "max_elapsed_time ({:?}) is shorter than target_elapsed_time ({:?})",
                self.max_elapsed_time, self.target_elapsed_time
            )));
        }
        if self.graphics.graphics_profiles.is_empty() {
            return Err(GameError::InvalidSettings(
                "graphics.graphics_profiles must name at least one feature level".into(),
            ));
        }
        Ok(())
    }
}

mod duration_secs {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs)
            .map_err(|e| D::Error::custom(format!("invalid duration {secs}: {e}")))
    }
}
