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

//! Defines the hierarchy of error types for the game loop and its collaborators.

use std::fmt;

/// The lifecycle phase a game system was in when it returned an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemPhase {
    /// `GameSystem::initialize`.
    Initialize,
    /// `Contentable::load_content`.
    LoadContent,
    /// `Contentable::unload_content`.
    UnloadContent,
    /// `Updateable::update`.
    Update,
    /// `Drawable::draw`.
    Draw,
    /// `GameSystem::shutdown`.
    Shutdown,
}

impl fmt::Display for SystemPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SystemPhase::Initialize => "initialize",
            SystemPhase::LoadContent => "load_content",
            SystemPhase::UnloadContent => "unload_content",
            SystemPhase::Update => "update",
            SystemPhase::Draw => "draw",
            SystemPhase::Shutdown => "shutdown",
        };
        f.write_str(name)
    }
}

/// An error reported by a graphics device, its presenter, or the adapter enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// The device was physically removed or its driver crashed.
    DeviceRemoved,
    /// The device was reset by the driver and must be recreated.
    DeviceReset,
    /// No adapter/mode combination satisfies the current preferences.
    NoCompatibleDevice,
    /// An operation needed a device but none has been created yet.
    NotCreated,
    /// Adapter enumeration failed.
    EnumerationFailed(String),
    /// The backend refused to create a device from the chosen configuration.
    CreationFailed(String),
    /// The presenter could not be resized or reconfigured in place.
    ResizeFailed(String),
    /// Presenting the back buffer failed for a reason other than device loss.
    PresentFailed(String),
}

impl DeviceError {
    /// Returns `true` for the conditions that are recovered by recreating the device.
    pub fn is_device_lost(&self) -> bool {
        matches!(self, DeviceError::DeviceRemoved | DeviceError::DeviceReset)
    }
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceError::DeviceRemoved => write!(f, "The graphics device was removed."),
            DeviceError::DeviceReset => write!(f, "The graphics device was reset."),
            DeviceError::NoCompatibleDevice => {
                write!(f, "No graphics device matches the requested preferences.")
            }
            DeviceError::NotCreated => write!(f, "No graphics device has been created."),
            DeviceError::EnumerationFailed(msg) => {
                write!(f, "Graphics adapter enumeration failed: {msg}")
            }
            DeviceError::CreationFailed(msg) => {
                write!(f, "Failed to create graphics device: {msg}")
            }
            DeviceError::ResizeFailed(msg) => write!(f, "Failed to resize presenter: {msg}"),
            DeviceError::PresentFailed(msg) => write!(f, "Failed to present frame: {msg}"),
        }
    }
}

impl std::error::Error for DeviceError {}

/// A high-level error returned by the game orchestrator.
#[derive(Debug)]
pub enum GameError {
    /// A user system returned an error from one of its callbacks.
    System {
        /// The name reported by the failing system.
        system: String,
        /// The callback that failed.
        phase: SystemPhase,
        /// The error returned by the system.
        source: anyhow::Error,
    },
    /// A device, presenter, or adapter operation failed.
    Device(DeviceError),
    /// A service the game depends on was never registered.
    ServiceNotRegistered(&'static str),
    /// The game settings are inconsistent.
    InvalidSettings(String),
    /// `start` was called on a game that is already running.
    AlreadyRunning,
    /// An operation needs a running game.
    NotRunning,
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::System {
                system,
                phase,
                source,
            } => write!(f, "System '{system}' failed during {phase}: {source}"),
            GameError::Device(err) => write!(f, "Graphics device error: {err}"),
            GameError::ServiceNotRegistered(name) => {
                write!(f, "Required service '{name}' is not registered.")
            }
            GameError::InvalidSettings(msg) => write!(f, "Invalid game settings: {msg}"),
            GameError::AlreadyRunning => write!(f, "The game is already running."),
            GameError::NotRunning => write!(f, "The game is not running."),
        }
    }
}

impl std::error::Error for GameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GameError::System { source, .. } => Some(source.as_ref()),
            GameError::Device(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DeviceError> for GameError {
    fn from(err: DeviceError) -> Self {
        GameError::Device(err)
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;

    #[test]
    fn device_lost_classification() {
        assert!(DeviceError::DeviceRemoved.is_device_lost());
        assert!(DeviceError::DeviceReset.is_device_lost());
        assert!(!DeviceError::PresentFailed("timeout".into()).is_device_lost());
        assert!(!DeviceError::NoCompatibleDevice.is_device_lost());
    }

    #[test]
    fn system_error_display_and_source() {
        let err = GameError::System {
            system: "Physics".to_string(),
            phase: SystemPhase::Update,
            source: anyhow::anyhow!("solver diverged"),
        };
        assert_eq!(
            format!("{err}"),
            "System 'Physics' failed during update: solver diverged"
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn device_error_wraps_into_game_error() {
        let err: GameError = DeviceError::CreationFailed("out of memory".into()).into();
        assert_eq!(
            format!("{err}"),
            "Graphics device error: Failed to create graphics device: out of memory"
        );
        assert!(err.source().is_some());
    }
}
