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

//! The Cadence game orchestrator.
//!
//! This crate turns the contracts of `cadence-core` into a running game loop:
//!
//! - [`Game`] owns the platform, the graphics device manager, the clock and the
//!   system collection, and runs one [`tick`](Game::tick) per pump iteration.
//! - [`TimestepScheduler`] decides how many fixed (or variable) update steps each
//!   tick runs.
//! - [`GameSystemCollection`] keeps the update and draw views ordered and
//!   dispatches to them.
//! - [`GraphicsDeviceManager`] selects, creates, resets and recovers the device.

#![warn(missing_docs)]

pub mod control;
pub mod game;
pub mod graphics_device_manager;
pub mod ranking;
pub mod registry;
pub mod settings;
pub mod timestep;

pub use control::GameControl;
pub use game::Game;
pub use graphics_device_manager::{GraphicsDeviceManager, PreparingDeviceSettings};
pub use ranking::rank_devices;
pub use registry::GameSystemCollection;
pub use settings::GameSettings;
pub use timestep::{StepPlan, TimestepScheduler};

/// Everything a game built on Cadence usually imports.
pub mod prelude {
    pub use crate::{Game, GameControl, GameSettings, GameSystemCollection};
    pub use cadence_core::{
        Contentable, Drawable, GameError, GameSystem, GameTime, OrderKey, SystemHandle,
        Updateable,
    };
}
