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

//! # Cadence Core
//!
//! Foundational crate containing traits, core types, and interface contracts
//! that define the game loop's architecture.
//!
//! Nothing in this crate talks to a real device or window. The orchestrator in
//! `cadence-sdk` is written purely against the contracts defined here, and
//! concrete collaborators live in `cadence-infra`.

#![warn(missing_docs)]

pub mod error;
pub mod event;
pub mod graphics;
pub mod platform;
pub mod service_registry;
pub mod system;
pub mod time;

pub use error::{DeviceError, GameError, SystemPhase};
pub use event::EventBus;
pub use service_registry::ServiceRegistry;
pub use system::{Contentable, Drawable, GameSystem, OrderKey, SystemHandle, Updateable};
pub use time::{GameClock, GameTime, ManualTimeSource, SystemTimeSource, TimeSource};
