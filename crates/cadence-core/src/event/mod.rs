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

//! Provides the event channel used between the game's collaborators.
//!
//! The platform publishes [`WindowEvent`](crate::platform::WindowEvent)s and the
//! graphics device manager publishes
//! [`GraphicsDeviceEvent`](crate::graphics::GraphicsDeviceEvent)s. The game owns the
//! receiving end of each bus and drains it at well-defined points of the tick, so no
//! callback ever re-enters the orchestrator.

mod bus;

pub use self::bus::EventBus;
