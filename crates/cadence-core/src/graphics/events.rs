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

/// Lifecycle notifications published by the graphics device manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphicsDeviceEvent {
    /// A new device was created. Device-dependent content must be (re)loaded.
    Created,
    /// The current device is about to be disposed.
    Disposing,
    /// The presenter is about to be reset in place.
    Resetting,
    /// The presenter was reset in place; content stays valid.
    Reset,
    /// The device was lost and is being recreated.
    Lost,
}
