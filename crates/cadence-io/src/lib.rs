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

//! # Cadence IO
//!
//! Hot reload of effects. An [`EffectCompilerSystem`] tracks effect source files
//! and the files they include, recompiles them on a background thread when any
//! of them changes, and swaps the new bytecode in during its update.

#![warn(missing_docs)]

pub mod effect;
pub mod error;
pub mod include;
mod stamp;
pub mod system;
mod watcher;

pub use effect::{CompiledEffect, EffectCompiler, EffectEvent, EffectId, EffectOutput};
pub use error::EffectError;
pub use include::IncludeCompiler;
pub use system::{EffectCompilerConfig, EffectCompilerSystem};
