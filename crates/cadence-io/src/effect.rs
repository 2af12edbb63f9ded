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

//! Effect identities, compiler contract, and compilation results.

use crate::error::EffectError;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Identifies a tracked effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EffectId(pub(crate) u32);

impl EffectId {
    /// The raw identifier.
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for EffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "effect#{}", self.0)
    }
}

/// What a compiler produces for one effect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectOutput {
    /// Compiled bytecode.
    pub bytecode: Vec<u8>,
    /// Files the source pulled in, besides the source itself.
    pub dependencies: Vec<PathBuf>,
}

/// Turns an effect source file into bytecode.
///
/// Called on the compiler thread only.
pub trait EffectCompiler: Send {
    /// Compiles the effect at `path`.
    fn compile(&mut self, path: &Path) -> Result<EffectOutput, EffectError>;
}

impl<F> EffectCompiler for F
where
    F: FnMut(&Path) -> Result<EffectOutput, EffectError> + Send,
{
    fn compile(&mut self, path: &Path) -> Result<EffectOutput, EffectError> {
        self(path)
    }
}

/// A successful compilation, handed from the compiler thread to the main thread.
#[derive(Debug, Clone)]
pub struct CompiledEffect {
    /// The effect.
    pub id: EffectId,
    /// Its source file.
    pub path: PathBuf,
    /// Bytecode. Shared so renderers holding the previous version keep it alive.
    pub bytecode: Arc<[u8]>,
    /// Files the source pulled in.
    pub dependencies: Vec<PathBuf>,
    /// Increases with every successful compilation of any effect.
    pub generation: u64,
}

/// Outcome notifications of the compiler thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EffectEvent {
    /// New bytecode is queued for the next update.
    Compiled {
        /// The effect.
        id: EffectId,
        /// Generation of the new bytecode.
        generation: u64,
    },
    /// Compilation failed; the previous bytecode stays in use.
    Failed {
        /// The effect.
        id: EffectId,
        /// Its source file.
        path: PathBuf,
        /// Rendered error.
        message: String,
    },
}

#[derive(Debug, Clone)]
pub(crate) struct TrackedEffect {
    pub(crate) path: PathBuf,
    pub(crate) dependencies: Vec<PathBuf>,
}

impl TrackedEffect {
    pub(crate) fn depends_on(&self, file: &Path) -> bool {
        self.path == file || self.dependencies.iter().any(|d| d == file)
    }

    pub(crate) fn files(&self) -> impl Iterator<Item = &PathBuf> {
        std::iter::once(&self.path).chain(self.dependencies.iter())
    }
}
