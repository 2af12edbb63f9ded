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

//! Errors of the effect compilation pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Failure while tracking, watching, or compiling an effect.
#[derive(Error, Debug)]
pub enum EffectError {
    /// A source file could not be read.
    #[error("failed to read '{}': {source}", path.display())]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The compiler rejected the source.
    #[error("failed to compile '{}': {message}", path.display())]
    Compile {
        /// File that failed.
        path: PathBuf,
        /// Compiler diagnostic.
        message: String,
    },

    /// The filesystem watcher could not be created.
    #[error("file watcher unavailable: {0}")]
    Watch(#[from] notify::Error),

    /// The worker thread could not be spawned.
    #[error("failed to spawn the compiler thread: {0}")]
    Spawn(#[source] std::io::Error),

    /// The worker thread is already running.
    #[error("the effect compiler is already running")]
    AlreadyRunning,
}
