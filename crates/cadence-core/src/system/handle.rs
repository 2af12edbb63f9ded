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

use super::facets::GameSystem;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError};

/// A shared reference to a registered game system.
///
/// Identity is the identity of the allocation: two handles are equal only if they
/// point at the same system. An application that wants typed access to its system
/// keeps an `Arc<Mutex<S>>` and converts a clone with `SystemHandle::from`.
#[derive(Clone)]
pub struct SystemHandle {
    inner: Arc<Mutex<dyn GameSystem>>,
}

impl SystemHandle {
    /// Wraps a system in a new shared handle.
    pub fn new<S: GameSystem + 'static>(system: S) -> Self {
        Self::from(Arc::new(Mutex::new(system)))
    }

    /// Locks the system. A poisoned lock is recovered, since the registry's own
    /// state never lives inside a system.
    pub fn lock(&self) -> MutexGuard<'_, dyn GameSystem + 'static> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Locks the system unless it is already locked, e.g. because the caller is
    /// running inside one of this system's own callbacks.
    pub fn try_lock(&self) -> Option<MutexGuard<'_, dyn GameSystem + 'static>> {
        match self.inner.try_lock() {
            Ok(guard) => Some(guard),
            Err(TryLockError::Poisoned(poisoned)) => Some(poisoned.into_inner()),
            Err(TryLockError::WouldBlock) => None,
        }
    }

    /// Returns `true` if both handles refer to the same system.
    pub fn ptr_eq(&self, other: &SystemHandle) -> bool {
        self.id() == other.id()
    }

    /// Address-based identifier, stable for the lifetime of the system.
    pub fn id(&self) -> usize {
        Arc::as_ptr(&self.inner) as *const () as usize
    }
}

impl<S: GameSystem + 'static> From<Arc<Mutex<S>>> for SystemHandle {
    fn from(system: Arc<Mutex<S>>) -> Self {
        Self { inner: system }
    }
}

impl PartialEq for SystemHandle {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for SystemHandle {}

impl fmt::Debug for SystemHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SystemHandle({:#x})", self.id())
    }
}
