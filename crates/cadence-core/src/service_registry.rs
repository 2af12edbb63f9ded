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

//! A type-keyed service locator owned by the game.
//!
//! Systems that need a shared collaborator (an asset cache, an audio mixer, the
//! effect library) fetch it from the game's [`ServiceRegistry`] instead of being
//! wired to it by hand. Services are stored behind `Arc` so a system can keep its
//! own reference after lookup.
//!
//! ```rust
//! use cadence_core::service_registry::ServiceRegistry;
//!
//! struct AudioMixer { voices: u32 }
//!
//! let mut services = ServiceRegistry::new();
//! services.insert(AudioMixer { voices: 32 });
//!
//! let mixer = services.require::<AudioMixer>().unwrap();
//! assert_eq!(mixer.voices, 32);
//! ```

use crate::error::GameError;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

struct ServiceEntry {
    name: &'static str,
    service: Arc<dyn Any + Send + Sync>,
}

/// A service registry keyed by [`TypeId`].
#[derive(Default)]
pub struct ServiceRegistry {
    services: HashMap<TypeId, ServiceEntry>,
}

impl ServiceRegistry {
    /// Creates an empty service registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            services: HashMap::new(),
        }
    }

    /// Registers `service`, replacing any previous service of the same type.
    pub fn insert<T: Send + Sync + 'static>(&mut self, service: T) {
        self.insert_arc(Arc::new(service));
    }

    /// Registers an already shared service.
    pub fn insert_arc<T: Send + Sync + 'static>(&mut self, service: Arc<T>) {
        let name = std::any::type_name::<T>();
        let previous = self
            .services
            .insert(TypeId::of::<T>(), ServiceEntry { name, service });
        if previous.is_some() {
            log::debug!("ServiceRegistry: replaced service {name}");
        } else {
            log::debug!("ServiceRegistry: registered service {name}");
        }
    }

    /// Returns the service of type `T`, if registered.
    #[must_use]
    pub fn get<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.services
            .get(&TypeId::of::<T>())
            .and_then(|entry| Arc::clone(&entry.service).downcast::<T>().ok())
    }

    /// Returns the service of type `T` or a configuration error naming it.
    pub fn require<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, GameError> {
        self.get::<T>()
            .ok_or(GameError::ServiceNotRegistered(std::any::type_name::<T>()))
    }

    /// Unregisters and returns the service of type `T`.
    pub fn remove<T: Send + Sync + 'static>(&mut self) -> Option<Arc<T>> {
        self.services
            .remove(&TypeId::of::<T>())
            .and_then(|entry| entry.service.downcast::<T>().ok())
    }

    /// Returns `true` if a service of type `T` is registered.
    #[must_use]
    pub fn contains<T: Send + Sync + 'static>(&self) -> bool {
        self.services.contains_key(&TypeId::of::<T>())
    }

    /// Type names of every registered service, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.services.values().map(|e| e.name).collect();
        names.sort_unstable();
        names
    }

    /// Returns the number of registered services.
    #[must_use]
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Returns `true` if no services are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}
