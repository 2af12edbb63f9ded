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

use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::Arc;

#[derive(Debug)]
struct OrderKeyInner {
    value: AtomicI32,
    changed: AtomicBool,
}

/// A shared, thread-safe ordering key owned by an update or draw facet.
///
/// The registry keeps a clone of the key taken at registration. Setting a new
/// value raises a change flag that the registry consumes once per dispatch,
/// before it snapshots the view, and re-inserts only the systems whose key
/// changed. Changing an order therefore never re-enters the registry.
#[derive(Debug, Clone)]
pub struct OrderKey {
    inner: Arc<OrderKeyInner>,
}

impl OrderKey {
    /// Creates a key with the given order.
    pub fn new(order: i32) -> Self {
        Self {
            inner: Arc::new(OrderKeyInner {
                value: AtomicI32::new(order),
                changed: AtomicBool::new(false),
            }),
        }
    }

    /// Current order value.
    pub fn get(&self) -> i32 {
        self.inner.value.load(Ordering::Acquire)
    }

    /// Sets the order. Only a different value flags the key as changed.
    pub fn set(&self, order: i32) {
        let previous = self.inner.value.swap(order, Ordering::AcqRel);
        if previous != order {
            self.inner.changed.store(true, Ordering::Release);
        }
    }

    /// Returns whether the order changed since the last call, clearing the flag.
    pub fn take_changed(&self) -> bool {
        self.inner.changed.swap(false, Ordering::AcqRel)
    }
}

impl Default for OrderKey {
    fn default() -> Self {
        Self::new(0)
    }
}
