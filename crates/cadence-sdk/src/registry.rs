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

//! The ordered game system collection.
//!
//! Systems live in up to three views: updateables sorted by update order,
//! drawables sorted by draw order, and the set of contentables. Each view sits
//! behind its own lock. Dispatch copies a view under its lock, releases the lock,
//! then calls the systems, so a system may add or remove systems (itself included)
//! from inside its own callback. An added system joins the next dispatch; a
//! removed one is skipped for the rest of the current dispatch as well.

use cadence_core::{GameError, GameTime, OrderKey, SystemHandle, SystemPhase};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

struct ViewEntry {
    handle: SystemHandle,
    key: OrderKey,
    order: i32,
}

/// A view kept sorted by order key, stable among equal keys.
#[derive(Default)]
struct OrderedView {
    entries: Vec<ViewEntry>,
}

impl OrderedView {
    fn insert(&mut self, handle: SystemHandle, key: OrderKey) {
        let order = key.get();
        let position = self.entries.partition_point(|e| e.order <= order);
        self.entries.insert(position, ViewEntry { handle, key, order });
    }

    fn remove(&mut self, handle: &SystemHandle) -> bool {
        match self.entries.iter().position(|e| e.handle.ptr_eq(handle)) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Re-inserts the entries whose key changed since the last refresh.
    fn refresh(&mut self) {
        let mut changed = Vec::new();
        let mut index = 0;
        while index < self.entries.len() {
            let entry = &self.entries[index];
            // The flag is the fast path; the value check also catches a key shared
            // by two facets whose flag the other view already consumed.
            let dirty = entry.key.take_changed() | (entry.key.get() != entry.order);
            if dirty {
                changed.push(self.entries.remove(index));
            } else {
                index += 1;
            }
        }
        for entry in changed {
            log::trace!(
                "GameSystemCollection: reordering {:?} from {} to {}",
                entry.handle,
                entry.order,
                entry.key.get()
            );
            self.insert(entry.handle, entry.key);
        }
    }

    fn snapshot(&mut self) -> Vec<SystemHandle> {
        self.refresh();
        self.entries.iter().map(|e| e.handle.clone()).collect()
    }

    fn orders(&self) -> Vec<i32> {
        self.entries.iter().map(|e| e.order).collect()
    }
}

struct ContentEntry {
    handle: SystemHandle,
    loaded: bool,
}

/// The dynamic, ordered set of systems a game dispatches to.
///
/// Shared as `Arc<GameSystemCollection>` so systems can hold it and mutate it from
/// their callbacks.
#[derive(Default)]
pub struct GameSystemCollection {
    systems: Mutex<Vec<SystemHandle>>,
    pending: Mutex<Vec<SystemHandle>>,
    updateables: Mutex<OrderedView>,
    drawables: Mutex<OrderedView>,
    contentables: Mutex<Vec<ContentEntry>>,
    deferred_unloads: Mutex<Vec<SystemHandle>>,
    is_running: AtomicBool,
    is_content_loaded: AtomicBool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn system_error(name: &str, phase: SystemPhase, source: anyhow::Error) -> GameError {
    GameError::System {
        system: name.to_string(),
        phase,
        source,
    }
}

impl GameSystemCollection {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a system.
    ///
    /// Its facets are probed once. If the collection is running the system is
    /// initialized immediately, otherwise it waits for
    /// [`initialize_pending`](Self::initialize_pending). A contentable system added
    /// after content was loaded has its content loaded right away. Adding a system
    /// twice is a no-op.
    pub fn add(&self, system: impl Into<SystemHandle>) -> Result<(), GameError> {
        let handle = system.into();
        {
            let mut systems = lock(&self.systems);
            if systems.iter().any(|s| s.ptr_eq(&handle)) {
                log::debug!("GameSystemCollection: {handle:?} is already registered");
                return Ok(());
            }
            systems.push(handle.clone());
        }

        let (name, update_key, draw_key, is_contentable) = {
            let mut system = handle.lock();
            (
                system.name().to_string(),
                system.as_updateable().map(|u| u.update_order().clone()),
                system.as_drawable().map(|d| d.draw_order().clone()),
                system.as_contentable().is_some(),
            )
        };

        if let Some(key) = update_key {
            lock(&self.updateables).insert(handle.clone(), key);
        }
        if let Some(key) = draw_key {
            lock(&self.drawables).insert(handle.clone(), key);
        }
        if is_contentable {
            lock(&self.contentables).push(ContentEntry {
                handle: handle.clone(),
                loaded: false,
            });
        }
        log::debug!("GameSystemCollection: added '{name}'");

        if self.is_running() {
            Self::initialize_one(&handle)?;
        } else {
            lock(&self.pending).push(handle.clone());
        }

        if is_contentable && self.is_content_loaded() {
            self.load_one(&handle)?;
        }
        Ok(())
    }

    /// Unregisters a system from every view.
    ///
    /// Its content is unloaded if it was loaded. When the system is busy, because
    /// it removed itself from inside a callback, the unload runs at the end of the
    /// current dispatch instead. Returns whether the system was registered.
    pub fn remove(&self, system: &SystemHandle) -> Result<bool, GameError> {
        let was_registered = {
            let mut systems = lock(&self.systems);
            let before = systems.len();
            systems.retain(|s| !s.ptr_eq(system));
            systems.len() != before
        };
        if !was_registered {
            return Ok(false);
        }

        lock(&self.pending).retain(|s| !s.ptr_eq(system));
        lock(&self.updateables).remove(system);
        lock(&self.drawables).remove(system);

        let was_loaded = {
            let mut contentables = lock(&self.contentables);
            match contentables.iter().position(|c| c.handle.ptr_eq(system)) {
                Some(index) => contentables.remove(index).loaded,
                None => false,
            }
        };
        log::debug!("GameSystemCollection: removed {system:?}");

        if was_loaded {
            match system.try_lock() {
                Some(mut guard) => {
                    if let Some(content) = guard.as_contentable() {
                        if let Err(source) = content.unload_content() {
                            return Err(system_error(
                                guard.name(),
                                SystemPhase::UnloadContent,
                                source,
                            ));
                        }
                    }
                }
                None => lock(&self.deferred_unloads).push(system.clone()),
            }
        }
        Ok(true)
    }

    /// Marks the collection as running and initializes every pending system.
    pub fn initialize_pending(&self) -> Result<(), GameError> {
        self.is_running.store(true, Ordering::Release);
        loop {
            let pending = std::mem::take(&mut *lock(&self.pending));
            if pending.is_empty() {
                return Ok(());
            }
            for handle in &pending {
                Self::initialize_one(handle)?;
            }
        }
    }

    /// Loads the content of every contentable whose content is not loaded.
    pub fn load_content(&self) -> Result<(), GameError> {
        self.is_content_loaded.store(true, Ordering::Release);
        let targets: Vec<SystemHandle> = lock(&self.contentables)
            .iter()
            .filter(|c| !c.loaded)
            .map(|c| c.handle.clone())
            .collect();
        for handle in &targets {
            self.load_one(handle)?;
        }
        Ok(())
    }

    /// Unloads the content of every contentable whose content is loaded.
    pub fn unload_content(&self) -> Result<(), GameError> {
        self.is_content_loaded.store(false, Ordering::Release);
        let targets: Vec<SystemHandle> = {
            let mut contentables = lock(&self.contentables);
            contentables
                .iter_mut()
                .filter(|c| c.loaded)
                .map(|c| {
                    c.loaded = false;
                    c.handle.clone()
                })
                .collect()
        };
        let mut first_error = None;
        for handle in &targets {
            let mut guard = handle.lock();
            if let Some(content) = guard.as_contentable() {
                if let Err(source) = content.unload_content() {
                    log::error!("GameSystemCollection: unload of '{}' failed", guard.name());
                    first_error.get_or_insert_with(|| {
                        system_error(guard.name(), SystemPhase::UnloadContent, source)
                    });
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Unloads then reloads all content, e.g. after the device was recreated.
    pub fn reload_content(&self) -> Result<(), GameError> {
        log::info!("GameSystemCollection: reloading content");
        self.unload_content()?;
        self.load_content()
    }

    /// Calls `update` on every enabled updateable, in update order.
    pub fn update(&self, time: &GameTime) -> Result<(), GameError> {
        let snapshot = lock(&self.updateables).snapshot();
        let result = self.dispatch_update(&snapshot, time);
        let flushed = self.flush_deferred();
        result.and(flushed)
    }

    /// Calls `begin_draw`/`draw`/`end_draw` on every visible drawable, in draw order.
    pub fn draw(&self, time: &GameTime) -> Result<(), GameError> {
        let snapshot = lock(&self.drawables).snapshot();
        let result = self.dispatch_draw(&snapshot, time);
        let flushed = self.flush_deferred();
        result.and(flushed)
    }

    /// Runs the unloads deferred while their system was busy.
    pub fn flush_deferred(&self) -> Result<(), GameError> {
        let deferred = std::mem::take(&mut *lock(&self.deferred_unloads));
        for handle in &deferred {
            let mut guard = handle.lock();
            if let Some(content) = guard.as_contentable() {
                if let Err(source) = content.unload_content() {
                    return Err(system_error(
                        guard.name(),
                        SystemPhase::UnloadContent,
                        source,
                    ));
                }
            }
        }
        Ok(())
    }

    /// Returns whether `system` is registered.
    pub fn contains(&self, system: &SystemHandle) -> bool {
        lock(&self.systems).iter().any(|s| s.ptr_eq(system))
    }

    /// Every registered system, in registration order.
    pub fn systems(&self) -> Vec<SystemHandle> {
        lock(&self.systems).clone()
    }

    /// Number of registered systems.
    pub fn len(&self) -> usize {
        lock(&self.systems).len()
    }

    /// Returns `true` if no system is registered.
    pub fn is_empty(&self) -> bool {
        lock(&self.systems).is_empty()
    }

    /// Number of systems waiting to be initialized.
    pub fn pending_count(&self) -> usize {
        lock(&self.pending).len()
    }

    /// The update view, after applying pending order changes.
    pub fn update_order(&self) -> Vec<SystemHandle> {
        lock(&self.updateables).snapshot()
    }

    /// The draw view, after applying pending order changes.
    pub fn draw_order(&self) -> Vec<SystemHandle> {
        lock(&self.drawables).snapshot()
    }

    /// Order keys of the update view as last sorted.
    pub fn update_keys(&self) -> Vec<i32> {
        lock(&self.updateables).orders()
    }

    /// Order keys of the draw view as last sorted.
    pub fn draw_keys(&self) -> Vec<i32> {
        lock(&self.drawables).orders()
    }

    /// Whether [`initialize_pending`](Self::initialize_pending) has run.
    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::Acquire)
    }

    /// Whether content is currently loaded.
    pub fn is_content_loaded(&self) -> bool {
        self.is_content_loaded.load(Ordering::Acquire)
    }

    /// Returns to the not-running state; later additions are queued again.
    pub fn stop(&self) {
        self.is_running.store(false, Ordering::Release);
    }

    /// Stops the collection and calls `shutdown` on every system, newest first.
    ///
    /// Every system goes back to the pending queue, so the next
    /// [`initialize_pending`](Self::initialize_pending) initializes it again. All
    /// systems are shut down even if one fails; the first error is returned.
    pub fn shutdown(&self) -> Result<(), GameError> {
        self.stop();
        let systems = self.systems();
        let mut first_error = None;
        for handle in systems.iter().rev() {
            let mut guard = handle.lock();
            log::trace!("GameSystemCollection: shutting down '{}'", guard.name());
            if let Err(source) = guard.shutdown() {
                log::error!("GameSystemCollection: shutdown of '{}' failed", guard.name());
                first_error.get_or_insert_with(|| {
                    system_error(guard.name(), SystemPhase::Shutdown, source)
                });
            }
        }
        *lock(&self.pending) = systems;
        first_error.map_or(Ok(()), Err)
    }

    fn initialize_one(handle: &SystemHandle) -> Result<(), GameError> {
        let mut system = handle.lock();
        log::trace!("GameSystemCollection: initializing '{}'", system.name());
        system
            .initialize()
            .map_err(|source| system_error(system.name(), SystemPhase::Initialize, source))
    }

    fn load_one(&self, handle: &SystemHandle) -> Result<(), GameError> {
        {
            let mut guard = handle.lock();
            if let Some(content) = guard.as_contentable() {
                if let Err(source) = content.load_content() {
                    return Err(system_error(guard.name(), SystemPhase::LoadContent, source));
                }
            }
        }
        // Removal may have raced with the load; only a still-registered entry is marked.
        let mut contentables = lock(&self.contentables);
        if let Some(entry) = contentables.iter_mut().find(|c| c.handle.ptr_eq(handle)) {
            entry.loaded = true;
        }
        Ok(())
    }

    fn dispatch_update(
        &self,
        snapshot: &[SystemHandle],
        time: &GameTime,
    ) -> Result<(), GameError> {
        for handle in snapshot {
            // Removed by an earlier system of this dispatch.
            if !self.contains(handle) {
                continue;
            }
            let mut system = handle.lock();
            let outcome = match system.as_updateable() {
                Some(updateable) if updateable.enabled() => updateable.update(time),
                _ => Ok(()),
            };
            if let Err(source) = outcome {
                return Err(system_error(system.name(), SystemPhase::Update, source));
            }
        }
        Ok(())
    }

    fn dispatch_draw(
        &self,
        snapshot: &[SystemHandle],
        time: &GameTime,
    ) -> Result<(), GameError> {
        for handle in snapshot {
            if !self.contains(handle) {
                continue;
            }
            let mut system = handle.lock();
            let outcome = match system.as_drawable() {
                Some(drawable) if drawable.visible() => {
                    if drawable.begin_draw() {
                        let drawn = drawable.draw(time);
                        drawable.end_draw();
                        drawn
                    } else {
                        Ok(())
                    }
                }
                _ => Ok(()),
            };
            if let Err(source) = outcome {
                return Err(system_error(system.name(), SystemPhase::Draw, source));
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for GameSystemCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSystemCollection")
            .field("systems", &self.len())
            .field("pending", &self.pending_count())
            .field("is_running", &self.is_running())
            .field("is_content_loaded", &self.is_content_loaded())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::{Contentable, Drawable, GameSystem, Updateable};
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Journal(Mutex<Vec<String>>);

    impl Journal {
        fn push(&self, entry: String) {
            self.0.lock().unwrap().push(entry);
        }

        fn take(&self) -> Vec<String> {
            std::mem::take(&mut *self.0.lock().unwrap())
        }
    }

    struct Probe {
        name: &'static str,
        update: Option<OrderKey>,
        draw: Option<OrderKey>,
        content: bool,
        journal: Arc<Journal>,
    }

    impl Probe {
        fn new(name: &'static str, journal: &Arc<Journal>) -> Self {
            Self {
                name,
                update: None,
                draw: None,
                content: false,
                journal: Arc::clone(journal),
            }
        }
    }

    impl Updateable for Probe {
        fn update_order(&self) -> &OrderKey {
            self.update.as_ref().unwrap()
        }
        fn update(&mut self, _time: &GameTime) -> anyhow::Result<()> {
            self.journal.push(format!("update {}", self.name));
            Ok(())
        }
    }

    impl Drawable for Probe {
        fn draw_order(&self) -> &OrderKey {
            self.draw.as_ref().unwrap()
        }
        fn draw(&mut self, _time: &GameTime) -> anyhow::Result<()> {
            self.journal.push(format!("draw {}", self.name));
            Ok(())
        }
    }

    impl Contentable for Probe {
        fn load_content(&mut self) -> anyhow::Result<()> {
            self.journal.push(format!("load {}", self.name));
            Ok(())
        }
        fn unload_content(&mut self) -> anyhow::Result<()> {
            self.journal.push(format!("unload {}", self.name));
            Ok(())
        }
    }

    impl GameSystem for Probe {
        fn name(&self) -> &str {
            self.name
        }
        fn initialize(&mut self) -> anyhow::Result<()> {
            self.journal.push(format!("init {}", self.name));
            Ok(())
        }
        fn shutdown(&mut self) -> anyhow::Result<()> {
            self.journal.push(format!("shutdown {}", self.name));
            Ok(())
        }
        fn as_updateable(&mut self) -> Option<&mut dyn Updateable> {
            if self.update.is_some() {
                Some(self)
            } else {
                None
            }
        }
        fn as_drawable(&mut self) -> Option<&mut dyn Drawable> {
            if self.draw.is_some() {
                Some(self)
            } else {
                None
            }
        }
        fn as_contentable(&mut self) -> Option<&mut dyn Contentable> {
            if self.content {
                Some(self)
            } else {
                None
            }
        }
    }

    /// Removes `victim` from the collection during its first update.
    struct Reaper {
        order: OrderKey,
        collection: Arc<GameSystemCollection>,
        victim: Option<SystemHandle>,
        journal: Arc<Journal>,
    }

    impl Updateable for Reaper {
        fn update_order(&self) -> &OrderKey {
            &self.order
        }
        fn update(&mut self, _time: &GameTime) -> anyhow::Result<()> {
            self.journal.push("update reaper".to_string());
            if let Some(victim) = self.victim.take() {
                self.collection.remove(&victim)?;
            }
            Ok(())
        }
    }

    impl GameSystem for Reaper {
        fn name(&self) -> &str {
            "reaper"
        }
        fn as_updateable(&mut self) -> Option<&mut dyn Updateable> {
            Some(self)
        }
    }

    #[test]
    fn equal_keys_keep_insertion_order() {
        let journal = Arc::new(Journal::default());
        let collection = GameSystemCollection::new();
        for (name, order) in [("a", 1), ("b", 0), ("c", 1), ("d", 0)] {
            let mut probe = Probe::new(name, &journal);
            probe.update = Some(OrderKey::new(order));
            collection.add(SystemHandle::new(probe)).unwrap();
        }

        collection.update(&GameTime::default()).unwrap();
        assert_eq!(
            journal.take(),
            vec!["update b", "update d", "update a", "update c"]
        );
    }

    #[test]
    fn pending_systems_initialize_when_running() {
        let journal = Arc::new(Journal::default());
        let collection = GameSystemCollection::new();
        collection
            .add(SystemHandle::new(Probe::new("early", &journal)))
            .unwrap();
        assert_eq!(collection.pending_count(), 1);
        assert!(journal.take().is_empty());

        collection.initialize_pending().unwrap();
        collection
            .add(SystemHandle::new(Probe::new("late", &journal)))
            .unwrap();
        assert_eq!(journal.take(), vec!["init early", "init late"]);
        assert_eq!(collection.pending_count(), 0);
    }

    #[test]
    fn late_contentable_loads_immediately() {
        let journal = Arc::new(Journal::default());
        let collection = GameSystemCollection::new();
        collection.initialize_pending().unwrap();
        collection.load_content().unwrap();

        let mut probe = Probe::new("late", &journal);
        probe.content = true;
        collection.add(SystemHandle::new(probe)).unwrap();
        assert_eq!(journal.take(), vec!["init late", "load late"]);
    }

    #[test]
    fn remove_unloads_once_and_reports_membership() {
        let journal = Arc::new(Journal::default());
        let collection = GameSystemCollection::new();
        let mut probe = Probe::new("p", &journal);
        probe.content = true;
        probe.draw = Some(OrderKey::new(0));
        let handle = SystemHandle::new(probe);

        collection.add(handle.clone()).unwrap();
        collection.initialize_pending().unwrap();
        collection.load_content().unwrap();
        journal.take();

        assert!(collection.remove(&handle).unwrap());
        assert!(!collection.remove(&handle).unwrap());
        collection.unload_content().unwrap();
        collection.draw(&GameTime::default()).unwrap();
        assert_eq!(journal.take(), vec!["unload p"]);
    }

    #[test]
    fn reload_cycles_loaded_content() {
        let journal = Arc::new(Journal::default());
        let collection = GameSystemCollection::new();
        let mut probe = Probe::new("p", &journal);
        probe.content = true;
        collection.add(SystemHandle::new(probe)).unwrap();
        collection.initialize_pending().unwrap();
        collection.load_content().unwrap();
        journal.take();

        collection.reload_content().unwrap();
        assert_eq!(journal.take(), vec!["unload p", "load p"]);
    }

    #[test]
    fn system_removed_mid_dispatch_is_not_updated_after_unload() {
        let journal = Arc::new(Journal::default());
        let collection = Arc::new(GameSystemCollection::new());
        let mut probe = Probe::new("victim", &journal);
        probe.update = Some(OrderKey::new(10));
        probe.content = true;
        let victim = SystemHandle::new(probe);

        collection
            .add(SystemHandle::new(Reaper {
                order: OrderKey::new(0),
                collection: Arc::clone(&collection),
                victim: Some(victim.clone()),
                journal: Arc::clone(&journal),
            }))
            .unwrap();
        collection.add(victim.clone()).unwrap();
        collection.initialize_pending().unwrap();
        collection.load_content().unwrap();
        journal.take();

        collection.update(&GameTime::default()).unwrap();
        assert_eq!(journal.take(), vec!["update reaper", "unload victim"]);

        collection.update(&GameTime::default()).unwrap();
        assert_eq!(journal.take(), vec!["update reaper"]);
        assert!(!collection.contains(&victim));
    }

    #[test]
    fn shutdown_runs_newest_first_and_requeues_systems() {
        let journal = Arc::new(Journal::default());
        let collection = GameSystemCollection::new();
        for name in ["a", "b"] {
            collection
                .add(SystemHandle::new(Probe::new(name, &journal)))
                .unwrap();
        }
        collection.initialize_pending().unwrap();
        journal.take();

        collection.shutdown().unwrap();
        assert_eq!(journal.take(), vec!["shutdown b", "shutdown a"]);
        assert!(!collection.is_running());
        assert_eq!(collection.pending_count(), 2);

        collection.initialize_pending().unwrap();
        assert_eq!(journal.take(), vec!["init a", "init b"]);
    }
}
