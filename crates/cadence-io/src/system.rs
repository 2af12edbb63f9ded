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

//! The effect compiler game system and its background thread.

use crate::effect::{CompiledEffect, EffectCompiler, EffectEvent, EffectId, TrackedEffect};
use crate::error::EffectError;
use crate::stamp::StampCache;
use crate::watcher::WatchSet;
use cadence_core::{GameSystem, GameTime, OrderKey, Updateable};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

/// Configuration of the [`EffectCompilerSystem`].
#[derive(Debug, Clone)]
pub struct EffectCompilerConfig {
    /// How often tracked files are re-stated.
    pub poll_interval: Duration,
    /// Also listen to filesystem notifications. Falls back to polling alone when
    /// no watcher can be created.
    pub use_file_notifications: bool,
    /// Maximum number of undelivered [`EffectEvent`]s. Newer events are dropped
    /// when the buffer is full.
    pub event_buffer_size: usize,
    /// Update order of the system. The default runs it before every other system.
    pub update_order: i32,
}

impl Default for EffectCompilerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(250),
            use_file_notifications: true,
            event_buffer_size: 256,
            update_order: i32::MIN,
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn normalize(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// State shared between the main thread and the compiler thread. Lock order:
/// `effects` before `pending`.
#[derive(Debug, Default)]
struct Shared {
    effects: Mutex<HashMap<EffectId, TrackedEffect>>,
    pending: Mutex<HashSet<EffectId>>,
    next_id: AtomicU32,
    generation: AtomicU64,
}

impl Shared {
    fn mark_dependents(&self, file: &Path) -> usize {
        let effects = lock(&self.effects);
        let mut pending = lock(&self.pending);
        effects
            .iter()
            .filter(|(_, effect)| effect.depends_on(file))
            .filter(|(id, _)| pending.insert(**id))
            .count()
    }

    fn tracked_files(&self) -> Vec<PathBuf> {
        let effects = lock(&self.effects);
        let mut files: Vec<PathBuf> = effects.values().flat_map(|e| e.files().cloned()).collect();
        files.sort();
        files.dedup();
        files
    }
}

/// Recompiles effects in the background when their files change and swaps the
/// new bytecode in on the main thread.
///
/// The compiler thread never touches the device. It drains the pending set,
/// compiles each effect, and queues the result; [`update`](Updateable::update)
/// applies the queued results, so bytecode only changes between frames.
/// A failing effect keeps its previous bytecode and is reported as an
/// [`EffectEvent::Failed`].
pub struct EffectCompilerSystem {
    config: EffectCompilerConfig,
    shared: Arc<Shared>,
    running: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<Box<dyn EffectCompiler>>>,
    compiler: Option<Box<dyn EffectCompiler>>,
    wake_tx: Sender<()>,
    wake_rx: Receiver<()>,
    rebind_tx: Sender<CompiledEffect>,
    rebind_rx: Receiver<CompiledEffect>,
    event_tx: Sender<EffectEvent>,
    event_rx: Receiver<EffectEvent>,
    compiled: HashMap<EffectId, CompiledEffect>,
    order: OrderKey,
}

impl EffectCompilerSystem {
    /// Creates a stopped system.
    pub fn new(compiler: impl EffectCompiler + 'static, config: EffectCompilerConfig) -> Self {
        let (wake_tx, wake_rx) = crossbeam_channel::unbounded();
        let (rebind_tx, rebind_rx) = crossbeam_channel::unbounded();
        let (event_tx, event_rx) = crossbeam_channel::bounded(config.event_buffer_size);
        let order = OrderKey::new(config.update_order);
        Self {
            config,
            shared: Arc::new(Shared::default()),
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
            compiler: Some(Box::new(compiler)),
            wake_tx,
            wake_rx,
            rebind_tx,
            rebind_rx,
            event_tx,
            event_rx,
            compiled: HashMap::new(),
            order,
        }
    }

    /// Starts tracking the effect at `path` and queues its first compilation.
    pub fn add_effect(&self, path: impl AsRef<Path>) -> EffectId {
        let id = EffectId(self.shared.next_id.fetch_add(1, Ordering::Relaxed));
        let path = normalize(path.as_ref());
        log::debug!("EffectCompilerSystem: tracking {id} at '{}'", path.display());
        lock(&self.shared.effects).insert(
            id,
            TrackedEffect {
                path,
                dependencies: Vec::new(),
            },
        );
        lock(&self.shared.pending).insert(id);
        self.wake();
        id
    }

    /// Stops tracking an effect and drops its bytecode. Returns whether it was
    /// tracked.
    pub fn remove_effect(&mut self, id: EffectId) -> bool {
        let removed = lock(&self.shared.effects).remove(&id).is_some();
        lock(&self.shared.pending).remove(&id);
        self.compiled.remove(&id);
        removed
    }

    /// Queues every effect that depends on `path` for recompilation, whether or
    /// not the file changed. Returns how many effects were queued.
    pub fn invalidate(&self, path: impl AsRef<Path>) -> usize {
        let marked = self.shared.mark_dependents(&normalize(path.as_ref()));
        if marked > 0 {
            self.wake();
        }
        marked
    }

    /// Starts the compiler thread.
    pub fn start(&mut self) -> Result<(), EffectError> {
        if self.handle.is_some() {
            return Err(EffectError::AlreadyRunning);
        }
        let compiler = self.compiler.take().ok_or(EffectError::AlreadyRunning)?;

        let (watcher, changes_rx) = if self.config.use_file_notifications {
            match WatchSet::new() {
                Ok((watcher, rx)) => (Some(watcher), rx),
                Err(e) => {
                    log::warn!("EffectCompilerSystem: {e}, polling only");
                    (None, crossbeam_channel::never())
                }
            }
        } else {
            (None, crossbeam_channel::never())
        };

        let worker = Worker {
            compiler,
            shared: Arc::clone(&self.shared),
            running: Arc::clone(&self.running),
            wake_rx: self.wake_rx.clone(),
            changes_rx,
            rebind_tx: self.rebind_tx.clone(),
            event_tx: self.event_tx.clone(),
            watcher,
            stamps: StampCache::default(),
            poll_interval: self.config.poll_interval,
        };

        self.running.store(true, Ordering::SeqCst);
        let spawned = thread::Builder::new()
            .name("effect-compiler".to_string())
            .spawn(move || worker.run());
        match spawned {
            Ok(handle) => {
                self.handle = Some(handle);
                Ok(())
            }
            Err(e) => {
                self.running.store(false, Ordering::SeqCst);
                Err(EffectError::Spawn(e))
            }
        }
    }

    /// Stops the compiler thread and waits for it. Compilations already queued
    /// for rebind are still applied by the next update.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        self.wake();
        if let Some(handle) = self.handle.take() {
            match handle.join() {
                Ok(compiler) => self.compiler = Some(compiler),
                Err(_) => log::error!("EffectCompilerSystem: compiler thread panicked"),
            }
        }
    }

    /// Returns `true` while the compiler thread runs.
    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Swaps in every compilation finished since the last call. Returns how many
    /// effects changed.
    pub fn apply_rebinds(&mut self) -> usize {
        let mut applied = 0;
        for compiled in self.rebind_rx.try_iter() {
            if !lock(&self.shared.effects).contains_key(&compiled.id) {
                continue;
            }
            log::info!(
                "EffectCompilerSystem: rebinding {} (generation {})",
                compiled.id,
                compiled.generation
            );
            self.compiled.insert(compiled.id, compiled);
            applied += 1;
        }
        applied
    }

    /// Current bytecode of an effect.
    pub fn bytecode(&self, id: EffectId) -> Option<Arc<[u8]>> {
        self.compiled.get(&id).map(|c| Arc::clone(&c.bytecode))
    }

    /// Current compilation of an effect.
    pub fn compiled(&self, id: EffectId) -> Option<&CompiledEffect> {
        self.compiled.get(&id)
    }

    /// Source and dependency files of a tracked effect.
    pub fn tracked_files(&self, id: EffectId) -> Option<Vec<PathBuf>> {
        lock(&self.shared.effects)
            .get(&id)
            .map(|e| e.files().cloned().collect())
    }

    /// A receiver of the compiler thread's events.
    pub fn events(&self) -> Receiver<EffectEvent> {
        self.event_rx.clone()
    }

    fn wake(&self) {
        // The receiver lives as long as `self`.
        let _ = self.wake_tx.send(());
    }
}

impl Drop for EffectCompilerSystem {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for EffectCompilerSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectCompilerSystem")
            .field("config", &self.config)
            .field("is_running", &self.is_running())
            .field("compiled", &self.compiled.len())
            .finish()
    }
}

impl Updateable for EffectCompilerSystem {
    fn update_order(&self) -> &OrderKey {
        &self.order
    }

    fn update(&mut self, _time: &GameTime) -> anyhow::Result<()> {
        self.apply_rebinds();
        Ok(())
    }
}

impl GameSystem for EffectCompilerSystem {
    fn name(&self) -> &str {
        "EffectCompilerSystem"
    }

    fn initialize(&mut self) -> anyhow::Result<()> {
        if !self.is_running() {
            self.start()?;
        }
        Ok(())
    }

    fn shutdown(&mut self) -> anyhow::Result<()> {
        self.stop();
        Ok(())
    }

    fn as_updateable(&mut self) -> Option<&mut dyn Updateable> {
        Some(self)
    }
}

struct Worker {
    compiler: Box<dyn EffectCompiler>,
    shared: Arc<Shared>,
    running: Arc<AtomicBool>,
    wake_rx: Receiver<()>,
    changes_rx: Receiver<PathBuf>,
    rebind_tx: Sender<CompiledEffect>,
    event_tx: Sender<EffectEvent>,
    watcher: Option<WatchSet>,
    stamps: StampCache,
    poll_interval: Duration,
}

impl Worker {
    fn run(mut self) -> Box<dyn EffectCompiler> {
        log::info!("EffectCompilerSystem: compiler thread started");
        while self.running.load(Ordering::SeqCst) {
            self.collect_changes();
            self.compile_pending();
            self.wait();
        }
        log::info!("EffectCompilerSystem: compiler thread stopped");
        self.compiler
    }

    fn wait(&self) {
        crossbeam_channel::select! {
            recv(self.wake_rx) -> _ => {}
            recv(self.changes_rx) -> change => {
                if let Ok(path) = change {
                    self.shared.mark_dependents(&path);
                }
            }
            default(self.poll_interval) => {}
        }
    }

    fn collect_changes(&mut self) {
        // Coalesce the wake-ups that arrived while compiling.
        while self.wake_rx.try_recv().is_ok() {}
        for path in self.changes_rx.try_iter() {
            self.shared.mark_dependents(&path);
        }

        let files = self.shared.tracked_files();
        if let Some(watcher) = self.watcher.as_mut() {
            watcher.sync(&files);
        }
        for file in &files {
            if self.stamps.refresh(file) {
                let marked = self.shared.mark_dependents(file);
                log::debug!(
                    "EffectCompilerSystem: '{}' changed, {marked} effect(s) queued",
                    file.display()
                );
            }
        }
        self.stamps.retain(&files);
    }

    fn compile_pending(&mut self) {
        let mut pending: Vec<EffectId> = lock(&self.shared.pending).drain().collect();
        pending.sort();

        for (index, &id) in pending.iter().enumerate() {
            if !self.running.load(Ordering::SeqCst) {
                // Left for the next start.
                lock(&self.shared.pending).extend(&pending[index..]);
                return;
            }
            let Some(path) = lock(&self.shared.effects).get(&id).map(|e| e.path.clone()) else {
                continue;
            };

            match self.compiler.compile(&path) {
                Ok(output) => {
                    let dependencies: Vec<PathBuf> =
                        output.dependencies.iter().map(|d| normalize(d)).collect();
                    for file in std::iter::once(&path).chain(dependencies.iter()) {
                        self.stamps.refresh(file);
                    }
                    if let Some(effect) = lock(&self.shared.effects).get_mut(&id) {
                        effect.dependencies = dependencies.clone();
                    }

                    let generation = self.shared.generation.fetch_add(1, Ordering::Relaxed) + 1;
                    log::debug!(
                        "EffectCompilerSystem: compiled {id} ({} bytes, {} dependencies)",
                        output.bytecode.len(),
                        dependencies.len()
                    );
                    let compiled = CompiledEffect {
                        id,
                        path,
                        bytecode: output.bytecode.into(),
                        dependencies,
                        generation,
                    };
                    if self.rebind_tx.send(compiled).is_err() {
                        log::warn!("EffectCompilerSystem: rebind queue closed");
                    }
                    self.emit(EffectEvent::Compiled { id, generation });
                }
                Err(error) => {
                    self.stamps.refresh(&path);
                    log::warn!("EffectCompilerSystem: {id} failed: {error}");
                    self.emit(EffectEvent::Failed {
                        id,
                        path,
                        message: error.to_string(),
                    });
                }
            }
        }
    }

    fn emit(&self, event: EffectEvent) {
        if let Err(TrySendError::Full(event)) = self.event_tx.try_send(event) {
            log::trace!("EffectCompilerSystem: event buffer full, dropping {event:?}");
        }
    }
}
