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

//! Filesystem notifications for tracked effect files.

use crate::error::EffectError;
use crossbeam_channel::Receiver;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Watches the directories holding tracked files and forwards the paths of
/// changed files on a channel.
pub(crate) struct WatchSet {
    watcher: RecommendedWatcher,
    watched: HashSet<PathBuf>,
}

impl WatchSet {
    pub(crate) fn new() -> Result<(Self, Receiver<PathBuf>), EffectError> {
        let (tx, rx) = crossbeam_channel::unbounded();
        let watcher = notify::recommended_watcher(move |result: notify::Result<Event>| {
            match result {
                Ok(event) => {
                    if matches!(
                        event.kind,
                        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
                    ) {
                        for path in event.paths {
                            if tx.send(path).is_err() {
                                return;
                            }
                        }
                    }
                }
                Err(e) => log::warn!("EffectWatcher: {e}"),
            }
        })?;
        Ok((
            Self {
                watcher,
                watched: HashSet::new(),
            },
            rx,
        ))
    }

    /// Watches the parent directory of every file in `files` and stops watching
    /// directories no file lives in anymore.
    pub(crate) fn sync(&mut self, files: &[PathBuf]) {
        let wanted: HashSet<PathBuf> = files
            .iter()
            .filter_map(|file| file.parent().map(Path::to_path_buf))
            .collect();

        let stale: Vec<PathBuf> = self.watched.difference(&wanted).cloned().collect();
        for dir in stale {
            if let Err(e) = self.watcher.unwatch(&dir) {
                log::debug!("EffectWatcher: unwatch '{}' failed: {e}", dir.display());
            }
            self.watched.remove(&dir);
        }

        for dir in wanted {
            if self.watched.contains(&dir) {
                continue;
            }
            match self.watcher.watch(&dir, RecursiveMode::NonRecursive) {
                Ok(()) => {
                    log::debug!("EffectWatcher: watching '{}'", dir.display());
                    self.watched.insert(dir);
                }
                // Polling still covers files in directories that cannot be watched.
                Err(e) => log::debug!("EffectWatcher: cannot watch '{}': {e}", dir.display()),
            }
        }
    }
}

impl std::fmt::Debug for WatchSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchSet")
            .field("watched", &self.watched)
            .finish()
    }
}
