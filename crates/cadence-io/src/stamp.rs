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

//! Change detection by re-stat.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// What a file looked like the last time it was checked. A missing file is a
/// stamp too, so deletion and re-creation both count as changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FileStamp {
    Missing,
    Present {
        modified: Option<SystemTime>,
        len: u64,
    },
}

impl FileStamp {
    pub(crate) fn of(path: &Path) -> Self {
        match std::fs::metadata(path) {
            Ok(meta) => FileStamp::Present {
                modified: meta.modified().ok(),
                len: meta.len(),
            },
            Err(_) => FileStamp::Missing,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct StampCache {
    stamps: HashMap<PathBuf, FileStamp>,
}

impl StampCache {
    /// Re-stats `path`. Returns `true` when it differs from the last stamp; a
    /// path seen for the first time is recorded without counting as a change.
    pub(crate) fn refresh(&mut self, path: &Path) -> bool {
        let current = FileStamp::of(path);
        match self.stamps.insert(path.to_path_buf(), current) {
            Some(previous) => previous != current,
            None => false,
        }
    }

    /// Forgets every path not in `keep`.
    pub(crate) fn retain(&mut self, keep: &[PathBuf]) {
        self.stamps.retain(|path, _| keep.contains(path));
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.stamps.len()
    }
}
