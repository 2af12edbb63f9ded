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

#![allow(dead_code)]

use cadence_core::{
    Contentable, Drawable, GameSystem, GameTime, ManualTimeSource, OrderKey, SystemHandle,
    Updateable,
};
use cadence_infra::{HeadlessController, HeadlessPlatform};
use cadence_sdk::{Game, GameSettings};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const TARGET: Duration = Duration::from_nanos(16_666_666);

/// A shared, ordered log of what systems were asked to do.
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.0.lock().unwrap().iter().filter(|e| *e == entry).count()
    }
}

type Hook = Box<dyn FnMut(&GameTime) -> anyhow::Result<()> + Send>;

/// A configurable system that journals every callback it receives.
pub struct Recorder {
    pub name: String,
    pub update_order: Option<OrderKey>,
    pub draw_order: Option<OrderKey>,
    pub has_content: bool,
    pub journal: Journal,
    pub update_times: Vec<GameTime>,
    pub draw_times: Vec<GameTime>,
    pub on_update: Option<Hook>,
}

impl Recorder {
    pub fn new(name: &str, journal: &Journal) -> Self {
        Self {
            name: name.to_string(),
            update_order: None,
            draw_order: None,
            has_content: false,
            journal: journal.clone(),
            update_times: Vec::new(),
            draw_times: Vec::new(),
            on_update: None,
        }
    }

    pub fn updating(mut self, order: i32) -> Self {
        self.update_order = Some(OrderKey::new(order));
        self
    }

    pub fn drawing(mut self, order: i32) -> Self {
        self.draw_order = Some(OrderKey::new(order));
        self
    }

    pub fn with_content(mut self) -> Self {
        self.has_content = true;
        self
    }

    pub fn on_update(
        mut self,
        hook: impl FnMut(&GameTime) -> anyhow::Result<()> + Send + 'static,
    ) -> Self {
        self.on_update = Some(Box::new(hook));
        self
    }

    /// Wraps the recorder so the test keeps typed access next to the handle.
    pub fn shared(self) -> (Arc<Mutex<Recorder>>, SystemHandle) {
        let typed = Arc::new(Mutex::new(self));
        let handle = SystemHandle::from(Arc::clone(&typed));
        (typed, handle)
    }
}

impl Updateable for Recorder {
    fn update_order(&self) -> &OrderKey {
        self.update_order.as_ref().unwrap()
    }

    fn update(&mut self, time: &GameTime) -> anyhow::Result<()> {
        self.journal.push(format!("update {}", self.name));
        self.update_times.push(*time);
        match self.on_update.as_mut() {
            Some(hook) => hook(time),
            None => Ok(()),
        }
    }
}

impl Drawable for Recorder {
    fn draw_order(&self) -> &OrderKey {
        self.draw_order.as_ref().unwrap()
    }

    fn draw(&mut self, time: &GameTime) -> anyhow::Result<()> {
        self.journal.push(format!("draw {}", self.name));
        self.draw_times.push(*time);
        Ok(())
    }
}

impl Contentable for Recorder {
    fn load_content(&mut self) -> anyhow::Result<()> {
        self.journal.push(format!("load {}", self.name));
        Ok(())
    }

    fn unload_content(&mut self) -> anyhow::Result<()> {
        self.journal.push(format!("unload {}", self.name));
        Ok(())
    }
}

impl GameSystem for Recorder {
    fn name(&self) -> &str {
        &self.name
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
        if self.update_order.is_some() {
            Some(self)
        } else {
            None
        }
    }

    fn as_drawable(&mut self) -> Option<&mut dyn Drawable> {
        if self.draw_order.is_some() {
            Some(self)
        } else {
            None
        }
    }

    fn as_contentable(&mut self) -> Option<&mut dyn Contentable> {
        if self.has_content {
            Some(self)
        } else {
            None
        }
    }
}

/// A game on a headless platform whose clock only moves when the test says so.
pub struct Harness {
    pub game: Game,
    pub time: ManualTimeSource,
    pub controller: HeadlessController,
}

impl Harness {
    pub fn new(settings: GameSettings) -> Self {
        let platform = HeadlessPlatform::default();
        let controller = platform.controller();
        let time = ManualTimeSource::new();
        let game = Game::with_time_source(Box::new(platform), settings, Arc::new(time.clone()))
            .expect("valid settings");
        Self {
            game,
            time,
            controller,
        }
    }

    /// Advances the clock by `elapsed` and runs one tick.
    pub fn tick_after(&mut self, elapsed: Duration) -> Result<(), cadence_core::GameError> {
        self.time.advance(elapsed);
        self.game.tick()
    }
}
