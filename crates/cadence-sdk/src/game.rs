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

//! The game orchestrator.

use crate::control::GameControl;
use crate::graphics_device_manager::GraphicsDeviceManager;
use crate::registry::GameSystemCollection;
use crate::settings::GameSettings;
use crate::timestep::TimestepScheduler;
use cadence_core::graphics::{AdapterRegistry, GraphicsDeviceEvent};
use cadence_core::platform::{GamePlatform, PumpStatus, WindowEvent};
use cadence_core::{
    EventBus, GameClock, GameError, GameTime, ServiceRegistry, SystemHandle, SystemTimeSource,
    TimeSource,
};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, Default)]
struct GameTiming {
    total: Duration,
    frame_count: u64,
}

/// Commits the time of one update step when dropped, so a failing step is
/// accounted for exactly like a successful one.
struct StepCommit<'a> {
    timing: &'a mut GameTiming,
    elapsed: Duration,
}

impl Drop for StepCommit<'_> {
    fn drop(&mut self) {
        self.timing.total += self.elapsed;
        self.timing.frame_count += 1;
    }
}

/// Drives a set of game systems against a platform and a graphics device.
///
/// The platform's message pump calls [`tick`](Self::tick) (or [`run`](Self::run)
/// does it in a loop). Each tick samples the clock, asks the scheduler for the
/// update steps that are due, runs them in update order, then draws once in draw
/// order if the device is ready. Window and device events are drained at the top of
/// every tick.
pub struct Game {
    settings: GameSettings,
    platform: Box<dyn GamePlatform>,
    graphics: GraphicsDeviceManager,
    systems: Arc<GameSystemCollection>,
    services: ServiceRegistry,
    control: GameControl,
    clock: GameClock,
    scheduler: TimestepScheduler,
    timing: GameTiming,
    window_events: EventBus<WindowEvent>,
    draw_count: u64,
    is_running: bool,
    is_active: bool,
}

impl Game {
    /// Creates a game on `platform` that reads the system clock.
    pub fn new(platform: Box<dyn GamePlatform>, settings: GameSettings) -> Result<Self, GameError> {
        Self::with_time_source(platform, settings, Arc::new(SystemTimeSource::new()))
    }

    /// Creates a game whose clock and sleeps go through `time_source`.
    pub fn with_time_source(
        mut platform: Box<dyn GamePlatform>,
        settings: GameSettings,
        time_source: Arc<dyn TimeSource>,
    ) -> Result<Self, GameError> {
        settings.validate()?;

        let adapters = AdapterRegistry::new(platform.adapter_enumerator());
        let mut graphics = GraphicsDeviceManager::new(
            adapters,
            settings.graphics.clone(),
            Arc::clone(&time_source),
        );
        graphics.set_device_lost_sleep(settings.device_lost_sleep);

        let scheduler = TimestepScheduler::new(
            settings.is_fixed_time_step,
            settings.target_elapsed_time,
            settings.max_elapsed_time,
        );

        let systems = Arc::new(GameSystemCollection::new());
        let control = GameControl::new();
        let mut services = ServiceRegistry::new();
        services.insert_arc(Arc::clone(&systems));
        services.insert(control.clone());

        Ok(Self {
            settings,
            platform,
            graphics,
            systems,
            services,
            control,
            clock: GameClock::with_source(time_source),
            scheduler,
            timing: GameTiming::default(),
            window_events: EventBus::new(),
            draw_count: 0,
            is_running: false,
            is_active: true,
        })
    }

    /// Creates the device, initializes the registered systems, and loads content.
    pub fn start(&mut self) -> Result<(), GameError> {
        if self.is_running {
            return Err(GameError::AlreadyRunning);
        }
        log::info!("Game: starting on platform '{}'", self.platform.name());

        self.control.clear_exit();
        self.platform
            .attach_window_events(self.window_events.sender());
        self.graphics.apply_changes(self.platform.as_mut())?;
        self.systems.initialize_pending()?;
        // The first load below covers the device that was just created.
        self.graphics.events().drain();
        self.systems.load_content()?;

        self.clock.reset();
        self.scheduler.reset();
        self.timing = GameTiming::default();
        self.draw_count = 0;
        self.is_running = true;
        self.is_active = true;
        log::info!("Game: started with {} system(s)", self.systems.len());
        Ok(())
    }

    /// Starts the game and ticks it until an exit is requested or the platform's
    /// pump reports one, then shuts down.
    pub fn run(&mut self) -> Result<(), GameError> {
        self.start()?;
        let result = self.run_loop();
        let shutdown = self.shutdown();
        result.and(shutdown)
    }

    fn run_loop(&mut self) -> Result<(), GameError> {
        loop {
            if self.control.is_exit_requested() {
                return Ok(());
            }
            if self.platform.pump_events() == PumpStatus::Exit {
                log::info!("Game: platform requested exit");
                return Ok(());
            }
            self.tick()?;
        }
    }

    /// Runs one iteration of the game loop.
    pub fn tick(&mut self) -> Result<(), GameError> {
        if !self.is_running {
            return Err(GameError::NotRunning);
        }
        if self.control.is_exit_requested() {
            return Ok(());
        }

        self.process_window_events()?;
        self.process_device_events()?;
        if self.control.is_exit_requested() {
            return Ok(());
        }

        if self.clock.is_paused() {
            self.clock.sleep(self.settings.inactive_sleep_time);
            return Ok(());
        }
        if !self.is_active {
            self.clock.sleep(self.settings.inactive_sleep_time);
        }

        self.clock.tick();
        if self.control.take_reset_elapsed_time() {
            self.scheduler.force_zero();
        }
        let plan = self.scheduler.plan(self.clock.elapsed_adjusted_time());
        if plan.is_skipped() {
            self.clock.sleep(plan.idle);
            return Ok(());
        }

        let mut suppress_draw = true;
        let mut draw_elapsed = Duration::ZERO;
        let mut steps_run = 0u32;
        for _ in 0..plan.update_count {
            if self.control.is_exit_requested() {
                break;
            }
            let time = GameTime::new(
                self.timing.total,
                plan.step_elapsed,
                plan.is_running_slowly,
                self.timing.frame_count,
            );
            let _commit = StepCommit {
                timing: &mut self.timing,
                elapsed: plan.step_elapsed,
            };
            let updated = self.systems.update(&time);
            // Consumed even by a failing step, so it cannot leak into the next tick.
            suppress_draw &= self.control.take_suppress_draw();
            updated?;
            steps_run += 1;
            draw_elapsed += plan.step_elapsed;
        }

        if steps_run == 0 || suppress_draw || self.control.is_exit_requested() {
            return Ok(());
        }

        let time = GameTime::new(
            self.timing.total,
            draw_elapsed,
            plan.is_running_slowly,
            self.timing.frame_count,
        );
        self.draw_frame(&time)
    }

    fn draw_frame(&mut self, time: &GameTime) -> Result<(), GameError> {
        if !self.graphics.begin_draw(self.platform.as_mut())? {
            log::trace!("Game: device not ready, skipping draw");
            return Ok(());
        }
        self.systems.draw(time)?;
        self.graphics.end_draw()?;
        self.draw_count += 1;
        Ok(())
    }

    fn process_window_events(&mut self) -> Result<(), GameError> {
        for event in self.window_events.drain() {
            match event {
                WindowEvent::ClientSizeChanged { width, height } => {
                    self.graphics
                        .on_client_size_changed(self.platform.as_mut(), width, height)?;
                }
                WindowEvent::OrientationChanged(orientation) => {
                    self.graphics
                        .on_orientation_changed(self.platform.as_mut(), orientation)?;
                }
                WindowEvent::Activated => {
                    log::debug!("Game: activated");
                    self.is_active = true;
                }
                WindowEvent::Deactivated => {
                    log::debug!("Game: deactivated");
                    self.is_active = false;
                }
                WindowEvent::CloseRequested => self.control.exit(),
            }
        }
        Ok(())
    }

    fn process_device_events(&mut self) -> Result<(), GameError> {
        let mut recreated = false;
        for event in self.graphics.events().drain() {
            log::debug!("Game: graphics device event {event:?}");
            recreated |= event == GraphicsDeviceEvent::Created;
        }
        if recreated && self.systems.is_content_loaded() {
            self.systems.reload_content()?;
        }
        Ok(())
    }

    /// Unloads content, shuts every system down, disposes the device, and
    /// notifies the platform.
    ///
    /// Systems are initialized again by the next [`start`](Self::start).
    pub fn shutdown(&mut self) -> Result<(), GameError> {
        if !self.is_running {
            return Ok(());
        }
        self.is_running = false;
        self.systems.stop();
        let unloaded = self.systems.unload_content();
        let stopped = self.systems.shutdown();
        self.graphics.dispose();
        self.platform.exit();
        log::info!(
            "Game: shut down after {} update step(s) and {} frame(s), game time {:.3}s",
            self.timing.frame_count,
            self.draw_count,
            self.timing.total.as_secs_f64()
        );
        unloaded.and(stopped)
    }

    /// Registers a system.
    pub fn add_system(&self, system: impl Into<SystemHandle>) -> Result<(), GameError> {
        self.systems.add(system)
    }

    /// Unregisters a system. Returns whether it was registered.
    pub fn remove_system(&self, system: &SystemHandle) -> Result<bool, GameError> {
        self.systems.remove(system)
    }

    /// Requests the loop to stop.
    pub fn exit(&self) {
        self.control.exit();
    }

    /// Pauses the clock; ticks only sleep until [`resume`](Self::resume).
    pub fn suspend(&mut self) {
        log::info!("Game: suspended");
        self.clock.pause();
    }

    /// Resumes a [`suspend`](Self::suspend)ed game. Suspended time is not caught up.
    pub fn resume(&mut self) {
        log::info!("Game: resumed");
        self.clock.resume();
    }

    /// Returns `true` while suspended.
    pub fn is_suspended(&self) -> bool {
        self.clock.is_paused()
    }

    /// Makes the next tick see no elapsed time.
    pub fn reset_elapsed_time(&self) {
        self.control.reset_elapsed_time();
    }

    /// Switches between fixed and variable stepping.
    pub fn set_fixed_time_step(&mut self, fixed: bool) {
        self.settings.is_fixed_time_step = fixed;
        self.scheduler.set_fixed_time_step(fixed);
    }

    /// Changes the fixed step duration.
    pub fn set_target_elapsed_time(&mut self, target: Duration) -> Result<(), GameError> {
        if target.is_zero() || target > self.settings.max_elapsed_time {
            return Err(GameError::InvalidSettings(format!(
                "target elapsed time {target:?} must be within (0, {:?}]",
                self.settings.max_elapsed_time
            )));
        }
        self.settings.target_elapsed_time = target;
        self.scheduler.set_target_elapsed_time(target);
        Ok(())
    }

    /// Applies graphics preference changes made through
    /// [`graphics_mut`](Self::graphics_mut).
    pub fn apply_graphics_changes(&mut self) -> Result<(), GameError> {
        self.graphics.apply_changes(self.platform.as_mut())
    }

    /// Switches between windowed and full-screen presentation.
    pub fn toggle_full_screen(&mut self) -> Result<(), GameError> {
        self.graphics.toggle_full_screen(self.platform.as_mut())
    }

    /// A handle systems can keep to request an exit, suppress a draw, or reset
    /// the elapsed time.
    pub fn control(&self) -> GameControl {
        self.control.clone()
    }

    /// The shared system collection.
    pub fn systems(&self) -> &Arc<GameSystemCollection> {
        &self.systems
    }

    /// The game's services.
    pub fn services(&self) -> &ServiceRegistry {
        &self.services
    }

    /// The game's services, mutably.
    pub fn services_mut(&mut self) -> &mut ServiceRegistry {
        &mut self.services
    }

    /// The graphics device manager.
    pub fn graphics(&self) -> &GraphicsDeviceManager {
        &self.graphics
    }

    /// The graphics device manager, mutably.
    pub fn graphics_mut(&mut self) -> &mut GraphicsDeviceManager {
        &mut self.graphics
    }

    /// The platform.
    pub fn platform(&self) -> &dyn GamePlatform {
        self.platform.as_ref()
    }

    /// The platform, mutably.
    pub fn platform_mut(&mut self) -> &mut dyn GamePlatform {
        self.platform.as_mut()
    }

    /// The active settings.
    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    /// The timestep scheduler.
    pub fn scheduler(&self) -> &TimestepScheduler {
        &self.scheduler
    }

    /// Returns `true` between [`start`](Self::start) and [`shutdown`](Self::shutdown).
    pub fn is_running(&self) -> bool {
        self.is_running
    }

    /// Returns `false` while the window is deactivated.
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Game time consumed by update steps so far.
    pub fn total_game_time(&self) -> Duration {
        self.timing.total
    }

    /// Number of update steps run so far.
    pub fn frame_count(&self) -> u64 {
        self.timing.frame_count
    }

    /// Number of frames drawn and presented so far.
    pub fn draw_count(&self) -> u64 {
        self.draw_count
    }
}

impl Drop for Game {
    fn drop(&mut self) {
        if self.is_running {
            log::info!("Game: dropped while running, shutting down");
            if let Err(e) = self.shutdown() {
                log::error!("Game: shutdown failed: {e}");
            }
        }
    }
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("platform", &self.platform.name())
            .field("systems", &self.systems)
            .field("is_running", &self.is_running)
            .field("is_active", &self.is_active)
            .field("frame_count", &self.timing.frame_count)
            .field("draw_count", &self.draw_count)
            .finish()
    }
}
