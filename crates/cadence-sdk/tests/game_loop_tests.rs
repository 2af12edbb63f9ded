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

mod common;

use cadence_core::{GameError, SystemHandle, SystemPhase};
use cadence_sdk::{GameSettings, GameSystemCollection};
use common::{Harness, Journal, Recorder, TARGET};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[test]
fn start_initializes_then_loads_in_registration_order() {
    let mut harness = Harness::new(GameSettings::default());
    let journal = Journal::default();
    let (_a, a) = Recorder::new("a", &journal).updating(0).with_content().shared();
    let (_b, b) = Recorder::new("b", &journal).drawing(0).with_content().shared();
    harness.game.add_system(a).unwrap();
    harness.game.add_system(b).unwrap();

    harness.game.start().unwrap();

    assert_eq!(journal.take(), vec!["init a", "init b", "load a", "load b"]);
    assert!(matches!(harness.game.start(), Err(GameError::AlreadyRunning)));
}

#[test]
fn tick_before_start_is_rejected() {
    let mut harness = Harness::new(GameSettings::default());
    assert!(matches!(harness.game.tick(), Err(GameError::NotRunning)));
}

#[test]
fn updates_run_before_draws_in_their_own_orders() {
    let mut harness = Harness::new(GameSettings::default());
    let journal = Journal::default();
    let (_hud, hud) = Recorder::new("hud", &journal).updating(5).drawing(10).shared();
    let (_world, world) = Recorder::new("world", &journal).updating(1).drawing(0).shared();
    harness.game.add_system(hud).unwrap();
    harness.game.add_system(world).unwrap();
    harness.game.start().unwrap();
    journal.take();

    harness.tick_after(TARGET * 2).unwrap();

    assert_eq!(
        journal.take(),
        vec![
            "update world",
            "update hud",
            "update world",
            "update hud",
            "draw world",
            "draw hud"
        ]
    );
}

#[test]
fn drawable_only_system_never_updates() {
    let mut harness = Harness::new(GameSettings::default());
    let journal = Journal::default();
    let (painter, handle) = Recorder::new("painter", &journal).drawing(0).shared();
    harness.game.add_system(handle).unwrap();
    harness.game.start().unwrap();

    for _ in 0..5 {
        harness.tick_after(TARGET).unwrap();
    }

    assert_eq!(journal.count("update painter"), 0);
    assert_eq!(painter.lock().unwrap().draw_times.len(), 5);
}

#[test]
fn removal_mid_run_stops_dispatch_and_unloads_once() {
    let mut harness = Harness::new(GameSettings::default());
    let journal = Journal::default();
    let (_victim, victim) = Recorder::new("victim", &journal)
        .updating(10)
        .drawing(0)
        .with_content()
        .shared();

    let systems = Arc::clone(harness.game.systems());
    let target = victim.clone();
    let mut removed = false;
    let (_reaper, reaper) = Recorder::new("reaper", &journal)
        .updating(0)
        .on_update(move |time| {
            if time.frame_count() == 1 && !removed {
                removed = true;
                systems.remove(&target)?;
            }
            Ok(())
        })
        .shared();

    harness.game.add_system(reaper).unwrap();
    harness.game.add_system(victim.clone()).unwrap();
    harness.game.start().unwrap();
    journal.take();

    // Three steps: the reaper removes the victim during the second one, before
    // the victim's turn comes up in that step's snapshot.
    harness.tick_after(TARGET * 3).unwrap();
    for _ in 0..3 {
        harness.tick_after(TARGET).unwrap();
    }
    harness.game.shutdown().unwrap();

    let entries = journal.entries();
    let unloaded_at = entries.iter().position(|e| e == "unload victim").unwrap();
    assert!(!entries[unloaded_at..].iter().any(|e| e == "update victim"));
    assert_eq!(journal.count("update victim"), 1);
    assert_eq!(journal.count("draw victim"), 0);
    assert_eq!(journal.count("unload victim"), 1);
    assert_eq!(journal.count("shutdown victim"), 0);
    assert!(!harness.game.systems().contains(&victim));
}

#[test]
fn system_removing_itself_is_unloaded_after_dispatch() {
    let mut harness = Harness::new(GameSettings::default());
    let journal = Journal::default();
    let systems = Arc::clone(harness.game.systems());
    let own_handle: Arc<Mutex<Option<SystemHandle>>> = Arc::default();
    let slot = Arc::clone(&own_handle);

    let (_quitter, handle) = Recorder::new("quitter", &journal)
        .updating(0)
        .with_content()
        .on_update(move |_| {
            if let Some(me) = slot.lock().unwrap().take() {
                systems.remove(&me)?;
            }
            Ok(())
        })
        .shared();
    *own_handle.lock().unwrap() = Some(handle.clone());
    harness.game.add_system(handle).unwrap();
    harness.game.start().unwrap();
    journal.take();

    harness.tick_after(TARGET).unwrap();
    harness.tick_after(TARGET).unwrap();
    harness.game.shutdown().unwrap();

    assert_eq!(journal.take(), vec!["update quitter", "unload quitter"]);
}

#[test]
fn failing_step_commits_its_time_and_stops_the_tick() {
    let mut harness = Harness::new(GameSettings::default());
    let journal = Journal::default();
    let (_fragile, fragile) = Recorder::new("fragile", &journal)
        .updating(0)
        .drawing(0)
        .on_update(|time| {
            if time.frame_count() == 1 {
                anyhow::bail!("collision solver diverged");
            }
            Ok(())
        })
        .shared();
    harness.game.add_system(fragile).unwrap();
    harness.game.start().unwrap();
    journal.take();

    let err = harness.tick_after(TARGET * 3).unwrap_err();

    match err {
        GameError::System { system, phase, .. } => {
            assert_eq!(system, "fragile");
            assert_eq!(phase, SystemPhase::Update);
        }
        other => panic!("unexpected error {other}"),
    }
    assert_eq!(harness.game.frame_count(), 2);
    assert_eq!(harness.game.total_game_time(), TARGET * 2);
    assert_eq!(journal.count("update fragile"), 2);
    assert_eq!(journal.count("draw fragile"), 0);
}

#[test]
fn draw_suppressed_by_a_failing_step_does_not_carry_over() {
    let mut harness = Harness::new(GameSettings::default());
    let journal = Journal::default();
    let control = harness.game.control();
    let (_flaky, flaky) = Recorder::new("flaky", &journal)
        .updating(0)
        .drawing(0)
        .on_update(move |time| {
            if time.frame_count() == 0 {
                control.suppress_draw();
                anyhow::bail!("first step failed");
            }
            Ok(())
        })
        .shared();
    harness.game.add_system(flaky).unwrap();
    harness.game.start().unwrap();

    assert!(harness.tick_after(TARGET).is_err());
    harness.tick_after(TARGET).unwrap();

    assert_eq!(journal.count("update flaky"), 2);
    assert_eq!(journal.count("draw flaky"), 1);
    assert_eq!(harness.game.draw_count(), 1);
}

#[test]
fn shutdown_stops_systems_and_restart_initializes_them_again() {
    let mut harness = Harness::new(GameSettings::default());
    let journal = Journal::default();
    let (_a, a) = Recorder::new("a", &journal).updating(0).with_content().shared();
    harness.game.add_system(a).unwrap();
    harness.game.start().unwrap();
    journal.take();

    harness.game.shutdown().unwrap();
    assert_eq!(journal.take(), vec!["unload a", "shutdown a"]);

    harness.game.start().unwrap();
    assert_eq!(journal.take(), vec!["init a", "load a"]);
    harness.tick_after(TARGET).unwrap();
    assert_eq!(journal.take(), vec!["update a"]);
}

#[test]
fn exit_request_stops_remaining_steps_and_draw() {
    let mut harness = Harness::new(GameSettings::default());
    let journal = Journal::default();
    let control = harness.game.control();
    let (_quitter, quitter) = Recorder::new("quitter", &journal)
        .updating(0)
        .drawing(0)
        .on_update(move |_| {
            control.exit();
            Ok(())
        })
        .shared();
    harness.game.add_system(quitter).unwrap();
    harness.game.start().unwrap();
    journal.take();

    harness.tick_after(TARGET * 3).unwrap();
    harness.tick_after(TARGET).unwrap();

    assert_eq!(journal.take(), vec!["update quitter"]);
}

#[test]
fn run_loop_ends_on_close_and_shuts_down() {
    // Variable stepping updates once per tick even though the manual clock
    // never moves.
    let settings = GameSettings {
        is_fixed_time_step: false,
        ..Default::default()
    };
    let mut harness = Harness::new(settings);
    let journal = Journal::default();
    let controller = harness.controller.clone();
    let ticks = Arc::new(Mutex::new(0u32));
    let counter = Arc::clone(&ticks);

    let (_clock, clock) = Recorder::new("clock", &journal)
        .updating(0)
        .drawing(0)
        .with_content()
        .on_update(move |_| {
            let mut count = counter.lock().unwrap();
            *count += 1;
            if *count == 10 {
                controller.request_close();
            }
            Ok(())
        })
        .shared();
    harness.game.add_system(clock).unwrap();

    harness.game.run().unwrap();

    assert_eq!(*ticks.lock().unwrap(), 10);
    assert_eq!(harness.game.draw_count(), 10);
    assert!(!harness.game.is_running());
    assert_eq!(journal.count("unload clock"), 1);
    assert!(harness.controller.pump_count() >= 10);
}

#[test]
fn run_loop_ends_when_the_pump_quits() {
    let mut harness = Harness::new(GameSettings::default());
    harness.controller.quit();

    harness.game.run().unwrap();

    assert_eq!(harness.controller.pump_count(), 1);
    assert_eq!(harness.game.frame_count(), 0);
    assert!(!harness.game.is_running());
}

#[test]
fn inactive_window_sleeps_every_tick() {
    let mut harness = Harness::new(GameSettings::default());
    harness.game.start().unwrap();

    harness.controller.deactivate();
    harness.tick_after(TARGET).unwrap();
    harness.tick_after(TARGET).unwrap();
    assert!(!harness.game.is_active());
    assert_eq!(harness.time.slept(), Duration::from_millis(40));

    harness.controller.activate();
    harness.tick_after(TARGET).unwrap();
    assert!(harness.game.is_active());
    assert_eq!(harness.time.slept(), Duration::from_millis(40));
}

#[test]
fn suspended_game_does_not_catch_up() {
    let mut harness = Harness::new(GameSettings::default());
    let journal = Journal::default();
    let (_sim, sim) = Recorder::new("sim", &journal).updating(0).shared();
    harness.game.add_system(sim).unwrap();
    harness.game.start().unwrap();

    harness.game.suspend();
    harness.tick_after(Duration::from_secs(10)).unwrap();
    assert!(harness.game.is_suspended());
    harness.game.resume();
    harness.tick_after(TARGET).unwrap();

    assert_eq!(journal.count("update sim"), 1);
}

#[test]
fn suspend_before_start_holds_after_start() {
    let mut harness = Harness::new(GameSettings::default());
    let journal = Journal::default();
    let (_sim, sim) = Recorder::new("sim", &journal).updating(0).shared();
    harness.game.add_system(sim).unwrap();

    harness.game.suspend();
    harness.game.start().unwrap();
    assert!(harness.game.is_suspended());
    harness.tick_after(Duration::from_secs(1)).unwrap();
    assert_eq!(journal.count("update sim"), 0);

    harness.game.resume();
    harness.tick_after(TARGET).unwrap();
    assert_eq!(journal.count("update sim"), 1);
    assert_eq!(harness.game.total_game_time(), TARGET);
}

#[test]
fn services_expose_the_shared_collection_and_control() {
    let harness = Harness::new(GameSettings::default());
    let collection = harness
        .game
        .services()
        .require::<GameSystemCollection>()
        .unwrap();
    assert!(Arc::ptr_eq(&collection, harness.game.systems()));
    assert!(harness
        .game
        .services()
        .contains::<cadence_sdk::GameControl>());
}

#[test]
fn invalid_settings_are_rejected_at_construction() {
    let settings = GameSettings {
        target_elapsed_time: Duration::ZERO,
        ..Default::default()
    };
    let platform = cadence_infra::HeadlessPlatform::default();
    assert!(matches!(
        cadence_sdk::Game::new(Box::new(platform), settings),
        Err(GameError::InvalidSettings(_))
    ));
}
