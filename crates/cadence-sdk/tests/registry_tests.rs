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

use cadence_core::{GameTime, SystemHandle};
use cadence_sdk::GameSystemCollection;
use common::{Journal, Recorder};
use std::sync::Arc;

fn is_sorted(keys: &[i32]) -> bool {
    keys.windows(2).all(|pair| pair[0] <= pair[1])
}

/// Small deterministic generator so the sequence is reproducible.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: u64) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (self.0 >> 33) % bound
    }
}

#[test]
fn views_stay_sorted_through_adds_removes_and_reorders() {
    let journal = Journal::default();
    let collection = GameSystemCollection::new();
    let mut live: Vec<(Arc<std::sync::Mutex<Recorder>>, SystemHandle)> = Vec::new();
    let mut rng = Lcg(7);

    for step in 0..200 {
        match rng.next(3) {
            0 => {
                let order = rng.next(5) as i32 - 2;
                let shared = Recorder::new(&format!("s{step}"), &journal)
                    .updating(order)
                    .drawing(-order)
                    .shared();
                collection.add(shared.1.clone()).unwrap();
                live.push(shared);
            }
            1 if !live.is_empty() => {
                let index = rng.next(live.len() as u64) as usize;
                let (_, handle) = live.swap_remove(index);
                assert!(collection.remove(&handle).unwrap());
            }
            _ if !live.is_empty() => {
                let index = rng.next(live.len() as u64) as usize;
                let recorder = live[index].0.lock().unwrap();
                recorder.update_order.as_ref().unwrap().set(rng.next(7) as i32 - 3);
            }
            _ => {}
        }

        let update_view = collection.update_order();
        let draw_view = collection.draw_order();
        assert!(is_sorted(&collection.update_keys()), "update view unsorted at step {step}");
        assert!(is_sorted(&collection.draw_keys()), "draw view unsorted at step {step}");
        assert_eq!(update_view.len(), live.len());
        assert_eq!(draw_view.len(), live.len());
    }
}

#[test]
fn reorder_moves_only_the_changed_system() {
    let journal = Journal::default();
    let collection = GameSystemCollection::new();
    let (a, a_handle) = Recorder::new("a", &journal).updating(0).shared();
    let (b, b_handle) = Recorder::new("b", &journal).updating(0).shared();
    let (_c, c_handle) = Recorder::new("c", &journal).updating(0).shared();
    for handle in [&a_handle, &b_handle, &c_handle] {
        collection.add(handle.clone()).unwrap();
    }

    // Moving b away and back lands it after the other equal keys.
    b.lock().unwrap().update_order.as_ref().unwrap().set(5);
    assert_eq!(collection.update_order(), vec![a_handle.clone(), c_handle.clone(), b_handle.clone()]);
    b.lock().unwrap().update_order.as_ref().unwrap().set(0);
    assert_eq!(collection.update_order(), vec![a_handle.clone(), c_handle.clone(), b_handle.clone()]);

    a.lock().unwrap().update_order.as_ref().unwrap().set(-1);
    collection.update(&GameTime::default()).unwrap();
    assert_eq!(journal.take(), vec!["update a", "update c", "update b"]);
}

#[test]
fn disabled_and_invisible_systems_are_skipped() {
    struct Toggle {
        order: cadence_core::OrderKey,
        enabled: bool,
        journal: Journal,
    }

    impl cadence_core::Updateable for Toggle {
        fn update_order(&self) -> &cadence_core::OrderKey {
            &self.order
        }
        fn enabled(&self) -> bool {
            self.enabled
        }
        fn update(&mut self, _time: &GameTime) -> anyhow::Result<()> {
            self.journal.push("update toggle");
            Ok(())
        }
    }

    impl cadence_core::Drawable for Toggle {
        fn draw_order(&self) -> &cadence_core::OrderKey {
            &self.order
        }
        fn visible(&self) -> bool {
            self.enabled
        }
        fn draw(&mut self, _time: &GameTime) -> anyhow::Result<()> {
            self.journal.push("draw toggle");
            Ok(())
        }
    }

    impl cadence_core::GameSystem for Toggle {
        fn name(&self) -> &str {
            "toggle"
        }
        fn as_updateable(&mut self) -> Option<&mut dyn cadence_core::Updateable> {
            Some(self)
        }
        fn as_drawable(&mut self) -> Option<&mut dyn cadence_core::Drawable> {
            Some(self)
        }
    }

    let journal = Journal::default();
    let toggle = Arc::new(std::sync::Mutex::new(Toggle {
        order: cadence_core::OrderKey::default(),
        enabled: false,
        journal: journal.clone(),
    }));
    let collection = GameSystemCollection::new();
    collection.add(SystemHandle::from(Arc::clone(&toggle))).unwrap();

    collection.update(&GameTime::default()).unwrap();
    collection.draw(&GameTime::default()).unwrap();
    assert!(journal.take().is_empty());

    toggle.lock().unwrap().enabled = true;
    collection.update(&GameTime::default()).unwrap();
    collection.draw(&GameTime::default()).unwrap();
    assert_eq!(journal.take(), vec!["update toggle", "draw toggle"]);
}

#[test]
fn declined_begin_draw_skips_draw_and_end_draw() {
    struct Shy {
        order: cadence_core::OrderKey,
        journal: Journal,
    }

    impl cadence_core::Drawable for Shy {
        fn draw_order(&self) -> &cadence_core::OrderKey {
            &self.order
        }
        fn begin_draw(&mut self) -> bool {
            self.journal.push("begin");
            false
        }
        fn draw(&mut self, _time: &GameTime) -> anyhow::Result<()> {
            self.journal.push("draw");
            Ok(())
        }
        fn end_draw(&mut self) {
            self.journal.push("end");
        }
    }

    impl cadence_core::GameSystem for Shy {
        fn name(&self) -> &str {
            "shy"
        }
        fn as_drawable(&mut self) -> Option<&mut dyn cadence_core::Drawable> {
            Some(self)
        }
    }

    let journal = Journal::default();
    let collection = GameSystemCollection::new();
    collection
        .add(SystemHandle::new(Shy {
            order: cadence_core::OrderKey::default(),
            journal: journal.clone(),
        }))
        .unwrap();

    collection.draw(&GameTime::default()).unwrap();
    assert_eq!(journal.take(), vec!["begin"]);
}

#[test]
fn system_added_during_dispatch_runs_from_next_dispatch() {
    let journal = Journal::default();
    let collection = Arc::new(GameSystemCollection::new());
    collection.initialize_pending().unwrap();

    let spawner_collection = Arc::clone(&collection);
    let spawn_journal = journal.clone();
    let mut spawned = false;
    let (_spawner, handle) = Recorder::new("spawner", &journal)
        .updating(0)
        .on_update(move |_| {
            if !spawned {
                spawned = true;
                let child = Recorder::new("child", &spawn_journal).updating(10);
                spawner_collection.add(SystemHandle::new(child))?;
            }
            Ok(())
        })
        .shared();
    collection.add(handle).unwrap();
    journal.take();

    collection.update(&GameTime::default()).unwrap();
    assert_eq!(journal.take(), vec!["update spawner", "init child"]);

    collection.update(&GameTime::default()).unwrap();
    assert_eq!(journal.take(), vec!["update spawner", "update child"]);
}

#[test]
fn failing_update_names_the_system() {
    let journal = Journal::default();
    let collection = GameSystemCollection::new();
    let (_broken, handle) = Recorder::new("broken", &journal)
        .updating(0)
        .on_update(|_| Err(anyhow::anyhow!("nan in velocity")))
        .shared();
    collection.add(handle).unwrap();

    let err = collection.update(&GameTime::default()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "System 'broken' failed during update: nan in velocity"
    );
}
