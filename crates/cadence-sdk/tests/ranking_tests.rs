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

use cadence_core::graphics::{
    FeatureLevel, GraphicsAdapter, GraphicsDeviceInformation, GraphicsDevicePreferences,
    MultisampleCount, PresentationParameters,
};
use cadence_sdk::rank_devices;
use std::sync::Arc;

fn adapter(index: usize, is_default: bool) -> Arc<GraphicsAdapter> {
    Arc::new(GraphicsAdapter {
        index,
        description: format!("adapter {index}"),
        is_default,
        max_feature_level: FeatureLevel::Level12_1,
        multisample_counts: vec![MultisampleCount::None, MultisampleCount::X4],
        outputs: Vec::new(),
    })
}

fn candidate(
    adapter: &Arc<GraphicsAdapter>,
    level: FeatureLevel,
    width: u32,
    height: u32,
) -> GraphicsDeviceInformation {
    GraphicsDeviceInformation {
        adapter: Arc::clone(adapter),
        graphics_profile: level,
        presentation_parameters: PresentationParameters {
            back_buffer_width: width,
            back_buffer_height: height,
            ..Default::default()
        },
    }
}

fn sizes(ranked: &[GraphicsDeviceInformation]) -> Vec<(u32, u32)> {
    ranked
        .iter()
        .map(|c| {
            (
                c.presentation_parameters.back_buffer_width,
                c.presentation_parameters.back_buffer_height,
            )
        })
        .collect()
}

#[test]
fn feature_level_dominates_every_other_criterion() {
    let gpu = adapter(0, true);
    let prefs = GraphicsDevicePreferences::default();
    let mut low_but_perfect = candidate(&gpu, FeatureLevel::Level10_0, 800, 480);
    low_but_perfect.presentation_parameters.multisample_count = MultisampleCount::X4;
    let high_but_odd = candidate(&gpu, FeatureLevel::Level11_0, 640, 640);

    let ranked = rank_devices(vec![low_but_perfect, high_but_odd], &prefs);

    assert_eq!(ranked[0].graphics_profile, FeatureLevel::Level11_0);
}

#[test]
fn close_aspect_ratios_fall_through_to_pixel_count() {
    let gpu = adapter(0, true);
    let prefs = GraphicsDevicePreferences::default();
    let candidates = vec![
        candidate(&gpu, FeatureLevel::Level11_0, 640, 640),
        candidate(&gpu, FeatureLevel::Level11_0, 1600, 960),
        candidate(&gpu, FeatureLevel::Level11_0, 854, 480),
    ];

    let ranked = rank_devices(candidates, &prefs);

    // 854x480 is 0.11 off the 5:3 target, close enough to tie with the exact
    // 1600x960, and wins on pixel count. 640x640 is in a worse aspect group.
    assert_eq!(sizes(&ranked), vec![(854, 480), (1600, 960), (640, 640)]);
}

#[test]
fn full_screen_preference_beats_multisampling() {
    let gpu = adapter(0, true);
    let prefs = GraphicsDevicePreferences {
        is_full_screen: true,
        ..Default::default()
    };
    let mut windowed = candidate(&gpu, FeatureLevel::Level11_0, 800, 480);
    windowed.presentation_parameters.multisample_count = MultisampleCount::X4;
    let mut full_screen = candidate(&gpu, FeatureLevel::Level11_0, 1024, 768);
    full_screen.presentation_parameters.is_full_screen = true;

    let ranked = rank_devices(vec![windowed, full_screen], &prefs);

    assert!(ranked[0].presentation_parameters.is_full_screen);
}

#[test]
fn default_adapter_breaks_the_last_tie() {
    let secondary = adapter(1, false);
    let primary = adapter(0, true);
    let prefs = GraphicsDevicePreferences::default();

    let ranked = rank_devices(
        vec![
            candidate(&secondary, FeatureLevel::Level11_0, 800, 480),
            candidate(&primary, FeatureLevel::Level11_0, 800, 480),
        ],
        &prefs,
    );

    assert!(ranked[0].adapter.is_default);
    assert_eq!(ranked[1].adapter.index, 1);
}

#[test]
fn identical_candidates_keep_enumeration_order() {
    let gpu = adapter(0, true);
    let prefs = GraphicsDevicePreferences::default();
    let mut first = candidate(&gpu, FeatureLevel::Level11_0, 800, 480);
    first.presentation_parameters.refresh_rate = 144;
    let second = candidate(&gpu, FeatureLevel::Level11_0, 800, 480);

    let ranked = rank_devices(vec![first, second], &prefs);

    assert_eq!(ranked[0].presentation_parameters.refresh_rate, 144);
    assert_eq!(ranked[1].presentation_parameters.refresh_rate, 60);
}
