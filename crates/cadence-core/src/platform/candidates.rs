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

//! The default candidate enumeration shared by platforms.

use crate::graphics::{
    GraphicsAdapter, GraphicsDeviceInformation, GraphicsDevicePreferences, MultisampleCount,
    PresentationParameters,
};
use std::sync::Arc;

/// Builds the unranked candidate list for `preferences`.
///
/// Each adapter contributes candidates at the first preferred feature level it
/// supports. Windowed candidates use the preferred back buffer size and format.
/// Full-screen candidates take one entry per display mode of the preferred output
/// (falling back to the first output); an adapter without outputs contributes a
/// windowed candidate instead, which the ranking then places behind true
/// full-screen ones. Duplicates are dropped.
pub fn enumerate_device_candidates(
    adapters: &[Arc<GraphicsAdapter>],
    preferences: &GraphicsDevicePreferences,
) -> Vec<GraphicsDeviceInformation> {
    let mut found: Vec<GraphicsDeviceInformation> = Vec::new();
    let (width, height) = preferences.target_size();

    for adapter in adapters {
        let Some(level) = preferences
            .graphics_profiles
            .iter()
            .copied()
            .find(|level| adapter.is_profile_supported(*level))
        else {
            log::debug!(
                "Candidates: adapter '{}' supports none of the preferred profiles",
                adapter.description
            );
            continue;
        };

        let multisample_count = if preferences.prefer_multisampling {
            adapter.max_multisample_count()
        } else {
            MultisampleCount::None
        };

        let base = GraphicsDeviceInformation {
            adapter: Arc::clone(adapter),
            graphics_profile: level,
            presentation_parameters: PresentationParameters {
                back_buffer_width: width,
                back_buffer_height: height,
                back_buffer_format: preferences.back_buffer_format,
                depth_stencil_format: preferences.depth_stencil_format,
                is_full_screen: preferences.is_full_screen,
                full_screen_output_index: preferences.full_screen_output_index,
                multisample_count,
                present_interval: preferences.present_interval(),
                refresh_rate: preferences.refresh_rate,
            },
        };

        if !preferences.is_full_screen {
            push_unique(&mut found, base);
            continue;
        }

        let output = adapter
            .outputs
            .get(preferences.full_screen_output_index)
            .or_else(|| adapter.outputs.first());

        match output {
            Some(output) => {
                for mode in &output.display_modes {
                    let mut candidate = base.clone();
                    let params = &mut candidate.presentation_parameters;
                    params.back_buffer_width = mode.width;
                    params.back_buffer_height = mode.height;
                    params.back_buffer_format = mode.format;
                    params.refresh_rate = mode.refresh_rate;
                    push_unique(&mut found, candidate);
                }
            }
            None => {
                let mut windowed = base;
                windowed.presentation_parameters.is_full_screen = false;
                push_unique(&mut found, windowed);
            }
        }
    }

    found
}

fn push_unique(found: &mut Vec<GraphicsDeviceInformation>, candidate: GraphicsDeviceInformation) {
    if !found.contains(&candidate) {
        found.push(candidate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::{DisplayMode, FeatureLevel, GraphicsOutput, PixelFormat};

    fn adapter(
        index: usize,
        max: FeatureLevel,
        modes: Vec<DisplayMode>,
        msaa: Vec<MultisampleCount>,
    ) -> Arc<GraphicsAdapter> {
        Arc::new(GraphicsAdapter {
            index,
            description: format!("adapter {index}"),
            is_default: index == 0,
            max_feature_level: max,
            multisample_counts: msaa,
            outputs: vec![GraphicsOutput {
                name: "display".into(),
                desktop_width: 1920,
                desktop_height: 1080,
                display_modes: modes,
            }],
        })
    }

    fn mode(width: u32, height: u32) -> DisplayMode {
        DisplayMode {
            width,
            height,
            format: PixelFormat::R8G8B8A8Unorm,
            refresh_rate: 60,
        }
    }

    #[test]
    fn windowed_yields_one_candidate_per_adapter_at_best_level() {
        let adapters = vec![
            adapter(0, FeatureLevel::Level11_0, vec![mode(1920, 1080)], vec![]),
            adapter(1, FeatureLevel::Level10_0, vec![mode(1280, 720)], vec![]),
        ];
        let prefs = GraphicsDevicePreferences::default();

        let found = enumerate_device_candidates(&adapters, &prefs);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].graphics_profile, FeatureLevel::Level11_0);
        assert_eq!(found[1].graphics_profile, FeatureLevel::Level10_0);
        assert_eq!(found[0].presentation_parameters.back_buffer_width, 800);
    }

    #[test]
    fn full_screen_expands_display_modes() {
        let adapters = vec![adapter(
            0,
            FeatureLevel::Level11_0,
            vec![mode(1920, 1080), mode(1280, 720), mode(1280, 720)],
            vec![],
        )];
        let prefs = GraphicsDevicePreferences {
            is_full_screen: true,
            ..Default::default()
        };

        let found = enumerate_device_candidates(&adapters, &prefs);
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|c| c.presentation_parameters.is_full_screen));
    }

    #[test]
    fn unsupported_profiles_skip_adapter() {
        let adapters = vec![adapter(0, FeatureLevel::Level9_3, vec![], vec![])];
        let prefs = GraphicsDevicePreferences {
            graphics_profiles: vec![FeatureLevel::Level11_0, FeatureLevel::Level10_0],
            ..Default::default()
        };
        assert!(enumerate_device_candidates(&adapters, &prefs).is_empty());
    }

    #[test]
    fn multisampling_uses_adapter_maximum() {
        let adapters = vec![adapter(
            0,
            FeatureLevel::Level11_0,
            vec![],
            vec![MultisampleCount::X2, MultisampleCount::X8],
        )];
        let prefs = GraphicsDevicePreferences {
            prefer_multisampling: true,
            ..Default::default()
        };
        let found = enumerate_device_candidates(&adapters, &prefs);
        assert_eq!(
            found[0].presentation_parameters.multisample_count,
            MultisampleCount::X8
        );
    }
}
