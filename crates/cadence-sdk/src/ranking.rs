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

//! Ordering of candidate device configurations.

use cadence_core::graphics::{
    FeatureLevel, GraphicsDeviceInformation, GraphicsDevicePreferences, MultisampleCount,
};
use std::cmp::Reverse;

/// Aspect ratio differences within this distance of each other rank as equal.
const ASPECT_RATIO_TOLERANCE: f64 = 0.2;

/// Sort key of one candidate; earlier fields dominate later ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct RankKey {
    feature_level: Reverse<FeatureLevel>,
    full_screen_mismatch: bool,
    format_rank: u8,
    multisample: Reverse<MultisampleCount>,
    aspect_cluster: usize,
    pixel_delta: u64,
    non_default_adapter: bool,
}

/// Sorts `candidates` best first.
///
/// The criteria, in priority order: higher feature level; full-screen flag equal
/// to the preference; back buffer format equal to the preference, then of the same
/// bit depth; higher multisample count; aspect ratio closest to the target size
/// (differences within 0.2 count as equal); pixel count closest to the target
/// size; default adapter first. The sort is stable, so fully tied candidates keep
/// their enumeration order.
pub fn rank_devices(
    candidates: Vec<GraphicsDeviceInformation>,
    preferences: &GraphicsDevicePreferences,
) -> Vec<GraphicsDeviceInformation> {
    let (target_width, target_height) = preferences.target_size();
    let target_aspect = f64::from(target_width) / f64::from(target_height);
    let target_pixels = u64::from(target_width) * u64::from(target_height);

    let aspect_diffs: Vec<f64> = candidates
        .iter()
        .map(|c| (c.presentation_parameters.aspect_ratio() - target_aspect).abs())
        .collect();
    let clusters = AspectClusters::new(&aspect_diffs);

    let mut keyed: Vec<(RankKey, GraphicsDeviceInformation)> = candidates
        .into_iter()
        .zip(aspect_diffs)
        .map(|(candidate, aspect_diff)| {
            let params = &candidate.presentation_parameters;
            let format_rank = if params.back_buffer_format == preferences.back_buffer_format {
                0
            } else if params.back_buffer_format.bits_per_pixel()
                == preferences.back_buffer_format.bits_per_pixel()
            {
                1
            } else {
                2
            };
            let key = RankKey {
                feature_level: Reverse(candidate.graphics_profile),
                full_screen_mismatch: params.is_full_screen != preferences.is_full_screen,
                format_rank,
                multisample: Reverse(params.multisample_count),
                aspect_cluster: clusters.cluster_of(aspect_diff),
                pixel_delta: params.pixel_count().abs_diff(target_pixels),
                non_default_adapter: !candidate.adapter.is_default,
            };
            (key, candidate)
        })
        .collect();

    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    keyed.into_iter().map(|(_, candidate)| candidate).collect()
}

/// Groups aspect ratio differences so that "within tolerance" becomes a total
/// order: walking the sorted differences, a new group starts whenever a value is
/// more than the tolerance away from the first value of the current group.
struct AspectClusters {
    starts: Vec<f64>,
}

impl AspectClusters {
    fn new(diffs: &[f64]) -> Self {
        let mut sorted = diffs.to_vec();
        sorted.sort_by(f64::total_cmp);
        let mut starts: Vec<f64> = Vec::new();
        for diff in sorted {
            match starts.last() {
                Some(start) if diff - start <= ASPECT_RATIO_TOLERANCE => {}
                _ => starts.push(diff),
            }
        }
        Self { starts }
    }

    fn cluster_of(&self, diff: f64) -> usize {
        self.starts.partition_point(|start| *start <= diff).saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::graphics::{GraphicsAdapter, PixelFormat, PresentationParameters};
    use std::sync::Arc;

    fn candidate(
        level: FeatureLevel,
        width: u32,
        height: u32,
        is_default: bool,
    ) -> GraphicsDeviceInformation {
        GraphicsDeviceInformation {
            adapter: Arc::new(GraphicsAdapter {
                index: usize::from(!is_default),
                description: "gpu".into(),
                is_default,
                max_feature_level: level,
                multisample_counts: vec![MultisampleCount::None],
                outputs: Vec::new(),
            }),
            graphics_profile: level,
            presentation_parameters: PresentationParameters {
                back_buffer_width: width,
                back_buffer_height: height,
                ..Default::default()
            },
        }
    }

    #[test]
    fn clusters_group_close_differences() {
        let clusters = AspectClusters::new(&[0.0, 0.15, 0.3, 0.9]);
        assert_eq!(clusters.cluster_of(0.0), 0);
        assert_eq!(clusters.cluster_of(0.15), 0);
        assert_eq!(clusters.cluster_of(0.3), 1);
        assert_eq!(clusters.cluster_of(0.9), 2);
    }

    #[test]
    fn format_family_beats_other_formats() {
        let prefs = GraphicsDevicePreferences::default();
        let mut exact = candidate(FeatureLevel::Level11_0, 800, 480, true);
        exact.presentation_parameters.back_buffer_format = PixelFormat::R8G8B8A8Unorm;
        let mut same_depth = exact.clone();
        same_depth.presentation_parameters.back_buffer_format = PixelFormat::B8G8R8A8Unorm;
        let mut other = exact.clone();
        other.presentation_parameters.back_buffer_format = PixelFormat::B5G6R5Unorm;

        let ranked = rank_devices(vec![other, same_depth, exact.clone()], &prefs);
        let formats: Vec<_> = ranked
            .iter()
            .map(|c| c.presentation_parameters.back_buffer_format)
            .collect();
        assert_eq!(
            formats,
            vec![
                PixelFormat::R8G8B8A8Unorm,
                PixelFormat::B8G8R8A8Unorm,
                PixelFormat::B5G6R5Unorm
            ]
        );
    }

    #[test]
    fn default_adapter_breaks_ties() {
        let prefs = GraphicsDevicePreferences::default();
        let ranked = rank_devices(
            vec![
                candidate(FeatureLevel::Level11_0, 800, 480, false),
                candidate(FeatureLevel::Level11_0, 800, 480, true),
            ],
            &prefs,
        );
        assert!(ranked[0].adapter.is_default);
    }

    #[test]
    fn full_screen_preference_is_honored() {
        let prefs = GraphicsDevicePreferences {
            is_full_screen: true,
            ..Default::default()
        };
        let windowed = candidate(FeatureLevel::Level11_0, 800, 480, true);
        let mut full = windowed.clone();
        full.presentation_parameters.is_full_screen = true;
        full.presentation_parameters.back_buffer_width = 1920;
        full.presentation_parameters.back_buffer_height = 1080;

        let ranked = rank_devices(vec![windowed, full], &prefs);
        assert!(ranked[0].presentation_parameters.is_full_screen);
    }
}
