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

//! Boots a headless game and runs it for a fixed number of frames.
//!
//! Usage: `cadence-runtime [settings.json|-] [frames] [effects-dir]`

mod systems;

use anyhow::{Context, Result};
use cadence_core::SystemHandle;
use cadence_infra::HeadlessPlatform;
use cadence_io::{EffectCompilerConfig, EffectCompilerSystem, IncludeCompiler};
use cadence_sdk::{Game, GameSettings};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use systems::{FrameLimiter, Spinner};

const DEFAULT_FRAMES: u64 = 600;

struct Args {
    settings: Option<PathBuf>,
    frames: u64,
    effects: Option<PathBuf>,
}

impl Args {
    fn parse() -> Result<Self> {
        let mut args = std::env::args().skip(1);
        let settings = args.next().filter(|arg| arg != "-").map(PathBuf::from);
        let frames = match args.next() {
            Some(arg) => arg
                .parse()
                .with_context(|| format!("invalid frame count '{arg}'"))?,
            None => DEFAULT_FRAMES,
        };
        let effects = args.next().map(PathBuf::from);
        Ok(Self {
            settings,
            frames,
            effects,
        })
    }
}

fn load_settings(path: Option<&Path>) -> Result<GameSettings> {
    let settings = match path {
        Some(path) => GameSettings::load(path)
            .with_context(|| format!("loading settings from '{}'", path.display()))?,
        None => GameSettings::default(),
    };
    log::debug!("Runtime: settings {}", settings.to_json_string()?);
    Ok(settings)
}

fn effect_system(dir: &Path) -> Result<EffectCompilerSystem> {
    let system =
        EffectCompilerSystem::new(IncludeCompiler::default(), EffectCompilerConfig::default());
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("reading effects from '{}'", dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "fx") {
            let id = system.add_effect(&path);
            log::info!("Runtime: tracking {id} from '{}'", path.display());
        }
    }
    Ok(system)
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse()?;
    let settings = load_settings(args.settings.as_deref())?;
    let platform = HeadlessPlatform::builder()
        .with_title("Cadence Runtime")
        .with_dimensions(
            settings.graphics.back_buffer_width,
            settings.graphics.back_buffer_height,
        )
        .build();

    let mut game = Game::new(Box::new(platform), settings)?;

    let spinner = Arc::new(Mutex::new(Spinner::new(0.5)));
    game.add_system(SystemHandle::from(Arc::clone(&spinner)))?;
    game.add_system(SystemHandle::new(FrameLimiter::new(
        args.frames,
        game.control(),
    )))?;
    if let Some(dir) = args.effects.as_deref() {
        game.add_system(SystemHandle::new(effect_system(dir)?))?;
    }

    log::info!("Runtime: running for {} frame(s)", args.frames);
    game.run()?;

    let spinner = spinner
        .lock()
        .map_err(|_| anyhow::anyhow!("spinner state poisoned"))?;
    log::info!(
        "Runtime: {} update step(s), {} frame(s) drawn, {:.2}s of game time",
        game.frame_count(),
        game.draw_count(),
        game.total_game_time().as_secs_f64()
    );
    log::info!(
        "Runtime: spinner at {:.3} rad, {} slow step(s), content loaded {} time(s)",
        spinner.angle,
        spinner.slow_steps,
        spinner.content_loads
    );
    Ok(())
}
