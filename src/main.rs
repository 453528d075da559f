//! Asteroids headless driver
//!
//! Runs a scripted session at a fixed frame rate and logs what the core
//! reports. Usage: `asteroids-sim [settings.json] [seconds]`

use asteroids_sim::sim::{GameEvent, GamePhase};
use asteroids_sim::{Game, Settings};

/// Frame length of the simulated display (ms)
const FRAME_MS: f32 = 1000.0 / 60.0;
const DEFAULT_SECONDS: u32 = 60;

fn main() {
    env_logger::init();
    log::info!("Asteroids (headless) starting...");

    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => match Settings::load(&path) {
            Ok(settings) => settings,
            Err(e) => {
                log::error!("Could not load {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => Settings::default(),
    };
    let seconds = args
        .next()
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(DEFAULT_SECONDS);

    let mut game = match Game::with_settings(settings) {
        Ok(game) => game,
        Err(e) => {
            log::error!("Invalid settings: {}", e);
            std::process::exit(1);
        }
    };

    let frames = (seconds as f32 * 1000.0 / FRAME_MS) as u32;
    for frame in 0..frames {
        script_input(&mut game, frame);

        let result = game.advance(FRAME_MS);
        for event in &result.events {
            match event {
                GameEvent::ShotFired | GameEvent::ThrustOn | GameEvent::ThrustOff => {
                    log::trace!("frame {}: {:?}", frame, event)
                }
                GameEvent::ExplosionAt { .. } | GameEvent::AsteroidDestroyed { .. } => {
                    log::debug!("frame {}: {:?}", frame, event)
                }
                _ => log::info!("frame {}: {:?}", frame, event),
            }
        }

        if result.phase == GamePhase::GameOver {
            break;
        }
    }

    let stats = game.stats();
    let snapshot = game.snapshot();
    println!(
        "score {} | lives {} | level {} | {} asteroids, {} saucers on screen",
        stats.score,
        stats.lives,
        stats.level,
        snapshot.asteroids.len(),
        snapshot.saucers.len()
    );
}

/// Spin slowly, pulse the engine and keep the trigger held
fn script_input(game: &mut Game, frame: u32) {
    let phase = frame % 240;
    game.set_key("ArrowLeft", phase < 90);
    game.set_key("ArrowUp", (120..150).contains(&phase));
    game.set_key("Space", true);
}
