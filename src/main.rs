//! Headless runner
//!
//! Plays one game with random inputs at 60 frames per second, logs what
//! happens, stores the high score table and prints the final snapshot.
//!
//! Usage: `blockfall [seed]`

use anyhow::Context;
use blockfall::{Engine, Settings};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const FRAME_TIME: f32 = 1.0 / 60.0;
/// Ten minutes of play
const MAX_FRAMES: u32 = 60 * 60 * 10;

/// Get the blockfall temp directory used for logs
fn blockfall_temp_dir() -> PathBuf {
    let dir = std::env::temp_dir().join("blockfall");
    let _ = fs::create_dir_all(&dir);
    dir
}

fn load_high_scores(engine: &mut Engine, path: &Path) {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(_) => return,
    };
    if let Err(e) = engine.set_high_scores(&bytes) {
        warn!("ignoring high scores at {}: {e}", path.display());
    }
}

fn save_high_scores(engine: &Engine, path: &Path) -> anyhow::Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create data dir {}", dir.display()))?;
    }
    fs::write(path, engine.get_high_scores())
        .with_context(|| format!("failed to write high scores to {}", path.display()))
}

/// Issue one random command, releasing latched keys right away
fn random_input(engine: &mut Engine, input: &mut ChaCha8Rng) {
    match input.gen_range(0..12) {
        0 | 1 => {
            engine.move_left();
        }
        2 | 3 => {
            engine.move_right();
        }
        4 => {
            engine.move_down();
        }
        5 => {
            engine.rotate_left();
            engine.done_rotated_left();
        }
        6 => {
            engine.rotate_right();
            engine.done_rotated_right();
        }
        7 => {
            engine.drop();
            engine.done_dropped();
        }
        8 => {
            engine.hold();
        }
        _ => {}
    }
}

fn main() -> anyhow::Result<()> {
    let seed: u64 = match std::env::args().nth(1) {
        Some(arg) => arg.parse().with_context(|| format!("invalid seed {arg:?}"))?,
        None => rand::random(),
    };

    // Setup tracing to log file
    let log_dir = blockfall_temp_dir();
    let log_file = format!("{seed:016x}.log");
    let file_appender = tracing_appender::rolling::never(&log_dir, &log_file);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("blockfall=debug".parse()?),
        )
        .with_ansi(false)
        .init();

    info!(
        "BLOCKFALL starting up, seed={seed}, log={}",
        log_dir.join(&log_file).display()
    );

    let settings = Settings::load();
    let mut engine = Engine::with_seed(settings.engine_config(), seed);

    let scores_path = Settings::high_scores_path();
    if let Some(path) = &scores_path {
        load_high_scores(&mut engine, path);
    }

    // Inputs get their own stream so the piece sequence only depends on the seed
    let mut input = ChaCha8Rng::seed_from_u64(seed ^ 0x9e37_79b9_7f4a_7c15);
    let mut frames = 0;
    while !engine.is_game_over() && frames < MAX_FRAMES {
        random_input(&mut engine, &mut input);
        engine.update(FRAME_TIME);

        while let Some(message) = engine.next_message() {
            debug!(text = %message.text, row = message.start_row, "message");
        }
        if let Some(effect) = engine.sound_effect() {
            debug!(?effect, code = effect.code(), "sound");
            engine.clear_sound_effect();
        }
        frames += 1;
    }

    let score = engine.score();
    info!(
        frames,
        points = score.points,
        lines = score.lines,
        level = score.level,
        game_over = engine.is_game_over(),
        "run finished"
    );

    if let Some(path) = &scores_path {
        save_high_scores(&engine, path)?;
    }

    let snapshot = serde_json::to_string_pretty(&engine.snapshot())
        .context("failed to serialize snapshot")?;
    println!("{snapshot}");
    Ok(())
}
