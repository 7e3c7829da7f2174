//! Bubble Pop headless runner.
//!
//! Drives the game core without a camera or a window:
//! - a [`ManualClock`] advanced by one frame (`1/fps`) per tick
//! - a scripted pointer sweeping back and forth across the play area
//! - a renderer that logs a status line once per simulated second
//! - the audio bridge's replies drained every frame
//!
//! At the end the final [`GameSnapshot`] is printed, as JSON with `--json`.
//!
//! # Running
//!
//! ```sh
//! cargo run --release -- --ticks 3600 --seed 42
//! RUST_LOG=debug cargo run -- --config bubblepop.ini --json
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use bubblepop::game::GameEngine;
use bubblepop::resources::audio::{AudioBridge, NullSoundPlayer, SoundPlayer};
use bubblepop::resources::gameconfig::GameConfig;
use bubblepop::resources::gamesession::GameStates;
use bubblepop::resources::pointer::{PointerSample, SharedPointers};
use bubblepop::resources::worldtime::{Clock, ManualClock};
use bubblepop::snapshot::{GameSnapshot, Renderer};
use clap::Parser;
use log::{info, warn};

/// Bubble Pop game core, headless
#[derive(Parser)]
#[command(version, about = "Runs the Bubble Pop game core headless with a scripted pointer.")]
struct Cli {
    /// INI file to load tunables from.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Number of frames to simulate.
    #[arg(long, default_value_t = 3600)]
    ticks: u64,

    /// Seed for spawn randomness.
    #[arg(long)]
    seed: Option<u64>,

    /// Write the effective configuration to PATH and exit.
    #[arg(long, value_name = "PATH")]
    write_config: Option<PathBuf>,

    /// Print the final snapshot as JSON.
    #[arg(long)]
    json: bool,
}

/// Logs a one-line status per call.
struct LogRenderer;

impl Renderer for LogRenderer {
    fn render(&mut self, snapshot: &GameSnapshot) -> Result<(), String> {
        match snapshot.state {
            GameStates::Init => info!("get ready... {:.0}", snapshot.countdown_remaining.ceil()),
            _ => info!(
                "[{:?}] score={} health={:.0} objects={}{}",
                snapshot.state,
                snapshot.score,
                snapshot.health,
                snapshot.objects.len(),
                if snapshot.is_frozen() {
                    format!(" frozen {:.1}s", snapshot.freeze_remaining)
                } else {
                    String::new()
                }
            ),
        }
        Ok(())
    }
}

/// Scripted hand: sweeps horizontally at 60% of the play height.
fn sweeping_pointer(config: &GameConfig, t: f64) -> PointerSample {
    let width = config.window_width as f32;
    let x = width * 0.5 + width * 0.4 * (t as f32 * 1.5).sin();
    let y = config.window_height as f32 * 0.6;
    PointerSample::with_confidence(x, y, 0.9)
}

fn load_config(cli: &Cli) -> Result<GameConfig, String> {
    let mut config = match &cli.config {
        Some(path) => {
            let mut config = GameConfig::with_path(path);
            config.load_from_file()?;
            config
        }
        None => GameConfig::new(),
    };
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    config.validate()?;
    Ok(config)
}

fn run(cli: Cli) -> Result<(), String> {
    let mut config = load_config(&cli)?;

    if let Some(path) = cli.write_config {
        config.config_path = path;
        config.save_to_file()?;
        println!("Config written to {}", config.path().display());
        return Ok(());
    }

    let config = Arc::new(config);
    let clock = ManualClock::new(0.0);
    let pointers = SharedPointers::new();
    let audio = match AudioBridge::with_default_cues() {
        Ok(bridge) => Some(Arc::new(bridge)),
        Err(e) => {
            warn!("audio disabled: {}", e);
            None
        }
    };
    let sound: Arc<dyn SoundPlayer> = match &audio {
        Some(bridge) => Arc::clone(bridge) as Arc<dyn SoundPlayer>,
        None => Arc::new(NullSoundPlayer),
    };

    let mut engine = GameEngine::new(
        Arc::clone(&config),
        Arc::new(clock.clone()),
        Arc::new(pointers.clone()),
        sound,
    )?;
    let mut renderer = LogRenderer;

    let dt = config.frame_dt();
    let fps = u64::from(config.fps.max(1));
    for tick in 0..cli.ticks {
        clock.advance(f64::from(dt));
        pointers.set([sweeping_pointer(&config, clock.now())]);
        engine.update(dt);
        if let Some(bridge) = &audio {
            bridge.log_messages();
        }

        if tick % fps == 0 {
            engine.render(&mut renderer)?;
        }
        if engine.state() == GameStates::GameOver {
            info!("game over after {} ticks", tick + 1);
            break;
        }
    }

    if !engine.bus().wait_until_drained(Some(Duration::from_secs(2))) {
        warn!("{} events still pending at exit", engine.bus().pending());
    }
    let snapshot = engine.snapshot();
    engine.shutdown();
    if let Some(bridge) = &audio {
        bridge.shutdown();
        bridge.log_messages();
    }

    if cli.json {
        println!("{}", snapshot.to_json()?);
    } else {
        println!(
            "state={:?} score={} health={:.0} frames={} objects={}",
            snapshot.state,
            snapshot.score,
            snapshot.health,
            snapshot.frame_count,
            snapshot.objects.len()
        );
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
