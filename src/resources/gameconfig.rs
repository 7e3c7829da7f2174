//! Game configuration.
//!
//! Holds every tunable the core reads. Built once at startup with safe
//! defaults, optionally overlaid from an INI file, validated, then shared
//! read-only as `Arc<GameConfig>` with each component.
//!
//! # Configuration File Format
//!
//! ```ini
//! [window]
//! width = 800
//! height = 600
//! fps = 60
//!
//! [game]
//! countdown = 10
//! score_per_pop = 1
//! health_decrease_on_miss = 10
//! initial_health = 100
//!
//! [bubble]
//! radius_min = 30
//! radius_max = 50
//! speed_min = 120
//! speed_max = 300
//! spawn_rate = 0.03
//!
//! [power]
//! spawn_rate = 0.005
//! duration = 5
//! radius = 25
//! speed = 50
//!
//! [input]
//! detection_confidence = 0.7
//! fist_radius = 20
//!
//! [collision]
//! frame_interval = 5
//!
//! [spawner]
//! respawn_on_pop = false
//! power_every = 5
//!
//! [rng]
//! seed = 42
//! ```

use configparser::ini::Ini;
use log::info;
use std::path::{Path, PathBuf};

/// Default safe values for startup
const DEFAULT_WINDOW_WIDTH: u32 = 800;
const DEFAULT_WINDOW_HEIGHT: u32 = 600;
const DEFAULT_FPS: u32 = 60;
const DEFAULT_COUNTDOWN: f64 = 10.0;
const DEFAULT_SCORE_PER_POP: u64 = 1;
const DEFAULT_HEALTH_DECREASE_ON_MISS: f32 = 10.0;
const DEFAULT_INITIAL_HEALTH: f32 = 100.0;
const DEFAULT_BUBBLE_RADIUS: (f32, f32) = (30.0, 50.0);
const DEFAULT_BUBBLE_SPEED: (f32, f32) = (120.0, 300.0);
const DEFAULT_BUBBLE_SPAWN_RATE: f64 = 0.03;
const DEFAULT_POWER_SPAWN_RATE: f64 = 0.005;
const DEFAULT_POWER_DURATION: f64 = 5.0;
const DEFAULT_POWER_RADIUS: f32 = 25.0;
const DEFAULT_POWER_SPEED: f32 = 50.0;
const DEFAULT_DETECTION_CONFIDENCE: f32 = 0.7;
const DEFAULT_FIST_RADIUS: f32 = 20.0;
const DEFAULT_COLLISION_INTERVAL: u64 = 5;
const DEFAULT_POWER_EVERY: u32 = 5;
const DEFAULT_CONFIG_PATH: &str = "./bubblepop.ini";

/// Upper bound of the health bar.
pub const MAX_HEALTH: f32 = 100.0;

/// All tunables consumed by the game core.
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    /// Play area width in pixels.
    pub window_width: u32,
    /// Play area height in pixels.
    pub window_height: u32,
    /// Nominal frame rate of the host loop.
    pub fps: u32,
    /// Seconds spent in the Init state before play starts.
    pub countdown: f64,
    pub score_per_pop: u64,
    pub health_decrease_on_miss: f32,
    pub initial_health: f32,
    pub bubble_radius_range: (f32, f32),
    /// Bubble fall speed range in pixels per second.
    pub bubble_speed_range: (f32, f32),
    /// Probability of spawning a bubble on any running tick.
    pub bubble_spawn_rate: f64,
    /// Probability of spawning a power-up on any running tick.
    pub power_spawn_rate: f64,
    /// Length of the freeze window in seconds.
    pub power_duration: f64,
    pub power_radius: f32,
    pub power_speed: f32,
    /// Pointer samples below this confidence are ignored.
    pub detection_confidence: f32,
    /// Drawn radius of a tracked fist. Presentation only: handed to the
    /// renderer through the snapshot, never read by the simulation.
    pub fist_radius: f32,
    /// Collision checks run once every this many ticks.
    pub collision_interval: u64,
    /// Spawn a replacement object for each popped bubble.
    pub respawn_on_pop: bool,
    /// With `respawn_on_pop`, every Nth replacement is a power-up.
    pub power_every: u32,
    /// Seed for spawn randomness. `None` seeds from entropy.
    pub seed: Option<u64>,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl GameConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            window_width: DEFAULT_WINDOW_WIDTH,
            window_height: DEFAULT_WINDOW_HEIGHT,
            fps: DEFAULT_FPS,
            countdown: DEFAULT_COUNTDOWN,
            score_per_pop: DEFAULT_SCORE_PER_POP,
            health_decrease_on_miss: DEFAULT_HEALTH_DECREASE_ON_MISS,
            initial_health: DEFAULT_INITIAL_HEALTH,
            bubble_radius_range: DEFAULT_BUBBLE_RADIUS,
            bubble_speed_range: DEFAULT_BUBBLE_SPEED,
            bubble_spawn_rate: DEFAULT_BUBBLE_SPAWN_RATE,
            power_spawn_rate: DEFAULT_POWER_SPAWN_RATE,
            power_duration: DEFAULT_POWER_DURATION,
            power_radius: DEFAULT_POWER_RADIUS,
            power_speed: DEFAULT_POWER_SPEED,
            detection_confidence: DEFAULT_DETECTION_CONFIDENCE,
            fist_radius: DEFAULT_FIST_RADIUS,
            collision_interval: DEFAULT_COLLISION_INTERVAL,
            respawn_on_pop: false,
            power_every: DEFAULT_POWER_EVERY,
            seed: None,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current (default) values.
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(&mut self) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| format!("Failed to load config file: {}", e))?;
        self.apply_ini(&config)?;

        info!(
            "Loaded config: {}x{} @ {} fps, countdown={}s, collision every {} ticks, spawn bubble={} power={}",
            self.window_width,
            self.window_height,
            self.fps,
            self.countdown,
            self.collision_interval,
            self.bubble_spawn_rate,
            self.power_spawn_rate
        );

        Ok(())
    }

    /// Overlay values from INI text. Used by [`GameConfig::load_from_file`].
    pub fn load_from_str(&mut self, text: &str) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .read(text.to_string())
            .map_err(|e| format!("Failed to parse config: {}", e))?;
        self.apply_ini(&config)
    }

    fn apply_ini(&mut self, config: &Ini) -> Result<(), String> {
        // [window] section
        if let Some(width) = read_uint(config, "window", "width")? {
            self.window_width = width as u32;
        }
        if let Some(height) = read_uint(config, "window", "height")? {
            self.window_height = height as u32;
        }
        if let Some(fps) = read_uint(config, "window", "fps")? {
            self.fps = fps as u32;
        }

        // [game] section
        if let Some(countdown) = read_float(config, "game", "countdown")? {
            self.countdown = countdown;
        }
        if let Some(points) = read_uint(config, "game", "score_per_pop")? {
            self.score_per_pop = points;
        }
        if let Some(penalty) = read_float(config, "game", "health_decrease_on_miss")? {
            self.health_decrease_on_miss = penalty as f32;
        }
        if let Some(health) = read_float(config, "game", "initial_health")? {
            self.initial_health = health as f32;
        }

        // [bubble] section
        if let Some(v) = read_float(config, "bubble", "radius_min")? {
            self.bubble_radius_range.0 = v as f32;
        }
        if let Some(v) = read_float(config, "bubble", "radius_max")? {
            self.bubble_radius_range.1 = v as f32;
        }
        if let Some(v) = read_float(config, "bubble", "speed_min")? {
            self.bubble_speed_range.0 = v as f32;
        }
        if let Some(v) = read_float(config, "bubble", "speed_max")? {
            self.bubble_speed_range.1 = v as f32;
        }
        if let Some(v) = read_float(config, "bubble", "spawn_rate")? {
            self.bubble_spawn_rate = v;
        }

        // [power] section
        if let Some(v) = read_float(config, "power", "spawn_rate")? {
            self.power_spawn_rate = v;
        }
        if let Some(v) = read_float(config, "power", "duration")? {
            self.power_duration = v;
        }
        if let Some(v) = read_float(config, "power", "radius")? {
            self.power_radius = v as f32;
        }
        if let Some(v) = read_float(config, "power", "speed")? {
            self.power_speed = v as f32;
        }

        // [input] section
        if let Some(v) = read_float(config, "input", "detection_confidence")? {
            self.detection_confidence = v as f32;
        }
        if let Some(v) = read_float(config, "input", "fist_radius")? {
            self.fist_radius = v as f32;
        }

        // [collision] section
        if let Some(v) = read_uint(config, "collision", "frame_interval")? {
            self.collision_interval = v;
        }

        // [spawner] section
        if let Some(v) = config
            .getbool("spawner", "respawn_on_pop")
            .map_err(|e| format!("Invalid [spawner] respawn_on_pop: {}", e))?
        {
            self.respawn_on_pop = v;
        }
        if let Some(v) = read_uint(config, "spawner", "power_every")? {
            self.power_every = v as u32;
        }

        // [rng] section
        if let Some(seed) = read_uint(config, "rng", "seed")? {
            self.seed = Some(seed);
        }

        Ok(())
    }

    /// Save configuration to the INI file.
    ///
    /// Creates the file if it doesn't exist.
    pub fn save_to_file(&self) -> Result<(), String> {
        let config = self.to_ini();
        config
            .write(&self.config_path)
            .map_err(|e| format!("Failed to save config file: {}", e))?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }

    fn to_ini(&self) -> Ini {
        let mut config = Ini::new();
        let mut put = |section: &str, key: &str, value: String| {
            config.set(section, key, Some(value));
        };

        put("window", "width", self.window_width.to_string());
        put("window", "height", self.window_height.to_string());
        put("window", "fps", self.fps.to_string());

        put("game", "countdown", self.countdown.to_string());
        put("game", "score_per_pop", self.score_per_pop.to_string());
        put(
            "game",
            "health_decrease_on_miss",
            self.health_decrease_on_miss.to_string(),
        );
        put("game", "initial_health", self.initial_health.to_string());

        put("bubble", "radius_min", self.bubble_radius_range.0.to_string());
        put("bubble", "radius_max", self.bubble_radius_range.1.to_string());
        put("bubble", "speed_min", self.bubble_speed_range.0.to_string());
        put("bubble", "speed_max", self.bubble_speed_range.1.to_string());
        put("bubble", "spawn_rate", self.bubble_spawn_rate.to_string());

        put("power", "spawn_rate", self.power_spawn_rate.to_string());
        put("power", "duration", self.power_duration.to_string());
        put("power", "radius", self.power_radius.to_string());
        put("power", "speed", self.power_speed.to_string());

        put(
            "input",
            "detection_confidence",
            self.detection_confidence.to_string(),
        );
        put("input", "fist_radius", self.fist_radius.to_string());

        put("collision", "frame_interval", self.collision_interval.to_string());

        put("spawner", "respawn_on_pop", self.respawn_on_pop.to_string());
        put("spawner", "power_every", self.power_every.to_string());

        if let Some(seed) = self.seed {
            put("rng", "seed", seed.to_string());
        }
        config
    }

    /// Reject values the core cannot run with.
    pub fn validate(&self) -> Result<(), String> {
        if self.window_width == 0 || self.window_height == 0 {
            return Err(format!(
                "Window size must be positive, got {}x{}",
                self.window_width, self.window_height
            ));
        }
        if self.fps == 0 {
            return Err("fps must be positive".into());
        }
        if self.countdown < 0.0 {
            return Err(format!("countdown must not be negative, got {}", self.countdown));
        }
        check_range("bubble radius", self.bubble_radius_range)?;
        check_range("bubble speed", self.bubble_speed_range)?;
        check_probability("bubble spawn_rate", self.bubble_spawn_rate)?;
        check_probability("power spawn_rate", self.power_spawn_rate)?;
        if self.power_duration < 0.0 {
            return Err(format!(
                "power duration must not be negative, got {}",
                self.power_duration
            ));
        }
        if self.power_radius <= 0.0 || self.power_speed < 0.0 {
            return Err(format!(
                "power radius must be positive and speed not negative, got radius={} speed={}",
                self.power_radius, self.power_speed
            ));
        }
        if self.initial_health <= 0.0 || self.initial_health > MAX_HEALTH {
            return Err(format!(
                "initial_health must be in (0, {}], got {}",
                MAX_HEALTH, self.initial_health
            ));
        }
        if self.health_decrease_on_miss < 0.0 {
            return Err(format!(
                "health_decrease_on_miss must not be negative, got {}",
                self.health_decrease_on_miss
            ));
        }
        if !(0.0..=1.0).contains(&self.detection_confidence) {
            return Err(format!(
                "detection_confidence must be in [0, 1], got {}",
                self.detection_confidence
            ));
        }
        if self.collision_interval == 0 {
            return Err("collision frame_interval must be at least 1".into());
        }
        if self.respawn_on_pop && self.power_every == 0 {
            return Err("spawner power_every must be at least 1".into());
        }
        Ok(())
    }

    /// Set play area size.
    pub fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_width = width;
        self.window_height = height;
    }

    /// Get the play area size.
    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }

    /// Fixed frame delta matching `fps`, in seconds.
    pub fn frame_dt(&self) -> f32 {
        1.0 / self.fps.max(1) as f32
    }

    /// The path loaded from and saved to.
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

fn read_uint(config: &Ini, section: &str, key: &str) -> Result<Option<u64>, String> {
    config
        .getuint(section, key)
        .map_err(|e| format!("Invalid [{}] {}: {}", section, key, e))
}

fn read_float(config: &Ini, section: &str, key: &str) -> Result<Option<f64>, String> {
    config
        .getfloat(section, key)
        .map_err(|e| format!("Invalid [{}] {}: {}", section, key, e))
}

fn check_range(what: &str, (min, max): (f32, f32)) -> Result<(), String> {
    if min < 0.0 || max < min {
        return Err(format!("{} range is invalid: ({}, {})", what, min, max));
    }
    Ok(())
}

fn check_probability(what: &str, p: f64) -> Result<(), String> {
    if !(0.0..=1.0).contains(&p) {
        return Err(format!("{} must be a probability in [0, 1], got {}", what, p));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = GameConfig::new();
        assert!(config.validate().is_ok());
        assert_eq!(config.window_size(), (800, 600));
        assert_eq!(config.collision_interval, 5);
        assert_eq!(config.score_per_pop, 1);
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_load_from_str_overrides_present_keys_only() {
        let mut config = GameConfig::new();
        config
            .load_from_str(
                "[window]\nwidth = 1024\n\n[collision]\nframe_interval = 3\n\n[rng]\nseed = 9\n",
            )
            .unwrap();
        assert_eq!(config.window_width, 1024);
        assert_eq!(config.window_height, 600);
        assert_eq!(config.collision_interval, 3);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.score_per_pop, 1);
    }

    #[test]
    fn test_load_from_str_rejects_bad_numbers() {
        let mut config = GameConfig::new();
        let err = config
            .load_from_str("[bubble]\nspawn_rate = often\n")
            .unwrap_err();
        assert!(err.contains("spawn_rate"));
    }

    #[test]
    fn test_load_missing_file_fails() {
        let mut config = GameConfig::with_path("/nonexistent/bubblepop.ini");
        assert!(config.load_from_file().is_err());
    }

    #[test]
    fn test_save_then_load_keeps_values() {
        let path = std::env::temp_dir().join(format!(
            "bubblepop_config_test_{}.ini",
            std::process::id()
        ));
        let mut original = GameConfig::with_path(&path);
        original.window_width = 640;
        original.power_duration = 3.5;
        original.respawn_on_pop = true;
        original.seed = Some(1234);
        original.save_to_file().unwrap();

        let mut loaded = GameConfig::with_path(&path);
        loaded.load_from_file().unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded.window_width, 640);
        assert_eq!(loaded.power_duration, 3.5);
        assert!(loaded.respawn_on_pop);
        assert_eq!(loaded.seed, Some(1234));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = GameConfig::new();
        config.collision_interval = 0;
        assert!(config.validate().is_err());

        let mut config = GameConfig::new();
        config.bubble_spawn_rate = 1.5;
        assert!(config.validate().is_err());

        let mut config = GameConfig::new();
        config.bubble_radius_range = (50.0, 30.0);
        assert!(config.validate().is_err());

        let mut config = GameConfig::new();
        config.initial_health = 150.0;
        assert!(config.validate().is_err());

        let mut config = GameConfig::new();
        config.set_window_size(0, 600);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_frame_dt() {
        let config = GameConfig::new();
        assert!((config.frame_dt() - 1.0 / 60.0).abs() < 1e-6);
    }
}
