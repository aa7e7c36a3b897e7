//! Gameplay tuning, the settings file and where both live on disk.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use crate::assets::CharacterId;

pub const MIN_FPS: u32 = 10;
pub const MAX_FPS: u32 = 240;

// ── Tuning ──────────────────────────────────────────────────────────────────

/// How new obstacles are paced.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpawnPolicy {
    /// Interval and scroll speed follow the score-derived difficulty.
    Dynamic,
    /// Spawn whenever the frame counter is a multiple of `interval`, at base speed.
    FixedInterval { interval: u32 },
}

/// Gameplay constants, in world units and ticks.
///
/// The playfield is `world_height` units tall and as wide as the terminal
/// aspect ratio allows.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub gravity: f64,
    pub jump: f64,
    pub player_x: f64,
    pub player_w: f64,
    pub player_h: f64,
    pub player_start_y: f64,
    pub hitbox_inset: f64,
    pub pipe_w: f64,
    pub pipe_gap: f64,
    pub min_segment: f64,
    pub base_dx: f64,
    pub base_spawn_interval: u32,
    pub difficulty_step: f64,
    pub difficulty_cap: f64,
    pub spawn_policy: SpawnPolicy,
    pub squash: (f64, f64),
    pub squash_recovery: f64,
    pub points_per_level: u32,
    pub level_banner_ticks: u32,
    pub world_height: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: 0.15,
            jump: 3.5,
            player_x: 50.0,
            player_w: 40.0,
            player_h: 40.0,
            player_start_y: 150.0,
            hitbox_inset: 5.0,
            pipe_w: 53.0,
            pipe_gap: 150.0,
            min_segment: 80.0,
            base_dx: 2.0,
            base_spawn_interval: 110,
            difficulty_step: 0.02,
            difficulty_cap: 2.5,
            spawn_policy: SpawnPolicy::Dynamic,
            squash: (1.3, 0.7),
            squash_recovery: 0.1,
            points_per_level: 10,
            level_banner_ticks: 90,
            world_height: 640.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    NonPositive(&'static str),
    Negative(&'static str, f64),
    NotAFraction(&'static str, f64),
    CapBelowOne(f64),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NonPositive(field) => write!(f, "{field} must be greater than zero"),
            ConfigError::Negative(field, v) => write!(f, "{field} must not be negative (got {v})"),
            ConfigError::NotAFraction(field, v) => {
                write!(f, "{field} must be between 0 and 1 (got {v})")
            }
            ConfigError::CapBelowOne(cap) => {
                write!(f, "difficulty_cap must be at least 1.0 (got {cap})")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl Tuning {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sizes = [
            ("jump", self.jump),
            ("player_w", self.player_w),
            ("player_h", self.player_h),
            ("pipe_w", self.pipe_w),
            ("pipe_gap", self.pipe_gap),
            ("base_dx", self.base_dx),
            ("world_height", self.world_height),
        ];
        for (name, value) in sizes {
            if !(value > 0.0) {
                return Err(ConfigError::NonPositive(name));
            }
        }
        if self.base_spawn_interval == 0 {
            return Err(ConfigError::NonPositive("base_spawn_interval"));
        }
        if self.points_per_level == 0 {
            return Err(ConfigError::NonPositive("points_per_level"));
        }
        if let SpawnPolicy::FixedInterval { interval: 0 } = self.spawn_policy {
            return Err(ConfigError::NonPositive("spawn_policy.interval"));
        }
        let magnitudes = [
            ("gravity", self.gravity),
            ("difficulty_step", self.difficulty_step),
            ("min_segment", self.min_segment),
            ("hitbox_inset", self.hitbox_inset),
        ];
        for (name, value) in magnitudes {
            if !(value >= 0.0) {
                return Err(ConfigError::Negative(name, value));
            }
        }
        if !(0.0..=1.0).contains(&self.squash_recovery) {
            return Err(ConfigError::NotAFraction("squash_recovery", self.squash_recovery));
        }
        if self.difficulty_cap < 1.0 {
            return Err(ConfigError::CapBelowOne(self.difficulty_cap));
        }
        Ok(())
    }
}

// ── Settings file ───────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub character: CharacterId,
    pub fps: u32,
    pub sound: bool,
    pub tuning: Tuning,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            character: CharacterId::Nidha,
            fps: 60,
            sound: true,
            tuning: Tuning::default(),
        }
    }
}

impl Settings {
    pub fn fps_clamped(&self) -> u32 {
        self.fps.clamp(MIN_FPS, MAX_FPS)
    }
}

pub struct Paths {
    pub settings_path: PathBuf,
    pub highscore_path: PathBuf,
    pub log_path: PathBuf,
}

impl Paths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            settings_path: dir.join("settings.json"),
            highscore_path: dir.join("highscore.json"),
            log_path: dir.join("why-am-i-flying.log"),
        }
    }
}

/// Resolves the data directory, creating it if needed.
pub fn project_paths(data_dir: Option<&Path>) -> Result<Paths> {
    let dir = match data_dir {
        Some(dir) => dir.to_path_buf(),
        None => ProjectDirs::from("com", "whyamiflying", "WhyAmIFlying")
            .context("could not resolve project directories")?
            .data_local_dir()
            .to_path_buf(),
    };
    fs::create_dir_all(&dir)
        .with_context(|| format!("could not create data directory {}", dir.display()))?;
    Ok(Paths::in_dir(&dir))
}

/// Missing or unreadable settings fall back to defaults.
pub fn load_settings(path: &Path) -> Settings {
    if let Ok(s) = fs::read_to_string(path) {
        match serde_json::from_str::<Settings>(&s) {
            Ok(v) => return v,
            Err(err) => tracing::warn!(path = %path.display(), %err, "ignoring malformed settings"),
        }
    }
    Settings::default()
}

pub fn save_settings_atomic(path: &Path, s: &Settings) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    let data = serde_json::to_vec_pretty(s)?;
    fs::write(&tmp, data).with_context(|| format!("writing {}", tmp.display()))?;
    atomic_rename(&tmp, path)?;
    Ok(())
}

pub fn atomic_rename(from: &Path, to: &Path) -> Result<()> {
    if to.exists() {
        let _ = fs::remove_file(to);
    }
    fs::rename(from, to)
        .with_context(|| format!("renaming {} to {}", from.display(), to.display()))?;
    Ok(())
}
