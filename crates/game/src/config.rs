//! Game configuration (world, session, locomotion tuning). Loaded from config.ron at startup.

use locomotion::LocomotionConfig;
use serde::{Deserialize, Serialize};

/// Persistent game settings. Loaded from `config.ron` in the current directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Planet radius in metres.
    #[serde(default = "default_planet_radius")]
    pub planet_radius: f32,
    /// Surface gravity in m/s².
    #[serde(default = "default_gravity")]
    pub gravity: f32,
    /// Radius of the sea centred on the south pole. Zero disables it.
    #[serde(default = "default_ocean_radius")]
    pub ocean_radius: f32,
    /// Boulders scattered over the surface.
    #[serde(default = "default_boulder_count")]
    pub boulder_count: usize,
    /// Seed for world population.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Simulation rate in Hz.
    #[serde(default = "default_fixed_rate")]
    pub fixed_rate: f64,
    /// Length of the scripted session in seconds.
    #[serde(default = "default_session_seconds")]
    pub session_seconds: f32,
    /// Seconds between logged snapshots.
    #[serde(default = "default_snapshot_interval")]
    pub snapshot_interval: f32,
    /// Mouse sensitivity (radians per count).
    #[serde(default = "default_sensitivity")]
    pub sensitivity: f32,
    #[serde(default)]
    pub locomotion: LocomotionConfig,
}

fn default_planet_radius() -> f32 {
    60.0
}
fn default_gravity() -> f32 {
    9.81
}
fn default_ocean_radius() -> f32 {
    12.0
}
fn default_boulder_count() -> usize {
    24
}
fn default_seed() -> u64 {
    7
}
fn default_fixed_rate() -> f64 {
    60.0
}
fn default_session_seconds() -> f32 {
    24.0
}
fn default_snapshot_interval() -> f32 {
    1.0
}
fn default_sensitivity() -> f32 {
    0.002
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            planet_radius: default_planet_radius(),
            gravity: default_gravity(),
            ocean_radius: default_ocean_radius(),
            boulder_count: default_boulder_count(),
            seed: default_seed(),
            fixed_rate: default_fixed_rate(),
            session_seconds: default_session_seconds(),
            snapshot_interval: default_snapshot_interval(),
            sensitivity: default_sensitivity(),
            locomotion: LocomotionConfig::default(),
        }
    }
}

impl GameConfig {
    /// Load config from `config.ron`. If the file is missing or invalid, returns default config.
    pub fn load() -> Self {
        let path = config_path();
        if let Ok(data) = std::fs::read_to_string(&path) {
            match ron::from_str(&data) {
                Ok(c) => return c,
                Err(e) => log::warn!("Invalid config at {:?}: {}, using defaults", path, e),
            }
        }
        Self::default()
    }

    /// Save current config to `config.ron`. Logs on error.
    pub fn save(&self) {
        let path = config_path();
        match ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default()) {
            Ok(s) => {
                if let Err(e) = std::fs::write(&path, s) {
                    log::warn!("Could not write config to {:?}: {}", path, e);
                }
            }
            Err(e) => log::warn!("Could not serialize config: {}", e),
        }
    }
}

fn config_path() -> std::path::PathBuf {
    std::env::current_dir().unwrap_or_else(|_| std::path::PathBuf::from(".")).join("config.ron")
}
