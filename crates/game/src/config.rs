//! Game configuration (window, input, physics, projectiles, flicker, rendering, assets).
//! Loaded from config.ron at startup.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Persistent game settings. Loaded from `config.ron` in the current directory.
/// Every section and field falls back to its default when missing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub window: WindowConfig,
    pub input: InputConfig,
    pub player: PlayerConfig,
    pub physics: PhysicsConfig,
    pub projectile: ProjectileConfig,
    pub flicker: FlickerConfig,
    pub render: RenderConfig,
    pub assets: AssetConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    /// Window width in logical pixels.
    pub width: u32,
    /// Window height in logical pixels.
    pub height: u32,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Liminal".to_string(),
            width: 1200,
            height: 900,
            vsync: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Radians of look rotation per pixel of mouse motion.
    pub mouse_sensitivity: f32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            mouse_sensitivity: 0.002,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub spawn: Vec3,
    pub half_extents: Vec3,
    pub mass: f32,
    pub friction: f32,
    /// Camera height above the body centre.
    pub eye_height: f32,
    /// Horizontal speed in units per second.
    pub move_speed: f32,
    /// Vertical velocity added by a jump.
    pub jump_speed: f32,
    /// Initial look direction in degrees. Zero yaw looks down -z, positive yaw turns left.
    pub start_yaw_degrees: f32,
    pub start_pitch_degrees: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            spawn: Vec3::new(11.0, 0.2, 11.0),
            half_extents: Vec3::new(0.2, 0.9, 0.2),
            mass: 1.0,
            friction: 0.9,
            eye_height: 0.3,
            move_speed: 4.0,
            jump_speed: 3.0,
            start_yaw_degrees: -98.8,
            start_pitch_degrees: -0.15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub gravity: f32,
    /// Largest step handed to the simulation in one frame.
    pub max_step: f32,
    pub solver_iterations: usize,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: -9.81,
            max_step: 1.0 / 60.0,
            solver_iterations: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    /// Minimum seconds between two shots.
    pub cooldown: f32,
    pub speed: f32,
    pub radius: f32,
    pub mass: f32,
    pub friction: f32,
    pub restitution: f32,
    /// Spawn distance in front of the eye.
    pub spawn_offset: f32,
    /// Distance at which a projectile counts as touching the environment.
    pub contact_margin: f32,
    /// Decals are lifted this far off the surface.
    pub decal_offset: f32,
    /// Decal quad edge length.
    pub decal_size: f32,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            cooldown: 0.1,
            speed: 20.0,
            radius: 0.13,
            mass: 1.0,
            friction: 0.9,
            restitution: 0.0,
            spawn_offset: 0.5,
            contact_margin: 0.04,
            decal_offset: 0.06,
            decal_size: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlickerConfig {
    /// Mean of the normal distribution driving the flicker.
    pub mean: f32,
    pub std_dev: f32,
    /// Draws above this start an episode.
    pub trigger_threshold: f32,
    /// Episode duration per unit of draw above the trigger threshold.
    pub duration_scale: f32,
    /// Second draw above this makes the episode severe.
    pub severe_threshold: f32,
    /// Noise is resampled once per sub-step of this many seconds.
    pub substep: f32,
    /// Seconds between focal light reselections in a severe episode.
    pub pulse_interval: f32,
    /// Seconds between warm-up batches.
    pub warmup_interval: f32,
    /// Fixed seed for reproducible flicker. Random when unset.
    pub seed: Option<u64>,
}

impl Default for FlickerConfig {
    fn default() -> Self {
        Self {
            mean: 0.0,
            std_dev: 0.1,
            trigger_threshold: 0.2,
            duration_scale: 7.0,
            severe_threshold: 0.1,
            substep: 0.01,
            pulse_interval: 0.3,
            warmup_interval: 1.5,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub exposure: f32,
    pub bloom: bool,
    pub blur_iterations: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            exposure: 1.0,
            bloom: true,
            blur_iterations: renderer::BLUR_ITERATIONS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// glTF file with the environment geometry. A procedural room is used when missing.
    pub environment: Option<PathBuf>,
    pub crosshair: Option<PathBuf>,
    pub pause: Option<PathBuf>,
    pub decal: Option<PathBuf>,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            environment: Some(PathBuf::from("assets/backrooms.glb")),
            crosshair: Some(PathBuf::from("assets/crosshair.png")),
            pause: Some(PathBuf::from("assets/pause.png")),
            decal: Some(PathBuf::from("assets/splat.png")),
        }
    }
}

impl GameConfig {
    /// Load config from `config.ron`. If the file is missing or invalid, returns default config.
    pub fn load() -> Self {
        let path = config_path();
        match std::fs::read_to_string(&path) {
            Ok(data) => Self::parse(&data).unwrap_or_else(|e| {
                log::warn!("Invalid config at {:?}: {}, using defaults", path, e);
                Self::default()
            }),
            Err(_) => {
                log::info!("No config at {:?}, using defaults", path);
                Self::default()
            }
        }
    }

    pub fn parse(data: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(data)
    }
}

fn config_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("config.ron")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_is_default() {
        assert_eq!(GameConfig::parse("()").expect("parse"), GameConfig::default());
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config = GameConfig::parse("(projectile: (cooldown: 0.25), flicker: (seed: Some(7)))")
            .expect("parse");
        assert_eq!(config.projectile.cooldown, 0.25);
        assert_eq!(config.projectile.speed, 20.0);
        assert_eq!(config.flicker.seed, Some(7));
        assert_eq!(config.window, WindowConfig::default());
    }

    #[test]
    fn invalid_config_is_an_error() {
        assert!(GameConfig::parse("(window: (width: \"wide\"))").is_err());
    }

    #[test]
    fn defaults_place_player_in_room() {
        let config = GameConfig::default();
        assert_eq!(config.player.spawn, Vec3::new(11.0, 0.2, 11.0));
        assert_eq!(config.physics.max_step, 1.0 / 60.0);
        assert_eq!(config.render.blur_iterations, 10);
    }
}
