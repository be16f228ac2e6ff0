//! Configuration loading (spec §6, expanded in SPEC_FULL.md §E).
//!
//! Mirrors the original's `config.ini` section layout
//! (`config/property_configurator.py`) one-for-one as TOML tables, loaded
//! via `serde` + `toml` in the style of `SeanShubin-seans-arcade`'s
//! configuration crates.

use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

#[derive(Debug, Clone, Deserialize)]
pub struct GameMasterServiceConfig {
    pub host: String,
    pub port: u16,
    pub max_workers: usize,
    pub thread_prefix: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlayerConfig {
    pub left_player_name: String,
    pub right_player_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GameArenaConfig {
    pub arena_width: u32,
    pub arena_height: u32,
    pub wall_thickness: u32,
    pub paddle_offset: u32,
    pub paddle_width: u32,
    pub paddle_height: u32,
    pub white_ball_radius: u32,
    pub starting_ball_speed: f64,
    pub max_ball_starting_angle_degrees: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GameEngineConfig {
    pub max_speed: f64,
    pub min_speed: f64,
    pub max_ball_speed: f64,
    pub min_ball_speed: f64,
    pub max_paddle_speed: f64,
    pub min_paddle_speed: f64,
    pub default_paddle_speed: f64,
    /// Additive key, not present in the original's `config.ini`. Absent
    /// from an on-disk file defaults to `"accurate"` (DESIGN.md Open
    /// Question 1).
    #[serde(default = "default_collision_mode")]
    pub collision_mode: String,
}

fn default_collision_mode() -> String {
    "accurate".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct BallPaddleCollisionConfig {
    pub max_angle_degrees: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchPlayConfig {
    pub points_in_match: u32,
    pub hits_for_draw: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerClientCommunicationConfig {
    pub block_client_paddle_response: bool,
    pub action_queue_timeout: f64,
}

/// Consumed only by an external renderer observer; the headless server
/// still requires the section to be present (spec.md §6).
#[derive(Debug, Clone, Deserialize)]
pub struct GameRendererConfig {
    #[serde(default)]
    pub fps_cap: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub game_master_service: GameMasterServiceConfig,
    pub player: PlayerConfig,
    pub game_arena: GameArenaConfig,
    pub game_engine: GameEngineConfig,
    pub ball_paddle_collision: BallPaddleCollisionConfig,
    pub match_play: MatchPlayConfig,
    pub server_client_communication: ServerClientCommunicationConfig,
    pub game_renderer: GameRendererConfig,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: Config = toml::from_str(&text)?;
        Ok(config)
    }

    /// Clamped against the engine-wide bound, exactly as the original's
    /// `GameEngineConfig.max_ball_speed` does (`min(configured, max_speed)`).
    /// Computed rather than stored so the invariant cannot drift if the
    /// underlying fields are ever mutated.
    pub fn max_ball_speed(&self) -> f64 {
        self.game_engine.max_ball_speed.min(self.game_engine.max_speed)
    }

    pub fn min_ball_speed(&self) -> f64 {
        self.game_engine.min_ball_speed.max(self.game_engine.min_speed)
    }

    pub fn max_paddle_speed(&self) -> f64 {
        self.game_engine.max_paddle_speed.min(self.game_engine.max_speed)
    }

    pub fn min_paddle_speed(&self) -> f64 {
        self.game_engine.min_paddle_speed.max(self.game_engine.min_speed)
    }

    pub fn max_angle_radians(&self) -> f64 {
        self.ball_paddle_collision.max_angle_degrees.to_radians()
    }

    pub fn max_ball_starting_angle_radians(&self) -> f64 {
        self.game_arena.max_ball_starting_angle_degrees.to_radians()
    }

    pub fn collision_mode(&self) -> crate::collision::CollisionMode {
        match self.game_engine.collision_mode.as_str() {
            "fast" => crate::collision::CollisionMode::Fast,
            _ => crate::collision::CollisionMode::Accurate,
        }
    }
}
