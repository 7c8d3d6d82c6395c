//! Simulation configuration.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure to load a [`SimConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("malformed simulation config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("viewport must have a positive size, got {width}x{height}")]
    InvalidViewport { width: f32, height: f32 },
    #[error("arena must have a positive size, got {width}x{height}")]
    InvalidArena { width: f32, height: f32 },
}

/// Tunables of a simulation session.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Seed of the world's random source.
    pub seed: u64,
    /// Size of the world-space rectangle shown around the player.
    pub viewport_width: f32,
    pub viewport_height: f32,
    /// Field used by world generation and by roaming spirit riders.
    pub arena_width: f32,
    pub arena_height: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 0x6f72_6465,
            viewport_width: 400.0,
            viewport_height: 225.0,
            arena_width: 1000.0,
            arena_height: 1000.0,
        }
    }
}

impl SimConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.viewport_width > 0.0 && self.viewport_height > 0.0) {
            return Err(ConfigError::InvalidViewport {
                width: self.viewport_width,
                height: self.viewport_height,
            });
        }
        if !(self.arena_width > 0.0 && self.arena_height > 0.0) {
            return Err(ConfigError::InvalidArena {
                width: self.arena_width,
                height: self.arena_height,
            });
        }
        Ok(())
    }
}
