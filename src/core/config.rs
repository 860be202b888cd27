//! Simulation configuration with documented constants
//!
//! All behavior tunables are collected here with explanations of their
//! purpose. Everything is settable at runtime through the ecosystem's
//! setters; this struct is the startup snapshot, loadable from TOML.

use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::core::types::Bounds;

/// Which elevation source is authoritative when both are wired.
///
/// The grid-backed terrain field provides interpolated elevation plus
/// water/lava classification; a direct height function provides elevation
/// only. Classification always comes from the field when one is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ElevationBackend {
    /// Cached bilinear grid sampler (terrain field)
    #[default]
    Field,
    /// Direct per-call height function, elevation only
    Direct,
}

/// Configuration for the ecosystem simulation
///
/// Default values match the tuning of the sandbox exhibit.
/// Changing them affects pacing and feel, not correctness.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Playable area; replaced after sandbox calibration
    pub bounds: Bounds,

    // === TERRAIN HAZARDS ===
    /// Elevation below which terrain is classified as lava
    ///
    /// Agents treat lava as a maximal-priority threat. Raising this above
    /// the terrain level floods the whole box with lava.
    pub lava_threshold: f32,

    /// Water depth above which a cell is classified as underwater
    pub water_depth_threshold: f32,

    /// Water depth agents start steering away from
    ///
    /// Shallower water is walkable; deeper water repels wander targets,
    /// spawn positions, and the steering probe.
    pub water_avoidance_depth: f32,

    /// Which elevation source wins when both a grid source and a direct
    /// height function are available
    pub elevation_backend: ElevationBackend,

    /// Terrain refresh throttle: one real refresh every N calls (min 1)
    ///
    /// Refreshing means reading the full grids back from the external
    /// source, which is expensive. Between refreshes queries serve stale
    /// cached data; that staleness window is accepted.
    pub refresh_interval: u32,

    // === BEHAVIOR ===
    /// Distance within which a detected hand makes herbivores flee
    pub hand_flee_radius: f32,

    /// Seconds a fleeing herbivore keeps running after the last threat
    /// disappears, preventing state flapping
    pub flee_persistence: f32,

    /// Seconds between an agent fading out fully and respawning
    pub respawn_delay: f32,

    // === PRESENTATION ===
    /// Animation playback rate in frames per second
    pub animation_speed: f32,

    /// Global movement speed multiplier (scales with sprite scale)
    pub speed_scale: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            bounds: Bounds::default(),
            lava_threshold: -10.0,
            water_depth_threshold: 0.5,
            water_avoidance_depth: 0.5,
            elevation_backend: ElevationBackend::Field,
            refresh_interval: 5,
            hand_flee_radius: 0.15,
            flee_persistence: 2.0,
            respawn_delay: 8.0,
            animation_speed: 12.0,
            speed_scale: 1.0,
        }
    }
}

impl SimulationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration snapshot from a TOML file
    pub fn load(path: &std::path::Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.bounds.min_x >= self.bounds.max_x || self.bounds.min_y >= self.bounds.max_y {
            return Err(format!(
                "bounds rectangle is degenerate: x[{} to {}] y[{} to {}]",
                self.bounds.min_x, self.bounds.max_x, self.bounds.min_y, self.bounds.max_y
            ));
        }
        if self.bounds.min_z >= self.bounds.max_z {
            return Err(format!(
                "bounds elevation range is degenerate: z[{} to {}]",
                self.bounds.min_z, self.bounds.max_z
            ));
        }
        if self.water_depth_threshold < 0.0 || self.water_avoidance_depth < 0.0 {
            return Err("water depth thresholds must be non-negative".into());
        }
        if self.flee_persistence <= 0.0 {
            return Err("flee_persistence must be positive".into());
        }
        if self.respawn_delay < 0.0 {
            return Err("respawn_delay must be non-negative".into());
        }
        if self.animation_speed <= 0.0 {
            return Err(format!(
                "animation_speed must be positive, got {}",
                self.animation_speed
            ));
        }
        if self.speed_scale <= 0.0 {
            return Err(format!("speed_scale must be positive, got {}", self.speed_scale));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_degenerate_bounds_rejected() {
        let mut config = SimulationConfig::default();
        config.bounds.min_x = config.bounds.max_x;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_animation_speed_rejected() {
        let mut config = SimulationConfig::default();
        config.animation_speed = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = SimulationConfig::default();
        let text = toml::to_string(&config).unwrap();
        let back: SimulationConfig = toml::from_str(&text).unwrap();
        assert_eq!(back.lava_threshold, config.lava_threshold);
        assert_eq!(back.elevation_backend, ElevationBackend::Field);
    }
}
