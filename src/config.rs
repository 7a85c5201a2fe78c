//! Game feel tunables
//!
//! Loaded from JSON when present; every missing field falls back to `consts`.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Tunable parameters read by the simulation and the board generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // === Ball ===
    /// Collision radius of the ball
    pub ball_radius: f32,
    /// Radius of the rendered sphere (visual only)
    pub ball_mesh_radius: f32,
    pub gravity: f32,
    /// Per-tick velocity retention (0.0 = instant stop, 1.0 = no friction)
    pub friction: f32,
    pub max_speed: f32,
    /// Velocity retained on wall impact (0.0 = dead stop, 1.0 = elastic)
    pub bounce: f32,
    /// Fall progress per second
    pub fall_rate: f32,

    // === Tilt ===
    pub max_tilt_degrees: f32,
    pub tilt_speed_degrees: f32,
    pub tilt_return_speed_degrees: f32,

    // === Grid ===
    pub cell_size: f32,
    pub wall_height_ratio: f32,
    pub floor_thickness_ratio: f32,
    pub hole_detection_ratio: f32,
    pub goal_detection_ratio: f32,

    // === Board dressing ===
    pub frame_height_multiplier: f32,
    pub frame_thickness_ratio: f32,
    pub hole_marker_ratio: f32,
    pub start_goal_marker_ratio: f32,
    pub marker_height: f32,
    pub marker_segments: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ball_radius: BALL_RADIUS,
            ball_mesh_radius: BALL_MESH_RADIUS,
            gravity: BALL_GRAVITY,
            friction: BALL_FRICTION,
            max_speed: BALL_MAX_SPEED,
            bounce: BALL_BOUNCE,
            fall_rate: FALL_RATE,

            max_tilt_degrees: MAX_TILT_DEGREES,
            tilt_speed_degrees: TILT_SPEED_DEGREES,
            tilt_return_speed_degrees: TILT_RETURN_SPEED_DEGREES,

            cell_size: CELL_SIZE,
            wall_height_ratio: WALL_HEIGHT_RATIO,
            floor_thickness_ratio: FLOOR_THICKNESS_RATIO,
            hole_detection_ratio: HOLE_DETECTION_RATIO,
            goal_detection_ratio: GOAL_DETECTION_RATIO,

            frame_height_multiplier: FRAME_HEIGHT_MULTIPLIER,
            frame_thickness_ratio: FRAME_THICKNESS_RATIO,
            hole_marker_ratio: HOLE_MARKER_RATIO,
            start_goal_marker_ratio: START_GOAL_MARKER_RATIO,
            marker_height: MARKER_HEIGHT,
            marker_segments: MARKER_SEGMENTS,
        }
    }
}

impl Config {
    /// Parse a (possibly partial) JSON document
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let config: Config = serde_json::from_str(json).context("invalid config JSON")?;
        config.validate().map_err(anyhow::Error::msg)?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config =
            Self::from_json(&json).with_context(|| format!("in config {}", path.display()))?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Write the config as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write config {}", path.display()))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), String> {
        let positive = [
            ("ball_radius", self.ball_radius),
            ("ball_mesh_radius", self.ball_mesh_radius),
            ("max_speed", self.max_speed),
            ("fall_rate", self.fall_rate),
            ("cell_size", self.cell_size),
            ("wall_height_ratio", self.wall_height_ratio),
            ("floor_thickness_ratio", self.floor_thickness_ratio),
            ("frame_height_multiplier", self.frame_height_multiplier),
            ("frame_thickness_ratio", self.frame_thickness_ratio),
            ("hole_marker_ratio", self.hole_marker_ratio),
            ("start_goal_marker_ratio", self.start_goal_marker_ratio),
            ("marker_height", self.marker_height),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(format!("{name} must be finite and > 0"));
            }
        }

        let non_negative = [
            ("gravity", self.gravity),
            ("max_tilt_degrees", self.max_tilt_degrees),
            ("tilt_speed_degrees", self.tilt_speed_degrees),
            ("tilt_return_speed_degrees", self.tilt_return_speed_degrees),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{name} must be finite and >= 0"));
            }
        }

        if !(0.0..=1.0).contains(&self.friction) {
            return Err("friction must be within [0, 1]".to_string());
        }
        if !(0.0..=1.0).contains(&self.bounce) {
            return Err("bounce must be within [0, 1]".to_string());
        }
        if self.max_tilt_degrees >= 90.0 {
            return Err("max_tilt_degrees must be < 90".to_string());
        }
        for (name, ratio) in [
            ("hole_detection_ratio", self.hole_detection_ratio),
            ("goal_detection_ratio", self.goal_detection_ratio),
        ] {
            if !ratio.is_finite() || ratio <= 0.0 || ratio > 0.5 {
                return Err(format!("{name} must be within (0, 0.5]"));
            }
        }
        if self.marker_segments < 3 {
            return Err("marker_segments must be >= 3".to_string());
        }
        Ok(())
    }

    #[inline]
    pub fn max_tilt(&self) -> f32 {
        self.max_tilt_degrees.to_radians()
    }

    #[inline]
    pub fn tilt_speed(&self) -> f32 {
        self.tilt_speed_degrees.to_radians()
    }

    #[inline]
    pub fn tilt_return_speed(&self) -> f32 {
        self.tilt_return_speed_degrees.to_radians()
    }

    /// World height of a wall block
    #[inline]
    pub fn wall_height(&self) -> f32 {
        self.cell_size * self.wall_height_ratio
    }

    /// World thickness of a floor tile
    #[inline]
    pub fn floor_thickness(&self) -> f32 {
        self.cell_size * self.floor_thickness_ratio
    }
}
