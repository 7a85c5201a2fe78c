//! Marble Maze - tilt a grid board and roll the ball into the goal
//!
//! Core modules:
//! - `sim`: Deterministic simulation (levels, ball physics, collisions, session)
//! - `mesh`: Procedural geometry (primitives, board bundle, OBJ import/export)
//! - `config`: Data-driven game feel

pub mod config;
pub mod mesh;
pub mod sim;

pub use config::Config;

use glam::{Vec2, Vec3};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep used by the headless runner
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest frame delta accepted after a stall (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Ball collision radius (world units)
    pub const BALL_RADIUS: f32 = 0.35;
    /// Radius of the rendered ball sphere
    pub const BALL_MESH_RADIUS: f32 = 0.25;
    /// Acceleration at full tilt scale (units/s²)
    pub const BALL_GRAVITY: f32 = 60.0;
    /// Per-tick velocity retention (1.0 = no friction)
    pub const BALL_FRICTION: f32 = 0.985;
    /// Maximum planar speed
    pub const BALL_MAX_SPEED: f32 = 50.0;
    /// Velocity retained on a wall bounce
    pub const BALL_BOUNCE: f32 = 0.3;
    /// Fall progress gained per second once over a hole
    pub const FALL_RATE: f32 = 3.0;

    /// Board tilt limits (degrees)
    pub const MAX_TILT_DEGREES: f32 = 10.0;
    pub const TILT_SPEED_DEGREES: f32 = 45.0;
    pub const TILT_RETURN_SPEED_DEGREES: f32 = 30.0;

    /// Level grid
    pub const CELL_SIZE: f32 = 1.0;
    pub const WALL_HEIGHT_RATIO: f32 = 0.6;
    pub const FLOOR_THICKNESS_RATIO: f32 = 0.15;
    pub const HOLE_DETECTION_RATIO: f32 = 0.3;
    pub const GOAL_DETECTION_RATIO: f32 = 0.4;

    /// Board frame
    pub const FRAME_HEIGHT_MULTIPLIER: f32 = 1.2;
    pub const FRAME_THICKNESS_RATIO: f32 = 0.3;

    /// Marker discs drawn over holes, start and goal
    pub const HOLE_MARKER_RATIO: f32 = 0.3;
    pub const START_GOAL_MARKER_RATIO: f32 = 0.35;
    pub const MARKER_HEIGHT: f32 = 0.02;
    pub const MARKER_SEGMENTS: u32 = 16;
    /// Markers sit just above the floor surface
    pub const MARKER_LIFT: f32 = 0.02;

    /// Numerical guards
    pub const COLLISION_EPSILON: f32 = 0.0001;
    pub const BOUNCE_EPSILON: f32 = 0.001;
}

/// Clamp an externally measured frame delta to a safe simulation step.
///
/// Non-finite or negative input yields zero.
#[inline]
pub fn clamp_frame_dt(dt: f32) -> f32 {
    if !dt.is_finite() {
        return 0.0;
    }
    dt.clamp(0.0, consts::MAX_FRAME_DT)
}

/// Planar (XZ) part of a world position
#[inline]
pub fn planar(pos: Vec3) -> Vec2 {
    Vec2::new(pos.x, pos.z)
}

/// Distance between two points ignoring height
#[inline]
pub fn planar_distance(a: Vec3, b: Vec3) -> f32 {
    planar(a).distance(planar(b))
}
