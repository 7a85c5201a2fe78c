//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-supplied timestep only
//! - Stable iteration order (row-major grid scans)
//! - No GPU or platform dependencies

pub mod autopilot;
pub mod ball;
pub mod collision;
pub mod level;
pub mod state;
pub mod tick;

pub use autopilot::Autopilot;
pub use ball::{Ball, BallMode};
pub use collision::{CollisionResult, circle_square_collision, resolve_wall_collision};
pub use level::{CellKind, Level, LevelManager};
pub use state::{GamePhase, Session, SessionSnapshot};
pub use tick::{FixedStep, TickInput, TiltInput, tick, update_tilt};
