//! Ball kinematics
//!
//! The ball rolls on the XZ plane under board tilt, bounces off walls one axis
//! at a time, and once it drops into a hole plays a fixed-duration fall.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::level::Level;
use crate::config::Config;
use crate::consts::BOUNCE_EPSILON;

/// Ball mode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BallMode {
    /// On the board, driven by tilt
    Rolling,
    /// Dropping through a hole; `progress` runs from 0 to 1 and beyond
    Falling { progress: f32 },
}

/// The marble
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec3,
    /// Y is unused while rolling
    pub vel: Vec3,
    pub radius: f32,
    pub mode: BallMode,
}

impl Ball {
    pub fn new(radius: f32) -> Self {
        Self {
            pos: Vec3::ZERO,
            vel: Vec3::ZERO,
            radius,
            mode: BallMode::Rolling,
        }
    }

    /// Place the ball at rest on the level's start cell
    pub fn reset(&mut self, level: &Level) {
        self.pos = level.cell_to_world(level.start_pos);
        self.pos.y = self.radius;
        self.vel = Vec3::ZERO;
        self.mode = BallMode::Rolling;
    }

    #[inline]
    pub fn is_falling(&self) -> bool {
        matches!(self.mode, BallMode::Falling { .. })
    }

    /// Fall animation progress, zero while rolling
    #[inline]
    pub fn fall_progress(&self) -> f32 {
        match self.mode {
            BallMode::Rolling => 0.0,
            BallMode::Falling { progress } => progress,
        }
    }

    /// The fall animation has finished
    #[inline]
    pub fn has_fallen_in_hole(&self) -> bool {
        self.fall_progress() >= 1.0
    }

    /// Planar speed
    #[inline]
    pub fn speed(&self) -> f32 {
        Vec2::new(self.vel.x, self.vel.z).length()
    }

    /// Advance one frame. `tilt` is (roll about Z, pitch about X) in radians.
    pub fn update(&mut self, dt: f32, tilt: Vec2, level: &Level, config: &Config) {
        if let BallMode::Falling { progress } = self.mode {
            let progress = progress + dt * config.fall_rate;
            self.mode = BallMode::Falling { progress };
            self.pos.y = self.radius * (1.0 - progress * 2.0);
            return;
        }

        // Acceleration from tilt
        let ax = -config.gravity * tilt.x.sin();
        let az = config.gravity * tilt.y.sin();

        self.vel.x += ax * dt;
        self.vel.z += az * dt;
        self.vel *= config.friction;

        let speed = self.speed();
        if speed > config.max_speed {
            let scale = config.max_speed / speed;
            self.vel.x *= scale;
            self.vel.z *= scale;
        }

        self.pos.x += self.vel.x * dt;
        self.pos.z += self.vel.z * dt;

        let tentative = self.pos;
        self.pos = level.resolve_wall_collision(tentative, self.radius);

        // Each axis reflects independently; a corner hit can flip both
        if (self.pos.x - tentative.x).abs() > BOUNCE_EPSILON {
            self.vel.x = -self.vel.x * config.bounce;
        }
        if (self.pos.z - tentative.z).abs() > BOUNCE_EPSILON {
            self.vel.z = -self.vel.z * config.bounce;
        }

        if level.is_over_hole(self.pos, self.radius) {
            log::debug!("Ball entered hole at ({:.2}, {:.2})", self.pos.x, self.pos.z);
            self.mode = BallMode::Falling { progress: 0.0 };
            self.vel = Vec3::ZERO;
        }

        self.pos.y = self.radius;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn open_level() -> Level {
        Level::new(
            &[
                "###########",
                "#.........#",
                "#.........#",
                "#.........#",
                "#....S....#",
                "#.........#",
                "#.........#",
                "#.........#",
                "###########",
            ],
            1.0,
        )
    }

    fn ball_on(level: &Level) -> Ball {
        let mut ball = Ball::new(0.35);
        ball.reset(level);
        ball
    }

    #[test]
    fn test_reset_places_ball_on_start() {
        let level = open_level();
        let mut ball = ball_on(&level);
        ball.vel = Vec3::new(3.0, 0.0, -2.0);
        ball.mode = BallMode::Falling { progress: 0.7 };
        ball.reset(&level);
        let start = level.cell_to_world(level.start_pos);
        assert_eq!(ball.pos, Vec3::new(start.x, 0.35, start.z));
        assert_eq!(ball.vel, Vec3::ZERO);
        assert_eq!(ball.mode, BallMode::Rolling);
        assert_eq!(ball.fall_progress(), 0.0);
    }

    #[test]
    fn test_no_drift_without_tilt() {
        let level = open_level();
        let config = Config::default();
        let mut ball = ball_on(&level);
        let start = ball.pos;
        for _ in 0..1000 {
            ball.update(1.0 / 60.0, Vec2::ZERO, &level, &config);
        }
        assert_eq!(ball.pos, start);
        assert_eq!(ball.vel, Vec3::ZERO);
    }

    #[test]
    fn test_tilt_direction() {
        let level = open_level();
        let config = Config::default();
        let mut ball = ball_on(&level);
        ball.update(0.01, Vec2::new(0.1, 0.0), &level, &config);
        assert!(ball.vel.x < 0.0);
        assert_eq!(ball.vel.z, 0.0);

        let mut ball = ball_on(&level);
        ball.update(0.01, Vec2::new(0.0, 0.1), &level, &config);
        assert!(ball.vel.z > 0.0);
        assert_eq!(ball.vel.x, 0.0);
    }

    #[test]
    fn test_friction_decays_velocity() {
        let level = open_level();
        let config = Config::default();
        let mut ball = ball_on(&level);
        ball.vel = Vec3::new(1.0, 0.0, 0.0);
        ball.update(0.001, Vec2::ZERO, &level, &config);
        assert!((ball.vel.x - config.friction).abs() < 1e-6);
    }

    #[test]
    fn test_wall_bounce_reflects_and_damps() {
        let level = open_level();
        let config = Config::default();
        let mut ball = ball_on(&level);
        // Cell (9,4) sits against the right wall, whose face is at x = 4.5
        let cell = level.grid_to_world(9, 4);
        ball.pos = Vec3::new(cell.x + 0.1, ball.radius, cell.z);
        ball.vel = Vec3::new(10.0, 0.0, 0.0);
        ball.update(0.01, Vec2::ZERO, &level, &config);

        let wall_face = cell.x + 0.5;
        assert!(ball.pos.x <= wall_face - ball.radius + 1e-4);
        assert!(ball.vel.x < 0.0);
        assert!((ball.vel.x + 10.0 * config.friction * config.bounce).abs() < 1e-4);
    }

    #[test]
    fn test_corner_hit_reflects_both_axes() {
        let level = Level::new(&["###", "#S#", "###"], 1.0);
        let config = Config::default();
        let mut ball = ball_on(&level);
        let cell = level.grid_to_world(1, 1);
        ball.pos = Vec3::new(cell.x + 0.1, ball.radius, cell.z + 0.1);
        ball.vel = Vec3::new(10.0, 0.0, 10.0);
        ball.update(0.01, Vec2::ZERO, &level, &config);

        let expected = -10.0 * config.friction * config.bounce;
        assert!(ball.vel.x < 0.0);
        assert!(ball.vel.z < 0.0);
        assert!((ball.vel.x - expected).abs() < 1e-4);
        assert!((ball.vel.z - expected).abs() < 1e-4);
        assert!(ball.pos.x <= cell.x + 0.5 - ball.radius + 1e-4);
        assert!(ball.pos.z <= cell.z + 0.5 - ball.radius + 1e-4);
    }

    #[test]
    fn test_hole_entry_starts_fall() {
        let level = Level::new(&["#####", "#SO.#", "#####"], 1.0);
        let config = Config::default();
        let mut ball = ball_on(&level);
        ball.pos = level.cell_to_world(level.hole_positions[0]);
        ball.pos.y = ball.radius;
        ball.update(0.0, Vec2::ZERO, &level, &config);
        assert!(ball.is_falling());
        assert_eq!(ball.vel, Vec3::ZERO);
        assert_eq!(ball.fall_progress(), 0.0);
        assert!(!ball.has_fallen_in_hole());
    }

    #[test]
    fn test_fall_completes_after_a_third_of_a_second() {
        let level = open_level();
        let config = Config::default();
        for steps in [10u32, 60, 600] {
            let mut ball = ball_on(&level);
            ball.mode = BallMode::Falling { progress: 0.0 };
            let dt = (1.0 / 3.0) / steps as f32;
            for _ in 0..steps - 1 {
                ball.update(dt, Vec2::ZERO, &level, &config);
            }
            assert!(!ball.has_fallen_in_hole());
            // Allow for accumulated rounding on the last step
            ball.update(dt * 1.1, Vec2::ZERO, &level, &config);
            assert!(ball.has_fallen_in_hole());
        }
    }

    #[test]
    fn test_fall_descends_through_floor() {
        let level = open_level();
        let config = Config::default();
        let mut ball = ball_on(&level);
        ball.mode = BallMode::Falling { progress: 0.0 };
        ball.update(0.25, Vec2::ZERO, &level, &config);
        assert!((ball.pos.y - ball.radius * (1.0 - 1.5)).abs() < 1e-6);
        assert!(ball.pos.y < 0.0);
        // Tilt has no effect while falling
        let x = ball.pos.x;
        ball.update(0.01, Vec2::new(0.2, 0.2), &level, &config);
        assert_eq!(ball.pos.x, x);
    }

    proptest! {
        #[test]
        fn prop_speed_never_exceeds_max(
            tilt_x in -0.5f32..0.5,
            tilt_y in -0.5f32..0.5,
            vx in -200.0f32..200.0,
            vz in -200.0f32..200.0,
            steps in 1usize..200,
        ) {
            let level = open_level();
            let config = Config::default();
            let mut ball = ball_on(&level);
            ball.vel = Vec3::new(vx, 0.0, vz);
            for _ in 0..steps {
                ball.update(1.0 / 120.0, Vec2::new(tilt_x, tilt_y), &level, &config);
                prop_assert!(ball.speed() <= config.max_speed * (1.0 + 1e-5));
                if ball.is_falling() {
                    break;
                }
            }
        }

        #[test]
        fn prop_rolling_ball_stays_on_plane(
            tilt_x in -0.2f32..0.2,
            tilt_y in -0.2f32..0.2,
            steps in 1usize..300,
        ) {
            let level = open_level();
            let config = Config::default();
            let mut ball = ball_on(&level);
            for _ in 0..steps {
                ball.update(1.0 / 60.0, Vec2::new(tilt_x, tilt_y), &level, &config);
                prop_assert_eq!(ball.pos.y, ball.radius);
            }
        }
    }
}
