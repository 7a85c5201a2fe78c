//! Per-frame simulation step
//!
//! Applies session commands, integrates board tilt from held directions,
//! advances the ball and resolves win/loss.

use glam::Vec2;

use super::state::{GamePhase, Session};
use crate::clamp_frame_dt;
use crate::config::Config;
use crate::consts::{MAX_SUBSTEPS, SIM_DT};

/// Held tilt directions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TiltInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

/// Input for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub tilt: TiltInput,
    /// Reset the ball on the current level (any phase)
    pub restart: bool,
    /// Advance after a win
    pub next_level: bool,
}

/// Integrate board tilt for one frame.
///
/// Held keys push their axis at tilt speed, clamped to the max tilt. An axis
/// with neither of its keys held eases back to level without crossing zero.
pub fn update_tilt(tilt: Vec2, input: &TiltInput, dt: f32, config: &Config) -> Vec2 {
    let max_tilt = config.max_tilt();
    let delta = config.tilt_speed() * dt;
    let return_delta = config.tilt_return_speed() * dt;

    let mut tilt = tilt;
    if input.up {
        tilt.y += delta;
    }
    if input.down {
        tilt.y -= delta;
    }
    if input.left {
        tilt.x -= delta;
    }
    if input.right {
        tilt.x += delta;
    }
    tilt = tilt.clamp(Vec2::splat(-max_tilt), Vec2::splat(max_tilt));

    if !input.left && !input.right {
        tilt.x = ease_to_zero(tilt.x, return_delta);
    }
    if !input.up && !input.down {
        tilt.y = ease_to_zero(tilt.y, return_delta);
    }
    tilt
}

fn ease_to_zero(value: f32, step: f32) -> f32 {
    if value > 0.0 {
        (value - step).max(0.0)
    } else {
        (value + step).min(0.0)
    }
}

/// Advance the session by one frame of `dt` seconds
pub fn tick(session: &mut Session, input: &TickInput, dt: f32) {
    let dt = clamp_frame_dt(dt);

    if input.restart {
        session.restart();
    }
    if input.next_level {
        session.advance_level();
    }

    if session.phase != GamePhase::Playing {
        return;
    }

    session.tilt = update_tilt(session.tilt, &input.tilt, dt, &session.config);
    session.step_ball(dt);
    session.elapsed += dt;

    if session.ball.has_fallen_in_hole() {
        session.phase = GamePhase::Failed;
        log::info!(
            "Ball lost on level {} after {:.2}s",
            session.level_index() + 1,
            session.elapsed
        );
    } else if session.ball_at_goal() {
        session.phase = GamePhase::Won;
        log::info!(
            "Level {} cleared in {:.2}s",
            session.level_index() + 1,
            session.elapsed
        );
    }
}

/// Fixed-timestep driver for variable frame times
#[derive(Debug, Clone, Default)]
pub struct FixedStep {
    accumulator: f32,
}

impl FixedStep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run as many `SIM_DT` ticks as the frame allows, at most `MAX_SUBSTEPS`.
    ///
    /// Commands in `input` apply to the first substep only. Returns the number
    /// of ticks run.
    pub fn advance(&mut self, session: &mut Session, input: &TickInput, frame_dt: f32) -> u32 {
        self.accumulator += clamp_frame_dt(frame_dt);

        let mut input = input.clone();
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            tick(session, &input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;

            input.restart = false;
            input.next_level = false;
        }
        substeps
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::{Level, LevelManager};
    use proptest::prelude::*;

    fn corridor() -> LevelManager {
        LevelManager::new(vec![
            Level::new(&["#######", "#S...G#", "#######"], 1.0),
            Level::new(&["#######", "#S.O.G#", "#######"], 1.0),
        ])
    }

    fn session() -> Session {
        Session::new(corridor(), Config::default()).unwrap()
    }

    fn held(up: bool, down: bool, left: bool, right: bool) -> TiltInput {
        TiltInput {
            up,
            down,
            left,
            right,
        }
    }

    /// Tilt that rolls the ball toward +x
    fn toward_goal() -> TickInput {
        TickInput {
            tilt: held(false, false, true, false),
            ..Default::default()
        }
    }

    fn command(restart: bool, next_level: bool) -> TickInput {
        TickInput {
            restart,
            next_level,
            ..Default::default()
        }
    }

    #[test]
    fn test_tilt_keys_move_axes() {
        let config = Config::default();
        let dt = 0.1;
        let step = config.tilt_speed() * dt;

        let tilt = update_tilt(Vec2::ZERO, &held(true, false, false, false), dt, &config);
        assert!((tilt.y - step).abs() < 1e-6);
        assert_eq!(tilt.x, 0.0);

        let tilt = update_tilt(Vec2::ZERO, &held(false, false, true, false), dt, &config);
        assert!((tilt.x + step).abs() < 1e-6);
        assert_eq!(tilt.y, 0.0);
    }

    #[test]
    fn test_tilt_clamped_to_max() {
        let config = Config::default();
        let input = held(false, true, false, true);
        let mut tilt = Vec2::ZERO;
        for _ in 0..100 {
            tilt = update_tilt(tilt, &input, 0.1, &config);
        }
        assert!((tilt.x - config.max_tilt()).abs() < 1e-6);
        assert!((tilt.y + config.max_tilt()).abs() < 1e-6);
    }

    #[test]
    fn test_tilt_returns_without_overshoot() {
        let config = Config::default();
        let tilt = update_tilt(Vec2::new(0.01, -0.01), &TiltInput::default(), 0.1, &config);
        assert_eq!(tilt, Vec2::ZERO);

        let start = Vec2::new(0.1, -0.1);
        let tilt = update_tilt(start, &TiltInput::default(), 0.01, &config);
        let step = config.tilt_return_speed() * 0.01;
        assert!((tilt.x - (0.1 - step)).abs() < 1e-6);
        assert!((tilt.y - (-0.1 + step)).abs() < 1e-6);
    }

    #[test]
    fn test_opposite_keys_hold_axis() {
        let config = Config::default();
        let input = held(true, true, false, false);
        let tilt = update_tilt(Vec2::new(0.0, 0.05), &input, 0.1, &config);
        assert!((tilt.y - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_reaching_goal_wins() {
        let mut session = session();
        for _ in 0..2000 {
            tick(&mut session, &toward_goal(), SIM_DT);
            if session.phase != GamePhase::Playing {
                break;
            }
        }
        assert_eq!(session.phase, GamePhase::Won);
        assert!(session.elapsed > 0.0);
    }

    #[test]
    fn test_hole_fails_level() {
        let mut session = session();
        session.phase = GamePhase::Won;
        tick(&mut session, &command(false, true), SIM_DT);
        assert_eq!(session.level_index(), 1);

        for _ in 0..2000 {
            tick(&mut session, &toward_goal(), SIM_DT);
            if session.phase != GamePhase::Playing {
                break;
            }
        }
        assert_eq!(session.phase, GamePhase::Failed);
        assert!(session.ball.has_fallen_in_hole());
    }

    #[test]
    fn test_finished_phase_freezes_physics() {
        let mut session = session();
        session.phase = GamePhase::Failed;
        session.ball.vel.x = 5.0;
        let pos = session.ball.pos;
        tick(&mut session, &toward_goal(), SIM_DT);
        assert_eq!(session.ball.pos, pos);
        assert_eq!(session.tilt, Vec2::ZERO);
    }

    #[test]
    fn test_restart_command_from_failed() {
        let mut session = session();
        session.phase = GamePhase::Failed;
        session.ball.pos.x += 1.0;
        tick(&mut session, &command(true, false), SIM_DT);
        assert_eq!(session.phase, GamePhase::Playing);
        let start = session.current_level().cell_to_world(session.current_level().start_pos);
        assert_eq!(session.ball.pos.x, start.x);
    }

    #[test]
    fn test_next_level_ignored_while_playing() {
        let mut session = session();
        tick(&mut session, &command(false, true), SIM_DT);
        assert_eq!(session.level_index(), 0);
    }

    #[test]
    fn test_stall_is_clamped() {
        let mut session = session();
        tick(&mut session, &toward_goal(), 5.0);
        assert!((session.elapsed - crate::consts::MAX_FRAME_DT).abs() < 1e-6);
        tick(&mut session, &toward_goal(), f32::NAN);
        assert!(session.ball.pos.is_finite());
    }

    #[test]
    fn test_fixed_step_substeps() {
        let mut session = session();
        let mut stepper = FixedStep::new();
        assert_eq!(stepper.advance(&mut session, &TickInput::default(), SIM_DT * 0.5), 0);
        assert_eq!(stepper.advance(&mut session, &TickInput::default(), SIM_DT * 0.6), 1);
        // A stall is capped at MAX_SUBSTEPS
        assert_eq!(stepper.advance(&mut session, &TickInput::default(), 1.0), MAX_SUBSTEPS);
        stepper.reset();
        assert_eq!(stepper.advance(&mut session, &TickInput::default(), 0.0), 0);
    }

    proptest! {
        #[test]
        fn prop_tilt_stays_within_limits(
            keys in proptest::collection::vec(any::<(bool, bool, bool, bool)>(), 1..100),
            dt in 0.0f32..0.1,
        ) {
            let config = Config::default();
            let mut tilt = Vec2::ZERO;
            for (up, down, left, right) in keys {
                tilt = update_tilt(tilt, &held(up, down, left, right), dt, &config);
                prop_assert!(tilt.x.abs() <= config.max_tilt() + 1e-6);
                prop_assert!(tilt.y.abs() <= config.max_tilt() + 1e-6);
            }
        }
    }
}
