//! Session state
//!
//! Everything the outer loop needs to drive one playthrough lives in
//! [`Session`], passed by reference into [`tick`](super::tick::tick).

use anyhow::bail;
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::ball::{Ball, BallMode};
use super::level::{Level, LevelManager};
use crate::config::Config;
use crate::mesh::{BoardMeshes, generate_board};

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Ball rolling under player tilt
    Playing,
    /// Ball reached the goal
    Won,
    /// Ball dropped through a hole
    Failed,
}

/// One playthrough of a level set
#[derive(Debug, Clone)]
pub struct Session {
    pub config: Config,
    levels: LevelManager,
    /// Copy of the level being played
    level: Level,
    pub ball: Ball,
    /// Board tilt in radians: x rolls about Z, y pitches about X
    pub tilt: Vec2,
    pub phase: GamePhase,
    /// Static geometry for the current level, rebuilt on level change
    pub board: BoardMeshes,
    /// Seconds spent Playing since the last restart
    pub elapsed: f32,
}

impl Session {
    /// Start on the manager's current level
    pub fn new(levels: LevelManager, config: Config) -> anyhow::Result<Self> {
        let Some(level) = levels.current().cloned() else {
            bail!("no levels to play");
        };
        let board = generate_board(&level, &config);
        let mut session = Self {
            ball: Ball::new(config.ball_radius),
            config,
            levels,
            level,
            tilt: Vec2::ZERO,
            phase: GamePhase::Playing,
            board,
            elapsed: 0.0,
        };
        session.restart();
        Ok(session)
    }

    pub fn current_level(&self) -> &Level {
        &self.level
    }

    pub fn levels(&self) -> &LevelManager {
        &self.levels
    }

    pub fn level_index(&self) -> usize {
        self.levels.current_index()
    }

    /// Put the ball back on the start cell and level the board
    pub fn restart(&mut self) {
        self.ball.reset(&self.level);
        self.tilt = Vec2::ZERO;
        self.phase = GamePhase::Playing;
        self.elapsed = 0.0;
    }

    /// Move on after a win. Does nothing unless Won with a level remaining.
    pub fn advance_level(&mut self) -> bool {
        if self.phase != GamePhase::Won || !self.levels.next_level() {
            return false;
        }
        self.load_current();
        log::info!(
            "Advanced to level {}/{}",
            self.levels.current_index() + 1,
            self.levels.len()
        );
        true
    }

    /// Jump straight to a level, restarting play there
    pub fn select_level(&mut self, index: usize) -> bool {
        if !self.levels.select(index) {
            return false;
        }
        self.load_current();
        true
    }

    /// Run ball physics for one frame under the current tilt
    pub(crate) fn step_ball(&mut self, dt: f32) {
        self.ball.update(dt, self.tilt, &self.level, &self.config);
    }

    pub fn ball_at_goal(&self) -> bool {
        self.level.is_at_goal(self.ball.pos, self.ball.radius)
    }

    fn load_current(&mut self) {
        if let Some(level) = self.levels.current() {
            self.level = level.clone();
            self.board = generate_board(&self.level, &self.config);
        }
        self.restart();
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            level_index: self.levels.current_index(),
            level_count: self.levels.len(),
            phase: self.phase,
            ball_pos: self.ball.pos,
            ball_vel: self.ball.vel,
            ball_mode: self.ball.mode,
            tilt: self.tilt,
            elapsed: self.elapsed,
        }
    }
}

/// Serializable summary of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub level_index: usize,
    pub level_count: usize,
    pub phase: GamePhase,
    pub ball_pos: Vec3,
    pub ball_vel: Vec3,
    pub ball_mode: BallMode,
    pub tilt: Vec2,
    pub elapsed: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_levels() -> LevelManager {
        LevelManager::new(vec![
            Level::new(&["#####", "#S.G#", "#####"], 1.0),
            Level::new(&["######", "#S.OG#", "######"], 1.0),
        ])
    }

    #[test]
    fn test_new_session_starts_playing_on_start_cell() {
        let session = Session::new(two_levels(), Config::default()).unwrap();
        assert_eq!(session.phase, GamePhase::Playing);
        assert_eq!(session.level_index(), 0);
        let start = session.current_level().cell_to_world(session.current_level().start_pos);
        assert_eq!(session.ball.pos, Vec3::new(start.x, session.config.ball_radius, start.z));
        assert_eq!(session.board.walls.vertices.len(), 12 * 24);
    }

    #[test]
    fn test_empty_level_set_is_an_error() {
        assert!(Session::new(LevelManager::new(Vec::new()), Config::default()).is_err());
    }

    #[test]
    fn test_restart_resets_everything() {
        let mut session = Session::new(two_levels(), Config::default()).unwrap();
        session.ball.pos.x += 0.4;
        session.ball.vel = Vec3::new(1.0, 0.0, 2.0);
        session.tilt = Vec2::new(0.1, -0.1);
        session.phase = GamePhase::Failed;
        session.elapsed = 3.0;
        session.restart();
        assert_eq!(session.phase, GamePhase::Playing);
        assert_eq!(session.tilt, Vec2::ZERO);
        assert_eq!(session.ball.vel, Vec3::ZERO);
        assert_eq!(session.elapsed, 0.0);
    }

    #[test]
    fn test_advance_requires_win() {
        let mut session = Session::new(two_levels(), Config::default()).unwrap();
        assert!(!session.advance_level());
        assert_eq!(session.level_index(), 0);

        session.phase = GamePhase::Won;
        assert!(session.advance_level());
        assert_eq!(session.level_index(), 1);
        assert_eq!(session.phase, GamePhase::Playing);
        assert_eq!(session.current_level().hole_positions.len(), 1);
        // Board rebuilt for the wider level
        assert_eq!(session.board.walls.vertices.len(), 14 * 24);

        // No level after the last one
        session.phase = GamePhase::Won;
        assert!(!session.advance_level());
        assert_eq!(session.phase, GamePhase::Won);
    }

    #[test]
    fn test_select_level() {
        let mut session = Session::new(two_levels(), Config::default()).unwrap();
        assert!(session.select_level(1));
        assert_eq!(session.level_index(), 1);
        assert!(!session.select_level(5));
        assert_eq!(session.level_index(), 1);
    }

    #[test]
    fn test_snapshot_serializes() {
        let session = Session::new(two_levels(), Config::default()).unwrap();
        let snapshot = session.snapshot();
        assert_eq!(snapshot.level_count, 2);
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"phase\":\"Playing\""));
        let back: SessionSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }
}
