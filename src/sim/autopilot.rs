//! Steering autopilot for unattended runs
//!
//! Plans a shortest route to the goal over floor cells that are not holes,
//! then presses tilt keys to chase the next cell center at a modest speed.

use std::collections::VecDeque;

use glam::{IVec2, Vec2, Vec3};

use super::ball::Ball;
use super::level::{CellKind, Level};
use super::tick::TiltInput;
use crate::planar;

/// Speed per unit of distance to the waypoint
const STEER_GAIN: f32 = 3.0;
/// Planar speed the autopilot never asks for more than
const CRUISE_SPEED: f32 = 2.5;
/// Velocity error ignored to avoid chattering keys
const DEADZONE: f32 = 0.05;

const NEIGHBORS: [IVec2; 4] = [IVec2::X, IVec2::NEG_X, IVec2::Y, IVec2::NEG_Y];

#[derive(Debug, Clone)]
pub struct Autopilot {
    width: i32,
    height: i32,
    /// Steps to the goal per cell, row-major; `None` when unreachable
    distances: Vec<Option<u32>>,
}

impl Autopilot {
    /// Breadth-first distances from the goal
    pub fn new(level: &Level) -> Self {
        let mut pilot = Self {
            width: level.width,
            height: level.height,
            distances: vec![None; (level.width * level.height).max(0) as usize],
        };

        let goal = level.goal_pos;
        if !is_open(level, goal) {
            log::warn!("Goal cell {goal} is not open floor; autopilot has no route");
            return pilot;
        }

        let mut queue = VecDeque::from([goal]);
        pilot.set_distance(goal, 0);
        while let Some(cell) = queue.pop_front() {
            let Some(dist) = pilot.distance(cell) else {
                continue;
            };
            for step in NEIGHBORS {
                let next = cell + step;
                if pilot.index(next).is_some()
                    && pilot.distance(next).is_none()
                    && is_open(level, next)
                {
                    pilot.set_distance(next, dist + 1);
                    queue.push_back(next);
                }
            }
        }
        pilot
    }

    fn index(&self, cell: IVec2) -> Option<usize> {
        let in_bounds = cell.x >= 0 && cell.y >= 0 && cell.x < self.width && cell.y < self.height;
        in_bounds.then(|| (cell.y * self.width + cell.x) as usize)
    }

    fn set_distance(&mut self, cell: IVec2, dist: u32) {
        if let Some(i) = self.index(cell) {
            self.distances[i] = Some(dist);
        }
    }

    /// Route length from `cell` to the goal in cell steps
    pub fn distance(&self, cell: IVec2) -> Option<u32> {
        self.index(cell).and_then(|i| self.distances[i])
    }

    /// World point to head for from `pos`.
    ///
    /// The center of the next cell along the route, or the current cell's own
    /// center on the goal or off the route.
    pub fn waypoint(&self, level: &Level, pos: Vec3) -> Vec3 {
        let cell = level.world_to_grid(pos);
        let next = match self.distance(cell) {
            Some(dist) if dist > 0 => NEIGHBORS
                .iter()
                .map(|&step| cell + step)
                .find(|&n| self.distance(n) == Some(dist - 1))
                .unwrap_or(cell),
            _ => cell,
        };
        level.cell_to_world(next)
    }

    /// Keys to hold this frame
    pub fn steer(&self, level: &Level, ball: &Ball) -> TiltInput {
        let to_target = planar(self.waypoint(level, ball.pos) - ball.pos);
        let desired = (to_target * STEER_GAIN).clamp_length_max(CRUISE_SPEED);
        let error = desired - Vec2::new(ball.vel.x, ball.vel.z);

        // Negative X tilt rolls toward +x, positive Y tilt toward +z
        TiltInput {
            up: error.y > DEADZONE,
            down: error.y < -DEADZONE,
            left: error.x > DEADZONE,
            right: error.x < -DEADZONE,
        }
    }
}

fn is_open(level: &Level, cell: IVec2) -> bool {
    !matches!(level.cell_kind(cell.x, cell.y), CellKind::Wall | CellKind::Hole)
}
