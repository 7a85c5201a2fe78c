//! Collision detection and response against the level grid
//!
//! The ball is a circle on the XZ plane; wall cells are axis-aligned squares.
//! Holes and the goal are proximity tests against the center of the cell the
//! ball currently occupies.

use glam::{Vec2, Vec3};

use super::level::{GOAL, HOLE, Level};
use crate::consts::COLLISION_EPSILON;
use crate::planar_distance;

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Separating direction (pointing from the obstacle toward the ball center)
    pub normal: Vec2,
    /// Penetration depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Check a circle against an axis-aligned square
///
/// The closest point on the square is found by per-axis clamping. A center
/// lying exactly on (or inside) the square has no usable separating direction
/// and reports a miss.
pub fn circle_square_collision(
    center: Vec2,
    radius: f32,
    square_center: Vec2,
    half_extent: f32,
) -> CollisionResult {
    let min = square_center - Vec2::splat(half_extent);
    let max = square_center + Vec2::splat(half_extent);
    let closest = center.clamp(min, max);
    let offset = center - closest;
    let dist = offset.length();

    if dist < radius && dist > COLLISION_EPSILON {
        return CollisionResult {
            hit: true,
            normal: offset / dist,
            penetration: radius - dist,
        };
    }

    CollisionResult::miss()
}

/// Push a circle out of every wall cell in its 3x3 neighborhood
///
/// Walls are resolved one after another in row-major neighbor order, each
/// against the already-corrected position. Deep corner overlaps can keep a
/// small residual penetration. Height is passed through untouched.
pub fn resolve_wall_collision(level: &Level, pos: Vec3, radius: f32) -> Vec3 {
    let mut result = pos;
    let cell = level.world_to_grid(pos);
    let half_size = level.cell_size / 2.0;

    for dy in -1..=1 {
        for dx in -1..=1 {
            let nx = cell.x + dx;
            let ny = cell.y + dy;
            if !level.cell_kind(nx, ny).is_wall() {
                continue;
            }

            let wall_center = level.grid_to_world(nx, ny);
            let contact = circle_square_collision(
                Vec2::new(result.x, result.z),
                radius,
                Vec2::new(wall_center.x, wall_center.z),
                half_size,
            );
            if contact.hit {
                result.x += contact.normal.x * contact.penetration;
                result.z += contact.normal.y * contact.penetration;
            }
        }
    }

    result
}

/// Ball center is over a hole cell and close enough to its center to drop
pub fn is_over_hole(level: &Level, pos: Vec3, _radius: f32) -> bool {
    within_cell_marker(level, pos, HOLE, level.hole_detection_radius())
}

/// Ball center is over the goal cell and close enough to its center
pub fn is_at_goal(level: &Level, pos: Vec3, _radius: f32) -> bool {
    within_cell_marker(level, pos, GOAL, level.goal_detection_radius())
}

fn within_cell_marker(level: &Level, pos: Vec3, marker: char, detection_radius: f32) -> bool {
    let cell = level.world_to_grid(pos);
    if level.get_cell(cell.x, cell.y) != marker {
        return false;
    }
    planar_distance(pos, level.cell_to_world(cell)) < detection_radius
}
