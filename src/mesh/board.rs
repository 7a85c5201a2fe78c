//! Board geometry generated from a level grid
//!
//! Wall cells become raised blocks and every other cell a thin floor tile.
//! Holes, start and goal stay solid floor; they get flat marker discs that the
//! renderer places at the level's recorded cells.

use glam::Vec3;

use super::primitives;
use super::vertex::Mesh;
use crate::config::Config;
use crate::consts::MARKER_LIFT;
use crate::sim::Level;

/// Albedo colors for board parts
pub mod colors {
    pub const FLOOR: [f32; 3] = [0.6, 0.45, 0.28];
    pub const WALL: [f32; 3] = [0.55, 0.4, 0.25];
    pub const FRAME: [f32; 3] = [0.5, 0.38, 0.22];
    pub const HOLE: [f32; 3] = [0.05, 0.05, 0.05];
    pub const START: [f32; 3] = [0.2, 0.8, 0.3];
    pub const GOAL: [f32; 3] = [1.0, 0.84, 0.0];
    pub const BALL: [f32; 3] = [0.75, 0.75, 0.8];
}

/// All static meshes for one level
#[derive(Debug, Clone, Default)]
pub struct BoardMeshes {
    pub floor: Mesh,
    pub walls: Mesh,
    pub frame: Mesh,
    /// Drawn once per hole position
    pub hole_marker: Mesh,
    pub start_marker: Mesh,
    pub goal_marker: Mesh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Hole,
    Start,
    Goal,
}

impl MarkerKind {
    pub fn albedo(&self) -> [f32; 3] {
        match self {
            MarkerKind::Hole => colors::HOLE,
            MarkerKind::Start => colors::START,
            MarkerKind::Goal => colors::GOAL,
        }
    }
}

/// A separately colored piece of the exported board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardPart {
    Floor,
    Walls,
    Frame,
    Marker(MarkerKind),
}

impl BoardPart {
    pub fn name(&self) -> &'static str {
        match self {
            BoardPart::Floor => "floor",
            BoardPart::Walls => "walls",
            BoardPart::Frame => "frame",
            BoardPart::Marker(MarkerKind::Hole) => "hole_markers",
            BoardPart::Marker(MarkerKind::Start) => "start_marker",
            BoardPart::Marker(MarkerKind::Goal) => "goal_marker",
        }
    }

    pub fn albedo(&self) -> [f32; 3] {
        match self {
            BoardPart::Floor => colors::FLOOR,
            BoardPart::Walls => colors::WALL,
            BoardPart::Frame => colors::FRAME,
            BoardPart::Marker(kind) => kind.albedo(),
        }
    }
}

/// Where one marker mesh instance goes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerPlacement {
    pub kind: MarkerKind,
    pub position: Vec3,
}

/// Build the full bundle for a level
pub fn generate_board(level: &Level, config: &Config) -> BoardMeshes {
    let cell_size = level.cell_size;
    let wall_height = cell_size * config.wall_height_ratio;
    let floor_thickness = cell_size * config.floor_thickness_ratio;

    let block = primitives::cube(cell_size);
    let wall_scale = Vec3::new(1.0, wall_height / cell_size, 1.0);
    let floor_scale = Vec3::new(1.0, floor_thickness / cell_size, 1.0);

    let mut floor = Mesh::default();
    let mut walls = Mesh::default();
    for y in 0..level.height {
        for x in 0..level.width {
            let center = level.grid_to_world(x, y);
            if level.cell_kind(x, y).is_wall() {
                let offset = Vec3::new(center.x, wall_height / 2.0, center.z);
                walls.append(&block.transformed(wall_scale, offset));
            } else {
                let offset = Vec3::new(center.x, -floor_thickness / 2.0, center.z);
                floor.append(&block.transformed(floor_scale, offset));
            }
        }
    }

    let frame = frame_mesh(
        level.board_width(),
        level.board_depth(),
        wall_height * config.frame_height_multiplier,
        cell_size * config.frame_thickness_ratio,
    );

    let segments = config.marker_segments;
    let hole_marker = primitives::cylinder(
        cell_size * config.hole_marker_ratio,
        config.marker_height,
        segments,
    );
    let start_goal = primitives::cylinder(
        cell_size * config.start_goal_marker_ratio,
        config.marker_height,
        segments,
    );

    log::debug!(
        "Generated board {}x{}: {} floor tris, {} wall tris",
        level.width,
        level.height,
        floor.triangle_count(),
        walls.triangle_count()
    );

    BoardMeshes {
        floor,
        walls,
        frame,
        hole_marker,
        start_marker: start_goal.clone(),
        goal_marker: start_goal,
    }
}

/// Four slabs enclosing a `width` x `depth` footprint centered on the origin.
///
/// Front and back slabs span the corners; left and right fit between them.
pub fn frame_mesh(width: f32, depth: f32, height: f32, thickness: f32) -> Mesh {
    let template = primitives::cube(1.0);
    let half_w = width / 2.0;
    let half_d = depth / 2.0;
    let half_h = height / 2.0;

    // (center, scale)
    let slabs = [
        (
            Vec3::new(0.0, half_h, -half_d - thickness / 2.0),
            Vec3::new(width + thickness * 2.0, height, thickness),
        ),
        (
            Vec3::new(0.0, half_h, half_d + thickness / 2.0),
            Vec3::new(width + thickness * 2.0, height, thickness),
        ),
        (
            Vec3::new(-half_w - thickness / 2.0, half_h, 0.0),
            Vec3::new(thickness, height, depth),
        ),
        (
            Vec3::new(half_w + thickness / 2.0, half_h, 0.0),
            Vec3::new(thickness, height, depth),
        ),
    ];

    let mut mesh = Mesh::default();
    for (center, scale) in slabs {
        mesh.append(&template.transformed(scale, center));
    }
    mesh
}

/// Marker instances for a level: every hole, then start, then goal
pub fn marker_placements(level: &Level) -> Vec<MarkerPlacement> {
    let lifted = |cell| {
        let mut pos = level.cell_to_world(cell);
        pos.y = MARKER_LIFT;
        pos
    };

    level
        .hole_positions
        .iter()
        .map(|&cell| MarkerPlacement {
            kind: MarkerKind::Hole,
            position: lifted(cell),
        })
        .chain([
            MarkerPlacement {
                kind: MarkerKind::Start,
                position: lifted(level.start_pos),
            },
            MarkerPlacement {
                kind: MarkerKind::Goal,
                position: lifted(level.goal_pos),
            },
        ])
        .collect()
}

impl BoardMeshes {
    pub fn marker(&self, kind: MarkerKind) -> &Mesh {
        match kind {
            MarkerKind::Hole => &self.hole_marker,
            MarkerKind::Start => &self.start_marker,
            MarkerKind::Goal => &self.goal_marker,
        }
    }

    /// Static board split by part, with every placed marker merged into its
    /// kind's mesh. Marker kinds with no placement are left out.
    pub fn parts(&self, placements: &[MarkerPlacement]) -> Vec<(BoardPart, Mesh)> {
        let mut parts = vec![
            (BoardPart::Floor, self.floor.clone()),
            (BoardPart::Walls, self.walls.clone()),
            (BoardPart::Frame, self.frame.clone()),
        ];
        for kind in [MarkerKind::Hole, MarkerKind::Start, MarkerKind::Goal] {
            let mut mesh = Mesh::default();
            for placement in placements.iter().filter(|p| p.kind == kind) {
                mesh.append(&self.marker(kind).translated(placement.position));
            }
            if !mesh.vertices.is_empty() {
                parts.push((BoardPart::Marker(kind), mesh));
            }
        }
        parts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::primitives::tests::assert_front_faces_match_normals;

    fn sample() -> Level {
        Level::new(&["#####", "#SOG#", "#####"], 1.0)
    }

    #[test]
    fn test_cell_split_between_floor_and_walls() {
        let board = generate_board(&sample(), &Config::default());
        // 12 wall cells, 3 walkable cells (holes stay solid floor)
        assert_eq!(board.walls.vertices.len(), 12 * 24);
        assert_eq!(board.walls.triangle_count(), 12 * 12);
        assert_eq!(board.floor.vertices.len(), 3 * 24);
        assert!(board.walls.is_valid());
        assert!(board.floor.is_valid());
    }

    #[test]
    fn test_block_heights() {
        let config = Config::default();
        let board = generate_board(&sample(), &config);
        let (wall_min, wall_max) = board.walls.bounds().unwrap();
        assert!((wall_min.y - 0.0).abs() < 1e-6);
        assert!((wall_max.y - config.wall_height()).abs() < 1e-6);
        let (floor_min, floor_max) = board.floor.bounds().unwrap();
        assert!((floor_max.y - 0.0).abs() < 1e-6);
        assert!((floor_min.y + config.floor_thickness()).abs() < 1e-6);
        // Board straddles the origin
        assert!((wall_min.x + 2.5).abs() < 1e-6);
        assert!((wall_max.z - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_ragged_rows_fill_with_walls() {
        let level = Level::new(&["###", "#S", "###"], 1.0);
        let board = generate_board(&level, &Config::default());
        assert_eq!(board.floor.vertices.len(), 24);
        assert_eq!(board.walls.vertices.len(), 8 * 24);
    }

    #[test]
    fn test_frame_encloses_board() {
        let config = Config::default();
        let level = sample();
        let board = generate_board(&level, &config);
        let thickness = config.frame_thickness_ratio;
        let (min, max) = board.frame.bounds().unwrap();
        assert_eq!(board.frame.vertices.len(), 4 * 24);
        assert!((min.x + 2.5 + thickness).abs() < 1e-5);
        assert!((max.x - 2.5 - thickness).abs() < 1e-5);
        assert!((min.z + 1.5 + thickness).abs() < 1e-5);
        assert!((max.z - 1.5 - thickness).abs() < 1e-5);
        assert!((max.y - config.wall_height() * config.frame_height_multiplier).abs() < 1e-5);
        assert_front_faces_match_normals(&board.frame);
    }

    #[test]
    fn test_marker_radii() {
        let config = Config::default();
        let board = generate_board(&sample(), &config);
        let (hole_min, hole_max) = board.hole_marker.bounds().unwrap();
        assert!((hole_max.x - 0.3).abs() < 1e-5);
        assert!((hole_max.y - hole_min.y - config.marker_height).abs() < 1e-6);
        let (_, start_max) = board.start_marker.bounds().unwrap();
        assert!((start_max.x - 0.35).abs() < 1e-5);
        assert_eq!(board.start_marker, board.goal_marker);
    }

    #[test]
    fn test_marker_placements() {
        let level = sample();
        let placements = marker_placements(&level);
        assert_eq!(placements.len(), 3);
        assert_eq!(placements[0].kind, MarkerKind::Hole);
        assert_eq!(placements[0].position, Vec3::new(0.0, MARKER_LIFT, 0.0));
        assert_eq!(placements[1].kind, MarkerKind::Start);
        assert_eq!(placements[1].position, Vec3::new(-1.0, MARKER_LIFT, 0.0));
        assert_eq!(placements[2].kind, MarkerKind::Goal);
        assert_eq!(placements[2].position.x, 1.0);
    }

    #[test]
    fn test_parts_contain_everything() {
        let level = sample();
        let board = generate_board(&level, &Config::default());
        let parts = board.parts(&marker_placements(&level));
        let kinds: Vec<BoardPart> = parts.iter().map(|(part, _)| *part).collect();
        assert_eq!(
            kinds,
            vec![
                BoardPart::Floor,
                BoardPart::Walls,
                BoardPart::Frame,
                BoardPart::Marker(MarkerKind::Hole),
                BoardPart::Marker(MarkerKind::Start),
                BoardPart::Marker(MarkerKind::Goal),
            ]
        );
        let expected = board.floor.vertices.len()
            + board.walls.vertices.len()
            + board.frame.vertices.len()
            + board.hole_marker.vertices.len()
            + board.start_marker.vertices.len()
            + board.goal_marker.vertices.len();
        let total: usize = parts.iter().map(|(_, mesh)| mesh.vertices.len()).sum();
        assert_eq!(total, expected);
        assert!(parts.iter().all(|(_, mesh)| mesh.is_valid()));
    }

    #[test]
    fn test_holes_merge_into_one_part() {
        let level = Level::new(&["######", "#SOOG#", "######"], 1.0);
        let board = generate_board(&level, &Config::default());
        let parts = board.parts(&marker_placements(&level));
        let (_, holes) = parts
            .iter()
            .find(|(part, _)| *part == BoardPart::Marker(MarkerKind::Hole))
            .unwrap();
        assert_eq!(holes.vertices.len(), 2 * board.hole_marker.vertices.len());

        let no_holes = generate_board(&sample(), &Config::default()).parts(&[]);
        assert_eq!(no_holes.len(), 3);
    }

    #[test]
    fn test_part_names_and_colors() {
        assert_eq!(BoardPart::Walls.name(), "walls");
        assert_eq!(BoardPart::Floor.albedo(), colors::FLOOR);
        assert_eq!(BoardPart::Frame.albedo(), colors::FRAME);
        assert_eq!(BoardPart::Marker(MarkerKind::Goal).albedo(), colors::GOAL);
        assert_eq!(BoardPart::Marker(MarkerKind::Hole).name(), "hole_markers");
    }

    #[test]
    fn test_generation_is_deterministic() {
        let config = Config::default();
        let a = generate_board(&sample(), &config);
        let b = generate_board(&sample(), &config);
        assert_eq!(a.floor, b.floor);
        assert_eq!(a.walls, b.walls);
        assert_eq!(a.frame, b.frame);
    }
}
