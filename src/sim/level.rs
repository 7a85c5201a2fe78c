//! Grid levels
//!
//! A level is a ragged grid of characters. Anything outside the grid, including
//! past the end of a short row, reads as wall so collision code can treat the
//! board edge like any interior wall.

use std::path::{Path, PathBuf};

use anyhow::Context;
use glam::{IVec2, Vec3};

use super::collision;
use crate::config::Config;
use crate::consts::{GOAL_DETECTION_RATIO, HOLE_DETECTION_RATIO};

pub const WALL: char = '#';
pub const FLOOR: char = '.';
pub const START: char = 'S';
pub const GOAL: char = 'G';
pub const HOLE: char = 'O';

/// Built-in levels, used when no level directory is supplied
const BUILTIN_LEVELS: [(&str, &str); 3] = [
    ("level1.txt", include_str!("../../assets/levels/level1.txt")),
    ("level2.txt", include_str!("../../assets/levels/level2.txt")),
    ("level3.txt", include_str!("../../assets/levels/level3.txt")),
];

/// Meaning of a grid character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Wall,
    Floor,
    Start,
    Goal,
    Hole,
    /// Any other printable character; walkable like floor
    Marker(char),
}

impl CellKind {
    pub fn from_char(c: char) -> Self {
        match c {
            WALL => CellKind::Wall,
            FLOOR => CellKind::Floor,
            START => CellKind::Start,
            GOAL => CellKind::Goal,
            HOLE => CellKind::Hole,
            other => CellKind::Marker(other),
        }
    }

    #[inline]
    pub fn is_wall(&self) -> bool {
        matches!(self, CellKind::Wall)
    }
}

/// An immutable grid level
#[derive(Debug, Clone)]
pub struct Level {
    rows: Vec<Vec<char>>,
    /// Widest row length in cells
    pub width: i32,
    /// Number of rows
    pub height: i32,
    pub cell_size: f32,
    /// Last `S` in scan order, origin if none
    pub start_pos: IVec2,
    /// Last `G` in scan order, origin if none
    pub goal_pos: IVec2,
    /// Every `O` in scan order
    pub hole_positions: Vec<IVec2>,
    hole_detection_ratio: f32,
    goal_detection_ratio: f32,
}

impl Level {
    /// Build a level from grid rows. Ragged rows and missing markers are accepted.
    pub fn new<S: AsRef<str>>(rows: &[S], cell_size: f32) -> Self {
        let rows: Vec<Vec<char>> = rows.iter().map(|r| r.as_ref().chars().collect()).collect();
        let height = rows.len() as i32;
        let mut width = 0;
        let mut start_pos = IVec2::ZERO;
        let mut goal_pos = IVec2::ZERO;
        let mut hole_positions = Vec::new();

        for (y, row) in rows.iter().enumerate() {
            width = width.max(row.len() as i32);
            for (x, &c) in row.iter().enumerate() {
                let pos = IVec2::new(x as i32, y as i32);
                match c {
                    START => start_pos = pos,
                    GOAL => goal_pos = pos,
                    HOLE => hole_positions.push(pos),
                    _ => {}
                }
            }
        }

        Self {
            rows,
            width,
            height,
            cell_size,
            start_pos,
            goal_pos,
            hole_positions,
            hole_detection_ratio: HOLE_DETECTION_RATIO,
            goal_detection_ratio: GOAL_DETECTION_RATIO,
        }
    }

    /// Override the hole/goal detection radii (fractions of the cell size)
    pub fn with_detection_ratios(mut self, hole: f32, goal: f32) -> Self {
        self.hole_detection_ratio = hole;
        self.goal_detection_ratio = goal;
        self
    }

    fn configured(self, config: &Config) -> Self {
        self.with_detection_ratios(config.hole_detection_ratio, config.goal_detection_ratio)
    }

    /// Parse level text: one grid row per non-empty line, trailing `\r` stripped.
    ///
    /// Returns `None` when the text holds no rows.
    pub fn parse(text: &str, cell_size: f32) -> Option<Self> {
        let rows: Vec<&str> = text
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .filter(|line| !line.is_empty())
            .collect();
        if rows.is_empty() {
            return None;
        }
        Some(Self::new(&rows, cell_size))
    }

    /// Load one level file
    pub fn load(path: impl AsRef<Path>, cell_size: f32) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to open level file {}", path.display()))?;
        Self::parse(&text, cell_size)
            .with_context(|| format!("level file is empty: {}", path.display()))
    }

    /// Character at a cell; wall for anything outside the grid
    pub fn get_cell(&self, x: i32, y: i32) -> char {
        if y < 0 || y >= self.height || x < 0 {
            return WALL;
        }
        self.rows
            .get(y as usize)
            .and_then(|row| row.get(x as usize))
            .copied()
            .unwrap_or(WALL)
    }

    #[inline]
    pub fn cell_kind(&self, x: i32, y: i32) -> CellKind {
        CellKind::from_char(self.get_cell(x, y))
    }

    /// Stored grid rows
    pub fn rows(&self) -> impl Iterator<Item = String> + '_ {
        self.rows.iter().map(|r| r.iter().collect())
    }

    #[inline]
    pub fn board_width(&self) -> f32 {
        self.width as f32 * self.cell_size
    }

    #[inline]
    pub fn board_depth(&self) -> f32 {
        self.height as f32 * self.cell_size
    }

    /// World-space center of a cell on the floor plane (board centered on origin)
    pub fn grid_to_world(&self, x: i32, y: i32) -> Vec3 {
        let world_x = (x as f32 + 0.5) * self.cell_size - self.board_width() / 2.0;
        let world_z = (y as f32 + 0.5) * self.cell_size - self.board_depth() / 2.0;
        Vec3::new(world_x, 0.0, world_z)
    }

    #[inline]
    pub fn cell_to_world(&self, cell: IVec2) -> Vec3 {
        self.grid_to_world(cell.x, cell.y)
    }

    /// Cell containing a world position (truncating toward zero)
    pub fn world_to_grid(&self, pos: Vec3) -> IVec2 {
        let local_x = pos.x + self.board_width() / 2.0;
        let local_z = pos.z + self.board_depth() / 2.0;
        IVec2::new(
            (local_x / self.cell_size) as i32,
            (local_z / self.cell_size) as i32,
        )
    }

    /// World radius inside which a hole swallows the ball
    #[inline]
    pub fn hole_detection_radius(&self) -> f32 {
        self.cell_size * self.hole_detection_ratio
    }

    /// World radius inside which the goal counts as reached
    #[inline]
    pub fn goal_detection_radius(&self) -> f32 {
        self.cell_size * self.goal_detection_ratio
    }

    pub fn is_over_hole(&self, pos: Vec3, radius: f32) -> bool {
        collision::is_over_hole(self, pos, radius)
    }

    pub fn is_at_goal(&self, pos: Vec3, radius: f32) -> bool {
        collision::is_at_goal(self, pos, radius)
    }

    pub fn resolve_wall_collision(&self, pos: Vec3, radius: f32) -> Vec3 {
        collision::resolve_wall_collision(self, pos, radius)
    }
}

/// Ordered levels plus the index of the one being played
#[derive(Debug, Clone, Default)]
pub struct LevelManager {
    levels: Vec<Level>,
    current_index: usize,
}

impl LevelManager {
    pub fn new(levels: Vec<Level>) -> Self {
        if levels.is_empty() {
            log::warn!("No levels loaded!");
        }
        Self {
            levels,
            current_index: 0,
        }
    }

    /// The levels shipped with the crate
    pub fn builtin(config: &Config) -> Self {
        let levels = BUILTIN_LEVELS
            .iter()
            .filter_map(|(name, text)| {
                let level = Level::parse(text, config.cell_size).map(|l| l.configured(config));
                if level.is_none() {
                    log::warn!("Built-in level {name} is empty");
                }
                level
            })
            .collect();
        Self::new(levels)
    }

    /// Load every `*.txt` file in a directory, in lexicographic order.
    ///
    /// Files that fail to load are skipped; an unreadable directory gives an
    /// empty manager.
    pub fn load_dir(dir: impl AsRef<Path>, config: &Config) -> Self {
        let dir = dir.as_ref();
        let files = match level_files(dir) {
            Ok(files) => files,
            Err(err) => {
                log::warn!("Failed to read levels directory {}: {err:#}", dir.display());
                return Self::new(Vec::new());
            }
        };

        let mut levels = Vec::with_capacity(files.len());
        for path in files {
            match Level::load(&path, config.cell_size) {
                Ok(level) => {
                    let level = level.configured(config);
                    log::info!(
                        "Loaded level: {} ({}x{}, {} holes)",
                        path.display(),
                        level.width,
                        level.height,
                        level.hole_positions.len()
                    );
                    levels.push(level);
                }
                Err(err) => log::warn!("Skipping level: {err:#}"),
            }
        }
        Self::new(levels)
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Level being played, `None` when nothing loaded
    pub fn current(&self) -> Option<&Level> {
        self.levels.get(self.current_index)
    }

    pub fn has_next_level(&self) -> bool {
        self.current_index + 1 < self.levels.len()
    }

    /// Advance to the next level; never wraps
    pub fn next_level(&mut self) -> bool {
        if self.has_next_level() {
            self.current_index += 1;
            true
        } else {
            false
        }
    }

    /// Jump to a level by index; out-of-range indices are ignored
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.levels.len() {
            self.current_index = index;
            true
        } else {
            false
        }
    }
}

/// Sorted `*.txt` regular files in `dir`
fn level_files(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "txt") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
