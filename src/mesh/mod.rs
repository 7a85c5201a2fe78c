//! CPU-side geometry
//!
//! Meshes are plain vertex/index buffers ready for upload; nothing here
//! touches a GPU device.

pub mod board;
pub mod obj;
pub mod primitives;
pub mod vertex;

pub use board::{
    BoardMeshes, BoardPart, MarkerKind, MarkerPlacement, colors, frame_mesh, generate_board,
    marker_placements,
};
pub use obj::{ObjGroup, export_obj, load_obj, parse_obj, write_mtl, write_obj};
pub use vertex::{Mesh, Vertex, triangle_basis};
