//! Procedural primitive solids
//!
//! Every generator is a pure function of its parameters and returns a
//! self-contained mesh with positions, normals, UVs and a tangent basis.
//! Front faces wind counter-clockwise seen from outside.

use glam::{Vec2, Vec3};
use std::f32::consts::PI;

use super::vertex::{Mesh, Vertex};

/// Latitude/longitude sphere centered on the origin.
///
/// Produces `(stacks + 1) * (sectors + 1)` vertices and `2 * sectors * (stacks - 1)`
/// triangles: the pole rows are fans with one triangle per sector.
pub fn sphere(radius: f32, sectors: u32, stacks: u32) -> Mesh {
    let sectors = sectors.max(3);
    let stacks = stacks.max(2);
    let sector_step = 2.0 * PI / sectors as f32;
    let stack_step = PI / stacks as f32;

    let mut vertices = Vec::with_capacity(((stacks + 1) * (sectors + 1)) as usize);
    for i in 0..=stacks {
        // From +pi/2 at the top to -pi/2 at the bottom
        let stack_angle = PI / 2.0 - i as f32 * stack_step;
        let ring = radius * stack_angle.cos();
        let y = radius * stack_angle.sin();

        for j in 0..=sectors {
            let sector_angle = j as f32 * sector_step;
            let position = Vec3::new(ring * sector_angle.cos(), y, ring * sector_angle.sin());
            let uv = Vec2::new(j as f32 / sectors as f32, i as f32 / stacks as f32);
            vertices.push(Vertex::new(position, position.normalize_or_zero(), uv));
        }
    }

    let mut indices = Vec::with_capacity((6 * sectors * (stacks - 1)) as usize);
    for i in 0..stacks {
        let mut k1 = i * (sectors + 1);
        let mut k2 = k1 + sectors + 1;
        for _ in 0..sectors {
            if i != 0 {
                indices.extend_from_slice(&[k1, k1 + 1, k2]);
            }
            if i != stacks - 1 {
                indices.extend_from_slice(&[k1 + 1, k2 + 1, k2]);
            }
            k1 += 1;
            k2 += 1;
        }
    }

    finish(vertices, indices)
}

/// Axis-aligned cube centered on the origin: 4 unshared vertices per face
pub fn cube(size: f32) -> Mesh {
    let s = size / 2.0;
    // (normal, corners in CCW order seen from outside)
    let faces: [(Vec3, [Vec3; 4]); 6] = [
        // Front
        (
            Vec3::Z,
            [
                Vec3::new(-s, -s, s),
                Vec3::new(s, -s, s),
                Vec3::new(s, s, s),
                Vec3::new(-s, s, s),
            ],
        ),
        // Back
        (
            Vec3::NEG_Z,
            [
                Vec3::new(s, -s, -s),
                Vec3::new(-s, -s, -s),
                Vec3::new(-s, s, -s),
                Vec3::new(s, s, -s),
            ],
        ),
        // Top
        (
            Vec3::Y,
            [
                Vec3::new(-s, s, s),
                Vec3::new(s, s, s),
                Vec3::new(s, s, -s),
                Vec3::new(-s, s, -s),
            ],
        ),
        // Bottom
        (
            Vec3::NEG_Y,
            [
                Vec3::new(-s, -s, -s),
                Vec3::new(s, -s, -s),
                Vec3::new(s, -s, s),
                Vec3::new(-s, -s, s),
            ],
        ),
        // Right
        (
            Vec3::X,
            [
                Vec3::new(s, -s, s),
                Vec3::new(s, -s, -s),
                Vec3::new(s, s, -s),
                Vec3::new(s, s, s),
            ],
        ),
        // Left
        (
            Vec3::NEG_X,
            [
                Vec3::new(-s, -s, -s),
                Vec3::new(-s, -s, s),
                Vec3::new(-s, s, s),
                Vec3::new(-s, s, -s),
            ],
        ),
    ];
    let corner_uvs = [Vec2::ZERO, Vec2::X, Vec2::ONE, Vec2::Y];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (normal, corners) in faces {
        let base = vertices.len() as u32;
        for (corner, uv) in corners.into_iter().zip(corner_uvs) {
            vertices.push(Vertex::new(corner, normal, uv));
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    finish(vertices, indices)
}

/// Cylinder along Y, centered on the origin
pub fn cylinder(radius: f32, height: f32, sectors: u32) -> Mesh {
    frustum(sectors, radius, radius, height)
}

/// Regular n-sided prism along Y
pub fn prism(sides: u32, radius: f32, height: f32) -> Mesh {
    frustum(sides, radius, radius, height)
}

/// Truncated cone along Y, centered on the origin.
///
/// Side rings carry sloped normals; each cap owns a duplicated center + ring so
/// its normals stay flat. `2 * (sides + 1) + 2 * (sides + 2)` vertices,
/// `4 * sides` triangles.
pub fn frustum(sides: u32, bottom_radius: f32, top_radius: f32, height: f32) -> Mesh {
    let sides = sides.max(3);
    let step = 2.0 * PI / sides as f32;
    let half_height = height / 2.0;
    let slope = if height.abs() > f32::EPSILON {
        (bottom_radius - top_radius) / height
    } else {
        0.0
    };

    let mut vertices = Vec::with_capacity((4 * sides + 6) as usize);
    let mut indices = Vec::with_capacity((12 * sides) as usize);

    // Side: bottom ring then top ring
    for (i, (y, r)) in [(-half_height, bottom_radius), (half_height, top_radius)]
        .into_iter()
        .enumerate()
    {
        for j in 0..=sides {
            let (sin, cos) = (j as f32 * step).sin_cos();
            vertices.push(Vertex::new(
                Vec3::new(r * cos, y, r * sin),
                Vec3::new(cos, slope, sin).normalize(),
                Vec2::new(j as f32 / sides as f32, i as f32),
            ));
        }
    }
    for j in 0..sides {
        let k1 = j;
        let k2 = j + sides + 1;
        indices.extend_from_slice(&[k1, k2, k1 + 1, k1 + 1, k2, k2 + 1]);
    }

    push_cap(&mut vertices, &mut indices, top_radius, half_height, sides, true);
    push_cap(&mut vertices, &mut indices, bottom_radius, -half_height, sides, false);

    finish(vertices, indices)
}

/// Cone along Y with its base on y = 0 and apex at `height`.
///
/// `2 * sectors + 4` vertices, `2 * sectors` triangles.
pub fn cone(radius: f32, height: f32, sectors: u32) -> Mesh {
    let sectors = sectors.max(3);
    let step = 2.0 * PI / sectors as f32;
    let slope_angle = radius.atan2(height);
    let (slope_sin, slope_cos) = slope_angle.sin_cos();

    let mut vertices = Vec::with_capacity((2 * sectors + 4) as usize);
    let mut indices = Vec::with_capacity((6 * sectors) as usize);

    vertices.push(Vertex::new(
        Vec3::new(0.0, height, 0.0),
        Vec3::Y,
        Vec2::new(0.5, 1.0),
    ));
    for j in 0..=sectors {
        let (sin, cos) = (j as f32 * step).sin_cos();
        vertices.push(Vertex::new(
            Vec3::new(radius * cos, 0.0, radius * sin),
            Vec3::new(cos * slope_cos, slope_sin, sin * slope_cos).normalize(),
            Vec2::new(j as f32 / sectors as f32, 0.0),
        ));
    }
    for j in 0..sectors {
        indices.extend_from_slice(&[0, j + 2, j + 1]);
    }

    push_cap(&mut vertices, &mut indices, radius, 0.0, sectors, false);

    finish(vertices, indices)
}

/// Flat XZ plane facing +Y
pub fn plane(width: f32, depth: f32) -> Mesh {
    let w = width / 2.0;
    let d = depth / 2.0;
    let vertices = vec![
        Vertex::new(Vec3::new(-w, 0.0, d), Vec3::Y, Vec2::ZERO),
        Vertex::new(Vec3::new(w, 0.0, d), Vec3::Y, Vec2::X),
        Vertex::new(Vec3::new(w, 0.0, -d), Vec3::Y, Vec2::ONE),
        Vertex::new(Vec3::new(-w, 0.0, -d), Vec3::Y, Vec2::Y),
    ];
    finish(vertices, vec![0, 1, 2, 0, 2, 3])
}

/// Open tube lining a hole, from just above the floor down to `-depth`.
///
/// Seen from inside the hole; normals point toward the axis.
pub fn hole_well(radius: f32, depth: f32, segments: u32) -> Mesh {
    let segments = segments.max(3);
    let step = 2.0 * PI / segments as f32;

    let mut vertices = Vec::with_capacity((2 * (segments + 1)) as usize);
    for i in 0..=segments {
        let (sin, cos) = (i as f32 * step).sin_cos();
        let inward = Vec3::new(-cos, 0.0, -sin);
        let u = i as f32 / segments as f32;
        vertices.push(Vertex::new(
            Vec3::new(radius * cos, 0.01, radius * sin),
            inward,
            Vec2::new(u, 0.0),
        ));
        vertices.push(Vertex::new(
            Vec3::new(radius * cos, -depth, radius * sin),
            inward,
            Vec2::new(u, 1.0),
        ));
    }

    let mut indices = Vec::with_capacity((6 * segments) as usize);
    for i in 0..segments {
        let (t0, t1, t2, t3) = (i * 2, i * 2 + 1, (i + 1) * 2, (i + 1) * 2 + 1);
        indices.extend_from_slice(&[t0, t1, t2, t2, t1, t3]);
    }

    finish(vertices, indices)
}

/// Flat disc cap: a center vertex plus a ring, facing +Y or -Y
fn push_cap(
    vertices: &mut Vec<Vertex>,
    indices: &mut Vec<u32>,
    radius: f32,
    y: f32,
    sides: u32,
    up: bool,
) {
    let step = 2.0 * PI / sides as f32;
    let normal = if up { Vec3::Y } else { Vec3::NEG_Y };
    let center = vertices.len() as u32;

    vertices.push(Vertex::new(Vec3::new(0.0, y, 0.0), normal, Vec2::splat(0.5)));
    for j in 0..=sides {
        let (sin, cos) = (j as f32 * step).sin_cos();
        vertices.push(Vertex::new(
            Vec3::new(radius * cos, y, radius * sin),
            normal,
            Vec2::new(cos * 0.5 + 0.5, sin * 0.5 + 0.5),
        ));
    }

    for j in 0..sides {
        let (a, b) = (center + j + 1, center + j + 2);
        if up {
            indices.extend_from_slice(&[center, b, a]);
        } else {
            indices.extend_from_slice(&[center, a, b]);
        }
    }
}

fn finish(vertices: Vec<Vertex>, indices: Vec<u32>) -> Mesh {
    let mut mesh = Mesh::new(vertices, indices);
    mesh.compute_flat_tangents();
    mesh
}
