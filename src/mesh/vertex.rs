//! Vertex and mesh types for 3D geometry

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

/// Added to the UV determinant so degenerate UV triangles stay finite
const UV_DETERMINANT_BIAS: f32 = 0.0001;

/// Lit, normal-mapped vertex
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
    pub tangent: [f32; 3],
    pub bitangent: [f32; 3],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x2,
        3 => Float32x3,
        4 => Float32x3
    ];

    /// Vertex with the tangent basis left zeroed
    pub fn new(position: Vec3, normal: Vec3, tex_coords: Vec2) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
            tex_coords: tex_coords.to_array(),
            tangent: [0.0; 3],
            bitangent: [0.0; 3],
        }
    }

    #[inline]
    pub fn pos(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    #[inline]
    pub fn uv(&self) -> Vec2 {
        Vec2::from_array(self.tex_coords)
    }

    #[inline]
    pub fn normal(&self) -> Vec3 {
        Vec3::from_array(self.normal)
    }

    #[inline]
    pub fn tangent(&self) -> Vec3 {
        Vec3::from_array(self.tangent)
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Tangent and bitangent of one triangle from its edge and UV deltas
///
/// Solves `edge1 = du1.x * T + du1.y * B`, `edge2 = du2.x * T + du2.y * B`.
/// Both results are normalized; a degenerate triangle yields zero vectors.
pub fn triangle_basis(p: [Vec3; 3], uv: [Vec2; 3]) -> (Vec3, Vec3) {
    let edge1 = p[1] - p[0];
    let edge2 = p[2] - p[0];
    let delta_uv1 = uv[1] - uv[0];
    let delta_uv2 = uv[2] - uv[0];

    let f = 1.0 / (delta_uv1.x * delta_uv2.y - delta_uv2.x * delta_uv1.y + UV_DETERMINANT_BIAS);

    let tangent = (edge1 * delta_uv2.y - edge2 * delta_uv1.y) * f;
    let bitangent = (edge2 * delta_uv1.x - edge1 * delta_uv2.x) * f;
    (tangent.normalize_or_zero(), bitangent.normalize_or_zero())
}

/// Indexed triangle mesh, counter-clockwise front faces
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        let mesh = Self { vertices, indices };
        debug_assert!(mesh.is_valid(), "mesh index out of range");
        mesh
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Whole triangles only, every index in range
    pub fn is_valid(&self) -> bool {
        let len = self.vertices.len() as u32;
        self.indices.len() % 3 == 0 && self.indices.iter().all(|&i| i < len)
    }

    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|c| [c[0], c[1], c[2]])
    }

    /// Assign each triangle's tangent basis to its three vertices.
    ///
    /// Vertices shared between triangles keep the basis of the last one.
    pub fn compute_flat_tangents(&mut self) {
        for i in 0..self.triangle_count() {
            let tri = [
                self.indices[i * 3] as usize,
                self.indices[i * 3 + 1] as usize,
                self.indices[i * 3 + 2] as usize,
            ];
            let (tangent, bitangent) = self.basis_of(tri);
            for v in tri {
                self.vertices[v].tangent = tangent.to_array();
                self.vertices[v].bitangent = bitangent.to_array();
            }
        }
    }

    /// Average triangle tangents per vertex; bitangent = normal x tangent.
    ///
    /// Vertices touched by no usable triangle keep a zero basis.
    pub fn compute_smooth_tangents(&mut self) {
        let mut sums = vec![Vec3::ZERO; self.vertices.len()];
        for i in 0..self.triangle_count() {
            let tri = [
                self.indices[i * 3] as usize,
                self.indices[i * 3 + 1] as usize,
                self.indices[i * 3 + 2] as usize,
            ];
            let (tangent, _) = self.basis_of(tri);
            for v in tri {
                sums[v] += tangent;
            }
        }

        for (vertex, sum) in self.vertices.iter_mut().zip(sums) {
            if sum.length() > 0.0001 {
                let tangent = sum.normalize();
                vertex.tangent = tangent.to_array();
                vertex.bitangent = vertex.normal().cross(tangent).to_array();
            }
        }
    }

    fn basis_of(&self, tri: [usize; 3]) -> (Vec3, Vec3) {
        let [a, b, c] = tri.map(|i| self.vertices[i]);
        triangle_basis([a.pos(), b.pos(), c.pos()], [a.uv(), b.uv(), c.uv()])
    }

    /// Copy with positions scaled per axis then offset. Normals and the
    /// tangent basis are carried over unchanged.
    pub fn transformed(&self, scale: Vec3, offset: Vec3) -> Mesh {
        let vertices = self
            .vertices
            .iter()
            .map(|v| Vertex {
                position: (v.pos() * scale + offset).to_array(),
                ..*v
            })
            .collect();
        Mesh {
            vertices,
            indices: self.indices.clone(),
        }
    }

    #[inline]
    pub fn translated(&self, offset: Vec3) -> Mesh {
        self.transformed(Vec3::ONE, offset)
    }

    /// Append another mesh, rebasing its indices
    pub fn append(&mut self, other: &Mesh) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(other.indices.iter().map(|i| base + i));
    }

    /// Axis-aligned bounds, `None` for a mesh without vertices
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = self.vertices.first()?.pos();
        Some(self.vertices.iter().fold((first, first), |(min, max), v| {
            (min.min(v.pos()), max.max(v.pos()))
        }))
    }
}
