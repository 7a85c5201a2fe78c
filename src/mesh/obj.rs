//! Wavefront OBJ import and export for static meshes
//!
//! Import goes through `tobj` with triangulation and single-index corners, so
//! identical `v/vt/vn` triples share one vertex. Export writes plain ASCII
//! with every vertex emitted as a matching `v`/`vt`/`vn` triple, one `g`
//! group per mesh, and a companion `.mtl` holding each group's diffuse color.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Cursor, Write};
use std::path::Path;

use anyhow::{Context, bail};
use glam::{Vec2, Vec3};

use super::vertex::{Mesh, Vertex};

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        triangulate: true,
        single_index: true,
        ..Default::default()
    }
}

/// Parse OBJ text into one mesh with averaged tangents.
///
/// Every object and group in the file is merged. Material libraries are
/// ignored. Missing texture coordinates or normals read as zero.
pub fn parse_obj(text: &str) -> anyhow::Result<Mesh> {
    read_obj(&mut BufReader::new(Cursor::new(text)))
}

/// Load an OBJ file from disk
pub fn load_obj(path: impl AsRef<Path>) -> anyhow::Result<Mesh> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mesh =
        read_obj(&mut BufReader::new(file)).with_context(|| format!("parsing {}", path.display()))?;
    log::info!(
        "Loaded {} ({} vertices, {} triangles)",
        path.display(),
        mesh.vertices.len(),
        mesh.triangle_count()
    );
    Ok(mesh)
}

fn read_obj(reader: &mut impl BufRead) -> anyhow::Result<Mesh> {
    let (models, _materials) = tobj::load_obj_buf(reader, &load_options(), |_| {
        Err(tobj::LoadError::OpenFileFailed)
    })?;

    let mut mesh = Mesh::default();
    for model in &models {
        mesh.append(&model_mesh(&model.mesh));
    }
    if mesh.vertices.is_empty() {
        bail!("OBJ contains no vertices");
    }

    mesh.compute_smooth_tangents();
    Ok(mesh)
}

fn model_mesh(m: &tobj::Mesh) -> Mesh {
    let component = |data: &[f32], i: usize| data.get(i).copied().unwrap_or(0.0);
    let vertices = (0..m.positions.len() / 3)
        .map(|i| {
            Vertex::new(
                Vec3::new(
                    m.positions[i * 3],
                    m.positions[i * 3 + 1],
                    m.positions[i * 3 + 2],
                ),
                Vec3::new(
                    component(&m.normals, i * 3),
                    component(&m.normals, i * 3 + 1),
                    component(&m.normals, i * 3 + 2),
                ),
                Vec2::new(
                    component(&m.texcoords, i * 2),
                    component(&m.texcoords, i * 2 + 1),
                ),
            )
        })
        .collect();
    Mesh {
        vertices,
        indices: m.indices.clone(),
    }
}

/// One named, colored mesh in an exported document
#[derive(Debug, Clone, Copy)]
pub struct ObjGroup<'a> {
    /// Group and material name; must not contain whitespace
    pub name: &'a str,
    pub albedo: [f32; 3],
    pub mesh: &'a Mesh,
}

/// Write groups as a single OBJ document.
///
/// Indices are 1-based and offset by the vertices of the groups before them.
/// Each group's faces follow a `g` and `usemtl` line naming the group.
pub fn write_obj<W: Write>(
    groups: &[ObjGroup],
    mtllib: Option<&str>,
    mut out: W,
) -> std::io::Result<()> {
    writeln!(out, "# Exported OBJ file")?;
    if let Some(mtllib) = mtllib {
        writeln!(out, "mtllib {mtllib}")?;
    }

    for group in groups {
        for v in &group.mesh.vertices {
            writeln!(out, "v {} {} {}", v.position[0], v.position[1], v.position[2])?;
        }
    }
    for group in groups {
        for v in &group.mesh.vertices {
            writeln!(out, "vt {} {}", v.tex_coords[0], v.tex_coords[1])?;
        }
    }
    for group in groups {
        for v in &group.mesh.vertices {
            writeln!(out, "vn {} {} {}", v.normal[0], v.normal[1], v.normal[2])?;
        }
    }

    let mut offset = 1u32;
    for group in groups {
        writeln!(out, "g {}", group.name)?;
        writeln!(out, "usemtl {}", group.name)?;
        for [a, b, c] in group.mesh.triangles() {
            let (a, b, c) = (a + offset, b + offset, c + offset);
            writeln!(out, "f {a}/{a}/{a} {b}/{b}/{b} {c}/{c}/{c}")?;
        }
        offset += group.mesh.vertices.len() as u32;
    }

    out.flush()
}

/// Write one diffuse-only material per group
pub fn write_mtl<W: Write>(groups: &[ObjGroup], mut out: W) -> std::io::Result<()> {
    writeln!(out, "# Exported MTL file")?;
    for group in groups {
        let [r, g, b] = group.albedo;
        writeln!(out, "newmtl {}", group.name)?;
        writeln!(out, "Kd {r} {g} {b}")?;
    }
    out.flush()
}

/// Export groups to an OBJ file plus a `.mtl` next to it
pub fn export_obj(path: impl AsRef<Path>, groups: &[ObjGroup]) -> anyhow::Result<()> {
    let path = path.as_ref();
    let mtl_path = path.with_extension("mtl");
    let mtl_name = mtl_path
        .file_name()
        .and_then(|name| name.to_str())
        .context("material library path is not valid UTF-8")?;

    let file =
        File::create(&mtl_path).with_context(|| format!("creating {}", mtl_path.display()))?;
    write_mtl(groups, BufWriter::new(file))
        .with_context(|| format!("writing {}", mtl_path.display()))?;

    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    write_obj(groups, Some(mtl_name), BufWriter::new(file))
        .with_context(|| format!("writing {}", path.display()))?;
    log::info!("Exported {} group(s) to {}", groups.len(), path.display());
    Ok(())
}
