//! Procedural cube and floor geometry.
//!
//! Flat primitives are one small indexed quad per face with a uniform color.
//! Textured primitives tessellate every face into a unit grid so texture
//! coordinates can tile at a configurable resolution; each face becomes one or
//! more independently indexed patches.

use crate::error::MeshError;
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use station_common::Color;
use std::f32::consts::FRAC_PI_2;

/// Largest vertex count one patch may hold with 16-bit indices.
pub const MAX_PATCH_VERTICES: usize = u16::MAX as usize;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct FlatVertex {
    pub position: [f32; 3],
    pub color: [u8; 4],
    pub normal: [f32; 3],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct TexturedVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coord: [f32; 2],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexFormat {
    Flat,
    Textured,
}

impl VertexFormat {
    pub fn stride(&self) -> u64 {
        match self {
            VertexFormat::Flat => std::mem::size_of::<FlatVertex>() as u64,
            VertexFormat::Textured => std::mem::size_of::<TexturedVertex>() as u64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Cube,
    /// The top face of a cube only.
    Floor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Face {
    Up,
    Down,
    Right,
    Left,
    Backward,
    Forward,
}

impl Face {
    pub fn normal(&self) -> Vec3 {
        match self {
            Face::Up => Vec3::Y,
            Face::Down => Vec3::NEG_Y,
            Face::Right => Vec3::X,
            Face::Left => Vec3::NEG_X,
            Face::Backward => Vec3::Z,
            Face::Forward => Vec3::NEG_Z,
        }
    }

    /// Turns the up-facing grid onto this face.
    fn rotation(&self) -> Mat4 {
        match self {
            Face::Up | Face::Down => Mat4::IDENTITY,
            Face::Right => Mat4::from_rotation_z(-FRAC_PI_2),
            Face::Left => Mat4::from_rotation_z(FRAC_PI_2),
            Face::Backward => Mat4::from_rotation_x(FRAC_PI_2),
            Face::Forward => Mat4::from_rotation_x(-FRAC_PI_2),
        }
    }
}

const FLAT_CUBE_FACES: [Face; 6] = [
    Face::Backward,
    Face::Forward,
    Face::Right,
    Face::Left,
    Face::Up,
    Face::Down,
];

/// One independently indexed batch of textured vertices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patch {
    pub vertices: Vec<TexturedVertex>,
    pub indices: Vec<u16>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MeshData {
    Flat {
        vertices: Vec<FlatVertex>,
        indices: Vec<u16>,
    },
    Textured {
        patches: Vec<Patch>,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeshStats {
    pub vertices: usize,
    pub indices: usize,
    pub patches: usize,
}

impl MeshData {
    pub fn format(&self) -> VertexFormat {
        match self {
            MeshData::Flat { .. } => VertexFormat::Flat,
            MeshData::Textured { .. } => VertexFormat::Textured,
        }
    }

    pub fn stats(&self) -> MeshStats {
        match self {
            MeshData::Flat { vertices, indices } => MeshStats {
                vertices: vertices.len(),
                indices: indices.len(),
                patches: 1,
            },
            MeshData::Textured { patches } => MeshStats {
                vertices: patches.iter().map(|p| p.vertices.len()).sum(),
                indices: patches.iter().map(|p| p.indices.len()).sum(),
                patches: patches.len(),
            },
        }
    }
}

/// Four vertices and two triangles per face, one shared normal and color.
pub fn build_flat(shape: Shape, size: f32, color: Color) -> MeshData {
    let faces: &[Face] = match shape {
        Shape::Cube => &FLAT_CUBE_FACES,
        Shape::Floor => &[Face::Up],
    };
    let half = size / 2.0;
    let mut vertices = Vec::with_capacity(faces.len() * 4);
    let mut indices = Vec::with_capacity(faces.len() * 6);

    for face in faces {
        let normal = face.normal();
        let side1 = Vec3::new(normal.y, normal.z, normal.x);
        let side2 = normal.cross(side1);

        let base = vertices.len() as u16;
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);

        for corner in [
            normal - side1 - side2,
            normal - side1 + side2,
            normal + side1 + side2,
            normal + side1 - side2,
        ] {
            vertices.push(FlatVertex {
                position: (corner * half).to_array(),
                color: color.to_array(),
                normal: normal.to_array(),
            });
        }
    }

    MeshData::Flat { vertices, indices }
}

/// A face laid out as a `dim1 × dim3` grid at height `offset`.
#[derive(Debug, Clone, Copy)]
struct FaceGrid {
    face: Face,
    dim1: i32,
    offset: i32,
    dim3: i32,
}

fn face_grids(shape: Shape, width: i32, height: i32, depth: i32) -> Vec<FaceGrid> {
    let grid = |face, dim1, offset, dim3| FaceGrid {
        face,
        dim1,
        offset,
        dim3,
    };
    let up = grid(Face::Up, width, height / 2, depth);
    match shape {
        Shape::Floor => vec![up],
        Shape::Cube => vec![
            up,
            grid(Face::Down, width, -height / 2, depth),
            grid(Face::Right, height, width / 2 - 1, depth),
            grid(Face::Left, height, width / 2, depth),
            grid(Face::Backward, width, depth / 2, height),
            grid(Face::Forward, width, depth / 2, height),
        ],
    }
}

/// Tessellates each face into unit cells of a `size · scale` box.
///
/// Texture coordinates are the in-plane grid position divided by
/// `texture_resolution`. Faces larger than one patch are split into row bands
/// that share their boundary row.
pub fn build_textured(
    shape: Shape,
    size: f32,
    scale: Vec3,
    texture_resolution: f32,
) -> Result<MeshData, MeshError> {
    let width = (size * scale.x) as i32;
    let height = (size * scale.y) as i32;
    let depth = (size * scale.z) as i32;

    let mut patches = Vec::new();
    for grid in face_grids(shape, width, height, depth) {
        push_face(&grid, texture_resolution, &mut patches)?;
    }

    tracing::debug!(
        "built textured {shape:?} {width}x{height}x{depth}: {} patches",
        patches.len()
    );
    Ok(MeshData::Textured { patches })
}

fn push_face(grid: &FaceGrid, resolution: f32, patches: &mut Vec<Patch>) -> Result<(), MeshError> {
    if grid.dim1 < 2 || grid.dim3 < 2 {
        return Ok(());
    }
    let columns = grid.dim1 as usize;
    let rows = grid.dim3 as usize;

    let rows_per_patch = MAX_PATCH_VERTICES / columns;
    if rows_per_patch < 2 {
        return Err(MeshError::IndexOverflow {
            face: grid.face,
            vertices: columns * 2,
            max: MAX_PATCH_VERTICES,
        });
    }

    let mut start = 0;
    loop {
        let end = (start + rows_per_patch).min(rows);
        patches.push(band(grid, resolution, start, end));
        if end == rows {
            return Ok(());
        }
        start = end - 1;
    }
}

/// Rows `start..end` of a face grid.
fn band(grid: &FaceGrid, resolution: f32, start: usize, end: usize) -> Patch {
    let columns = grid.dim1 as usize;
    let band_rows = end - start;
    let rotation = grid.face.rotation();
    let normal = grid.face.normal().to_array();

    let mut vertices = Vec::with_capacity(columns * band_rows);
    for j in start..end {
        let pos3 = j as i32 - grid.dim3 / 2;
        for i in 0..columns {
            let pos1 = i as i32 - grid.dim1 / 2;
            let local = Vec3::new(pos1 as f32, grid.offset as f32, -(pos3 as f32));
            vertices.push(TexturedVertex {
                position: rotation.transform_point3(local).to_array(),
                normal,
                tex_coord: [pos1 as f32 / resolution, pos3 as f32 / resolution],
            });
        }
    }

    // The down face shares the up face's grid, so it needs the mirrored order.
    let mirrored = grid.face == Face::Down;
    let mut indices = Vec::with_capacity((columns - 1) * (band_rows - 1) * 6);
    for row in 0..band_rows - 1 {
        for col in 0..columns - 1 {
            let bottom_left = (col + row * columns) as u16;
            let bottom_right = bottom_left + 1;
            let top_left = (col + (row + 1) * columns) as u16;
            let top_right = top_left + 1;
            if mirrored {
                indices.extend_from_slice(&[
                    top_left,
                    bottom_left,
                    bottom_right,
                    top_left,
                    bottom_right,
                    top_right,
                ]);
            } else {
                indices.extend_from_slice(&[
                    top_left,
                    bottom_right,
                    bottom_left,
                    top_left,
                    top_right,
                    bottom_right,
                ]);
            }
        }
    }

    Patch { vertices, indices }
}

/// Axis-aligned box with `0..1` texture coordinates on each face.
pub fn build_box(center: Vec3, half_extents: Vec3) -> Patch {
    let mut patch = Patch::default();
    for face in FLAT_CUBE_FACES {
        let normal = face.normal();
        let side1 = Vec3::new(normal.y, normal.z, normal.x);
        let side2 = normal.cross(side1);

        let base = patch.vertices.len() as u16;
        patch
            .indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);

        let corners = [
            (normal - side1 - side2, [0.0, 1.0]),
            (normal - side1 + side2, [1.0, 1.0]),
            (normal + side1 + side2, [1.0, 0.0]),
            (normal + side1 - side2, [0.0, 0.0]),
        ];
        for (corner, tex_coord) in corners {
            patch.vertices.push(TexturedVertex {
                position: (center + corner * half_extents).to_array(),
                normal: normal.to_array(),
                tex_coord,
            });
        }
    }
    patch
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patches(mesh: &MeshData) -> &[Patch] {
        match mesh {
            MeshData::Textured { patches } => patches,
            MeshData::Flat { .. } => panic!("expected textured mesh"),
        }
    }

    #[test]
    fn flat_cube_counts_and_normals() {
        let mesh = build_flat(Shape::Cube, 1000.0, Color::DARK_RED);
        let MeshData::Flat { vertices, indices } = &mesh else {
            panic!("expected flat mesh");
        };
        assert_eq!(vertices.len(), 24);
        assert_eq!(indices.len(), 36);
        for face in vertices.chunks(4) {
            let normal = Vec3::from_array(face[0].normal);
            for v in face {
                assert_eq!(v.normal, face[0].normal);
                assert_eq!(v.color, [139, 0, 0, 255]);
                // Every corner sits on the outward face plane.
                let p = Vec3::from_array(v.position);
                assert_eq!(p.dot(normal), 500.0);
            }
        }
    }

    #[test]
    fn flat_floor_is_one_quad() {
        let mesh = build_flat(Shape::Floor, 10.0, Color::WHITE);
        let stats = mesh.stats();
        assert_eq!(stats.vertices, 4);
        assert_eq!(stats.indices, 6);
        assert_eq!(mesh.format(), VertexFormat::Flat);
    }

    #[test]
    fn flat_front_faces_wind_clockwise_from_outside() {
        let MeshData::Flat { vertices, indices } = build_flat(Shape::Cube, 2.0, Color::WHITE) else {
            panic!("expected flat mesh");
        };
        for tri in indices.chunks(3) {
            let a = Vec3::from_array(vertices[tri[0] as usize].position);
            let b = Vec3::from_array(vertices[tri[1] as usize].position);
            let c = Vec3::from_array(vertices[tri[2] as usize].position);
            let n = Vec3::from_array(vertices[tri[0] as usize].normal);
            assert!((b - a).cross(c - a).dot(n) < 0.0);
        }
    }

    #[test]
    fn textured_faces_wind_clockwise_from_outside() {
        let mesh = build_textured(Shape::Cube, 10.0, Vec3::ONE, 1.0).unwrap();
        for patch in patches(&mesh) {
            let n = Vec3::from_array(patch.vertices[0].normal);
            for tri in patch.indices.chunks(3) {
                let a = Vec3::from_array(patch.vertices[tri[0] as usize].position);
                let b = Vec3::from_array(patch.vertices[tri[1] as usize].position);
                let c = Vec3::from_array(patch.vertices[tri[2] as usize].position);
                assert!((b - a).cross(c - a).dot(n) < 0.0, "{n:?}");
            }
        }
    }

    #[test]
    fn textured_cube_patch_per_face() {
        let mesh = build_textured(Shape::Cube, 100.0, Vec3::ONE, 100.0).unwrap();
        let patches = patches(&mesh);
        assert_eq!(patches.len(), 6);
        for patch in patches {
            assert_eq!(patch.vertices.len(), 100 * 100);
            assert_eq!(patch.indices.len(), 99 * 99 * 6);
            assert_eq!(patch.indices.len() % 3, 0);
        }
    }

    #[test]
    fn ten_by_ten_face_has_486_indices() {
        let mesh = build_textured(Shape::Floor, 10.0, Vec3::ONE, 1.0).unwrap();
        let patches = patches(&mesh);
        assert_eq!(patches.len(), 1);
        assert_eq!(patches[0].vertices.len(), 100);
        assert_eq!(patches[0].indices.len(), 486);
    }

    #[test]
    fn face_normals_follow_face_order() {
        let mesh = build_textured(Shape::Cube, 4.0, Vec3::ONE, 1.0).unwrap();
        let normals: Vec<[f32; 3]> = patches(&mesh).iter().map(|p| p.vertices[0].normal).collect();
        assert_eq!(
            normals,
            vec![
                [0.0, 1.0, 0.0],
                [0.0, -1.0, 0.0],
                [1.0, 0.0, 0.0],
                [-1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0],
                [0.0, 0.0, -1.0],
            ]
        );
    }

    #[test]
    fn side_faces_sit_on_their_planes() {
        let mesh = build_textured(Shape::Cube, 10.0, Vec3::ONE, 1.0).unwrap();
        let patches = patches(&mesh);
        // Right face is one unit inside the half width.
        for v in &patches[2].vertices {
            assert!((v.position[0] - 4.0).abs() < 1e-4);
        }
        for v in &patches[4].vertices {
            assert!((v.position[2] - 5.0).abs() < 1e-4);
        }
        for v in &patches[5].vertices {
            assert!((v.position[2] + 5.0).abs() < 1e-4);
        }
    }

    #[test]
    fn floor_tex_coords_track_position() {
        let mesh = build_textured(Shape::Floor, 1000.0, Vec3::new(1.0, 0.25, 0.25), 100.0).unwrap();
        let patches = patches(&mesh);
        assert!(patches.len() > 1);
        for patch in patches {
            assert!(patch.vertices.len() <= MAX_PATCH_VERTICES);
            for v in &patch.vertices {
                assert_eq!(v.position[1], 125.0);
                assert!((v.tex_coord[0] - v.position[0] / 100.0).abs() < 1e-6);
                assert!((v.tex_coord[1] + v.position[2] / 100.0).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn split_face_covers_every_row() {
        let mesh = build_textured(Shape::Floor, 1000.0, Vec3::new(1.0, 0.25, 0.25), 100.0).unwrap();
        let patches = patches(&mesh);
        // Bands share a boundary row, so unique rows add up to the full depth.
        let rows: usize = patches.iter().map(|p| p.vertices.len() / 1000).sum();
        assert_eq!(rows - (patches.len() - 1), 250);
        let cells: usize = patches.iter().map(|p| p.indices.len() / 6).sum();
        assert_eq!(cells, 999 * 249);
    }

    #[test]
    fn overly_wide_face_overflows() {
        let result = build_textured(Shape::Floor, 40_000.0, Vec3::new(1.0, 1.0, 0.001), 1.0);
        assert!(matches!(
            result,
            Err(MeshError::IndexOverflow { face: Face::Up, .. })
        ));
    }

    #[test]
    fn degenerate_faces_are_skipped() {
        let mesh = build_textured(Shape::Cube, 100.0, Vec3::new(1.0, 0.015, 1.0), 1.0).unwrap();
        // Height 1: the four side faces have a single row.
        assert_eq!(patches(&mesh).len(), 2);
    }

    #[test]
    fn box_has_unit_tex_coords() {
        let patch = build_box(Vec3::new(0.0, 1.0, 0.0), Vec3::new(2.0, 1.0, 0.5));
        assert_eq!(patch.vertices.len(), 24);
        assert_eq!(patch.indices.len(), 36);
        for v in &patch.vertices {
            assert!(v.tex_coord.iter().all(|t| *t == 0.0 || *t == 1.0));
            assert!(v.position[1] >= 0.0 && v.position[1] <= 2.0);
        }
    }
}
