//! Subdivided icosahedron geometry.
//!
//! Each of the 20 base faces is split into `(detail + 1)^2` triangles by
//! dividing its edges into `detail + 1` segments, then every vertex is pushed
//! onto the sphere of the requested radius. The mesh is non-indexed: three
//! vertices per triangle, with the vertex normal equal to the normalized
//! position. The wireframe reuses the same vertex buffer through a line index
//! list that outlines every triangle.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// A single vertex of the icosahedron mesh.
///
/// Layout: position(vec3) + normal(vec3) = 24 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    /// wgpu vertex buffer layout for `Vertex`.
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            // position: vec3<f32> at offset 0
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x3,
                offset: 0,
                shader_location: 0,
            },
            // normal: vec3<f32> at offset 12
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x3,
                offset: 12,
                shader_location: 1,
            },
        ],
    };
}

/// Golden ratio.
const PHI: f32 = 1.618_034;

const BASE_VERTICES: [[f32; 3]; 12] = [
    [-1.0, PHI, 0.0],
    [1.0, PHI, 0.0],
    [-1.0, -PHI, 0.0],
    [1.0, -PHI, 0.0],
    [0.0, -1.0, PHI],
    [0.0, 1.0, PHI],
    [0.0, -1.0, -PHI],
    [0.0, 1.0, -PHI],
    [PHI, 0.0, -1.0],
    [PHI, 0.0, 1.0],
    [-PHI, 0.0, -1.0],
    [-PHI, 0.0, 1.0],
];

/// Counter-clockwise when seen from outside.
const BASE_FACES: [[usize; 3]; 20] = [
    [0, 11, 5],
    [0, 5, 1],
    [0, 1, 7],
    [0, 7, 10],
    [0, 10, 11],
    [1, 5, 9],
    [5, 11, 4],
    [11, 10, 2],
    [10, 7, 6],
    [7, 1, 8],
    [3, 9, 4],
    [3, 4, 2],
    [3, 2, 6],
    [3, 6, 8],
    [3, 8, 9],
    [4, 9, 5],
    [2, 4, 11],
    [6, 2, 10],
    [8, 6, 7],
    [9, 8, 1],
];

/// Vertex data of a subdivided icosahedron, built once and shared read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    vertices: Vec<Vertex>,
    line_indices: Vec<u32>,
    radius: f32,
    detail: u32,
}

impl Geometry {
    /// Build an icosahedron of `radius` with `detail` subdivisions per edge.
    pub fn icosahedron(radius: f32, detail: u32) -> Self {
        let per_face = 3 * ((detail + 1) as usize).pow(2);
        let mut positions = Vec::with_capacity(BASE_FACES.len() * per_face);
        for face in BASE_FACES {
            let [a, b, c] = face.map(|i| Vec3::from_array(BASE_VERTICES[i]));
            subdivide_face(a, b, c, detail, &mut positions);
        }

        let vertices: Vec<Vertex> = positions
            .into_iter()
            .map(|p| {
                let n = p.normalize();
                Vertex {
                    position: (n * radius).to_array(),
                    normal: n.to_array(),
                }
            })
            .collect();

        let line_indices = triangle_edges(vertices.len() as u32);

        Self {
            vertices,
            line_indices,
            radius,
            detail,
        }
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    pub fn triangle_count(&self) -> u32 {
        self.vertex_count() / 3
    }

    /// Pairs of vertex indices, three lines per triangle.
    pub fn line_indices(&self) -> &[u32] {
        &self.line_indices
    }

    /// Copy of every vertex position, in vertex order.
    pub fn positions(&self) -> Vec<[f32; 3]> {
        self.vertices.iter().map(|v| v.position).collect()
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn detail(&self) -> u32 {
        self.detail
    }
}

/// Split triangle `(a, b, c)` into `(detail + 1)^2` triangles, keeping its
/// winding, and append their corners to `out`.
fn subdivide_face(a: Vec3, b: Vec3, c: Vec3, detail: u32, out: &mut Vec<Vec3>) {
    let cols = (detail + 1) as usize;

    // grid[i][j]: row i runs from the a-c edge toward c, column j from a-side to b-side.
    let mut grid: Vec<Vec<Vec3>> = Vec::with_capacity(cols + 1);
    for i in 0..=cols {
        let t = i as f32 / cols as f32;
        let row_start = a.lerp(c, t);
        let row_end = b.lerp(c, t);
        let rows = cols - i;
        let row = (0..=rows)
            .map(|j| {
                if rows == 0 {
                    row_start
                } else {
                    row_start.lerp(row_end, j as f32 / rows as f32)
                }
            })
            .collect();
        grid.push(row);
    }

    for i in 0..cols {
        for j in 0..(2 * (cols - i) - 1) {
            let k = j / 2;
            if j % 2 == 0 {
                out.extend([grid[i][k + 1], grid[i + 1][k], grid[i][k]]);
            } else {
                out.extend([grid[i][k + 1], grid[i + 1][k + 1], grid[i + 1][k]]);
            }
        }
    }
}

fn triangle_edges(vertex_count: u32) -> Vec<u32> {
    (0..vertex_count / 3)
        .flat_map(|t| {
            let base = t * 3;
            [base, base + 1, base + 1, base + 2, base + 2, base]
        })
        .collect()
}
