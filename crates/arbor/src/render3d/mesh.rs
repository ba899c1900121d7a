//! # Mesh — Built-In Geometry for 3D Draws
//!
//! A [`MeshDraw`] names its geometry by [`MeshKind`] instead of carrying
//! vertex data. Backends build each kind once with [`MeshKind::geometry`]
//! and reuse the buffers for every draw.
//!
//! ## Winding Order and Normals
//!
//! All triangles use counter-clockwise (CCW) winding when viewed from the
//! front face. Each vertex has a surface normal pointing outward.
//!
//! A cube needs its own 4 vertices per face (24 total) even though it has
//! only 8 unique positions: a corner on the top face has normal (0,1,0) while
//! the same corner on the front face has normal (0,0,1).
//!
//! ```text
//! plane (XZ, normal +Y)          cube face (4 vertices, 2 triangles)
//!
//!   3 ───── 2                     3 ───── 2
//!   │     ╱ │                     │     ╱ │
//!   │   ╱   │  -z                 │   ╱   │
//!   │ ╱     │   ▲                 │ ╱     │
//!   0 ───── 1   └─► x             0 ───── 1
//! ```
//!
//! ## Comparison
//!
//! - **Bevy**: `Plane3d` / `Cuboid` meshes built from primitive shapes into
//!   `Mesh` attribute arrays.
//! - **three.js**: `PlaneGeometry` and `BoxGeometry` with configurable
//!   subdivisions.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::math::Mat4;
use crate::render::Color;

/// Per-vertex data for 3D meshes.
///
/// ```text
/// MeshVertex (32 bytes)
/// ┌────────────┬────────────┬──────────┐
/// │ position   │ normal     │ uv       │
/// │ [f32; 3]   │ [f32; 3]   │ [f32; 2] │
/// │ offset 0   │ offset 12  │ offset 24│
/// └────────────┴────────────┴──────────┘
/// ```
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// Built-in geometry, all unit-sized and centered at the origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeshKind {
    /// 1x1 on the XZ plane, facing +Y.
    Plane,
    /// Side length 1.
    Cube,
}

impl MeshKind {
    /// Vertices and triangle indices for this kind.
    pub fn geometry(self) -> (Vec<MeshVertex>, Vec<u32>) {
        match self {
            MeshKind::Plane => plane(),
            MeshKind::Cube => cube(),
        }
    }
}

/// One immediate 3D draw.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshDraw {
    pub mesh: MeshKind,
    /// Name of the effect the backend shades with.
    pub effect: String,
    pub world: Mat4,
    pub color: Color,
}

fn plane() -> (Vec<MeshVertex>, Vec<u32>) {
    let h = 0.5_f32;
    let up = [0.0, 1.0, 0.0];
    let vertices = vec![
        MeshVertex { position: [-h, 0.0, h], normal: up, uv: [0.0, 0.0] },
        MeshVertex { position: [h, 0.0, h], normal: up, uv: [1.0, 0.0] },
        MeshVertex { position: [h, 0.0, -h], normal: up, uv: [1.0, 1.0] },
        MeshVertex { position: [-h, 0.0, -h], normal: up, uv: [0.0, 1.0] },
    ];
    (vertices, vec![0, 1, 2, 0, 2, 3])
}

fn cube() -> (Vec<MeshVertex>, Vec<u32>) {
    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    // (normal, u direction, v direction) per face, CCW seen from outside.
    let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ];
    let corners = [[-1.0, -1.0], [1.0, -1.0], [1.0, 1.0], [-1.0, 1.0]];
    let uvs = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];
    let h = 0.5_f32;

    for (normal, u_dir, v_dir) in faces {
        let base = vertices.len() as u32;
        for (corner, uv) in corners.iter().zip(uvs) {
            let position = std::array::from_fn(|axis| {
                normal[axis] * h + u_dir[axis] * corner[0] * h + v_dir[axis] * corner[1] * h
            });
            vertices.push(MeshVertex {
                position,
                normal,
                uv,
            });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    (vertices, indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec3;

    #[test]
    fn cube_has_four_vertices_per_face() {
        let (vertices, indices) = MeshKind::Cube.geometry();
        assert_eq!(vertices.len(), 24);
        assert_eq!(indices.len(), 36);
        assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));
    }

    #[test]
    fn cube_faces_wind_counter_clockwise_outward() {
        let (vertices, indices) = MeshKind::Cube.geometry();
        for triangle in indices.chunks(3) {
            let [a, b, c] = [0, 1, 2].map(|i| Vec3::from(vertices[triangle[i] as usize].position));
            let face_normal = (b - a).cross(c - a).normalize();
            let vertex_normal = Vec3::from(vertices[triangle[0] as usize].normal);
            assert!(face_normal.abs_diff_eq(vertex_normal, 1e-5));
        }
    }

    #[test]
    fn plane_faces_up() {
        let (vertices, indices) = MeshKind::Plane.geometry();
        assert_eq!(vertices.len(), 4);
        assert_eq!(indices, vec![0, 1, 2, 0, 2, 3]);
        assert!(vertices.iter().all(|v| v.normal == [0.0, 1.0, 0.0]));
    }

    #[test]
    fn vertex_layout() {
        assert_eq!(std::mem::size_of::<MeshVertex>(), 32);
        assert_eq!(std::mem::offset_of!(MeshVertex, uv), 24);
    }
}
