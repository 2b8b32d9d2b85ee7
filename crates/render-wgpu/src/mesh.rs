use bytemuck::{Pod, Zeroable};
use std::f32::consts::{PI, TAU};

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(crate) struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Indexed triangle list, counter-clockwise when seen from outside.
#[derive(Debug, Clone)]
pub(crate) struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u16>,
}

/// Unit cube centered on the origin.
pub(crate) fn cube_mesh() -> MeshData {
    let p = 0.5_f32;
    #[rustfmt::skip]
    let vertices = vec![
        // +Z face
        Vertex { position: [-p, -p,  p], normal: [0.0, 0.0, 1.0] },
        Vertex { position: [ p, -p,  p], normal: [0.0, 0.0, 1.0] },
        Vertex { position: [ p,  p,  p], normal: [0.0, 0.0, 1.0] },
        Vertex { position: [-p,  p,  p], normal: [0.0, 0.0, 1.0] },
        // -Z face
        Vertex { position: [ p, -p, -p], normal: [0.0, 0.0, -1.0] },
        Vertex { position: [-p, -p, -p], normal: [0.0, 0.0, -1.0] },
        Vertex { position: [-p,  p, -p], normal: [0.0, 0.0, -1.0] },
        Vertex { position: [ p,  p, -p], normal: [0.0, 0.0, -1.0] },
        // +X face
        Vertex { position: [ p, -p,  p], normal: [1.0, 0.0, 0.0] },
        Vertex { position: [ p, -p, -p], normal: [1.0, 0.0, 0.0] },
        Vertex { position: [ p,  p, -p], normal: [1.0, 0.0, 0.0] },
        Vertex { position: [ p,  p,  p], normal: [1.0, 0.0, 0.0] },
        // -X face
        Vertex { position: [-p, -p, -p], normal: [-1.0, 0.0, 0.0] },
        Vertex { position: [-p, -p,  p], normal: [-1.0, 0.0, 0.0] },
        Vertex { position: [-p,  p,  p], normal: [-1.0, 0.0, 0.0] },
        Vertex { position: [-p,  p, -p], normal: [-1.0, 0.0, 0.0] },
        // +Y face
        Vertex { position: [-p,  p,  p], normal: [0.0, 1.0, 0.0] },
        Vertex { position: [ p,  p,  p], normal: [0.0, 1.0, 0.0] },
        Vertex { position: [ p,  p, -p], normal: [0.0, 1.0, 0.0] },
        Vertex { position: [-p,  p, -p], normal: [0.0, 1.0, 0.0] },
        // -Y face
        Vertex { position: [-p, -p, -p], normal: [0.0, -1.0, 0.0] },
        Vertex { position: [ p, -p, -p], normal: [0.0, -1.0, 0.0] },
        Vertex { position: [ p, -p,  p], normal: [0.0, -1.0, 0.0] },
        Vertex { position: [-p, -p,  p], normal: [0.0, -1.0, 0.0] },
    ];
    #[rustfmt::skip]
    let indices: Vec<u16> = vec![
        0,1,2, 2,3,0,       // +Z
        4,5,6, 6,7,4,       // -Z
        8,9,10, 10,11,8,    // +X
        12,13,14, 14,15,12, // -X
        16,17,18, 18,19,16, // +Y
        20,21,22, 22,23,20, // -Y
    ];
    MeshData { vertices, indices }
}

/// UV sphere of diameter 1. `segments` around the equator, `rings` pole to pole.
pub(crate) fn sphere_mesh(segments: u16, rings: u16) -> MeshData {
    let segments = segments.max(3);
    let rings = rings.max(2);
    let r = 0.5_f32;

    let mut vertices = Vec::with_capacity((rings as usize + 1) * (segments as usize + 1));
    for ring in 0..=rings {
        let polar = PI * ring as f32 / rings as f32;
        let (sin_p, cos_p) = polar.sin_cos();
        for seg in 0..=segments {
            let azimuth = TAU * seg as f32 / segments as f32;
            let (sin_a, cos_a) = azimuth.sin_cos();
            let n = [sin_p * cos_a, cos_p, sin_p * sin_a];
            vertices.push(Vertex {
                position: [n[0] * r, n[1] * r, n[2] * r],
                normal: n,
            });
        }
    }

    let stride = segments + 1;
    let mut indices = Vec::with_capacity(rings as usize * segments as usize * 6);
    for ring in 0..rings {
        for seg in 0..segments {
            let a = ring * stride + seg;
            let b = a + stride;
            indices.extend_from_slice(&[a, a + 1, b, a + 1, b + 1, b]);
        }
    }
    MeshData { vertices, indices }
}

/// 1x1 quad in the XZ plane facing +Y.
pub(crate) fn plane_mesh() -> MeshData {
    let h = 0.5_f32;
    let up = [0.0, 1.0, 0.0];
    let vertices = vec![
        Vertex { position: [-h, 0.0, h], normal: up },
        Vertex { position: [h, 0.0, h], normal: up },
        Vertex { position: [h, 0.0, -h], normal: up },
        Vertex { position: [-h, 0.0, -h], normal: up },
    ];
    MeshData {
        vertices,
        indices: vec![0, 1, 2, 2, 3, 0],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn triangles(mesh: &MeshData) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        mesh.indices.chunks_exact(3).map(|t| {
            [0, 1, 2].map(|k| Vec3::from(mesh.vertices[t[k] as usize].position))
        })
    }

    fn face_normal([a, b, c]: [Vec3; 3]) -> Vec3 {
        (b - a).cross(c - a)
    }

    #[test]
    fn cube_faces_point_outward() {
        let mesh = cube_mesh();
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
        for tri in triangles(&mesh) {
            let centroid = (tri[0] + tri[1] + tri[2]) / 3.0;
            assert!(face_normal(tri).dot(centroid) > 0.0);
        }
    }

    #[test]
    fn sphere_vertices_on_surface() {
        let mesh = sphere_mesh(16, 8);
        assert_eq!(mesh.vertices.len(), 9 * 17);
        assert_eq!(mesh.indices.len(), 8 * 16 * 6);
        for v in &mesh.vertices {
            assert!((Vec3::from(v.position).length() - 0.5).abs() < 1e-5);
            assert!((Vec3::from(v.normal).length() - 1.0).abs() < 1e-5);
        }
        let max = mesh.vertices.len() as u16;
        assert!(mesh.indices.iter().all(|i| *i < max));
    }

    #[test]
    fn sphere_faces_point_outward() {
        let mesh = sphere_mesh(16, 8);
        for tri in triangles(&mesh) {
            let centroid = (tri[0] + tri[1] + tri[2]) / 3.0;
            // Pole triangles collapse to zero area
            assert!(face_normal(tri).dot(centroid) >= -1e-6);
        }
    }

    #[test]
    fn plane_faces_up() {
        let mesh = plane_mesh();
        for tri in triangles(&mesh) {
            assert!(face_normal(tri).y > 0.0);
        }
    }
}
