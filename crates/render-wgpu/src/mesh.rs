use bytemuck::{Pod, Zeroable};
use roomfly_scene::Shape;
use std::f32::consts::{PI, TAU};

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Indexed triangle list, counter-clockwise front faces.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u16>,
}

impl Mesh {
    pub fn for_shape(shape: Shape) -> Self {
        match shape {
            Shape::RoomBox => room_box(),
            Shape::Cube => cube(),
            Shape::Sphere => sphere(1.0, 24, 48),
            Shape::Torus => torus(1.0, 1.0 / 3.0, 48, 24),
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Unit cube centred on the origin.
pub fn cube() -> Mesh {
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
    Mesh { vertices, indices }
}

/// Unit cube turned inside out so its faces are visible from within.
pub fn room_box() -> Mesh {
    let mut mesh = cube();
    for v in &mut mesh.vertices {
        v.normal = v.normal.map(|n| -n);
    }
    for tri in mesh.indices.chunks_exact_mut(3) {
        tri.swap(1, 2);
    }
    mesh
}

/// UV sphere of the given diameter.
pub fn sphere(diameter: f32, rings: u16, segments: u16) -> Mesh {
    let radius = diameter * 0.5;
    let rings = rings.max(2);
    let segments = segments.max(3);
    let stride = segments + 1;

    let mut vertices = Vec::with_capacity(usize::from(rings + 1) * usize::from(stride));
    for i in 0..=rings {
        let theta = PI * f32::from(i) / f32::from(rings);
        for j in 0..=segments {
            let phi = TAU * f32::from(j) / f32::from(segments);
            let n = [theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin()];
            vertices.push(Vertex {
                position: n.map(|c| c * radius),
                normal: n,
            });
        }
    }

    let mut indices = Vec::with_capacity(usize::from(rings) * usize::from(segments) * 6);
    for i in 0..rings {
        for j in 0..segments {
            let a = i * stride + j;
            let b = a + stride;
            indices.extend_from_slice(&[a, a + 1, b, a + 1, b + 1, b]);
        }
    }
    Mesh { vertices, indices }
}

/// Torus lying in the XZ plane. `diameter` is measured through the tube
/// centres.
pub fn torus(diameter: f32, thickness: f32, segments: u16, sides: u16) -> Mesh {
    let ring = diameter * 0.5;
    let tube = thickness * 0.5;
    let segments = segments.max(3);
    let sides = sides.max(3);
    let stride = sides + 1;

    let mut vertices = Vec::with_capacity(usize::from(segments + 1) * usize::from(stride));
    for i in 0..=segments {
        let u = TAU * f32::from(i) / f32::from(segments);
        let (su, cu) = u.sin_cos();
        for j in 0..=sides {
            let v = TAU * f32::from(j) / f32::from(sides);
            let (sv, cv) = v.sin_cos();
            let normal = [cu * cv, sv, su * cv];
            vertices.push(Vertex {
                position: [
                    cu * ring + normal[0] * tube,
                    normal[1] * tube,
                    su * ring + normal[2] * tube,
                ],
                normal,
            });
        }
    }

    let mut indices = Vec::with_capacity(usize::from(segments) * usize::from(sides) * 6);
    for i in 0..segments {
        for j in 0..sides {
            let a = i * stride + j;
            let b = a + stride;
            indices.extend_from_slice(&[a, a + 1, b, a + 1, b + 1, b]);
        }
    }
    Mesh { vertices, indices }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    /// Every non-degenerate triangle winds counter-clockwise around its
    /// vertex normals.
    fn assert_winding_matches_normals(mesh: &Mesh) {
        for tri in mesh.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| mesh.vertices[usize::from(i)]);
            let pa = Vec3::from(a.position);
            let face = (Vec3::from(b.position) - pa).cross(Vec3::from(c.position) - pa);
            if face.length() < 1e-7 {
                continue;
            }
            let avg = Vec3::from(a.normal) + Vec3::from(b.normal) + Vec3::from(c.normal);
            assert!(face.dot(avg) > 0.0, "triangle {tri:?} faces away from its normals");
        }
    }

    fn assert_indices_in_range(mesh: &Mesh) {
        let n = mesh.vertices.len();
        assert!(mesh.indices.iter().all(|&i| usize::from(i) < n));
        assert_eq!(mesh.indices.len() % 3, 0);
    }

    #[test]
    fn cube_faces_outward() {
        let mesh = cube();
        assert_eq!(mesh.triangle_count(), 12);
        assert_indices_in_range(&mesh);
        assert_winding_matches_normals(&mesh);
        for v in &mesh.vertices {
            assert!(Vec3::from(v.position).dot(Vec3::from(v.normal)) > 0.0);
        }
    }

    #[test]
    fn room_box_faces_inward() {
        let mesh = room_box();
        assert_indices_in_range(&mesh);
        assert_winding_matches_normals(&mesh);
        for v in &mesh.vertices {
            assert!(Vec3::from(v.position).dot(Vec3::from(v.normal)) < 0.0);
        }
    }

    #[test]
    fn sphere_surface() {
        let mesh = sphere(2.0, 8, 16);
        assert_eq!(mesh.vertices.len(), 9 * 17);
        assert_eq!(mesh.triangle_count(), 8 * 16 * 2);
        assert_indices_in_range(&mesh);
        assert_winding_matches_normals(&mesh);
        for v in &mesh.vertices {
            assert!((Vec3::from(v.position).length() - 1.0).abs() < 1e-5);
            assert!((Vec3::from(v.normal).length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn torus_surface() {
        let mesh = torus(2.0, 0.5, 12, 8);
        assert_indices_in_range(&mesh);
        assert_winding_matches_normals(&mesh);
        for v in &mesh.vertices {
            let p = Vec3::from(v.position);
            // Distance from the tube centre line equals the tube radius.
            let centre = Vec3::new(p.x, 0.0, p.z).normalize() * 1.0;
            assert!(((p - centre).length() - 0.25).abs() < 1e-5);
        }
    }

    #[test]
    fn every_shape_fits_u16() {
        for shape in [Shape::RoomBox, Shape::Cube, Shape::Sphere, Shape::Torus] {
            let mesh = Mesh::for_shape(shape);
            assert!(!mesh.indices.is_empty());
            assert!(mesh.vertices.len() <= usize::from(u16::MAX));
        }
    }
}
