use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3, Vec4};

use super::AssetId;

/// GPU vertex layout.
///
/// `tangent.w` carries the bitangent handedness after
/// [`Mesh::generate_tangents`].
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Default, Pod, Zeroable)]
pub struct Vertex {
    pub position: Vec4,
    pub normal: Vec4,
    pub uv: Vec2,
    _pad: Vec2,
    pub tangent: Vec4,
    pub bitangent: Vec4,
}

impl Vertex {
    pub fn new(position: Vec3, normal: Vec3, uv: Vec2) -> Self {
        Self {
            position: position.extend(1.0),
            normal: normal.extend(0.0),
            uv,
            ..Self::default()
        }
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Inverted box; expanding it by any point yields that point.
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::splat(f32::MAX),
        max: Vec3::splat(f32::MIN),
    };

    pub fn expand(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn is_empty(&self) -> bool {
        self.min.cmpgt(self.max).any()
    }
}

/// Triangle mesh with shared vertex and index storage.
///
/// The [`AssetId`] names the vertex storage: clones share it, and
/// [`Mesh::vertices_mut`] on shared storage copies and takes a new id.
#[derive(Debug, Clone)]
pub struct Mesh {
    vertices: Arc<Vec<Vertex>>,
    indices: Arc<Vec<[u32; 3]>>,
    id: AssetId,
    bounds: Aabb,
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex>, indices: Vec<[u32; 3]>) -> Self {
        debug_assert!(
            indices.iter().flatten().all(|&i| (i as usize) < vertices.len()),
            "mesh index out of range"
        );
        let mut mesh = Self {
            vertices: Arc::new(vertices),
            indices: Arc::new(indices),
            id: AssetId::next(),
            bounds: Aabb::EMPTY,
        };
        mesh.generate_bounding_box();
        mesh
    }

    /// Axis-aligned cube centred on the origin, four vertices per face.
    pub fn cube(size: f32) -> Self {
        let h = size * 0.5;
        // (normal, u axis, v axis) per face
        let faces = [
            (Vec3::NEG_Z, Vec3::X, Vec3::Y),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::X, Vec3::Z, Vec3::Y),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Y, Vec3::X, Vec3::Z),
        ];
        let corners = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(12);
        for (normal, u, v) in faces {
            let base = vertices.len() as u32;
            for (cu, cv) in corners {
                let position = (normal + u * cu + v * cv) * h;
                let uv = Vec2::new((cu + 1.0) * 0.5, (cv + 1.0) * 0.5);
                vertices.push(Vertex::new(position, normal, uv));
            }
            indices.push([base, base + 1, base + 2]);
            indices.push([base, base + 2, base + 3]);
        }

        Self::new(vertices, indices)
    }

    /// UV sphere with `rings` latitude rows and `sectors` longitude columns.
    pub fn sphere(radius: f32, rings: u32, sectors: u32) -> Self {
        let rings = rings.max(2);
        let sectors = sectors.max(2);
        let dr = 1.0 / (rings - 1) as f32;
        let ds = 1.0 / (sectors - 1) as f32;

        let mut vertices = Vec::with_capacity((rings * sectors) as usize);
        for r in 0..rings {
            let theta = std::f32::consts::PI * r as f32 * dr;
            for s in 0..sectors {
                let phi = std::f32::consts::TAU * s as f32 * ds;
                let n = Vec3::new(phi.cos() * theta.sin(), theta.cos(), phi.sin() * theta.sin());
                let uv = Vec2::new(s as f32 * ds, r as f32 * dr);
                vertices.push(Vertex::new(n * radius, n, uv));
            }
        }

        let mut indices = Vec::with_capacity(((rings - 1) * (sectors - 1) * 2) as usize);
        for r in 0..rings - 1 {
            let row = r * sectors;
            let next = (r + 1) * sectors;
            for s in 0..sectors - 1 {
                indices.push([row + s, next + s, next + s + 1]);
                indices.push([row + s, next + s + 1, row + s + 1]);
            }
        }

        Self::new(vertices, indices)
    }

    /// Unit quad in the XY plane spanning `-1..1`, facing +Z.
    pub fn quad() -> Self {
        let vertices = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)]
            .into_iter()
            .map(|(x, y)| {
                Vertex::new(
                    Vec3::new(x, y, 0.0),
                    Vec3::Z,
                    Vec2::new((x + 1.0) * 0.5, (y + 1.0) * 0.5),
                )
            })
            .collect();
        Self::new(vertices, vec![[0, 1, 2], [2, 3, 0]])
    }

    #[inline]
    pub fn id(&self) -> AssetId {
        self.id
    }

    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    #[inline]
    pub fn indices(&self) -> &[[u32; 3]] {
        &self.indices
    }

    /// Number of indices (three per triangle).
    #[inline]
    pub fn index_count(&self) -> u32 {
        (self.indices.len() * 3) as u32
    }

    #[inline]
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.vertices.as_slice())
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.indices.as_slice())
    }

    /// Mutable vertex access; shared storage is copied first and gets a new id.
    ///
    /// Call [`Mesh::generate_bounding_box`] after moving vertices.
    pub fn vertices_mut(&mut self) -> &mut Vec<Vertex> {
        let before = Arc::as_ptr(&self.vertices);
        let vertices = Arc::make_mut(&mut self.vertices);
        if !std::ptr::eq(before, &*vertices) {
            self.id = AssetId::next();
        }
        vertices
    }

    pub fn generate_bounding_box(&mut self) {
        let mut bounds = Aabb::EMPTY;
        for v in self.vertices.iter() {
            bounds.expand(v.position.truncate());
        }
        self.bounds = bounds;
    }

    /// Computes per-vertex tangent frames from positions and UVs.
    ///
    /// Triangle tangents are accumulated per vertex, then orthogonalised
    /// against the normal. Triangles with degenerate UVs contribute nothing.
    pub fn generate_tangents(&mut self) {
        if self.vertices.is_empty() || self.indices.is_empty() {
            return;
        }
        let indices = Arc::clone(&self.indices);
        let vertices = self.vertices_mut();

        for v in vertices.iter_mut() {
            v.tangent = Vec4::ZERO;
            v.bitangent = Vec4::ZERO;
        }

        for tri in indices.iter() {
            let [a, b, c] = tri.map(|i| i as usize);
            let (p0, p1, p2) = (
                vertices[a].position.truncate(),
                vertices[b].position.truncate(),
                vertices[c].position.truncate(),
            );
            let (e1, e2) = (p1 - p0, p2 - p0);
            let (d1, d2) = (vertices[b].uv - vertices[a].uv, vertices[c].uv - vertices[a].uv);

            let det = d1.x * d2.y - d2.x * d1.y;
            if det.abs() <= f32::EPSILON {
                continue;
            }
            let f = 1.0 / det;
            let tangent = ((e1 * d2.y - e2 * d1.y) * f).normalize_or_zero().extend(0.0);
            let bitangent = ((e2 * d1.x - e1 * d2.x) * f).normalize_or_zero().extend(0.0);

            for i in [a, b, c] {
                vertices[i].tangent += tangent;
                vertices[i].bitangent += bitangent;
            }
        }

        for v in vertices.iter_mut() {
            let n = v.normal.truncate().normalize_or_zero();
            let t = v.tangent.truncate();
            let t = (t - n * n.dot(t)).normalize_or_zero();
            let b = n.cross(t);
            let handedness = if b.dot(v.bitangent.truncate()) < 0.0 { -1.0 } else { 1.0 };
            v.tangent = t.extend(handedness);
            v.bitangent = b.extend(0.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_layout_has_no_implicit_padding() {
        assert_eq!(std::mem::size_of::<Vertex>(), 80);
        assert_eq!(std::mem::align_of::<Vertex>() % 4, 0);
    }

    #[test]
    fn cube_has_24_vertices_and_36_indices() {
        let cube = Mesh::cube(2.0);
        assert_eq!(cube.vertices().len(), 24);
        assert_eq!(cube.index_count(), 36);
        assert_eq!(cube.bounds().min, Vec3::splat(-1.0));
        assert_eq!(cube.bounds().max, Vec3::splat(1.0));
    }

    #[test]
    fn sphere_vertices_lie_on_radius() {
        let sphere = Mesh::sphere(3.0, 8, 12);
        assert_eq!(sphere.vertices().len(), 96);
        assert_eq!(sphere.index_count(), 7 * 11 * 2 * 3);
        for v in sphere.vertices() {
            assert!((v.position.truncate().length() - 3.0).abs() < 1e-4);
        }
    }

    #[test]
    fn quad_bounds_and_bytes() {
        let quad = Mesh::quad();
        assert_eq!(quad.index_count(), 6);
        assert_eq!(quad.index_bytes().len(), 24);
        assert_eq!(quad.vertex_bytes().len(), 4 * std::mem::size_of::<Vertex>());
        assert_eq!(quad.bounds().center(), Vec3::ZERO);
    }

    #[test]
    fn clone_shares_id_and_mutation_reassigns_it() {
        let a = Mesh::quad();
        let mut b = a.clone();
        assert_eq!(a.id(), b.id());

        b.vertices_mut()[0].position.x = -5.0;
        b.generate_bounding_box();
        assert_ne!(a.id(), b.id());
        assert_eq!(a.bounds().min.x, -1.0);
        assert_eq!(b.bounds().min.x, -5.0);
    }

    #[test]
    fn empty_bounds_are_inverted() {
        let mesh = Mesh::new(Vec::new(), Vec::new());
        assert!(mesh.bounds().is_empty());
    }

    #[test]
    fn quad_tangents_follow_u_axis() {
        let mut quad = Mesh::quad();
        quad.generate_tangents();
        for v in quad.vertices() {
            assert!((v.tangent.truncate() - Vec3::X).length() < 1e-5);
            assert!((v.bitangent.truncate() - Vec3::Y).length() < 1e-5);
            assert_eq!(v.tangent.w, 1.0);
        }
    }
}
