use glam::{Vec2, Vec3};

/// Floats per vertex: position(3) + normal(3) + uv(2)
pub const VERTEX_STRIDE: usize = 8;

/// CPU-side mesh data: interleaved [pos.x, pos.y, pos.z, norm.x, norm.y, norm.z, u, v]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    /// 8 floats per vertex: position(3) + normal(3) + uv(2)
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / VERTEX_STRIDE
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn position(&self, vertex: usize) -> Vec3 {
        let base = vertex * VERTEX_STRIDE;
        Vec3::new(
            self.vertices[base],
            self.vertices[base + 1],
            self.vertices[base + 2],
        )
    }

    pub fn normal(&self, vertex: usize) -> Vec3 {
        let base = vertex * VERTEX_STRIDE;
        Vec3::new(
            self.vertices[base + 3],
            self.vertices[base + 4],
            self.vertices[base + 5],
        )
    }

    pub fn uv(&self, vertex: usize) -> Vec2 {
        let base = vertex * VERTEX_STRIDE;
        Vec2::new(self.vertices[base + 6], self.vertices[base + 7])
    }

    /// Vertex indices of a triangle
    pub fn triangle(&self, tri: usize) -> [usize; 3] {
        [
            self.indices[tri * 3] as usize,
            self.indices[tri * 3 + 1] as usize,
            self.indices[tri * 3 + 2] as usize,
        ]
    }

    /// Corner positions of a triangle
    pub fn triangle_positions(&self, tri: usize) -> [Vec3; 3] {
        let [i0, i1, i2] = self.triangle(tri);
        [self.position(i0), self.position(i1), self.position(i2)]
    }

    pub fn push_vertex(&mut self, position: Vec3, normal: Vec3, uv: Vec2) {
        self.vertices.extend_from_slice(&[
            position.x, position.y, position.z, normal.x, normal.y, normal.z, uv.x, uv.y,
        ]);
    }
}
