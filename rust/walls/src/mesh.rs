// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Box meshes for placed instances.

use floorgrid_core::PlacedInstance;
use nalgebra::{Point3, Rotation3, Vector3};

/// Triangle mesh
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    /// Vertex positions (x, y, z)
    pub positions: Vec<f32>,
    /// Vertex normals (nx, ny, nz)
    pub normals: Vec<f32>,
    /// Triangle indices (i0, i1, i2)
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[inline]
    fn add_vertex(&mut self, p: Point3<f64>, n: Vector3<f64>) {
        self.positions
            .extend_from_slice(&[p.x as f32, p.y as f32, p.z as f32]);
        self.normals
            .extend_from_slice(&[n.x as f32, n.y as f32, n.z as f32]);
    }

    /// Append another mesh, offsetting its indices.
    pub fn merge(&mut self, other: &Mesh) {
        let offset = self.vertex_count() as u32;
        self.positions.extend_from_slice(&other.positions);
        self.normals.extend_from_slice(&other.normals);
        self.indices
            .extend(other.indices.iter().map(|i| i + offset));
    }

    /// Axis box of an instance: centred on its position, sized by its scale,
    /// rotated by its yaw about +Y.
    ///
    /// Each face has its own four vertices so normals stay flat.
    pub fn from_instance(instance: &PlacedInstance) -> Self {
        let half = instance.scale.abs() * 0.5;
        let rotation =
            Rotation3::from_axis_angle(&Vector3::y_axis(), instance.yaw_degrees.to_radians());
        let center = instance.position;

        let mut mesh = Mesh {
            positions: Vec::with_capacity(24 * 3),
            normals: Vec::with_capacity(24 * 3),
            indices: Vec::with_capacity(36),
        };

        for (axis, u, v) in [(0usize, 1usize, 2usize), (1, 2, 0), (2, 0, 1)] {
            for sign in [1.0f64, -1.0] {
                let mut normal = Vector3::zeros();
                normal[axis] = sign;

                let base = mesh.vertex_count() as u32;
                for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                    let mut local = Vector3::zeros();
                    local[axis] = sign * half[axis];
                    // Mirror one tangent on the negative face to keep CCW winding
                    local[u] = su * sign * half[u];
                    local[v] = sv * half[v];
                    mesh.add_vertex(center + rotation * local, rotation * normal);
                }
                mesh.indices
                    .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
            }
        }

        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use floorgrid_core::InstanceKind;

    fn wall(yaw: f64) -> PlacedInstance {
        PlacedInstance::new(
            InstanceKind::Wall,
            "Wall",
            Point3::new(10.0, 1.4, -2.0),
            yaw,
            Vector3::new(4.0, 2.8, 0.2),
        )
    }

    fn extent(mesh: &Mesh, axis: usize) -> (f32, f32) {
        let values = mesh.positions.iter().skip(axis).step_by(3);
        values.fold((f32::MAX, f32::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)))
    }

    #[test]
    fn test_box_counts() {
        let mesh = Mesh::from_instance(&wall(0.0));
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.triangle_count(), 12);
        assert_eq!(mesh.normals.len(), mesh.positions.len());
    }

    #[test]
    fn test_box_extent_unrotated() {
        let mesh = Mesh::from_instance(&wall(0.0));
        let (lo, hi) = extent(&mesh, 0);
        assert_relative_eq!(lo, 8.0, epsilon = 1e-5);
        assert_relative_eq!(hi, 12.0, epsilon = 1e-5);
        let (lo, hi) = extent(&mesh, 1);
        assert_relative_eq!(lo, 0.0, epsilon = 1e-5);
        assert_relative_eq!(hi, 2.8, epsilon = 1e-5);
    }

    #[test]
    fn test_quarter_turn_swaps_footprint() {
        let mesh = Mesh::from_instance(&wall(90.0));
        let (lo, hi) = extent(&mesh, 0);
        assert_relative_eq!(hi - lo, 0.2, epsilon = 1e-5);
        let (lo, hi) = extent(&mesh, 2);
        assert_relative_eq!(lo, -4.0, epsilon = 1e-5);
        assert_relative_eq!(hi, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_faces_wind_outward() {
        let mesh = Mesh::from_instance(&wall(30.0));
        let p = |i: u32| {
            let i = i as usize * 3;
            Vector3::new(
                mesh.positions[i] as f64,
                mesh.positions[i + 1] as f64,
                mesh.positions[i + 2] as f64,
            )
        };
        for tri in mesh.indices.chunks(3) {
            let face_normal = (p(tri[1]) - p(tri[0])).cross(&(p(tri[2]) - p(tri[0])));
            let i = tri[0] as usize * 3;
            let n = Vector3::new(
                mesh.normals[i] as f64,
                mesh.normals[i + 1] as f64,
                mesh.normals[i + 2] as f64,
            );
            assert!(face_normal.dot(&n) > 0.0);
        }
    }

    #[test]
    fn test_merge_offsets_indices() {
        let mut mesh = Mesh::from_instance(&wall(0.0));
        mesh.merge(&Mesh::from_instance(&wall(90.0)));
        assert_eq!(mesh.vertex_count(), 48);
        assert_eq!(*mesh.indices.iter().max().unwrap(), 47);
    }
}
