//! Derived geometry: bounds and vertex normals.
//!
//! Everything here is computed from blended positions and never feeds back
//! into blending.

use glam::Vec3;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Smallest box containing all points, `None` for an empty iterator.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut min = first;
        let mut max = first;
        for p in iter {
            min = min.min(p);
            max = max.max(p);
        }
        Some(Self { min, max })
    }

    /// Box center.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Box dimensions along each axis.
    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }
}

/// Recomputes smooth per-vertex normals from shared triangle topology.
///
/// Each triangle's unnormalized face normal (cross product, magnitude twice
/// the triangle area) is accumulated at its three vertices, weighting large
/// faces more, then the sums are normalized. Vertices touched by no valid
/// triangle get a zero normal. Index triples that are incomplete or out of
/// range are skipped.
pub fn compute_vertex_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];

    for tri in indices.chunks_exact(3) {
        let i0 = tri[0] as usize;
        let i1 = tri[1] as usize;
        let i2 = tri[2] as usize;
        if i0 >= positions.len() || i1 >= positions.len() || i2 >= positions.len() {
            continue;
        }

        let edge1 = positions[i1] - positions[i0];
        let edge2 = positions[i2] - positions[i0];
        let face_normal = edge1.cross(edge2);

        normals[i0] += face_normal;
        normals[i1] += face_normal;
        normals[i2] += face_normal;
    }

    for normal in &mut normals {
        *normal = normal.normalize_or_zero();
    }

    normals
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_from_points() {
        assert_eq!(Aabb::from_points([]), None);

        let aabb = Aabb::from_points([
            Vec3::new(-1.0, 2.0, 0.5),
            Vec3::new(3.0, -4.0, 0.0),
            Vec3::ZERO,
        ])
        .unwrap();

        assert_eq!(aabb.min, Vec3::new(-1.0, -4.0, 0.0));
        assert_eq!(aabb.max, Vec3::new(3.0, 2.0, 0.5));
        assert_eq!(aabb.center(), Vec3::new(1.0, -1.0, 0.25));
        assert_eq!(aabb.extent(), Vec3::new(4.0, 6.0, 0.5));
    }

    #[test]
    fn test_normals_single_triangle() {
        // CCW triangle in the XY plane faces +Z.
        let positions = vec![Vec3::ZERO, Vec3::X, Vec3::Y];
        let normals = compute_vertex_normals(&positions, &[0, 1, 2]);

        for normal in &normals {
            assert!((normal.z - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_normals_skip_invalid_triples() {
        let positions = vec![Vec3::ZERO, Vec3::X, Vec3::Y];
        // One out-of-range triple, one trailing incomplete pair.
        let normals = compute_vertex_normals(&positions, &[0, 1, 9, 0, 1]);

        assert_eq!(normals, vec![Vec3::ZERO; 3]);
    }

    #[test]
    fn test_normals_average_shared_vertices() {
        // Two triangles meeting at a right angle share the edge 1-2; the
        // shared vertices get the averaged direction.
        let positions = vec![Vec3::ZERO, Vec3::X, Vec3::new(1.0, 1.0, 0.0), Vec3::new(0.0, 1.0, 1.0)];
        let normals = compute_vertex_normals(&positions, &[0, 1, 2, 0, 2, 3]);

        for normal in &normals {
            assert!((normal.length() - 1.0).abs() < 1e-6);
        }
        assert!(normals[1].z > 0.0);
    }
}
