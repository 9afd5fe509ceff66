//! Triangle submission and primitive decomposition.

use tracing::instrument;

use crate::errors::Result;
use crate::geometry::{calc_normal, Facet, Triangle, Vec3};

/// Anything that accepts facets in order.
///
/// Implementors only provide [`add_facet`](MeshSink::add_facet); normal computation and
/// the quad/cuboid decompositions are shared.
pub trait MeshSink {
    /// Append one facet with the normal exactly as given.
    fn add_facet(&mut self, facet: Facet) -> Result<()>;

    /// Append `triangle` with its right-hand-rule normal.
    fn add_triangle(&mut self, triangle: Triangle) -> Result<()> {
        let normal = calc_normal(&triangle);
        self.add_facet(Facet { normal, triangle })
    }

    /// Append `triangle` with a caller-supplied normal. The normal is not re-normalized.
    fn add_triangle_with_normal(&mut self, triangle: Triangle, normal: Vec3) -> Result<()> {
        self.add_facet(Facet { normal, triangle })
    }

    /// Append the quadrilateral `v1 v2 v3 v4` as three triangles:
    /// `(v1, v2, v4)`, `(v2, v3, v4)`, `(v1, v3, v4)`.
    ///
    /// The third triangle overlaps the first two, so every quad costs three records.
    // TODO: switch to the (v1, v2, v4) + (v2, v3, v4) split once files written with the
    // three-triangle layout no longer need to diff cleanly.
    fn add_quad(&mut self, v1: Vec3, v2: Vec3, v3: Vec3, v4: Vec3) -> Result<()> {
        self.add_triangle(Triangle::from([v1, v2, v4]))?;
        self.add_triangle(Triangle::from([v2, v3, v4]))?;
        self.add_triangle(Triangle::from([v1, v3, v4]))
    }

    /// Append an axis-aligned box with one corner at `origin`, extending by `size`
    /// (width along x, length along y, height along z). Emits 6 quads, 18 triangles.
    #[instrument(level = "debug", skip(self))]
    fn add_cuboid(&mut self, origin: Vec3, size: Vec3) -> Result<()> {
        let Vec3 { x, y, z } = origin;
        let Vec3 { x: w, y: l, z: h } = size;
        let p = Vec3::new;

        // bottom and top
        for dz in [z, z + h] {
            self.add_quad(p(x, y, dz), p(x + w, y, dz), p(x, y + l, dz), p(x + w, y + l, dz))?;
        }
        // left and right
        for dx in [x, x + w] {
            self.add_quad(p(dx, y, z), p(dx, y, z + h), p(dx, y + l, z), p(dx, y + l, z + h))?;
        }
        // front and back
        for dy in [y, y + l] {
            self.add_quad(p(x, dy, z), p(x, dy, z + h), p(x + w, dy, z), p(x + w, dy, z + h))?;
        }
        Ok(())
    }
}

/// Collects facets in memory without encoding them.
impl MeshSink for Vec<Facet> {
    fn add_facet(&mut self, facet: Facet) -> Result<()> {
        self.push(facet);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f32, y: f32, z: f32) -> Vec3 {
        Vec3::new(x, y, z)
    }

    #[test]
    fn quad_emits_three_triangles_in_order() {
        let (a, b, c, d) = (v(0., 0., 0.), v(1., 0., 0.), v(1., 1., 0.), v(0., 1., 0.));
        let mut facets = Vec::new();
        facets.add_quad(a, b, c, d).unwrap();
        let tris: Vec<[Vec3; 3]> = facets.iter().map(|f| f.triangle.vertices).collect();
        assert_eq!(tris, vec![[a, b, d], [b, c, d], [a, c, d]]);
    }

    #[test]
    fn explicit_normal_is_kept_verbatim() {
        let mut facets = Vec::new();
        let t = Triangle::new([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        facets.add_triangle_with_normal(t, v(0.0, 0.0, 7.0)).unwrap();
        assert_eq!(facets[0].normal, v(0.0, 0.0, 7.0));
    }

    #[test]
    fn cuboid_emits_eighteen_triangles() {
        let mut facets = Vec::new();
        facets.add_cuboid(v(1.0, 2.0, 3.0), v(4.0, 5.0, 6.0)).unwrap();
        assert_eq!(facets.len(), 18);
    }

    #[test]
    fn cuboid_vertices_stay_on_the_box() {
        let mut facets = Vec::new();
        facets.add_cuboid(v(1.0, 2.0, 3.0), v(4.0, 5.0, 6.0)).unwrap();
        for f in &facets {
            for p in &f.triangle.vertices {
                assert!(p.x == 1.0 || p.x == 5.0);
                assert!(p.y == 2.0 || p.y == 7.0);
                assert!(p.z == 3.0 || p.z == 9.0);
            }
        }
    }

    #[test]
    fn cuboid_face_order_is_z_then_x_then_y() {
        let mut facets = Vec::new();
        facets.add_cuboid(Vec3::ZERO, v(1.0, 1.0, 1.0)).unwrap();
        // Each face contributes 3 facets; all vertices of a face share one coordinate.
        let plane_of = |i: usize| facets[i * 3].triangle.vertices[0];
        assert_eq!(plane_of(0).z, 0.0);
        assert_eq!(plane_of(1).z, 1.0);
        assert_eq!(plane_of(2).x, 0.0);
        assert_eq!(plane_of(3).x, 1.0);
        assert_eq!(plane_of(4).y, 0.0);
        assert_eq!(plane_of(5).y, 1.0);
        for face in facets.chunks(3) {
            for f in face {
                assert!(f.normal.length() > 0.99);
            }
        }
    }
}
