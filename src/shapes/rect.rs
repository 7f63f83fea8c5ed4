// Copyright 2020 @TwoCookingMice

use crate::core::geometry::SurfaceGeometry;
use crate::math::constants::{Float, Vector2f, Vector3f};
use crate::math::ray::Ray3f;

// Rectangle spanned by two orthogonal edges. The geometric normal
// follows the right-hand rule of `edge1 x edge2`; intersection reports
// hits from either side of the plane, with facing decided by the
// materials and emitters layered on top.
pub struct Rect {
    origin: Vector3f,
    edge1: Vector3f,
    edge2: Vector3f,
    normal: Vector3f,
    area: Float,
}

impl Rect {
    pub fn new(origin: Vector3f, edge1: Vector3f, edge2: Vector3f) -> Self {
        let cross = edge1.cross(&edge2);
        let area = cross.norm();
        Self {
            origin,
            edge1,
            edge2,
            normal: cross / area,
            area,
        }
    }

    pub fn area(&self) -> Float {
        self.area
    }

    pub fn normal(&self) -> Vector3f {
        self.normal
    }

    pub fn sample(&self, u: &Vector2f) -> SurfaceGeometry {
        let p = self.origin + self.edge1 * u.x + self.edge2 * u.y;
        SurfaceGeometry::new(p, self.normal)
    }

    pub fn intersect(&self, ray: &Ray3f) -> Option<(Float, SurfaceGeometry)> {
        let denom = ray.dir().dot(&self.normal);
        if denom.abs() < 1e-8 {
            return None;
        }

        let t = (self.origin - ray.origin()).dot(&self.normal) / denom;
        if !ray.test_segment(t) {
            return None;
        }

        let p = ray.at(t);
        let d = p - self.origin;
        let a = d.dot(&self.edge1) / self.edge1.norm_squared();
        if a < 0.0 || a > 1.0 {
            return None;
        }
        let b = d.dot(&self.edge2) / self.edge2.norm_squared();
        if b < 0.0 || b > 1.0 {
            return None;
        }

        Some((t, SurfaceGeometry::new(p, self.normal)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_rect() -> Rect {
        // Unit square in the xy plane, normal +z.
        Rect::new(
            Vector3f::new(0.0, 0.0, 0.0),
            Vector3f::new(1.0, 0.0, 0.0),
            Vector3f::new(0.0, 1.0, 0.0),
        )
    }

    #[test]
    fn test_rect_area_and_normal() {
        let rect = unit_rect();
        assert!((rect.area() - 1.0).abs() < 1e-6);
        assert!((rect.normal() - Vector3f::new(0.0, 0.0, 1.0)).norm() < 1e-6);
    }

    #[test]
    fn test_rect_intersect() {
        let rect = unit_rect();

        let hit = Ray3f::new(
            Vector3f::new(0.25, 0.75, 2.0),
            Vector3f::new(0.0, 0.0, -1.0),
            None,
            None,
        );
        let (t, geom) = rect.intersect(&hit).unwrap();
        assert!((t - 2.0).abs() < 1e-5);
        assert!((geom.p - Vector3f::new(0.25, 0.75, 0.0)).norm() < 1e-5);

        // Outside the parameter range.
        let miss = Ray3f::new(
            Vector3f::new(1.5, 0.5, 2.0),
            Vector3f::new(0.0, 0.0, -1.0),
            None,
            None,
        );
        assert!(rect.intersect(&miss).is_none());

        // Parallel to the plane.
        let parallel = Ray3f::new(
            Vector3f::new(0.5, 0.5, 1.0),
            Vector3f::new(1.0, 0.0, 0.0),
            None,
            None,
        );
        assert!(rect.intersect(&parallel).is_none());

        // Beyond max_t.
        let clipped = Ray3f::new(
            Vector3f::new(0.5, 0.5, 2.0),
            Vector3f::new(0.0, 0.0, -1.0),
            None,
            Some(1.0),
        );
        assert!(rect.intersect(&clipped).is_none());
    }

    #[test]
    fn test_rect_intersect_reports_back_side_hits() {
        let rect = unit_rect();
        let from_behind = Ray3f::new(
            Vector3f::new(0.5, 0.5, -2.0),
            Vector3f::new(0.0, 0.0, 1.0),
            None,
            None,
        );
        let (t, geom) = rect.intersect(&from_behind).unwrap();
        assert!((t - 2.0).abs() < 1e-5);
        // The geometric normal stays fixed regardless of approach side.
        assert!((geom.ns - rect.normal()).norm() < 1e-6);
    }

    #[test]
    fn test_rect_sample_lies_on_surface() {
        let rect = Rect::new(
            Vector3f::new(1.0, 2.0, 3.0),
            Vector3f::new(2.0, 0.0, 0.0),
            Vector3f::new(0.0, 0.0, 2.0),
        );
        let geom = rect.sample(&Vector2f::new(0.5, 0.25));
        assert!((geom.p - Vector3f::new(2.0, 2.0, 3.5)).norm() < 1e-5);
        assert!((geom.ns - rect.normal()).norm() < 1e-6);
    }
}
