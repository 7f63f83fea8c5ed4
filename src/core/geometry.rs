// Copyright @yucwang 2026

use crate::math::constants::{Float, Vector3f};

// Local geometry of a path vertex. `degenerate` marks positions sampled
// from a delta distribution (e.g. a pinhole aperture); `infinite` marks
// environment hits.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceGeometry {
    pub p: Vector3f,
    pub ns: Vector3f,
    pub degenerate: bool,
    pub infinite: bool,
}

impl Default for SurfaceGeometry {
    fn default() -> Self {
        Self {
            p: Vector3f::new(0.0, 0.0, 0.0),
            ns: Vector3f::new(0.0, 0.0, 1.0),
            degenerate: false,
            infinite: false,
        }
    }
}

impl SurfaceGeometry {
    pub fn new(p: Vector3f, ns: Vector3f) -> Self {
        Self { p, ns, degenerate: false, infinite: false }
    }

    pub fn degenerate(p: Vector3f, ns: Vector3f) -> Self {
        Self { p, ns, degenerate: true, infinite: false }
    }
}

// Geometry term between two surface points, clamped at grazing angles.
pub fn geometry_term(a: &SurfaceGeometry, b: &SurfaceGeometry) -> Float {
    let d = b.p - a.p;
    let dist2 = d.dot(&d);
    if dist2 <= 0.0 {
        return 0.0;
    }
    let dir = d / dist2.sqrt();
    let cos_a = a.ns.dot(&dir).max(0.0);
    let cos_b = b.ns.dot(&(-dir)).max(0.0);
    cos_a * cos_b / dist2
}
