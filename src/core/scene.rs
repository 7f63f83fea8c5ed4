// Copyright @yucwang 2026

use crate::core::geometry::SurfaceGeometry;
use crate::core::interaction::SurfaceInteractionType;
use crate::core::primitive::Primitive;
use crate::math::constants::{Float, Vector3f};
use crate::math::ray::Ray3f;

pub struct Intersection<'a> {
    pub geom: SurfaceGeometry,
    pub primitive: &'a dyn Primitive,
}

// The ray-tracing facade the estimators run against. Implementations own
// the primitives and the intersection machinery; the core only walks.
pub trait Scene: Sync {
    fn intersect(&self, ray: &Ray3f) -> Option<Intersection<'_>>;

    // Importance-sample one emitter (or sensor) matching the type mask.
    fn sample_emitter(&self, ty: SurfaceInteractionType, u: Float) -> Option<&dyn Primitive>;

    // Discrete selection density of the primitive among its emitter class.
    fn evaluate_emitter_pdf(&self, primitive: &dyn Primitive) -> Float;

    fn visible(&self, p: &Vector3f, q: &Vector3f) -> bool;
}
