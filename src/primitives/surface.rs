// Copyright @yucwang 2026

use crate::core::geometry::SurfaceGeometry;
use crate::core::interaction::{SurfaceInteractionType, TransportDirection};
use crate::core::primitive::Primitive;
use crate::materials::Material;
use crate::math::constants::{Float, Vector2f, Vector3f};
use crate::math::frame::Frame;
use crate::math::spectrum::RGBSpectrum;
use crate::shapes::Rect;

// Non-emitting surface: a shape paired with a scattering model.
pub struct SurfacePrimitive {
    shape: Rect,
    material: Box<dyn Material>,
}

impl SurfacePrimitive {
    pub fn new(shape: Rect, material: Box<dyn Material>) -> Self {
        Self { shape, material }
    }

    pub fn shape(&self) -> &Rect {
        &self.shape
    }
}

impl Primitive for SurfacePrimitive {
    fn interaction_type(&self) -> SurfaceInteractionType {
        self.material.interaction_type()
    }

    fn sample_position(&self, u: &Vector2f) -> SurfaceGeometry {
        self.shape.sample(u)
    }

    fn evaluate_position(&self, _geom: &SurfaceGeometry, _eval_delta: bool) -> RGBSpectrum {
        RGBSpectrum::default()
    }

    fn evaluate_position_pdf(&self, _geom: &SurfaceGeometry, _eval_delta: bool) -> Float {
        1.0 / self.shape.area()
    }

    fn sample_position_and_direction(
        &self,
        u_dir: &Vector2f,
        u_pos: &Vector2f,
    ) -> (SurfaceGeometry, Vector3f) {
        let geom = self.shape.sample(u_pos);
        let frame = Frame::from_z(geom.ns);
        let wo = frame.from_local(crate::math::warp::sample_cosine_hemisphere(u_dir));
        (geom, wo)
    }

    fn evaluate_position_given_direction_pdf(
        &self,
        _geom: &SurfaceGeometry,
        _wo: &Vector3f,
        _eval_delta: bool,
    ) -> Float {
        1.0 / self.shape.area()
    }

    fn sample_direction(
        &self,
        u: &Vector2f,
        u_comp: Float,
        _ty: SurfaceInteractionType,
        geom: &SurfaceGeometry,
        wi: Option<&Vector3f>,
    ) -> Option<Vector3f> {
        self.material.sample_direction(u, u_comp, geom, wi)
    }

    fn evaluate_direction(
        &self,
        geom: &SurfaceGeometry,
        _ty: SurfaceInteractionType,
        wi: Option<&Vector3f>,
        wo: &Vector3f,
        trans_dir: TransportDirection,
        eval_delta: bool,
    ) -> RGBSpectrum {
        self.material.evaluate(geom, wi, wo, trans_dir, eval_delta)
    }

    fn evaluate_direction_pdf(
        &self,
        geom: &SurfaceGeometry,
        _ty: SurfaceInteractionType,
        wi: Option<&Vector3f>,
        wo: &Vector3f,
        eval_delta: bool,
    ) -> Float {
        self.material.evaluate_pdf(geom, wi, wo, eval_delta)
    }
}
