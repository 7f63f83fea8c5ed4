// Copyright @yucwang 2026

use crate::core::geometry::SurfaceGeometry;
use crate::core::interaction::{SurfaceInteractionType, TransportDirection};
use crate::core::primitive::Primitive;
use crate::materials::{LambertMaterial, Material};
use crate::math::constants::{Float, Vector2f, Vector3f, INV_PI, PI};
use crate::math::frame::Frame;
use crate::math::spectrum::RGBSpectrum;
use crate::shapes::Rect;

// Diffuse area emitter over a rectangle. Emission follows a cosine
// profile around the shape normal; the surface itself scatters with a
// Lambert lobe (often black for pure emitters).
//
// The positional component carries `Le * pi` and the directional
// component `1/pi`, so their product recovers the emitted radiance in
// the projected solid angle convention.
pub struct AreaLightPrimitive {
    shape: Rect,
    radiance: RGBSpectrum,
    material: LambertMaterial,
}

impl AreaLightPrimitive {
    pub fn new(shape: Rect, radiance: RGBSpectrum, reflectance: RGBSpectrum) -> Self {
        Self {
            shape,
            radiance,
            material: LambertMaterial::new(reflectance),
        }
    }

    pub fn shape(&self) -> &Rect {
        &self.shape
    }

    fn emission_cos(&self, geom: &SurfaceGeometry, wo: &Vector3f) -> Float {
        geom.ns.dot(wo)
    }
}

impl Primitive for AreaLightPrimitive {
    fn interaction_type(&self) -> SurfaceInteractionType {
        SurfaceInteractionType::LIGHT
            | SurfaceInteractionType::DIFFUSE
            | SurfaceInteractionType::EMITTER_FLAG
    }

    fn sample_position(&self, u: &Vector2f) -> SurfaceGeometry {
        self.shape.sample(u)
    }

    fn evaluate_position(&self, _geom: &SurfaceGeometry, _eval_delta: bool) -> RGBSpectrum {
        self.radiance * PI
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
        // The position is sampled independently of the direction.
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
        match wi {
            // Surface scattering at the emitter.
            Some(_) => self.material.sample_direction(u, u_comp, geom, wi),
            // Emission from the endpoint.
            None => {
                let frame = Frame::from_z(geom.ns);
                Some(frame.from_local(crate::math::warp::sample_cosine_hemisphere(u)))
            }
        }
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
        match wi {
            Some(_) => self.material.evaluate(geom, wi, wo, trans_dir, eval_delta),
            None => {
                if self.emission_cos(geom, wo) <= 0.0 {
                    return RGBSpectrum::default();
                }
                RGBSpectrum::from_value(INV_PI)
            }
        }
    }

    fn evaluate_direction_pdf(
        &self,
        geom: &SurfaceGeometry,
        _ty: SurfaceInteractionType,
        wi: Option<&Vector3f>,
        wo: &Vector3f,
        eval_delta: bool,
    ) -> Float {
        match wi {
            Some(_) => self.material.evaluate_pdf(geom, wi, wo, eval_delta),
            None => {
                if self.emission_cos(geom, wo) <= 0.0 {
                    return 0.0;
                }
                INV_PI
            }
        }
    }
}
