// Copyright @yucwang 2026

use super::Material;
use crate::core::geometry::SurfaceGeometry;
use crate::core::interaction::{SurfaceInteractionType, TransportDirection};
use crate::math::constants::{Float, Vector2f, Vector3f, EPSILON};
use crate::math::spectrum::RGBSpectrum;

// Ideal specular reflector. The scattered direction is a delta
// distribution, so connection-style evaluation always vanishes.
pub struct MirrorMaterial {
    reflectance: RGBSpectrum,
}

impl MirrorMaterial {
    pub fn new(reflectance: RGBSpectrum) -> Self {
        Self { reflectance }
    }

    fn reflect(geom: &SurfaceGeometry, wi: &Vector3f) -> Vector3f {
        geom.ns * (2.0 * wi.dot(&geom.ns)) - wi
    }
}

impl Material for MirrorMaterial {
    fn interaction_type(&self) -> SurfaceInteractionType {
        SurfaceInteractionType::SPECULAR
    }

    fn sample_direction(
        &self,
        _u: &Vector2f,
        _u_comp: Float,
        geom: &SurfaceGeometry,
        wi: Option<&Vector3f>,
    ) -> Option<Vector3f> {
        let wi = wi?;
        if wi.dot(&geom.ns) == 0.0 {
            return None;
        }
        Some(Self::reflect(geom, wi))
    }

    fn evaluate(
        &self,
        geom: &SurfaceGeometry,
        wi: Option<&Vector3f>,
        wo: &Vector3f,
        _trans_dir: TransportDirection,
        eval_delta: bool,
    ) -> RGBSpectrum {
        if eval_delta {
            return RGBSpectrum::default();
        }
        let wi = match wi {
            Some(wi) => wi,
            None => return RGBSpectrum::default(),
        };
        if wo.dot(&Self::reflect(geom, wi)) < 1.0 - EPSILON {
            return RGBSpectrum::default();
        }
        self.reflectance
    }

    fn evaluate_pdf(
        &self,
        geom: &SurfaceGeometry,
        wi: Option<&Vector3f>,
        wo: &Vector3f,
        eval_delta: bool,
    ) -> Float {
        if eval_delta {
            return 0.0;
        }
        let wi = match wi {
            Some(wi) => wi,
            None => return 0.0,
        };
        if wo.dot(&Self::reflect(geom, wi)) < 1.0 - EPSILON {
            return 0.0;
        }
        1.0
    }
}
