// Copyright @yucwang 2026

use super::Material;
use crate::core::geometry::SurfaceGeometry;
use crate::core::interaction::{SurfaceInteractionType, TransportDirection};
use crate::math::constants::{Float, Vector2f, Vector3f, INV_PI};
use crate::math::frame::Frame;
use crate::math::spectrum::RGBSpectrum;
use crate::math::warp;

pub struct LambertMaterial {
    reflectance: RGBSpectrum,
}

impl LambertMaterial {
    pub fn new(reflectance: RGBSpectrum) -> Self {
        Self { reflectance }
    }
}

impl Material for LambertMaterial {
    fn interaction_type(&self) -> SurfaceInteractionType {
        SurfaceInteractionType::DIFFUSE
    }

    fn sample_direction(
        &self,
        u: &Vector2f,
        _u_comp: Float,
        geom: &SurfaceGeometry,
        wi: Option<&Vector3f>,
    ) -> Option<Vector3f> {
        let frame = Frame::from_z(geom.ns);
        let mut d = warp::sample_cosine_hemisphere(u);
        // Scatter into the hemisphere of the incident direction.
        if let Some(wi) = wi {
            if frame.to_local(*wi).z < 0.0 {
                d.z = -d.z;
            }
        }
        Some(frame.from_local(d))
    }

    fn evaluate(
        &self,
        geom: &SurfaceGeometry,
        wi: Option<&Vector3f>,
        wo: &Vector3f,
        _trans_dir: TransportDirection,
        _eval_delta: bool,
    ) -> RGBSpectrum {
        let wi = match wi {
            Some(wi) => wi,
            None => return RGBSpectrum::default(),
        };
        let frame = Frame::from_z(geom.ns);
        let local_wi = frame.to_local(*wi);
        let local_wo = frame.to_local(*wo);
        if local_wi.z * local_wo.z <= 0.0 {
            return RGBSpectrum::default();
        }
        self.reflectance * INV_PI
    }

    fn evaluate_pdf(
        &self,
        geom: &SurfaceGeometry,
        wi: Option<&Vector3f>,
        wo: &Vector3f,
        _eval_delta: bool,
    ) -> Float {
        let wi = match wi {
            Some(wi) => wi,
            None => return 0.0,
        };
        let frame = Frame::from_z(geom.ns);
        let local_wi = frame.to_local(*wi);
        let local_wo = frame.to_local(*wo);
        if local_wi.z * local_wo.z <= 0.0 {
            return 0.0;
        }
        INV_PI
    }
}
