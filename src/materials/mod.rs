// Copyright @yucwang 2026

pub mod lambert;
pub mod mirror;

pub use lambert::LambertMaterial;
pub use mirror::MirrorMaterial;

use crate::core::geometry::SurfaceGeometry;
use crate::core::interaction::{SurfaceInteractionType, TransportDirection};
use crate::math::constants::{Float, Vector2f, Vector3f};
use crate::math::spectrum::RGBSpectrum;

// Local scattering model. Values and densities are measured in projected
// solid angle, so a sampled step contributes `evaluate / evaluate_pdf`.
// `eval_delta` selects connection-style evaluation, under which delta
// components vanish.
pub trait Material: Send + Sync {
    fn interaction_type(&self) -> SurfaceInteractionType;

    fn sample_direction(
        &self,
        u: &Vector2f,
        u_comp: Float,
        geom: &SurfaceGeometry,
        wi: Option<&Vector3f>,
    ) -> Option<Vector3f>;

    fn evaluate(
        &self,
        geom: &SurfaceGeometry,
        wi: Option<&Vector3f>,
        wo: &Vector3f,
        trans_dir: TransportDirection,
        eval_delta: bool,
    ) -> RGBSpectrum;

    fn evaluate_pdf(
        &self,
        geom: &SurfaceGeometry,
        wi: Option<&Vector3f>,
        wo: &Vector3f,
        eval_delta: bool,
    ) -> Float;
}
