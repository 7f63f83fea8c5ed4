// Copyright @yucwang 2026

use crate::core::geometry::SurfaceGeometry;
use crate::core::interaction::{SurfaceInteractionType, TransportDirection};
use crate::math::constants::{Float, Vector2f, Vector3f};
use crate::math::spectrum::RGBSpectrum;

// A scene primitive seen from the transport core: an opaque bundle of
// position/direction sampling and evaluation routines, tagged with an
// interaction-type mask. Direction densities are measured in projected
// solid angle, position densities in area (delta positions carry unit
// mass). `eval_delta` selects connection-style evaluation, under which
// delta components vanish.
//
// `wi` is `None` at emitter/sensor endpoints, where no incident
// direction exists yet.
pub trait Primitive: Send + Sync {
    fn interaction_type(&self) -> SurfaceInteractionType;

    fn sample_position(&self, u: &Vector2f) -> SurfaceGeometry;

    fn evaluate_position(&self, geom: &SurfaceGeometry, eval_delta: bool) -> RGBSpectrum;

    fn evaluate_position_pdf(&self, geom: &SurfaceGeometry, eval_delta: bool) -> Float;

    fn sample_position_and_direction(
        &self,
        u_dir: &Vector2f,
        u_pos: &Vector2f,
    ) -> (SurfaceGeometry, Vector3f);

    fn evaluate_position_given_direction_pdf(
        &self,
        geom: &SurfaceGeometry,
        wo: &Vector3f,
        eval_delta: bool,
    ) -> Float;

    fn sample_direction(
        &self,
        u: &Vector2f,
        u_comp: Float,
        ty: SurfaceInteractionType,
        geom: &SurfaceGeometry,
        wi: Option<&Vector3f>,
    ) -> Option<Vector3f>;

    fn evaluate_direction(
        &self,
        geom: &SurfaceGeometry,
        ty: SurfaceInteractionType,
        wi: Option<&Vector3f>,
        wo: &Vector3f,
        trans_dir: TransportDirection,
        eval_delta: bool,
    ) -> RGBSpectrum;

    fn evaluate_direction_pdf(
        &self,
        geom: &SurfaceGeometry,
        ty: SurfaceInteractionType,
        wi: Option<&Vector3f>,
        wo: &Vector3f,
        eval_delta: bool,
    ) -> Float;

    // Sensors only: project an outgoing direction back onto the raster.
    fn raster_position(&self, _wo: &Vector3f, _geom: &SurfaceGeometry) -> Option<Vector2f> {
        None
    }
}
