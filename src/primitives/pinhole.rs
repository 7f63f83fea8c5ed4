// Copyright 2020 @TwoCookingMice

use crate::core::geometry::SurfaceGeometry;
use crate::core::interaction::{SurfaceInteractionType, TransportDirection};
use crate::core::primitive::Primitive;
use crate::math::constants::{Float, Vector2f, Vector3f};
use crate::math::spectrum::RGBSpectrum;

// Pinhole camera. The aperture position is a delta distribution with
// unit mass; directions are sampled uniformly over the raster, which in
// projected solid angle gives the density 1 / (A_f * cos^4), with A_f
// the area of the film window on the plane at unit distance. Importance
// equals that density, so sampled sensor steps carry unit weight.
pub struct PinholeCameraPrimitive {
    position: Vector3f,
    right: Vector3f,
    up: Vector3f,
    forward: Vector3f,
    half_width: Float,
    half_height: Float,
    window_area: Float,
}

impl PinholeCameraPrimitive {
    pub fn new(
        position: Vector3f,
        look_at: Vector3f,
        up_hint: Vector3f,
        vfov_degrees: Float,
        aspect: Float,
    ) -> Self {
        let forward = (look_at - position).normalize();
        let right = forward.cross(&up_hint).normalize();
        let up = right.cross(&forward);
        let half_height = (vfov_degrees.to_radians() * 0.5).tan();
        let half_width = half_height * aspect;
        Self {
            position,
            right,
            up,
            forward,
            half_width,
            half_height,
            window_area: 4.0 * half_width * half_height,
        }
    }

    fn direction_through_raster(&self, raster_pos: &Vector2f) -> Vector3f {
        let x = (2.0 * raster_pos.x - 1.0) * self.half_width;
        let y = (1.0 - 2.0 * raster_pos.y) * self.half_height;
        (self.forward + self.right * x + self.up * y).normalize()
    }

    fn importance(&self, wo: &Vector3f) -> Float {
        match self.raster_position_of(wo) {
            Some(_) => {
                let cos_theta = self.forward.dot(wo);
                1.0 / (self.window_area * cos_theta * cos_theta * cos_theta * cos_theta)
            }
            None => 0.0,
        }
    }

    fn raster_position_of(&self, wo: &Vector3f) -> Option<Vector2f> {
        let z = self.forward.dot(wo);
        if z <= 0.0 {
            return None;
        }
        let x = self.right.dot(wo) / z;
        let y = self.up.dot(wo) / z;
        let rx = 0.5 * (x / self.half_width + 1.0);
        let ry = 0.5 * (1.0 - y / self.half_height);
        if rx < 0.0 || rx >= 1.0 || ry < 0.0 || ry >= 1.0 {
            return None;
        }
        Some(Vector2f::new(rx, ry))
    }
}

impl Primitive for PinholeCameraPrimitive {
    fn interaction_type(&self) -> SurfaceInteractionType {
        SurfaceInteractionType::SENSOR
    }

    fn sample_position(&self, _u: &Vector2f) -> SurfaceGeometry {
        SurfaceGeometry::degenerate(self.position, self.forward)
    }

    fn evaluate_position(&self, _geom: &SurfaceGeometry, eval_delta: bool) -> RGBSpectrum {
        if eval_delta {
            RGBSpectrum::default()
        } else {
            RGBSpectrum::from_value(1.0)
        }
    }

    fn evaluate_position_pdf(&self, _geom: &SurfaceGeometry, eval_delta: bool) -> Float {
        if eval_delta {
            0.0
        } else {
            1.0
        }
    }

    fn sample_position_and_direction(
        &self,
        u_dir: &Vector2f,
        _u_pos: &Vector2f,
    ) -> (SurfaceGeometry, Vector3f) {
        let geom = SurfaceGeometry::degenerate(self.position, self.forward);
        (geom, self.direction_through_raster(u_dir))
    }

    fn evaluate_position_given_direction_pdf(
        &self,
        _geom: &SurfaceGeometry,
        _wo: &Vector3f,
        _eval_delta: bool,
    ) -> Float {
        1.0
    }

    fn sample_direction(
        &self,
        u: &Vector2f,
        _u_comp: Float,
        _ty: SurfaceInteractionType,
        _geom: &SurfaceGeometry,
        _wi: Option<&Vector3f>,
    ) -> Option<Vector3f> {
        Some(self.direction_through_raster(u))
    }

    fn evaluate_direction(
        &self,
        _geom: &SurfaceGeometry,
        _ty: SurfaceInteractionType,
        _wi: Option<&Vector3f>,
        wo: &Vector3f,
        _trans_dir: TransportDirection,
        _eval_delta: bool,
    ) -> RGBSpectrum {
        RGBSpectrum::from_value(self.importance(wo))
    }

    fn evaluate_direction_pdf(
        &self,
        _geom: &SurfaceGeometry,
        _ty: SurfaceInteractionType,
        _wi: Option<&Vector3f>,
        wo: &Vector3f,
        _eval_delta: bool,
    ) -> Float {
        self.importance(wo)
    }

    fn raster_position(&self, wo: &Vector3f, _geom: &SurfaceGeometry) -> Option<Vector2f> {
        self.raster_position_of(wo)
    }
}
