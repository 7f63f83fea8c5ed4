// Copyright @yucwang 2026

use crate::core::geometry::SurfaceGeometry;
use crate::core::interaction::SurfaceInteractionType;
use crate::core::primitive::Primitive;
use crate::core::scene::{Intersection, Scene};
use crate::materials::{LambertMaterial, MirrorMaterial};
use crate::math::constants::{Float, Vector3f, EPSILON};
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;
use crate::primitives::{AreaLightPrimitive, PinholeCameraPrimitive, SurfacePrimitive};
use crate::shapes::Rect;

// An intersectable primitive. `as_primitive` hands the object back as
// the transport-facing trait object.
pub trait SceneObject: Primitive {
    fn intersect(&self, ray: &Ray3f) -> Option<(Float, SurfaceGeometry)>;

    fn as_primitive(&self) -> &dyn Primitive;
}

impl SceneObject for SurfacePrimitive {
    fn intersect(&self, ray: &Ray3f) -> Option<(Float, SurfaceGeometry)> {
        self.shape().intersect(ray)
    }

    fn as_primitive(&self) -> &dyn Primitive {
        self
    }
}

impl SceneObject for AreaLightPrimitive {
    fn intersect(&self, ray: &Ray3f) -> Option<(Float, SurfaceGeometry)> {
        self.shape().intersect(ray)
    }

    fn as_primitive(&self) -> &dyn Primitive {
        self
    }
}

// Linear-scan scene over a handful of primitives plus one sensor. Good
// enough for the closed-room scenes this crate targets.
pub struct SimpleScene {
    objects: Vec<Box<dyn SceneObject>>,
    sensor: Box<dyn Primitive>,
    num_lights: usize,
}

impl SimpleScene {
    pub fn new(sensor: Box<dyn Primitive>, objects: Vec<Box<dyn SceneObject>>) -> Self {
        let num_lights = objects
            .iter()
            .filter(|o| o.interaction_type().contains(SurfaceInteractionType::LIGHT))
            .count();
        Self { objects, sensor, num_lights }
    }

    // Cornell-style closed room with a ceiling light and a mirror panel
    // on the right wall.
    pub fn cornell_box(aspect: Float) -> Self {
        let white = RGBSpectrum::from_value(0.75);
        let red = RGBSpectrum::new(0.75, 0.25, 0.25);
        let green = RGBSpectrum::new(0.25, 0.75, 0.25);

        let diffuse = |shape: Rect, reflectance: RGBSpectrum| -> Box<dyn SceneObject> {
            Box::new(SurfacePrimitive::new(
                shape,
                Box::new(LambertMaterial::new(reflectance)),
            ))
        };

        let mut objects: Vec<Box<dyn SceneObject>> = Vec::new();

        // Floor, y = 0, facing up.
        objects.push(diffuse(
            Rect::new(
                Vector3f::new(0.0, 0.0, 0.0),
                Vector3f::new(0.0, 0.0, 2.0),
                Vector3f::new(2.0, 0.0, 0.0),
            ),
            white,
        ));
        // Ceiling, y = 2, facing down.
        objects.push(diffuse(
            Rect::new(
                Vector3f::new(0.0, 2.0, 0.0),
                Vector3f::new(2.0, 0.0, 0.0),
                Vector3f::new(0.0, 0.0, 2.0),
            ),
            white,
        ));
        // Back wall, z = 2.
        objects.push(diffuse(
            Rect::new(
                Vector3f::new(0.0, 0.0, 2.0),
                Vector3f::new(0.0, 2.0, 0.0),
                Vector3f::new(2.0, 0.0, 0.0),
            ),
            white,
        ));
        // Front wall, z = 0, behind the camera.
        objects.push(diffuse(
            Rect::new(
                Vector3f::new(0.0, 0.0, 0.0),
                Vector3f::new(2.0, 0.0, 0.0),
                Vector3f::new(0.0, 2.0, 0.0),
            ),
            white,
        ));
        // Left wall, x = 0.
        objects.push(diffuse(
            Rect::new(
                Vector3f::new(0.0, 0.0, 0.0),
                Vector3f::new(0.0, 2.0, 0.0),
                Vector3f::new(0.0, 0.0, 2.0),
            ),
            red,
        ));
        // Right wall, x = 2.
        objects.push(diffuse(
            Rect::new(
                Vector3f::new(2.0, 0.0, 0.0),
                Vector3f::new(0.0, 0.0, 2.0),
                Vector3f::new(0.0, 2.0, 0.0),
            ),
            green,
        ));
        // Mirror panel just inside the right wall.
        objects.push(Box::new(SurfacePrimitive::new(
            Rect::new(
                Vector3f::new(1.995, 0.3, 0.5),
                Vector3f::new(0.0, 0.0, 1.0),
                Vector3f::new(0.0, 1.2, 0.0),
            ),
            Box::new(MirrorMaterial::new(RGBSpectrum::from_value(0.9))),
        )));
        // Ceiling light, slightly below the ceiling, emitting down.
        objects.push(Box::new(AreaLightPrimitive::new(
            Rect::new(
                Vector3f::new(0.75, 1.999, 0.75),
                Vector3f::new(0.5, 0.0, 0.0),
                Vector3f::new(0.0, 0.0, 0.5),
            ),
            RGBSpectrum::from_value(10.0),
            RGBSpectrum::default(),
        )));

        let sensor = Box::new(PinholeCameraPrimitive::new(
            Vector3f::new(1.0, 1.0, 0.02),
            Vector3f::new(1.0, 1.0, 2.0),
            Vector3f::new(0.0, 1.0, 0.0),
            60.0,
            aspect,
        ));

        Self::new(sensor, objects)
    }
}

impl Scene for SimpleScene {
    fn intersect(&self, ray: &Ray3f) -> Option<Intersection<'_>> {
        let mut closest: Option<(Float, SurfaceGeometry, &dyn Primitive)> = None;
        for object in &self.objects {
            if let Some((t, geom)) = object.intersect(ray) {
                if closest.map_or(true, |(closest_t, _, _)| t < closest_t) {
                    closest = Some((t, geom, object.as_primitive()));
                }
            }
        }
        closest.map(|(_, geom, primitive)| Intersection { geom, primitive })
    }

    fn sample_emitter(&self, ty: SurfaceInteractionType, u: Float) -> Option<&dyn Primitive> {
        if ty.contains(SurfaceInteractionType::SENSOR) {
            return Some(self.sensor.as_ref());
        }
        if ty.contains(SurfaceInteractionType::LIGHT) && self.num_lights > 0 {
            let index = ((u * self.num_lights as Float) as usize).min(self.num_lights - 1);
            return self
                .objects
                .iter()
                .filter(|o| o.interaction_type().contains(SurfaceInteractionType::LIGHT))
                .nth(index)
                .map(|o| o.as_primitive());
        }
        None
    }

    fn evaluate_emitter_pdf(&self, primitive: &dyn Primitive) -> Float {
        if primitive.interaction_type().contains(SurfaceInteractionType::SENSOR) {
            return 1.0;
        }
        if self.num_lights == 0 {
            return 0.0;
        }
        1.0 / self.num_lights as Float
    }

    fn visible(&self, p: &Vector3f, q: &Vector3f) -> bool {
        let d = q - p;
        let dist = d.norm();
        if dist <= 2.0 * EPSILON {
            return true;
        }
        let ray = Ray3f::new(*p, d, Some(EPSILON), Some(dist - EPSILON));
        self.intersect(&ray).is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floor(y: Float, reflectance: RGBSpectrum) -> Box<dyn SceneObject> {
        Box::new(SurfacePrimitive::new(
            Rect::new(
                Vector3f::new(-1.0, y, -1.0),
                Vector3f::new(0.0, 0.0, 2.0),
                Vector3f::new(2.0, 0.0, 0.0),
            ),
            Box::new(LambertMaterial::new(reflectance)),
        ))
    }

    fn test_sensor() -> Box<dyn Primitive> {
        Box::new(PinholeCameraPrimitive::new(
            Vector3f::new(0.0, 3.0, 0.0),
            Vector3f::new(0.0, 0.0, 0.0),
            Vector3f::new(0.0, 0.0, 1.0),
            45.0,
            1.0,
        ))
    }

    #[test]
    fn test_scene_intersect_picks_nearest() {
        let scene = SimpleScene::new(
            test_sensor(),
            vec![
                floor(0.0, RGBSpectrum::from_value(0.5)),
                floor(1.0, RGBSpectrum::from_value(0.5)),
            ],
        );
        let ray = Ray3f::new(
            Vector3f::new(0.0, 2.0, 0.0),
            Vector3f::new(0.0, -1.0, 0.0),
            None,
            None,
        );
        let isect = scene.intersect(&ray).unwrap();
        assert!((isect.geom.p.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_scene_visibility() {
        let scene = SimpleScene::new(test_sensor(), vec![floor(1.0, RGBSpectrum::from_value(0.5))]);

        // Blocked through the plane, clear alongside it.
        assert!(!scene.visible(&Vector3f::new(0.0, 0.0, 0.0), &Vector3f::new(0.0, 2.0, 0.0)));
        assert!(scene.visible(&Vector3f::new(2.0, 0.0, 0.0), &Vector3f::new(2.0, 2.0, 0.0)));
    }

    #[test]
    fn test_scene_emitter_selection() {
        let light = |x: Float| -> Box<dyn SceneObject> {
            Box::new(AreaLightPrimitive::new(
                Rect::new(
                    Vector3f::new(x, 2.0, 0.0),
                    Vector3f::new(1.0, 0.0, 0.0),
                    Vector3f::new(0.0, 0.0, 1.0),
                ),
                RGBSpectrum::from_value(1.0),
                RGBSpectrum::default(),
            ))
        };
        let scene = SimpleScene::new(
            test_sensor(),
            vec![floor(0.0, RGBSpectrum::from_value(0.5)), light(-2.0), light(2.0)],
        );

        let sensor = scene
            .sample_emitter(SurfaceInteractionType::SENSOR, 0.5)
            .unwrap();
        assert!(sensor.interaction_type().contains(SurfaceInteractionType::SENSOR));
        assert_eq!(scene.evaluate_emitter_pdf(sensor), 1.0);

        let first = scene.sample_emitter(SurfaceInteractionType::LIGHT, 0.1).unwrap();
        let second = scene.sample_emitter(SurfaceInteractionType::LIGHT, 0.9).unwrap();
        assert!(first.interaction_type().contains(SurfaceInteractionType::LIGHT));
        assert!(second.interaction_type().contains(SurfaceInteractionType::LIGHT));
        assert!(!std::ptr::eq(first, second));
        assert!((scene.evaluate_emitter_pdf(first) - 0.5).abs() < 1e-6);

        // Selection never reads past the last light.
        let edge = scene.sample_emitter(SurfaceInteractionType::LIGHT, 0.9999999);
        assert!(edge.is_some());
    }
}
