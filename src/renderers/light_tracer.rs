// Copyright @yucwang 2026

use super::{resolve_seed, Renderer};
use crate::core::film::Film;
use crate::core::geometry::{geometry_term, SurfaceGeometry};
use crate::core::interaction::{SurfaceInteractionType, TransportDirection};
use crate::core::primitive::Primitive;
use crate::core::rng::LcgRng;
use crate::core::scene::Scene;
use crate::core::sched::SampleScheduler;
use crate::core::settings::{RenderSettings, SettingsError};
use crate::math::constants::{Vector3f, EPSILON};
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;

// Light tracer. Paths start on a light and every vertex, the emitting
// endpoint included, is connected to a sampled sensor position; the
// contribution lands wherever the connection projects on the raster.
pub struct LightTracer {
    max_num_vertices: i32,
    sched: SampleScheduler,
    seed: Option<u64>,
}

impl LightTracer {
    pub fn new(settings: &RenderSettings) -> Result<Self, SettingsError> {
        Ok(Self {
            max_num_vertices: settings.require_int("max_num_vertices")? as i32,
            sched: SampleScheduler::load(settings)?,
            seed: settings.seed()?,
        })
    }

    fn connect_to_sensor(
        scene: &dyn Scene,
        film: &Film,
        rng: &mut LcgRng,
        vertex: &ConnectionVertex<'_>,
    ) {
        let sensor = match scene.sample_emitter(SurfaceInteractionType::SENSOR, rng.next_f32()) {
            Some(sensor) => sensor,
            None => return,
        };
        let pdf_sel = scene.evaluate_emitter_pdf(sensor);
        assert!(pdf_sel > 0.0);

        let geom_e = sensor.sample_position(&rng.next_2d());
        let pdf_pos = sensor.evaluate_position_pdf(&geom_e, false);
        assert!(pdf_pos > 0.0);

        let to_sensor = (geom_e.p - vertex.geom.p).normalize();
        let fs_l = vertex.primitive.evaluate_direction(
            &vertex.geom,
            vertex.ty,
            vertex.wi.as_ref(),
            &to_sensor,
            TransportDirection::LE,
            true,
        );
        if fs_l.is_black() {
            return;
        }

        let g = geometry_term(&vertex.geom, &geom_e);
        if g <= 0.0 || !scene.visible(&vertex.geom.p, &geom_e.p) {
            return;
        }

        let wo_e = -to_sensor;
        let fs_e = sensor.evaluate_direction(
            &geom_e,
            SurfaceInteractionType::SENSOR,
            None,
            &wo_e,
            TransportDirection::EL,
            true,
        );
        let we_pos = sensor.evaluate_position(&geom_e, false);
        let contribution =
            vertex.throughput * fs_l * fs_e * we_pos * (g / (pdf_sel * pdf_pos));
        if contribution.is_black() {
            return;
        }

        if let Some(raster_pos) = sensor.raster_position(&wo_e, &geom_e) {
            film.splat(&raster_pos, &contribution);
        }
    }

    fn sample_path(scene: &dyn Scene, film: &Film, rng: &mut LcgRng, max_num_vertices: i32) {
        let light = match scene.sample_emitter(SurfaceInteractionType::LIGHT, rng.next_f32()) {
            Some(light) => light,
            None => return,
        };
        let pdf_sel = scene.evaluate_emitter_pdf(light);
        assert!(pdf_sel > 0.0);

        let geom_l = light.sample_position(&rng.next_2d());
        let pdf_pos = light.evaluate_position_pdf(&geom_l, false);
        assert!(pdf_pos > 0.0);

        let mut throughput = light.evaluate_position(&geom_l, false) / pdf_pos / pdf_sel;
        let mut primitive = light;
        let mut ty = SurfaceInteractionType::LIGHT;
        let mut geom = geom_l;
        let mut wi: Option<Vector3f> = None;
        let mut num_vertices = 1;

        loop {
            if max_num_vertices != -1 && num_vertices >= max_num_vertices {
                break;
            }

            Self::connect_to_sensor(
                scene,
                film,
                rng,
                &ConnectionVertex { geom, primitive, ty, wi, throughput },
            );

            let wo = match primitive.sample_direction(&rng.next_2d(), rng.next_f32(), ty, &geom, wi.as_ref()) {
                Some(wo) => wo,
                None => break,
            };

            let fs = primitive.evaluate_direction(&geom, ty, wi.as_ref(), &wo, TransportDirection::LE, false);
            if fs.is_black() {
                break;
            }
            let pdf_dir = primitive.evaluate_direction_pdf(&geom, ty, wi.as_ref(), &wo, false);
            assert!(pdf_dir > 0.0);
            throughput *= fs / pdf_dir;

            let ray = Ray3f::new(geom.p, wo, Some(EPSILON), None);
            let isect = match scene.intersect(&ray) {
                Some(isect) => isect,
                None => break,
            };

            if isect.geom.infinite {
                break;
            }

            let rr_prob = 0.5;
            if rng.next_f32() > rr_prob {
                break;
            }
            throughput /= rr_prob;

            geom = isect.geom;
            primitive = isect.primitive;
            ty = isect.primitive.interaction_type().strip_emitter_flag();
            wi = Some(-ray.dir());
            num_vertices += 1;
        }
    }
}

struct ConnectionVertex<'a> {
    geom: SurfaceGeometry,
    primitive: &'a dyn Primitive,
    ty: SurfaceInteractionType,
    wi: Option<Vector3f>,
    throughput: RGBSpectrum,
}

impl Renderer for LightTracer {
    fn render(&self, scene: &dyn Scene, film: &mut Film) {
        let mut init_rng = LcgRng::new(resolve_seed(self.seed));
        let max_num_vertices = self.max_num_vertices;
        self.sched.process(scene, film, &mut init_rng, &move |scene, film, rng| {
            Self::sample_path(scene, film, rng, max_num_vertices);
        });
    }
}
