// Copyright @yucwang 2026

use super::{resolve_seed, Renderer};
use crate::core::film::Film;
use crate::core::interaction::{SurfaceInteractionType, TransportDirection};
use crate::core::rng::LcgRng;
use crate::core::scene::Scene;
use crate::core::sched::SampleScheduler;
use crate::core::settings::{RenderSettings, SettingsError};
use crate::math::constants::{Vector3f, EPSILON};
use crate::math::ray::Ray3f;

// Unidirectional path tracer. Eye paths pick up emission whenever they
// hit a light; Russian roulette with survival 0.5 bounds the walk when
// the vertex budget is unbounded.
pub struct PathTracer {
    max_num_vertices: i32,
    sched: SampleScheduler,
    seed: Option<u64>,
}

impl PathTracer {
    pub fn new(settings: &RenderSettings) -> Result<Self, SettingsError> {
        Ok(Self {
            max_num_vertices: settings.require_int("max_num_vertices")? as i32,
            sched: SampleScheduler::load(settings)?,
            seed: settings.seed()?,
        })
    }

    fn sample_path(scene: &dyn Scene, film: &Film, rng: &mut LcgRng, max_num_vertices: i32) {
        let sensor = match scene.sample_emitter(SurfaceInteractionType::SENSOR, rng.next_f32()) {
            Some(sensor) => sensor,
            None => return,
        };
        let pdf_sel = scene.evaluate_emitter_pdf(sensor);
        assert!(pdf_sel > 0.0);

        let (geom_e, init_wo) = sensor.sample_position_and_direction(&rng.next_2d(), &rng.next_2d());
        let pdf_pos = sensor.evaluate_position_given_direction_pdf(&geom_e, &init_wo, false);
        assert!(pdf_pos > 0.0);

        let raster_pos = match sensor.raster_position(&init_wo, &geom_e) {
            Some(raster_pos) => raster_pos,
            // Numerical failure to project; the sample carries nothing.
            None => return,
        };

        let mut throughput = sensor.evaluate_position(&geom_e, false) / pdf_pos / pdf_sel;
        let mut primitive = sensor;
        let mut ty = SurfaceInteractionType::SENSOR;
        let mut geom = geom_e;
        let mut wi: Option<Vector3f> = None;
        let mut num_vertices = 1;

        loop {
            if max_num_vertices != -1 && num_vertices >= max_num_vertices {
                break;
            }

            let wo = if ty == SurfaceInteractionType::SENSOR {
                init_wo
            } else {
                match primitive.sample_direction(&rng.next_2d(), rng.next_f32(), ty, &geom, wi.as_ref()) {
                    Some(wo) => wo,
                    None => break,
                }
            };

            let fs = primitive.evaluate_direction(&geom, ty, wi.as_ref(), &wo, TransportDirection::EL, false);
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

            if isect.primitive.interaction_type().contains(SurfaceInteractionType::LIGHT) {
                let wo_e = -ray.dir();
                let contribution = throughput
                    * isect.primitive.evaluate_direction(
                        &isect.geom,
                        SurfaceInteractionType::LIGHT,
                        None,
                        &wo_e,
                        TransportDirection::EL,
                        false,
                    )
                    * isect.primitive.evaluate_position(&isect.geom, false);
                film.splat(&raster_pos, &contribution);
            }

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

impl Renderer for PathTracer {
    fn render(&self, scene: &dyn Scene, film: &mut Film) {
        let mut init_rng = LcgRng::new(resolve_seed(self.seed));
        let max_num_vertices = self.max_num_vertices;
        self.sched.process(scene, film, &mut init_rng, &move |scene, film, rng| {
            Self::sample_path(scene, film, rng, max_num_vertices);
        });
    }
}
