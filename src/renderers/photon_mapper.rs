// Copyright @yucwang 2026

use super::{resolve_seed, Renderer};
use crate::core::film::Film;
use crate::core::interaction::{SurfaceInteractionType, TransportDirection};
use crate::core::rng::LcgRng;
use crate::core::scene::Scene;
use crate::core::sched::SampleScheduler;
use crate::core::settings::{RenderSettings, SettingsError};
use crate::math::constants::{Float, Vector3f, EPSILON, INV_PI};
use crate::math::ray::Ray3f;
use crate::photonmap::{self, Photon, PhotonMap};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;

const PHOTON_CHUNK: u64 = 10000;
const GATHER_NUM_PHOTONS: usize = 20;
const GATHER_MAX_DIST2: Float = 0.01;

// Two-pass photon mapping. The first pass traces light subpaths in
// parallel and records photons at diffuse or glossy hits; the second
// pass walks eye subpaths and estimates radiance by kernel density
// estimation over the collected photons. With `finalgather` the
// estimate is deferred by one diffuse bounce.
pub struct PhotonMapper {
    max_num_vertices: i32,
    num_photon_trace_samples: u64,
    finalgather: bool,
    photonmap_name: String,
    sched: SampleScheduler,
    seed: Option<u64>,
}

impl PhotonMapper {
    pub fn new(settings: &RenderSettings) -> Result<Self, SettingsError> {
        let photonmap_name = settings.str_or("photonmap", "kdtree");
        if photonmap::create(&photonmap_name).is_none() {
            return Err(SettingsError::Parse(format!(
                "unknown photon map: {}",
                photonmap_name
            )));
        }
        Ok(Self {
            max_num_vertices: settings.require_int("max_num_vertices")? as i32,
            num_photon_trace_samples: settings.uint_or("num_photon_trace_samples", 100000)?,
            finalgather: settings.int_or("finalgather", 1)? != 0,
            photonmap_name,
            sched: SampleScheduler::load(settings)?,
            seed: settings.seed()?,
        })
    }

    fn trace_photon_path(
        scene: &dyn Scene,
        rng: &mut LcgRng,
        max_num_vertices: i32,
        photons: &mut Vec<Photon>,
    ) {
        let light = match scene.sample_emitter(SurfaceInteractionType::LIGHT, rng.next_f32()) {
            Some(light) => light,
            None => return,
        };
        let pdf_sel = scene.evaluate_emitter_pdf(light);
        assert!(pdf_sel > 0.0);

        let (geom_l, init_wo) = light.sample_position_and_direction(&rng.next_2d(), &rng.next_2d());
        let pdf_pos = light.evaluate_position_given_direction_pdf(&geom_l, &init_wo, false);
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

            let wo = if ty == SurfaceInteractionType::LIGHT {
                init_wo
            } else {
                match primitive.sample_direction(&rng.next_2d(), rng.next_f32(), ty, &geom, wi.as_ref()) {
                    Some(wo) => wo,
                    None => break,
                }
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

            // Photons live only on scattering surfaces; emitters pick up
            // their energy through direct hits, not density estimation.
            let hit_ty = isect.primitive.interaction_type();
            if (hit_ty.contains(SurfaceInteractionType::DIFFUSE)
                || hit_ty.contains(SurfaceInteractionType::GLOSSY))
                && !hit_ty.contains(SurfaceInteractionType::LIGHT)
            {
                if throughput.is_finite() {
                    photons.push(Photon {
                        p: isect.geom.p,
                        throughput,
                        wi: -ray.dir(),
                        num_vertices: num_vertices + 1,
                    });
                }
            }

            let rr_prob = 0.5;
            if rng.next_f32() > rr_prob {
                break;
            }
            throughput /= rr_prob;

            geom = isect.geom;
            primitive = isect.primitive;
            ty = hit_ty.strip_emitter_flag();
            wi = Some(-ray.dir());
            num_vertices += 1;
        }
    }

    fn trace_photons(&self, scene: &dyn Scene, init_rng: &mut LcgRng) -> Vec<Photon> {
        let thread_count = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let seeds: Vec<u64> = (0..thread_count)
            .map(|_| init_rng.next_u32() as u64)
            .collect();

        let progress = ProgressBar::new(self.num_photon_trace_samples);
        progress.set_style(
            ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} photon paths")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        let next_sample = Arc::new(AtomicU64::new(0));
        let num_samples = self.num_photon_trace_samples;
        let max_num_vertices = self.max_num_vertices;
        let (sender, receiver) = mpsc::channel();

        thread::scope(|scope| {
            for seed in seeds {
                let next_sample = Arc::clone(&next_sample);
                let progress = progress.clone();
                let sender = sender.clone();
                scope.spawn(move || {
                    let mut rng = LcgRng::new(seed);
                    let mut local = Vec::new();
                    loop {
                        let begin = next_sample.fetch_add(PHOTON_CHUNK, Ordering::Relaxed);
                        if begin >= num_samples {
                            break;
                        }
                        let end = (begin + PHOTON_CHUNK).min(num_samples);
                        for _ in begin..end {
                            Self::trace_photon_path(scene, &mut rng, max_num_vertices, &mut local);
                        }
                        progress.inc(end - begin);
                    }
                    let _ = sender.send(local);
                });
            }
        });
        drop(sender);
        progress.finish_and_clear();

        let mut photons = Vec::new();
        for mut local in receiver {
            photons.append(&mut local);
        }
        photons
    }

    // Simpson kernel over the gathered disc. A cluster of coincident
    // photons can shrink the search radius all the way to zero; clamp
    // so the weight stays finite.
    fn kernel_weight(d2: Float, max_dist2: Float, num_photon_trace_samples: u64) -> Float {
        let r2 = max_dist2.max(EPSILON);
        let s = 1.0 - d2 / r2;
        3.0 * INV_PI * s * s / (r2 * num_photon_trace_samples as Float)
    }

    fn sample_eye_path(
        scene: &dyn Scene,
        film: &Film,
        rng: &mut LcgRng,
        pm: &dyn PhotonMap,
        max_num_vertices: i32,
        num_photon_trace_samples: u64,
        finalgather_setting: bool,
    ) {
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
            None => return,
        };

        let mut throughput = sensor.evaluate_position(&geom_e, false) / pdf_pos / pdf_sel;
        let mut primitive = sensor;
        let mut ty = SurfaceInteractionType::SENSOR;
        let mut geom = geom_e;
        let mut wi: Option<Vector3f> = None;
        let mut num_vertices = 1;
        // With final gathering off, the first diffuse or glossy vertex
        // estimates; otherwise the estimate waits for the next one.
        let mut gather = !finalgather_setting;
        let mut collected: Vec<Photon> = Vec::new();

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
            let hit_ty = isect.primitive.interaction_type();

            if hit_ty.contains(SurfaceInteractionType::LIGHT) {
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

            if (hit_ty.contains(SurfaceInteractionType::DIFFUSE)
                || hit_ty.contains(SurfaceInteractionType::GLOSSY))
                && !hit_ty.contains(SurfaceInteractionType::LIGHT)
            {
                if gather {
                    let max_dist2 = pm.collect_photons(
                        &isect.geom.p,
                        GATHER_NUM_PHOTONS,
                        GATHER_MAX_DIST2,
                        &mut collected,
                    );
                    let wi_e = -ray.dir();
                    for photon in &collected {
                        if max_num_vertices != -1
                            && num_vertices + photon.num_vertices > max_num_vertices
                        {
                            continue;
                        }

                        let weight = Self::kernel_weight(
                            (photon.p - isect.geom.p).norm_squared(),
                            max_dist2,
                            num_photon_trace_samples,
                        );
                        let fs_gather = isect.primitive.evaluate_direction(
                            &isect.geom,
                            SurfaceInteractionType::BSDF,
                            Some(&wi_e),
                            &photon.wi,
                            TransportDirection::EL,
                            true,
                        );
                        let contribution = throughput * fs_gather * photon.throughput * weight;
                        film.splat(&raster_pos, &contribution);
                    }

                    // The walk only survives the estimate through a
                    // specular component.
                    if !hit_ty.contains(SurfaceInteractionType::SPECULAR) {
                        break;
                    }
                }
                gather = true;
            }

            geom = isect.geom;
            primitive = isect.primitive;
            ty = hit_ty.strip_emitter_flag();
            wi = Some(-ray.dir());
            num_vertices += 1;
        }
    }
}

impl Renderer for PhotonMapper {
    fn render(&self, scene: &dyn Scene, film: &mut Film) {
        let mut pm = match photonmap::create(&self.photonmap_name) {
            Some(pm) => pm,
            // Validated at construction.
            None => return,
        };

        let mut init_rng = LcgRng::new(resolve_seed(self.seed));

        let photons = self.trace_photons(scene, &mut init_rng);
        log::info!(
            "Traced {} light paths, recorded {} photons",
            self.num_photon_trace_samples,
            photons.len()
        );
        pm.build(photons);

        let pm_ref: &dyn PhotonMap = pm.as_ref();
        let max_num_vertices = self.max_num_vertices;
        let num_photon_trace_samples = self.num_photon_trace_samples;
        let finalgather = self.finalgather;
        self.sched.process(scene, film, &mut init_rng, &move |scene, film, rng| {
            Self::sample_eye_path(
                scene,
                film,
                rng,
                pm_ref,
                max_num_vertices,
                num_photon_trace_samples,
                finalgather,
            );
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::{LambertMaterial, MirrorMaterial};
    use crate::math::spectrum::RGBSpectrum;
    use crate::primitives::{AreaLightPrimitive, PinholeCameraPrimitive, SurfacePrimitive};
    use crate::scenes::{SceneObject, SimpleScene};
    use crate::shapes::Rect;

    // Closed diffuse box, light on the ceiling, camera near the ceiling
    // looking straight down so only the floor fills the frustum.
    fn box_scene() -> SimpleScene {
        let white = RGBSpectrum::from_value(0.5);
        let diffuse = |origin, edge1, edge2| -> Box<dyn SceneObject> {
            Box::new(SurfacePrimitive::new(
                Rect::new(origin, edge1, edge2),
                Box::new(LambertMaterial::new(white)),
            ))
        };

        let objects: Vec<Box<dyn SceneObject>> = vec![
            // Floor, facing up.
            diffuse(
                Vector3f::new(0.0, 0.0, 0.0),
                Vector3f::new(0.0, 0.0, 2.0),
                Vector3f::new(2.0, 0.0, 0.0),
            ),
            // Ceiling, facing down.
            diffuse(
                Vector3f::new(0.0, 2.0, 0.0),
                Vector3f::new(2.0, 0.0, 0.0),
                Vector3f::new(0.0, 0.0, 2.0),
            ),
            // Walls.
            diffuse(
                Vector3f::new(0.0, 0.0, 2.0),
                Vector3f::new(0.0, 2.0, 0.0),
                Vector3f::new(2.0, 0.0, 0.0),
            ),
            diffuse(
                Vector3f::new(0.0, 0.0, 0.0),
                Vector3f::new(2.0, 0.0, 0.0),
                Vector3f::new(0.0, 2.0, 0.0),
            ),
            diffuse(
                Vector3f::new(0.0, 0.0, 0.0),
                Vector3f::new(0.0, 2.0, 0.0),
                Vector3f::new(0.0, 0.0, 2.0),
            ),
            diffuse(
                Vector3f::new(2.0, 0.0, 0.0),
                Vector3f::new(0.0, 0.0, 2.0),
                Vector3f::new(0.0, 2.0, 0.0),
            ),
            // Light patch just below the ceiling, emitting down.
            Box::new(AreaLightPrimitive::new(
                Rect::new(
                    Vector3f::new(0.75, 1.99, 0.75),
                    Vector3f::new(0.5, 0.0, 0.0),
                    Vector3f::new(0.0, 0.0, 0.5),
                ),
                RGBSpectrum::from_value(10.0),
                RGBSpectrum::default(),
            )),
        ];

        let sensor = Box::new(PinholeCameraPrimitive::new(
            Vector3f::new(1.0, 1.8, 1.0),
            Vector3f::new(1.0, 0.0, 1.0),
            Vector3f::new(0.0, 0.0, 1.0),
            40.0,
            1.0,
        ));
        SimpleScene::new(sensor, objects)
    }

    fn settings(max_num_vertices: &str, finalgather: &str) -> RenderSettings {
        let mut settings = RenderSettings::new();
        settings.set("max_num_vertices", max_num_vertices);
        settings.set("finalgather", finalgather);
        settings.set("num_photon_trace_samples", "50000");
        settings.set("num_samples", "50000");
        settings.set("seed", "23");
        settings
    }

    fn render_total(scene: &SimpleScene, settings: &RenderSettings) -> f32 {
        let renderer = PhotonMapper::new(settings).unwrap();
        let mut film = Film::new(4, 4);
        renderer.render(scene, &mut film);
        film.develop().total()[0]
    }

    // Photons carry at least two vertices, so with a budget of two no
    // gathered path fits and nothing else reaches the film.
    #[test]
    fn test_gather_respects_vertex_budget() {
        let scene = box_scene();
        let total = render_total(&scene, &settings("2", "0"));
        assert_eq!(total, 0.0);
    }

    #[test]
    fn test_gather_within_vertex_budget_contributes() {
        let scene = box_scene();
        let total = render_total(&scene, &settings("3", "0"));
        assert!(total > 0.0);
        assert!(total.is_finite());
    }

    // With a budget of three, gathering at the first floor vertex and
    // final gathering (which here degenerates to hitting the light after
    // one bounce) estimate the same direct illumination; the two modes
    // must agree.
    #[test]
    fn test_finalgather_estimate_is_consistent() {
        let scene = box_scene();
        let direct = render_total(&scene, &settings("3", "0"));
        let deferred = render_total(&scene, &settings("3", "1"));
        assert!(direct > 0.0);
        assert!(deferred > 0.0);
        let relative = (deferred - direct).abs() / direct;
        assert!(
            relative < 0.3,
            "direct = {}, deferred = {}, relative difference = {}",
            direct,
            deferred,
            relative
        );
    }

    // A mirror floor reflects every light path straight back onto the
    // lamp. Neither surface may store photons: the mirror is specular
    // and the lamp is an emitter, even though it also carries a diffuse
    // reflectance component.
    #[test]
    fn test_photons_are_not_recorded_on_emitter_surfaces() {
        let sensor = Box::new(PinholeCameraPrimitive::new(
            Vector3f::new(0.0, 1.0, -6.0),
            Vector3f::new(0.0, 1.0, 0.0),
            Vector3f::new(0.0, 1.0, 0.0),
            45.0,
            1.0,
        ));
        let objects: Vec<Box<dyn SceneObject>> = vec![
            // Mirror floor, facing up.
            Box::new(SurfacePrimitive::new(
                Rect::new(
                    Vector3f::new(-4.0, 0.0, -4.0),
                    Vector3f::new(0.0, 0.0, 8.0),
                    Vector3f::new(8.0, 0.0, 0.0),
                ),
                Box::new(MirrorMaterial::new(RGBSpectrum::from_value(1.0))),
            )),
            // Lamp above, emitting down.
            Box::new(AreaLightPrimitive::new(
                Rect::new(
                    Vector3f::new(-4.0, 2.0, -4.0),
                    Vector3f::new(8.0, 0.0, 0.0),
                    Vector3f::new(0.0, 0.0, 8.0),
                ),
                RGBSpectrum::from_value(5.0),
                RGBSpectrum::default(),
            )),
        ];
        let scene = SimpleScene::new(sensor, objects);

        let mut rng = LcgRng::new(3);
        let mut photons = Vec::new();
        for _ in 0..2000 {
            PhotonMapper::trace_photon_path(&scene, &mut rng, -1, &mut photons);
        }
        assert!(
            photons.is_empty(),
            "recorded {} photons with no scattering surface in the scene",
            photons.len()
        );
    }

    #[test]
    fn test_kernel_weight_survives_degenerate_radius() {
        let weight = PhotonMapper::kernel_weight(0.0, 0.0, 1000);
        assert!(weight.is_finite());
        assert!(weight > 0.0);

        // Regular radii are untouched by the clamp.
        let regular = PhotonMapper::kernel_weight(0.0, 0.01, 1000);
        assert!((regular - 3.0 * INV_PI / (0.01 * 1000.0)).abs() < 1e-6);
    }

    #[test]
    fn test_unbounded_render_terminates() {
        let scene = box_scene();
        let mut settings = settings("-1", "1");
        settings.set("num_photon_trace_samples", "5000");
        settings.set("num_samples", "2000");
        let total = render_total(&scene, &settings);
        assert!(total.is_finite());
        assert!(total > 0.0);
    }

    #[test]
    fn test_naive_and_kdtree_maps_both_render() {
        let scene = box_scene();
        let mut naive = settings("3", "0");
        naive.set("photonmap", "naive");
        naive.set("num_photon_trace_samples", "10000");
        naive.set("num_samples", "5000");
        let mut kdtree = settings("3", "0");
        kdtree.set("photonmap", "kdtree");
        kdtree.set("num_photon_trace_samples", "10000");
        kdtree.set("num_samples", "5000");

        let total_naive = render_total(&scene, &naive);
        let total_kdtree = render_total(&scene, &kdtree);
        assert!(total_naive > 0.0);
        assert!(total_kdtree > 0.0);
    }
}
