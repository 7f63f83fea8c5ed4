// Copyright @yucwang 2026

use crate::core::geometry::SurfaceGeometry;
use crate::core::interaction::{SurfaceInteractionType, TransportDirection};
use crate::core::primitive::Primitive;
use crate::core::rng::LcgRng;
use crate::core::scene::Scene;
use crate::math::constants::{Float, Vector2f, Vector3f, EPSILON};
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;

// Which random decision a coordinate drawn from the sampling source
// feeds. The indirection lets callers replay selected decisions (e.g.
// pin the sensor direction to a raster position) while every other draw
// stays random.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleUsage {
    Position,
    Direction,
    EmitterSelection,
    ComponentSelection,
}

#[derive(Clone, Copy)]
pub struct PathVertex<'a> {
    pub geom: SurfaceGeometry,
    pub primitive: Option<&'a dyn Primitive>,
    pub ty: SurfaceInteractionType,
}

// An already-traced tail of a subpath to resume from. `num_vertices`
// counts the vertices the tail contains; the walk reports throughput
// relative to the resumed endpoint.
pub struct RestartPoint<'a> {
    pub pv: PathVertex<'a>,
    pub ppv: Option<PathVertex<'a>>,
    pub num_vertices: i32,
}

// Trace a light or eye subpath with a live random stream. `on_vertex`
// receives `(num_vertices, raster_pos, prev, curr, throughput)` after
// each vertex and returns whether to keep walking. `max_num_vertices`
// of -1 means unbounded.
pub fn trace_subpath<'a, F>(
    scene: &'a dyn Scene,
    rng: &mut LcgRng,
    max_num_vertices: i32,
    trans_dir: TransportDirection,
    on_vertex: F,
) where
    F: FnMut(i32, &Vector2f, Option<&PathVertex<'a>>, &PathVertex<'a>, &RGBSpectrum) -> bool,
{
    trace_subpath_with_sampler(
        scene,
        None,
        max_num_vertices,
        trans_dir,
        |_, _, _, _| rng.next_f32(),
        on_vertex,
    );
}

// Identical walk, except the first direction sample is forced to
// reproduce `raster_pos` instead of being drawn freely.
pub fn trace_eye_subpath_fixed_raster_pos<'a, F>(
    scene: &'a dyn Scene,
    rng: &mut LcgRng,
    max_num_vertices: i32,
    raster_pos: &Vector2f,
    on_vertex: F,
) where
    F: FnMut(i32, &Vector2f, Option<&PathVertex<'a>>, &PathVertex<'a>, &RGBSpectrum) -> bool,
{
    trace_subpath_with_sampler(
        scene,
        None,
        max_num_vertices,
        TransportDirection::EL,
        |_, primitive, usage, index| {
            if let Some(primitive) = primitive {
                if primitive.interaction_type().contains(SurfaceInteractionType::SENSOR)
                    && usage == SampleUsage::Direction
                {
                    return raster_pos[index];
                }
            }
            rng.next_f32()
        },
        on_vertex,
    );
}

// Resume a walk from an existing two-vertex tail, continuing the same
// step bookkeeping.
pub fn trace_subpath_from_endpoint<'a, F>(
    scene: &'a dyn Scene,
    rng: &mut LcgRng,
    pv: &PathVertex<'a>,
    ppv: Option<&PathVertex<'a>>,
    num_vertices: i32,
    max_num_vertices: i32,
    trans_dir: TransportDirection,
    on_vertex: F,
) where
    F: FnMut(i32, &Vector2f, Option<&PathVertex<'a>>, &PathVertex<'a>, &RGBSpectrum) -> bool,
{
    trace_subpath_with_sampler(
        scene,
        Some(RestartPoint { pv: *pv, ppv: ppv.copied(), num_vertices }),
        max_num_vertices,
        trans_dir,
        |_, _, _, _| rng.next_f32(),
        on_vertex,
    );
}

// Fully generic walk: the sampling source itself is injected.
// `sample_next(num_vertices, primitive, usage, index)` must return a
// value in [0,1).
pub fn trace_subpath_with_sampler<'a, S, F>(
    scene: &'a dyn Scene,
    restart: Option<RestartPoint<'a>>,
    max_num_vertices: i32,
    trans_dir: TransportDirection,
    mut sample_next: S,
    mut on_vertex: F,
) where
    S: FnMut(i32, Option<&dyn Primitive>, SampleUsage, usize) -> Float,
    F: FnMut(i32, &Vector2f, Option<&PathVertex<'a>>, &PathVertex<'a>, &RGBSpectrum) -> bool,
{
    let restarted = restart.is_some();
    let (mut pv, mut ppv, init_step) = match restart {
        Some(r) => (Some(r.pv), r.ppv, r.num_vertices),
        None => (None, None, 0),
    };

    let mut init_dir = None;
    let mut throughput = if restarted {
        RGBSpectrum::from_value(1.0)
    } else {
        RGBSpectrum::default()
    };
    let mut raster_pos = Vector2f::new(0.0, 0.0);

    let mut step = init_step;
    while max_num_vertices == -1 || step < max_num_vertices {
        if step == 0 {
            // Initial vertex: importance-sample an emitter (or sensor),
            // then a joint position and outgoing direction on it.
            let u_pos = {
                let u1 = sample_next(step + 1, None, SampleUsage::Position, 0);
                let u2 = sample_next(step + 1, None, SampleUsage::Position, 1);
                Vector2f::new(u1, u2)
            };
            let u_sel = sample_next(step + 1, None, SampleUsage::EmitterSelection, 0);

            let ty = match trans_dir {
                TransportDirection::LE => SurfaceInteractionType::LIGHT,
                TransportDirection::EL => SurfaceInteractionType::SENSOR,
            };
            let primitive = match scene.sample_emitter(ty, u_sel) {
                Some(primitive) => primitive,
                None => break,
            };

            let u_dir = {
                let u1 = sample_next(step + 1, Some(primitive), SampleUsage::Direction, 0);
                let u2 = sample_next(step + 1, Some(primitive), SampleUsage::Direction, 1);
                Vector2f::new(u1, u2)
            };
            let _u_comp = sample_next(step + 1, None, SampleUsage::ComponentSelection, 0);

            let (geom, wo) = primitive.sample_position_and_direction(&u_dir, &u_pos);

            let pdf_pos = primitive.evaluate_position_given_direction_pdf(&geom, &wo, false);
            let pdf_sel = scene.evaluate_emitter_pdf(primitive);
            assert!(pdf_pos > 0.0, "position density must be positive");
            assert!(pdf_sel > 0.0, "emitter selection density must be positive");
            throughput = primitive.evaluate_position(&geom, false) / pdf_pos / pdf_sel;

            if trans_dir == TransportDirection::EL {
                raster_pos = match primitive.raster_position(&wo, &geom) {
                    Some(rp) => rp,
                    // Numerical failure to project; contribute nothing.
                    None => break,
                };
            }

            let v = PathVertex { geom, primitive: Some(primitive), ty };
            if !on_vertex(step + 1, &raster_pos, None, &v, &throughput) {
                break;
            }

            pv = Some(v);
            init_dir = Some(wo);
        } else {
            let current = match pv {
                Some(v) => v,
                None => break,
            };
            let primitive = match current.primitive {
                Some(primitive) => primitive,
                None => break,
            };

            // Choose the next outgoing direction.
            let mut wi: Option<Vector3f> = None;
            let wo;
            if step == 1 && restarted && init_step == 1 {
                // Resumed directly behind an endpoint: the direction must
                // be drawn from the endpoint's own distribution.
                let u_dir = {
                    let u1 = sample_next(step + 1, Some(primitive), SampleUsage::Direction, 0);
                    let u2 = sample_next(step + 1, Some(primitive), SampleUsage::Direction, 1);
                    Vector2f::new(u1, u2)
                };
                let u_comp = sample_next(step + 1, Some(primitive), SampleUsage::ComponentSelection, 0);
                wo = match primitive.sample_direction(&u_dir, u_comp, current.ty, &current.geom, None) {
                    Some(wo) => wo,
                    None => break,
                };
            } else if step == 1 {
                // Fresh walk: the initial direction came from the joint
                // position-direction sample.
                wo = match init_dir {
                    Some(dir) => dir,
                    None => break,
                };
            } else {
                let prev = match ppv {
                    Some(prev) => prev,
                    None => break,
                };
                let incident = (prev.geom.p - current.geom.p).normalize();
                wi = Some(incident);
                let u_dir = {
                    let u1 = sample_next(step + 1, Some(primitive), SampleUsage::Direction, 0);
                    let u2 = sample_next(step + 1, Some(primitive), SampleUsage::Direction, 1);
                    Vector2f::new(u1, u2)
                };
                let u_comp = sample_next(step + 1, Some(primitive), SampleUsage::ComponentSelection, 0);
                wo = match primitive.sample_direction(&u_dir, u_comp, current.ty, &current.geom, wi.as_ref()) {
                    Some(wo) => wo,
                    None => break,
                };
            }

            // Evaluate the scattering value before the density: a black
            // value terminates the walk without touching the division.
            let fs = primitive.evaluate_direction(&current.geom, current.ty, wi.as_ref(), &wo, trans_dir, false);
            if fs.is_black() {
                break;
            }
            let pdf_dir = primitive.evaluate_direction_pdf(&current.geom, current.ty, wi.as_ref(), &wo, false);
            assert!(pdf_dir > 0.0, "direction density must be positive for a non-black value");
            throughput *= fs / pdf_dir;

            let ray = Ray3f::new(current.geom.p, wo, Some(EPSILON), None);
            let isect = match scene.intersect(&ray) {
                Some(isect) => isect,
                None => break,
            };

            let v = PathVertex {
                geom: isect.geom,
                primitive: Some(isect.primitive),
                ty: isect.primitive.interaction_type().strip_emitter_flag(),
            };
            if !on_vertex(step + 1, &raster_pos, Some(&current), &v, &throughput) {
                break;
            }

            if isect.geom.infinite {
                break;
            }

            ppv = pv;
            pv = Some(v);
        }

        step += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::LambertMaterial;
    use crate::math::constants::Vector3f;
    use crate::primitives::{PinholeCameraPrimitive, SurfacePrimitive};
    use crate::scenes::{SceneObject, SimpleScene};
    use crate::shapes::Rect;

    // Camera staring at a wall that absorbs everything it receives.
    fn absorbing_scene() -> SimpleScene {
        let sensor = Box::new(PinholeCameraPrimitive::new(
            Vector3f::new(0.0, 0.0, 0.0),
            Vector3f::new(0.0, 0.0, 1.0),
            Vector3f::new(0.0, 1.0, 0.0),
            45.0,
            1.0,
        ));
        let wall: Box<dyn SceneObject> = Box::new(SurfacePrimitive::new(
            Rect::new(
                Vector3f::new(-8.0, -8.0, 2.0),
                Vector3f::new(0.0, 16.0, 0.0),
                Vector3f::new(16.0, 0.0, 0.0),
            ),
            Box::new(LambertMaterial::new(RGBSpectrum::default())),
        ));
        SimpleScene::new(sensor, vec![wall])
    }

    #[test]
    fn test_walk_respects_vertex_budget() {
        let scene = SimpleScene::cornell_box(1.0);
        let mut rng = LcgRng::new(5);
        for _ in 0..64 {
            let mut max_seen = 0;
            trace_subpath(&scene, &mut rng, 5, TransportDirection::EL, |nv, _, _, _, _| {
                max_seen = max_seen.max(nv);
                true
            });
            assert!(max_seen >= 1);
            assert!(max_seen <= 5);
        }
    }

    #[test]
    fn test_light_walk_starts_on_light() {
        let scene = SimpleScene::cornell_box(1.0);
        let mut rng = LcgRng::new(9);
        let mut num_endpoints = 0;
        for _ in 0..16 {
            trace_subpath(&scene, &mut rng, 3, TransportDirection::LE, |nv, _, prev, v, throughput| {
                if nv == 1 {
                    assert!(prev.is_none());
                    assert!(v.ty.contains(SurfaceInteractionType::LIGHT));
                    assert!(!throughput.is_black());
                    num_endpoints += 1;
                }
                true
            });
        }
        assert_eq!(num_endpoints, 16);
    }

    #[test]
    fn test_fixed_raster_walk_reproduces_raster_position() {
        let scene = SimpleScene::cornell_box(1.0);
        let mut rng = LcgRng::new(17);
        let target = Vector2f::new(0.3, 0.7);
        let mut num_vertices = 0;
        trace_eye_subpath_fixed_raster_pos(&scene, &mut rng, 2, &target, |_, raster, _, _, _| {
            assert!((raster.x - target.x).abs() < 1e-3);
            assert!((raster.y - target.y).abs() < 1e-3);
            num_vertices += 1;
            true
        });
        assert_eq!(num_vertices, 2);
    }

    #[test]
    fn test_restarted_walk_continues_vertex_numbering() {
        let scene = SimpleScene::cornell_box(1.0);
        let mut rng = LcgRng::new(21);

        let mut vertices: Vec<PathVertex<'_>> = Vec::new();
        trace_subpath(&scene, &mut rng, 2, TransportDirection::EL, |_, _, _, v, _| {
            vertices.push(*v);
            true
        });
        assert_eq!(vertices.len(), 2);

        let mut first_resumed = None;
        trace_subpath_from_endpoint(
            &scene,
            &mut rng,
            &vertices[1],
            Some(&vertices[0]),
            2,
            4,
            TransportDirection::EL,
            |nv, _, _, _, _| {
                if first_resumed.is_none() {
                    first_resumed = Some(nv);
                }
                true
            },
        );
        assert_eq!(first_resumed, Some(3));
    }

    // No Russian roulette inside the walk; an unbounded budget must still
    // terminate once the path hits a black surface.
    #[test]
    fn test_unbounded_walk_stops_at_absorbing_surface() {
        let scene = absorbing_scene();
        let mut rng = LcgRng::new(33);
        for _ in 0..16 {
            let mut max_seen = 0;
            trace_subpath(&scene, &mut rng, -1, TransportDirection::EL, |nv, _, _, _, _| {
                max_seen = max_seen.max(nv);
                true
            });
            assert_eq!(max_seen, 2);
        }
    }

    #[test]
    fn test_walk_stops_when_callback_declines() {
        let scene = SimpleScene::cornell_box(1.0);
        let mut rng = LcgRng::new(41);
        let mut num_callbacks = 0;
        trace_subpath(&scene, &mut rng, 8, TransportDirection::EL, |_, _, _, _, _| {
            num_callbacks += 1;
            false
        });
        assert_eq!(num_callbacks, 1);
    }
}
