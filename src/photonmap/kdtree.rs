// Copyright @yucwang 2026

use super::{BoundedPhotonHeap, Photon, PhotonMap};
use crate::math::aabb::AABB;
use crate::math::constants::{Float, Vector3f};

const LEAF_NUM_PHOTONS: usize = 10;

enum KdNodeKind {
    Leaf { begin: usize, end: usize },
    Internal { child1: usize, child2: usize },
}

struct KdNode {
    bound: AABB,
    kind: KdNodeKind,
}

// Balanced-ish spatial partition over the photon positions: each node
// splits its bounding box at the centroid of the longest axis, stopping
// at small leaves. Nodes live in an arena and refer to each other by
// index; leaves reference a contiguous range of the reordered index
// array.
pub struct KdTreePhotonMap {
    nodes: Vec<KdNode>,
    indices: Vec<usize>,
    photons: Vec<Photon>,
}

impl KdTreePhotonMap {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            indices: Vec::new(),
            photons: Vec::new(),
        }
    }

    fn build_range(&mut self, begin: usize, end: usize) -> usize {
        let mut bound = AABB::default();
        for i in begin..end {
            bound.expand_by_point(&self.photons[self.indices[i]].p);
        }

        let idx = self.nodes.len();
        if end - begin < LEAF_NUM_PHOTONS {
            self.nodes.push(KdNode { bound, kind: KdNodeKind::Leaf { begin, end } });
            return idx;
        }

        let axis = bound.max_extent() as usize;
        let split = bound.center()[axis];

        // In-place partition into "< split" / ">= split".
        let mut mid = begin;
        for i in begin..end {
            if self.photons[self.indices[i]].p[axis] < split {
                self.indices.swap(i, mid);
                mid += 1;
            }
        }

        if mid == begin || mid == end {
            // All positions coincide on the split axis; subdividing
            // further cannot separate them.
            self.nodes.push(KdNode { bound, kind: KdNodeKind::Leaf { begin, end } });
            return idx;
        }

        self.nodes.push(KdNode { bound, kind: KdNodeKind::Internal { child1: 0, child2: 0 } });
        let child1 = self.build_range(begin, mid);
        let child2 = self.build_range(mid, end);
        self.nodes[idx].kind = KdNodeKind::Internal { child1, child2 };
        idx
    }

    fn collect(&self, idx: usize, p: &Vector3f, heap: &mut BoundedPhotonHeap<'_>) {
        let node = &self.nodes[idx];
        match node.kind {
            KdNodeKind::Leaf { begin, end } => {
                for i in begin..end {
                    let photon = &self.photons[self.indices[i]];
                    let d2 = (photon.p - p).norm_squared();
                    heap.offer(photon, d2);
                }
            }
            KdNodeKind::Internal { child1, child2 } => {
                let axis = node.bound.max_extent() as usize;
                let split = node.bound.center()[axis];
                let plane_d2 = (p[axis] - split) * (p[axis] - split);

                // Descend into the near side first; the far side only
                // matters while the splitting plane is inside the current
                // (possibly shrunk) radius.
                if p[axis] < split {
                    self.collect(child1, p, heap);
                    if plane_d2 < heap.max_dist2 {
                        self.collect(child2, p, heap);
                    }
                } else {
                    self.collect(child2, p, heap);
                    if plane_d2 < heap.max_dist2 {
                        self.collect(child1, p, heap);
                    }
                }
            }
        }
    }
}

impl Default for KdTreePhotonMap {
    fn default() -> Self {
        Self::new()
    }
}

impl PhotonMap for KdTreePhotonMap {
    fn build(&mut self, photons: Vec<Photon>) {
        self.photons = photons;
        self.nodes.clear();
        self.indices = (0..self.photons.len()).collect();
        self.build_range(0, self.photons.len());
        log::info!(
            "Built photon kd-tree: {} photons, {} nodes",
            self.photons.len(),
            self.nodes.len()
        );
    }

    fn collect_photons(
        &self,
        p: &Vector3f,
        n: usize,
        max_dist2: Float,
        collected: &mut Vec<Photon>,
    ) -> Float {
        let mut heap = BoundedPhotonHeap::new(collected, n, max_dist2);
        if !self.nodes.is_empty() {
            self.collect(0, p, &mut heap);
        }
        heap.max_dist2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::LcgRng;
    use crate::math::spectrum::RGBSpectrum;
    use crate::photonmap::NaivePhotonMap;

    fn random_photons(count: usize, seed: u64) -> Vec<Photon> {
        let mut rng = LcgRng::new(seed);
        (0..count)
            .map(|i| Photon {
                p: Vector3f::new(rng.next_f32() * 4.0, rng.next_f32() * 4.0, rng.next_f32() * 4.0),
                throughput: RGBSpectrum::from_value(rng.next_f32()),
                wi: Vector3f::new(0.0, 0.0, 1.0),
                num_vertices: 2 + (i % 4) as i32,
            })
            .collect()
    }

    fn sorted_dist2(collected: &[Photon], p: &Vector3f) -> Vec<Float> {
        let mut d: Vec<Float> = collected.iter().map(|ph| (ph.p - p).norm_squared()).collect();
        d.sort_by(|a, b| a.partial_cmp(b).unwrap());
        d
    }

    #[test]
    fn test_kdtree_matches_naive() {
        let photons = random_photons(500, 11);

        let mut naive = NaivePhotonMap::new();
        naive.build(photons.clone());
        let mut kdtree = KdTreePhotonMap::new();
        kdtree.build(photons);

        let mut rng = LcgRng::new(99);
        for n in [1usize, 5, 20, 600] {
            for _ in 0..20 {
                let q = Vector3f::new(
                    rng.next_f32() * 4.0,
                    rng.next_f32() * 4.0,
                    rng.next_f32() * 4.0,
                );

                let mut collected_naive = Vec::new();
                let mut collected_kdtree = Vec::new();
                let r_naive = naive.collect_photons(&q, n, Float::MAX, &mut collected_naive);
                let r_kdtree = kdtree.collect_photons(&q, n, Float::MAX, &mut collected_kdtree);

                assert_eq!(collected_naive.len(), collected_kdtree.len());
                assert_eq!(collected_kdtree.len(), n.min(500));
                assert!((r_naive - r_kdtree).abs() <= 1e-6 * r_naive.max(1.0));

                let dn = sorted_dist2(&collected_naive, &q);
                let dk = sorted_dist2(&collected_kdtree, &q);
                for (a, b) in dn.iter().zip(dk.iter()) {
                    assert!((a - b).abs() <= 1e-6);
                }
            }
        }
    }

    #[test]
    fn test_kdtree_bounded_radius() {
        let photons = random_photons(300, 3);
        let mut kdtree = KdTreePhotonMap::new();
        kdtree.build(photons);

        let q = Vector3f::new(2.0, 2.0, 2.0);
        let max_dist2 = 0.5;
        let mut collected = Vec::new();
        let final_r2 = kdtree.collect_photons(&q, 8, max_dist2, &mut collected);

        assert!(final_r2 <= max_dist2);
        assert!(collected.len() <= 8);
        for ph in &collected {
            assert!((ph.p - q).norm_squared() <= final_r2 + 1e-6);
        }
    }

    #[test]
    fn test_kdtree_build_order_independent() {
        let photons = random_photons(200, 7);
        let mut reversed = photons.clone();
        reversed.reverse();

        let mut forward = KdTreePhotonMap::new();
        forward.build(photons);
        let mut backward = KdTreePhotonMap::new();
        backward.build(reversed);

        let mut rng = LcgRng::new(5);
        for _ in 0..25 {
            let q = Vector3f::new(
                rng.next_f32() * 4.0,
                rng.next_f32() * 4.0,
                rng.next_f32() * 4.0,
            );
            let mut a = Vec::new();
            let mut b = Vec::new();
            forward.collect_photons(&q, 10, Float::MAX, &mut a);
            backward.collect_photons(&q, 10, Float::MAX, &mut b);
            let da = sorted_dist2(&a, &q);
            let db = sorted_dist2(&b, &q);
            assert_eq!(da.len(), db.len());
            for (x, y) in da.iter().zip(db.iter()) {
                assert!((x - y).abs() <= 1e-6);
            }
        }
    }

    #[test]
    fn test_kdtree_duplicate_positions_terminate() {
        let photon = Photon {
            p: Vector3f::new(1.0, 1.0, 1.0),
            throughput: RGBSpectrum::from_value(1.0),
            wi: Vector3f::new(0.0, 0.0, 1.0),
            num_vertices: 2,
        };
        let mut kdtree = KdTreePhotonMap::new();
        kdtree.build(vec![photon; 64]);

        let mut collected = Vec::new();
        kdtree.collect_photons(&Vector3f::new(1.0, 1.0, 1.0), 16, Float::MAX, &mut collected);
        assert_eq!(collected.len(), 16);
    }

    #[test]
    fn test_kdtree_empty_build() {
        let mut kdtree = KdTreePhotonMap::new();
        kdtree.build(Vec::new());
        let mut collected = Vec::new();
        let r2 = kdtree.collect_photons(&Vector3f::new(0.0, 0.0, 0.0), 4, 1.0, &mut collected);
        assert!(collected.is_empty());
        assert_eq!(r2, 1.0);
    }
}
