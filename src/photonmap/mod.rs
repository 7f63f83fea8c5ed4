// Copyright @yucwang 2026

pub mod kdtree;
pub mod naive;

pub use kdtree::KdTreePhotonMap;
pub use naive::NaivePhotonMap;

use crate::math::constants::{Float, Vector3f};
use crate::math::spectrum::RGBSpectrum;

// A recorded light-subpath interaction usable for density estimation.
// Producers must never record a photon with non-finite throughput.
#[derive(Debug, Clone, Copy)]
pub struct Photon {
    pub p: Vector3f,
    pub throughput: RGBSpectrum,
    pub wi: Vector3f,
    pub num_vertices: i32,
}

// Spatial index over a fixed photon set. `build` happens once and takes
// ownership; queries are read-only and safe to run concurrently.
pub trait PhotonMap: Send + Sync {
    fn build(&mut self, photons: Vec<Photon>);

    // Collect at most `n` photons within squared distance `max_dist2` of
    // `p` into `collected`, returning the (possibly shrunk) final squared
    // search radius. When full, `collected` is heap-ordered with the
    // farthest photon first; callers must not assume distance order.
    fn collect_photons(
        &self,
        p: &Vector3f,
        n: usize,
        max_dist2: Float,
        collected: &mut Vec<Photon>,
    ) -> Float;
}

pub fn create(name: &str) -> Option<Box<dyn PhotonMap>> {
    match name {
        "naive" => Some(Box::new(NaivePhotonMap::new())),
        "kdtree" => Some(Box::new(KdTreePhotonMap::new())),
        _ => None,
    }
}

// Bounded max-heap on squared distance, written straight into the
// caller's output vector. Until the heap is full every in-radius
// candidate is accepted; afterwards a closer candidate evicts the
// current farthest one and the search radius shrinks to the new root.
pub(crate) struct BoundedPhotonHeap<'a> {
    collected: &'a mut Vec<Photon>,
    dist2: Vec<Float>,
    capacity: usize,
    pub max_dist2: Float,
}

impl<'a> BoundedPhotonHeap<'a> {
    pub fn new(collected: &'a mut Vec<Photon>, capacity: usize, max_dist2: Float) -> Self {
        collected.clear();
        Self {
            collected,
            dist2: Vec::with_capacity(capacity),
            capacity,
            max_dist2,
        }
    }

    pub fn offer(&mut self, photon: &Photon, d2: Float) {
        if self.capacity == 0 || d2 >= self.max_dist2 {
            return;
        }

        if self.collected.len() < self.capacity {
            self.collected.push(*photon);
            self.dist2.push(d2);
            self.sift_up(self.collected.len() - 1);
            if self.collected.len() == self.capacity {
                self.max_dist2 = self.dist2[0];
            }
        } else {
            self.collected[0] = *photon;
            self.dist2[0] = d2;
            self.sift_down(0);
            self.max_dist2 = self.dist2[0];
        }
    }

    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let parent = (i - 1) / 2;
            if self.dist2[i] <= self.dist2[parent] {
                break;
            }
            self.dist2.swap(i, parent);
            self.collected.swap(i, parent);
            i = parent;
        }
    }

    fn sift_down(&mut self, mut i: usize) {
        let len = self.dist2.len();
        loop {
            let left = 2 * i + 1;
            let right = 2 * i + 2;
            let mut largest = i;
            if left < len && self.dist2[left] > self.dist2[largest] {
                largest = left;
            }
            if right < len && self.dist2[right] > self.dist2[largest] {
                largest = right;
            }
            if largest == i {
                break;
            }
            self.dist2.swap(i, largest);
            self.collected.swap(i, largest);
            i = largest;
        }
    }
}
