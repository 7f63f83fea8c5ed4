// Copyright @yucwang 2026

use super::{BoundedPhotonHeap, Photon, PhotonMap};
use crate::math::constants::{Float, Vector3f};

// Reference implementation: linear scan over the stored photon list.
pub struct NaivePhotonMap {
    photons: Vec<Photon>,
}

impl NaivePhotonMap {
    pub fn new() -> Self {
        Self { photons: Vec::new() }
    }
}

impl Default for NaivePhotonMap {
    fn default() -> Self {
        Self::new()
    }
}

impl PhotonMap for NaivePhotonMap {
    fn build(&mut self, photons: Vec<Photon>) {
        self.photons = photons;
    }

    fn collect_photons(
        &self,
        p: &Vector3f,
        n: usize,
        max_dist2: Float,
        collected: &mut Vec<Photon>,
    ) -> Float {
        let mut heap = BoundedPhotonHeap::new(collected, n, max_dist2);
        for photon in &self.photons {
            let d2 = (photon.p - p).norm_squared();
            heap.offer(photon, d2);
        }
        heap.max_dist2
    }
}
