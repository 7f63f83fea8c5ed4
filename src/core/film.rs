// Copyright @yucwang 2026

use crate::math::bitmap::Bitmap;
use crate::math::constants::{Float, Vector2f};
use crate::math::spectrum::RGBSpectrum;
use std::sync::atomic::{AtomicU32, Ordering};

// Accumulation target for splatted estimates. Each channel is an f32
// stored as atomic bits so concurrent additive writes from worker threads
// need no locking; the sum is order-independent.
pub struct Film {
    width: usize,
    height: usize,
    pixels: Vec<AtomicU32>,
}

fn atomic_add_f32(slot: &AtomicU32, value: Float) {
    let mut current = slot.load(Ordering::Relaxed);
    loop {
        let updated = (f32::from_bits(current) + value).to_bits();
        match slot.compare_exchange_weak(current, updated, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => break,
            Err(actual) => current = actual,
        }
    }
}

impl Film {
    pub fn new(width: usize, height: usize) -> Self {
        let mut pixels = Vec::with_capacity(width * height * 3);
        for _ in 0..width * height * 3 {
            pixels.push(AtomicU32::new(0f32.to_bits()));
        }
        Self { width, height, pixels }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn num_pixels(&self) -> usize {
        self.width * self.height
    }

    // Raster positions live in [0,1)^2; out-of-range splats are dropped.
    pub fn splat(&self, raster_pos: &Vector2f, contribution: &RGBSpectrum) {
        if !(raster_pos.x >= 0.0 && raster_pos.x < 1.0 && raster_pos.y >= 0.0 && raster_pos.y < 1.0) {
            return;
        }

        let x = ((raster_pos.x * self.width as Float) as usize).min(self.width - 1);
        let y = ((raster_pos.y * self.height as Float) as usize).min(self.height - 1);
        let base = (x + y * self.width) * 3;
        let (r, g, b) = contribution.to_rgb();
        atomic_add_f32(&self.pixels[base], r);
        atomic_add_f32(&self.pixels[base + 1], g);
        atomic_add_f32(&self.pixels[base + 2], b);
    }

    // Single-threaded post-pass; must not overlap with splats.
    pub fn rescale(&mut self, factor: Float) {
        for slot in &mut self.pixels {
            let v = f32::from_bits(*slot.get_mut()) * factor;
            *slot.get_mut() = v.to_bits();
        }
    }

    pub fn develop(&self) -> Bitmap {
        let mut bitmap = Bitmap::new(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                let base = (x + y * self.width) * 3;
                let pixel = &mut bitmap[(x, y)];
                pixel[0] = f32::from_bits(self.pixels[base].load(Ordering::Relaxed));
                pixel[1] = f32::from_bits(self.pixels[base + 1].load(Ordering::Relaxed));
                pixel[2] = f32::from_bits(self.pixels[base + 2].load(Ordering::Relaxed));
            }
        }
        bitmap
    }
}

#[cfg(test)]
mod tests {
    use super::Film;
    use crate::math::constants::Vector2f;
    use crate::math::spectrum::RGBSpectrum;
    use std::thread;

    #[test]
    fn test_film_concurrent_splat_sums() {
        let film = Film::new(4, 4);
        let threads = 8;
        let splats_per_thread = 1000;

        thread::scope(|scope| {
            for _ in 0..threads {
                scope.spawn(|| {
                    for i in 0..splats_per_thread {
                        let rp = Vector2f::new(
                            ((i % 4) as f32 + 0.5) / 4.0,
                            ((i % 3) as f32 + 0.5) / 4.0,
                        );
                        film.splat(&rp, &RGBSpectrum::new(1.0, 0.5, 0.25));
                    }
                });
            }
        });

        let total = film.develop().total();
        let n = (threads * splats_per_thread) as f32;
        assert!((total[0] - n).abs() / n < 1e-4);
        assert!((total[1] - 0.5 * n).abs() / (0.5 * n) < 1e-4);
    }

    #[test]
    fn test_film_drops_out_of_raster_splats() {
        let film = Film::new(2, 2);
        film.splat(&Vector2f::new(1.5, 0.5), &RGBSpectrum::from_value(1.0));
        film.splat(&Vector2f::new(-0.1, 0.5), &RGBSpectrum::from_value(1.0));
        assert_eq!(film.develop().total()[0], 0.0);
    }

    #[test]
    fn test_film_rescale() {
        let mut film = Film::new(2, 1);
        film.splat(&Vector2f::new(0.25, 0.5), &RGBSpectrum::from_value(2.0));
        film.rescale(0.5);
        let bitmap = film.develop();
        assert!((bitmap[(0, 0)][0] - 1.0).abs() < 1e-6);
    }
}
