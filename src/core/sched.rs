// Copyright @yucwang 2026

use crate::core::film::Film;
use crate::core::rng::LcgRng;
use crate::core::scene::Scene;
use crate::core::settings::{RenderSettings, SettingsError};
use crate::math::constants::Float;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

const SAMPLE_CHUNK: u64 = 10000;

pub type SampleFn<'a> = dyn Fn(&dyn Scene, &Film, &mut LcgRng) + Sync + 'a;

// Sample-based work distribution: a fixed number of independent image
// samples spread over a scoped thread pool. Each worker owns a random
// stream seeded once from the master stream and claims chunks off a
// shared counter; the film is rescaled afterwards so pixel values
// estimate radiance.
pub struct SampleScheduler {
    num_samples: u64,
}

impl SampleScheduler {
    pub fn new(num_samples: u64) -> Self {
        Self { num_samples: num_samples.max(1) }
    }

    pub fn load(settings: &RenderSettings) -> Result<Self, SettingsError> {
        let num_samples = settings.uint_or("num_samples", 1000000)?;
        Ok(Self::new(num_samples))
    }

    pub fn num_samples(&self) -> u64 {
        self.num_samples
    }

    pub fn process(
        &self,
        scene: &dyn Scene,
        film: &mut Film,
        init_rng: &mut LcgRng,
        sample_fn: &SampleFn<'_>,
    ) {
        let thread_count = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let seeds: Vec<u64> = (0..thread_count)
            .map(|_| init_rng.next_u32() as u64)
            .collect();

        let progress = ProgressBar::new(self.num_samples);
        progress.set_style(
            ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} samples")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        let next_sample = Arc::new(AtomicU64::new(0));
        let num_samples = self.num_samples;
        let film_ref: &Film = film;

        thread::scope(|scope| {
            for seed in seeds {
                let next_sample = Arc::clone(&next_sample);
                let progress = progress.clone();
                scope.spawn(move || {
                    let mut rng = LcgRng::new(seed);
                    loop {
                        let begin = next_sample.fetch_add(SAMPLE_CHUNK, Ordering::Relaxed);
                        if begin >= num_samples {
                            break;
                        }
                        let end = (begin + SAMPLE_CHUNK).min(num_samples);
                        for _ in begin..end {
                            sample_fn(scene, film_ref, &mut rng);
                        }
                        progress.inc(end - begin);
                    }
                });
            }
        });

        progress.finish_and_clear();

        // Each sample covers 1/num_pixels of the raster on average.
        let factor = film.num_pixels() as Float / self.num_samples as Float;
        film.rescale(factor);
        log::info!("Processed {} samples", self.num_samples);
    }
}
