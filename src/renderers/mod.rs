// Copyright @yucwang 2026

pub mod light_tracer;
pub mod path_tracer;
pub mod photon_mapper;

pub use light_tracer::LightTracer;
pub use path_tracer::PathTracer;
pub use photon_mapper::PhotonMapper;

use crate::core::film::Film;
use crate::core::scene::Scene;
use crate::core::settings::{RenderSettings, SettingsError};
use std::time::{SystemTime, UNIX_EPOCH};

pub trait Renderer {
    fn render(&self, scene: &dyn Scene, film: &mut Film);
}

pub fn create(name: &str, settings: &RenderSettings) -> Result<Box<dyn Renderer>, SettingsError> {
    match name {
        "pt" => Ok(Box::new(PathTracer::new(settings)?)),
        "lt" => Ok(Box::new(LightTracer::new(settings)?)),
        "pm" => Ok(Box::new(PhotonMapper::new(settings)?)),
        _ => Err(SettingsError::Parse(format!("unknown renderer: {}", name))),
    }
}

// An absent seed means a fresh one per render.
pub(crate) fn resolve_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos() as u64
    })
}
