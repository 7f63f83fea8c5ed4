// Copyright @yucwang 2026

pub mod film;
pub mod geometry;
pub mod interaction;
pub mod primitive;
pub mod rng;
pub mod scene;
pub mod sched;
pub mod settings;
pub mod subpath;
