// Copyright @yucwang 2026

#![allow(dead_code)]

pub mod core;
pub mod io;
pub mod materials;
pub mod math;
pub mod photonmap;
pub mod primitives;
pub mod renderers;
pub mod scenes;
pub mod shapes;
