// Copyright @yucwang 2026

pub mod simple;

pub use simple::{SceneObject, SimpleScene};
