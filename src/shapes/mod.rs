// Copyright @yucwang 2026

pub mod rect;

pub use rect::Rect;
