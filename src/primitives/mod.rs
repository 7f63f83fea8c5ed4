// Copyright @yucwang 2026

pub mod area_light;
pub mod pinhole;
pub mod surface;

pub use area_light::AreaLightPrimitive;
pub use pinhole::PinholeCameraPrimitive;
pub use surface::SurfacePrimitive;
