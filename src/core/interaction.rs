// Copyright @yucwang 2026

use std::ops;

// Bitmask tag of how a path vertex interacts with light: emitters,
// sensors and the BSDF component classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceInteractionType(u8);

impl SurfaceInteractionType {
    pub const NONE: Self = Self(0);
    pub const LIGHT: Self = Self(1 << 0);
    pub const SENSOR: Self = Self(1 << 1);
    pub const DIFFUSE: Self = Self(1 << 2);
    pub const GLOSSY: Self = Self(1 << 3);
    pub const SPECULAR: Self = Self(1 << 4);
    pub const EMITTER_FLAG: Self = Self(1 << 5);

    pub const BSDF: Self = Self(Self::DIFFUSE.0 | Self::GLOSSY.0 | Self::SPECULAR.0);
    pub const EMITTER: Self = Self(Self::LIGHT.0 | Self::SENSOR.0);

    pub fn contains(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }

    pub fn strip_emitter_flag(self) -> Self {
        Self(self.0 & !Self::EMITTER_FLAG.0)
    }
}

impl ops::BitOr for SurfaceInteractionType {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl ops::BitOrAssign for SurfaceInteractionType {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportDirection {
    // Light to eye (importance transport).
    LE,
    // Eye to light (radiance transport).
    EL,
}
