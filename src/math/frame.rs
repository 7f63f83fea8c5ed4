// Copyright @yucwang 2023

use crate::math::constants::Vector3f;

pub struct Frame {
    pub x: Vector3f,
    pub y: Vector3f,
    pub z: Vector3f
}

impl Frame {
    pub fn from_z(new_z: Vector3f) -> Frame {
        let up = if new_z.z.abs() < 0.999 {
            Vector3f::new(0.0, 0.0, 1.0)
        } else {
            Vector3f::new(1.0, 0.0, 0.0)
        };
        let x = new_z.cross(&up).normalize();
        let y = new_z.cross(&x);
        Frame { x, y, z: new_z }
    }

    pub fn to_local(&self, v: Vector3f) -> Vector3f {
        Vector3f::new(v.dot(&self.x), v.dot(&self.y), v.dot(&self.z))
    }

    pub fn from_local(&self, v: Vector3f) -> Vector3f {
        v.x * self.x + v.y * self.y + v.z * self.z
    }
}
