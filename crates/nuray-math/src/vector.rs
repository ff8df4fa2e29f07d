//! Cartesian 3-vector for positions, directions and polarizations.
//!
//! Convention: z points up, the ice surface sits at z = 0, spherical
//! angles are (zenith from +z, azimuth from +x toward +y).

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);
    pub const EZ: Vec3 = Vec3::new(0.0, 0.0, 1.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Vec3 { x, y, z }
    }

    /// Unit vector pointing along (zenith, azimuth).
    pub fn from_spherical(zenith: f64, azimuth: f64) -> Self {
        let (st, ct) = zenith.sin_cos();
        let (sp, cp) = azimuth.sin_cos();
        Vec3::new(st * cp, st * sp, ct)
    }

    pub fn dot(&self, other: &Vec3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: &Vec3) -> Vec3 {
        Vec3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn norm_squared(&self) -> f64 {
        self.dot(self)
    }

    pub fn norm(&self) -> f64 {
        self.norm_squared().sqrt()
    }

    /// Unit vector in the same direction. The zero vector stays zero.
    pub fn normalized(&self) -> Vec3 {
        let n = self.norm();
        if n > 0.0 {
            *self / n
        } else {
            Vec3::ZERO
        }
    }

    /// Zenith angle in [0, pi].
    pub fn zenith(&self) -> f64 {
        let n = self.norm();
        if n == 0.0 {
            return 0.0;
        }
        (self.z / n).clamp(-1.0, 1.0).acos()
    }

    /// Azimuth angle in [0, 2 pi).
    pub fn azimuth(&self) -> f64 {
        let phi = self.y.atan2(self.x);
        if phi < 0.0 {
            phi + 2.0 * PI
        } else {
            phi
        }
    }

    /// Opening angle between two vectors in [0, pi].
    pub fn angle_to(&self, other: &Vec3) -> f64 {
        let denom = self.norm() * other.norm();
        if denom == 0.0 {
            return 0.0;
        }
        (self.dot(other) / denom).clamp(-1.0, 1.0).acos()
    }

    /// Distance in the horizontal (x, y) plane.
    pub fn horizontal_distance(&self, other: &Vec3) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    pub fn distance(&self, other: &Vec3) -> f64 {
        (*self - *other).norm()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Local spherical unit vectors (e_r, e_theta, e_phi) at (zenith, azimuth).
pub fn spherical_basis(zenith: f64, azimuth: f64) -> [Vec3; 3] {
    let (st, ct) = zenith.sin_cos();
    let (sp, cp) = azimuth.sin_cos();
    [
        Vec3::new(st * cp, st * sp, ct),
        Vec3::new(ct * cp, ct * sp, -st),
        Vec3::new(-sp, cp, 0.0),
    ]
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, rhs: Vec3) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Vec3;
    fn mul(self, rhs: f64) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Mul<Vec3> for f64 {
    type Output = Vec3;
    fn mul(self, rhs: Vec3) -> Vec3 {
        rhs * self
    }
}

impl Div<f64> for Vec3 {
    type Output = Vec3;
    fn div(self, rhs: f64) -> Vec3 {
        Vec3::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}
