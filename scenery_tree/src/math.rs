// Copyright 2025 the Scenery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Small 3D math kit: vectors, TRS transforms, and affine maps.

use core::ops::{Add, Mul, Neg, Sub};

/// A 3D vector or point.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Vec3 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
}

impl Vec3 {
    /// `(0, 0, 0)`
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    /// `(1, 1, 1)`
    pub const ONE: Self = Self::new(1.0, 1.0, 1.0);

    /// Create a vector from components.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Create a vector from `[x, y, z]`.
    pub const fn from_array(v: [f64; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }

    /// Components as `[x, y, z]`.
    pub const fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Dot product.
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Euclidean length.
    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Distance between two points.
    pub fn distance(self, other: Self) -> f64 {
        (self - other).length()
    }

    /// Unit vector in the same direction, or `None` for a zero or non-finite vector.
    pub fn normalize(self) -> Option<Self> {
        let len = self.length();
        if len.is_finite() && len > f64::EPSILON {
            Some(self * (1.0 / len))
        } else {
            None
        }
    }
}

impl Add for Vec3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for Vec3 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

/// Local transform: translation, rotation as XYZ Euler angles in radians, and scale.
///
/// Applied as scale, then rotation, then translation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Transform3 {
    /// Offset from the parent origin.
    pub translation: Vec3,
    /// Euler angles (radians), composed as `Rx · Ry · Rz`.
    pub rotation: Vec3,
    /// Per-axis scale.
    pub scale: Vec3,
}

impl Transform3 {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Vec3::ZERO,
        scale: Vec3::ONE,
    };

    /// A pure translation.
    pub const fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }
}

impl Default for Transform3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// An affine map: a 3×3 linear part (row-major) followed by a translation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Affine3 {
    linear: [[f64; 3]; 3],
    translation: Vec3,
}

impl Affine3 {
    /// The identity map.
    pub const IDENTITY: Self = Self {
        linear: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        translation: Vec3::ZERO,
    };

    /// Build the matrix for a [`Transform3`].
    pub fn from_transform(t: &Transform3) -> Self {
        let (sx, cx) = t.rotation.x.sin_cos();
        let (sy, cy) = t.rotation.y.sin_cos();
        let (sz, cz) = t.rotation.z.sin_cos();
        // Rx · Ry · Rz
        let r = [
            [cy * cz, -cy * sz, sy],
            [cx * sz + sx * sy * cz, cx * cz - sx * sy * sz, -sx * cy],
            [sx * sz - cx * sy * cz, sx * cz + cx * sy * sz, cx * cy],
        ];
        let s = t.scale.to_array();
        let mut linear = [[0.0; 3]; 3];
        for (row, r_row) in linear.iter_mut().zip(r.iter()) {
            for ((cell, r), s) in row.iter_mut().zip(r_row).zip(s) {
                *cell = r * s;
            }
        }
        Self {
            linear,
            translation: t.translation,
        }
    }

    /// The translation part, i.e. where the local origin lands.
    pub fn translation(&self) -> Vec3 {
        self.translation
    }

    /// Map a point.
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        self.transform_vector(p) + self.translation
    }

    /// Map a direction (ignores translation).
    pub fn transform_vector(&self, v: Vec3) -> Vec3 {
        let [a, b, c] = self.linear;
        Vec3::new(
            a[0] * v.x + a[1] * v.y + a[2] * v.z,
            b[0] * v.x + b[1] * v.y + b[2] * v.z,
            c[0] * v.x + c[1] * v.y + c[2] * v.z,
        )
    }

    /// The inverse map, or `None` when the linear part is singular (e.g. a zero scale).
    pub fn inverse(&self) -> Option<Self> {
        let m = self.linear;
        let cof = [
            [
                m[1][1] * m[2][2] - m[1][2] * m[2][1],
                m[1][2] * m[2][0] - m[1][0] * m[2][2],
                m[1][0] * m[2][1] - m[1][1] * m[2][0],
            ],
            [
                m[0][2] * m[2][1] - m[0][1] * m[2][2],
                m[0][0] * m[2][2] - m[0][2] * m[2][0],
                m[0][1] * m[2][0] - m[0][0] * m[2][1],
            ],
            [
                m[0][1] * m[1][2] - m[0][2] * m[1][1],
                m[0][2] * m[1][0] - m[0][0] * m[1][2],
                m[0][0] * m[1][1] - m[0][1] * m[1][0],
            ],
        ];
        let det = m[0][0] * cof[0][0] + m[0][1] * cof[0][1] + m[0][2] * cof[0][2];
        if !det.is_finite() || det.abs() < 1e-12 {
            return None;
        }
        let inv_det = 1.0 / det;
        // Inverse is the transposed cofactor matrix over the determinant.
        let mut linear = [[0.0; 3]; 3];
        for (i, row) in linear.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = cof[j][i] * inv_det;
            }
        }
        let inv = Self {
            linear,
            translation: Vec3::ZERO,
        };
        Some(Self {
            linear,
            translation: -inv.transform_vector(self.translation),
        })
    }
}

impl Default for Affine3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Composition: `(a * b)(p) == a(b(p))`.
impl Mul for Affine3 {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        let mut linear = [[0.0; 3]; 3];
        for (i, row) in linear.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = (0..3).map(|k| self.linear[i][k] * rhs.linear[k][j]).sum();
            }
        }
        Self {
            linear,
            translation: self.transform_point(rhs.translation),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f64::consts::FRAC_PI_2;

    fn close(a: Vec3, b: Vec3) -> bool {
        a.distance(b) < 1e-9
    }

    #[test]
    fn rotation_about_y_maps_x_to_negative_z() {
        let t = Transform3 {
            rotation: Vec3::new(0.0, FRAC_PI_2, 0.0),
            ..Transform3::IDENTITY
        };
        let m = Affine3::from_transform(&t);
        assert!(close(m.transform_vector(Vec3::new(1.0, 0.0, 0.0)), Vec3::new(0.0, 0.0, -1.0)));
    }

    #[test]
    fn trs_applies_scale_then_rotation_then_translation() {
        let t = Transform3 {
            translation: Vec3::new(10.0, 0.0, 0.0),
            rotation: Vec3::new(0.0, 0.0, FRAC_PI_2),
            scale: Vec3::new(2.0, 1.0, 1.0),
        };
        let m = Affine3::from_transform(&t);
        // (1,0,0) → scale (2,0,0) → rotate about z (0,2,0) → translate (10,2,0)
        assert!(close(m.transform_point(Vec3::new(1.0, 0.0, 0.0)), Vec3::new(10.0, 2.0, 0.0)));
    }

    #[test]
    fn inverse_round_trips() {
        let t = Transform3 {
            translation: Vec3::new(1.0, -2.0, 3.0),
            rotation: Vec3::new(0.3, -1.1, 0.7),
            scale: Vec3::new(2.0, 0.5, 3.0),
        };
        let m = Affine3::from_transform(&t);
        let inv = m.inverse().expect("invertible");
        let p = Vec3::new(0.25, 4.0, -7.0);
        assert!(close(inv.transform_point(m.transform_point(p)), p));
        assert!(close((m * inv).transform_point(p), p));
    }

    #[test]
    fn zero_scale_is_singular() {
        let t = Transform3 {
            scale: Vec3::new(0.0, 1.0, 1.0),
            ..Transform3::IDENTITY
        };
        assert!(Affine3::from_transform(&t).inverse().is_none());
    }

    #[test]
    fn normalize_rejects_zero() {
        assert!(Vec3::ZERO.normalize().is_none());
        let n = Vec3::new(3.0, 0.0, 4.0).normalize().unwrap();
        assert!((n.length() - 1.0).abs() < 1e-12);
    }
}
