//! Vertex and triangle types plus the normal math used by the writers.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Neg, Sub};
use tracing::trace;

/// A single-precision vector in 3D space. Used for both vertices and normals.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn dot(&self, other: &Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: &Self) -> Self {
        Self {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn length(&self) -> f32 {
        vector_length(*self)
    }

    pub fn to_array(&self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[f32; 3]> for Vec3 {
    fn from(arr: [f32; 3]) -> Self {
        Self::new(arr[0], arr[1], arr[2])
    }
}

impl From<(f32, f32, f32)> for Vec3 {
    fn from((x, y, z): (f32, f32, f32)) -> Self {
        Self::new(x, y, z)
    }
}

impl Add for Vec3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self::Output {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Div<f32> for Vec3 {
    type Output = Self;
    fn div(self, rhs: f32) -> Self::Output {
        Self::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

impl Neg for Vec3 {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Self::new(-self.x, -self.y, -self.z)
    }
}

/// Three ordered vertices. The winding order decides the sign of the computed normal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    pub vertices: [Vec3; 3],
}

impl Triangle {
    pub fn new(v0: [f32; 3], v1: [f32; 3], v2: [f32; 3]) -> Self {
        Self {
            vertices: [v0.into(), v1.into(), v2.into()],
        }
    }

    /// The same triangle with the opposite winding.
    pub fn reversed(&self) -> Self {
        let [v0, v1, v2] = self.vertices;
        Self {
            vertices: [v0, v2, v1],
        }
    }

    pub fn normal(&self) -> Vec3 {
        calc_normal(self)
    }
}

impl From<[[f32; 3]; 3]> for Triangle {
    fn from([v0, v1, v2]: [[f32; 3]; 3]) -> Self {
        Self::new(v0, v1, v2)
    }
}

impl From<[Vec3; 3]> for Triangle {
    fn from(vertices: [Vec3; 3]) -> Self {
        Self { vertices }
    }
}

/// A triangle paired with the normal that will be written for it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Facet {
    pub normal: Vec3,
    pub triangle: Triangle,
}

fn widen(v: Vec3) -> [f64; 3] {
    [v.x as f64, v.y as f64, v.z as f64]
}

fn length_f64([x, y, z]: [f64; 3]) -> f64 {
    (x * x + y * y + z * z).sqrt()
}

fn unit_f64(v: [f64; 3]) -> Option<Vec3> {
    let len = length_f64(v);
    if len == 0.0 || !len.is_finite() {
        return None;
    }
    Some(Vec3::new(
        (v[0] / len) as f32,
        (v[1] / len) as f32,
        (v[2] / len) as f32,
    ))
}

/// Euclidean norm of `v`. Squares are summed in f64, so no f32 input overflows.
pub fn vector_length(v: Vec3) -> f32 {
    length_f64(widen(v)) as f32
}

/// `v` scaled to unit length, or `None` when its length is zero or not finite.
pub fn try_unit_vector(v: Vec3) -> Option<Vec3> {
    unit_f64(widen(v))
}

/// `v` scaled to unit length.
///
/// A zero-length (or non-finite) input yields [`Vec3::ZERO`] rather than an error, so a
/// degenerate triangle is written with a zero normal. Use [`try_unit_vector`] to detect
/// that case.
pub fn unit_vector(v: Vec3) -> Vec3 {
    try_unit_vector(v).unwrap_or_else(|| {
        trace!(?v, "degenerate vector, using zero normal");
        Vec3::ZERO
    })
}

/// Right-hand-rule unit normal of `triangle`: `(v1 - v0) x (v2 - v0)`, normalized.
///
/// Edges, cross product and length are computed in f64 and only the unit vector is
/// narrowed, so any triangle with f32 vertices and nonzero area gets a unit normal.
pub fn calc_normal(triangle: &Triangle) -> Vec3 {
    let [v0, v1, v2] = triangle.vertices.map(widen);
    let u = [v1[0] - v0[0], v1[1] - v0[1], v1[2] - v0[2]];
    let v = [v2[0] - v0[0], v2[1] - v0[1], v2[2] - v0[2]];
    let n = [
        u[1] * v[2] - u[2] * v[1],
        u[2] * v[0] - u[0] * v[2],
        u[0] * v[1] - u[1] * v[0],
    ];
    unit_f64(n).unwrap_or_else(|| {
        trace!(?triangle, "degenerate triangle, using zero normal");
        Vec3::ZERO
    })
}
