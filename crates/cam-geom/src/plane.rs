use serde::{Deserialize, Serialize};

use super::point::Point3d;
use super::vector::Vec3;

/// An oriented plane through `origin` with unit `normal`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    pub origin: Point3d,
    pub normal: Vec3,
}

impl Plane {
    /// Build a plane, normalizing `normal`. `None` if the normal is degenerate.
    pub fn new(origin: Point3d, normal: Vec3) -> Option<Self> {
        Some(Self {
            origin,
            normal: normal.normalized()?,
        })
    }

    pub fn signed_distance(&self, p: &Point3d) -> f64 {
        (*p - self.origin).dot(&self.normal)
    }

    pub fn project_point(&self, p: &Point3d) -> Point3d {
        *p - self.normal * self.signed_distance(p)
    }

    /// Same plane with the normal flipped.
    pub fn reversed(&self) -> Self {
        Self {
            origin: self.origin,
            normal: -self.normal,
        }
    }
}

/// An infinite line through `origin` along unit `direction`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub origin: Point3d,
    pub direction: Vec3,
}

impl Line {
    pub fn new(origin: Point3d, direction: Vec3) -> Option<Self> {
        Some(Self {
            origin,
            direction: direction.normalized()?,
        })
    }

    /// Signed coordinate of the orthogonal projection of `p` along the line.
    pub fn parameter_of(&self, p: &Point3d) -> f64 {
        (*p - self.origin).dot(&self.direction)
    }

    pub fn point_at(&self, t: f64) -> Point3d {
        self.origin + self.direction * t
    }

    pub fn project_point(&self, p: &Point3d) -> Point3d {
        self.point_at(self.parameter_of(p))
    }
}
