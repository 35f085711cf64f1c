use nalgebra::{Matrix3, Matrix4, Rotation3, Unit, Vector3};
use serde::{Deserialize, Serialize};

use super::point::Point3d;
use super::vector::Vec3;

/// A 4x4 homogeneous affine transformation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    m: Matrix4<f64>,
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            m: Matrix4::identity(),
        }
    }

    pub fn from_matrix(m: Matrix4<f64>) -> Self {
        Self { m }
    }

    pub fn translation(v: Vec3) -> Self {
        Self {
            m: Matrix4::new_translation(&v.to_na()),
        }
    }

    pub fn uniform_scaling(s: f64) -> Self {
        Self {
            m: Matrix4::new_nonuniform_scaling(&Vector3::new(s, s, s)),
        }
    }

    /// Rotation around an axis through the origin. `None` for a zero axis.
    pub fn rotation_axis_angle(axis: Vec3, angle: f64) -> Option<Self> {
        let axis = Unit::try_new(axis.to_na(), 1e-15)?;
        Some(Self {
            m: Rotation3::from_axis_angle(&axis, angle).to_homogeneous(),
        })
    }

    /// Rotation (applied first) followed by translation.
    pub fn from_rotation_translation(rotation: &Matrix3<f64>, translation: Vec3) -> Self {
        let mut m = rotation.to_homogeneous();
        m.fixed_view_mut::<3, 1>(0, 3).copy_from(&translation.to_na());
        Self { m }
    }

    /// `self ∘ inner`: applies `inner` first, then `self`.
    pub fn compose(&self, inner: &Transform) -> Transform {
        Self { m: self.m * inner.m }
    }

    pub fn transform_point(&self, p: &Point3d) -> Point3d {
        let r = self.m.transform_point(&nalgebra::Point3::new(p.x, p.y, p.z));
        Point3d::new(r.x, r.y, r.z)
    }

    /// Transform a direction (no translation).
    pub fn transform_vector(&self, v: &Vec3) -> Vec3 {
        let r: Vector3<f64> = self.m.transform_vector(&v.to_na());
        Vec3::from_na(&r)
    }

    /// `None` if the matrix is singular.
    pub fn inverse(&self) -> Option<Self> {
        self.m.try_inverse().map(|m| Self { m })
    }

    pub fn matrix(&self) -> &Matrix4<f64> {
        &self.m
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point3d,
    pub max: Point3d,
}

impl BoundingBox {
    pub fn new(min: Point3d, max: Point3d) -> Self {
        Self { min, max }
    }

    pub fn empty() -> Self {
        Self {
            min: Point3d::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3d::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    pub fn from_points(points: &[Point3d]) -> Self {
        let mut bb = Self::empty();
        for p in points {
            bb.expand_to_include(p);
        }
        bb
    }

    pub fn expand_to_include(&mut self, p: &Point3d) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    pub fn center(&self) -> Point3d {
        self.min.midpoint(&self.max)
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Side lengths along x, y, z.
    pub fn extents(&self) -> [f64; 3] {
        self.size().to_array()
    }

    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
    }

    /// The eight corners, bottom (min z) ring first.
    pub fn corners(&self) -> [Point3d; 8] {
        let (a, b) = (self.min, self.max);
        [
            Point3d::new(a.x, a.y, a.z),
            Point3d::new(b.x, a.y, a.z),
            Point3d::new(b.x, b.y, a.z),
            Point3d::new(a.x, b.y, a.z),
            Point3d::new(a.x, a.y, b.z),
            Point3d::new(b.x, a.y, b.z),
            Point3d::new(b.x, b.y, b.z),
            Point3d::new(a.x, b.y, b.z),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_translation() {
        let t = Transform::translation(Vec3::new(10.0, 20.0, 30.0));
        let result = t.transform_point(&Point3d::new(1.0, 2.0, 3.0));
        assert_abs_diff_eq!(result, Point3d::new(11.0, 22.0, 33.0), epsilon = 1e-12);
        assert_abs_diff_eq!(t.transform_vector(&Vec3::X), Vec3::X, epsilon = 1e-12);
    }

    #[test]
    fn test_rotation_z_90() {
        let t = Transform::rotation_axis_angle(Vec3::Z, FRAC_PI_2).unwrap();
        let result = t.transform_point(&Point3d::new(1.0, 0.0, 0.0));
        assert_abs_diff_eq!(result, Point3d::new(0.0, 1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_compose_order() {
        let scale = Transform::uniform_scaling(2.0);
        let shift = Transform::translation(Vec3::new(1.0, 0.0, 0.0));
        // scale first, then shift
        let p = shift.compose(&scale).transform_point(&Point3d::new(1.0, 0.0, 0.0));
        assert_abs_diff_eq!(p, Point3d::new(3.0, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_inverse() {
        let t = Transform::translation(Vec3::new(5.0, -3.0, 7.0))
            .compose(&Transform::rotation_axis_angle(Vec3::new(1.0, 1.0, 0.0), 0.3).unwrap());
        let inv = t.inverse().unwrap();
        let p = Point3d::new(1.0, 2.0, 3.0);
        assert_abs_diff_eq!(inv.transform_point(&t.transform_point(&p)), p, epsilon = 1e-9);
        assert!(Transform::uniform_scaling(0.0).inverse().is_none());
    }

    #[test]
    fn test_bounding_box() {
        let bb = BoundingBox::from_points(&[
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(1.0, 2.0, 3.0),
            Point3d::new(-1.0, 0.5, 1.0),
        ]);
        assert_eq!(bb.extents(), [2.0, 2.0, 3.0]);
        assert_abs_diff_eq!(bb.center(), Point3d::new(0.0, 1.0, 1.5), epsilon = 1e-12);
        assert!(bb.is_valid());
        assert!(!BoundingBox::empty().is_valid());
        assert_eq!(BoundingBox::from_points(&bb.corners()), bb);
    }
}
