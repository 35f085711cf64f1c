use approx::AbsDiffEq;
use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};

use super::point::Point3d;
use super::transform::Transform;
use super::vector::Vec3;

/// A right-handed orthonormal coordinate frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub origin: Point3d,
    pub x_axis: Vec3,
    pub y_axis: Vec3,
    pub z_axis: Vec3,
}

impl Frame {
    pub fn world() -> Self {
        Self {
            origin: Point3d::ORIGIN,
            x_axis: Vec3::X,
            y_axis: Vec3::Y,
            z_axis: Vec3::Z,
        }
    }

    /// Frame with the given X direction and Y as close to `y_hint` as
    /// orthogonality allows. `None` if the directions are parallel or zero.
    pub fn from_xy(origin: Point3d, x: Vec3, y_hint: Vec3) -> Option<Self> {
        let x_axis = x.normalized()?;
        let z_axis = x_axis.cross(&y_hint).normalized()?;
        let y_axis = z_axis.cross(&x_axis);
        Some(Self {
            origin,
            x_axis,
            y_axis,
            z_axis,
        })
    }

    pub fn axis(&self, i: usize) -> Vec3 {
        match i {
            0 => self.x_axis,
            1 => self.y_axis,
            _ => self.z_axis,
        }
    }

    /// Coordinates of a world point in this frame.
    pub fn to_local(&self, p: &Point3d) -> Point3d {
        let d = *p - self.origin;
        Point3d::new(d.dot(&self.x_axis), d.dot(&self.y_axis), d.dot(&self.z_axis))
    }

    /// World position of frame-local coordinates.
    pub fn to_world(&self, local: &Point3d) -> Point3d {
        self.origin + self.x_axis * local.x + self.y_axis * local.y + self.z_axis * local.z
    }

    pub fn with_origin(&self, origin: Point3d) -> Self {
        Self { origin, ..*self }
    }

    /// Rotation matrix whose columns are the frame axes.
    pub fn rotation(&self) -> Matrix3<f64> {
        Matrix3::from_columns(&[self.x_axis.to_na(), self.y_axis.to_na(), self.z_axis.to_na()])
    }

    /// Local-to-world transform of this frame.
    pub fn to_transform(&self) -> Transform {
        Transform::from_rotation_translation(&self.rotation(), self.origin.to_vec3())
    }

    /// The frame carried through `t`, re-orthonormalized so that scaling
    /// transforms keep unit axes.
    pub fn transformed(&self, t: &Transform) -> Option<Self> {
        Self::from_xy(
            t.transform_point(&self.origin),
            t.transform_vector(&self.x_axis),
            t.transform_vector(&self.y_axis),
        )
    }
}

impl AbsDiffEq for Frame {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        f64::EPSILON
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.origin.abs_diff_eq(&other.origin, epsilon)
            && self.x_axis.abs_diff_eq(&other.x_axis, epsilon)
            && self.y_axis.abs_diff_eq(&other.y_axis, epsilon)
            && self.z_axis.abs_diff_eq(&other.z_axis, epsilon)
    }
}
