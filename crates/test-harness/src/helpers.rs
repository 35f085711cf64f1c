//! Helper functions: error type, part builders, feature constructors.

use cam_geom::{Point3d, Vec3};
use clamping::{ClampingError, MachinableFeature};
use part_kernel::{BodyId, KernelError, MockKernel};
use setup_selection::SelectionError;
use setup_types::LengthUnit;

// ── Error Type ──────────────────────────────────────────────────────────────

/// Unified error type for the test harness.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("not found: {name}")]
    NotFound { name: String },

    #[error("duplicate name: {name}")]
    DuplicateName { name: String },

    #[error("assertion failed: {detail}")]
    AssertionFailed { detail: String },

    #[error("kernel error: {0}")]
    Kernel(#[from] KernelError),

    #[error("clamping error: {0}")]
    Clamping(#[from] ClampingError),

    #[error("selection error: {0}")]
    Selection(#[from] SelectionError),
}

// ── Part Builders ───────────────────────────────────────────────────────────

/// A new part in `unit` holding one axis-aligned box from the origin to `size`.
pub fn block(
    kernel: &mut MockKernel,
    unit: LengthUnit,
    size: [f64; 3],
) -> Result<BodyId, HarnessError> {
    let part = kernel.add_part(unit);
    Ok(kernel.add_box(part, Point3d::ORIGIN, Point3d::new(size[0], size[1], size[2]))?)
}

/// L-shaped XY profile: a `width` x `thickness` foot with a `thickness` wide
/// upright reaching `height`.
pub fn l_profile(width: f64, height: f64, thickness: f64) -> Vec<(f64, f64)> {
    vec![
        (0.0, 0.0),
        (width, 0.0),
        (width, thickness),
        (thickness, thickness),
        (thickness, height),
        (0.0, height),
    ]
}

/// T-shaped XY profile: a `bar_width` x `bar_depth` bar on top of a centered
/// `stem_width` stem, total depth `depth`.
pub fn tee_profile(bar_width: f64, stem_width: f64, depth: f64, bar_depth: f64) -> Vec<(f64, f64)> {
    let left = (bar_width - stem_width) / 2.0;
    let right = left + stem_width;
    let neck = depth - bar_depth;
    vec![
        (left, 0.0),
        (right, 0.0),
        (right, neck),
        (bar_width, neck),
        (bar_width, depth),
        (0.0, depth),
        (0.0, neck),
        (left, neck),
    ]
}

// ── Feature Constructors ────────────────────────────────────────────────────

/// A single-face machinable feature on the face of `body` facing `direction`.
pub fn face_feature(
    kernel: &MockKernel,
    body: BodyId,
    id: u64,
    name: &str,
    direction: Vec3,
) -> Result<MachinableFeature, HarnessError> {
    let face = kernel
        .find_face(body, direction)
        .ok_or_else(|| HarnessError::NotFound {
            name: format!("face of {body:?} facing {direction:?}"),
        })?;
    Ok(MachinableFeature::new(id, name, vec![face]))
}

/// One single-face feature per axis direction, ids 1..=6 in the order
/// +X, -X, +Y, -Y, +Z, -Z.
pub fn all_face_features(
    kernel: &MockKernel,
    body: BodyId,
) -> Result<Vec<MachinableFeature>, HarnessError> {
    [
        ("+X", Vec3::X),
        ("-X", -Vec3::X),
        ("+Y", Vec3::Y),
        ("-Y", -Vec3::Y),
        ("+Z", Vec3::Z),
        ("-Z", -Vec3::Z),
    ]
    .into_iter()
    .zip(1u64..)
    .map(|((name, dir), id)| face_feature(kernel, body, id, name, dir))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use part_kernel::PartIntrospect;

    #[test]
    fn block_has_six_faces() {
        let mut kernel = MockKernel::new();
        let body = block(&mut kernel, LengthUnit::Millimeter, [10.0, 20.0, 30.0]).unwrap();
        assert_eq!(kernel.body_faces(body).unwrap().len(), 6);
        assert_eq!(all_face_features(&kernel, body).unwrap().len(), 6);
    }

    #[test]
    fn profiles_build_prisms() {
        let mut kernel = MockKernel::new();
        let part = kernel.add_part(LengthUnit::Millimeter);
        let l = kernel.add_prism(part, &l_profile(40.0, 30.0, 5.0), 0.0, 10.0).unwrap();
        let t = kernel
            .add_prism(part, &tee_profile(40.0, 10.0, 30.0, 10.0), 0.0, 10.0)
            .unwrap();
        assert_eq!(kernel.body_faces(l).unwrap().len(), 8);
        assert_eq!(kernel.body_faces(t).unwrap().len(), 10);
    }

    #[test]
    fn missing_face_is_reported() {
        let mut kernel = MockKernel::new();
        let body = block(&mut kernel, LengthUnit::Millimeter, [1.0, 1.0, 1.0]).unwrap();
        let diagonal = Vec3::new(1.0, 1.0, 0.0);
        assert!(matches!(
            face_feature(&kernel, body, 1, "slanted", diagonal),
            Err(HarnessError::NotFound { .. })
        ));
    }
}
