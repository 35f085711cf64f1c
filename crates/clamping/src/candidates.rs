use cam_geom::Plane;
use part_kernel::{BodyId, FaceId, KernelError, PartIntrospect};
use serde::Serialize;
use tracing::debug;

use crate::compute::FeatureComputer;
use crate::configuration::ClampingConfiguration;
use crate::error::ClampingError;
use crate::machinability::classify_machinability;
use crate::types::{AnalysisTarget, ClampingFaceRef, MachinableFeature};

/// Two opposed planar faces and a face perpendicular to both to stand on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FacePairCandidate {
    pub first: FaceId,
    pub second: FaceId,
    pub bottom: FaceId,
}

/// Every pair of anti-parallel planar faces of `body`, combined with every
/// planar face perpendicular to them as the bottom. Non-planar faces are
/// skipped.
pub fn opposing_face_pairs<K: PartIntrospect + ?Sized>(
    kernel: &K,
    body: BodyId,
    angular_tolerance: f64,
) -> Result<Vec<FacePairCandidate>, ClampingError> {
    let mut planes: Vec<(FaceId, Plane)> = Vec::new();
    for face in kernel.body_faces(body)? {
        match kernel.face_plane(face) {
            Ok(plane) => planes.push((face, plane)),
            Err(KernelError::NotPlanar { .. }) => debug!(?face, "skipping non-planar face"),
            Err(e) => return Err(e.into()),
        }
    }

    let mut candidates = Vec::new();
    for (i, (first, p1)) in planes.iter().enumerate() {
        for (second, p2) in &planes[i + 1..] {
            if !p1.normal.is_antiparallel(&p2.normal, angular_tolerance) {
                continue;
            }
            for (bottom, pb) in &planes {
                if pb.normal.is_perpendicular_to(&p1.normal, angular_tolerance) {
                    candidates.push(FacePairCandidate {
                        first: *first,
                        second: *second,
                        bottom: *bottom,
                    });
                }
            }
        }
    }
    Ok(candidates)
}

/// Compute a configuration for every candidate of [`opposing_face_pairs`],
/// classifying `features` against each bottom's up direction.
pub fn enumerate_configurations<K: PartIntrospect + ?Sized>(
    computer: &FeatureComputer<'_, K>,
    body: BodyId,
    features: &[MachinableFeature],
) -> Result<Vec<ClampingConfiguration>, ClampingError> {
    let kernel = computer.kernel();
    let tolerance = computer.tolerance();
    let mut configs = Vec::new();
    for candidate in opposing_face_pairs(kernel, body, tolerance.epsilon)? {
        let bottom = kernel.face_plane(candidate.bottom)?;
        let split = classify_machinability(kernel, features, -bottom.normal, tolerance)?;
        configs.push(computer.compute(
            AnalysisTarget::Body(body),
            ClampingFaceRef::Face(candidate.first),
            ClampingFaceRef::Face(candidate.second),
            bottom,
            &split,
        )?);
    }
    Ok(configs)
}
