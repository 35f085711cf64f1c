use cam_geom::{BoundingBox, Frame, Plane};
use serde::Serialize;

use crate::error::ClampingError;
use crate::machinability::MachinabilitySplit;
use crate::reference::{derive_references, ReferenceContext};
use crate::types::{AnalysisTarget, ClampingFaceRef, FeatureId, MachinableFeature};

/// Scalars derived for one clamping configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClampingScalars {
    /// Distance between the two clamping faces along the jaw direction.
    pub clamping_thickness: f64,
    /// Height over which both jaws touch the part, measured up from the bottom plane.
    pub clamping_height: f64,
    /// Radius of gyration of the first clamping face over
    /// `sqrt(area) * longest lever arm`. Larger is more stable.
    pub lever_arm_ratio: f64,
    pub gravity_center_height: f64,
    /// Extents of the target along the clamping frame axes.
    pub extents: [f64; 3],
}

impl ClampingScalars {
    /// Every length scaled by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            clamping_thickness: self.clamping_thickness * factor,
            clamping_height: self.clamping_height * factor,
            lever_arm_ratio: self.lever_arm_ratio * factor,
            gravity_center_height: self.gravity_center_height * factor,
            extents: self.extents.map(|e| e * factor),
        }
    }
}

/// A candidate way of clamping a part in a vise, with its derived scalars.
///
/// Immutable once built. Re-centering produces a new configuration with the
/// reference values re-derived (see [`crate::center_csys`]).
#[derive(Debug, Clone, Serialize)]
pub struct ClampingConfiguration {
    pub(crate) target: AnalysisTarget,
    pub(crate) faces: [ClampingFaceRef; 2],
    pub(crate) face_planes: [Plane; 2],
    pub(crate) bottom_plane: Plane,
    pub(crate) bounding_box: BoundingBox,
    pub(crate) machinable: MachinabilitySplit,
    pub(crate) frame: Frame,
    pub(crate) raw: ClampingScalars,
    pub(crate) reference_context: Option<ReferenceContext>,
    pub(crate) reference_frame: Frame,
    pub(crate) reference: ClampingScalars,
}

impl ClampingConfiguration {
    pub fn target(&self) -> &AnalysisTarget {
        &self.target
    }

    pub fn clamping_faces(&self) -> [ClampingFaceRef; 2] {
        self.faces
    }

    /// Supporting planes of the two clamping faces, normals pointing out of the part.
    pub fn face_planes(&self) -> [Plane; 2] {
        self.face_planes
    }

    /// Bottom plane anchored at the clamping frame origin.
    pub fn bottom_plane(&self) -> &Plane {
        &self.bottom_plane
    }

    /// Axis-aligned box of the target in its own coordinates.
    pub fn bounding_box(&self) -> &BoundingBox {
        &self.bounding_box
    }

    pub fn fully_machinable(&self) -> &[MachinableFeature] {
        &self.machinable.fully
    }

    pub fn partially_machinable(&self) -> &[MachinableFeature] {
        &self.machinable.partially
    }

    pub fn fully_machinable_ids(&self) -> Vec<FeatureId> {
        self.machinable.fully.iter().map(|f| f.id).collect()
    }

    /// X along the jaws, Y along the first face normal, Z up.
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn raw(&self) -> &ClampingScalars {
        &self.raw
    }

    pub fn reference(&self) -> &ClampingScalars {
        &self.reference
    }

    /// The clamping frame in owning-assembly coordinates.
    pub fn reference_frame(&self) -> &Frame {
        &self.reference_frame
    }

    pub fn reference_context(&self) -> Option<&ReferenceContext> {
        self.reference_context.as_ref()
    }

    pub fn is_occurrence(&self) -> bool {
        self.reference_context.is_some()
    }

    pub fn clamping_thickness(&self) -> f64 {
        self.raw.clamping_thickness
    }

    pub fn clamping_height(&self) -> f64 {
        self.raw.clamping_height
    }

    pub fn lever_arm_ratio(&self) -> f64 {
        self.raw.lever_arm_ratio
    }

    pub fn gravity_center_height(&self) -> f64 {
        self.raw.gravity_center_height
    }

    /// Copy with a new clamping frame (same axes), reference values re-derived.
    pub(crate) fn with_frame(
        &self,
        frame: Frame,
        extents: [f64; 3],
    ) -> Result<Self, ClampingError> {
        let raw = ClampingScalars {
            extents,
            ..self.raw
        };
        let (reference_frame, reference) =
            derive_references(self.reference_context.as_ref(), &frame, &raw)?;
        Ok(Self {
            bottom_plane: Plane {
                origin: frame.origin,
                normal: self.bottom_plane.normal,
            },
            frame,
            raw,
            reference_frame,
            reference,
            ..self.clone()
        })
    }
}
