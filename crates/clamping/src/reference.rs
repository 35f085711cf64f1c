use cam_geom::{Frame, Transform};
use part_kernel::{KernelError, PartIntrospect};
use serde::Serialize;

use crate::configuration::ClampingScalars;
use crate::error::ClampingError;
use crate::types::AnalysisTarget;

/// How an occurrence's local values map into its owning assembly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReferenceContext {
    /// Length conversion from the prototype's part units to the owner's.
    pub factor: f64,
    /// Occurrence placement in the owner.
    pub placement: Transform,
}

impl ReferenceContext {
    /// `None` for prototypes and bounding-box targets.
    pub fn resolve<K: PartIntrospect + ?Sized>(
        kernel: &K,
        target: &AnalysisTarget,
    ) -> Result<Option<Self>, ClampingError> {
        let Some(body) = target.body() else {
            return Ok(None);
        };
        let Some(occurrence) = kernel.occurrence(body)? else {
            return Ok(None);
        };
        let prototype_part = kernel.body_part(occurrence.prototype)?;
        let factor = kernel.length_conversion_factor(occurrence.owner, prototype_part)?;
        Ok(Some(Self {
            factor,
            placement: occurrence.placement,
        }))
    }

    /// Prototype coordinates to owner coordinates: scale first, then place.
    pub fn transform(&self) -> Transform {
        self.placement
            .compose(&Transform::uniform_scaling(self.factor))
    }

    pub fn apply_frame(&self, frame: &Frame) -> Result<Frame, ClampingError> {
        frame.transformed(&self.transform()).ok_or_else(|| {
            ClampingError::Kernel(KernelError::DegenerateGeometry {
                reason: "occurrence placement collapses the clamping frame".to_string(),
            })
        })
    }
}

/// Reference frame and scalars for a raw frame and scalars.
///
/// Without a context the raw values are returned unchanged.
pub(crate) fn derive_references(
    context: Option<&ReferenceContext>,
    frame: &Frame,
    raw: &ClampingScalars,
) -> Result<(Frame, ClampingScalars), ClampingError> {
    match context {
        None => Ok((*frame, *raw)),
        Some(ctx) => Ok((ctx.apply_frame(frame)?, raw.scaled(ctx.factor))),
    }
}
