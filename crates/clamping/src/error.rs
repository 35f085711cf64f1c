use part_kernel::KernelError;

/// Failure of a feature computation. No partial configuration is produced.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ClampingError {
    #[error("geometry query failed: {0}")]
    Kernel(#[from] KernelError),

    #[error("clamping faces are degenerate: {reason}")]
    DegenerateFaces { reason: String },

    #[error("bottom plane normal is parallel to the clamping direction")]
    ParallelBottomPlane,

    #[error("analysis target has no geometry: {reason}")]
    EmptyGeometry { reason: String },
}
