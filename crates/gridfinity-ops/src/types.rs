/// Errors from feature builders.
#[derive(Debug, Clone, thiserror::Error)]
pub enum OpError {
    #[error("kernel error: {0}")]
    Kernel(#[from] brep_kernel::KernelError),

    #[error("invalid geometry: {reason}")]
    InvalidGeometry { reason: String },

    #[error("copy_and_translate needs at least one translation vector")]
    EmptyVectorList,

    #[error("multi_fuse needs at least one shape")]
    EmptyShapeList,
}

impl OpError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        OpError::InvalidGeometry {
            reason: reason.into(),
        }
    }
}
