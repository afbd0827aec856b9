use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("plane fit needs at least 3 points, got {count}")]
    NotEnoughPoints { count: usize },
    #[error("points are collinear")]
    Collinear,
    #[error("camera ray is parallel to the plane")]
    ParallelRay,
    #[error("plane intersection lies behind the camera")]
    BehindCamera,
    #[error("point lies on the camera plane")]
    OnCameraPlane,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("mesh not found: {0}")]
    MissingMesh(String),
    #[error("vertex {index} out of range for mesh {mesh}")]
    VertexOutOfRange { mesh: String, index: usize },
    #[error("face {index} out of range for mesh {mesh}")]
    FaceOutOfRange { mesh: String, index: usize },
    #[error("write rejected: {0}")]
    Rejected(String),
}

/// Failure of one gesture step. None of these are fatal to the host; callers
/// contain them to the current gesture.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditError {
    #[error("degenerate geometry: {0}")]
    Degenerate(#[from] GeometryError),
    #[error("stale reference: {what}")]
    StaleReference { what: String },
    #[error("commit failed: {0}")]
    CommitFailure(#[source] StoreError),
    #[error("nothing to undo")]
    NothingToUndo,
    #[error("nothing to redo")]
    NothingToRedo,
}

impl EditError {
    pub fn stale(what: impl Into<String>) -> Self {
        Self::StaleReference { what: what.into() }
    }
}
