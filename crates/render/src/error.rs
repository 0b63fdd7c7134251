use crate::host::{Param, Technique};
use crate::mesh::Face;

/// Errors from building procedural meshes.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeshError {
    #[error("{face:?} face needs {vertices} vertices in one patch; 16-bit indices address at most {max}")]
    IndexOverflow {
        face: Face,
        vertices: usize,
        max: usize,
    },
}

/// Errors surfaced while building or drawing the scene.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("technique not found: {0}")]
    TechniqueNotFound(Technique),
    #[error("shader parameter not found: {0}")]
    ParameterNotFound(Param),
    #[error("off-screen target is still bound")]
    RenderTargetBusy,
    #[error("off-screen target has not been rendered this frame")]
    RenderTargetUnavailable,
    #[error("mesh error: {0}")]
    Mesh(#[from] MeshError),
    #[error("asset error: {0}")]
    Asset(String),
    #[error("backend error: {0}")]
    Backend(String),
}
