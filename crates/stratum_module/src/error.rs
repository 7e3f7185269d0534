//! # Module Error Types

use thiserror::Error;

/// Errors raised by the scene director.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// An object that is not a scene was routed to the director without a
    /// proxy to convert it. Continuing would leave the swap state corrupt.
    #[error("scene proxy is not configured")]
    MissingProxy,
}

/// Result type for scene operations.
pub type SceneResult<T> = Result<T, SceneError>;
