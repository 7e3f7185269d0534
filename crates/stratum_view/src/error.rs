//! # View Error Types
//!
//! Errors surfaced by the view stack and by host implementations.

use crate::view::ViewId;
use thiserror::Error;

/// Errors a host can report when instantiating a panel.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// The host could not create a panel for the view.
    #[error("failed to instantiate view {identifier}: {reason}")]
    Instantiate {
        /// Identifier of the view being loaded.
        identifier: String,
        /// Host-specific reason.
        reason: String,
    },
}

/// Errors that can occur in the view stack.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ViewError {
    /// The host failed to provide a panel.
    #[error(transparent)]
    Host(#[from] HostError),

    /// A second load was requested while one is still pending.
    #[error("view {identifier} is already loading")]
    AlreadyLoading {
        /// Identifier of the view being loaded.
        identifier: String,
    },

    /// The handle does not name a live view.
    #[error("unknown view: {0}")]
    UnknownView(ViewId),

    /// Invalid configuration file.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for view operations.
pub type ViewResult<T> = Result<T, ViewError>;
