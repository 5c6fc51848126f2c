use portflow_core::PortflowError;
use thiserror::Error;

/// Errors returned by a [`crate::SessionHandle`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    /// The runtime rejected the command.
    #[error(transparent)]
    Runtime(#[from] PortflowError),

    /// The session loop has stopped.
    #[error("Session closed")]
    Closed,
}
