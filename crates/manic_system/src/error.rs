//! Errors raised while validating or running systems.

use manic_component::EcsError;

/// Failure of a system or of the pipeline driving it.
#[derive(Debug, thiserror::Error)]
pub enum SystemError {
    /// A storage operation failed.
    #[error(transparent)]
    Ecs(#[from] EcsError),

    /// The canvas rejected a frame or a draw call.
    #[error("canvas error: {0}")]
    Render(String),

    /// A system's declared query cannot be satisfied by the world.
    #[error("system `{system}` has an unsatisfiable query")]
    InvalidQuery {
        /// Name of the offending system.
        system: &'static str,
        /// Why the query was rejected.
        #[source]
        source: EcsError,
    },

    /// A system failed during its update; the frame was abandoned.
    #[error("system `{system}` failed")]
    Failed {
        /// Name of the failing system.
        system: &'static str,
        /// What went wrong inside the update.
        #[source]
        source: Box<SystemError>,
    },
}

impl SystemError {
    /// The innermost storage error, if this failure came from one.
    #[must_use]
    pub fn ecs(&self) -> Option<&EcsError> {
        match self {
            Self::Ecs(err) | Self::InvalidQuery { source: err, .. } => Some(err),
            Self::Failed { source, .. } => source.ecs(),
            Self::Render(_) => None,
        }
    }
}
