use std::time::Duration;

use vitrine_engine::device::SurfaceError;

/// Failure reported by a scene's own hooks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct SceneError(String);

impl SceneError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SceneError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for SceneError {
    fn from(message: String) -> Self {
        Self(message)
    }
}

/// Errors from producing one thumbnail.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenderError {
    #[error(transparent)]
    Surface(#[from] SurfaceError),

    #[error("scene hook failed: {0}")]
    Scene(#[from] SceneError),

    #[error("scene {id} has no thumbnail capability")]
    MissingCapability { id: String },

    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: Box<RenderError> },
}

impl RenderError {
    /// The error that ended the last attempt, unwrapping `Exhausted`.
    pub fn root(&self) -> &RenderError {
        match self {
            RenderError::Exhausted { last, .. } => last.root(),
            other => other,
        }
    }
}

/// Errors delivered to a task's submitter.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QueueError {
    /// The queue was disposed before the task started.
    #[error("task queue disposed")]
    Disposed,

    #[error("task exceeded its {0:?} time limit")]
    TimedOut(Duration),

    /// The reply channel closed without an outcome.
    #[error("task dropped before completion")]
    Dropped,

    /// The task panicked; the worker recovered its resource and moved on.
    #[error("task panicked: {0}")]
    Panicked(String),

    #[error(transparent)]
    Task(#[from] RenderError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_unwraps_nested_exhaustion() {
        let e = RenderError::Exhausted {
            attempts: 3,
            last: Box::new(RenderError::Surface(SurfaceError::Timeout)),
        };
        assert_eq!(e.root(), &RenderError::Surface(SurfaceError::Timeout));
        assert_eq!(e.to_string(), "gave up after 3 attempts: surface operation timed out");
    }

    #[test]
    fn scene_errors_convert_into_task_errors() {
        let e: QueueError = RenderError::from(SceneError::from("no textures")).into();
        assert_eq!(e.to_string(), "scene hook failed: no textures");
    }
}
