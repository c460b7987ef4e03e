/// Errors raised by a [`RenderSurface`](super::RenderSurface).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SurfaceError {
    /// The platform invalidated the surface; nothing drawn since survives.
    #[error("rendering context lost")]
    Lost,
    #[error("out of memory allocating a {width}x{height} surface")]
    OutOfMemory { width: u32, height: u32 },
    #[error("surface operation timed out")]
    Timeout,
    #[error("invalid surface size {width}x{height} (max {max})")]
    InvalidSize { width: u32, height: u32, max: u32 },
    #[error("surface used after dispose")]
    Disposed,
    #[error("frame encoding failed: {0}")]
    Encode(String),
}

/// High-level response after a surface error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Drop the surface and create a fresh one before the next attempt.
    Reinitialize,
    /// Transient; the same surface may be used again.
    Retry,
    /// Retrying cannot help (bad arguments).
    Fatal,
}

impl SurfaceError {
    /// Classifies the error for the renderer's recovery logic.
    pub fn action(&self) -> SurfaceErrorAction {
        match self {
            SurfaceError::Lost | SurfaceError::Disposed | SurfaceError::OutOfMemory { .. } => {
                SurfaceErrorAction::Reinitialize
            }
            SurfaceError::Timeout | SurfaceError::Encode(_) => SurfaceErrorAction::Retry,
            SurfaceError::InvalidSize { .. } => SurfaceErrorAction::Fatal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lost_context_requires_reinit() {
        assert_eq!(SurfaceError::Lost.action(), SurfaceErrorAction::Reinitialize);
        assert_eq!(
            SurfaceError::OutOfMemory { width: 1, height: 1 }.action(),
            SurfaceErrorAction::Reinitialize
        );
    }

    #[test]
    fn bad_size_is_fatal() {
        let e = SurfaceError::InvalidSize { width: 0, height: 10, max: 4096 };
        assert_eq!(e.action(), SurfaceErrorAction::Fatal);
        assert_eq!(e.to_string(), "invalid surface size 0x10 (max 4096)");
    }
}
