//! Offscreen surface management.
//!
//! This module is responsible for:
//! - the [`RenderSurface`] contract the thumbnail renderer draws through
//! - the CPU-backed [`SoftwareSurface`] and its factory
//! - surface errors and how callers should react to them
//! - context-loss signalling (a platform may invalidate a surface at any time)

mod error;
mod init;
mod software;
mod surface;

pub use error::{SurfaceError, SurfaceErrorAction};
pub use init::SurfaceInit;
pub use software::{SoftwareSurface, SoftwareSurfaceFactory};
pub use surface::{ContextLossSignal, RenderSurface, SurfaceFactory};
