//! Vitrine engine crate.
//!
//! This crate owns the CPU-side scene graph and the offscreen surface used to
//! turn a staged scene into a PNG thumbnail. Higher layers (thumbnail queue,
//! scene registry, studio) never touch pixels directly.

pub mod coords;
pub mod device;
pub mod logging;
pub mod paint;
pub mod render;
pub mod scene;
