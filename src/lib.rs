//! Decomposition of compound building-envelope elements into one element
//! per material layer.
//!
//! The engine computes where each layer lies across the element's
//! thickness, resolves a single-layer type for it, creates the layer
//! elements through a [`host::HostModel`], and moves attached objects onto
//! the layer that contains them.

pub mod config;
pub mod error;
pub mod geometry;
pub mod host;
pub mod math;
pub mod operations;
pub mod structure;

pub use config::DecomposeConfig;
pub use error::{LaminaError, Result};
pub use operations::{DecompositionResult, DecompositionRun, RunReport};
