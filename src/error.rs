use thiserror::Error;

use crate::host::{ElementId, InstanceId};

/// Top-level error type for the Lamina decomposition engine.
#[derive(Debug, Error)]
pub enum LaminaError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Structure(#[from] StructureError),

    #[error(transparent)]
    Host(#[from] HostError),

    #[error(transparent)]
    Decompose(#[from] DecomposeError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("parameter {parameter} = {value} is out of range [{min}, {max}]")]
    ParameterOutOfRange {
        parameter: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("zero-length vector")]
    ZeroVector,
}

/// Errors raised while reading a compound structure.
#[derive(Debug, Error)]
pub enum StructureError {
    #[error("core index {index} is out of range for {layer_count} layers")]
    CoreIndexOutOfRange { index: usize, layer_count: usize },

    #[error("core range is inverted: first {first} > last {last}")]
    InvertedCore { first: usize, last: usize },

    #[error("layer {index} has invalid width {width}")]
    InvalidWidth { index: usize, width: f64 },
}

/// Failures reported by the host model collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("type name already in use: {0}")]
    NameTaken(String),

    #[error("rejected by host: {0}")]
    Rejected(String),
}

/// Operation-level failures of a single decomposition.
///
/// These are surfaced to the caller, who decides whether to roll back the
/// enclosing transaction.
#[derive(Debug, Error)]
pub enum DecomposeError {
    #[error("element is not decomposable: {0}")]
    NotDecomposable(String),

    #[error("no layer element could be created for {element:?}")]
    NoLayersCreated { element: ElementId },

    #[error("original element {element:?} cannot be removed: {}", .blockers.join("; "))]
    OriginalRemovalBlocked {
        element: ElementId,
        blockers: Vec<String>,
        /// Layer elements already created when removal failed.
        created: usize,
    },
}

impl DecomposeError {
    /// Whether the model was changed before the failure, so the enclosing
    /// transaction must be rolled back.
    #[must_use]
    pub fn requires_rollback(&self) -> bool {
        matches!(self, Self::OriginalRemovalBlocked { created, .. } if *created > 0)
    }
}

/// Per-layer failure. Recorded on the result, never propagated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayerError {
    #[error("type resolution failed for layer {layer}: {reason}")]
    TypeResolutionFailed { layer: usize, reason: String },

    #[error("element creation failed for layer {layer}: {source}")]
    LayerCreationFailed { layer: usize, source: HostError },
}

impl LayerError {
    /// Index of the layer within the source structure.
    #[must_use]
    pub fn layer(&self) -> usize {
        match self {
            Self::TypeResolutionFailed { layer, .. } | Self::LayerCreationFailed { layer, .. } => {
                *layer
            }
        }
    }
}

/// Why an attached instance was left on its original host.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RehostUnresolved {
    #[error("instance {0:?}: no layer element to host it")]
    NoCandidate(InstanceId),

    #[error("instance {instance:?}: host rejected reassignment: {reason}")]
    HostRejected { instance: InstanceId, reason: String },
}

impl RehostUnresolved {
    #[must_use]
    pub fn instance(&self) -> InstanceId {
        match self {
            Self::NoCandidate(instance) | Self::HostRejected { instance, .. } => *instance,
        }
    }
}

/// Invalid configuration values.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("malformed configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Convenience type alias for results using [`LaminaError`].
pub type Result<T> = std::result::Result<T, LaminaError>;
