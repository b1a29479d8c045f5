pub mod decompose;
pub mod layout;
pub mod query;
pub mod rehost;
pub mod transpose;
pub mod type_cache;

pub use decompose::{
    CreatedLayer, Decomposer, DecompositionResult, DecompositionRun, RehostedInstance, RunReport,
    SkippedElement, Stage,
};
pub use layout::{LayerLayout, LayerPlacement, LayerSlot};
pub use rehost::{HostMatch, MatchReason, ResolveHost};
pub use transpose::{Transpose, TransposeResult};
pub use type_cache::{LayerTypeCache, LayerTypeKey, Resolution, ResolvedType};
