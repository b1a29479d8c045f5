use std::collections::BTreeSet;
use std::fmt;

use crate::error::{DecomposeError, LayerError, RehostUnresolved};
use crate::host::{ElementId, ElementTypeId, InstanceId};
use crate::operations::layout::LayerPlacement;
use crate::operations::rehost::MatchReason;

/// A layer element created from the source element.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedLayer {
    pub element: ElementId,
    pub element_type: ElementTypeId,
    pub placement: LayerPlacement,
    pub flipped: bool,
}

/// An instance moved onto a layer element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RehostedInstance {
    pub instance: InstanceId,
    pub host: ElementId,
    pub reason: MatchReason,
}

/// Outcome of decomposing one source element.
#[derive(Debug, Clone, PartialEq)]
pub struct DecompositionResult {
    pub original: ElementId,
    /// Created layers, exterior first.
    pub created: Vec<CreatedLayer>,
    pub rehosted: Vec<RehostedInstance>,
    pub unresolved: Vec<RehostUnresolved>,
    /// Layers that could not be created; their siblings were still processed.
    pub skipped_layers: Vec<LayerError>,
    pub original_removed: bool,
}

impl DecompositionResult {
    #[must_use]
    pub fn created_elements(&self) -> Vec<ElementId> {
        self.created.iter().map(|layer| layer.element).collect()
    }

    #[must_use]
    pub fn rehosted_instances(&self) -> Vec<InstanceId> {
        self.rehosted.iter().map(|r| r.instance).collect()
    }

    #[must_use]
    pub fn unresolved_instances(&self) -> Vec<InstanceId> {
        self.unresolved.iter().map(RehostUnresolved::instance).collect()
    }
}

/// A source element left untouched, with the reason.
#[derive(Debug)]
pub struct SkippedElement {
    pub element: ElementId,
    pub error: DecomposeError,
}

/// Aggregate of a multi-element run.
#[derive(Debug, Default)]
pub struct RunReport {
    pub results: Vec<DecompositionResult>,
    pub skipped: Vec<SkippedElement>,
}

impl RunReport {
    /// Whether no element was decomposed. Callers usually roll back in that case.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    #[must_use]
    pub fn total_created(&self) -> usize {
        self.results.iter().map(|r| r.created.len()).sum()
    }

    #[must_use]
    pub fn total_rehosted(&self) -> usize {
        self.results.iter().map(|r| r.rehosted.len()).sum()
    }

    #[must_use]
    pub fn total_unresolved(&self) -> usize {
        self.results.iter().map(|r| r.unresolved.len()).sum()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Layer decomposition result:")?;
        for result in &self.results {
            writeln!(
                f,
                "Element {:?} -> created {} elements.",
                result.original,
                result.created.len()
            )?;
            if !result.rehosted.is_empty() {
                writeln!(f, "    Rehosted instances: {}.", result.rehosted.len())?;
            }
            if !result.unresolved.is_empty() {
                let ids: Vec<String> = result
                    .unresolved_instances()
                    .iter()
                    .map(|id| format!("{id:?}"))
                    .collect();
                writeln!(f, "    Not rehosted automatically: {}.", ids.join(", "))?;
            }
            for layer in &result.skipped_layers {
                writeln!(f, "    Skipped: {layer}.")?;
            }
        }

        let reasons: BTreeSet<String> = self
            .skipped
            .iter()
            .map(|s| format!("Element {:?}: {}", s.element, s.error))
            .collect();
        if !reasons.is_empty() {
            writeln!(f)?;
            writeln!(f, "Elements that could not be processed:")?;
            for reason in reasons {
                writeln!(f, "- {reason}")?;
            }
        }
        Ok(())
    }
}
