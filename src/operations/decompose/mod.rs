//! Splitting one compound element into single-layer elements.

mod result;
mod run;
mod stage;

pub use result::{CreatedLayer, DecompositionResult, RehostedInstance, RunReport, SkippedElement};
pub use run::DecompositionRun;
pub use stage::Stage;

use tracing::{debug, info, warn};

use crate::config::{DecomposeConfig, FlipPolicy, PlacementStrategy, RemovalPolicy};
use crate::error::{DecomposeError, LayerError, RehostUnresolved};
use crate::geometry::PathCurve;
use crate::host::{
    ElementId, ElementProperties, ElementSpec, ElementTypeId, HostModel, InstanceDescriptor,
};
use crate::math::Vector3;
use crate::operations::layout::{LayerLayout, LayerPlacement};
use crate::operations::rehost::ResolveHost;
use crate::operations::transpose::Transpose;
use crate::operations::type_cache::LayerTypeCache;
use crate::structure::CompoundStructure;

/// Everything read from the source element during validation.
struct SourceElement {
    id: ElementId,
    base_type: ElementTypeId,
    structure: CompoundStructure,
    curve: PathCurve,
    normal: Vector3,
    properties: ElementProperties,
    instances: Vec<InstanceDescriptor>,
}

/// Drives one decomposition through its [`Stage`]s.
///
/// The type cache is borrowed so that several decompositions of one run
/// share it; see [`DecompositionRun`].
pub struct Decomposer<'a> {
    config: &'a DecomposeConfig,
    cache: &'a mut LayerTypeCache,
    stage: Stage,
}

impl<'a> Decomposer<'a> {
    #[must_use]
    pub fn new(config: &'a DecomposeConfig, cache: &'a mut LayerTypeCache) -> Self {
        Self {
            config,
            cache,
            stage: Stage::Idle,
        }
    }

    /// Current stage. After [`Self::execute`] returns this is
    /// [`Stage::Completed`] or [`Stage::Aborted`].
    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Decomposes `source` into one element per nonzero-width layer.
    ///
    /// Per-layer and per-instance failures are collected on the result.
    /// The caller owns the host transaction and should roll it back when
    /// the returned error [requires it](DecomposeError::requires_rollback).
    ///
    /// # Errors
    ///
    /// - [`DecomposeError::NotDecomposable`] if the element has no type,
    ///   compound structure with at least two nonzero-width layers, or path curve.
    /// - [`DecomposeError::NoLayersCreated`] if every layer failed.
    /// - [`DecomposeError::OriginalRemovalBlocked`] if the removal policy
    ///   requires removing the source and the host refuses, or an attached
    ///   instance could not be moved off it.
    pub fn execute<H: HostModel + ?Sized>(
        &mut self,
        host: &mut H,
        source: ElementId,
    ) -> Result<DecompositionResult, DecomposeError> {
        self.stage = Stage::Idle;
        let outcome = self.run(host, source);
        if let Err(error) = &outcome {
            warn!(element = ?source, stage = %self.stage, %error, "decomposition aborted");
            self.advance(Stage::Aborted);
        }
        outcome
    }

    fn advance(&mut self, next: Stage) {
        debug_assert!(
            self.stage.can_advance_to(next),
            "invalid stage transition {} -> {}",
            self.stage,
            next
        );
        debug!(from = %self.stage, to = %next, "stage transition");
        self.stage = next;
    }

    fn run<H: HostModel + ?Sized>(
        &mut self,
        host: &mut H,
        source: ElementId,
    ) -> Result<DecompositionResult, DecomposeError> {
        self.advance(Stage::ValidatingInput);
        let input = self.validate(host, source)?;

        self.advance(Stage::ComputingLayout);
        let layout = LayerLayout::compute(&input.structure, input.properties.reference_line);
        let placements = layout.placements(
            input.base_type,
            self.config.placement,
            self.config.width_key_precision,
        );
        debug!(
            element = ?source,
            thickness = layout.total_thickness(),
            reference_offset = layout.reference_offset(),
            layers = placements.len(),
            "layout computed"
        );

        let mut result = DecompositionResult {
            original: source,
            created: Vec::with_capacity(placements.len()),
            rehosted: Vec::new(),
            unresolved: Vec::new(),
            skipped_layers: Vec::new(),
            original_removed: false,
        };

        for placement in placements {
            self.advance(Stage::CreatingLayers {
                layer: placement.layer_index,
            });
            match self.create_layer(host, &input, placement) {
                Ok(created) => result.created.push(created),
                Err(error) => {
                    warn!(element = ?source, layer = error.layer(), %error, "layer skipped");
                    result.skipped_layers.push(error);
                }
            }
        }
        if result.created.is_empty() {
            return Err(DecomposeError::NoLayersCreated { element: source });
        }

        self.advance(Stage::Rehosting);
        rehost(host, &input, &mut result, self.config.tolerances.band);

        if self.config.removal != RemovalPolicy::Keep {
            self.advance(Stage::RemovingOriginal);
            // Removing the host would take the unresolved instances with it.
            if !result.unresolved.is_empty() {
                let blockers = result
                    .unresolved
                    .iter()
                    .map(|unresolved| {
                        format!("instance {:?} is still attached", unresolved.instance())
                    })
                    .collect();
                return Err(DecomposeError::OriginalRemovalBlocked {
                    element: source,
                    blockers,
                    created: result.created.len(),
                });
            }
            host.remove_element(source).map_err(|error| {
                DecomposeError::OriginalRemovalBlocked {
                    element: source,
                    blockers: vec![error.to_string()],
                    created: result.created.len(),
                }
            })?;
            result.original_removed = true;
        }

        self.advance(Stage::Completed);
        info!(
            element = ?source,
            created = result.created.len(),
            rehosted = result.rehosted.len(),
            unresolved = result.unresolved.len(),
            skipped = result.skipped_layers.len(),
            "element decomposed"
        );
        Ok(result)
    }

    fn validate<H: HostModel + ?Sized>(
        &self,
        host: &mut H,
        source: ElementId,
    ) -> Result<SourceElement, DecomposeError> {
        let base_type = host
            .read_element_type(source)
            .ok_or_else(|| DecomposeError::NotDecomposable("element has no type".to_owned()))?;
        let structure = host.read_compound_structure(source).ok_or_else(|| {
            DecomposeError::NotDecomposable("element type has no compound structure".to_owned())
        })?;
        let nonzero = structure.nonzero_layer_count();
        if nonzero < 2 {
            return Err(DecomposeError::NotDecomposable(format!(
                "structure has {nonzero} nonzero-width layer(s), at least 2 are required"
            )));
        }
        let curve = host.read_path_curve(source).ok_or_else(|| {
            DecomposeError::NotDecomposable("element has no path curve".to_owned())
        })?;

        // Blockers are known before anything is created.
        match self.config.removal {
            RemovalPolicy::Keep => {}
            RemovalPolicy::Remove => {
                if let Err(blockers) = host.can_remove(source) {
                    return Err(removal_blocked(source, blockers));
                }
            }
            RemovalPolicy::ForceRemove => {
                if let Err(blockers) = host.can_remove(source) {
                    debug!(element = ?source, ?blockers, "releasing removal blockers");
                    let remaining = host.release_blockers(source, &blockers);
                    if !remaining.is_empty() {
                        return Err(removal_blocked(source, remaining));
                    }
                }
            }
        }

        Ok(SourceElement {
            id: source,
            base_type,
            structure,
            curve,
            normal: host.read_normal(source),
            properties: host.read_properties(source),
            instances: host.list_attached_instances(source),
        })
    }

    fn create_layer<H: HostModel + ?Sized>(
        &mut self,
        host: &mut H,
        input: &SourceElement,
        placement: LayerPlacement,
    ) -> Result<CreatedLayer, LayerError> {
        let layer = placement.layer_index;
        let resolved = self
            .cache
            .resolve(host, input.base_type, &placement.layer, layer)?;

        // Coincident layers share the path, so there is no interior side.
        let flip = match self.config.placement {
            PlacementStrategy::Adjacent => self.config.flip,
            PlacementStrategy::Coincident => FlipPolicy::Preserve,
        };
        let transposed = Transpose::new(&input.curve, input.normal, placement.offset)
            .with_tolerance(self.config.tolerances.offset)
            .with_flip(input.properties.flipped, flip)
            .execute();

        let spec = ElementSpec {
            curve: transposed.curve,
            element_type: resolved.id,
            extent: input.properties.extent,
            flipped: transposed.flipped,
            structural: input.properties.structural,
            reference_line: input.properties.reference_line,
        };
        let element = host
            .create_element(&spec)
            .map_err(|source| LayerError::LayerCreationFailed { layer, source })?;

        if let Err(error) = host.copy_attributes(input.id, element) {
            warn!(element = ?element, layer, %error, "could not copy attributes");
        }
        debug!(
            element = ?element,
            layer,
            offset = placement.offset,
            resolution = ?resolved.resolution,
            "layer element created"
        );

        Ok(CreatedLayer {
            element,
            element_type: resolved.id,
            placement,
            flipped: transposed.flipped,
        })
    }
}

fn removal_blocked(element: ElementId, blockers: Vec<String>) -> DecomposeError {
    DecomposeError::OriginalRemovalBlocked {
        element,
        blockers,
        created: 0,
    }
}

fn rehost<H: HostModel + ?Sized>(
    host: &mut H,
    input: &SourceElement,
    result: &mut DecompositionResult,
    band_tolerance: f64,
) {
    let placements: Vec<LayerPlacement> = result
        .created
        .iter()
        .map(|layer| layer.placement.clone())
        .collect();
    let resolver = ResolveHost::new(&placements, Some(&input.curve), &input.normal)
        .with_tolerance(band_tolerance);

    for instance in &input.instances {
        let Some(found) = resolver.execute(instance) else {
            result
                .unresolved
                .push(RehostUnresolved::NoCandidate(instance.id));
            continue;
        };
        let target = &result.created[found.index];
        match host.reassign_host(instance.id, target.element) {
            Ok(()) => {
                debug!(
                    instance = ?instance.id,
                    host = ?target.element,
                    layer = target.placement.layer_index,
                    reason = ?found.reason,
                    "instance rehosted"
                );
                result.rehosted.push(RehostedInstance {
                    instance: instance.id,
                    host: target.element,
                    reason: found.reason,
                });
            }
            Err(error) => {
                warn!(instance = ?instance.id, %error, "instance could not be rehosted");
                result.unresolved.push(RehostUnresolved::HostRejected {
                    instance: instance.id,
                    reason: error.to_string(),
                });
            }
        }
    }
}
