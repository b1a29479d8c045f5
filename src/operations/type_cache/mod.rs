pub mod naming;

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::config::NamingConfig;
use crate::error::{HostError, LayerError};
use crate::host::{ElementTypeId, MaterialId, SingleLayerTypeSpec, TypeRegistry};
use crate::structure::{Layer, LayerFunction};

/// Structural identity of a single-layer type.
///
/// Width is stored formatted to a fixed number of decimals so that widths
/// differing only by floating-point noise share a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LayerTypeKey {
    pub base: ElementTypeId,
    pub layer_index: usize,
    pub function: LayerFunction,
    pub material: Option<MaterialId>,
    pub width: String,
}

impl LayerTypeKey {
    #[must_use]
    pub fn new(base: ElementTypeId, layer: &Layer, layer_index: usize, precision: usize) -> Self {
        Self {
            base,
            layer_index,
            function: layer.function,
            material: layer.material,
            width: format!("{:.*}", precision, layer.width),
        }
    }
}

/// How a type handle was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Served from the cache.
    Cached,
    /// An existing type with the generated name was adopted.
    Adopted,
    /// A new type was duplicated from the base type.
    Created,
}

/// A resolved single-layer type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedType {
    pub id: ElementTypeId,
    pub resolution: Resolution,
}

/// Memoizes single-layer types for the duration of one run.
///
/// Within one cache, layers sharing a [`LayerTypeKey`] always resolve to the
/// same type, and at most one duplication is requested per key.
#[derive(Debug, Clone)]
pub struct LayerTypeCache {
    entries: HashMap<LayerTypeKey, ElementTypeId>,
    naming: NamingConfig,
    width_precision: usize,
}

impl Default for LayerTypeCache {
    fn default() -> Self {
        Self::new(NamingConfig::default(), 6)
    }
}

impl LayerTypeCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new(naming: NamingConfig, width_precision: usize) -> Self {
        Self {
            entries: HashMap::new(),
            naming,
            width_precision,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Returns the single-layer type for layer `layer_index` of `base`.
    ///
    /// Cached handles are revalidated against the registry and evicted when
    /// stale. On a miss, a type with the generated name is adopted if naming
    /// is enabled; otherwise the base type is duplicated.
    ///
    /// # Errors
    ///
    /// Returns [`LayerError::TypeResolutionFailed`] if duplication fails or
    /// every candidate name is taken.
    pub fn resolve<R: TypeRegistry + ?Sized>(
        &mut self,
        registry: &mut R,
        base: ElementTypeId,
        layer: &Layer,
        layer_index: usize,
    ) -> Result<ResolvedType, LayerError> {
        let key = LayerTypeKey::new(base, layer, layer_index, self.width_precision);

        if let Some(&cached) = self.entries.get(&key) {
            if registry.type_exists(cached) {
                debug!(layer = layer_index, "layer type served from cache");
                return Ok(ResolvedType {
                    id: cached,
                    resolution: Resolution::Cached,
                });
            }
            debug!(layer = layer_index, "cached layer type is stale, evicting");
            self.entries.remove(&key);
        }

        let base_name = registry.type_name(base).unwrap_or_default();
        let material_name = layer.material.and_then(|m| registry.material_name(m));
        let name = naming::layer_type_name(
            &base_name,
            layer,
            layer_index,
            material_name.as_deref(),
            &self.naming,
        );

        if self.naming.enabled {
            if let Some(existing) = registry.find_type_by_name(&name) {
                debug!(layer = layer_index, name = %name, "adopted existing layer type");
                self.entries.insert(key, existing);
                return Ok(ResolvedType {
                    id: existing,
                    resolution: Resolution::Adopted,
                });
            }
        }

        let created = self.duplicate(registry, base, layer, layer_index, &name)?;
        if let Some(material) = layer.material {
            if let Err(error) = registry.set_structural_material(created, material) {
                warn!(layer = layer_index, %error, "could not set structural material");
            }
        }
        self.entries.insert(key, created);
        Ok(ResolvedType {
            id: created,
            resolution: Resolution::Created,
        })
    }

    fn duplicate<R: TypeRegistry + ?Sized>(
        &self,
        registry: &mut R,
        base: ElementTypeId,
        layer: &Layer,
        layer_index: usize,
        name: &str,
    ) -> Result<ElementTypeId, LayerError> {
        for attempt in 1..=self.naming.max_attempts {
            let candidate = naming::candidate_name(name, attempt, self.naming.max_name_len);
            let spec = SingleLayerTypeSpec {
                name: candidate,
                layer: *layer,
            };
            match registry.duplicate_type(base, &spec) {
                Ok(id) => {
                    debug!(layer = layer_index, name = %spec.name, attempt, "created layer type");
                    return Ok(id);
                }
                Err(HostError::NameTaken(_)) => {
                    debug!(layer = layer_index, name = %spec.name, attempt, "type name taken");
                }
                Err(error) => {
                    return Err(LayerError::TypeResolutionFailed {
                        layer: layer_index,
                        reason: error.to_string(),
                    });
                }
            }
        }
        Err(LayerError::TypeResolutionFailed {
            layer: layer_index,
            reason: format!(
                "no free type name after {} attempts",
                self.naming.max_attempts
            ),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::host::MemoryModel;

    fn setup() -> (MemoryModel, ElementTypeId, Layer) {
        let mut model = MemoryModel::new();
        let concrete = model.add_material("Concrete");
        let base = model.add_type("Exterior 300", None);
        let layer = Layer::new(0.2, LayerFunction::Structure, Some(concrete));
        (model, base, layer)
    }

    #[test]
    fn identical_keys_resolve_to_one_type() {
        let (mut model, base, layer) = setup();
        let mut cache = LayerTypeCache::default();

        let first = cache.resolve(&mut model, base, &layer, 1).unwrap();
        let noisy = Layer {
            width: layer.width + 1e-10,
            ..layer
        };
        let second = cache.resolve(&mut model, base, &noisy, 1).unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.resolution, Resolution::Created);
        assert_eq!(second.resolution, Resolution::Cached);
        assert_eq!(model.duplication_count(), 1);
    }

    #[test]
    fn sets_structural_material_on_created_type() {
        let (mut model, base, layer) = setup();
        let mut cache = LayerTypeCache::default();
        let resolved = cache.resolve(&mut model, base, &layer, 0).unwrap();
        let record = model.element_type(resolved.id).unwrap();
        assert_eq!(record.structural_material, layer.material);
        assert_eq!(record.structure.as_ref().unwrap().layer_count(), 1);
    }

    #[test]
    fn second_run_adopts_by_name() {
        let (mut model, base, layer) = setup();
        let first = LayerTypeCache::default()
            .resolve(&mut model, base, &layer, 0)
            .unwrap();
        let second = LayerTypeCache::default()
            .resolve(&mut model, base, &layer, 0)
            .unwrap();

        assert_eq!(second.resolution, Resolution::Adopted);
        assert_eq!(first.id, second.id);
        assert_eq!(model.type_name(first.id), model.type_name(second.id));
        assert_eq!(model.duplication_count(), 1);
    }

    #[test]
    fn stale_handle_is_re_resolved() {
        let (mut model, base, layer) = setup();
        let mut cache = LayerTypeCache::default();
        let first = cache.resolve(&mut model, base, &layer, 0).unwrap();
        model.remove_type(first.id);

        let second = cache.resolve(&mut model, base, &layer, 0).unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(second.resolution, Resolution::Created);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn disabled_naming_creates_suffixed_type() {
        let (mut model, base, layer) = setup();
        LayerTypeCache::default()
            .resolve(&mut model, base, &layer, 0)
            .unwrap();

        let naming = NamingConfig {
            enabled: false,
            ..NamingConfig::default()
        };
        let resolved = LayerTypeCache::new(naming, 6)
            .resolve(&mut model, base, &layer, 0)
            .unwrap();

        assert_eq!(resolved.resolution, Resolution::Created);
        let name = model.type_name(resolved.id).unwrap();
        assert!(name.ends_with(" (2)"), "{name}");
    }

    #[test]
    fn exhausted_names_fail_resolution() {
        let (mut model, base, layer) = setup();
        let naming = NamingConfig {
            enabled: false,
            max_attempts: 1,
            ..NamingConfig::default()
        };
        LayerTypeCache::new(naming.clone(), 6)
            .resolve(&mut model, base, &layer, 0)
            .unwrap();

        let err = LayerTypeCache::new(naming, 6)
            .resolve(&mut model, base, &layer, 0)
            .unwrap_err();
        assert!(matches!(err, LayerError::TypeResolutionFailed { layer: 0, .. }));
    }

    #[test]
    fn missing_base_type_fails_resolution() {
        let (mut model, base, layer) = setup();
        model.remove_type(base);
        let err = LayerTypeCache::default()
            .resolve(&mut model, base, &layer, 0)
            .unwrap_err();
        assert!(matches!(err, LayerError::TypeResolutionFailed { .. }));
    }

    #[test]
    fn distinct_indices_get_distinct_types() {
        let (mut model, base, layer) = setup();
        let mut cache = LayerTypeCache::default();
        let a = cache.resolve(&mut model, base, &layer, 0).unwrap();
        let b = cache.resolve(&mut model, base, &layer, 1).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(cache.len(), 2);
    }
}
