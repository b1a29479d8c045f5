use std::collections::{BTreeMap, HashSet};

use slotmap::SlotMap;

use crate::error::HostError;
use crate::geometry::PathCurve;
use crate::math::Vector3;
use crate::structure::CompoundStructure;

use super::{
    ElementId, ElementProperties, ElementSpec, ElementTypeId, HostModel, InstanceCategory,
    InstanceDescriptor, InstanceId, InstanceLocation, LevelId, MaterialId, SingleLayerTypeSpec,
    TypeRegistry,
};

/// A stored element.
#[derive(Debug, Clone)]
pub struct ElementRecord {
    pub element_type: ElementTypeId,
    pub curve: Option<PathCurve>,
    pub normal: Vector3,
    pub properties: ElementProperties,
    pub attributes: BTreeMap<String, String>,
    blockers: Vec<Blocker>,
}

/// A stored element type.
#[derive(Debug, Clone)]
pub struct TypeRecord {
    pub name: String,
    pub structure: Option<CompoundStructure>,
    pub structural_material: Option<MaterialId>,
}

/// A stored attached instance.
#[derive(Debug, Clone)]
pub struct InstanceRecord {
    pub host: Option<ElementId>,
    pub location: InstanceLocation,
    pub category: InstanceCategory,
}

#[derive(Debug, Clone)]
struct Blocker {
    reason: String,
    releasable: bool,
}

/// In-memory host model backed by generational arenas.
///
/// Cloning the model takes a snapshot; restoring a clone emulates a
/// transaction rollback.
#[derive(Debug, Clone, Default)]
pub struct MemoryModel {
    elements: SlotMap<ElementId, ElementRecord>,
    types: SlotMap<ElementTypeId, TypeRecord>,
    instances: SlotMap<InstanceId, InstanceRecord>,
    materials: SlotMap<MaterialId, String>,
    levels: SlotMap<LevelId, String>,
    rejected_materials: HashSet<MaterialId>,
    rejected_rehosts: HashSet<InstanceId>,
    duplications: usize,
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

impl MemoryModel {
    /// Creates a new, empty model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Population ---

    pub fn add_material(&mut self, name: impl Into<String>) -> MaterialId {
        self.materials.insert(name.into())
    }

    pub fn add_level(&mut self, name: impl Into<String>) -> LevelId {
        self.levels.insert(name.into())
    }

    pub fn add_type(
        &mut self,
        name: impl Into<String>,
        structure: Option<CompoundStructure>,
    ) -> ElementTypeId {
        self.types.insert(TypeRecord {
            name: name.into(),
            structure,
            structural_material: None,
        })
    }

    pub fn add_element(
        &mut self,
        element_type: ElementTypeId,
        curve: Option<PathCurve>,
        normal: Vector3,
        properties: ElementProperties,
    ) -> ElementId {
        self.elements.insert(ElementRecord {
            element_type,
            curve,
            normal,
            properties,
            attributes: BTreeMap::new(),
            blockers: Vec::new(),
        })
    }

    pub fn attach_instance(
        &mut self,
        host: ElementId,
        location: InstanceLocation,
        category: InstanceCategory,
    ) -> InstanceId {
        self.instances.insert(InstanceRecord {
            host: Some(host),
            location,
            category,
        })
    }

    /// Sets a host-defined attribute on an element.
    pub fn set_attribute(&mut self, element: ElementId, key: &str, value: &str) {
        if let Some(record) = self.elements.get_mut(element) {
            record.attributes.insert(key.to_owned(), value.to_owned());
        }
    }

    // --- Failure injection ---

    /// Prevents removal of `element`. Releasable blockers are cleared by
    /// [`HostModel::release_blockers`].
    pub fn block_removal(&mut self, element: ElementId, reason: impl Into<String>, releasable: bool) {
        if let Some(record) = self.elements.get_mut(element) {
            record.blockers.push(Blocker {
                reason: reason.into(),
                releasable,
            });
        }
    }

    /// Makes element creation fail for single-layer types of `material`.
    pub fn reject_creation_for(&mut self, material: MaterialId) {
        self.rejected_materials.insert(material);
    }

    /// Makes host reassignment fail for `instance`.
    pub fn reject_rehost(&mut self, instance: InstanceId) {
        self.rejected_rehosts.insert(instance);
    }

    /// Deletes a type, leaving stale handles behind.
    pub fn remove_type(&mut self, id: ElementTypeId) -> Option<TypeRecord> {
        self.types.remove(id)
    }

    // --- Inspection ---

    #[must_use]
    pub fn element(&self, id: ElementId) -> Option<&ElementRecord> {
        self.elements.get(id)
    }

    #[must_use]
    pub fn element_type(&self, id: ElementTypeId) -> Option<&TypeRecord> {
        self.types.get(id)
    }

    #[must_use]
    pub fn instance(&self, id: InstanceId) -> Option<&InstanceRecord> {
        self.instances.get(id)
    }

    #[must_use]
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// Number of successful type duplications since the model was created.
    #[must_use]
    pub fn duplication_count(&self) -> usize {
        self.duplications
    }

    fn single_layer_material(&self, id: ElementTypeId) -> Option<MaterialId> {
        let structure = self.types.get(id)?.structure.as_ref()?;
        match structure.layers() {
            [layer] => layer.material,
            _ => None,
        }
    }
}

impl TypeRegistry for MemoryModel {
    fn type_exists(&self, id: ElementTypeId) -> bool {
        self.types.contains_key(id)
    }

    fn type_name(&self, id: ElementTypeId) -> Option<String> {
        self.types.get(id).map(|record| record.name.clone())
    }

    fn material_name(&self, id: MaterialId) -> Option<String> {
        self.materials.get(id).cloned()
    }

    fn find_type_by_name(&self, name: &str) -> Option<ElementTypeId> {
        let key = normalize_name(name);
        if key.is_empty() {
            return None;
        }
        self.types
            .iter()
            .find(|(_, record)| normalize_name(&record.name) == key)
            .map(|(id, _)| id)
    }

    fn duplicate_type(
        &mut self,
        base: ElementTypeId,
        spec: &SingleLayerTypeSpec,
    ) -> Result<ElementTypeId, HostError> {
        if !self.types.contains_key(base) {
            return Err(HostError::NotFound("base type".into()));
        }
        if self.find_type_by_name(&spec.name).is_some() {
            return Err(HostError::NameTaken(spec.name.clone()));
        }
        let structure = CompoundStructure::new(vec![spec.layer], None)
            .map_err(|e| HostError::Rejected(e.to_string()))?;
        self.duplications += 1;
        Ok(self.types.insert(TypeRecord {
            name: spec.name.clone(),
            structure: Some(structure),
            structural_material: None,
        }))
    }

    fn set_structural_material(
        &mut self,
        id: ElementTypeId,
        material: MaterialId,
    ) -> Result<(), HostError> {
        let record = self
            .types
            .get_mut(id)
            .ok_or_else(|| HostError::NotFound("type".into()))?;
        record.structural_material = Some(material);
        Ok(())
    }
}

impl HostModel for MemoryModel {
    fn read_element_type(&self, element: ElementId) -> Option<ElementTypeId> {
        self.elements.get(element).map(|record| record.element_type)
    }

    fn read_compound_structure(&self, element: ElementId) -> Option<CompoundStructure> {
        let type_id = self.read_element_type(element)?;
        self.types.get(type_id)?.structure.clone()
    }

    fn read_path_curve(&self, element: ElementId) -> Option<PathCurve> {
        self.elements.get(element)?.curve.clone()
    }

    fn read_normal(&self, element: ElementId) -> Vector3 {
        self.elements
            .get(element)
            .map_or_else(Vector3::zeros, |record| record.normal)
    }

    fn read_properties(&self, element: ElementId) -> ElementProperties {
        self.elements
            .get(element)
            .map(|record| record.properties)
            .unwrap_or_default()
    }

    fn list_attached_instances(&self, element: ElementId) -> Vec<InstanceDescriptor> {
        self.instances
            .iter()
            .filter(|(_, record)| record.host == Some(element))
            .map(|(id, record)| InstanceDescriptor {
                id,
                location: record.location.clone(),
                category: record.category,
            })
            .collect()
    }

    fn create_element(&mut self, spec: &ElementSpec) -> Result<ElementId, HostError> {
        if !self.types.contains_key(spec.element_type) {
            return Err(HostError::NotFound("element type".into()));
        }
        if let Some(material) = self.single_layer_material(spec.element_type) {
            if self.rejected_materials.contains(&material) {
                return Err(HostError::Rejected("element creation refused".into()));
            }
        }
        Ok(self.elements.insert(ElementRecord {
            element_type: spec.element_type,
            curve: Some(spec.curve.clone()),
            normal: Vector3::zeros(),
            properties: ElementProperties {
                reference_line: spec.reference_line,
                flipped: spec.flipped,
                structural: spec.structural,
                extent: spec.extent,
            },
            attributes: BTreeMap::new(),
            blockers: Vec::new(),
        }))
    }

    fn copy_attributes(&mut self, from: ElementId, to: ElementId) -> Result<(), HostError> {
        let attributes = self
            .elements
            .get(from)
            .ok_or_else(|| HostError::NotFound("source element".into()))?
            .attributes
            .clone();
        let target = self
            .elements
            .get_mut(to)
            .ok_or_else(|| HostError::NotFound("target element".into()))?;
        target.attributes.extend(attributes);
        Ok(())
    }

    fn reassign_host(
        &mut self,
        instance: InstanceId,
        new_host: ElementId,
    ) -> Result<(), HostError> {
        if !self.elements.contains_key(new_host) {
            return Err(HostError::NotFound("host element".into()));
        }
        if self.rejected_rehosts.contains(&instance) {
            return Err(HostError::Rejected("host parameter is read-only".into()));
        }
        let record = self
            .instances
            .get_mut(instance)
            .ok_or_else(|| HostError::NotFound("instance".into()))?;
        record.host = Some(new_host);
        Ok(())
    }

    fn can_remove(&self, element: ElementId) -> Result<(), Vec<String>> {
        let Some(record) = self.elements.get(element) else {
            return Err(vec!["element no longer exists".to_owned()]);
        };
        if record.blockers.is_empty() {
            Ok(())
        } else {
            Err(record.blockers.iter().map(|b| b.reason.clone()).collect())
        }
    }

    fn release_blockers(&mut self, element: ElementId, blockers: &[String]) -> Vec<String> {
        let Some(record) = self.elements.get_mut(element) else {
            return blockers.to_vec();
        };
        record
            .blockers
            .retain(|b| !(b.releasable && blockers.contains(&b.reason)));
        record.blockers.iter().map(|b| b.reason.clone()).collect()
    }

    fn remove_element(&mut self, element: ElementId) -> Result<(), HostError> {
        let record = self
            .elements
            .get(element)
            .ok_or_else(|| HostError::NotFound("element".into()))?;
        if let Some(blocker) = record.blockers.first() {
            return Err(HostError::Rejected(blocker.reason.clone()));
        }
        self.elements.remove(element);
        for instance in self.instances.values_mut() {
            if instance.host == Some(element) {
                instance.host = None;
            }
        }
        Ok(())
    }
}
