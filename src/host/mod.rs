//! Abstractions over the host modeling application.
//!
//! The engine never owns host state. It reads element descriptions and
//! requests changes through [`HostModel`] and [`TypeRegistry`]; the caller
//! wraps every call of one command in a single host transaction.

mod memory;

pub use memory::MemoryModel;

use crate::error::HostError;
use crate::geometry::PathCurve;
use crate::math::{Point3, Vector3};
use crate::structure::{CompoundStructure, Layer, ReferenceLine};

slotmap::new_key_type! {
    /// Handle of a model element (a wall-like host element).
    pub struct ElementId;
}

slotmap::new_key_type! {
    /// Handle of an element type.
    pub struct ElementTypeId;
}

slotmap::new_key_type! {
    /// Handle of an object attached to a host element (door, window, fixture).
    pub struct InstanceId;
}

slotmap::new_key_type! {
    /// Handle of a material.
    pub struct MaterialId;
}

slotmap::new_key_type! {
    /// Handle of a level.
    pub struct LevelId;
}

/// Upper bound of an element's vertical extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TopConstraint {
    /// Height is given by `VerticalExtent::unconnected_height`.
    Unconnected,
    /// Attached to a level, shifted by `VerticalExtent::top_offset`.
    Level(LevelId),
}

/// Vertical placement copied verbatim from the source element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerticalExtent {
    pub base_level: Option<LevelId>,
    pub base_offset: f64,
    pub top: TopConstraint,
    pub top_offset: f64,
    pub unconnected_height: f64,
}

impl Default for VerticalExtent {
    fn default() -> Self {
        Self {
            base_level: None,
            base_offset: 0.0,
            top: TopConstraint::Unconnected,
            top_offset: 0.0,
            unconnected_height: 10.0,
        }
    }
}

/// Instance-level properties of a source element carried over to every layer element.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ElementProperties {
    pub reference_line: ReferenceLine,
    pub flipped: bool,
    pub structural: bool,
    pub extent: VerticalExtent,
}

/// Kind of attached object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstanceCategory {
    Door,
    Window,
    Opening,
    Fixture,
    Other,
}

/// Where an attached object sits.
#[derive(Debug, Clone, PartialEq)]
pub enum InstanceLocation {
    Point(Point3),
    /// Curve-based objects are sampled at their midpoint.
    Curve(PathCurve),
    /// The host exposes no usable location.
    Unknown,
}

/// An object attached to a source element.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceDescriptor {
    pub id: InstanceId,
    pub location: InstanceLocation,
    pub category: InstanceCategory,
}

/// Request to duplicate a base type restricted to a single layer.
#[derive(Debug, Clone, PartialEq)]
pub struct SingleLayerTypeSpec {
    pub name: String,
    pub layer: Layer,
}

/// Request to create one layer element.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementSpec {
    pub curve: PathCurve,
    pub element_type: ElementTypeId,
    pub extent: VerticalExtent,
    pub flipped: bool,
    pub structural: bool,
    pub reference_line: ReferenceLine,
}

/// Lookup and creation of element types.
pub trait TypeRegistry {
    /// Whether `id` still resolves to a live type.
    fn type_exists(&self, id: ElementTypeId) -> bool;

    /// Display name of a type.
    fn type_name(&self, id: ElementTypeId) -> Option<String>;

    /// Display name of a material.
    fn material_name(&self, id: MaterialId) -> Option<String>;

    /// Finds an existing type by name, ignoring case and surrounding whitespace.
    fn find_type_by_name(&self, name: &str) -> Option<ElementTypeId>;

    /// Duplicates `base` as a single-layer type named `spec.name`.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::NameTaken`] when the name is already used, or
    /// another [`HostError`] when the host refuses the duplication.
    fn duplicate_type(
        &mut self,
        base: ElementTypeId,
        spec: &SingleLayerTypeSpec,
    ) -> Result<ElementTypeId, HostError>;

    /// Sets the structural material attribute of a type.
    ///
    /// # Errors
    ///
    /// Returns an error if the host refuses the change.
    fn set_structural_material(
        &mut self,
        id: ElementTypeId,
        material: MaterialId,
    ) -> Result<(), HostError>;
}

/// The host model as seen by the decomposition engine.
pub trait HostModel: TypeRegistry {
    fn read_element_type(&self, element: ElementId) -> Option<ElementTypeId>;

    fn read_compound_structure(&self, element: ElementId) -> Option<CompoundStructure>;

    fn read_path_curve(&self, element: ElementId) -> Option<PathCurve>;

    /// Exterior-facing normal of the element. May be unnormalized or zero.
    fn read_normal(&self, element: ElementId) -> Vector3;

    fn read_properties(&self, element: ElementId) -> ElementProperties;

    fn list_attached_instances(&self, element: ElementId) -> Vec<InstanceDescriptor>;

    /// Creates a layer element.
    ///
    /// # Errors
    ///
    /// Returns an error if the host refuses to create the element.
    fn create_element(&mut self, spec: &ElementSpec) -> Result<ElementId, HostError>;

    /// Copies host-defined instance attributes (comments, mark, ...) between elements.
    ///
    /// # Errors
    ///
    /// Returns an error if the host refuses the copy.
    fn copy_attributes(&mut self, _from: ElementId, _to: ElementId) -> Result<(), HostError> {
        Ok(())
    }

    /// Moves an attached instance onto a new host element.
    ///
    /// # Errors
    ///
    /// Returns an error if the host refuses the reassignment.
    fn reassign_host(&mut self, instance: InstanceId, new_host: ElementId)
        -> Result<(), HostError>;

    /// Reports the reasons that prevent removing `element`, if any.
    ///
    /// # Errors
    ///
    /// Returns the list of blocker descriptions when removal is not allowed.
    fn can_remove(&self, element: ElementId) -> Result<(), Vec<String>>;

    /// Tries to clear `blockers` (unjoin geometry and the like) and returns those that remain.
    fn release_blockers(&mut self, _element: ElementId, blockers: &[String]) -> Vec<String> {
        blockers.to_vec()
    }

    /// Removes an element from the model.
    ///
    /// # Errors
    ///
    /// Returns an error if the host refuses the removal.
    fn remove_element(&mut self, element: ElementId) -> Result<(), HostError>;
}
