mod layer;
mod reference;

pub use layer::{Layer, LayerFunction};
pub use reference::ReferenceLine;

use crate::error::StructureError;

/// Inclusive index range of the core layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoreRange {
    pub first: usize,
    pub last: usize,
}

impl CoreRange {
    /// Creates a new core range.
    #[must_use]
    pub fn new(first: usize, last: usize) -> Self {
        Self { first, last }
    }

    /// Whether `index` lies inside the core.
    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        (self.first..=self.last).contains(&index)
    }
}

/// Thickness of a structure partitioned at its core boundaries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoreThicknesses {
    /// Layers before the core (exterior side).
    pub exterior: f64,
    pub core: f64,
    /// Layers after the core (interior side).
    pub interior: f64,
}

/// Ordered layer stack of a multi-layer element, exterior to interior.
///
/// Immutable once built; every index stored in [`CoreRange`] is checked
/// against the layer count on construction.
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundStructure {
    layers: Vec<Layer>,
    core: Option<CoreRange>,
}

impl CompoundStructure {
    /// Creates a structure from its layers and optional core range.
    ///
    /// # Errors
    ///
    /// Returns an error if a width is negative or non-finite, or if the core
    /// range is inverted or points past the last layer.
    pub fn new(layers: Vec<Layer>, core: Option<CoreRange>) -> Result<Self, StructureError> {
        for (index, layer) in layers.iter().enumerate() {
            if !layer.width.is_finite() || layer.width < 0.0 {
                return Err(StructureError::InvalidWidth {
                    index,
                    width: layer.width,
                });
            }
        }

        if let Some(range) = core {
            if range.first > range.last {
                return Err(StructureError::InvertedCore {
                    first: range.first,
                    last: range.last,
                });
            }
            if range.last >= layers.len() {
                return Err(StructureError::CoreIndexOutOfRange {
                    index: range.last,
                    layer_count: layers.len(),
                });
            }
        }

        Ok(Self { layers, core })
    }

    /// Returns the layers, exterior first.
    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Returns the layer at `index`, if any.
    #[must_use]
    pub fn layer(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Returns the core range, or `None` if the structure has no core concept.
    #[must_use]
    pub fn core(&self) -> Option<CoreRange> {
        self.core
    }

    /// Number of layers with a nonzero width.
    #[must_use]
    pub fn nonzero_layer_count(&self) -> usize {
        self.layers.iter().filter(|layer| !layer.is_empty()).count()
    }

    /// Sum of all layer widths.
    #[must_use]
    pub fn total_thickness(&self) -> f64 {
        self.layers.iter().map(|layer| layer.width).sum()
    }

    /// Sum of the widths of the layers before `index`.
    #[must_use]
    pub fn cumulative_width_before(&self, index: usize) -> f64 {
        self.layers.iter().take(index).map(|layer| layer.width).sum()
    }

    /// Partitions the total thickness at the core boundaries.
    ///
    /// Returns `None` when the structure has no core.
    #[must_use]
    pub fn core_thicknesses(&self) -> Option<CoreThicknesses> {
        let range = self.core?;
        let mut split = CoreThicknesses {
            exterior: 0.0,
            core: 0.0,
            interior: 0.0,
        };
        for (index, layer) in self.layers.iter().enumerate() {
            if index < range.first {
                split.exterior += layer.width;
            } else if index > range.last {
                split.interior += layer.width;
            } else {
                split.core += layer.width;
            }
        }
        Some(split)
    }
}
