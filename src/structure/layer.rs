use std::fmt;

use crate::host::MaterialId;

/// The role a layer plays in the assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerFunction {
    Structure,
    Substrate,
    Insulation,
    Finish1,
    Finish2,
    Membrane,
    Other,
}

impl LayerFunction {
    /// Human-readable name used in generated type names.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Structure => "Structure",
            Self::Substrate => "Substrate",
            Self::Insulation => "Insulation",
            Self::Finish1 => "Finish 1",
            Self::Finish2 => "Finish 2",
            Self::Membrane => "Membrane",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for LayerFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One material layer of a compound structure.
///
/// A layer's ordinal is its position in [`super::CompoundStructure::layers`],
/// with 0 the outermost (exterior) layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layer {
    /// Thickness in model length units.
    pub width: f64,
    pub function: LayerFunction,
    /// `None` means the host's default material.
    pub material: Option<MaterialId>,
}

impl Layer {
    /// Creates a new layer.
    #[must_use]
    pub fn new(width: f64, function: LayerFunction, material: Option<MaterialId>) -> Self {
        Self {
            width,
            function,
            material,
        }
    }

    /// Half of the layer thickness.
    #[must_use]
    pub fn half_width(&self) -> f64 {
        self.width / 2.0
    }

    /// Whether the layer has no thickness.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0
    }
}
