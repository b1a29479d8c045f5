use std::fmt;

/// The zero-point convention an element's path curve follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReferenceLine {
    #[default]
    Centerline,
    CoreCenterline,
    ExteriorFace,
    InteriorFace,
    CoreExteriorFace,
    CoreInteriorFace,
}

impl ReferenceLine {
    /// All reference lines, ordered by host code.
    pub const ALL: [Self; 6] = [
        Self::Centerline,
        Self::CoreCenterline,
        Self::ExteriorFace,
        Self::InteriorFace,
        Self::CoreExteriorFace,
        Self::CoreInteriorFace,
    ];

    /// Decodes the host's integer code. Unknown codes map to [`Self::Centerline`].
    #[must_use]
    pub fn from_code(code: i32) -> Self {
        usize::try_from(code)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .unwrap_or_default()
    }

    /// The host's integer code for this reference line.
    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            Self::Centerline => 0,
            Self::CoreCenterline => 1,
            Self::ExteriorFace => 2,
            Self::InteriorFace => 3,
            Self::CoreExteriorFace => 4,
            Self::CoreInteriorFace => 5,
        }
    }

    /// Whether the line is measured relative to the core region.
    #[must_use]
    pub fn is_core_relative(self) -> bool {
        matches!(
            self,
            Self::CoreCenterline | Self::CoreExteriorFace | Self::CoreInteriorFace
        )
    }
}

impl fmt::Display for ReferenceLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Centerline => "centerline",
            Self::CoreCenterline => "core centerline",
            Self::ExteriorFace => "exterior face",
            Self::InteriorFace => "interior face",
            Self::CoreExteriorFace => "core exterior face",
            Self::CoreInteriorFace => "core interior face",
        };
        f.write_str(name)
    }
}
