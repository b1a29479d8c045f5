use std::fmt;

/// Lifecycle of a single decomposition.
///
/// `Idle → ValidatingInput → ComputingLayout → CreatingLayers → Rehosting
/// → RemovingOriginal → Completed`, with `Aborted` reachable from any
/// non-terminal stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    #[default]
    Idle,
    ValidatingInput,
    ComputingLayout,
    /// Working on the layer with this ordinal in the source structure.
    CreatingLayers { layer: usize },
    Rehosting,
    RemovingOriginal,
    Completed,
    Aborted,
}

impl Stage {
    /// Whether no further transition is possible.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Aborted)
    }

    fn rank(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::ValidatingInput => 1,
            Self::ComputingLayout => 2,
            Self::CreatingLayers { .. } => 3,
            Self::Rehosting => 4,
            Self::RemovingOriginal => 5,
            Self::Completed | Self::Aborted => 6,
        }
    }

    /// Whether moving from `self` to `next` follows the lifecycle.
    ///
    /// Stages may be skipped (removal is optional) but never revisited,
    /// except for advancing between layers.
    #[must_use]
    pub fn can_advance_to(self, next: Self) -> bool {
        if self.is_terminal() {
            return false;
        }
        match (self, next) {
            (_, Self::Aborted) => true,
            (Self::CreatingLayers { layer: a }, Self::CreatingLayers { layer: b }) => b > a,
            _ => next.rank() > self.rank(),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::ValidatingInput => f.write_str("validating input"),
            Self::ComputingLayout => f.write_str("computing layout"),
            Self::CreatingLayers { layer } => write!(f, "creating layer {}", layer + 1),
            Self::Rehosting => f.write_str("rehosting"),
            Self::RemovingOriginal => f.write_str("removing original"),
            Self::Completed => f.write_str("completed"),
            Self::Aborted => f.write_str("aborted"),
        }
    }
}
