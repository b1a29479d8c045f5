use crate::geometry::PathCurve;
use crate::host::{InstanceDescriptor, InstanceLocation};
use crate::math::{Point3, Vector3};
use crate::operations::layout::LayerPlacement;
use crate::operations::query::ClosestPointOnCurve;
use crate::operations::transpose::unit_normal;
use crate::structure::LayerFunction;

/// Default widening applied to each layer band.
pub const DEFAULT_BAND_TOLERANCE: f64 = 1e-6;

/// Why a layer was chosen for an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchReason {
    /// The instance's lateral offset falls inside the layer's band.
    Band,
    /// No band matched; the first structural layer was taken.
    StructureFallback,
    /// No band matched and no structural layer exists; the widest layer was taken.
    WidestFallback,
}

/// Recommended new host for one instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostMatch {
    /// Index into the placements passed to [`ResolveHost::new`].
    pub index: usize,
    pub reason: MatchReason,
}

/// Representative point of an instance: its location point, or the
/// midpoint of its location curve.
#[must_use]
pub fn instance_point(location: &InstanceLocation) -> Option<Point3> {
    match location {
        InstanceLocation::Point(point) => Some(*point),
        InstanceLocation::Curve(curve) => curve.midpoint().ok(),
        InstanceLocation::Unknown => None,
    }
}

/// Signed distance of `point` from `curve` measured along `unit_normal`.
///
/// Returns `None` when the projection fails.
#[must_use]
pub fn lateral_offset(point: &Point3, curve: &PathCurve, unit_normal: &Vector3) -> Option<f64> {
    let projection = ClosestPointOnCurve::new(curve, *point).execute().ok()?;
    let offset = (point - projection.point).dot(unit_normal);
    offset.is_finite().then_some(offset)
}

/// Picks the layer element that should host each attached instance.
///
/// The instance is projected onto the original path; the layer whose band
/// contains its lateral offset wins, ties going to the nearest center.
/// Without a usable offset or band, the first structural layer is chosen,
/// then the widest one.
pub struct ResolveHost<'a> {
    placements: &'a [LayerPlacement],
    curve: Option<&'a PathCurve>,
    normal: Vector3,
    tolerance: f64,
}

impl<'a> ResolveHost<'a> {
    /// Creates a resolver over the created layers' placements.
    #[must_use]
    pub fn new(placements: &'a [LayerPlacement], curve: Option<&'a PathCurve>, normal: &Vector3) -> Self {
        Self {
            placements,
            curve,
            normal: unit_normal(normal),
            tolerance: DEFAULT_BAND_TOLERANCE,
        }
    }

    /// Sets the band widening tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Lateral offset of `instance` from the path, if it can be measured.
    #[must_use]
    pub fn instance_offset(&self, instance: &InstanceDescriptor) -> Option<f64> {
        let point = instance_point(&instance.location)?;
        lateral_offset(&point, self.curve?, &self.normal)
    }

    /// Resolves the new host for `instance`. `None` only when there are no placements.
    #[must_use]
    pub fn execute(&self, instance: &InstanceDescriptor) -> Option<HostMatch> {
        if let Some(offset) = self.instance_offset(instance) {
            if let Some(index) = self.band_match(offset) {
                return Some(HostMatch {
                    index,
                    reason: MatchReason::Band,
                });
            }
        }
        self.fallback()
    }

    fn band_match(&self, offset: f64) -> Option<usize> {
        self.placements
            .iter()
            .enumerate()
            .filter(|(_, placement)| placement.contains(offset, self.tolerance))
            .min_by(|(_, a), (_, b)| {
                (a.band_offset - offset)
                    .abs()
                    .total_cmp(&(b.band_offset - offset).abs())
            })
            .map(|(index, _)| index)
    }

    fn fallback(&self) -> Option<HostMatch> {
        if let Some(index) = self
            .placements
            .iter()
            .position(|placement| placement.layer.function == LayerFunction::Structure)
        {
            return Some(HostMatch {
                index,
                reason: MatchReason::StructureFallback,
            });
        }

        // First of equally wide layers wins.
        let mut widest: Option<(usize, f64)> = None;
        for (index, placement) in self.placements.iter().enumerate() {
            if widest.is_none_or(|(_, width)| placement.layer.width > width) {
                widest = Some((index, placement.layer.width));
            }
        }
        widest.map(|(index, _)| HostMatch {
            index,
            reason: MatchReason::WidestFallback,
        })
    }
}
