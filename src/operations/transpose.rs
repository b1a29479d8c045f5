use crate::config::FlipPolicy;
use crate::geometry::PathCurve;
use crate::math::{normalize_or, Vector3};

/// Axis used when an element reports a degenerate normal.
#[must_use]
pub fn fallback_normal() -> Vector3 {
    Vector3::y()
}

/// Default offset below which a path is returned unchanged.
pub const DEFAULT_OFFSET_TOLERANCE: f64 = 1e-9;

/// Normalizes an element normal, substituting [`fallback_normal`] when degenerate.
#[must_use]
pub fn unit_normal(normal: &Vector3) -> Vector3 {
    normalize_or(normal, fallback_normal())
}

/// Decides the `flipped` flag of a layer element placed at `offset`.
///
/// With [`FlipPolicy::ToggleOnInteriorSide`] the source flag is toggled for
/// layers lying strictly on the negative (interior) side of the path.
#[must_use]
pub fn flipped_for(source_flipped: bool, offset: f64, policy: FlipPolicy, tolerance: f64) -> bool {
    match policy {
        FlipPolicy::Preserve => source_flipped,
        FlipPolicy::ToggleOnInteriorSide => source_flipped ^ (offset < -tolerance),
    }
}

/// Output of [`Transpose`].
#[derive(Debug, Clone, PartialEq)]
pub struct TransposeResult {
    pub curve: PathCurve,
    pub flipped: bool,
}

/// Moves a path curve sideways along an element normal.
pub struct Transpose<'a> {
    curve: &'a PathCurve,
    normal: Vector3,
    offset: f64,
    tolerance: f64,
    source_flipped: bool,
    flip: FlipPolicy,
}

impl<'a> Transpose<'a> {
    /// Creates a new `Transpose` operation. `normal` need not be normalized.
    #[must_use]
    pub fn new(curve: &'a PathCurve, normal: Vector3, offset: f64) -> Self {
        Self {
            curve,
            normal,
            offset,
            tolerance: DEFAULT_OFFSET_TOLERANCE,
            source_flipped: false,
            flip: FlipPolicy::Preserve,
        }
    }

    /// Sets the offset tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the source element's flag and the policy deriving the new one.
    #[must_use]
    pub fn with_flip(mut self, source_flipped: bool, policy: FlipPolicy) -> Self {
        self.source_flipped = source_flipped;
        self.flip = policy;
        self
    }

    /// Executes the transposition.
    #[must_use]
    pub fn execute(&self) -> TransposeResult {
        let flipped = flipped_for(self.source_flipped, self.offset, self.flip, self.tolerance);
        if self.offset.abs() < self.tolerance {
            return TransposeResult {
                curve: self.curve.clone(),
                flipped,
            };
        }

        let displacement = unit_normal(&self.normal) * self.offset;
        TransposeResult {
            curve: self.curve.translated(&displacement),
            flipped,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::{Arc, Curve, Line};
    use crate::math::Point3;

    fn segment() -> PathCurve {
        Line::new(Point3::origin(), Point3::new(10.0, 0.0, 0.0))
            .unwrap()
            .into()
    }

    #[test]
    fn tiny_offset_returns_original_curve() {
        let curve = segment();
        let result = Transpose::new(&curve, Vector3::y(), 1e-12).execute();
        assert_eq!(result.curve, curve);
    }

    #[test]
    fn translates_along_normal() {
        let curve = segment();
        let result = Transpose::new(&curve, Vector3::new(0.0, 2.0, 0.0), -0.25).execute();
        let start = result.curve.evaluate(0.0).unwrap();
        assert!((start - Point3::new(0.0, -0.25, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn degenerate_normal_uses_fallback_axis() {
        let curve = segment();
        let result = Transpose::new(&curve, Vector3::zeros(), 0.5).execute();
        let start = result.curve.evaluate(0.0).unwrap();
        assert!((start - Point3::new(0.0, 0.5, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn arcs_move_rigidly() {
        let curve: PathCurve = Arc::new(
            Point3::origin(),
            3.0,
            Vector3::z(),
            Vector3::x(),
            0.0,
            std::f64::consts::PI,
        )
        .unwrap()
        .into();
        let result = Transpose::new(&curve, Vector3::x(), 1.0).execute();
        let PathCurve::Arc(arc) = &result.curve else {
            panic!("expected an arc");
        };
        assert!((arc.center() - Point3::new(1.0, 0.0, 0.0)).norm() < 1e-12);
        assert!((arc.radius() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn flip_policy() {
        let curve = segment();
        let exterior = Transpose::new(&curve, Vector3::y(), 0.2)
            .with_flip(false, FlipPolicy::ToggleOnInteriorSide)
            .execute();
        let interior = Transpose::new(&curve, Vector3::y(), -0.2)
            .with_flip(false, FlipPolicy::ToggleOnInteriorSide)
            .execute();
        let preserved = Transpose::new(&curve, Vector3::y(), -0.2)
            .with_flip(true, FlipPolicy::Preserve)
            .execute();

        assert!(!exterior.flipped);
        assert!(interior.flipped);
        assert!(preserved.flipped);
        assert!(!flipped_for(true, -0.2, FlipPolicy::ToggleOnInteriorSide, 1e-9));
    }
}
