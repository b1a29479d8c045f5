use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};

use super::{Curve, CurveDomain};

/// A circular arc in 3D space.
///
/// Defined by a center, radius, normal axis, and a reference direction
/// for the zero-angle. The parametric form sweeps from `start_angle`
/// to `end_angle` (in radians) around the normal axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Arc {
    center: Point3,
    radius: f64,
    normal: Vector3,
    ref_dir: Vector3,
    start_angle: f64,
    end_angle: f64,
}

impl Arc {
    /// Creates a new arc.
    ///
    /// # Arguments
    ///
    /// * `center` - Center of the arc circle
    /// * `radius` - Radius (must be positive)
    /// * `normal` - Normal vector defining the arc plane
    /// * `ref_dir` - Reference direction for angle = 0 (must be perpendicular to normal)
    /// * `start_angle` - Start angle in radians
    /// * `end_angle` - End angle in radians, greater than `start_angle`
    ///
    /// # Errors
    ///
    /// Returns an error if the radius is non-positive, the normal is zero-length,
    /// the reference direction is not perpendicular to the normal, or the sweep
    /// is empty or exceeds a full turn.
    pub fn new(
        center: Point3,
        radius: f64,
        normal: Vector3,
        ref_dir: Vector3,
        start_angle: f64,
        end_angle: f64,
    ) -> Result<Self> {
        if radius < TOLERANCE || !radius.is_finite() {
            return Err(GeometryError::Degenerate("arc radius must be positive".into()).into());
        }

        let normal_len = normal.norm();
        if normal_len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let normal = normal / normal_len;

        let ref_len = ref_dir.norm();
        if ref_len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let ref_dir = ref_dir / ref_len;

        if normal.dot(&ref_dir).abs() > TOLERANCE {
            return Err(GeometryError::Degenerate(
                "reference direction must be perpendicular to normal".into(),
            )
            .into());
        }

        let sweep = end_angle - start_angle;
        if sweep < TOLERANCE || sweep > std::f64::consts::TAU + TOLERANCE {
            return Err(GeometryError::ParameterOutOfRange {
                parameter: "sweep",
                value: sweep,
                min: 0.0,
                max: std::f64::consts::TAU,
            }
            .into());
        }

        Ok(Self {
            center,
            radius,
            normal,
            ref_dir,
            start_angle,
            end_angle,
        })
    }

    /// Returns the center of the arc.
    #[must_use]
    pub fn center(&self) -> &Point3 {
        &self.center
    }

    /// Returns the radius of the arc.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Returns the normal vector of the arc plane.
    #[must_use]
    pub fn normal(&self) -> &Vector3 {
        &self.normal
    }

    /// Returns the zero-angle reference direction.
    #[must_use]
    pub fn ref_dir(&self) -> &Vector3 {
        &self.ref_dir
    }

    /// Computes the second axis direction (perpendicular to both normal and `ref_dir`).
    pub(crate) fn binormal(&self) -> Vector3 {
        self.normal.cross(&self.ref_dir)
    }

    /// Returns a copy moved rigidly by `displacement`.
    #[must_use]
    pub fn translated(&self, displacement: &Vector3) -> Self {
        Self {
            center: self.center + displacement,
            ..self.clone()
        }
    }
}

impl Curve for Arc {
    fn evaluate(&self, t: f64) -> Result<Point3> {
        let binormal = self.binormal();
        let x = self.radius * t.cos();
        let y = self.radius * t.sin();
        Ok(self.center + self.ref_dir * x + binormal * y)
    }

    fn tangent(&self, t: f64) -> Result<Vector3> {
        let binormal = self.binormal();
        let dx = -self.radius * t.sin();
        let dy = self.radius * t.cos();
        let tangent = self.ref_dir * dx + binormal * dy;
        let len = tangent.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        Ok(tangent / len)
    }

    fn domain(&self) -> CurveDomain {
        CurveDomain::new(self.start_angle, self.end_angle)
    }

    fn is_closed(&self) -> bool {
        (self.end_angle - self.start_angle - std::f64::consts::TAU).abs() < TOLERANCE
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::f64::consts::{FRAC_PI_2, PI};

    use super::*;

    fn quarter() -> Arc {
        Arc::new(
            Point3::origin(),
            2.0,
            Vector3::z(),
            Vector3::x(),
            0.0,
            FRAC_PI_2,
        )
        .unwrap()
    }

    #[test]
    fn evaluates_endpoints() {
        let arc = quarter();
        let start = arc.evaluate(0.0).unwrap();
        let end = arc.evaluate(FRAC_PI_2).unwrap();
        assert!((start - Point3::new(2.0, 0.0, 0.0)).norm() < 1e-12);
        assert!((end - Point3::new(0.0, 2.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn rejects_empty_sweep() {
        let result = Arc::new(Point3::origin(), 1.0, Vector3::z(), Vector3::x(), PI, PI);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_non_perpendicular_reference() {
        let result = Arc::new(
            Point3::origin(),
            1.0,
            Vector3::z(),
            Vector3::new(1.0, 0.0, 1.0),
            0.0,
            PI,
        );
        assert!(result.is_err());
    }

    #[test]
    fn translation_moves_center_only() {
        let arc = quarter().translated(&Vector3::new(0.0, 0.0, 3.0));
        assert!((arc.center().z - 3.0).abs() < 1e-12);
        assert!((arc.radius() - 2.0).abs() < 1e-12);
    }
}
