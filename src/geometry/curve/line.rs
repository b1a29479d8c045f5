use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};

use super::{Curve, CurveDomain};

/// A bounded line segment.
///
/// The parametric form is `P(t) = origin + t * direction` with a unit
/// `direction`, so `t` runs over `[0, length]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    origin: Point3,
    direction: Vector3,
    length: f64,
}

impl Line {
    /// Creates a segment from `start` to `end`.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoints coincide.
    pub fn new(start: Point3, end: Point3) -> Result<Self> {
        let span = end - start;
        let length = span.norm();
        if length < TOLERANCE || !length.is_finite() {
            return Err(GeometryError::ZeroVector.into());
        }
        Ok(Self {
            origin: start,
            direction: span / length,
            length,
        })
    }

    /// Returns the start point of the segment.
    #[must_use]
    pub fn origin(&self) -> &Point3 {
        &self.origin
    }

    /// Returns the end point of the segment.
    #[must_use]
    pub fn end(&self) -> Point3 {
        self.origin + self.direction * self.length
    }

    /// Returns the unit direction vector of the segment.
    #[must_use]
    pub fn direction(&self) -> &Vector3 {
        &self.direction
    }

    /// Returns the segment length.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Returns a copy moved rigidly by `displacement`.
    #[must_use]
    pub fn translated(&self, displacement: &Vector3) -> Self {
        Self {
            origin: self.origin + displacement,
            ..self.clone()
        }
    }
}

impl Curve for Line {
    fn evaluate(&self, t: f64) -> Result<Point3> {
        Ok(self.origin + self.direction * t)
    }

    fn tangent(&self, _t: f64) -> Result<Vector3> {
        Ok(self.direction)
    }

    fn domain(&self) -> CurveDomain {
        CurveDomain::new(0.0, self.length)
    }

    fn is_closed(&self) -> bool {
        false
    }
}
