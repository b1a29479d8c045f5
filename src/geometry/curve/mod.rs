mod arc;
mod line;

pub use arc::Arc;
pub use line::Line;

use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3};

/// Parameter domain for a curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveDomain {
    /// Start of the parameter range.
    pub t_min: f64,
    /// End of the parameter range.
    pub t_max: f64,
}

impl CurveDomain {
    /// Creates a new curve domain.
    #[must_use]
    pub fn new(t_min: f64, t_max: f64) -> Self {
        Self { t_min, t_max }
    }

    /// Maps a normalized parameter in `[0, 1]` onto this domain.
    #[must_use]
    pub fn lerp(&self, s: f64) -> f64 {
        self.t_min + s * (self.t_max - self.t_min)
    }
}

/// Trait for parametric curves in 3D space.
pub trait Curve {
    /// Evaluates the curve at parameter `t`, returning the 3D point.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameter is out of range or evaluation fails.
    fn evaluate(&self, t: f64) -> Result<Point3>;

    /// Computes the tangent vector at parameter `t`.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameter is out of range or the tangent is degenerate.
    fn tangent(&self, t: f64) -> Result<Vector3>;

    /// Returns the parameter domain of the curve.
    fn domain(&self) -> CurveDomain;

    /// Returns whether the curve is closed.
    fn is_closed(&self) -> bool;
}

/// The location path of a wall-like element.
///
/// Only bounded lines and circular arcs are supported.
#[derive(Debug, Clone, PartialEq)]
pub enum PathCurve {
    /// A straight segment.
    Line(Line),
    /// A circular arc.
    Arc(Arc),
}

impl PathCurve {
    /// Evaluates the curve at a normalized parameter `s` in `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns an error if `s` lies outside `[0, 1]`.
    pub fn evaluate_normalized(&self, s: f64) -> Result<Point3> {
        if !(0.0..=1.0).contains(&s) {
            return Err(GeometryError::ParameterOutOfRange {
                parameter: "s",
                value: s,
                min: 0.0,
                max: 1.0,
            }
            .into());
        }
        self.evaluate(self.domain().lerp(s))
    }

    /// Returns the point halfway along the curve's parameter range.
    ///
    /// # Errors
    ///
    /// Returns an error if evaluation fails.
    pub fn midpoint(&self) -> Result<Point3> {
        self.evaluate_normalized(0.5)
    }

    /// Returns a copy moved rigidly by `displacement`.
    #[must_use]
    pub fn translated(&self, displacement: &Vector3) -> Self {
        match self {
            Self::Line(line) => Self::Line(line.translated(displacement)),
            Self::Arc(arc) => Self::Arc(arc.translated(displacement)),
        }
    }
}

impl Curve for PathCurve {
    fn evaluate(&self, t: f64) -> Result<Point3> {
        match self {
            Self::Line(line) => line.evaluate(t),
            Self::Arc(arc) => arc.evaluate(t),
        }
    }

    fn tangent(&self, t: f64) -> Result<Vector3> {
        match self {
            Self::Line(line) => line.tangent(t),
            Self::Arc(arc) => arc.tangent(t),
        }
    }

    fn domain(&self) -> CurveDomain {
        match self {
            Self::Line(line) => line.domain(),
            Self::Arc(arc) => arc.domain(),
        }
    }

    fn is_closed(&self) -> bool {
        match self {
            Self::Line(line) => line.is_closed(),
            Self::Arc(arc) => arc.is_closed(),
        }
    }
}

impl From<Line> for PathCurve {
    fn from(line: Line) -> Self {
        Self::Line(line)
    }
}

impl From<Arc> for PathCurve {
    fn from(arc: Arc) -> Self {
        Self::Arc(arc)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn midpoint_of_line() {
        let curve: PathCurve = Line::new(Point3::origin(), Point3::new(4.0, 0.0, 0.0))
            .unwrap()
            .into();
        let mid = curve.midpoint().unwrap();
        assert!((mid - Point3::new(2.0, 0.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn midpoint_of_arc() {
        let curve: PathCurve = Arc::new(
            Point3::origin(),
            1.0,
            Vector3::z(),
            Vector3::x(),
            0.0,
            std::f64::consts::PI,
        )
        .unwrap()
        .into();
        let mid = curve.midpoint().unwrap();
        assert!((mid - Point3::new(0.0, 1.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn normalized_parameter_out_of_range() {
        let curve: PathCurve = Line::new(Point3::origin(), Point3::new(1.0, 0.0, 0.0))
            .unwrap()
            .into();
        assert!(curve.evaluate_normalized(1.5).is_err());
    }
}
