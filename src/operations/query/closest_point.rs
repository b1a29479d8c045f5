use std::f64::consts::TAU;

use crate::error::Result;
use crate::geometry::curve::{Arc, Curve, Line, PathCurve};
use crate::math::{Point3, TOLERANCE};

/// Result of a closest point query.
#[derive(Debug, Clone, Copy)]
pub struct ClosestPointResult {
    /// The closest point on the curve.
    pub point: Point3,
    /// The parameter value at the closest point.
    pub parameter: f64,
    /// The distance from the query point to the closest point.
    pub distance: f64,
}

/// Finds the closest point on a bounded path curve to a given point.
pub struct ClosestPointOnCurve<'a> {
    curve: &'a PathCurve,
    point: Point3,
}

impl<'a> ClosestPointOnCurve<'a> {
    /// Creates a new `ClosestPointOnCurve` query.
    #[must_use]
    pub fn new(curve: &'a PathCurve, point: Point3) -> Self {
        Self { curve, point }
    }

    /// Executes the query, returning the closest point result.
    ///
    /// Both curve kinds are projected analytically and clamped to their
    /// parameter domain.
    ///
    /// # Errors
    ///
    /// Returns an error if the curve cannot be evaluated.
    pub fn execute(&self) -> Result<ClosestPointResult> {
        match self.curve {
            PathCurve::Line(line) => closest_point_on_line(line, &self.point),
            PathCurve::Arc(arc) => closest_point_on_arc(arc, &self.point),
        }
    }
}

fn result_at(curve: &impl Curve, t: f64, point: &Point3) -> Result<ClosestPointResult> {
    let closest = curve.evaluate(t)?;
    Ok(ClosestPointResult {
        point: closest,
        parameter: t,
        distance: (point - closest).norm(),
    })
}

/// Finds the closest point on a bounded line segment.
fn closest_point_on_line(line: &Line, point: &Point3) -> Result<ClosestPointResult> {
    let domain = line.domain();

    // Project point onto line: t = dot(point - origin, dir)
    let to_point = point - line.origin();
    let t = to_point
        .dot(line.direction())
        .clamp(domain.t_min, domain.t_max);

    result_at(line, t, point)
}

/// Finds the closest point on a bounded arc.
fn closest_point_on_arc(arc: &Arc, point: &Point3) -> Result<ClosestPointResult> {
    let domain = arc.domain();
    let normal = arc.normal();

    let to_point = point - arc.center();
    let in_plane = to_point - normal * to_point.dot(normal);

    if in_plane.norm() < TOLERANCE {
        // Every point of the arc is equidistant; take the start.
        return result_at(arc, domain.t_min, point);
    }

    let angle = in_plane.dot(&arc.binormal()).atan2(in_plane.dot(arc.ref_dir()));
    let unwrapped = domain.t_min + (angle - domain.t_min).rem_euclid(TAU);
    if unwrapped <= domain.t_max {
        return result_at(arc, unwrapped, point);
    }

    let at_start = result_at(arc, domain.t_min, point)?;
    let at_end = result_at(arc, domain.t_max, point)?;
    Ok(if at_start.distance <= at_end.distance {
        at_start
    } else {
        at_end
    })
}
