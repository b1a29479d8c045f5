mod closest_point;

pub use closest_point::{ClosestPointOnCurve, ClosestPointResult};
