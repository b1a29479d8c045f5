/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Normalizes `v`, or returns `fallback` when `v` is too short to carry a direction.
#[must_use]
pub fn normalize_or(v: &Vector3, fallback: Vector3) -> Vector3 {
    let len = v.norm();
    if len < TOLERANCE || !len.is_finite() {
        fallback
    } else {
        v / len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_or_scales_to_unit() {
        let n = normalize_or(&Vector3::new(0.0, 3.0, 4.0), Vector3::y());
        assert!((n.norm() - 1.0).abs() < TOLERANCE);
        assert!((n.z - 0.8).abs() < TOLERANCE);
    }

    #[test]
    fn normalize_or_uses_fallback_for_zero_vector() {
        let n = normalize_or(&Vector3::zeros(), Vector3::y());
        assert_eq!(n, Vector3::y());
    }
}
