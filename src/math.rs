//! Small numeric helpers.

/// Linear interpolation between `previous` and `current`.
///
/// `delta = 0` yields `previous`, `delta = 1` yields `current`.
pub fn lerp(previous: f32, current: f32, delta: f32) -> f32 {
    previous * (1.0 - delta) + current * delta
}

/// Whether `value` lies in the closed interval `[min, max]`.
pub fn in_range(value: f32, min: f32, max: f32) -> bool {
    value >= min && value <= max
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-6;

    #[test]
    fn test_lerp() {
        assert!((lerp(0.0, 10.0, 0.0) - 0.0).abs() < EPSILON);
        assert!((lerp(0.0, 10.0, 0.5) - 5.0).abs() < EPSILON);
        assert!((lerp(4.0, 8.0, 1.0) - 8.0).abs() < EPSILON);
    }

    #[test]
    fn test_in_range_is_inclusive() {
        assert!(in_range(0.0, 0.0, 1.0));
        assert!(in_range(1.0, 0.0, 1.0));
        assert!(!in_range(1.01, 0.0, 1.0));
        assert!(!in_range(-0.5, 0.0, 1.0));
    }
}
