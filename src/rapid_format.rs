//! Number and pose formatting for RAPID source text.

use nalgebra::{Isometry3, UnitQuaternion, Vector3};

/// Value ABB controllers use for an undefined (not connected) external axis.
pub const UNDEFINED_AXIS_VALUE: f64 = 9e9;

/// Decimals used for positions (mm), speeds, zones, times and other motion parameters.
pub const MOTION_DECIMALS: usize = 3;

/// Decimals used for quaternion components.
pub const QUATERNION_DECIMALS: usize = 6;

/// Formats a value rounded to `decimals` places with trailing zeros (and the dot) removed,
/// so 500.0 is `500` and 0.25 is `0.25`. Negative zero is written as `0`. The undefined
/// external axis value is written as `9E9`.
pub fn fmt_decimals(value: f64, decimals: usize) -> String {
    if value == UNDEFINED_AXIS_VALUE {
        return "9E9".to_string();
    }
    let text = format!("{:.*}", decimals, value);
    let text = if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    };
    if text == "-0" { "0".to_string() } else { text }
}

/// Motion parameter formatting (3 decimals).
pub fn fmt_num(value: f64) -> String {
    fmt_decimals(value, MOTION_DECIMALS)
}

/// `[x, y, z]`
pub fn fmt_position(v: &Vector3<f64>) -> String {
    format!("[{}, {}, {}]", fmt_num(v.x), fmt_num(v.y), fmt_num(v.z))
}

/// `[q1, q2, q3, q4]` in ABB order (scalar part first).
pub fn fmt_quaternion(q: &UnitQuaternion<f64>) -> String {
    let q = q.quaternion();
    // ABB expects q1 >= 0 for the canonical form of the same rotation
    let sign = if q.w < 0.0 { -1.0 } else { 1.0 };
    format!(
        "[{}, {}, {}, {}]",
        fmt_decimals(sign * q.w, QUATERNION_DECIMALS),
        fmt_decimals(sign * q.i, QUATERNION_DECIMALS),
        fmt_decimals(sign * q.j, QUATERNION_DECIMALS),
        fmt_decimals(sign * q.k, QUATERNION_DECIMALS)
    )
}

/// `[[x, y, z], [q1, q2, q3, q4]]`, the RAPID `pose` data.
pub fn fmt_pose(pose: &Isometry3<f64>) -> String {
    format!(
        "[{}, {}]",
        fmt_position(&pose.translation.vector),
        fmt_quaternion(&pose.rotation)
    )
}

/// RAPID boolean literal.
pub fn fmt_bool(value: bool) -> &'static str {
    if value { "TRUE" } else { "FALSE" }
}

/// Digital signal value as written in RAPID instructions.
pub fn fmt_signal(value: bool) -> &'static str {
    if value { "1" } else { "0" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_values_have_no_decimals() {
        assert_eq!(fmt_num(500.0), "500");
        assert_eq!(fmt_decimals(1.0, 6), "1");
    }

    #[test]
    fn test_rounding_precision() {
        assert_eq!(fmt_num(123.456789), "123.457");
        assert_eq!(fmt_decimals(123.456789, 6), "123.456789");
        assert_eq!(fmt_decimals(0.7071067811865476, 6), "0.707107");
        assert_eq!(fmt_num(0.25), "0.25");
    }

    #[test]
    fn test_negative_zero() {
        assert_eq!(fmt_num(-0.0), "0");
        assert_eq!(fmt_num(-0.0001), "0");
    }

    #[test]
    fn test_undefined_axis() {
        assert_eq!(fmt_num(UNDEFINED_AXIS_VALUE), "9E9");
    }

    #[test]
    fn test_quaternion_identity() {
        assert_eq!(fmt_quaternion(&UnitQuaternion::identity()), "[1, 0, 0, 0]");
    }
}
