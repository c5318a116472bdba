//! Joint positions of the robot (six internal axes) and of its external axes, in degrees
//! (millimeters for linear external axes), as RAPID `robjoint` and `extjoint` data.

use std::fmt;
use std::ops::{Add, Index, IndexMut, Mul, Neg, Sub};

use crate::error::{RobotError, Result};
use crate::geometry::Interval;
use crate::kinematic_traits::Joints;
use crate::rapid_format::{fmt_num, UNDEFINED_AXIS_VALUE};

fn fmt_values(values: &[f64; 6]) -> String {
    let items: Vec<String> = values.iter().map(|v| fmt_num(*v)).collect();
    format!("[{}]", items.join(", "))
}

/// Values of the six internal axes, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RobotJointPosition(pub [f64; 6]);

impl RobotJointPosition {
    pub const fn new(values: [f64; 6]) -> Self {
        RobotJointPosition(values)
    }

    /// Up to six values; missing axes are zero.
    pub fn from_slice(values: &[f64]) -> Result<Self> {
        if values.len() > 6 {
            return Err(RobotError::InvalidLength { expected: 6, found: values.len() });
        }
        let mut all = [0.0; 6];
        all[..values.len()].copy_from_slice(values);
        Ok(RobotJointPosition(all))
    }

    pub fn from_radians(joints: &Joints) -> Self {
        RobotJointPosition(joints.map(f64::to_degrees))
    }

    pub fn to_radians(&self) -> Joints {
        self.0.map(f64::to_radians)
    }

    pub fn values(&self) -> &[f64; 6] {
        &self.0
    }

    /// Indices (0 based) of axes outside of their limits.
    pub fn axes_out_of_limits(&self, limits: &[Interval; 6]) -> Vec<usize> {
        (0..6).filter(|&i| !limits[i].includes(self.0[i])).collect()
    }

    pub fn try_div(&self, divisor: f64) -> Result<Self> {
        if divisor == 0.0 {
            return Err(RobotError::DivideByZero);
        }
        Ok(RobotJointPosition(self.0.map(|v| v / divisor)))
    }

    /// `[a1, a2, a3, a4, a5, a6]`
    pub fn to_rapid(&self) -> String {
        fmt_values(&self.0)
    }
}

impl Index<usize> for RobotJointPosition {
    type Output = f64;
    fn index(&self, index: usize) -> &f64 {
        &self.0[index]
    }
}

impl IndexMut<usize> for RobotJointPosition {
    fn index_mut(&mut self, index: usize) -> &mut f64 {
        &mut self.0[index]
    }
}

impl Add for RobotJointPosition {
    type Output = RobotJointPosition;
    fn add(self, rhs: Self) -> Self {
        RobotJointPosition(std::array::from_fn(|i| self.0[i] + rhs.0[i]))
    }
}

impl Sub for RobotJointPosition {
    type Output = RobotJointPosition;
    fn sub(self, rhs: Self) -> Self {
        RobotJointPosition(std::array::from_fn(|i| self.0[i] - rhs.0[i]))
    }
}

impl Neg for RobotJointPosition {
    type Output = RobotJointPosition;
    fn neg(self) -> Self {
        RobotJointPosition(self.0.map(|v| -v))
    }
}

impl Mul<f64> for RobotJointPosition {
    type Output = RobotJointPosition;
    fn mul(self, rhs: f64) -> Self {
        RobotJointPosition(self.0.map(|v| v * rhs))
    }
}

impl fmt::Display for RobotJointPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_rapid())
    }
}

/// Values of up to six external axes. Axes without a value hold the RAPID 9E9 marker and
/// never take part in arithmetic as numbers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExternalJointPosition(pub [f64; 6]);

impl Default for ExternalJointPosition {
    fn default() -> Self {
        ExternalJointPosition::undefined()
    }
}

impl ExternalJointPosition {
    pub const fn undefined() -> Self {
        ExternalJointPosition([UNDEFINED_AXIS_VALUE; 6])
    }

    /// Up to six values; the missing axes are undefined (9E9).
    pub fn new(values: &[f64]) -> Result<Self> {
        if values.len() > 6 {
            return Err(RobotError::InvalidLength { expected: 6, found: values.len() });
        }
        let mut all = [UNDEFINED_AXIS_VALUE; 6];
        all[..values.len()].copy_from_slice(values);
        Ok(ExternalJointPosition(all))
    }

    pub fn values(&self) -> &[f64; 6] {
        &self.0
    }

    pub fn is_defined(&self, axis: usize) -> bool {
        self.0[axis] != UNDEFINED_AXIS_VALUE
    }

    pub fn get(&self, axis: usize) -> Option<f64> {
        if self.is_defined(axis) { Some(self.0[axis]) } else { None }
    }

    pub fn set(&mut self, axis: usize, value: f64) {
        self.0[axis] = value;
    }

    fn combine(&self, other: &Self, op: impl Fn(f64, f64) -> f64) -> Result<Self> {
        let mut result = [UNDEFINED_AXIS_VALUE; 6];
        for i in 0..6 {
            match (self.get(i), other.get(i)) {
                (Some(a), Some(b)) => result[i] = op(a, b),
                (None, None) => {}
                _ => return Err(RobotError::ExternalAxisMismatch { axis: i }),
            }
        }
        Ok(ExternalJointPosition(result))
    }

    /// Sum of two positions. Fails if an axis is defined in one and undefined in the other.
    pub fn try_add(&self, other: &Self) -> Result<Self> {
        self.combine(other, |a, b| a + b)
    }

    /// Difference of two positions. Fails if an axis is defined in one and undefined in the other.
    pub fn try_sub(&self, other: &Self) -> Result<Self> {
        self.combine(other, |a, b| a - b)
    }

    /// Scales the defined axes.
    pub fn scale(&self, factor: f64) -> Self {
        let mut result = self.0;
        for (i, v) in result.iter_mut().enumerate() {
            if self.is_defined(i) {
                *v *= factor;
            }
        }
        ExternalJointPosition(result)
    }

    pub fn try_div(&self, divisor: f64) -> Result<Self> {
        if divisor == 0.0 {
            return Err(RobotError::DivideByZero);
        }
        Ok(self.scale(1.0 / divisor))
    }

    /// `[e1, e2, e3, e4, e5, e6]` with 9E9 for undefined axes.
    pub fn to_rapid(&self) -> String {
        fmt_values(&self.0)
    }
}

impl Index<usize> for ExternalJointPosition {
    type Output = f64;
    fn index(&self, index: usize) -> &f64 {
        &self.0[index]
    }
}

impl fmt::Display for ExternalJointPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_rapid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_external_axes_are_undefined() {
        let ext = ExternalJointPosition::new(&[10.0, 20.0]).unwrap();
        assert_eq!(ext.0, [10.0, 20.0, 9e9, 9e9, 9e9, 9e9]);
        assert_eq!(ext.to_rapid(), "[10, 20, 9E9, 9E9, 9E9, 9E9]");
        assert_eq!(ext.get(1), Some(20.0));
        assert_eq!(ext.get(2), None);
    }

    #[test]
    fn test_too_many_external_values() {
        assert!(matches!(
            ExternalJointPosition::new(&[0.0; 7]),
            Err(RobotError::InvalidLength { expected: 6, found: 7 })
        ));
    }

    #[test]
    fn test_external_arithmetic() {
        let a = ExternalJointPosition::new(&[10.0, 20.0]).unwrap();
        let b = ExternalJointPosition::new(&[1.0, 2.0]).unwrap();
        let sum = a.try_add(&b).unwrap();
        assert_eq!(sum.0, [11.0, 22.0, 9e9, 9e9, 9e9, 9e9]);
        let diff = a.try_sub(&b).unwrap();
        assert_eq!(diff.0[..2], [9.0, 18.0]);
        assert_eq!(a.scale(2.0).0[..3], [20.0, 40.0, 9e9]);
    }

    #[test]
    fn test_external_mismatch() {
        let a = ExternalJointPosition::new(&[10.0, 20.0, 30.0]).unwrap();
        let b = ExternalJointPosition::new(&[1.0, 2.0]).unwrap();
        assert!(matches!(a.try_add(&b), Err(RobotError::ExternalAxisMismatch { axis: 2 })));
        assert!(matches!(b.try_sub(&a), Err(RobotError::ExternalAxisMismatch { axis: 2 })));
    }

    #[test]
    fn test_divide_by_zero() {
        let ext = ExternalJointPosition::new(&[10.0]).unwrap();
        assert!(matches!(ext.try_div(0.0), Err(RobotError::DivideByZero)));
        assert_eq!(ext.try_div(2.0).unwrap().0[0], 5.0);
        let rob = RobotJointPosition::new([10.0; 6]);
        assert!(matches!(rob.try_div(0.0), Err(RobotError::DivideByZero)));
    }

    #[test]
    fn test_robot_joint_arithmetic() {
        let a = RobotJointPosition::new([0.0, 10.0, 20.0, 30.0, 40.0, 50.0]);
        let b = RobotJointPosition::from_slice(&[1.0, 1.0]).unwrap();
        assert_eq!((a + b).0, [1.0, 11.0, 20.0, 30.0, 40.0, 50.0]);
        assert_eq!((a - b)[1], 9.0);
        assert_eq!((a * 0.5)[5], 25.0);
        assert_eq!((-a)[2], -20.0);
        assert_eq!(a.to_rapid(), "[0, 10, 20, 30, 40, 50]");
    }

    #[test]
    fn test_axes_out_of_limits() {
        let limits = [Interval::new(-90.0, 90.0); 6];
        let position = RobotJointPosition::new([0.0, 100.0, 0.0, 0.0, -95.0, 0.0]);
        assert_eq!(position.axes_out_of_limits(&limits), vec![1, 4]);
    }
}
