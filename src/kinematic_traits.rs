extern crate nalgebra as na;

use na::Isometry3;

/// Pose is used as a pose of the robot TCP, flange or any axis plane. It contains both the
/// Cartesian position (millimeters) and the rotation quaternion.
/// ```
/// extern crate nalgebra as na;
/// use na::{Isometry3, Translation3, UnitQuaternion};
///
/// type Pose = Isometry3<f64>;
///
/// let translation = Translation3::new(374.0, 0.0, 630.0);
/// let rotation = UnitQuaternion::from_euler_angles(0.0, std::f64::consts::FRAC_PI_2, 0.0);
/// let flange = Pose::from_parts(translation, rotation);
/// ```
pub type Pose = Isometry3<f64>;

/// Values of the six internal joints, in radians. Public API of the robot model works in degrees
/// (see [`crate::joint_position::RobotJointPosition`]); this alias is used by the solvers.
pub type Joints = [f64; 6];

/// The solver returns all 8 configurations, each defining the rotations of the 6 joints.
/// A configuration that cannot be reached is filled with NaN; use
/// [`crate::utils::is_valid`] to check.
pub type Solutions = [Joints; 8];

/// Number of configurations of a six-axis robot with a spherical wrist (2 base x 2 elbow x 2 wrist).
pub const CONFIGURATIONS: usize = 8;

/// Axis 5 closer to 0 (or 180) degrees than this is treated as the singular wrist.
pub const SINGULARITY_ANGLE_THR: f64 = 0.01 * std::f64::consts::PI / 180.0;

/// Position of a configuration in the solutions array. The order is fixed: base-front before
/// base-back, elbow-up before elbow-down, wrist-normal before wrist-flipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Configuration {
    pub base_back: bool,
    pub elbow_down: bool,
    pub wrist_flipped: bool,
}

impl Configuration {
    pub fn from_index(index: usize) -> Self {
        Configuration {
            base_back: index & 4 != 0,
            elbow_down: index & 2 != 0,
            wrist_flipped: index & 1 != 0,
        }
    }

    pub fn index(&self) -> usize {
        (self.base_back as usize) << 2 | (self.elbow_down as usize) << 1 | self.wrist_flipped as usize
    }
}

pub trait Kinematics {
    /// Find all 8 configurations for the given pose.
    fn inverse(&self, pose: &Pose) -> Solutions;

    /// Same as inverse, but a singular wrist resolves axis 4 and 6 close to the previous values.
    fn inverse_continuing(&self, pose: &Pose, previous: &Joints) -> Solutions;

    /// Pose of the tool (or flange) for the given joint values.
    fn forward(&self, qs: &Joints) -> Pose;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_order() {
        let order: Vec<Configuration> = (0..CONFIGURATIONS).map(Configuration::from_index).collect();
        assert!(!order[0].base_back && !order[0].elbow_down && !order[0].wrist_flipped);
        assert!(order[1].wrist_flipped && !order[1].elbow_down);
        assert!(order[2].elbow_down && !order[2].base_back);
        assert!(order[4].base_back);
        for (i, c) in order.iter().enumerate() {
            assert_eq!(c.index(), i);
        }
    }
}
