//! Provides the tool and the base of the robot.
//!
//! [`RobotTool`] is the physical tool description that ends up as RAPID `tooldata`. Its TCP offset
//! is what the kinematic wrappers below use: [`Tool`] and [`Base`] take arbitrary implementation
//! of [`Kinematics`] and are such implementations themselves, so they can be cascaded, like
//! base having the arm, that arm having a tool:
//! ```
//! use std::sync::Arc;
//! use nalgebra::Isometry3;
//! use rs_rapid_kinematics::kinematic_traits::Kinematics;
//! use rs_rapid_kinematics::inverse_kinematics::ArmKinematics;
//! use rs_rapid_kinematics::robot::Robot;
//! use rs_rapid_kinematics::tool::{Base, Tool};
//!
//! let robot = Robot::irb120();
//! let arm = ArmKinematics::new(&robot);
//!
//! // Half meter high pedestal
//! let on_base = Base {
//!     robot: Arc::new(arm),
//!     base: Isometry3::translation(0.0, 0.0, 500.0),
//! };
//!
//! // Tool extends 100 mm along the flange normal
//! let complete = Tool {
//!     robot: Arc::new(on_base),
//!     tool: Isometry3::translation(0.0, 0.0, 100.0),
//! };
//! let tcp = complete.forward(&[0.0, 0.1, 0.2, 0.3, 0.4, 0.5]);
//! println!("The tool tip is at: {:?}", tcp.translation);
//! ```

extern crate nalgebra as na;

use std::sync::Arc;

use na::{Isometry3, Vector3};

use crate::error::{RobotError, Result};
use crate::geometry::Plane;
use crate::kinematic_traits::{Joints, Kinematics, Pose, Solutions};
use crate::mesh::Mesh;
use crate::rapid_format::{fmt_bool, fmt_num, fmt_pose, fmt_position};

/// Tool mounted on the robot flange. Attachment plane and tool plane are given in the same
/// (tool modelling) space; only their relation matters for kinematics.
#[derive(Debug, Clone, PartialEq)]
pub struct RobotTool {
    pub name: String,
    pub mesh: Mesh,
    /// Plane of the tool that is placed onto the robot mounting frame.
    pub attachment_plane: Plane,
    /// The tool center point.
    pub tool_plane: Plane,
    /// Mass in kg.
    pub mass: f64,
    /// Center of gravity, relative to the attachment plane.
    pub center_of_gravity: Vector3<f64>,
    /// True if the robot holds the tool (the normal case).
    pub robot_hold: bool,
}

impl RobotTool {
    pub fn new(name: &str, mesh: Mesh, attachment_plane: Plane, tool_plane: Plane, mass: f64) -> Result<Self> {
        let tool = RobotTool {
            name: name.to_string(),
            mesh,
            attachment_plane,
            tool_plane,
            mass,
            center_of_gravity: Vector3::new(0.0, 0.0, 0.001),
            robot_hold: true,
        };
        tool.validate()?;
        Ok(tool)
    }

    /// Tool with the TCP displaced by the given offset from the attachment plane, no rotation.
    pub fn with_offset(name: &str, x: f64, y: f64, z: f64, mass: f64) -> Result<Self> {
        RobotTool::new(
            name,
            Mesh::empty(),
            Isometry3::identity(),
            Isometry3::translation(x, y, z),
            mass,
        )
    }

    /// The predefined `tool0`: TCP at the mounting frame.
    pub fn tool0() -> Self {
        RobotTool {
            name: "tool0".to_string(),
            mesh: Mesh::empty(),
            attachment_plane: Isometry3::identity(),
            tool_plane: Isometry3::identity(),
            mass: 0.001,
            center_of_gravity: Vector3::new(0.0, 0.0, 0.001),
            robot_hold: true,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(RobotError::InvalidTool("tool name is empty".to_string()));
        }
        if self.name.contains(char::is_whitespace) {
            return Err(RobotError::InvalidTool(format!("tool name '{}' contains whitespace", self.name)));
        }
        if !(self.mass.is_finite() && self.mass > 0.0) {
            return Err(RobotError::InvalidTool(format!(
                "tool {} must have positive mass, got {}", self.name, self.mass
            )));
        }
        if !self.mesh.is_valid() {
            return Err(RobotError::InvalidTool(format!("tool {} mesh is malformed", self.name)));
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// TCP relative to the attachment plane; this is the `tframe` of the tool data.
    pub fn tcp_offset(&self) -> Isometry3<f64> {
        self.attachment_plane.inverse() * self.tool_plane
    }

    /// Moves the tool geometry. The TCP offset does not change.
    pub fn transform(&mut self, xform: &Isometry3<f64>) {
        self.attachment_plane = xform * self.attachment_plane;
        self.tool_plane = xform * self.tool_plane;
        self.mesh.transform(xform);
    }

    /// Tool mesh posed for the given mounting frame.
    pub fn posed_mesh(&self, mounting_frame: &Plane) -> Mesh {
        self.mesh.transformed(&(mounting_frame * self.attachment_plane.inverse()))
    }

    /// `PERS tooldata name := [robhold, tframe, tload];`
    pub fn to_rapid_declaration(&self) -> String {
        format!(
            "PERS tooldata {} := [{}, {}, [{}, {}, [1, 0, 0, 0], 0, 0, 0]];",
            self.name,
            fmt_bool(self.robot_hold),
            fmt_pose(&self.tcp_offset()),
            fmt_num(self.mass),
            fmt_position(&self.center_of_gravity)
        )
    }
}

impl Default for RobotTool {
    fn default() -> Self {
        RobotTool::tool0()
    }
}

/// Defines the fixed tool that can be attached to the last joint (joint 6) of robot.
/// The tool moves with the robot, providing additional translation and, if needed,
/// rotation. The tool itself fully implements the Kinematics,
/// providing both inverse and forward kinematics for the robot with a tool (with
/// "pose" being assumed as the position and rotation of the tool center point).
#[derive(Clone)]
pub struct Tool {
    pub robot: Arc<dyn Kinematics>,

    /// Transformation from the robot's flange to the tool's TCP.
    pub tool: Isometry3<f64>,
}

/// Defines the fixed base that can hold the robot.
/// The base moves the robot to its installed location, providing also rotation if
/// required (physical robots work well and may be installed upside down, or at some
/// angle like 45 degrees). Base itself fully implements the Kinematics,
/// providing both inverse and forward kinematics for the robot on a base.
#[derive(Clone)]
pub struct Base {
    pub robot: Arc<dyn Kinematics>,

    /// Transformation from the world origin to the robots base.
    pub base: Isometry3<f64>,
}

impl Kinematics for Tool {
    fn inverse(&self, tcp: &Pose) -> Solutions {
        self.robot.inverse(&(tcp * self.tool.inverse()))
    }

    fn inverse_continuing(&self, tcp: &Pose, previous: &Joints) -> Solutions {
        self.robot.inverse_continuing(&(tcp * self.tool.inverse()), previous)
    }

    fn forward(&self, qs: &Joints) -> Pose {
        self.robot.forward(qs) * self.tool
    }
}

impl Kinematics for Base {
    fn inverse(&self, tcp: &Pose) -> Solutions {
        self.robot.inverse(&(self.base.inverse() * tcp))
    }

    fn inverse_continuing(&self, tcp: &Pose, previous: &Joints) -> Solutions {
        self.robot.inverse_continuing(&(self.base.inverse() * tcp), previous)
    }

    fn forward(&self, joints: &Joints) -> Pose {
        self.base * self.robot.forward(joints)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Translation3, UnitQuaternion};

    /// Asserts that two `Translation3<f64>` instances are approximately equal within a given tolerance.
    pub(crate) fn assert_diff(a: &Translation3<f64>, b: &Translation3<f64>, expected_diff: [f64; 3], epsilon: f64) {
        let actual_diff = a.vector - b.vector;

        assert!(
            (actual_diff.x - expected_diff[0]).abs() <= epsilon,
            "X difference is not as expected: actual difference = {}, expected difference = {}",
            actual_diff.x, expected_diff[0]
        );
        assert!(
            (actual_diff.y - expected_diff[1]).abs() <= epsilon,
            "Y difference is not as expected: actual difference = {}, expected difference = {}",
            actual_diff.y, expected_diff[1]
        );
        assert!(
            (actual_diff.z - expected_diff[2]).abs() <= epsilon,
            "Z difference is not as expected: actual difference = {}, expected difference = {}",
            actual_diff.z, expected_diff[2]
        );
    }

    /// Kinematics that only reports the flange at a fixed place, to test composition.
    struct Fixed(Pose);

    impl Kinematics for Fixed {
        fn inverse(&self, _pose: &Pose) -> Solutions {
            [[0.0; 6]; 8]
        }
        fn inverse_continuing(&self, pose: &Pose, _previous: &Joints) -> Solutions {
            self.inverse(pose)
        }
        fn forward(&self, _qs: &Joints) -> Pose {
            self.0
        }
    }

    #[test]
    fn test_tool_and_base_compose() {
        let flange = Isometry3::from_parts(
            Translation3::new(100.0, 0.0, 0.0),
            UnitQuaternion::from_euler_angles(0.0, std::f64::consts::FRAC_PI_2, 0.0),
        );
        let on_base = Base {
            robot: Arc::new(Fixed(flange)),
            base: Isometry3::translation(0.0, 0.0, 500.0),
        };
        let with_tool = Tool {
            robot: Arc::new(on_base.clone()),
            tool: Isometry3::translation(0.0, 0.0, 50.0),
        };
        let joints = [0.0; 6];
        // Flange Z points along world X, so the tool extends along X
        assert_diff(&with_tool.forward(&joints).translation, &on_base.forward(&joints).translation,
                    [50.0, 0.0, 0.0], 1e-9);
        assert_diff(&on_base.forward(&joints).translation, &flange.translation,
                    [0.0, 0.0, 500.0], 1e-9);
    }

    #[test]
    fn test_tool_validation() {
        assert!(RobotTool::with_offset("gripper", 0.0, 0.0, 120.0, 2.5).is_ok());
        assert!(matches!(RobotTool::with_offset("", 0.0, 0.0, 1.0, 1.0), Err(RobotError::InvalidTool(_))));
        assert!(matches!(RobotTool::with_offset("t", 0.0, 0.0, 1.0, 0.0), Err(RobotError::InvalidTool(_))));
    }

    #[test]
    fn test_tooldata_declaration() {
        let tool = RobotTool::with_offset("gripper", 0.0, 0.0, 120.5, 2.5).unwrap();
        assert_eq!(
            tool.to_rapid_declaration(),
            "PERS tooldata gripper := [TRUE, [[0, 0, 120.5], [1, 0, 0, 0]], [2.5, [0, 0, 0.001], [1, 0, 0, 0], 0, 0, 0]];"
        );
    }

    #[test]
    fn test_transform_keeps_tcp_offset() {
        let mut tool = RobotTool::with_offset("gripper", 10.0, 0.0, 120.0, 2.5).unwrap();
        let before = tool.tcp_offset();
        tool.transform(&Isometry3::from_parts(
            Translation3::new(5.0, 6.0, 7.0),
            UnitQuaternion::from_euler_angles(0.3, 0.2, 0.1),
        ));
        let after = tool.tcp_offset();
        assert!((before.translation.vector - after.translation.vector).norm() < 1e-9);
    }
}
