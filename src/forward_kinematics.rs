//! Forward kinematics of the robot with its external axes.
//!
//! Each internal axis rotates everything after it about its own axis plane (the plane as it is
//! at zero pose). The transform of link `i` is the product of the rotations of axes 1 to `i`,
//! and the TCP moves with link 6. An external axis that carries the robot moves the whole result.

use nalgebra::Isometry3;

use crate::geometry::{rotation_about, Plane};
use crate::joint_position::{ExternalJointPosition, RobotJointPosition};
use crate::kinematic_traits::Joints;
use crate::mesh::Mesh;
use crate::robot::{compute_tool_plane, Robot};
use crate::tool::RobotTool;

/// Cumulative transforms of the six links for the given joint values (radians).
/// Element `i` is the product of the rotations of axes 1 to `i + 1`.
pub fn chain_transforms(axis_planes: &[Plane; 6], joints: &Joints) -> [Isometry3<f64>; 6] {
    let mut chain = [Isometry3::identity(); 6];
    let mut current = Isometry3::identity();
    for i in 0..6 {
        current *= rotation_about(&axis_planes[i], joints[i]);
        chain[i] = current;
    }
    chain
}

#[derive(Debug, Clone)]
pub struct ForwardKinematicsResult {
    /// Axis planes as posed by the joint values.
    pub internal_axis_planes: [Plane; 6],
    /// Cumulative link transforms, relative to the robot at zero pose.
    pub link_transforms: [Isometry3<f64>; 6],
    /// The posed TCP plane in world space.
    pub tcp_plane: Plane,
    /// Posed attachment planes of the external axes, in the order of the robot's external axes.
    pub external_axis_planes: Vec<Plane>,
    /// Base, six links and the tool, followed by base and link of every external axis.
    pub posed_meshes: Option<Vec<Mesh>>,
    /// Joint values outside of their limits.
    pub errors: Vec<String>,
}

impl ForwardKinematicsResult {
    pub fn in_limits(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Forward kinematics of one robot.
pub struct ForwardKinematics<'a> {
    robot: &'a Robot,
    /// Tool used instead of the one attached to the robot.
    tool: Option<&'a RobotTool>,
    /// Pose the meshes too (costly for large meshes).
    pub with_meshes: bool,
}

impl<'a> ForwardKinematics<'a> {
    pub fn new(robot: &'a Robot) -> Self {
        ForwardKinematics { robot, tool: None, with_meshes: false }
    }

    pub fn with_tool(mut self, tool: &'a RobotTool) -> Self {
        self.tool = Some(tool);
        self
    }

    pub fn with_meshes(mut self, with_meshes: bool) -> Self {
        self.with_meshes = with_meshes;
        self
    }

    /// Value of the external axis with the given logic number, 0 if not defined.
    fn external_value(external: &ExternalJointPosition, number: Option<usize>) -> f64 {
        number.and_then(|n| external.get(n)).unwrap_or(0.0)
    }

    /// Transform of the external axis carrying the robot.
    pub fn robot_displacement(&self, external: &ExternalJointPosition) -> Isometry3<f64> {
        match self.robot.robot_moving_axis() {
            Some(axis) => axis.calculate_transformation(Self::external_value(external, axis.axis_number)),
            None => Isometry3::identity(),
        }
    }

    pub fn calculate(&self, robot_joints: &RobotJointPosition, external: &ExternalJointPosition) -> ForwardKinematicsResult {
        let robot = self.robot;
        let planes = robot.internal_axis_planes();
        let displacement = self.robot_displacement(external);
        let chain = chain_transforms(planes, &robot_joints.to_radians());

        let internal_axis_planes: [Plane; 6] = std::array::from_fn(|i| {
            let carried = if i == 0 { Isometry3::identity() } else { chain[i - 1] };
            displacement * carried * planes[i]
        });
        let tool_plane = match self.tool {
            Some(tool) => compute_tool_plane(robot.mounting_frame(), tool),
            None => *robot.tool_plane(),
        };
        let tcp_plane = displacement * chain[5] * tool_plane;

        let mut errors = Vec::new();
        for axis in robot_joints.axes_out_of_limits(robot.internal_axis_limits()) {
            errors.push(format!(
                "Internal axis value {} ({}) is not in range {} to {}.",
                axis + 1,
                robot_joints[axis],
                robot.internal_axis_limits()[axis].min(),
                robot.internal_axis_limits()[axis].max()
            ));
        }

        let mut external_axis_planes = Vec::with_capacity(robot.external_axes().len());
        for axis in robot.external_axes() {
            let value = Self::external_value(external, axis.axis_number);
            if !axis.in_limits(value) {
                errors.push(format!(
                    "External axis value {} of {} is not in range {} to {}.",
                    value, axis.name, axis.axis_limits.min(), axis.axis_limits.max()
                ));
            }
            external_axis_planes.push(axis.calculate_position(value));
        }

        let posed_meshes = if self.with_meshes {
            let meshes = robot.meshes();
            let mut posed = Vec::with_capacity(meshes.len() + 1 + 2 * robot.external_axes().len());
            posed.push(meshes[0].transformed(&displacement));
            for i in 0..6 {
                posed.push(meshes[i + 1].transformed(&(displacement * chain[i])));
            }
            posed.push(
                self.tool
                    .unwrap_or_else(|| robot.tool())
                    .posed_mesh(robot.mounting_frame())
                    .transformed(&(displacement * chain[5])),
            );
            for axis in robot.external_axes() {
                posed.extend(axis.pose_meshes(Self::external_value(external, axis.axis_number)));
            }
            Some(posed)
        } else {
            None
        };

        ForwardKinematicsResult {
            internal_axis_planes,
            link_transforms: chain,
            tcp_plane,
            external_axis_planes,
            posed_meshes,
            errors,
        }
    }
}

impl Robot {
    /// Meshes posed for the given joint values.
    pub fn pose_meshes(&self, robot_joints: &RobotJointPosition, external: &ExternalJointPosition) -> Vec<Mesh> {
        ForwardKinematics::new(self)
            .with_meshes(true)
            .calculate(robot_joints, external)
            .posed_meshes
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external_axis::ExternalAxis;
    use crate::geometry::{normal, origin, plane_from_normal, Interval};
    use nalgebra::{Point3, Vector3};

    #[test]
    fn test_zero_pose_is_tool_plane() {
        let robot = Robot::irb120();
        let fk = ForwardKinematics::new(&robot)
            .calculate(&RobotJointPosition::default(), &ExternalJointPosition::undefined());
        assert!((fk.tcp_plane.translation.vector - robot.tool_plane().translation.vector).norm() < 1e-9);
        assert!(fk.in_limits());
    }

    #[test]
    fn test_axis1_turns_tcp() {
        let robot = Robot::irb120();
        let fk = ForwardKinematics::new(&robot).calculate(
            &RobotJointPosition::new([90.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
            &ExternalJointPosition::undefined(),
        );
        assert!((origin(&fk.tcp_plane) - Point3::new(0.0, 374.0, 630.0)).norm() < 1e-9);
        // Axis 2 turned with axis 1, so its normal now points along -X
        assert!((normal(&fk.internal_axis_planes[1]) + Vector3::x()).norm() < 1e-9);
    }

    #[test]
    fn test_axis2_tilts_arm_forward() {
        let robot = Robot::irb120();
        let fk = ForwardKinematics::new(&robot).calculate(
            &RobotJointPosition::new([0.0, 90.0, 0.0, 0.0, 0.0, 0.0]),
            &ExternalJointPosition::undefined(),
        );
        // Everything above axis 2 (z = 290) rotates forward about +Y
        assert!((origin(&fk.tcp_plane) - Point3::new(340.0, 0.0, -84.0)).norm() < 1e-9);
    }

    #[test]
    fn test_out_of_limits_reported() {
        let robot = Robot::irb120();
        let fk = ForwardKinematics::new(&robot).calculate(
            &RobotJointPosition::new([0.0, 0.0, 100.0, 0.0, 0.0, 0.0]),
            &ExternalJointPosition::undefined(),
        );
        assert_eq!(fk.errors.len(), 1);
        assert!(fk.errors[0].contains("Internal axis value 3"));
    }

    #[test]
    fn test_track_moves_robot() {
        let mut robot = Robot::irb120();
        let track = ExternalAxis::linear(
            "track",
            Isometry3::identity(),
            plane_from_normal(Point3::origin(), Vector3::y()),
            Interval::new(0.0, 2000.0),
        ).unwrap();
        robot.set_external_axes(vec![track]).unwrap();
        let fk = ForwardKinematics::new(&robot).calculate(
            &RobotJointPosition::default(),
            &ExternalJointPosition::new(&[500.0]).unwrap(),
        );
        assert!((origin(&fk.tcp_plane) - Point3::new(374.0, 500.0, 630.0)).norm() < 1e-9);
        assert!((origin(&fk.external_axis_planes[0]) - Point3::new(0.0, 500.0, 0.0)).norm() < 1e-9);
    }

    #[test]
    fn test_tool_override() {
        let robot = Robot::irb120();
        let pen = RobotTool::with_offset("pen", 0.0, 0.0, 100.0, 0.2).unwrap();
        let fk = ForwardKinematics::new(&robot)
            .with_tool(&pen)
            .calculate(&RobotJointPosition::default(), &ExternalJointPosition::undefined());
        assert!((origin(&fk.tcp_plane) - Point3::new(474.0, 0.0, 630.0)).norm() < 1e-9);
    }

    #[test]
    fn test_pose_meshes_count() {
        let robot = Robot::irb120();
        let meshes = robot.pose_meshes(&RobotJointPosition::default(), &ExternalJointPosition::undefined());
        assert_eq!(meshes.len(), 8);
    }
}
