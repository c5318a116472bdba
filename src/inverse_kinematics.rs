//! Closed-form inverse kinematics of six axis robots with a spherical wrist.
//!
//! [`ArmKinematics`] solves the bare arm in its base frame: the pose it takes and returns is the
//! mounting frame (flange). [`InverseKinematics`] places it in the world with the
//! [`Base`] and [`Tool`] wrappers, so targets are TCP planes in world space, and checks the
//! solutions against the axis limits of the robot.
//!
//! The arm is solved in three steps. Axis 1 turns the wrist center into the arm plane (front or
//! back reach). Axes 2 and 3 close the triangle axis 2 origin, axis 3 origin, wrist center with
//! the law of cosines (elbow up or down). Axes 4, 5 and 6 decompose the remaining rotation as
//! Z-Y-Z Euler angles about the wrist axes (normal or flipped wrist).

use std::f64::consts::PI;
use std::sync::Arc;

use nalgebra::{Matrix3, Point3, Vector3};
use tracing::debug;

use crate::forward_kinematics::{chain_transforms, ForwardKinematics};
use crate::geometry::{normal, origin, rotation_about, Interval, Plane};
use crate::joint_position::{ExternalJointPosition, RobotJointPosition};
use crate::kinematic_traits::{
    Configuration, Joints, Kinematics, Pose, Solutions, CONFIGURATIONS, SINGULARITY_ANGLE_THR,
};
use crate::external_axis::ExternalAxisKind;
use crate::robot::{KinematicConstants, Robot};
use crate::tool::{Base, RobotTool, Tool};
use crate::utils::normalize_angle;
use crate::utils::is_valid;

/// Slack allowed on the law of cosines before a branch is declared unreachable.
const REACH_EPSILON: f64 = 1e-9;

/// Distance (mm) below which the wrist center is considered to lie on axis 1.
const AXIS1_SINGULARITY: f64 = 1e-6;

/// Tolerances of the forward kinematics cross-check of each solution.
const CHECK_DISTANCE: f64 = 1e-3;
const CHECK_ANGLE: f64 = 1e-5;

const NAN_JOINTS: Joints = [f64::NAN; 6];

/// Inverse and forward kinematics of the robot arm in its base frame, flange as the pose.
#[derive(Debug, Clone)]
pub struct ArmKinematics {
    planes: [Plane; 6],
    flange: Plane,
    constants: KinematicConstants,
    /// Axis 5 origin (the wrist center) in flange coordinates.
    wrist_in_flange: Point3<f64>,
}

impl ArmKinematics {
    pub fn new(robot: &Robot) -> Self {
        let planes = robot.local_axis_planes();
        let flange = robot.local_mounting_frame();
        let wrist_in_flange = flange.inverse() * origin(&planes[4]);
        ArmKinematics {
            planes,
            flange,
            constants: *robot.kinematics(),
            wrist_in_flange,
        }
    }

    fn p(&self, axis: usize) -> Point3<f64> {
        origin(&self.planes[axis])
    }

    fn n(&self, axis: usize) -> Vector3<f64> {
        normal(&self.planes[axis]).normalize()
    }

    /// Base rotation candidates (front, back) for the wrist center, or None if the wrist center
    /// is closer to axis 1 than the lateral offset of the arm.
    fn solve_axis1(&self, wrist: &Point3<f64>, previous: Option<&Joints>) -> Option<[f64; 2]> {
        let n1 = self.n(0);
        let v = (self.n(1) - n1 * n1.dot(&self.n(1))).normalize();
        let u = v.cross(&n1);
        let lateral = (self.p(4) - self.p(0)).dot(&v);

        let relative = wrist - self.p(0);
        let (x, y) = (relative.dot(&u), relative.dot(&v));
        let r2 = x * x + y * y;
        if r2 < lateral * lateral - REACH_EPSILON {
            return None;
        }
        let d = (r2 - lateral * lateral).max(0.0).sqrt();

        if r2.sqrt() < AXIS1_SINGULARITY {
            // Wrist center on axis 1, any base rotation works
            let keep = previous.map_or(0.0, |p| p[0]);
            debug!("Wrist center on axis 1, keeping axis 1 at {:.3} deg", keep.to_degrees());
            return Some([keep, normalize_angle(keep + PI)]);
        }

        let phi = f64::atan2(y, x);
        Some([
            normalize_angle(phi - f64::atan2(lateral, d)),
            normalize_angle(phi - f64::atan2(lateral, -d)),
        ])
    }

    /// Axis 2 and 3 values for the elbow up and elbow down branches, given axis 1. A branch is
    /// None if the wrist center is out of reach of the arm.
    fn solve_axes23(&self, wrist: &Point3<f64>, q1: f64) -> [Option<(f64, f64)>; 2] {
        let n1 = self.n(0);
        let n2 = self.n(1);
        let n3 = self.n(2);

        // Undo axis 1 so the wrist center lies in the zero pose arm plane
        let unturn = rotation_about(&self.planes[0], -q1);
        let w = unturn * wrist;

        // In-plane basis with ea x eb = n2, so positive axis 2 rotation increases the angle
        let ea = (n1 - n2 * n2.dot(&n1)).normalize();
        let eb = n2.cross(&ea);
        let flat = |p: &Point3<f64>| -> (f64, f64) {
            let d = p - self.p(1);
            (d.dot(&ea), d.dot(&eb))
        };
        let angle = |(a, b): (f64, f64)| f64::atan2(b, a);

        let p3 = flat(&self.p(2));
        let p5 = flat(&self.p(4));
        let target = flat(&w);

        let lower = (p3.0, p3.1);
        let upper = (p5.0 - p3.0, p5.1 - p3.1);
        let l = lower.0.hypot(lower.1);
        let u_len = upper.0.hypot(upper.1);
        let distance = (target.0 * target.0 + target.1 * target.1).sqrt();

        if distance > self.constants.elbow_length + REACH_EPSILON {
            return [None, None];
        }

        let cos_gamma = (distance * distance - l * l - u_len * u_len) / (2.0 * l * u_len);
        if cos_gamma.abs() > 1.0 + REACH_EPSILON {
            return [None, None];
        }
        let gamma = cos_gamma.clamp(-1.0, 1.0).acos();

        // Elbow up keeps the sign of the zero pose elbow angle
        let gamma0 = normalize_angle(angle(upper) - angle(lower));
        let up_sign = if gamma0 >= 0.0 { 1.0 } else { -1.0 };
        let s3 = if n3.dot(&n2) >= 0.0 { 1.0 } else { -1.0 };

        [up_sign * gamma, -up_sign * gamma].map(|g| {
            let q3 = s3 * normalize_angle(g - gamma0);
            let lower_angle = angle(target) - f64::atan2(u_len * g.sin(), l + u_len * g.cos());
            let q2 = normalize_angle(lower_angle - angle(lower));
            Some((q2, q3))
        })
    }

    /// Axis 4, 5 and 6 values for the normal and flipped wrist.
    fn solve_wrist(&self, flange: &Pose, arm: &[f64; 3], previous: Option<&Joints>) -> [[f64; 3]; 2] {
        let chain = chain_transforms(&self.planes, &[arm[0], arm[1], arm[2], 0.0, 0.0, 0.0]);
        let remaining = chain[2].rotation.inverse() * flange.rotation * self.flange.rotation.inverse();
        let rw = remaining.to_rotation_matrix().into_inner();

        let c = self.n(3);
        let b = (self.n(4) - c * c.dot(&self.n(4))).normalize();
        let a = b.cross(&c);
        let basis = Matrix3::from_columns(&[a, b, c]);
        let m = basis.transpose() * rw * basis;
        let s6 = if self.n(5).dot(&c) >= 0.0 { 1.0 } else { -1.0 };

        let cos5 = m[(2, 2)].clamp(-1.0, 1.0);
        let q5 = cos5.acos();
        let keep4 = previous.map_or(0.0, |p| p[3]);

        let (q4, turn6) = if q5 < SINGULARITY_ANGLE_THR {
            // Only the sum of axis 4 and 6 is defined
            let sum = f64::atan2(m[(1, 0)], m[(0, 0)]);
            debug!("Singular wrist, keeping axis 4 at {:.3} deg", keep4.to_degrees());
            (keep4, sum - keep4)
        } else if PI - q5 < SINGULARITY_ANGLE_THR {
            let difference = f64::atan2(m[(1, 0)], m[(1, 1)]);
            debug!("Wrist folded back, keeping axis 4 at {:.3} deg", keep4.to_degrees());
            (keep4, keep4 + difference)
        } else {
            (
                f64::atan2(m[(1, 2)], m[(0, 2)]),
                f64::atan2(m[(2, 1)], -m[(2, 0)]),
            )
        };

        let normal_wrist = [normalize_angle(q4), q5, normalize_angle(s6 * turn6)];
        let flipped_wrist = [
            normalize_angle(q4 + PI),
            -q5,
            normalize_angle(s6 * (turn6 + PI)),
        ];
        [normal_wrist, flipped_wrist]
    }

    fn solve(&self, pose: &Pose, previous: Option<&Joints>) -> Solutions {
        let mut solutions: Solutions = [NAN_JOINTS; CONFIGURATIONS];
        let wrist = pose * self.wrist_in_flange;

        let Some(base) = self.solve_axis1(&wrist, previous) else {
            debug!("Wrist center too close to axis 1, no solution");
            return solutions;
        };

        for (base_index, q1) in base.into_iter().enumerate() {
            for (elbow_index, arm) in self.solve_axes23(&wrist, q1).into_iter().enumerate() {
                let Some((q2, q3)) = arm else {
                    continue;
                };
                let wrists = self.solve_wrist(pose, &[q1, q2, q3], previous);
                for (wrist_index, [q4, q5, q6]) in wrists.into_iter().enumerate() {
                    let index = Configuration {
                        base_back: base_index == 1,
                        elbow_down: elbow_index == 1,
                        wrist_flipped: wrist_index == 1,
                    }
                    .index();
                    let joints = [q1, q2, q3, q4, q5, q6];
                    if self.reproduces(&joints, pose) {
                        solutions[index] = joints;
                    } else {
                        debug!("Configuration {} does not reproduce the target", index);
                    }
                }
            }
        }
        solutions
    }

    /// Cross-check with forward kinematics. Arms that do not have a spherical wrist fail here.
    fn reproduces(&self, joints: &Joints, pose: &Pose) -> bool {
        let reached = self.forward(joints);
        (reached.translation.vector - pose.translation.vector).norm() < CHECK_DISTANCE
            && reached.rotation.angle_to(&pose.rotation) < CHECK_ANGLE
    }
}

impl Kinematics for ArmKinematics {
    fn inverse(&self, pose: &Pose) -> Solutions {
        self.solve(pose, None)
    }

    fn inverse_continuing(&self, pose: &Pose, previous: &Joints) -> Solutions {
        self.solve(pose, Some(previous))
    }

    fn forward(&self, qs: &Joints) -> Pose {
        chain_transforms(&self.planes, qs)[5] * self.flange
    }
}

/// Picks the value among `value` and `value ± 360` that lies inside the limits, preferring the
/// one closest to `previous` (or to zero). Returns the value itself if none fits.
fn fit_into_limits(value: f64, limits: &Interval, previous: Option<f64>) -> f64 {
    let reference = previous.unwrap_or(0.0);
    [value, value - 360.0, value + 360.0]
        .into_iter()
        .filter(|v| limits.includes(*v))
        .min_by(|a, b| (a - reference).abs().total_cmp(&(b - reference).abs()))
        .unwrap_or(value)
}

/// One of the eight configurations.
#[derive(Debug, Clone, PartialEq)]
pub struct IkConfiguration {
    /// Joint values in degrees; NaN if the configuration cannot reach the target.
    pub joints: RobotJointPosition,
    pub reachable: bool,
    /// Axes (0 based) outside of their limits.
    pub out_of_limits: Vec<usize>,
}

impl IkConfiguration {
    pub fn in_limits(&self) -> bool {
        self.reachable && self.out_of_limits.is_empty()
    }

    pub fn is_valid(&self) -> bool {
        self.in_limits()
    }
}

#[derive(Debug, Clone)]
pub struct InverseKinematicsResult {
    /// All eight configurations in the order of [`Configuration::index`].
    pub configurations: Vec<IkConfiguration>,
    /// Index of the selected configuration, None if nothing reaches the target.
    pub selected: Option<usize>,
    /// External axis values used, including the value computed for the robot carrying axis.
    pub external_joint_position: ExternalJointPosition,
    pub errors: Vec<String>,
}

impl InverseKinematicsResult {
    /// Joint values of the selected configuration.
    pub fn robot_joint_position(&self) -> Option<RobotJointPosition> {
        self.selected.map(|i| self.configurations[i].joints)
    }

    /// True if a configuration is selected and it respects all limits.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty() && self.selected.is_some_and(|i| self.configurations[i].is_valid())
    }

    /// True if no configuration reaches the target at all.
    pub fn out_of_reach(&self) -> bool {
        self.configurations.iter().all(|c| !c.reachable)
    }

    pub fn valid_configurations(&self) -> Vec<usize> {
        (0..self.configurations.len())
            .filter(|&i| self.configurations[i].is_valid())
            .collect()
    }
}

/// Inverse kinematics of a robot in the world, with its tool and external axes.
pub struct InverseKinematics<'a> {
    robot: &'a Robot,
    tool: Option<&'a RobotTool>,
}

impl<'a> InverseKinematics<'a> {
    pub fn new(robot: &'a Robot) -> Self {
        InverseKinematics { robot, tool: None }
    }

    /// Solve for this tool instead of the one attached to the robot.
    pub fn with_tool(mut self, tool: &'a RobotTool) -> Self {
        self.tool = Some(tool);
        self
    }

    /// External axis values, with the robot carrying linear axis placed closest to the target
    /// when it has no value.
    fn external_values(&self, target: &Pose, external: Option<&ExternalJointPosition>) -> ExternalJointPosition {
        let mut values = external.copied().unwrap_or_default();
        if let Some(axis) = self.robot.robot_moving_axis() {
            if let Some(number) = axis.axis_number {
                if !values.is_defined(number) && axis.kind == ExternalAxisKind::Linear {
                    let tcp = Point3::from(target.translation.vector);
                    let value = axis.closest_value(&tcp);
                    debug!("External axis {} placed at {:.3} for the target", axis.name, value);
                    values.set(number, value);
                }
            }
        }
        values
    }

    /// Kinematics of the whole robot in world space, TCP as the pose.
    fn kinematics(&self, external: &ExternalJointPosition) -> impl Kinematics {
        let tool = self.tool.unwrap_or_else(|| self.robot.tool());
        let displacement = ForwardKinematics::new(self.robot).robot_displacement(external);
        Base {
            robot: Arc::new(Tool {
                robot: Arc::new(ArmKinematics::new(self.robot)),
                tool: tool.tcp_offset(),
            }),
            base: displacement * *self.robot.base_plane(),
        }
    }

    /// Solves all configurations for the TCP target (world space) and selects one.
    ///
    /// `preference` is the configuration index (0 to 7) to select; without it the first valid
    /// configuration is taken. `previous` joint values (degrees) resolve the singular wrist and
    /// choose between equivalent values of the wide range axes.
    pub fn calculate(
        &self,
        target: &Pose,
        external: Option<&ExternalJointPosition>,
        preference: Option<usize>,
        previous: Option<&RobotJointPosition>,
    ) -> InverseKinematicsResult {
        let external_joint_position = self.external_values(target, external);
        let kinematics = self.kinematics(&external_joint_position);
        let solutions = match previous {
            Some(p) => kinematics.inverse_continuing(target, &p.to_radians()),
            None => kinematics.inverse(target),
        };

        let limits = self.robot.internal_axis_limits();
        let configurations: Vec<IkConfiguration> = solutions
            .iter()
            .map(|solution| {
                if !is_valid(solution) {
                    return IkConfiguration {
                        joints: RobotJointPosition::from_radians(solution),
                        reachable: false,
                        out_of_limits: Vec::new(),
                    };
                }
                let mut joints = RobotJointPosition::from_radians(solution);
                for axis in 0..6 {
                    joints[axis] = fit_into_limits(joints[axis], &limits[axis], previous.map(|p| p[axis]));
                }
                IkConfiguration {
                    out_of_limits: joints.axes_out_of_limits(limits),
                    joints,
                    reachable: true,
                }
            })
            .collect();

        let mut errors = Vec::new();
        let selected = match preference {
            Some(index) if index < CONFIGURATIONS => {
                if configurations[index].reachable {
                    Some(index)
                } else {
                    None
                }
            }
            Some(index) => {
                errors.push(format!("Configuration {} does not exist, expected 0 to 7.", index));
                None
            }
            None => configurations
                .iter()
                .position(IkConfiguration::is_valid)
                .or_else(|| configurations.iter().position(|c| c.reachable)),
        };

        if configurations.iter().all(|c| !c.reachable) {
            errors.push("The target is out of reach.".to_string());
        } else if selected.is_none() {
            if let Some(index) = preference.filter(|i| *i < CONFIGURATIONS) {
                errors.push(format!("The target cannot be reached in configuration {}.", index));
            }
        }

        if let Some(index) = selected {
            let joints = configurations[index].joints;
            for axis in &configurations[index].out_of_limits {
                errors.push(format!(
                    "Internal axis value {} ({:.3}) is not in range {} to {}.",
                    axis + 1,
                    joints[*axis],
                    limits[*axis].min(),
                    limits[*axis].max()
                ));
            }
        }

        for axis in self.robot.external_axes() {
            if let Some(value) = axis.axis_number.and_then(|n| external_joint_position.get(n)) {
                if !axis.in_limits(value) {
                    errors.push(format!(
                        "External axis value {} of {} is not in range {} to {}.",
                        value, axis.name, axis.axis_limits.min(), axis.axis_limits.max()
                    ));
                }
            }
        }

        InverseKinematicsResult {
            configurations,
            selected,
            external_joint_position,
            errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::assert_pose_eq;
    use nalgebra::Isometry3;

    fn flange_at(robot: &Robot, degrees: &[f64; 6]) -> Isometry3<f64> {
        ArmKinematics::new(robot).forward(&degrees.map(f64::to_radians))
    }

    #[test]
    fn test_zero_pose_solutions_include_zero() {
        let robot = Robot::irb120();
        let arm = ArmKinematics::new(&robot);
        let solutions = arm.inverse(&arm.forward(&[0.0; 6]));
        // Axis 5 at zero is singular; axis 4 is kept at 0 so axis 6 is 0 too
        let first = solutions[0];
        for q in first {
            assert!(q.abs() < 1e-6, "Expected zero pose, got {:?}", first);
        }
    }

    #[test]
    fn test_known_pose_round_trip() {
        let robot = Robot::irb120();
        let arm = ArmKinematics::new(&robot);
        let degrees = [20.0, 30.0, -40.0, 50.0, 60.0, 70.0];
        let pose = flange_at(&robot, &degrees);
        let solutions = arm.inverse(&pose);
        let found = solutions.iter().filter(|s| is_valid(s)).any(|s| {
            s.iter().zip(degrees.iter()).all(|(q, d)| (normalize_angle(q - d.to_radians())).abs() < 1e-6)
        });
        assert!(found, "The original joints must be one of the solutions");
        for solution in solutions.iter().filter(|s| is_valid(s)) {
            assert_pose_eq(&arm.forward(solution), &pose, 1e-6, 1e-6);
        }
    }

    #[test]
    fn test_fit_into_limits() {
        let limits = Interval::new(-400.0, 400.0);
        assert_eq!(fit_into_limits(170.0, &limits, Some(-200.0)), -190.0);
        assert_eq!(fit_into_limits(170.0, &limits, None), 170.0);
        let narrow = Interval::new(-160.0, 160.0);
        assert_eq!(fit_into_limits(179.0, &narrow, None), 179.0);
    }

    #[test]
    fn test_preference_is_respected() {
        let robot = Robot::irb120();
        let target = ForwardKinematics::new(&robot)
            .calculate(&RobotJointPosition::new([10.0, 20.0, -30.0, 40.0, 50.0, 60.0]), &ExternalJointPosition::undefined())
            .tcp_plane;
        let ik = InverseKinematics::new(&robot);
        let result = ik.calculate(&target, None, None, None);
        let valid = result.valid_configurations();
        assert!(!valid.is_empty());
        assert_eq!(result.selected, Some(valid[0]));
        let last = *valid.last().unwrap();
        let preferred = ik.calculate(&target, None, Some(last), None);
        assert_eq!(preferred.selected, Some(last));
    }

    #[test]
    fn test_out_of_reach() {
        let robot = Robot::irb120();
        let target = Isometry3::translation(2000.0, 0.0, 500.0);
        let result = InverseKinematics::new(&robot).calculate(&target, None, None, None);
        assert!(result.out_of_reach());
        assert!(result.selected.is_none());
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.contains("out of reach")));
    }
}
