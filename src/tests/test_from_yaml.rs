#[cfg(test)]
mod tests {
    use std::path::Path;

    use crate::error::RobotError;
    use crate::forward_kinematics::ForwardKinematics;
    use crate::joint_position::{ExternalJointPosition, RobotJointPosition};
    use crate::robot::Robot;
    use crate::utils::assert_pose_eq;

    const READ_ERROR: &str = "Failed to load robot from file";

    #[test]
    fn test_robot_from_yaml() {
        let loaded = Robot::from_yaml_file("src/tests/data/irb120.yaml").expect(READ_ERROR);
        let preset = Robot::irb120();

        assert_eq!(loaded.name(), "IRB120");
        assert_eq!(loaded.tool().name, "pen");
        assert_eq!(loaded.internal_axis_limits(), preset.internal_axis_limits());
        for (a, b) in loaded.internal_axis_planes().iter().zip(preset.internal_axis_planes()) {
            assert_pose_eq(a, b, 1e-9, 1e-9);
        }
        assert_pose_eq(loaded.mounting_frame(), preset.mounting_frame(), 1e-9, 1e-9);
        assert!((loaded.kinematics().elbow_length - preset.kinematics().elbow_length).abs() < 1e-9);

        // The pen reaches 100 mm beyond the flange
        let joints = RobotJointPosition([0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let tcp = ForwardKinematics::new(&loaded)
            .calculate(&joints, &ExternalJointPosition::default())
            .tcp_plane;
        assert!((tcp.translation.vector - nalgebra::Vector3::new(474.0, 0.0, 630.0)).norm() < 1e-9);
    }

    #[test]
    fn test_missing_axes() {
        match Robot::from_yaml_file("src/tests/data/missing_axes.yaml") {
            Err(RobotError::MissingField(field)) => assert_eq!(field, "axes"),
            other => panic!("Expected missing field error, got {:?}", other.map(|r| r.name().to_string())),
        }
    }

    #[test]
    fn test_yaml_errors() {
        let directory = Path::new(".");
        let five_axes = r#"
name: Short
axes:
  - { origin: [0, 0, 0], normal: [0, 0, 1], limits: [-165, 165] }
  - { origin: [0, 0, 290], normal: [0, 1, 0], limits: [-110, 110] }
  - { origin: [0, 0, 560], normal: [0, 1, 0], limits: [-110, 70] }
  - { origin: [302, 0, 630], normal: [1, 0, 0], limits: [-160, 160] }
  - { origin: [302, 0, 630], normal: [0, 1, 0], limits: [-120, 120] }
mounting_frame: { origin: [374, 0, 630], x_axis: [0, 0, -1], y_axis: [0, 1, 0] }
"#;
        assert!(matches!(
            Robot::from_yaml_str(five_axes, directory),
            Err(RobotError::InvalidLength { expected: 6, found: 5 })
        ));

        let six_axes = five_axes.replace(
            "mounting_frame",
            "  - { origin: [374, 0, 630], normal: [1, 0, 0], limits: [-400, 400] }\nmounting_frame",
        );
        let robot = Robot::from_yaml_str(&six_axes, directory).expect(READ_ERROR);
        assert_eq!(robot.tool().name, "tool0");

        let bad_number = six_axes.replace("[-165, 165]", "[low, 165]");
        assert!(matches!(Robot::from_yaml_str(&bad_number, directory), Err(RobotError::ParseError(_))));

        assert!(matches!(Robot::from_yaml_str("name: [unclosed", directory), Err(RobotError::ParseError(_))));
        assert!(matches!(Robot::from_yaml_file("src/tests/data/no_such_file.yaml"), Err(RobotError::Io(_))));
    }
}
