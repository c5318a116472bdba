#[cfg(test)]
mod tests {
    use crate::actions::{
        Action, Comment, DeclarationKind, JointTarget, Movement, MovementType, OverrideRobotTool, RobotTarget,
        SetDigitalOutput, SpeedData, SyncMoveOff, SyncMoveOn, Syncident, Target, TaskList, WaitTime, ZoneData,
    };
    use crate::forward_kinematics::ForwardKinematics;
    use crate::geometry::Plane;
    use crate::joint_position::{ExternalJointPosition, RobotJointPosition};
    use crate::rapid_generator::RapidGenerator;
    use crate::robot::Robot;
    use crate::tool::RobotTool;

    fn tcp_at(robot: &Robot, tool: &RobotTool, joints: [f64; 6]) -> Plane {
        ForwardKinematics::new(robot)
            .with_tool(tool)
            .calculate(&RobotJointPosition(joints), &ExternalJointPosition::default())
            .tcp_plane
    }

    fn move_l(target: RobotTarget) -> Action {
        Movement::new(MovementType::MoveL, Target::Robot(target), SpeedData::default(), ZoneData::fine()).into()
    }

    /// Instruction lines between `PROC main()` and `ENDPROC`, without indentation.
    fn body(code: &str) -> Vec<String> {
        code.lines()
            .skip_while(|line| line.trim() != "PROC main()")
            .skip(1)
            .take_while(|line| line.trim() != "ENDPROC")
            .map(|line| line.trim().to_string())
            .collect()
    }

    #[test]
    fn test_same_name_declared_once_with_warning() {
        let robot = Robot::irb120();
        let tool0 = RobotTool::tool0();
        let first = RobotTarget::new("p1", tcp_at(&robot, &tool0, [0.0, 0.0, 0.0, 0.0, 30.0, 0.0]), 0).unwrap();
        let second = RobotTarget::new("p1", tcp_at(&robot, &tool0, [10.0, 0.0, 0.0, 0.0, 30.0, 0.0]), 0).unwrap();
        let actions = vec![Action::from(first.clone()), second.into(), move_l(first)];

        let mut generator = RapidGenerator::new(&robot);
        let code = generator.generate_program("Main", &actions).unwrap().to_string();
        assert_eq!(code.matches("robtarget p1 :=").count(), 1);
        assert_eq!(generator.declared_names(DeclarationKind::Target), vec!["p1"]);
        // Only the declaration with other values is reported
        assert_eq!(generator.warnings().len(), 1, "{:?}", generator.warnings());
        assert!(generator.warnings()[0].contains("p1"));
        assert_eq!(body(&code), vec!["MoveL p1, v200, fine, tool0\\WObj:=wobj0;"]);
    }

    #[test]
    fn test_identical_declarations_are_shared_silently() {
        let robot = Robot::irb120();
        let speed = SpeedData::new("vSlow", 50.0, 100.0, 1000.0, 100.0).unwrap();
        let actions: Vec<Action> = vec![speed.clone().into(), WaitTime::new(1.0).into(), speed.into()];

        let mut generator = RapidGenerator::new(&robot);
        let code = generator.generate_program("Shared", &actions).unwrap().to_string();
        assert_eq!(code.matches("VAR speeddata vSlow :=").count(), 1);
        assert_eq!(generator.declared_names(DeclarationKind::Speed), vec!["vSlow"]);
        assert!(generator.warnings().is_empty(), "{:?}", generator.warnings());
    }

    #[test]
    fn test_name_of_other_data_type_comments_instruction_out() {
        let robot = Robot::irb120();
        let tool0 = RobotTool::tool0();
        let target = RobotTarget::new("p1", tcp_at(&robot, &tool0, [0.0, 0.0, 0.0, 0.0, 30.0, 0.0]), 0).unwrap();
        let actions: Vec<Action> = vec![
            move_l(target.clone()),
            Movement::new(MovementType::MoveAbsJ, Target::Robot(target), SpeedData::default(), ZoneData::fine())
                .into(),
        ];

        let mut generator = RapidGenerator::new(&robot);
        let code = generator.generate_program("Mixed", &actions).unwrap().to_string();
        assert_eq!(code.matches("robtarget p1 :=").count(), 1);
        assert!(!code.contains("jointtarget p1"));
        assert_eq!(
            body(&code),
            vec!["MoveL p1, v200, fine, tool0\\WObj:=wobj0;", "! MoveAbsJ p1, v200, fine, tool0\\WObj:=wobj0;"]
        );
        assert_eq!(generator.warnings().len(), 1, "{:?}", generator.warnings());
        assert!(generator.warnings()[0].starts_with("Action 1: the name p1 is already declared as robtarget"));
    }

    #[test]
    fn test_instructions_keep_action_order() {
        let robot = Robot::irb120();
        let mut actions: Vec<Action> = Vec::new();
        let mut expected = Vec::new();
        for i in 0..10 {
            let name = format!("do{}", i);
            actions.push(SetDigitalOutput::new(&name, i % 2 == 0).into());
            expected.push(format!("SetDO {}, {};", name, if i % 2 == 0 { 1 } else { 0 }));
            // Declarations in between do not disturb the order
            actions.push(SpeedData::new(&format!("speed{}", i), 100.0 + i as f64, 500.0, 5000.0, 1000.0).unwrap().into());
            actions.push(WaitTime::new(i as f64 + 0.25).into());
            expected.push(format!("WaitTime {};", i as f64 + 0.25));
        }
        actions.push(Comment::new("done\nreally").into());
        expected.push("! done".to_string());
        expected.push("! really".to_string());

        let mut generator = RapidGenerator::new(&robot);
        let code = generator.generate_program("Ordered", &actions).unwrap().to_string();
        assert_eq!(body(&code), expected);
        assert_eq!(generator.declared_names(DeclarationKind::Speed).len(), 10);
        assert!(generator.warnings().is_empty());
    }

    #[test]
    fn test_override_tool_changes_following_movements() {
        let robot = Robot::irb120();
        let tool0 = RobotTool::tool0();
        let pen = RobotTool::with_offset("pen", 0.0, 0.0, 100.0, 0.2).unwrap();
        let p1 = RobotTarget::new("p1", tcp_at(&robot, &tool0, [0.0, 10.0, 10.0, 0.0, 40.0, 0.0]), 0).unwrap();
        let p2 = RobotTarget::new("p2", tcp_at(&robot, &pen, [0.0, 10.0, 10.0, 0.0, 40.0, 0.0]), 0).unwrap();
        let actions = vec![move_l(p1), OverrideRobotTool::new(pen).into(), move_l(p2)];

        let mut generator = RapidGenerator::new(&robot);
        let code = generator.generate_program("Tools", &actions).unwrap().to_string();
        assert_eq!(
            body(&code),
            vec!["MoveL p1, v200, fine, tool0\\WObj:=wobj0;", "MoveL p2, v200, fine, pen\\WObj:=wobj0;"]
        );
        // Both targets are reachable with their own tool
        assert!(generator.warnings().is_empty(), "{:?}", generator.warnings());
    }

    #[test]
    fn test_targets_converted_between_joint_and_cartesian() {
        let robot = Robot::irb120();
        let tool0 = RobotTool::tool0();
        let cartesian = RobotTarget::new("pc", tcp_at(&robot, &tool0, [20.0, 10.0, 5.0, 0.0, 45.0, 0.0]), 0).unwrap();
        let joints = JointTarget::new("pj", RobotJointPosition([-20.0, 15.0, 0.0, 10.0, 30.0, 0.0])).unwrap();
        let actions: Vec<Action> = vec![
            Movement::new(MovementType::MoveAbsJ, Target::Robot(cartesian), SpeedData::default(), ZoneData::fine())
                .into(),
            Movement::new(MovementType::MoveJ, Target::Joint(joints), SpeedData::default(), ZoneData::fine())
                .with_digital_output(SetDigitalOutput::new("doGrip", true))
                .into(),
        ];

        let mut generator = RapidGenerator::new(&robot);
        let code = generator.generate_program("Convert", &actions).unwrap().to_string();
        assert!(code.contains("    VAR jointtarget pc := [[20, 10, 5, 0, 45, 0], [9E9, 9E9, 9E9, 9E9, 9E9, 9E9]];"));
        assert!(code.contains("    VAR robtarget pj := [["));
        assert_eq!(
            body(&code),
            vec![
                "MoveAbsJ pc, v200, fine, tool0\\WObj:=wobj0;",
                "MoveJDO pj, v200, fine, tool0\\WObj:=wobj0, doGrip, 1;"
            ]
        );
        assert!(generator.warnings().is_empty(), "{:?}", generator.warnings());
    }

    #[test]
    fn test_unreachable_target_is_a_warning() {
        let robot = Robot::irb120();
        let far = RobotTarget::new("far", nalgebra::Isometry3::translation(2000.0, 0.0, 500.0), 0).unwrap();
        let actions = vec![
            Movement::new(MovementType::MoveAbsJ, Target::Robot(far), SpeedData::default(), ZoneData::fine()).into(),
            WaitTime::new(1.0).into(),
        ];

        let mut generator = RapidGenerator::new(&robot);
        let code = generator.generate_program("Far", &actions).unwrap().to_string();
        assert!(!code.contains("jointtarget far"));
        // No instruction may reference the undeclared target
        assert!(body(&code).iter().all(|line| !line.starts_with("MoveAbsJ far")), "{}", code);
        assert_eq!(
            body(&code),
            vec!["! MoveAbsJ far skipped, no joint values reach the target", "WaitTime 1;"]
        );
        assert!(generator
            .warnings()
            .iter()
            .any(|w| w.starts_with("Action 0 (MoveAbsJ far)") && w.contains("out of reach")));
    }

    #[test]
    fn test_synchronized_movement() {
        let robot = Robot::irb120();
        let tool0 = RobotTool::tool0();
        let tasks = TaskList::new("all_tasks", &["T_ROB1", "T_ROB2"]).unwrap();
        let on = Syncident::new("sync1").unwrap();
        let off = Syncident::new("sync2").unwrap();
        let target = RobotTarget::new("p1", tcp_at(&robot, &tool0, [0.0, 0.0, 0.0, 0.0, 30.0, 0.0]), 0).unwrap();
        let actions: Vec<Action> = vec![
            SyncMoveOn::new(on, tasks).into(),
            Movement::new(MovementType::MoveL, Target::Robot(target), SpeedData::default(), ZoneData::fine())
                .with_sync_id(10)
                .into(),
            SyncMoveOff::new(off, 5.0).into(),
        ];

        let mut generator = RapidGenerator::new(&robot);
        let code = generator.generate_program("Sync", &actions).unwrap().to_string();
        let tasks_line = code.find("PERS tasks all_tasks{2} := [[\"T_ROB1\"], [\"T_ROB2\"]];").unwrap();
        let sync1 = code.find("VAR syncident sync1;").unwrap();
        let sync2 = code.find("VAR syncident sync2;").unwrap();
        let target_line = code.find("VAR robtarget p1 :=").unwrap();
        assert!(tasks_line < sync1 && sync1 < sync2 && sync2 < target_line);
        assert_eq!(
            body(&code),
            vec![
                "SyncMoveOn sync1, all_tasks;",
                "MoveL p1\\ID:=10, v200, fine, tool0\\WObj:=wobj0;",
                "SyncMoveOff sync2\\TimeOut:=5;"
            ]
        );
    }
}
