//! Actions that produce RAPID instructions: movements, waits, signals and synchronization.

use crate::error::{RobotError, Result};
use crate::forward_kinematics::ForwardKinematics;
use crate::geometry::Plane;
use crate::inverse_kinematics::{InverseKinematics, InverseKinematicsResult};
use crate::joint_position::{ExternalJointPosition, RobotJointPosition};
use crate::rapid_format::{fmt_num, fmt_signal};
use crate::tool::RobotTool;
use crate::work_object::WorkObject;

use super::declarations::{JointTarget, RobotTarget, SpeedData, Syncident, TaskList, ZoneData};
use super::{validate_name, CodeContext, Declaration, DeclarationKind, RapidAction};

/// Maximal difference (degrees) for joint values to count as the same configuration.
const SAME_JOINTS: f64 = 1e-3;

fn invalid(action: &str, reason: impl Into<String>) -> RobotError {
    RobotError::InvalidAction { action: action.to_string(), reason: reason.into() }
}

/// `\Name:=value` if the value is positive, empty otherwise.
fn optional_argument(name: &str, value: f64) -> String {
    if value > 0.0 {
        format!("\\{}:={}", name, fmt_num(value))
    } else {
        String::new()
    }
}

fn check_optional_time(action: &str, value: f64) -> Result<()> {
    if value.is_nan() {
        return Err(invalid(action, "time is not a number"));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementType {
    MoveAbsJ,
    MoveL,
    MoveJ,
}

impl MovementType {
    pub fn keyword(&self) -> &'static str {
        match self {
            MovementType::MoveAbsJ => "MoveAbsJ",
            MovementType::MoveL => "MoveL",
            MovementType::MoveJ => "MoveJ",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    Robot(RobotTarget),
    Joint(JointTarget),
}

impl Target {
    pub fn name(&self) -> &str {
        match self {
            Target::Robot(target) => &target.name,
            Target::Joint(target) => &target.name,
        }
    }

    pub fn external_joint_position(&self) -> &ExternalJointPosition {
        match self {
            Target::Robot(target) => &target.external_joint_position,
            Target::Joint(target) => &target.external_joint_position,
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            Target::Robot(target) => target.validate(),
            Target::Joint(target) => target.validate(),
        }
    }
}

/// Sets a digital output signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetDigitalOutput {
    pub name: String,
    pub value: bool,
}

impl SetDigitalOutput {
    pub fn new(name: &str, value: bool) -> Self {
        SetDigitalOutput { name: name.to_string(), value }
    }
}

impl RapidAction for SetDigitalOutput {
    fn validate(&self) -> Result<()> {
        validate_name("SetDigitalOutput", &self.name)
    }

    fn to_rapid_instruction(&self, _context: &CodeContext) -> Option<String> {
        Some(format!("SetDO {}, {};", self.name, fmt_signal(self.value)))
    }
}

/// Linear, joint or absolute joint movement to a target.
#[derive(Debug, Clone, PartialEq)]
pub struct Movement {
    pub movement_type: MovementType,
    pub target: Target,
    pub speed: SpeedData,
    pub zone: ZoneData,
    /// Movement time in seconds (`\T`), used when positive.
    pub time: f64,
    /// Synchronization id (`\ID`) of coordinated movements.
    pub sync_id: Option<u32>,
    /// Tool to use instead of the current one.
    pub tool: Option<RobotTool>,
    pub work_object: WorkObject,
    /// Output set when the robot reaches the target (`MoveLDO` / `MoveJDO`).
    pub digital_output: Option<SetDigitalOutput>,
}

impl Movement {
    pub fn new(movement_type: MovementType, target: Target, speed: SpeedData, zone: ZoneData) -> Self {
        Movement {
            movement_type,
            target,
            speed,
            zone,
            time: -1.0,
            sync_id: None,
            tool: None,
            work_object: WorkObject::wobj0(),
            digital_output: None,
        }
    }

    pub fn with_time(mut self, time: f64) -> Self {
        self.time = time;
        self
    }

    pub fn with_sync_id(mut self, id: u32) -> Self {
        self.sync_id = Some(id);
        self
    }

    pub fn with_tool(mut self, tool: RobotTool) -> Self {
        self.tool = Some(tool);
        self
    }

    pub fn with_work_object(mut self, work_object: WorkObject) -> Self {
        self.work_object = work_object;
        self
    }

    pub fn with_digital_output(mut self, output: SetDigitalOutput) -> Self {
        self.digital_output = Some(output);
        self
    }

    fn label(&self) -> String {
        format!("{} {}", self.movement_type.keyword(), self.target.name())
    }

    fn tool<'a>(&'a self, context: &'a CodeContext) -> &'a RobotTool {
        self.tool.as_ref().unwrap_or(context.tool)
    }

    /// Value of the positioner carrying the work object, if any.
    fn positioner_value(&self, context: &CodeContext, external: &ExternalJointPosition) -> Option<f64> {
        let coupled = self.work_object.external_axis.as_ref()?;
        let number = context
            .robot
            .external_axes()
            .iter()
            .find(|axis| axis.name == coupled.name)
            .and_then(|axis| axis.axis_number)
            .or(coupled.axis_number)?;
        external.get(number)
    }

    /// Target plane in world space.
    fn world_plane(&self, target: &RobotTarget, context: &CodeContext) -> Plane {
        let axis_value = self.positioner_value(context, &target.external_joint_position);
        self.work_object.global_frame(axis_value) * target.plane
    }

    fn solve(&self, target: &RobotTarget, context: &CodeContext) -> InverseKinematicsResult {
        InverseKinematics::new(context.robot)
            .with_tool(self.tool(context))
            .calculate(
                &self.world_plane(target, context),
                Some(&target.external_joint_position),
                Some(target.axis_configuration),
                None,
            )
    }

    fn report(&self, context: &CodeContext, errors: &[String], warnings: &mut Vec<String>) {
        for error in errors {
            warnings.push(format!("Action {} ({}): {}", context.index, self.label(), error));
        }
    }

    /// Robot target reaching the joint target with the current tool, in work object coordinates.
    fn robot_target_for(&self, target: &JointTarget, context: &CodeContext, warnings: &mut Vec<String>) -> RobotTarget {
        let tool = self.tool(context);
        let fk = ForwardKinematics::new(context.robot)
            .with_tool(tool)
            .calculate(&target.robot_joint_position, &target.external_joint_position);
        self.report(context, &fk.errors, warnings);

        let axis_value = self.positioner_value(context, &target.external_joint_position);
        let plane = self.work_object.global_frame(axis_value).inverse() * fk.tcp_plane;

        // The configuration is the IK branch that gives back the same joint values
        let ik = InverseKinematics::new(context.robot).with_tool(tool).calculate(
            &fk.tcp_plane,
            Some(&target.external_joint_position),
            None,
            Some(&target.robot_joint_position),
        );
        let axis_configuration = ik
            .configurations
            .iter()
            .position(|c| {
                c.reachable
                    && (0..6).all(|i| (c.joints[i] - target.robot_joint_position[i]).abs() < SAME_JOINTS)
            })
            .unwrap_or(0);

        RobotTarget {
            name: target.name.clone(),
            plane,
            axis_configuration,
            external_joint_position: target.external_joint_position,
            reference_type: target.reference_type,
        }
    }
}

impl RapidAction for Movement {
    fn validate(&self) -> Result<()> {
        self.target.validate()?;
        self.speed.validate()?;
        self.zone.validate()?;
        self.work_object.validate()?;
        if let Some(tool) = &self.tool {
            tool.validate()?;
        }
        if let Some(output) = &self.digital_output {
            output.validate()?;
        }
        check_optional_time(&self.label(), self.time)
    }

    fn to_rapid_declarations(&self, context: &CodeContext, warnings: &mut Vec<String>) -> Vec<Declaration> {
        let mut declarations = Vec::new();
        if let Some(text) = self.speed.to_rapid_declaration() {
            declarations.push(Declaration::new(DeclarationKind::Speed, &self.speed.name, text));
        }
        if let Some(text) = self.zone.to_rapid_declaration() {
            declarations.push(Declaration::new(DeclarationKind::Zone, &self.zone.name, text));
        }

        let name = self.target.name();
        let text = match (&self.target, self.movement_type) {
            (Target::Robot(target), MovementType::MoveAbsJ) => {
                let ik = self.solve(target, context);
                self.report(context, &ik.errors, warnings);
                ik.robot_joint_position().map(|joints| {
                    JointTarget {
                        name: target.name.clone(),
                        robot_joint_position: joints,
                        external_joint_position: ik.external_joint_position,
                        reference_type: target.reference_type,
                    }
                    .to_rapid_declaration()
                })
            }
            (Target::Robot(target), _) => {
                let ik = self.solve(target, context);
                self.report(context, &ik.errors, warnings);
                Some(target.to_rapid_declaration_with(&ik.external_joint_position))
            }
            (Target::Joint(target), MovementType::MoveAbsJ) => {
                let fk = ForwardKinematics::new(context.robot)
                    .calculate(&target.robot_joint_position, &target.external_joint_position);
                self.report(context, &fk.errors, warnings);
                Some(target.to_rapid_declaration())
            }
            (Target::Joint(target), _) => Some(self.robot_target_for(target, context, warnings).to_rapid_declaration()),
        };
        if let Some(text) = text {
            declarations.push(Declaration::new(DeclarationKind::Target, name, text));
        }
        declarations
    }

    fn to_rapid_instruction(&self, context: &CodeContext) -> Option<String> {
        // Without a selected configuration no jointtarget was declared
        if let (Target::Robot(target), MovementType::MoveAbsJ) = (&self.target, self.movement_type) {
            if self.solve(target, context).robot_joint_position().is_none() {
                return Some(format!("! {} skipped, no joint values reach the target", self.label()));
            }
        }
        let with_output = self.movement_type != MovementType::MoveAbsJ && self.digital_output.is_some();
        let mut code = format!(
            "{}{} {}",
            self.movement_type.keyword(),
            if with_output { "DO" } else { "" },
            self.target.name()
        );
        if let Some(id) = self.sync_id {
            code.push_str(&format!("\\ID:={}", id));
        }
        code.push_str(&format!(
            ", {}{}, {}, {}\\WObj:={}",
            self.speed.name,
            optional_argument("T", self.time),
            self.zone.name,
            self.tool(context).name,
            self.work_object.name
        ));
        match &self.digital_output {
            Some(output) if with_output => {
                code.push_str(&format!(", {}, {};", output.name, fmt_signal(output.value)));
            }
            Some(output) => {
                // There is no MoveAbsJDO, the output is set after the movement
                code.push(';');
                code.push('\n');
                code.push_str(&output.to_rapid_instruction(context)?);
            }
            None => code.push(';'),
        }
        Some(code)
    }
}

/// `MoveAbsJ` to joint values given directly.
#[derive(Debug, Clone, PartialEq)]
pub struct AbsoluteJointMovement {
    pub name: String,
    pub robot_joint_position: RobotJointPosition,
    pub external_joint_position: ExternalJointPosition,
    pub speed: SpeedData,
    pub zone: ZoneData,
    pub time: f64,
    pub tool: Option<RobotTool>,
}

impl AbsoluteJointMovement {
    pub fn new(name: &str, robot_joint_position: RobotJointPosition, speed: SpeedData, zone: ZoneData) -> Self {
        AbsoluteJointMovement {
            name: name.to_string(),
            robot_joint_position,
            external_joint_position: ExternalJointPosition::undefined(),
            speed,
            zone,
            time: -1.0,
            tool: None,
        }
    }

    pub fn with_external_joint_position(mut self, external: ExternalJointPosition) -> Self {
        self.external_joint_position = external;
        self
    }

    pub fn with_time(mut self, time: f64) -> Self {
        self.time = time;
        self
    }

    pub fn with_tool(mut self, tool: RobotTool) -> Self {
        self.tool = Some(tool);
        self
    }

    fn joint_target(&self) -> JointTarget {
        JointTarget {
            name: self.name.clone(),
            robot_joint_position: self.robot_joint_position,
            external_joint_position: self.external_joint_position,
            reference_type: Default::default(),
        }
    }
}

impl RapidAction for AbsoluteJointMovement {
    fn validate(&self) -> Result<()> {
        self.joint_target().validate()?;
        self.speed.validate()?;
        self.zone.validate()?;
        if let Some(tool) = &self.tool {
            tool.validate()?;
        }
        check_optional_time("AbsoluteJointMovement", self.time)
    }

    fn to_rapid_declarations(&self, context: &CodeContext, warnings: &mut Vec<String>) -> Vec<Declaration> {
        let fk = ForwardKinematics::new(context.robot).calculate(&self.robot_joint_position, &self.external_joint_position);
        for error in fk.errors {
            warnings.push(format!("Action {} (MoveAbsJ {}): {}", context.index, self.name, error));
        }
        let mut declarations = Vec::new();
        if let Some(text) = self.speed.to_rapid_declaration() {
            declarations.push(Declaration::new(DeclarationKind::Speed, &self.speed.name, text));
        }
        if let Some(text) = self.zone.to_rapid_declaration() {
            declarations.push(Declaration::new(DeclarationKind::Zone, &self.zone.name, text));
        }
        declarations.push(Declaration::new(
            DeclarationKind::Target,
            &self.name,
            self.joint_target().to_rapid_declaration(),
        ));
        declarations
    }

    fn to_rapid_instruction(&self, context: &CodeContext) -> Option<String> {
        let tool = self.tool.as_ref().unwrap_or(context.tool);
        Some(format!(
            "MoveAbsJ {}, {}{}, {}, {};",
            self.name,
            self.speed.name,
            optional_argument("T", self.time),
            self.zone.name,
            tool.name
        ))
    }
}

/// Waits the given time in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaitTime {
    pub duration: f64,
}

impl WaitTime {
    pub fn new(duration: f64) -> Self {
        WaitTime { duration }
    }
}

impl RapidAction for WaitTime {
    fn validate(&self) -> Result<()> {
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(invalid("WaitTime", format!("duration {} is not a positive time", self.duration)));
        }
        Ok(())
    }

    fn to_rapid_instruction(&self, _context: &CodeContext) -> Option<String> {
        Some(format!("WaitTime {};", fmt_num(self.duration)))
    }
}

/// Waits for a digital input (`WaitDI`) or output (`WaitDO`) to get the value.
#[derive(Debug, Clone, PartialEq)]
pub struct WaitDigital {
    pub name: String,
    pub value: bool,
    /// Maximal waiting time in seconds, used when positive.
    pub max_time: f64,
}

impl WaitDigital {
    pub fn new(name: &str, value: bool) -> Self {
        WaitDigital { name: name.to_string(), value, max_time: -1.0 }
    }

    pub fn with_max_time(mut self, max_time: f64) -> Self {
        self.max_time = max_time;
        self
    }

    fn validate_as(&self, action: &str) -> Result<()> {
        validate_name(action, &self.name)?;
        check_optional_time(action, self.max_time)
    }

    fn instruction(&self, keyword: &str) -> String {
        format!(
            "{} {}, {}{};",
            keyword,
            self.name,
            fmt_signal(self.value),
            optional_argument("MaxTime", self.max_time)
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WaitDI(pub WaitDigital);

#[derive(Debug, Clone, PartialEq)]
pub struct WaitDO(pub WaitDigital);

impl WaitDI {
    pub fn new(name: &str, value: bool, max_time: f64) -> Self {
        WaitDI(WaitDigital::new(name, value).with_max_time(max_time))
    }
}

impl WaitDO {
    pub fn new(name: &str, value: bool, max_time: f64) -> Self {
        WaitDO(WaitDigital::new(name, value).with_max_time(max_time))
    }
}

impl RapidAction for WaitDI {
    fn validate(&self) -> Result<()> {
        self.0.validate_as("WaitDI")
    }

    fn to_rapid_instruction(&self, _context: &CodeContext) -> Option<String> {
        Some(self.0.instruction("WaitDI"))
    }
}

impl RapidAction for WaitDO {
    fn validate(&self) -> Result<()> {
        self.0.validate_as("WaitDO")
    }

    fn to_rapid_instruction(&self, _context: &CodeContext) -> Option<String> {
        Some(self.0.instruction("WaitDO"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inequality {
    LessThan,
    GreaterThan,
}

/// Waits until an analog input is less or greater than the value.
#[derive(Debug, Clone, PartialEq)]
pub struct WaitAI {
    pub name: String,
    pub value: f64,
    pub inequality: Inequality,
    pub max_time: f64,
}

impl WaitAI {
    pub fn new(name: &str, value: f64, inequality: Inequality) -> Self {
        WaitAI { name: name.to_string(), value, inequality, max_time: -1.0 }
    }

    pub fn with_max_time(mut self, max_time: f64) -> Self {
        self.max_time = max_time;
        self
    }
}

impl RapidAction for WaitAI {
    fn validate(&self) -> Result<()> {
        validate_name("WaitAI", &self.name)?;
        if !self.value.is_finite() {
            return Err(invalid("WaitAI", "value is not finite"));
        }
        check_optional_time("WaitAI", self.max_time)
    }

    fn to_rapid_instruction(&self, _context: &CodeContext) -> Option<String> {
        let switch = match self.inequality {
            Inequality::LessThan => "\\LT",
            Inequality::GreaterThan => "\\GT",
        };
        Some(format!(
            "WaitAI {}, {}, {}{};",
            self.name,
            switch,
            fmt_num(self.value),
            optional_argument("MaxTime", self.max_time)
        ))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetAnalogOutput {
    pub name: String,
    pub value: f64,
}

impl SetAnalogOutput {
    pub fn new(name: &str, value: f64) -> Self {
        SetAnalogOutput { name: name.to_string(), value }
    }
}

impl RapidAction for SetAnalogOutput {
    fn validate(&self) -> Result<()> {
        validate_name("SetAnalogOutput", &self.name)?;
        if !self.value.is_finite() {
            return Err(invalid("SetAnalogOutput", "value is not finite"));
        }
        Ok(())
    }

    fn to_rapid_instruction(&self, _context: &CodeContext) -> Option<String> {
        Some(format!("SetAO {}, {};", self.name, fmt_num(self.value)))
    }
}

fn sync_declarations(syncident: &Syncident, tasks: Option<&TaskList>) -> Vec<Declaration> {
    let mut declarations = vec![Declaration::new(
        DeclarationKind::Syncident,
        &syncident.name,
        syncident.to_rapid_declaration(),
    )];
    if let Some(tasks) = tasks {
        declarations.push(Declaration::new(DeclarationKind::Tasks, &tasks.name, tasks.to_rapid_declaration()));
    }
    declarations
}

/// Starts synchronized movements of the tasks.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncMoveOn {
    pub syncident: Syncident,
    pub task_list: TaskList,
}

impl SyncMoveOn {
    pub fn new(syncident: Syncident, task_list: TaskList) -> Self {
        SyncMoveOn { syncident, task_list }
    }
}

impl RapidAction for SyncMoveOn {
    fn validate(&self) -> Result<()> {
        self.syncident.validate()?;
        self.task_list.validate()
    }

    fn to_rapid_declarations(&self, _context: &CodeContext, _warnings: &mut Vec<String>) -> Vec<Declaration> {
        sync_declarations(&self.syncident, Some(&self.task_list))
    }

    fn to_rapid_instruction(&self, _context: &CodeContext) -> Option<String> {
        Some(format!("SyncMoveOn {}, {};", self.syncident.name, self.task_list.name))
    }
}

/// Ends synchronized movements.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncMoveOff {
    pub syncident: Syncident,
    /// Seconds, used when positive.
    pub timeout: f64,
}

impl SyncMoveOff {
    pub fn new(syncident: Syncident, timeout: f64) -> Self {
        SyncMoveOff { syncident, timeout }
    }
}

impl RapidAction for SyncMoveOff {
    fn validate(&self) -> Result<()> {
        self.syncident.validate()?;
        check_optional_time("SyncMoveOff", self.timeout)
    }

    fn to_rapid_declarations(&self, _context: &CodeContext, _warnings: &mut Vec<String>) -> Vec<Declaration> {
        sync_declarations(&self.syncident, None)
    }

    fn to_rapid_instruction(&self, _context: &CodeContext) -> Option<String> {
        Some(format!(
            "SyncMoveOff {}{};",
            self.syncident.name,
            optional_argument("TimeOut", self.timeout)
        ))
    }
}

/// Waits until all tasks of the list reach the synchronization point.
#[derive(Debug, Clone, PartialEq)]
pub struct WaitSyncTask {
    pub syncident: Syncident,
    pub task_list: TaskList,
    pub timeout: f64,
}

impl WaitSyncTask {
    pub fn new(syncident: Syncident, task_list: TaskList, timeout: f64) -> Self {
        WaitSyncTask { syncident, task_list, timeout }
    }
}

impl RapidAction for WaitSyncTask {
    fn validate(&self) -> Result<()> {
        self.syncident.validate()?;
        self.task_list.validate()?;
        check_optional_time("WaitSyncTask", self.timeout)
    }

    fn to_rapid_declarations(&self, _context: &CodeContext, _warnings: &mut Vec<String>) -> Vec<Declaration> {
        sync_declarations(&self.syncident, Some(&self.task_list))
    }

    fn to_rapid_instruction(&self, _context: &CodeContext) -> Option<String> {
        Some(format!(
            "WaitSyncTask {}, {}{};",
            self.syncident.name,
            self.task_list.name,
            optional_argument("TimeOut", self.timeout)
        ))
    }
}

/// Makes the following actions use this tool. Produces no code itself.
#[derive(Debug, Clone, PartialEq)]
pub struct OverrideRobotTool {
    pub tool: RobotTool,
}

impl OverrideRobotTool {
    pub fn new(tool: RobotTool) -> Self {
        OverrideRobotTool { tool }
    }
}

impl RapidAction for OverrideRobotTool {
    fn validate(&self) -> Result<()> {
        self.tool.validate()
    }
}

/// RAPID comment, one `!` line per text line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub text: String,
}

impl Comment {
    pub fn new(text: &str) -> Self {
        Comment { text: text.to_string() }
    }
}

impl RapidAction for Comment {
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    fn to_rapid_instruction(&self, _context: &CodeContext) -> Option<String> {
        let lines: Vec<String> = self.text.lines().map(|line| format!("! {}", line)).collect();
        if lines.is_empty() { Some("!".to_string()) } else { Some(lines.join("\n")) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeLineKind {
    Declaration,
    Instruction,
}

/// Code written as is, either among the declarations or the instructions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeLine {
    pub code: String,
    pub kind: CodeLineKind,
}

impl CodeLine {
    pub fn instruction(code: &str) -> Self {
        CodeLine { code: code.to_string(), kind: CodeLineKind::Instruction }
    }

    pub fn declaration(code: &str) -> Self {
        CodeLine { code: code.to_string(), kind: CodeLineKind::Declaration }
    }
}

impl RapidAction for CodeLine {
    fn validate(&self) -> Result<()> {
        if self.code.trim().is_empty() {
            return Err(invalid("CodeLine", "the code line is empty"));
        }
        Ok(())
    }

    fn to_rapid_declarations(&self, _context: &CodeContext, _warnings: &mut Vec<String>) -> Vec<Declaration> {
        match self.kind {
            CodeLineKind::Declaration => vec![Declaration::new(DeclarationKind::Custom, "", self.code.clone())],
            CodeLineKind::Instruction => Vec::new(),
        }
    }

    fn to_rapid_instruction(&self, _context: &CodeContext) -> Option<String> {
        match self.kind {
            CodeLineKind::Instruction => Some(self.code.clone()),
            CodeLineKind::Declaration => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::robot::Robot;

    fn context(robot: &Robot) -> CodeContext<'_> {
        CodeContext { robot, tool: robot.tool(), index: 0 }
    }

    #[test]
    fn test_wait_and_signal_instructions() {
        let robot = Robot::irb120();
        let ctx = context(&robot);
        assert_eq!(WaitDI::new("di1", true, 5.0).to_rapid_instruction(&ctx).unwrap(), "WaitDI di1, 1\\MaxTime:=5;");
        assert_eq!(WaitDO::new("do2", false, 0.0).to_rapid_instruction(&ctx).unwrap(), "WaitDO do2, 0;");
        assert_eq!(SetDigitalOutput::new("do1", true).to_rapid_instruction(&ctx).unwrap(), "SetDO do1, 1;");
        assert_eq!(WaitTime::new(1.5).to_rapid_instruction(&ctx).unwrap(), "WaitTime 1.5;");
        assert_eq!(SetAnalogOutput::new("ao1", 2.25).to_rapid_instruction(&ctx).unwrap(), "SetAO ao1, 2.25;");
        assert_eq!(
            WaitAI::new("ai1", 5.0, Inequality::GreaterThan).with_max_time(2.0).to_rapid_instruction(&ctx).unwrap(),
            "WaitAI ai1, \\GT, 5\\MaxTime:=2;"
        );
    }

    #[test]
    fn test_sync_instructions() {
        let robot = Robot::irb120();
        let ctx = context(&robot);
        let sync = Syncident::new("sync1").unwrap();
        let tasks = TaskList::new("all_tasks", &["T_ROB1", "T_ROB2"]).unwrap();
        assert_eq!(
            SyncMoveOn::new(sync.clone(), tasks.clone()).to_rapid_instruction(&ctx).unwrap(),
            "SyncMoveOn sync1, all_tasks;"
        );
        assert_eq!(SyncMoveOff::new(sync.clone(), 10.0).to_rapid_instruction(&ctx).unwrap(), "SyncMoveOff sync1\\TimeOut:=10;");
        assert_eq!(SyncMoveOff::new(sync.clone(), -1.0).to_rapid_instruction(&ctx).unwrap(), "SyncMoveOff sync1;");
        let wait = WaitSyncTask::new(sync, tasks, 0.0);
        assert_eq!(wait.to_rapid_instruction(&ctx).unwrap(), "WaitSyncTask sync1, all_tasks;");
        assert_eq!(wait.to_rapid_declarations(&ctx, &mut Vec::new()).len(), 2);
    }

    #[test]
    fn test_movement_instruction() {
        let robot = Robot::irb120();
        let ctx = context(&robot);
        let target = JointTarget::new("home", RobotJointPosition::default()).unwrap();
        let movement = Movement::new(
            MovementType::MoveL,
            Target::Joint(target),
            SpeedData::predefined("v100").unwrap(),
            ZoneData::predefined("z10").unwrap(),
        )
        .with_time(2.0)
        .with_sync_id(10);
        assert_eq!(
            movement.to_rapid_instruction(&ctx).unwrap(),
            "MoveL home\\ID:=10, v100\\T:=2, z10, tool0\\WObj:=wobj0;"
        );
        let with_output = movement.with_digital_output(SetDigitalOutput::new("do1", false));
        assert_eq!(
            with_output.to_rapid_instruction(&ctx).unwrap(),
            "MoveLDO home\\ID:=10, v100\\T:=2, z10, tool0\\WObj:=wobj0, do1, 0;"
        );
    }

    #[test]
    fn test_move_abs_j_with_output_sets_it_after() {
        let robot = Robot::irb120();
        let ctx = context(&robot);
        let target = JointTarget::new("home", RobotJointPosition::default()).unwrap();
        let movement = Movement::new(MovementType::MoveAbsJ, Target::Joint(target), SpeedData::default(), ZoneData::fine())
            .with_digital_output(SetDigitalOutput::new("do1", true));
        assert_eq!(
            movement.to_rapid_instruction(&ctx).unwrap(),
            "MoveAbsJ home, v200, fine, tool0\\WObj:=wobj0;\nSetDO do1, 1;"
        );
    }

    #[test]
    fn test_move_abs_j_out_of_reach_is_commented() {
        let robot = Robot::irb120();
        let ctx = context(&robot);
        let far = RobotTarget::new("far", nalgebra::Isometry3::translation(2000.0, 0.0, 500.0), 0).unwrap();
        let movement = Movement::new(MovementType::MoveAbsJ, Target::Robot(far), SpeedData::default(), ZoneData::fine())
            .with_digital_output(SetDigitalOutput::new("do1", true));
        let mut warnings = Vec::new();
        let declarations = movement.to_rapid_declarations(&ctx, &mut warnings);
        assert!(declarations.iter().all(|d| d.kind != DeclarationKind::Target));
        assert!(!warnings.is_empty());
        assert_eq!(
            movement.to_rapid_instruction(&ctx).unwrap(),
            "! MoveAbsJ far skipped, no joint values reach the target"
        );
    }

    #[test]
    fn test_move_l_to_joint_target_declares_robtarget() {
        let robot = Robot::irb120();
        let ctx = context(&robot);
        let target = JointTarget::new("p10", RobotJointPosition::new([0.0, 0.0, 0.0, 0.0, 30.0, 0.0])).unwrap();
        let movement = Movement::new(MovementType::MoveJ, Target::Joint(target), SpeedData::default(), ZoneData::fine());
        let mut warnings = Vec::new();
        let declarations = movement.to_rapid_declarations(&ctx, &mut warnings);
        assert!(warnings.is_empty(), "{:?}", warnings);
        assert_eq!(declarations.len(), 1);
        assert!(declarations[0].text.starts_with("VAR robtarget p10 := [["));
        assert!(declarations[0].text.ends_with("[0, 0, 0, 0], [9E9, 9E9, 9E9, 9E9, 9E9, 9E9]];"));
    }

    #[test]
    fn test_absolute_joint_movement() {
        let robot = Robot::irb120();
        let ctx = context(&robot);
        let movement = AbsoluteJointMovement::new(
            "start",
            RobotJointPosition::new([0.0, 0.0, 0.0, 0.0, 90.0, 0.0]),
            SpeedData::new("slow", 50.0, 100.0, 1000.0, 100.0).unwrap(),
            ZoneData::fine(),
        );
        assert_eq!(movement.to_rapid_instruction(&ctx).unwrap(), "MoveAbsJ start, slow, fine, tool0;");
        let mut warnings = Vec::new();
        let declarations = movement.to_rapid_declarations(&ctx, &mut warnings);
        assert_eq!(declarations.len(), 2);
        assert_eq!(declarations[1].text, "VAR jointtarget start := [[0, 0, 0, 0, 90, 0], [9E9, 9E9, 9E9, 9E9, 9E9, 9E9]];");
    }

    #[test]
    fn test_invalid_actions() {
        assert!(WaitTime::new(-1.0).validate().is_err());
        assert!(SetDigitalOutput::new("", true).validate().is_err());
        assert!(CodeLine::instruction("  ").validate().is_err());
        assert!(WaitDI::new("di 1", true, 0.0).validate().is_err());
    }

    #[test]
    fn test_comment_lines() {
        let robot = Robot::irb120();
        let ctx = context(&robot);
        assert_eq!(Comment::new("first\nsecond").to_rapid_instruction(&ctx).unwrap(), "! first\n! second");
    }
}
