//! Robot actions that can be turned into RAPID code.
//!
//! Every action implements [`RapidAction`]: a validity check, the declarations it needs and the
//! instruction it performs. [`Action`] is the closed set of actions a program is made of.

pub mod declarations;
pub mod instructions;

use crate::error::{RobotError, Result};
use crate::robot::Robot;
use crate::tool::RobotTool;

pub use declarations::{JointTarget, ReferenceType, RobotTarget, SpeedData, Syncident, TaskList, ZoneData};
pub use instructions::{
    AbsoluteJointMovement, CodeLine, CodeLineKind, Comment, Inequality, Movement, MovementType, OverrideRobotTool,
    SetAnalogOutput, SetDigitalOutput, SyncMoveOff, SyncMoveOn, Target, WaitAI, WaitDI, WaitDO, WaitDigital,
    WaitSyncTask, WaitTime,
};

/// Longest identifier RAPID accepts.
pub const MAX_NAME_LENGTH: usize = 32;

/// Checks that the name is a RAPID identifier: a letter followed by letters, digits or
/// underscores, at most 32 characters.
pub fn validate_name(action: &str, name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        Some("the name is empty".to_string())
    } else if name.len() > MAX_NAME_LENGTH {
        Some(format!("the name '{}' is longer than {} characters", name, MAX_NAME_LENGTH))
    } else if !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
        Some(format!("the name '{}' must start with a letter", name))
    } else if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Some(format!("the name '{}' contains characters other than letters, digits and '_'", name))
    } else {
        None
    };
    match reason {
        Some(reason) => Err(RobotError::InvalidAction { action: action.to_string(), reason }),
        None => Ok(()),
    }
}

/// The table a declaration is deduplicated in. The order of the variants is the order of the
/// declaration blocks in the program module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DeclarationKind {
    Tasks,
    Syncident,
    Speed,
    Zone,
    Target,
    /// Code lines given as is, never deduplicated.
    Custom,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub kind: DeclarationKind,
    /// Declared RAPID name, the deduplication key.
    pub name: String,
    pub text: String,
}

impl Declaration {
    pub fn new(kind: DeclarationKind, name: &str, text: String) -> Self {
        Declaration { kind, name: name.to_string(), text }
    }

    /// RAPID data type, the word after `VAR`, `PERS` or `CONST`.
    pub fn data_type(&self) -> Option<&str> {
        self.text.split_whitespace().nth(1)
    }
}

/// What the action sees of the generator: the robot, the tool currently in use and its own
/// position in the program (for messages).
#[derive(Debug, Clone, Copy)]
pub struct CodeContext<'a> {
    pub robot: &'a Robot,
    pub tool: &'a RobotTool,
    pub index: usize,
}

pub trait RapidAction {
    fn validate(&self) -> Result<()>;

    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Declarations the action needs. Problems that do not prevent code generation (like an
    /// unreachable target) are added to `warnings`.
    fn to_rapid_declarations(&self, _context: &CodeContext, _warnings: &mut Vec<String>) -> Vec<Declaration> {
        Vec::new()
    }

    /// Instruction text (possibly several lines), None for actions that only declare data.
    fn to_rapid_instruction(&self, _context: &CodeContext) -> Option<String> {
        None
    }
}

macro_rules! declaration_action {
    ($type:ident, $kind:expr, $text:expr) => {
        impl RapidAction for $type {
            fn validate(&self) -> Result<()> {
                $type::validate(self)
            }

            fn to_rapid_declarations(&self, _context: &CodeContext, _warnings: &mut Vec<String>) -> Vec<Declaration> {
                let text: Option<String> = $text(self);
                text.into_iter()
                    .map(|text| Declaration::new($kind, &self.name, text))
                    .collect()
            }
        }
    };
}

// Predefined speed and zone data have no declaration
declaration_action!(SpeedData, DeclarationKind::Speed, SpeedData::to_rapid_declaration);
declaration_action!(ZoneData, DeclarationKind::Zone, ZoneData::to_rapid_declaration);
declaration_action!(RobotTarget, DeclarationKind::Target, |t: &RobotTarget| Some(t.to_rapid_declaration()));
declaration_action!(JointTarget, DeclarationKind::Target, |t: &JointTarget| Some(t.to_rapid_declaration()));
declaration_action!(Syncident, DeclarationKind::Syncident, |s: &Syncident| Some(s.to_rapid_declaration()));
declaration_action!(TaskList, DeclarationKind::Tasks, |t: &TaskList| Some(t.to_rapid_declaration()));

/// One step of a robot program.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SpeedData(SpeedData),
    ZoneData(ZoneData),
    RobotTarget(RobotTarget),
    JointTarget(JointTarget),
    Syncident(Syncident),
    TaskList(TaskList),
    Movement(Movement),
    AbsoluteJointMovement(AbsoluteJointMovement),
    WaitTime(WaitTime),
    WaitDI(WaitDI),
    WaitDO(WaitDO),
    WaitAI(WaitAI),
    SetDigitalOutput(SetDigitalOutput),
    SetAnalogOutput(SetAnalogOutput),
    SyncMoveOn(SyncMoveOn),
    SyncMoveOff(SyncMoveOff),
    WaitSyncTask(WaitSyncTask),
    OverrideRobotTool(OverrideRobotTool),
    Comment(Comment),
    CodeLine(CodeLine),
}

impl Action {
    fn inner(&self) -> &dyn RapidAction {
        match self {
            Action::SpeedData(a) => a,
            Action::ZoneData(a) => a,
            Action::RobotTarget(a) => a,
            Action::JointTarget(a) => a,
            Action::Syncident(a) => a,
            Action::TaskList(a) => a,
            Action::Movement(a) => a,
            Action::AbsoluteJointMovement(a) => a,
            Action::WaitTime(a) => a,
            Action::WaitDI(a) => a,
            Action::WaitDO(a) => a,
            Action::WaitAI(a) => a,
            Action::SetDigitalOutput(a) => a,
            Action::SetAnalogOutput(a) => a,
            Action::SyncMoveOn(a) => a,
            Action::SyncMoveOff(a) => a,
            Action::WaitSyncTask(a) => a,
            Action::OverrideRobotTool(a) => a,
            Action::Comment(a) => a,
            Action::CodeLine(a) => a,
        }
    }

    /// Name of the action kind, for messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Action::SpeedData(_) => "SpeedData",
            Action::ZoneData(_) => "ZoneData",
            Action::RobotTarget(_) => "RobotTarget",
            Action::JointTarget(_) => "JointTarget",
            Action::Syncident(_) => "Syncident",
            Action::TaskList(_) => "TaskList",
            Action::Movement(_) => "Movement",
            Action::AbsoluteJointMovement(_) => "AbsoluteJointMovement",
            Action::WaitTime(_) => "WaitTime",
            Action::WaitDI(_) => "WaitDI",
            Action::WaitDO(_) => "WaitDO",
            Action::WaitAI(_) => "WaitAI",
            Action::SetDigitalOutput(_) => "SetDigitalOutput",
            Action::SetAnalogOutput(_) => "SetAnalogOutput",
            Action::SyncMoveOn(_) => "SyncMoveOn",
            Action::SyncMoveOff(_) => "SyncMoveOff",
            Action::WaitSyncTask(_) => "WaitSyncTask",
            Action::OverrideRobotTool(_) => "OverrideRobotTool",
            Action::Comment(_) => "Comment",
            Action::CodeLine(_) => "CodeLine",
        }
    }
}

impl RapidAction for Action {
    fn validate(&self) -> Result<()> {
        self.inner().validate()
    }

    fn to_rapid_declarations(&self, context: &CodeContext, warnings: &mut Vec<String>) -> Vec<Declaration> {
        self.inner().to_rapid_declarations(context, warnings)
    }

    fn to_rapid_instruction(&self, context: &CodeContext) -> Option<String> {
        self.inner().to_rapid_instruction(context)
    }
}

macro_rules! action_from {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for Action {
                fn from(action: $variant) -> Self {
                    Action::$variant(action)
                }
            }
        )*
    };
}

action_from!(
    SpeedData, ZoneData, RobotTarget, JointTarget, Syncident, TaskList, Movement, AbsoluteJointMovement,
    WaitTime, WaitDI, WaitDO, WaitAI, SetDigitalOutput, SetAnalogOutput, SyncMoveOn, SyncMoveOff,
    WaitSyncTask, OverrideRobotTool, Comment, CodeLine
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rapid_names() {
        assert!(validate_name("t", "p10").is_ok());
        assert!(validate_name("t", "target_1").is_ok());
        assert!(validate_name("t", "").is_err());
        assert!(validate_name("t", "1st").is_err());
        assert!(validate_name("t", "with space").is_err());
        assert!(validate_name("t", &"x".repeat(33)).is_err());
    }

    #[test]
    fn test_action_dispatch() {
        let robot = Robot::irb120();
        let context = CodeContext { robot: &robot, tool: robot.tool(), index: 3 };
        let action: Action = SetDigitalOutput::new("do1", true).into();
        assert_eq!(action.kind(), "SetDigitalOutput");
        assert_eq!(action.to_rapid_instruction(&context).unwrap(), "SetDO do1, 1;");
        assert!(action.to_rapid_declarations(&context, &mut Vec::new()).is_empty());

        let speed: Action = SpeedData::new("fast", 2200.0, 500.0, 5000.0, 1000.0).unwrap().into();
        let declarations = speed.to_rapid_declarations(&context, &mut Vec::new());
        assert_eq!(declarations[0].kind, DeclarationKind::Speed);
        assert_eq!(declarations[0].name, "fast");
        assert!(speed.to_rapid_instruction(&context).is_none());
        assert_eq!(declarations[0].data_type(), Some("speeddata"));
    }
}
