//! Errors raised while building the robot model, doing joint arithmetic or reading descriptions.
//! Unreachable inverse kinematics targets and generator warnings are not errors, they are
//! reported in the results.

use std::io;
use thiserror::Error;

/// Unified error of the robot model and the RAPID tooling.
#[derive(Error, Debug)]
pub enum RobotError {
    /// More than six external axes were attached to the robot.
    #[error("At maximum 6 external axes can be attached to a robot, got {0}")]
    TooManyExternalAxes(usize),

    /// More than one attached external axis relocates the robot base.
    #[error("Only one external axis can move the robot, found {0}")]
    MultipleRobotMovingAxes(usize),

    /// Two external axes share the same logic number.
    #[error("External axis logic number {number} is used by both {first} and {second}")]
    DuplicateAxisNumber {
        number: usize,
        first: String,
        second: String,
    },

    /// External axis logic numbers must be in range 0..=5 (axis letters A to F).
    #[error("External axis {name} has logic number {number}, allowed range is 0 to 5")]
    AxisNumberOutOfRange { name: String, number: usize },

    #[error("Invalid tool: {0}")]
    InvalidTool(String),

    #[error("Invalid external axis: {0}")]
    InvalidExternalAxis(String),

    /// Action rejected by its validity predicate.
    #[error("Invalid action {action}: {reason}")]
    InvalidAction { action: String, reason: String },

    #[error("Invalid length: expected {expected}, found {found}")]
    InvalidLength { expected: usize, found: usize },

    #[error("Division by zero")]
    DivideByZero,

    /// One operand has a defined external axis value where the other has 9E9.
    #[error("External joint positions do not match at axis {axis}: one value is undefined (9E9)")]
    ExternalAxisMismatch { axis: usize },

    #[error("IO Error: {0}")]
    Io(#[from] io::Error),

    #[error("Parse Error: {0}")]
    ParseError(String),

    #[error("Missing Field: {0}")]
    MissingField(String),
}

pub type Result<T> = std::result::Result<T, RobotError>;
