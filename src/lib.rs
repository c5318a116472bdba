//! Kinematic model of six-axis ABB robots with external axes, forward and inverse kinematics,
//! and generation of RAPID program and system modules.
//!
//! # Features
//!
//! - The robot is described by the planes of its six axes at zero pose (origin is the joint
//!   center, normal is the rotation axis), the mounting frame and the tool. Presets for several
//!   ABB robots are included, other robots can be read from YAML.
//! - Up to six external axes (linear tracks, rotational positioners) can be attached. One of
//!   them may carry the robot, the others may carry work objects.
//! - Forward kinematics returns the TCP plane, the posed axis planes and optionally posed meshes.
//! - Inverse kinematics returns all eight configurations (shoulder, elbow and wrist flips) and
//!   marks unreachable and out-of-limit ones. Axis 4 and axis 6 are shifted by full turns to fit
//!   into the limits, in singular wrist positions axis 4 keeps its previous value.
//! - Every inverse kinematics solution is cross-checked with forward kinematics.
//! - The RAPID generator turns a list of actions (movements, waits, signals, synchronization)
//!   into a program module. Declarations are deduplicated by name, problems are reported as
//!   warnings and never stop the generation.
//!
//! Positions are in millimeters, angles in degrees in the public API, radians in the
//! [`kinematic_traits::Kinematics`] trait.

pub mod error;
pub mod geometry;
pub mod kinematic_traits;
pub mod rapid_format;

#[path = "utils/utils.rs"]
pub mod utils;

pub mod mesh;
pub mod tool;

pub mod external_axis;
pub mod joint_position;
pub mod work_object;

pub mod robot;
pub mod robot_presets;

#[cfg(feature = "allow_filesystem")]
pub mod robot_from_file;

pub mod forward_kinematics;
pub mod inverse_kinematics;

pub mod actions;
pub mod rapid_generator;

#[cfg(test)]
mod tests;
