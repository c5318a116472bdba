//! External (auxiliary) axes: linear tracks and rotational positioners.
//!
//! An external axis owns an attachment plane (where the robot or a work object couples to it)
//! and an axis plane (origin and normal of the translation or rotation). Posing is done on
//! demand for a given axis value; the axis never stores its current value.

use nalgebra::Isometry3;

use crate::error::{RobotError, Result};
use crate::geometry::{normal, rotation_about, translation_along, Interval, Plane};
use crate::mesh::Mesh;

/// Kind of motion of the external axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExternalAxisKind {
    /// Translation along the axis plane normal, values in millimeters.
    Linear,
    /// Rotation about the axis plane normal, values in degrees.
    Rotational,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExternalAxis {
    pub name: String,
    pub kind: ExternalAxisKind,
    pub attachment_plane: Plane,
    pub axis_plane: Plane,
    pub axis_limits: Interval,
    /// Logic number 0 to 5 (RAPID eax_a to eax_f). Assigned by the robot if not set.
    pub axis_number: Option<usize>,
    pub base_mesh: Mesh,
    pub link_mesh: Mesh,
    /// True if the axis relocates the robot base (track) instead of carrying a work object.
    pub moves_robot: bool,
}

impl ExternalAxis {
    /// Linear axis moving along the normal of the axis plane. By default, it carries the robot.
    pub fn linear(name: &str, attachment_plane: Plane, axis_plane: Plane, axis_limits: Interval) -> Result<Self> {
        let axis = ExternalAxis {
            name: name.to_string(),
            kind: ExternalAxisKind::Linear,
            attachment_plane,
            axis_plane,
            axis_limits,
            axis_number: None,
            base_mesh: Mesh::empty(),
            link_mesh: Mesh::empty(),
            moves_robot: true,
        };
        axis.validate()?;
        Ok(axis)
    }

    /// Rotational axis (positioner) turning about the normal of the axis plane. By default, it
    /// carries a work object and does not move the robot.
    pub fn rotational(name: &str, attachment_plane: Plane, axis_plane: Plane, axis_limits: Interval) -> Result<Self> {
        let axis = ExternalAxis {
            name: name.to_string(),
            kind: ExternalAxisKind::Rotational,
            attachment_plane,
            axis_plane,
            axis_limits,
            axis_number: None,
            base_mesh: Mesh::empty(),
            link_mesh: Mesh::empty(),
            moves_robot: false,
        };
        axis.validate()?;
        Ok(axis)
    }

    pub fn with_axis_number(mut self, axis_number: usize) -> Self {
        self.axis_number = Some(axis_number);
        self
    }

    pub fn with_moves_robot(mut self, moves_robot: bool) -> Self {
        self.moves_robot = moves_robot;
        self
    }

    pub fn with_meshes(mut self, base_mesh: Mesh, link_mesh: Mesh) -> Self {
        self.base_mesh = base_mesh;
        self.link_mesh = link_mesh;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(RobotError::InvalidExternalAxis("axis name is empty".to_string()));
        }
        if !self.axis_limits.is_valid() {
            return Err(RobotError::InvalidExternalAxis(format!(
                "axis {} has non-finite limits", self.name
            )));
        }
        if let Some(number) = self.axis_number {
            if number > 5 {
                return Err(RobotError::AxisNumberOutOfRange { name: self.name.clone(), number });
            }
        }
        if !self.base_mesh.is_valid() || !self.link_mesh.is_valid() {
            return Err(RobotError::InvalidExternalAxis(format!(
                "axis {} has malformed meshes", self.name
            )));
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// RAPID name of the external axis component (`eax_a` to `eax_f`), if the number is known.
    pub fn axis_logic(&self) -> Option<String> {
        self.axis_number.map(|n| format!("eax_{}", (b'a' + n as u8) as char))
    }

    pub fn in_limits(&self, value: f64) -> bool {
        self.axis_limits.includes(value)
    }

    /// Rigid motion of the axis link for the given value (mm or degrees).
    pub fn calculate_transformation(&self, value: f64) -> Isometry3<f64> {
        match self.kind {
            ExternalAxisKind::Linear => translation_along(&self.axis_plane, value),
            ExternalAxisKind::Rotational => rotation_about(&self.axis_plane, value.to_radians()),
        }
    }

    /// Attachment plane for the given axis value.
    pub fn calculate_position(&self, value: f64) -> Plane {
        self.calculate_transformation(value) * self.attachment_plane
    }

    /// Base mesh as is and link mesh moved for the given axis value.
    pub fn pose_meshes(&self, value: f64) -> Vec<Mesh> {
        vec![
            self.base_mesh.clone(),
            self.link_mesh.transformed(&self.calculate_transformation(value)),
        ]
    }

    /// Value of a linear axis that brings the attachment plane closest to the point, clamped
    /// to the axis limits. Rotational axes return the middle of their range.
    pub fn closest_value(&self, point: &nalgebra::Point3<f64>) -> f64 {
        match self.kind {
            ExternalAxisKind::Linear => {
                let direction = normal(&self.axis_plane).normalize();
                let along = (point.coords - self.attachment_plane.translation.vector).dot(&direction);
                self.axis_limits.clamp(along)
            }
            ExternalAxisKind::Rotational => self.axis_limits.clamp(0.0),
        }
    }

    /// Moves the whole axis (planes and meshes).
    pub fn transform(&mut self, xform: &Isometry3<f64>) {
        self.attachment_plane = xform * self.attachment_plane;
        self.axis_plane = xform * self.axis_plane;
        self.base_mesh.transform(xform);
        self.link_mesh.transform(xform);
    }
}
