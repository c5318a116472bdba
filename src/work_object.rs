//! Work objects: the coordinate systems robot targets are expressed in.

use nalgebra::Isometry3;

use crate::error::{RobotError, Result};
use crate::external_axis::{ExternalAxis, ExternalAxisKind};
use crate::geometry::Plane;
use crate::rapid_format::{fmt_bool, fmt_pose};

#[derive(Debug, Clone, PartialEq)]
pub struct WorkObject {
    pub name: String,
    /// User frame in world coordinates.
    pub user_frame: Plane,
    /// Object frame relative to the user frame.
    pub object_frame: Plane,
    /// Rotational positioner carrying this work object, if any.
    pub external_axis: Option<ExternalAxis>,
    /// True if the work object is held by the robot (stationary tool setups).
    pub robot_hold: bool,
}

impl WorkObject {
    pub fn new(name: &str, user_frame: Plane) -> Result<Self> {
        let wobj = WorkObject {
            name: name.to_string(),
            user_frame,
            object_frame: Isometry3::identity(),
            external_axis: None,
            robot_hold: false,
        };
        wobj.validate()?;
        Ok(wobj)
    }

    /// The predefined `wobj0` that coincides with the world frame.
    pub fn wobj0() -> Self {
        WorkObject {
            name: "wobj0".to_string(),
            user_frame: Isometry3::identity(),
            object_frame: Isometry3::identity(),
            external_axis: None,
            robot_hold: false,
        }
    }

    /// Couples the work object to a rotational external axis.
    pub fn with_external_axis(mut self, axis: ExternalAxis) -> Result<Self> {
        if axis.kind != ExternalAxisKind::Rotational || axis.moves_robot {
            return Err(RobotError::InvalidExternalAxis(format!(
                "work object {} can only be coupled to a rotational positioner, not {}",
                self.name, axis.name
            )));
        }
        self.external_axis = Some(axis);
        Ok(self)
    }

    pub fn with_object_frame(mut self, object_frame: Plane) -> Self {
        self.object_frame = object_frame;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() || self.name.contains(char::is_whitespace) {
            return Err(RobotError::InvalidAction {
                action: "WorkObject".to_string(),
                reason: format!("invalid work object name '{}'", self.name),
            });
        }
        Ok(())
    }

    /// World frame of the work object, with the positioner (if any) turned to `axis_value`.
    pub fn global_frame(&self, axis_value: Option<f64>) -> Plane {
        let frame = self.user_frame * self.object_frame;
        match (&self.external_axis, axis_value) {
            (Some(axis), Some(value)) => axis.calculate_transformation(value) * frame,
            _ => frame,
        }
    }

    /// User frame as written in the wobjdata: relative to the attachment plane of the
    /// coupled positioner, or world if not coupled.
    fn rapid_user_frame(&self) -> Plane {
        match &self.external_axis {
            Some(axis) => axis.attachment_plane.inverse() * self.user_frame,
            None => self.user_frame,
        }
    }

    /// `PERS wobjdata name := [robhold, ufprog, ufmec, uframe, oframe];`
    pub fn to_rapid_declaration(&self) -> String {
        let (ufprog, ufmec) = match &self.external_axis {
            Some(axis) => (false, axis.name.as_str()),
            None => (true, ""),
        };
        format!(
            "PERS wobjdata {} := [{}, {}, \"{}\", {}, {}];",
            self.name,
            fmt_bool(self.robot_hold),
            fmt_bool(ufprog),
            ufmec,
            fmt_pose(&self.rapid_user_frame()),
            fmt_pose(&self.object_frame)
        )
    }
}

impl Default for WorkObject {
    fn default() -> Self {
        WorkObject::wobj0()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{origin, plane_from_normal, Interval};
    use nalgebra::{Point3, Vector3};

    #[test]
    fn test_wobj0_declaration() {
        assert_eq!(
            WorkObject::wobj0().to_rapid_declaration(),
            "PERS wobjdata wobj0 := [FALSE, TRUE, \"\", [[0, 0, 0], [1, 0, 0, 0]], [[0, 0, 0], [1, 0, 0, 0]]];"
        );
    }

    #[test]
    fn test_coupled_work_object() {
        let positioner = ExternalAxis::rotational(
            "STN1",
            Isometry3::translation(1000.0, 0.0, 500.0),
            plane_from_normal(Point3::new(1000.0, 0.0, 0.0), Vector3::z()),
            Interval::new(-180.0, 180.0),
        ).unwrap();
        let wobj = WorkObject::new("table", Isometry3::translation(1100.0, 0.0, 500.0))
            .unwrap()
            .with_external_axis(positioner)
            .unwrap();
        assert_eq!(
            wobj.to_rapid_declaration(),
            "PERS wobjdata table := [FALSE, FALSE, \"STN1\", [[100, 0, 0], [1, 0, 0, 0]], [[0, 0, 0], [1, 0, 0, 0]]];"
        );
        let turned = wobj.global_frame(Some(180.0));
        assert!((origin(&turned) - Point3::new(900.0, 0.0, 500.0)).norm() < 1e-9);
    }

    #[test]
    fn test_linear_axis_cannot_carry_work_object() {
        let track = ExternalAxis::linear(
            "track",
            Isometry3::identity(),
            plane_from_normal(Point3::origin(), Vector3::x()),
            Interval::new(0.0, 1000.0),
        ).unwrap();
        assert!(WorkObject::wobj0().with_external_axis(track).is_err());
    }
}
