//! Data that ends up as RAPID variable declarations: speed and zone data, targets,
//! synchronization identifiers and task lists.

use crate::error::{RobotError, Result};
use crate::geometry::Plane;
use crate::joint_position::{ExternalJointPosition, RobotJointPosition};
use crate::rapid_format::{fmt_bool, fmt_num, fmt_position, fmt_quaternion};

use super::validate_name;

/// Storage class of a RAPID data declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReferenceType {
    #[default]
    Var,
    Pers,
    Const,
}

impl ReferenceType {
    pub fn keyword(&self) -> &'static str {
        match self {
            ReferenceType::Var => "VAR",
            ReferenceType::Pers => "PERS",
            ReferenceType::Const => "CONST",
        }
    }
}

/// Speeds of the ABB predefined speed data v5 to v7000 (mm/s).
const PREDEFINED_SPEEDS: [f64; 25] = [
    5.0, 10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 80.0, 100.0, 150.0, 200.0, 300.0, 400.0, 500.0, 600.0,
    800.0, 1000.0, 1500.0, 2000.0, 2500.0, 3000.0, 4000.0, 5000.0, 6000.0, 7000.0,
];

#[derive(Debug, Clone, PartialEq)]
pub struct SpeedData {
    pub name: String,
    /// TCP speed, mm/s.
    pub v_tcp: f64,
    /// Reorientation speed, degrees/s.
    pub v_ori: f64,
    /// Linear external axes speed, mm/s.
    pub v_leax: f64,
    /// Rotational external axes speed, degrees/s.
    pub v_reax: f64,
    pub reference_type: ReferenceType,
    /// Predefined on the controller, never declared.
    pub predefined: bool,
}

impl SpeedData {
    pub fn new(name: &str, v_tcp: f64, v_ori: f64, v_leax: f64, v_reax: f64) -> Result<Self> {
        let speed = SpeedData {
            name: name.to_string(),
            v_tcp,
            v_ori,
            v_leax,
            v_reax,
            reference_type: ReferenceType::Var,
            predefined: false,
        };
        speed.validate()?;
        Ok(speed)
    }

    /// The predefined speed data with the given name (`v5` to `v7000`).
    pub fn predefined(name: &str) -> Option<Self> {
        let v_tcp: f64 = name.strip_prefix('v')?.parse().ok()?;
        if !PREDEFINED_SPEEDS.contains(&v_tcp) || name != format!("v{}", fmt_num(v_tcp)) {
            return None;
        }
        Some(SpeedData {
            name: name.to_string(),
            v_tcp,
            v_ori: 500.0,
            v_leax: 5000.0,
            v_reax: 1000.0,
            reference_type: ReferenceType::Var,
            predefined: true,
        })
    }

    /// Predefined speed data if the TCP speed matches one, otherwise custom data named after it.
    pub fn from_tcp_speed(v_tcp: f64) -> Result<Self> {
        let name = format!("v{}", fmt_num(v_tcp).replace(['.', '-'], "_"));
        match SpeedData::predefined(&name) {
            Some(speed) => Ok(speed),
            None => SpeedData::new(&name, v_tcp, 500.0, 5000.0, 1000.0),
        }
    }

    pub fn with_reference_type(mut self, reference_type: ReferenceType) -> Self {
        self.reference_type = reference_type;
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_name("SpeedData", &self.name)?;
        let values = [self.v_tcp, self.v_ori, self.v_leax, self.v_reax];
        if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(RobotError::InvalidAction {
                action: format!("SpeedData {}", self.name),
                reason: "speeds must be finite and not negative".to_string(),
            });
        }
        Ok(())
    }

    /// `VAR speeddata name := [v_tcp, v_ori, v_leax, v_reax];`, None for predefined data.
    pub fn to_rapid_declaration(&self) -> Option<String> {
        if self.predefined {
            return None;
        }
        Some(format!(
            "{} speeddata {} := [{}, {}, {}, {}];",
            self.reference_type.keyword(),
            self.name,
            fmt_num(self.v_tcp),
            fmt_num(self.v_ori),
            fmt_num(self.v_leax),
            fmt_num(self.v_reax)
        ))
    }
}

impl Default for SpeedData {
    fn default() -> Self {
        SpeedData {
            name: "v200".to_string(),
            v_tcp: 200.0,
            v_ori: 500.0,
            v_leax: 5000.0,
            v_reax: 1000.0,
            reference_type: ReferenceType::Var,
            predefined: true,
        }
    }
}

/// (name, pzone_tcp, pzone_ori, pzone_eax, zone_ori, zone_leax, zone_reax) of the ABB
/// predefined zones.
const PREDEFINED_ZONES: [(&str, [f64; 6]); 14] = [
    ("z0", [0.3, 0.3, 0.3, 0.03, 0.3, 0.03]),
    ("z1", [1.0, 1.0, 1.0, 0.1, 1.0, 0.1]),
    ("z5", [5.0, 8.0, 8.0, 0.8, 8.0, 0.8]),
    ("z10", [10.0, 15.0, 15.0, 1.5, 15.0, 1.5]),
    ("z15", [15.0, 23.0, 23.0, 2.3, 23.0, 2.3]),
    ("z20", [20.0, 30.0, 30.0, 3.0, 30.0, 3.0]),
    ("z30", [30.0, 45.0, 45.0, 4.5, 45.0, 4.5]),
    ("z40", [40.0, 60.0, 60.0, 6.0, 60.0, 6.0]),
    ("z50", [50.0, 75.0, 75.0, 7.5, 75.0, 7.5]),
    ("z60", [60.0, 90.0, 90.0, 9.0, 90.0, 9.0]),
    ("z80", [80.0, 120.0, 120.0, 12.0, 120.0, 12.0]),
    ("z100", [100.0, 150.0, 150.0, 15.0, 150.0, 15.0]),
    ("z150", [150.0, 225.0, 225.0, 23.0, 225.0, 23.0]),
    ("z200", [200.0, 300.0, 300.0, 30.0, 300.0, 30.0]),
];

#[derive(Debug, Clone, PartialEq)]
pub struct ZoneData {
    pub name: String,
    /// Stop point: the robot stops at the target.
    pub finep: bool,
    pub pzone_tcp: f64,
    pub pzone_ori: f64,
    pub pzone_eax: f64,
    pub zone_ori: f64,
    pub zone_leax: f64,
    pub zone_reax: f64,
    pub reference_type: ReferenceType,
    pub predefined: bool,
}

impl ZoneData {
    /// Fly-by zone with the orientation and external axes zones scaled from the TCP zone the
    /// way the predefined zones are.
    pub fn new(name: &str, pzone_tcp: f64) -> Result<Self> {
        let zone = ZoneData {
            name: name.to_string(),
            finep: false,
            pzone_tcp,
            pzone_ori: 1.5 * pzone_tcp,
            pzone_eax: 1.5 * pzone_tcp,
            zone_ori: 0.15 * pzone_tcp,
            zone_leax: 1.5 * pzone_tcp,
            zone_reax: 0.15 * pzone_tcp,
            reference_type: ReferenceType::Var,
            predefined: false,
        };
        zone.validate()?;
        Ok(zone)
    }

    /// Stop point `fine`.
    pub fn fine() -> Self {
        ZoneData {
            name: "fine".to_string(),
            finep: true,
            pzone_tcp: 0.0,
            pzone_ori: 0.0,
            pzone_eax: 0.0,
            zone_ori: 0.0,
            zone_leax: 0.0,
            zone_reax: 0.0,
            reference_type: ReferenceType::Var,
            predefined: true,
        }
    }

    /// The predefined zone data with the given name (`fine`, `z0` to `z200`).
    pub fn predefined(name: &str) -> Option<Self> {
        if name == "fine" {
            return Some(ZoneData::fine());
        }
        let (_, [tcp, ori, eax, zone_ori, leax, reax]) =
            PREDEFINED_ZONES.iter().find(|(zone, _)| *zone == name)?;
        Some(ZoneData {
            name: name.to_string(),
            finep: false,
            pzone_tcp: *tcp,
            pzone_ori: *ori,
            pzone_eax: *eax,
            zone_ori: *zone_ori,
            zone_leax: *leax,
            zone_reax: *reax,
            reference_type: ReferenceType::Var,
            predefined: true,
        })
    }

    /// Predefined zone if the TCP zone matches one, otherwise custom data named after it.
    /// Negative values give `fine`.
    pub fn from_precision(pzone_tcp: f64) -> Result<Self> {
        if pzone_tcp < 0.0 {
            return Ok(ZoneData::fine());
        }
        let name = format!("z{}", fmt_num(pzone_tcp).replace('.', "_"));
        match ZoneData::predefined(&name) {
            Some(zone) => Ok(zone),
            None => ZoneData::new(&name, pzone_tcp),
        }
    }

    pub fn with_reference_type(mut self, reference_type: ReferenceType) -> Self {
        self.reference_type = reference_type;
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_name("ZoneData", &self.name)?;
        let values = [
            self.pzone_tcp, self.pzone_ori, self.pzone_eax, self.zone_ori, self.zone_leax, self.zone_reax,
        ];
        if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(RobotError::InvalidAction {
                action: format!("ZoneData {}", self.name),
                reason: "zone sizes must be finite and not negative".to_string(),
            });
        }
        Ok(())
    }

    /// `VAR zonedata name := [finep, pzone_tcp, pzone_ori, pzone_eax, zone_ori, zone_leax, zone_reax];`
    pub fn to_rapid_declaration(&self) -> Option<String> {
        if self.predefined {
            return None;
        }
        Some(format!(
            "{} zonedata {} := [{}, {}, {}, {}, {}, {}, {}];",
            self.reference_type.keyword(),
            self.name,
            fmt_bool(self.finep),
            fmt_num(self.pzone_tcp),
            fmt_num(self.pzone_ori),
            fmt_num(self.pzone_eax),
            fmt_num(self.zone_ori),
            fmt_num(self.zone_leax),
            fmt_num(self.zone_reax)
        ))
    }
}

impl Default for ZoneData {
    fn default() -> Self {
        ZoneData::fine()
    }
}

/// Cartesian target: TCP plane relative to the work object the movement uses.
#[derive(Debug, Clone, PartialEq)]
pub struct RobotTarget {
    pub name: String,
    pub plane: Plane,
    /// Axis configuration 0 to 7, written as `cfx` and used to select the IK solution.
    pub axis_configuration: usize,
    pub external_joint_position: ExternalJointPosition,
    pub reference_type: ReferenceType,
}

impl RobotTarget {
    pub fn new(name: &str, plane: Plane, axis_configuration: usize) -> Result<Self> {
        let target = RobotTarget {
            name: name.to_string(),
            plane,
            axis_configuration,
            external_joint_position: ExternalJointPosition::undefined(),
            reference_type: ReferenceType::Var,
        };
        target.validate()?;
        Ok(target)
    }

    pub fn with_external_joint_position(mut self, external: ExternalJointPosition) -> Self {
        self.external_joint_position = external;
        self
    }

    pub fn with_reference_type(mut self, reference_type: ReferenceType) -> Self {
        self.reference_type = reference_type;
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_name("RobotTarget", &self.name)?;
        if self.axis_configuration > 7 {
            return Err(RobotError::InvalidAction {
                action: format!("RobotTarget {}", self.name),
                reason: format!("axis configuration {} is not in range 0 to 7", self.axis_configuration),
            });
        }
        Ok(())
    }

    /// Declaration with the given external axis values (the values of the target itself, or
    /// the ones completed by inverse kinematics).
    pub fn to_rapid_declaration_with(&self, external: &ExternalJointPosition) -> String {
        format!(
            "{} robtarget {} := [{}, {}, [0, 0, 0, {}], {}];",
            self.reference_type.keyword(),
            self.name,
            fmt_position(&self.plane.translation.vector),
            fmt_quaternion(&self.plane.rotation),
            self.axis_configuration,
            external.to_rapid()
        )
    }

    /// `VAR robtarget name := [[x, y, z], [q1, q2, q3, q4], [0, 0, 0, cfx], [e1, ..., e6]];`
    pub fn to_rapid_declaration(&self) -> String {
        self.to_rapid_declaration_with(&self.external_joint_position)
    }
}

/// Joint space target.
#[derive(Debug, Clone, PartialEq)]
pub struct JointTarget {
    pub name: String,
    pub robot_joint_position: RobotJointPosition,
    pub external_joint_position: ExternalJointPosition,
    pub reference_type: ReferenceType,
}

impl JointTarget {
    pub fn new(name: &str, robot_joint_position: RobotJointPosition) -> Result<Self> {
        let target = JointTarget {
            name: name.to_string(),
            robot_joint_position,
            external_joint_position: ExternalJointPosition::undefined(),
            reference_type: ReferenceType::Var,
        };
        target.validate()?;
        Ok(target)
    }

    pub fn with_external_joint_position(mut self, external: ExternalJointPosition) -> Self {
        self.external_joint_position = external;
        self
    }

    pub fn with_reference_type(mut self, reference_type: ReferenceType) -> Self {
        self.reference_type = reference_type;
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_name("JointTarget", &self.name)?;
        if self.robot_joint_position.0.iter().any(|v| !v.is_finite()) {
            return Err(RobotError::InvalidAction {
                action: format!("JointTarget {}", self.name),
                reason: "joint values must be finite".to_string(),
            });
        }
        Ok(())
    }

    /// `VAR jointtarget name := [[a1, ..., a6], [e1, ..., e6]];`
    pub fn to_rapid_declaration(&self) -> String {
        format!(
            "{} jointtarget {} := [{}, {}];",
            self.reference_type.keyword(),
            self.name,
            self.robot_joint_position.to_rapid(),
            self.external_joint_position.to_rapid()
        )
    }
}

/// Name of a synchronization point of several tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Syncident {
    pub name: String,
}

impl Syncident {
    pub fn new(name: &str) -> Result<Self> {
        let syncident = Syncident { name: name.to_string() };
        syncident.validate()?;
        Ok(syncident)
    }

    pub fn validate(&self) -> Result<()> {
        validate_name("Syncident", &self.name)
    }

    /// `VAR syncident name;`
    pub fn to_rapid_declaration(&self) -> String {
        format!("VAR syncident {};", self.name)
    }
}

/// Tasks taking part in synchronized movements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskList {
    pub name: String,
    pub tasks: Vec<String>,
}

impl TaskList {
    pub fn new(name: &str, tasks: &[&str]) -> Result<Self> {
        let list = TaskList {
            name: name.to_string(),
            tasks: tasks.iter().map(|t| t.to_string()).collect(),
        };
        list.validate()?;
        Ok(list)
    }

    pub fn validate(&self) -> Result<()> {
        validate_name("TaskList", &self.name)?;
        if self.tasks.is_empty() {
            return Err(RobotError::InvalidAction {
                action: format!("TaskList {}", self.name),
                reason: "the task list is empty".to_string(),
            });
        }
        for task in &self.tasks {
            validate_name("TaskList", task)?;
        }
        Ok(())
    }

    /// `PERS tasks name{2} := [["T_ROB1"], ["T_ROB2"]];`
    pub fn to_rapid_declaration(&self) -> String {
        let tasks: Vec<String> = self.tasks.iter().map(|t| format!("[\"{}\"]", t)).collect();
        format!("PERS tasks {}{{{}}} := [{}];", self.name, self.tasks.len(), tasks.join(", "))
    }
}
