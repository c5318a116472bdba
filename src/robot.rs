//! The robot: six internal axes, base placement, mounting frame, tool and external axes.
//!
//! Derived fields (kinematic constants, TCP plane and external axis lookup tables) are computed
//! by pure functions from the current fields. Every method that changes a structural field calls
//! the matching rebuild function before returning, so a `Robot` is always consistent.

use nalgebra::{Isometry3, Vector3};

use crate::error::{RobotError, Result};
use crate::external_axis::ExternalAxis;
use crate::geometry::{origin, Interval, Plane};
use crate::mesh::Mesh;
use crate::tool::RobotTool;

/// Number of link meshes: the base and six links. The tool mesh comes from the tool.
pub const LINK_MESHES: usize = 7;

/// Maximal number of external axes a robot can carry (eax_a to eax_f).
pub const MAX_EXTERNAL_AXES: usize = 6;

/// Constants derived from the internal axis planes in the robot base frame. The solver checks
/// the wrist center against `elbow_length`, it takes everything else from the axis planes.
/// `wrist_offset` and `axis4_offset_angle` only describe the geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KinematicConstants {
    /// Offset from the axis 5 origin to the axis 6 origin, components as (dz, dy, dx).
    pub wrist_offset: Vector3<f64>,
    /// Angle of the forearm (axis 3 to axis 5 origin) against the base XY plane, radians.
    pub axis4_offset_angle: f64,
    /// Distance from the axis 2 origin to the axis 3 origin.
    pub lower_arm_length: f64,
    /// Distance from the axis 3 origin to the axis 5 origin.
    pub upper_arm_length: f64,
    /// lower_arm_length + upper_arm_length
    pub elbow_length: f64,
}

impl KinematicConstants {
    /// Computes the constants from the axis planes (world space) and the base plane.
    pub fn compute(axis_planes: &[Plane; 6], base_plane: &Plane) -> Self {
        let local: [Plane; 6] = std::array::from_fn(|i| base_plane.inverse() * axis_planes[i]);
        let p = local.map(|plane| origin(&plane));

        let wrist = p[5] - p[4];
        let forearm = p[4] - p[2];
        let lower_arm_length = (p[2] - p[1]).norm();
        let upper_arm_length = forearm.norm();

        KinematicConstants {
            wrist_offset: Vector3::new(wrist.z, wrist.y, wrist.x),
            axis4_offset_angle: f64::atan2(forearm.z, forearm.x),
            lower_arm_length,
            upper_arm_length,
            elbow_length: lower_arm_length + upper_arm_length,
        }
    }

    /// Distance from the axis 2 origin beyond which no wrist center can be reached, plus the
    /// wrist offset.
    pub fn reach(&self) -> f64 {
        self.elbow_length + self.wrist_offset.norm()
    }
}

/// Limits and planes of the external axes, indexed by logic number.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExternalAxisTables {
    pub limits: [Option<Interval>; MAX_EXTERNAL_AXES],
    pub planes: [Option<Plane>; MAX_EXTERNAL_AXES],
    /// Index into the external axis list by logic number.
    pub index: [Option<usize>; MAX_EXTERNAL_AXES],
}

impl ExternalAxisTables {
    /// Validates the external axes, assigns logic numbers to the axes that have none (lowest
    /// free number first) and builds the lookup tables.
    pub fn build(axes: &mut [ExternalAxis]) -> Result<Self> {
        if axes.len() > MAX_EXTERNAL_AXES {
            return Err(RobotError::TooManyExternalAxes(axes.len()));
        }
        let moving = axes.iter().filter(|a| a.moves_robot).count();
        if moving > 1 {
            return Err(RobotError::MultipleRobotMovingAxes(moving));
        }

        let mut tables = ExternalAxisTables::default();
        for (i, axis) in axes.iter().enumerate() {
            axis.validate()?;
            if let Some(number) = axis.axis_number {
                if let Some(other) = tables.index[number] {
                    return Err(RobotError::DuplicateAxisNumber {
                        number,
                        first: axes[other].name.clone(),
                        second: axis.name.clone(),
                    });
                }
                tables.index[number] = Some(i);
            }
        }

        for i in 0..axes.len() {
            if axes[i].axis_number.is_none() {
                // There is always a free slot as there are at most 6 axes
                if let Some(free) = (0..MAX_EXTERNAL_AXES).find(|n| tables.index[*n].is_none()) {
                    axes[i].axis_number = Some(free);
                    tables.index[free] = Some(i);
                }
            }
        }

        for number in 0..MAX_EXTERNAL_AXES {
            if let Some(i) = tables.index[number] {
                tables.limits[number] = Some(axes[i].axis_limits);
                tables.planes[number] = Some(axes[i].axis_plane);
            }
        }
        Ok(tables)
    }
}

/// TCP plane of the robot at zero pose: the tool placed on the mounting frame.
pub fn compute_tool_plane(mounting_frame: &Plane, tool: &RobotTool) -> Plane {
    mounting_frame * tool.tcp_offset()
}

#[derive(Debug, Clone)]
pub struct Robot {
    name: String,
    meshes: Vec<Mesh>,
    internal_axis_planes: [Plane; 6],
    internal_axis_limits: [Interval; 6],
    base_plane: Plane,
    mounting_frame: Plane,
    tool: RobotTool,
    external_axes: Vec<ExternalAxis>,

    // Derived
    kinematics: KinematicConstants,
    tool_plane: Plane,
    external_tables: ExternalAxisTables,
}

impl Robot {
    /// Builds the robot. All planes are in world space. `meshes` must be empty or hold the base
    /// and six link meshes. The tool is copied.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: &str,
        meshes: Vec<Mesh>,
        internal_axis_planes: [Plane; 6],
        internal_axis_limits: [Interval; 6],
        base_plane: Plane,
        mounting_frame: Plane,
        tool: &RobotTool,
        external_axes: Vec<ExternalAxis>,
    ) -> Result<Self> {
        let meshes = Self::check_meshes(meshes)?;
        for (i, limit) in internal_axis_limits.iter().enumerate() {
            if !limit.is_valid() {
                return Err(RobotError::ParseError(format!("axis {} has non-finite limits", i + 1)));
            }
        }
        tool.validate()?;

        let mut robot = Robot {
            name: name.to_string(),
            meshes,
            internal_axis_planes,
            internal_axis_limits,
            base_plane,
            mounting_frame,
            tool: tool.clone(),
            external_axes,
            kinematics: KinematicConstants::compute(&internal_axis_planes, &base_plane),
            tool_plane: compute_tool_plane(&mounting_frame, tool),
            external_tables: ExternalAxisTables::default(),
        };
        robot.update_external_axes()?;
        Ok(robot)
    }

    /// Robot at the world origin with `tool0`, no meshes and no external axes.
    pub(crate) fn from_axes(
        name: &str,
        internal_axis_planes: [Plane; 6],
        internal_axis_limits: [Interval; 6],
        mounting_frame: Plane,
    ) -> Self {
        let base_plane = Isometry3::identity();
        let tool = RobotTool::tool0();
        Robot {
            name: name.to_string(),
            meshes: vec![Mesh::empty(); LINK_MESHES],
            internal_axis_planes,
            internal_axis_limits,
            base_plane,
            mounting_frame,
            kinematics: KinematicConstants::compute(&internal_axis_planes, &base_plane),
            tool_plane: compute_tool_plane(&mounting_frame, &tool),
            tool,
            external_axes: Vec::new(),
            external_tables: ExternalAxisTables::default(),
        }
    }

    fn check_meshes(meshes: Vec<Mesh>) -> Result<Vec<Mesh>> {
        match meshes.len() {
            0 => Ok(vec![Mesh::empty(); LINK_MESHES]),
            LINK_MESHES => Ok(meshes),
            found => Err(RobotError::InvalidLength { expected: LINK_MESHES, found }),
        }
    }

    /// Recomputes the kinematic constants from the axis planes and the base plane.
    /// Idempotent: unchanged planes give identical constants.
    pub fn update_kinematics(&mut self) {
        self.kinematics = KinematicConstants::compute(&self.internal_axis_planes, &self.base_plane);
    }

    /// Recomputes the TCP plane from the mounting frame and the tool.
    pub fn update_tool_plane(&mut self) {
        self.tool_plane = compute_tool_plane(&self.mounting_frame, &self.tool);
    }

    /// Validates the external axes and rebuilds the lookup tables by logic number.
    pub fn update_external_axes(&mut self) -> Result<()> {
        self.external_tables = ExternalAxisTables::build(&mut self.external_axes)?;
        Ok(())
    }

    pub fn set_internal_axis_planes(&mut self, planes: [Plane; 6]) {
        self.internal_axis_planes = planes;
        self.update_kinematics();
    }

    pub fn set_internal_axis_limits(&mut self, limits: [Interval; 6]) {
        self.internal_axis_limits = limits;
    }

    pub fn set_base_plane(&mut self, base_plane: Plane) {
        self.base_plane = base_plane;
        self.update_kinematics();
    }

    pub fn set_mounting_frame(&mut self, mounting_frame: Plane) {
        self.mounting_frame = mounting_frame;
        self.update_tool_plane();
    }

    /// Attaches a copy of the tool.
    pub fn set_tool(&mut self, tool: &RobotTool) -> Result<()> {
        tool.validate()?;
        self.tool = tool.clone();
        self.update_tool_plane();
        Ok(())
    }

    /// Replaces the external axes. On error, the robot keeps its previous external axes.
    pub fn set_external_axes(&mut self, mut external_axes: Vec<ExternalAxis>) -> Result<()> {
        let tables = ExternalAxisTables::build(&mut external_axes)?;
        self.external_axes = external_axes;
        self.external_tables = tables;
        Ok(())
    }

    /// Rigid transform of the robot geometry: base plane, axis planes, mounting frame, tool and
    /// meshes. Attached external axes are not transformed.
    pub fn transform(&mut self, xform: &Isometry3<f64>) {
        self.base_plane = xform * self.base_plane;
        self.mounting_frame = xform * self.mounting_frame;
        for plane in self.internal_axis_planes.iter_mut() {
            *plane = xform * *plane;
        }
        for mesh in self.meshes.iter_mut() {
            mesh.transform(xform);
        }
        self.tool.transform(xform);
        self.update_kinematics();
        self.update_tool_plane();
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    /// Base and link meshes (without the tool).
    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn internal_axis_planes(&self) -> &[Plane; 6] {
        &self.internal_axis_planes
    }

    pub fn internal_axis_limits(&self) -> &[Interval; 6] {
        &self.internal_axis_limits
    }

    pub fn base_plane(&self) -> &Plane {
        &self.base_plane
    }

    pub fn mounting_frame(&self) -> &Plane {
        &self.mounting_frame
    }

    pub fn tool(&self) -> &RobotTool {
        &self.tool
    }

    /// TCP plane (world space) at zero joint values.
    pub fn tool_plane(&self) -> &Plane {
        &self.tool_plane
    }

    pub fn kinematics(&self) -> &KinematicConstants {
        &self.kinematics
    }

    pub fn external_axes(&self) -> &[ExternalAxis] {
        &self.external_axes
    }

    pub fn external_axis_tables(&self) -> &ExternalAxisTables {
        &self.external_tables
    }

    /// Axis planes in the robot base frame.
    pub fn local_axis_planes(&self) -> [Plane; 6] {
        std::array::from_fn(|i| self.base_plane.inverse() * self.internal_axis_planes[i])
    }

    /// Mounting frame in the robot base frame.
    pub fn local_mounting_frame(&self) -> Plane {
        self.base_plane.inverse() * self.mounting_frame
    }

    pub fn external_axis_by_number(&self, number: usize) -> Option<&ExternalAxis> {
        self.external_tables
            .index
            .get(number)
            .copied()
            .flatten()
            .map(|i| &self.external_axes[i])
    }

    pub fn external_axis_limit(&self, number: usize) -> Option<Interval> {
        self.external_tables.limits.get(number).copied().flatten()
    }

    pub fn external_axis_plane(&self, number: usize) -> Option<Plane> {
        self.external_tables.planes.get(number).copied().flatten()
    }

    /// The external axis that carries the robot, if any.
    pub fn robot_moving_axis(&self) -> Option<&ExternalAxis> {
        self.external_axes.iter().find(|a| a.moves_robot)
    }
}
