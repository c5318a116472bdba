//! Supports reading the robot description from a YAML file (optional)

use std::path::Path;

use nalgebra::{Isometry3, Point3, Vector3};
use yaml_rust2::{Yaml, YamlLoader};

use crate::error::{RobotError, Result};
use crate::geometry::{plane_from_axes, plane_from_normal, Interval, Plane};
use crate::mesh::{load_mesh_from_stl, Mesh};
use crate::robot::Robot;
use crate::tool::RobotTool;

fn field<'a>(node: &'a Yaml, name: &str, context: &str) -> Result<&'a Yaml> {
    match &node[name] {
        Yaml::BadValue | Yaml::Null => Err(RobotError::MissingField(format!("{}{}", context, name))),
        value => Ok(value),
    }
}

fn optional<'a>(node: &'a Yaml, name: &str) -> Option<&'a Yaml> {
    match &node[name] {
        Yaml::BadValue | Yaml::Null => None,
        value => Some(value),
    }
}

/// YAML integers and reals both count as numbers.
fn number(value: &Yaml, what: &str) -> Result<f64> {
    let parsed = match value {
        Yaml::Real(_) => value.as_f64(),
        Yaml::Integer(i) => Some(*i as f64),
        _ => None,
    };
    match parsed {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(RobotError::ParseError(format!("{} must be a finite number, got {:?}", what, value))),
    }
}

fn numbers<const N: usize>(value: &Yaml, what: &str) -> Result<[f64; N]> {
    let items = value
        .as_vec()
        .ok_or_else(|| RobotError::ParseError(format!("{} must be a list of {} numbers", what, N)))?;
    if items.len() != N {
        return Err(RobotError::ParseError(format!(
            "{} must have {} elements, found {}",
            what,
            N,
            items.len()
        )));
    }
    let mut result = [0.0; N];
    for (i, item) in items.iter().enumerate() {
        result[i] = number(item, &format!("{}[{}]", what, i))?;
    }
    Ok(result)
}

fn vector(value: &Yaml, what: &str) -> Result<Vector3<f64>> {
    let [x, y, z] = numbers::<3>(value, what)?;
    Ok(Vector3::new(x, y, z))
}

fn string<'a>(value: &'a Yaml, what: &str) -> Result<&'a str> {
    value
        .as_str()
        .ok_or_else(|| RobotError::ParseError(format!("{} must be a string", what)))
}

/// `{ origin, x_axis, y_axis }`, the axes default to the world X and Y.
fn frame(node: &Yaml, context: &str) -> Result<Plane> {
    let origin = vector(field(node, "origin", context)?, &format!("{}origin", context))?;
    let x_axis = match optional(node, "x_axis") {
        Some(v) => vector(v, &format!("{}x_axis", context))?,
        None => Vector3::x(),
    };
    let y_axis = match optional(node, "y_axis") {
        Some(v) => vector(v, &format!("{}y_axis", context))?,
        None => Vector3::y(),
    };
    if x_axis.cross(&y_axis).norm() < 1e-9 {
        return Err(RobotError::ParseError(format!("{}x_axis and y_axis are parallel", context)));
    }
    Ok(plane_from_axes(Point3::from(origin), x_axis, y_axis))
}

fn axis(node: &Yaml, index: usize) -> Result<(Plane, Interval)> {
    let context = format!("axes[{}].", index);
    let origin = vector(field(node, "origin", &context)?, &format!("{}origin", context))?;
    let normal = vector(field(node, "normal", &context)?, &format!("{}normal", context))?;
    if normal.norm() < 1e-9 {
        return Err(RobotError::ParseError(format!("{}normal is zero", context)));
    }
    let [min, max] = numbers::<2>(field(node, "limits", &context)?, &format!("{}limits", context))?;
    Ok((plane_from_normal(Point3::from(origin), normal), Interval::new(min, max)))
}

fn tool(node: &Yaml, directory: &Path) -> Result<RobotTool> {
    let context = "tool.";
    let name = string(field(node, "name", context)?, "tool.name")?;
    let tcp = match optional(node, "tcp") {
        Some(v) => vector(v, "tool.tcp")?,
        None => Vector3::zeros(),
    };
    let mass = match optional(node, "mass") {
        Some(v) => number(v, "tool.mass")?,
        None => RobotTool::tool0().mass,
    };
    let mesh = match optional(node, "mesh") {
        Some(v) => load_mesh_from_stl(directory.join(string(v, "tool.mesh")?))?,
        None => Mesh::empty(),
    };
    RobotTool::new(name, mesh, Isometry3::identity(), Isometry3::translation(tcp.x, tcp.y, tcp.z), mass)
}

impl Robot {
    /// Read the robot description from YAML file. YAML file like this is supported:
    /// ```yaml
    /// name: IRB120
    /// base_plane: { origin: [0, 0, 0] }
    /// axes:
    ///   - { origin: [0, 0, 0],     normal: [0, 0, 1], limits: [-165, 165] }
    ///   - { origin: [0, 0, 290],   normal: [0, 1, 0], limits: [-110, 110] }
    ///   - { origin: [0, 0, 560],   normal: [0, 1, 0], limits: [-110, 70] }
    ///   - { origin: [302, 0, 630], normal: [1, 0, 0], limits: [-160, 160] }
    ///   - { origin: [302, 0, 630], normal: [0, 1, 0], limits: [-120, 120] }
    ///   - { origin: [374, 0, 630], normal: [1, 0, 0], limits: [-400, 400] }
    /// mounting_frame: { origin: [374, 0, 630], x_axis: [0, 0, -1], y_axis: [0, 1, 0] }
    /// tool: { name: tool0, tcp: [0, 0, 0], mass: 0.001 }
    /// ```
    /// Positions are in millimeters, limits in degrees. `base_plane` and `tool` are optional,
    /// frame axes default to the world X and Y. An optional `meshes` list names the seven STL
    /// files of the base and the links, relative to the YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let directory = path.parent().unwrap_or_else(|| Path::new("."));
        Robot::from_yaml_str(&contents, directory)
    }

    /// Parses the robot description. Mesh files are looked up relative to `directory`.
    pub fn from_yaml_str(contents: &str, directory: &Path) -> Result<Self> {
        let docs = YamlLoader::load_from_str(contents).map_err(|e| RobotError::ParseError(e.to_string()))?;
        let doc = docs
            .first()
            .ok_or_else(|| RobotError::ParseError("the YAML document is empty".to_string()))?;

        let name = string(field(doc, "name", "")?, "name")?;

        let base_plane = match optional(doc, "base_plane") {
            Some(node) => frame(node, "base_plane.")?,
            None => Isometry3::identity(),
        };

        let axes = field(doc, "axes", "")?
            .as_vec()
            .ok_or_else(|| RobotError::ParseError("axes must be a list".to_string()))?;
        if axes.len() != 6 {
            return Err(RobotError::InvalidLength { expected: 6, found: axes.len() });
        }
        let mut planes = [Isometry3::identity(); 6];
        let mut limits = [Interval::new(0.0, 0.0); 6];
        for (i, node) in axes.iter().enumerate() {
            (planes[i], limits[i]) = axis(node, i)?;
        }

        let mounting_frame = frame(field(doc, "mounting_frame", "")?, "mounting_frame.")?;

        let tool = match optional(doc, "tool") {
            Some(node) => tool(node, directory)?,
            None => RobotTool::tool0(),
        };

        let meshes = match optional(doc, "meshes") {
            Some(node) => node
                .as_vec()
                .ok_or_else(|| RobotError::ParseError("meshes must be a list of file names".to_string()))?
                .iter()
                .map(|file| load_mesh_from_stl(directory.join(string(file, "meshes[]")?)))
                .collect::<Result<Vec<Mesh>>>()?,
            None => Vec::new(),
        };

        tracing::debug!("Loaded robot {} with tool {}", name, tool.name);
        Robot::new(name, meshes, planes, limits, base_plane, mounting_frame, &tool, Vec::new())
    }
}
