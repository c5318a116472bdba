//! Hardcoded kinematic models of a few ABB robots, placed at the world origin with `tool0`.
//!
//! Axis planes follow the ABB convention at zero pose: axis 1 turns about +Z, axes 2, 3 and 5
//! about +Y, axes 4 and 6 about +X. The mounting frame has its Z axis along world X and its
//! X axis pointing down.

use nalgebra::{Point3, Vector3};

use crate::geometry::{plane_from_axes, plane_from_normal, Interval, Plane};
use crate::robot::Robot;

fn abb_axis_planes(origins: [[f64; 3]; 6]) -> [Plane; 6] {
    let normals = [
        Vector3::z(),
        Vector3::y(),
        Vector3::y(),
        Vector3::x(),
        Vector3::y(),
        Vector3::x(),
    ];
    std::array::from_fn(|i| {
        let [x, y, z] = origins[i];
        plane_from_normal(Point3::new(x, y, z), normals[i])
    })
}

fn abb_mounting_frame(flange: [f64; 3]) -> Plane {
    let [x, y, z] = flange;
    plane_from_axes(Point3::new(x, y, z), -Vector3::z(), Vector3::y())
}

fn limits(degrees: [[f64; 2]; 6]) -> [Interval; 6] {
    degrees.map(|[a, b]| Interval::new(a, b))
}

impl Robot {
    /// Builds the robot from the axis origins (millimeters), axis limits (degrees) and the
    /// flange origin.
    pub fn abb(name: &str, origins: [[f64; 3]; 6], axis_limits: [[f64; 2]; 6], flange: [f64; 3]) -> Self {
        Robot::from_axes(
            name,
            abb_axis_planes(origins),
            limits(axis_limits),
            abb_mounting_frame(flange),
        )
    }

    pub fn irb120() -> Self {
        Robot::abb(
            "IRB120-3/0.6",
            [
                [0.0, 0.0, 0.0],
                [0.0, 0.0, 290.0],
                [0.0, 0.0, 560.0],
                [302.0, 0.0, 630.0],
                [302.0, 0.0, 630.0],
                [374.0, 0.0, 630.0],
            ],
            [
                [-165.0, 165.0],
                [-110.0, 110.0],
                [-110.0, 70.0],
                [-160.0, 160.0],
                [-120.0, 120.0],
                [-400.0, 400.0],
            ],
            [374.0, 0.0, 630.0],
        )
    }

    pub fn irb1200() -> Self {
        Robot::abb(
            "IRB1200-5/0.9",
            [
                [0.0, 0.0, 0.0],
                [0.0, 0.0, 399.0],
                [0.0, 0.0, 847.0],
                [451.0, 0.0, 889.0],
                [451.0, 0.0, 889.0],
                [533.0, 0.0, 889.0],
            ],
            [
                [-170.0, 170.0],
                [-100.0, 135.0],
                [-200.0, 70.0],
                [-270.0, 270.0],
                [-130.0, 130.0],
                [-400.0, 400.0],
            ],
            [533.0, 0.0, 889.0],
        )
    }

    pub fn irb1600() -> Self {
        Robot::abb(
            "IRB1600-6/1.45",
            [
                [0.0, 0.0, 0.0],
                [150.0, 0.0, 486.5],
                [150.0, 0.0, 1186.5],
                [750.0, 0.0, 1186.5],
                [750.0, 0.0, 1186.5],
                [815.0, 0.0, 1186.5],
            ],
            [
                [-180.0, 180.0],
                [-90.0, 150.0],
                [-245.0, 65.0],
                [-200.0, 200.0],
                [-115.0, 115.0],
                [-400.0, 400.0],
            ],
            [815.0, 0.0, 1186.5],
        )
    }

    pub fn irb2600() -> Self {
        Robot::abb(
            "IRB2600-12/1.65",
            [
                [0.0, 0.0, 0.0],
                [150.0, 0.0, 445.0],
                [150.0, 0.0, 1145.0],
                [945.0, 0.0, 1260.0],
                [945.0, 0.0, 1260.0],
                [1030.0, 0.0, 1260.0],
            ],
            [
                [-180.0, 180.0],
                [-95.0, 155.0],
                [-180.0, 75.0],
                [-400.0, 400.0],
                [-120.0, 120.0],
                [-400.0, 400.0],
            ],
            [1030.0, 0.0, 1260.0],
        )
    }

    pub fn irb4600() -> Self {
        Robot::abb(
            "IRB4600-60/2.05",
            [
                [0.0, 0.0, 0.0],
                [175.0, 0.0, 495.0],
                [175.0, 0.0, 1395.0],
                [1135.0, 0.0, 1570.0],
                [1135.0, 0.0, 1570.0],
                [1270.0, 0.0, 1570.0],
            ],
            [
                [-180.0, 180.0],
                [-90.0, 150.0],
                [-180.0, 75.0],
                [-400.0, 400.0],
                [-125.0, 120.0],
                [-400.0, 400.0],
            ],
            [1270.0, 0.0, 1570.0],
        )
    }

    /// Preset by (case insensitive) short name, like `irb120` or `IRB4600`.
    pub fn preset(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "irb120" => Some(Robot::irb120()),
            "irb1200" => Some(Robot::irb1200()),
            "irb1600" => Some(Robot::irb1600()),
            "irb2600" => Some(Robot::irb2600()),
            "irb4600" => Some(Robot::irb4600()),
            _ => None,
        }
    }
}
