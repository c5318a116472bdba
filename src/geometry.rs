//! Planes and intervals used by the robot model.
//!
//! A plane is an [`Isometry3`]: its translation is the plane origin, its rotation maps world X, Y
//! and Z onto the plane axes. The plane normal is the rotated Z axis. For axis planes, the origin
//! is the joint center and the normal is the rotation (or translation) axis.

use nalgebra::{Isometry3, Point3, Rotation3, Translation3, Unit, UnitQuaternion, Vector3};

pub type Plane = Isometry3<f64>;

/// Plane from origin and two (not necessarily orthogonal) in-plane directions.
/// X is kept, Y is orthogonalized, Z is the cross product.
pub fn plane_from_axes(origin: Point3<f64>, x_axis: Vector3<f64>, y_axis: Vector3<f64>) -> Plane {
    let x = x_axis.normalize();
    let z = x.cross(&y_axis).normalize();
    let y = z.cross(&x);
    let rotation = Rotation3::from_basis_unchecked(&[x, y, z]);
    Isometry3::from_parts(
        Translation3::from(origin.coords),
        UnitQuaternion::from_rotation_matrix(&rotation),
    )
}

/// Plane from origin and normal. The X axis is picked perpendicular to the normal, preferring
/// the world X direction.
pub fn plane_from_normal(origin: Point3<f64>, normal: Vector3<f64>) -> Plane {
    let z = normal.normalize();
    let reference = if z.cross(&Vector3::x()).norm() > 1e-6 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    let y = z.cross(&reference).normalize();
    let x = y.cross(&z);
    plane_from_axes(origin, x, y)
}

/// World XY plane placed at the given origin.
pub fn plane_at(x: f64, y: f64, z: f64) -> Plane {
    Isometry3::translation(x, y, z)
}

pub fn origin(plane: &Plane) -> Point3<f64> {
    Point3::from(plane.translation.vector)
}

pub fn x_axis(plane: &Plane) -> Vector3<f64> {
    plane.rotation * Vector3::x()
}

pub fn y_axis(plane: &Plane) -> Vector3<f64> {
    plane.rotation * Vector3::y()
}

pub fn normal(plane: &Plane) -> Vector3<f64> {
    plane.rotation * Vector3::z()
}

/// Rigid rotation by `angle` radians about the line through the plane origin along its normal.
pub fn rotation_about(plane: &Plane, angle: f64) -> Isometry3<f64> {
    let axis = Unit::new_normalize(normal(plane));
    Isometry3::rotation_wrt_point(UnitQuaternion::from_axis_angle(&axis, angle), origin(plane))
}

/// Translation by `distance` along the plane normal.
pub fn translation_along(plane: &Plane, distance: f64) -> Isometry3<f64> {
    Isometry3::from_parts(
        Translation3::from(normal(plane) * distance),
        UnitQuaternion::identity(),
    )
}

/// Transform that maps plane `from` onto plane `to` (Rhino's PlaneToPlane).
pub fn plane_to_plane(from: &Plane, to: &Plane) -> Isometry3<f64> {
    to * from.inverse()
}

/// Closed numeric interval, used for axis limits (degrees for rotations, millimeters for linear
/// axes). The bounds are stored as given; `min` and `max` sort them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub t0: f64,
    pub t1: f64,
}

impl Interval {
    pub const fn new(t0: f64, t1: f64) -> Self {
        Interval { t0, t1 }
    }

    pub fn min(&self) -> f64 {
        self.t0.min(self.t1)
    }

    pub fn max(&self) -> f64 {
        self.t0.max(self.t1)
    }

    pub fn length(&self) -> f64 {
        (self.t1 - self.t0).abs()
    }

    pub fn mid(&self) -> f64 {
        0.5 * (self.t0 + self.t1)
    }

    pub fn is_valid(&self) -> bool {
        self.t0.is_finite() && self.t1.is_finite()
    }

    /// True if value is inside the interval, with a small tolerance for round-off.
    pub fn includes(&self, value: f64) -> bool {
        const EPS: f64 = 1e-9;
        value >= self.min() - EPS && value <= self.max() + EPS
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min(), self.max())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_plane_from_normal_keeps_normal() {
        let p = plane_from_normal(Point3::new(1.0, 2.0, 3.0), Vector3::new(0.0, 2.0, 0.0));
        assert!((normal(&p) - Vector3::y()).norm() < 1e-12);
        assert!((origin(&p) - Point3::new(1.0, 2.0, 3.0)).norm() < 1e-12);
        assert!(x_axis(&p).dot(&normal(&p)).abs() < 1e-12);
    }

    #[test]
    fn test_plane_from_normal_along_x() {
        let p = plane_from_normal(Point3::origin(), Vector3::x());
        assert!((normal(&p) - Vector3::x()).norm() < 1e-12);
    }

    #[test]
    fn test_rotation_about_axis_keeps_origin() {
        let axis = plane_from_normal(Point3::new(0.0, 0.0, 290.0), Vector3::y());
        let r = rotation_about(&axis, FRAC_PI_2);
        let moved = r * Point3::new(0.0, 0.0, 560.0);
        // Positive rotation about +Y tilts Z towards X
        assert!((moved - Point3::new(270.0, 0.0, 290.0)).norm() < 1e-9);
        assert!((r * Point3::new(0.0, 0.0, 290.0) - Point3::new(0.0, 0.0, 290.0)).norm() < 1e-9);
    }

    #[test]
    fn test_interval_reversed_bounds() {
        let i = Interval::new(110.0, -110.0);
        assert_eq!(i.min(), -110.0);
        assert!(i.includes(0.0));
        assert!(!i.includes(111.0));
        assert_eq!(i.clamp(200.0), 110.0);
    }

    #[test]
    fn test_plane_to_plane() {
        let a = plane_at(1.0, 0.0, 0.0);
        let b = plane_from_axes(Point3::new(0.0, 5.0, 0.0), Vector3::y(), -Vector3::x());
        let t = plane_to_plane(&a, &b);
        let mapped = t * a;
        assert!((mapped.translation.vector - b.translation.vector).norm() < 1e-9);
        assert!(mapped.rotation.angle_to(&b.rotation) < 1e-9);
    }
}
