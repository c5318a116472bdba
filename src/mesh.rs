//! Triangle meshes of robot links, tools and external axes.
//!
//! The meshes are only carried along and rigidly moved with the geometry they belong to;
//! they have no influence on kinematics. STL loading needs the `allow_filesystem` feature.

use nalgebra::{Isometry3, Point3};

/// Indexed triangle mesh with vertex coordinates in millimeters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Point3<f64>>,
    pub faces: Vec<[usize; 3]>,
}

impl Mesh {
    pub fn new(vertices: Vec<Point3<f64>>, faces: Vec<[usize; 3]>) -> Self {
        Mesh { vertices, faces }
    }

    pub fn empty() -> Self {
        Mesh::default()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Valid if all face indices point into the vertex list.
    pub fn is_valid(&self) -> bool {
        self.faces
            .iter()
            .all(|face| face.iter().all(|&i| i < self.vertices.len()))
    }

    /// Moves the mesh in place.
    pub fn transform(&mut self, transform: &Isometry3<f64>) {
        for vertex in self.vertices.iter_mut() {
            *vertex = transform * *vertex;
        }
    }

    /// Returns the moved copy of this mesh.
    pub fn transformed(&self, transform: &Isometry3<f64>) -> Mesh {
        Mesh {
            vertices: self.vertices.iter().map(|v| transform * v).collect(),
            faces: self.faces.clone(),
        }
    }

    /// Joins another mesh into this one.
    pub fn append(&mut self, other: &Mesh) {
        let offset = self.vertices.len();
        self.vertices.extend_from_slice(&other.vertices);
        self.faces
            .extend(other.faces.iter().map(|f| [f[0] + offset, f[1] + offset, f[2] + offset]));
    }
}

/// Load a mesh from a binary or ASCII STL file
#[cfg(feature = "allow_filesystem")]
pub fn load_mesh_from_stl<P: AsRef<std::path::Path>>(stl_file_path: P) -> crate::error::Result<Mesh> {
    use std::fs::File;
    use std::io::BufReader;
    use stl_io::read_stl;

    let file = File::open(stl_file_path)?;
    let mut reader = BufReader::new(file);
    let stl = read_stl(&mut reader)?;

    let vertices: Vec<Point3<f64>> = stl
        .vertices
        .into_iter()
        .map(|vertex| Point3::new(vertex[0] as f64, vertex[1] as f64, vertex[2] as f64))
        .collect();

    let faces: Vec<[usize; 3]> = stl.faces.into_iter().map(|face| face.vertices).collect();

    let mesh = Mesh::new(vertices, faces);
    if !mesh.is_valid() {
        return Err(crate::error::RobotError::ParseError(
            "STL face refers to a missing vertex".to_string(),
        ));
    }
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Mesh {
        Mesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2]],
        )
    }

    #[test]
    fn test_transform_moves_vertices() {
        let mut mesh = triangle();
        mesh.transform(&Isometry3::translation(0.0, 0.0, 5.0));
        assert!(mesh.vertices.iter().all(|v| (v.z - 5.0).abs() < 1e-12));
    }

    #[test]
    fn test_append_offsets_faces() {
        let mut mesh = triangle();
        mesh.append(&triangle());
        assert_eq!(mesh.vertices.len(), 6);
        assert_eq!(mesh.faces[1], [3, 4, 5]);
        assert!(mesh.is_valid());
    }
}
